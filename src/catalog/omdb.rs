//! OMDb catalog client implementation.

use super::omdb_types::{OmdbDetail, OmdbSearchResponse, OmdbTitle};
use super::{
    CatalogClient, CatalogError, DEFAULT_FAILURE_MESSAGE, SearchPage, Title, TitleDetail,
    TitleKind, available,
};

/// Default endpoint of the OMDb API
pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";

/// Catalog client for the OMDb API.
///
/// Searches use the `s`/`page` parameters and detail lookups use `i` with
/// `plot=full`. No retry or caching happens here.
pub struct OmdbClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    /// Creates a client for the public OMDb endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Creates a client for a custom endpoint (a proxy or a test server).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Issues a GET against the endpoint and decodes the JSON body.
    fn get<T>(&self, params: &[(&str, &str)]) -> Result<T, CatalogError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.as_str())])
            .query(params)
            .send()
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CatalogError::Request(format!(
                "HTTP {} {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json()
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }

    /// Looks up one title, reporting why the lookup failed.
    fn lookup(&self, id: &str) -> Result<TitleDetail, CatalogError> {
        if id.trim().is_empty() {
            return Err(CatalogError::Request("empty title id".to_string()));
        }

        tracing::debug!(id, "fetching title detail");
        let detail: OmdbDetail = self.get(&[("i", id), ("plot", "full")])?;

        if detail.response.as_deref() == Some("False") {
            return Err(CatalogError::Provider(
                detail
                    .error
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
            ));
        }

        Self::convert_detail(detail)
    }

    fn convert_title(omdb_title: OmdbTitle) -> Title {
        Title {
            id: omdb_title.imdb_id,
            name: omdb_title.title,
            year: omdb_title.year,
            kind: TitleKind::from_tag(&omdb_title.kind),
            poster: omdb_title.poster.and_then(available),
        }
    }

    fn convert_detail(detail: OmdbDetail) -> Result<TitleDetail, CatalogError> {
        let id = detail
            .imdb_id
            .ok_or_else(|| CatalogError::Parse("detail response without imdbID".to_string()))?;

        let title = Title {
            id,
            name: detail.title.and_then(available).unwrap_or_default(),
            year: detail.year.and_then(available).unwrap_or_default(),
            kind: TitleKind::from_tag(detail.kind.as_deref().unwrap_or_default()),
            poster: detail.poster.and_then(available),
        };

        Ok(TitleDetail {
            title,
            plot: detail.plot.and_then(available).unwrap_or_default(),
            director: detail.director.and_then(available).unwrap_or_default(),
            cast: split_list(detail.actors),
            genres: split_list(detail.genre),
            runtime: detail.runtime.and_then(available).unwrap_or_default(),
            rating: detail.imdb_rating.as_deref().and_then(parse_rating),
            released: detail.released.and_then(available).unwrap_or_default(),
        })
    }
}

impl CatalogClient for OmdbClient {
    fn search(&self, term: &str, page: u32) -> Result<SearchPage, CatalogError> {
        if term.trim().is_empty() {
            return Err(CatalogError::Request("empty search term".to_string()));
        }
        if page == 0 {
            return Err(CatalogError::Request("pages start at 1".to_string()));
        }

        tracing::debug!(term, page, "searching catalog");
        let page_param = page.to_string();
        let response: OmdbSearchResponse =
            self.get(&[("s", term), ("page", page_param.as_str())])?;

        if response.response != "True" {
            return Err(CatalogError::Provider(
                response
                    .error
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
            ));
        }

        let total_count = match response.total_results {
            Some(total) => total
                .trim()
                .parse::<usize>()
                .map_err(|e| CatalogError::Parse(format!("totalResults {:?}: {}", total, e)))?,
            None => 0,
        };

        Ok(SearchPage {
            items: response.search.into_iter().map(Self::convert_title).collect(),
            total_count,
        })
    }

    fn fetch_detail(&self, id: &str) -> Option<TitleDetail> {
        match self.lookup(id) {
            Ok(detail) => Some(detail),
            Err(e) => {
                tracing::warn!(id, error = %e, "failed to fetch title detail");
                None
            }
        }
    }
}

/// Splits a comma-joined transport list into its trimmed parts.
fn split_list(value: Option<String>) -> Vec<String> {
    value
        .and_then(available)
        .map(|joined| {
            joined
                .split(',')
                .map(|part| part.trim())
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Parses a decimal rating, keeping only values on the 0-10 scale.
fn parse_rating(value: &str) -> Option<f32> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|rating| (0.0..=10.0).contains(rating))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn query(params: &[(&str, &str)]) -> Matcher {
        Matcher::AllOf(
            params
                .iter()
                .map(|(k, v)| Matcher::UrlEncoded(k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_search_returns_page() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", Matcher::Any)
            .match_query(query(&[("apikey", "secret"), ("s", "Batman"), ("page", "1")]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "Search": [
                        {"Title": "Batman Begins", "Year": "2005", "imdbID": "tt0372784", "Type": "movie", "Poster": "https://example.com/a.jpg"},
                        {"Title": "Batman: The Animated Series", "Year": "1992–1995", "imdbID": "tt0103359", "Type": "series", "Poster": "N/A"}
                    ],
                    "totalResults": "50",
                    "Response": "True"
                }"#,
            )
            .create();

        let client = OmdbClient::with_base_url("secret", server.url());
        let page = client.search("Batman", 1).unwrap();

        mock.assert();
        assert_eq!(page.total_count, 50);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, "tt0372784");
        assert_eq!(page.items[0].poster.as_deref(), Some("https://example.com/a.jpg"));
        assert_eq!(page.items[1].kind, TitleKind::Series);
        assert_eq!(page.items[1].poster, None);
    }

    #[test]
    fn test_search_provider_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", Matcher::Any)
            .match_query(Matcher::UrlEncoded("s".into(), "zzzzqqq".into()))
            .with_status(200)
            .with_body(r#"{"Response": "False", "Error": "Movie not found!"}"#)
            .create();

        let client = OmdbClient::with_base_url("secret", server.url());
        let err = client.search("zzzzqqq", 1).unwrap_err();

        assert!(matches!(err, CatalogError::Provider(ref m) if m == "Movie not found!"));
        assert_eq!(err.user_message(), "Movie not found!");
    }

    #[test]
    fn test_search_provider_error_without_message() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"Response": "False"}"#)
            .create();

        let client = OmdbClient::with_base_url("secret", server.url());
        let err = client.search("Batman", 1).unwrap_err();

        assert_eq!(err.user_message(), DEFAULT_FAILURE_MESSAGE);
    }

    #[test]
    fn test_search_http_failure() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", Matcher::Any).with_status(500).create();

        let client = OmdbClient::with_base_url("secret", server.url());
        let err = client.search("Batman", 1).unwrap_err();

        assert!(matches!(err, CatalogError::Request(_)));
        assert_eq!(err.user_message(), DEFAULT_FAILURE_MESSAGE);
    }

    #[test]
    fn test_search_malformed_body() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create();

        let client = OmdbClient::with_base_url("secret", server.url());
        let err = client.search("Batman", 1).unwrap_err();

        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn test_search_rejects_blank_term_without_request() {
        let mut server = mockito::Server::new();
        let mock = server.mock("GET", Matcher::Any).expect(0).create();

        let client = OmdbClient::with_base_url("secret", server.url());
        assert!(client.search("   ", 1).is_err());
        assert!(client.search("Batman", 0).is_err());

        mock.assert();
    }

    #[test]
    fn test_fetch_detail() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", Matcher::Any)
            .match_query(query(&[("i", "tt0372784"), ("plot", "full")]))
            .with_status(200)
            .with_body(
                r#"{
                    "Title": "Batman Begins", "Year": "2005", "Released": "15 Jun 2005",
                    "Runtime": "140 min", "Genre": "Action, Crime, Drama",
                    "Director": "Christopher Nolan",
                    "Actors": "Christian Bale, Michael Caine, Ken Watanabe",
                    "Plot": "After witnessing his parents' death...",
                    "Poster": "https://example.com/a.jpg", "imdbRating": "8.2",
                    "imdbID": "tt0372784", "Type": "movie", "Response": "True"
                }"#,
            )
            .create();

        let client = OmdbClient::with_base_url("secret", server.url());
        let detail = client.fetch_detail("tt0372784").unwrap();

        assert_eq!(detail.title.name, "Batman Begins");
        assert_eq!(detail.genres, vec!["Action", "Crime", "Drama"]);
        assert_eq!(detail.cast.len(), 3);
        assert_eq!(detail.cast[2], "Ken Watanabe");
        assert_eq!(detail.rating, Some(8.2));
        assert_eq!(detail.runtime, "140 min");
    }

    #[test]
    fn test_fetch_detail_not_available_fields() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{
                    "Title": "Obscure Short", "Year": "1999", "imdbID": "tt9999999",
                    "Type": "movie", "Poster": "N/A", "Genre": "N/A", "Actors": "N/A",
                    "imdbRating": "N/A", "Plot": "N/A", "Response": "True"
                }"#,
            )
            .create();

        let client = OmdbClient::with_base_url("secret", server.url());
        let detail = client.fetch_detail("tt9999999").unwrap();

        assert_eq!(detail.title.poster, None);
        assert!(detail.genres.is_empty());
        assert!(detail.cast.is_empty());
        assert_eq!(detail.rating, None);
        assert_eq!(detail.plot, "");
    }

    #[test]
    fn test_fetch_detail_failures_are_none() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", Matcher::Any)
            .match_query(Matcher::UrlEncoded("i".into(), "tt0000000".into()))
            .with_status(200)
            .with_body(r#"{"Response": "False", "Error": "Incorrect IMDb ID."}"#)
            .create();
        let _unavailable = server
            .mock("GET", Matcher::Any)
            .match_query(Matcher::UrlEncoded("i".into(), "tt5000000".into()))
            .with_status(503)
            .create();

        let client = OmdbClient::with_base_url("secret", server.url());

        assert!(client.fetch_detail("tt0000000").is_none());
        assert!(client.fetch_detail("tt5000000").is_none());
        assert!(client.fetch_detail("").is_none());
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("7.5"), Some(7.5));
        assert_eq!(parse_rating("10"), Some(10.0));
        assert_eq!(parse_rating("N/A"), None);
        assert_eq!(parse_rating("11.0"), None);
        assert_eq!(parse_rating("-1"), None);
    }
}
