//! Data structures and traits for movie and TV show catalog lookups.
//!
//! This module provides the records returned by a remote catalog (search
//! results and full details) together with the trait that catalog providers
//! implement.

mod omdb;
mod omdb_types;

pub use omdb::{DEFAULT_BASE_URL, OmdbClient};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Message shown to the user when a search fails without a provider message
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to fetch movies";

/// Errors that can occur during catalog lookups.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Request to the catalog provider failed
    #[error("Request failed: {0}")]
    Request(String),

    /// Failed to parse the provider's JSON response
    #[error("Failed to parse API response: {0}")]
    Parse(String),

    /// The provider answered, but reported a logical failure such as "no results"
    #[error("{0}")]
    Provider(String),
}

impl CatalogError {
    /// The text a user should see for this failure.
    ///
    /// Provider messages are passed through verbatim; transport and parse
    /// problems collapse into a single generic message.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Provider(message) => message.clone(),
            CatalogError::Request(_) | CatalogError::Parse(_) => {
                DEFAULT_FAILURE_MESSAGE.to_string()
            }
        }
    }
}

/// The kind of a catalog title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleKind {
    Movie,
    Series,
    Episode,
}

impl TitleKind {
    /// Parses the provider's type tag. Unrecognized tags are treated as movies.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "series" => TitleKind::Series,
            "episode" => TitleKind::Episode,
            "movie" => TitleKind::Movie,
            other => {
                tracing::debug!(tag = other, "unknown title type, treating as movie");
                TitleKind::Movie
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TitleKind::Movie => "movie",
            TitleKind::Series => "series",
            TitleKind::Episode => "episode",
        }
    }
}

impl<'de> Deserialize<'de> for TitleKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(TitleKind::from_tag(&tag))
    }
}

/// A search result record.
///
/// Identity is `id`; two titles with the same id are the same title even if
/// other fields differ. The aliases accept records saved with the provider's
/// field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    /// External identifier assigned by the provider (e.g. `tt0372784`)
    #[serde(alias = "imdbID")]
    pub id: String,
    /// Display title
    #[serde(alias = "Title")]
    pub name: String,
    /// Release year as reported by the provider (may be a range like `2005–2013`)
    #[serde(alias = "Year")]
    pub year: String,
    /// Movie, series or episode
    #[serde(alias = "Type")]
    pub kind: TitleKind,
    /// Poster image URL, `None` when the title has no poster
    #[serde(alias = "Poster", default, deserialize_with = "deserialize_poster")]
    pub poster: Option<String>,
}

/// Reads a stored poster, mapping the provider's placeholder to `None`
fn deserialize_poster<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(available))
}

/// Placeholder the provider uses for missing values
const NOT_AVAILABLE: &str = "N/A";

/// Maps the provider's "N/A" placeholder (and blank strings) to `None`.
pub(crate) fn available(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == NOT_AVAILABLE {
        None
    } else {
        Some(value)
    }
}

/// Full details for a single title, fetched on demand and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleDetail {
    /// The basic title record
    pub title: Title,
    /// Full plot summary
    pub plot: String,
    pub director: String,
    /// Actors in billing order
    pub cast: Vec<String>,
    /// Genres in provider order
    pub genres: Vec<String>,
    pub runtime: String,
    /// Rating on a 0-10 scale, `None` when unrated or out of range
    pub rating: Option<f32>,
    pub released: String,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    /// Titles on this page, in provider order
    pub items: Vec<Title>,
    /// Number of results the provider reports for the whole search
    pub total_count: usize,
}

/// Trait for catalog providers that can search for and describe titles.
///
/// Each call is a single best-effort round trip; implementors must produce
/// exactly one outcome per call.
pub trait CatalogClient {
    /// Searches the catalog for titles matching `term`.
    ///
    /// # Arguments
    ///
    /// * `term` - A non-empty search term
    /// * `page` - The 1-based page to retrieve; the page size is provider-defined
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Provider` when the provider reports a logical
    /// failure (including "no results"), and `Request` or `Parse` for
    /// transport problems.
    fn search(&self, term: &str, page: u32) -> Result<SearchPage, CatalogError>;

    /// Fetches the full details of one title.
    ///
    /// Retrieval failures are reported as `None`; callers render a distinct
    /// failed-load state for it.
    fn fetch_detail(&self, id: &str) -> Option<TitleDetail>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        assert_eq!(
            CatalogError::Provider("Movie not found!".to_string()).user_message(),
            "Movie not found!"
        );
        assert_eq!(
            CatalogError::Request("connection refused".to_string()).user_message(),
            DEFAULT_FAILURE_MESSAGE
        );
        assert_eq!(
            CatalogError::Parse("expected value".to_string()).user_message(),
            DEFAULT_FAILURE_MESSAGE
        );
    }

    #[test]
    fn test_title_kind_from_tag() {
        assert_eq!(TitleKind::from_tag("movie"), TitleKind::Movie);
        assert_eq!(TitleKind::from_tag("Series"), TitleKind::Series);
        assert_eq!(TitleKind::from_tag("episode"), TitleKind::Episode);
        assert_eq!(TitleKind::from_tag("game"), TitleKind::Movie);
    }

    #[test]
    fn test_title_serializes_kind_lowercase() {
        let title = Title {
            id: "tt0372784".to_string(),
            name: "Batman Begins".to_string(),
            year: "2005".to_string(),
            kind: TitleKind::Movie,
            poster: None,
        };

        let json = serde_json::to_value(&title).unwrap();
        assert_eq!(json["kind"], "movie");
        assert!(json["poster"].is_null());
    }

    #[test]
    fn test_title_accepts_any_type_tag() {
        let title: Title = serde_json::from_str(
            r#"{"imdbID": "tt0000001", "Title": "Some Game", "Year": "2011", "Type": "game"}"#,
        )
        .unwrap();

        assert_eq!(title.kind, TitleKind::Movie);
        assert_eq!(title.poster, None);
    }

    #[test]
    fn test_title_poster_placeholder_is_none() {
        let title: Title = serde_json::from_str(
            r#"{"id": "tt1", "name": "No Art", "year": "1990", "kind": "series", "poster": "N/A"}"#,
        )
        .unwrap();

        assert_eq!(title.kind, TitleKind::Series);
        assert_eq!(title.poster, None);
    }
}
