//! OMDb API response types for deserialization.
//!
//! These structures mirror the JSON response format from the OMDb API,
//! which uses capitalized field names and encodes numbers as strings.

use serde::Deserialize;

/// The response from the OMDb search endpoint (`?s=`).
#[derive(Debug, Deserialize)]
pub(super) struct OmdbSearchResponse {
    /// Search hits for the requested page (absent when `Response` is "False")
    #[serde(rename = "Search", default)]
    pub search: Vec<OmdbTitle>,
    /// Total number of hits, encoded as a string
    #[serde(rename = "totalResults")]
    pub total_results: Option<String>,
    /// "True" or "False"
    #[serde(rename = "Response")]
    pub response: String,
    /// Provider error message when `Response` is "False"
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

/// A single search hit.
#[derive(Debug, Deserialize)]
pub(super) struct OmdbTitle {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(rename = "Poster")]
    pub poster: Option<String>,
}

/// The response from the OMDb lookup endpoint (`?i=`).
///
/// Every field is optional because a failed lookup only carries
/// `Response` and `Error`.
#[derive(Debug, Deserialize)]
pub(super) struct OmdbDetail {
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    #[serde(rename = "Poster")]
    pub poster: Option<String>,
    #[serde(rename = "Plot")]
    pub plot: Option<String>,
    #[serde(rename = "Director")]
    pub director: Option<String>,
    /// Comma-separated actor names
    #[serde(rename = "Actors")]
    pub actors: Option<String>,
    /// Comma-separated genre names
    #[serde(rename = "Genre")]
    pub genre: Option<String>,
    #[serde(rename = "Runtime")]
    pub runtime: Option<String>,
    /// Decimal rating, e.g. "8.2"
    #[serde(rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "Released")]
    pub released: Option<String>,
    #[serde(rename = "Response")]
    pub response: Option<String>,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}
