use serde::{Deserialize, Serialize};

/// Poster value the catalog uses when it has no image.
pub const NO_POSTER: &str = "N/A";

/// One search hit. Field names on the wire follow the catalog so the same
/// shape is used for responses and for persisted favorites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Type", default)]
    pub media_type: String,
    #[serde(rename = "Poster", default = "no_poster")]
    pub poster_url: String,
}

fn no_poster() -> String {
    NO_POSTER.to_string()
}

impl MovieSummary {
    pub fn has_poster(&self) -> bool {
        self.poster_url != NO_POSTER
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "Search", default)]
    pub search: Option<Vec<MovieSummary>>,
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn is_success(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Full record returned by an id lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Type", default)]
    pub media_type: String,
    #[serde(rename = "Poster", default = "no_poster")]
    pub poster_url: String,
    #[serde(rename = "Rated", default, skip_serializing_if = "Option::is_none")]
    pub rated: Option<String>,
    #[serde(rename = "Released", default, skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,
    #[serde(rename = "Runtime", default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(rename = "Genre", default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(rename = "Director", default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(rename = "Actors", default, skip_serializing_if = "Option::is_none")]
    pub actors: Option<String>,
    #[serde(rename = "Plot", default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(rename = "Language", default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(rename = "Country", default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "imdbRating", default, skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbVotes", default, skip_serializing_if = "Option::is_none")]
    pub imdb_votes: Option<String>,
    #[serde(rename = "Ratings", default)]
    pub ratings: Vec<Rating>,
}
