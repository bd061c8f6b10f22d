//! Core domain types for the movie catalog.
//!
//! A [`MovieDocument`] is owned by the store; everything downstream
//! (indexing, similarity, the service layer) only reads it.

use serde::{Deserialize, Deserializer, Serialize};

/// Stable external identifier of a movie (the metadata provider's id)
pub type MovieId = u32;

/// A movie as held by the document store.
///
/// Text fields may be absent. Catalogs written by the metadata sync use
/// `tmdb_id` for the identifier, so that spelling is accepted as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDocument {
    #[serde(alias = "tmdb_id")]
    pub id: MovieId,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub overview: Option<String>,

    /// Genre labels in provider order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub genres: Vec<String>,

    /// Keyword labels in provider order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub keywords: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
}

/// Label lists may be written as `null` by the metadata sync
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl MovieDocument {
    /// Create a document with only an id and a title
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: Some(title.into()),
            overview: None,
            genres: Vec::new(),
            keywords: Vec::new(),
            poster_path: None,
            release_date: None,
        }
    }

    pub fn with_overview(mut self, overview: impl Into<String>) -> Self {
        self.overview = Some(overview.into());
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Title for display, falling back to the id
    pub fn display_title(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => format!("#{}", self.id),
        }
    }

    /// Release year parsed from a `YYYY-MM-DD` release date
    pub fn year(&self) -> Option<u16> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_tmdb_id_and_missing_fields() {
        let doc: MovieDocument =
            serde_json::from_str(r#"{"tmdb_id": 603, "title": "The Matrix"}"#).unwrap();

        assert_eq!(doc.id, 603);
        assert_eq!(doc.title.as_deref(), Some("The Matrix"));
        assert!(doc.overview.is_none());
        assert!(doc.genres.is_empty());
        assert!(doc.keywords.is_empty());
    }

    #[test]
    fn test_year_from_release_date() {
        let mut doc = MovieDocument::new(1, "Toy Story");
        assert_eq!(doc.year(), None);

        doc.release_date = Some("1995-10-30".to_string());
        assert_eq!(doc.year(), Some(1995));
    }

    #[test]
    fn test_display_title_falls_back_to_id() {
        let mut doc = MovieDocument::new(42, "");
        assert_eq!(doc.display_title(), "#42");

        doc.title = None;
        assert_eq!(doc.display_title(), "#42");
    }
}
