//! Parser for movie catalog files.
//!
//! Two layouts are accepted:
//! - a JSON array of movie documents (`[{...}, {...}]`)
//! - JSON Lines, one document per line (blank lines skipped)
//!
//! The layout is chosen by the first non-whitespace character.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Parse a catalog file into documents, in file order.
pub fn parse_catalog(path: &Path) -> Result<Vec<MovieDocument>> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;

    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    parse_catalog_str(&content, &file)
}

/// Parse catalog content; `file` is only used in error messages.
pub fn parse_catalog_str(content: &str, file: &str) -> Result<Vec<MovieDocument>> {
    let movies = if content.trim_start().starts_with('[') {
        parse_json_array(content, file)?
    } else {
        parse_json_lines(content, file)?
    };

    validate_ids(&movies)?;
    Ok(movies)
}

fn parse_json_array(content: &str, file: &str) -> Result<Vec<MovieDocument>> {
    serde_json::from_str(content).map_err(|e| DataLoadError::ParseError {
        file: file.to_string(),
        line: e.line(),
        reason: e.to_string(),
    })
}

fn parse_json_lines(content: &str, file: &str) -> Result<Vec<MovieDocument>> {
    let mut movies = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let movie: MovieDocument =
            serde_json::from_str(line_trimmed).map_err(|e| DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: e.to_string(),
            })?;
        movies.push(movie);
    }

    Ok(movies)
}

fn validate_ids(movies: &[MovieDocument]) -> Result<()> {
    let mut seen: HashSet<MovieId> = HashSet::with_capacity(movies.len());
    for movie in movies {
        if movie.id == 0 {
            return Err(DataLoadError::ValidationError(format!(
                "movie {:?} has id 0, ids start at 1",
                movie.display_title()
            )));
        }
        if !seen.insert(movie.id) {
            return Err(DataLoadError::DuplicateMovie { id: movie.id });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_json_array() {
        let content = r#"[
            {"id": 1, "title": "Space War", "genres": ["scifi"]},
            {"tmdb_id": 2, "title": "Space Battle", "keywords": ["fleet", "laser"]}
        ]"#;

        let movies = parse_catalog_str(content, "catalog.json").unwrap();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].id, 1);
        assert_eq!(movies[0].genres, vec!["scifi".to_string()]);
        assert_eq!(movies[1].id, 2);
        assert_eq!(movies[1].keywords.len(), 2);
    }

    #[test]
    fn test_parse_json_lines_reports_line_number() {
        let content = "{\"id\": 1, \"title\": \"A\"}\n\n{\"id\": oops}\n";

        let err = parse_catalog_str(content, "catalog.jsonl").unwrap_err();
        match err {
            DataLoadError::ParseError { file, line, .. } => {
                assert_eq!(file, "catalog.jsonl");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_null_genres_and_keywords_are_empty() {
        let content = r#"[
            {"id": 1, "title": "A", "genres": null, "keywords": ["x"]},
            {"id": 2, "title": "B", "genres": ["drama"], "keywords": null}
        ]"#;

        let movies = parse_catalog_str(content, "nulls.json").unwrap();
        assert_eq!(movies.len(), 2);
        assert!(movies[0].genres.is_empty());
        assert_eq!(movies[0].keywords, vec!["x".to_string()]);
        assert_eq!(movies[1].genres, vec!["drama".to_string()]);
        assert!(movies[1].keywords.is_empty());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let content = "{\"id\": 7}\n{\"id\": 7}\n";
        let err = parse_catalog_str(content, "dup.jsonl").unwrap_err();
        assert!(matches!(err, DataLoadError::DuplicateMovie { id: 7 }));
    }

    #[test]
    fn test_zero_id_rejected() {
        let err = parse_catalog_str("[{\"id\": 0, \"title\": \"Nobody\"}]", "zero.json").unwrap_err();
        assert!(matches!(err, DataLoadError::ValidationError(_)));
    }

    #[test]
    fn test_empty_catalog() {
        assert!(parse_catalog_str("", "empty.jsonl").unwrap().is_empty());
        assert!(parse_catalog_str("[]", "empty.json").unwrap().is_empty());
    }

    #[test]
    fn test_parse_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"[{{"id": 10, "title": "Romance in Paris"}}]"#).unwrap();

        let movies = parse_catalog(file.path()).unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title.as_deref(), Some("Romance in Paris"));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_catalog(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }
}
