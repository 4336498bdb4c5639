// File: src/loader.rs
//! Reads the per-movie text corpus into [`Movie`] records.
//!
//! Each file starts with a fixed block of `"<Key>: <value>"` metadata lines
//! followed by one `"<Character>: <n>, <n>, ..."` line per speaking character.

use crate::core::cast::{CastDirectory, CastError};
use crate::core::types::{Character, Movie};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const IMDB_KEY: &str = "IMDB";
const TITLE_KEY: &str = "Title";
const YEAR_KEY: &str = "Year";
const GENRE_KEY: &str = "Genre";
const DIRECTOR_KEY: &str = "Director";
const RATING_KEY: &str = "Rating";
const BECHDEL_SCORE_KEY: &str = "Bechdel score";
const IMDB_CAST_KEY: &str = "IMDB Cast";
const OSCAR_WINNER_KEY: &str = "Oscar Best Picture Winner";

/// Metadata keys every file must start with, in this order.
const METADATA_KEYS: [&str; 8] = [
    IMDB_KEY,
    TITLE_KEY,
    YEAR_KEY,
    GENRE_KEY,
    DIRECTOR_KEY,
    RATING_KEY,
    BECHDEL_SCORE_KEY,
    IMDB_CAST_KEY,
];

const FIELD_SEPARATOR: &str = ": ";
const LIST_SEPARATOR: &str = ", ";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{source_name}: metadata formatted incorrectly, expected '{expected}' on line {line}")]
    MetadataFormat {
        source_name: String,
        expected: &'static str,
        line: usize,
    },

    #[error("{source_name}: could not parse {field} value '{value}'")]
    Field {
        source_name: String,
        field: &'static str,
        value: String,
    },

    #[error("{source_name}: malformed IMDb cast: {source}")]
    Cast {
        source_name: String,
        #[source]
        source: CastError,
    },

    #[error("{source_name}: bad line counts on line {line}: '{text}'")]
    LineCounts {
        source_name: String,
        line: usize,
        text: String,
    },
}

/// Ingestion settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Skip a movie whose cast list is malformed instead of aborting the load.
    pub skip_malformed_cast: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { skip_malformed_cast: true }
    }
}

/// The loaded corpus. Movies keep the order in which they were loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    movies: Vec<Movie>,
}

impl Corpus {
    pub fn from_movies(movies: Vec<Movie>) -> Self {
        Self { movies }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Movie> + '_ {
        self.movies.iter()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn get_movie(&self, title: &str) -> Option<&Movie> {
        self.movies.iter().find(|movie| movie.title == title)
    }
}

/// Loads every `.txt` file of `dir`, in file-name order.
pub fn load_corpus(dir: &Path, config: &LoaderConfig) -> Result<Corpus, LoadError> {
    let io_err = |source| LoadError::Io { path: dir.to_path_buf(), source };

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_err)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map_or(false, |ext| ext == "txt"))
        .collect();
    paths.sort();

    let mut movies = Vec::with_capacity(paths.len());
    for path in paths {
        let text = fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let source_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        match parse_movie(&source_name, &text) {
            Ok(movie) => {
                info!(title = %movie.title, "loaded movie");
                movies.push(movie);
            }
            Err(err @ LoadError::Cast { .. }) if config.skip_malformed_cast => {
                warn!(%err, "skipping movie");
            }
            Err(err) => return Err(err),
        }
    }

    info!(movies = movies.len(), "corpus loaded");
    Ok(Corpus::from_movies(movies))
}

/// Parses one movie file. `source_name` only labels errors.
pub fn parse_movie(source_name: &str, text: &str) -> Result<Movie, LoadError> {
    let lines: Vec<&str> = text.lines().collect();
    check_metadata_format(source_name, &lines)?;

    let field = |idx: usize| read_field(lines[idx]);
    let parse_err = |field: &'static str, value: &str| LoadError::Field {
        source_name: source_name.to_string(),
        field,
        value: value.to_string(),
    };

    let imdb_id = field(0).unwrap_or_default().to_string();
    let title = field(1).unwrap_or_default().to_string();
    let year = field(2)
        .map(|v| v.parse::<i32>().map_err(|_| parse_err(YEAR_KEY, v)))
        .transpose()?;
    let genres = field(3).map(split_list).unwrap_or_default();
    let director = field(4).map(str::to_string);
    let rating = field(5)
        .map(|v| v.parse::<f32>().map_err(|_| parse_err(RATING_KEY, v)))
        .transpose()?;
    let bechdel_score = field(6)
        .map(|v| v.parse::<i32>().map_err(|_| parse_err(BECHDEL_SCORE_KEY, v)))
        .transpose()?;

    let cast_entries = field(7).map(split_list).unwrap_or_default();
    let imdb_cast = CastDirectory::build(&cast_entries).map_err(|source| LoadError::Cast {
        source_name: source_name.to_string(),
        source,
    })?;

    let (oscar_winner, script_start) = match lines.get(8) {
        Some(line) if line.starts_with(OSCAR_WINNER_KEY) => {
            (Some(read_field(line) == Some("True")), 9)
        }
        _ => (None, 8),
    };

    let characters = extract_characters(source_name, &lines, script_start)?;

    Ok(Movie {
        imdb_id,
        title,
        year,
        genres,
        director,
        rating,
        bechdel_score,
        oscar_winner,
        imdb_cast,
        characters,
    })
}

fn check_metadata_format(source_name: &str, lines: &[&str]) -> Result<(), LoadError> {
    for (idx, &key) in METADATA_KEYS.iter().enumerate() {
        let ok = lines
            .get(idx)
            .map_or(false, |line| line.starts_with(key) && line[key.len()..].starts_with(':'));
        if !ok {
            return Err(LoadError::MetadataFormat {
                source_name: source_name.to_string(),
                expected: key,
                line: idx + 1,
            });
        }
    }
    Ok(())
}

/// The value after the first `": "`, with `None` and `N/A` read as absent.
fn read_field(line: &str) -> Option<&str> {
    let value = line.split_once(FIELD_SEPARATOR).map_or("", |(_, v)| v).trim_end();
    match value {
        "" | "None" | "N/A" => None,
        v => Some(v),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value.split(LIST_SEPARATOR).map(str::to_string).collect()
}

/// Character names may contain `": "` themselves, so the counts follow the last one.
/// A repeated name replaces the earlier record in place.
fn extract_characters(
    source_name: &str,
    lines: &[&str],
    start: usize,
) -> Result<Vec<Character>, LoadError> {
    let mut characters: Vec<Character> = Vec::new();
    for (idx, line) in lines.iter().enumerate().skip(start) {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let bad_line = || LoadError::LineCounts {
            source_name: source_name.to_string(),
            line: idx + 1,
            text: line.to_string(),
        };

        let (name, counts) = line.rsplit_once(FIELD_SEPARATOR).ok_or_else(bad_line)?;
        let line_data = counts
            .split(LIST_SEPARATOR)
            .map(|n| n.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| bad_line())?;
        match characters.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.line_data = line_data,
            None => characters.push(Character::new(name, line_data)),
        }
    }
    Ok(characters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Gender;

    const TERMINATOR: &str = "\
IMDB: 0088247
Title: The Terminator
Year: 1984
Genre: Action, Sci-Fi
Director: James Cameron
Rating: 8.0
Bechdel score: 3
IMDB Cast: Sarah Connor | Linda Hamilton (F), Kyle Reese | Michael Biehn (M)
Oscar Best Picture Winner: False
SARAH: 5, 7
KYLE: 3
DR. SILBERMAN: ER: 1, 0, 2
";

    #[test]
    fn parses_full_movie() {
        let movie = parse_movie("terminator.txt", TERMINATOR).unwrap();
        assert_eq!(movie.imdb_id, "0088247");
        assert_eq!(movie.title, "The Terminator");
        assert_eq!(movie.year, Some(1984));
        assert_eq!(movie.genres, vec!["Action", "Sci-Fi"]);
        assert_eq!(movie.director.as_deref(), Some("James Cameron"));
        assert_eq!(movie.rating, Some(8.0));
        assert_eq!(movie.bechdel_score, Some(3));
        assert_eq!(movie.oscar_winner, Some(false));

        let cast = movie.imdb_cast.as_ref().unwrap();
        assert_eq!(cast.get("sarah connor").unwrap().gender, Gender::Female);

        let names: Vec<_> = movie.characters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["SARAH", "KYLE", "DR. SILBERMAN: ER"]);
        assert_eq!(movie.characters[0].line_count(), 12);
    }

    #[test]
    fn missing_values_and_oscar_line_are_optional() {
        let text = "\
IMDB: 1
Title: Lost
Year: N/A
Genre: None
Director: None
Rating: N/A
Bechdel score: None
IMDB Cast: None
A: 1
";
        let movie = parse_movie("lost.txt", text).unwrap();
        assert_eq!(movie.year, None);
        assert!(movie.genres.is_empty());
        assert_eq!(movie.bechdel_score, None);
        assert_eq!(movie.oscar_winner, None);
        assert!(movie.imdb_cast.is_none());
        assert_eq!(movie.characters.len(), 1);
    }

    #[test]
    fn repeated_character_keeps_last_counts_in_first_position() {
        let text = TERMINATOR.replace("KYLE: 3", "SARAH: 2\nKYLE: 3");
        let movie = parse_movie("terminator.txt", &text).unwrap();

        let names: Vec<_> = movie.characters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["SARAH", "KYLE", "DR. SILBERMAN: ER"]);
        assert_eq!(movie.characters[0].line_data, vec![2]);
    }

    #[test]
    fn rejects_out_of_order_metadata() {
        let text = TERMINATOR.replacen("Year: 1984", "Genre: Action", 1);
        let err = parse_movie("bad.txt", &text).unwrap_err();
        assert!(matches!(err, LoadError::MetadataFormat { expected: "Year", line: 3, .. }));
    }

    #[test]
    fn malformed_cast_is_distinguishable() {
        let text = TERMINATOR.replace("Kyle Reese | Michael Biehn (M)", "Kyle Reese");
        let err = parse_movie("bad.txt", &text).unwrap_err();
        assert!(matches!(err, LoadError::Cast { source: CastError::MissingDelimiter(_), .. }));
    }

    #[test]
    fn bad_counts_name_the_line() {
        let text = TERMINATOR.replace("KYLE: 3", "KYLE: three");
        let err = parse_movie("bad.txt", &text).unwrap_err();
        assert!(matches!(err, LoadError::LineCounts { line: 11, .. }));
    }
}
