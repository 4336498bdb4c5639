// src/core/types.rs
use crate::core::cast::CastDirectory;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The gender code attached to an IMDb cast entry.
/// Anything other than `M` or `F` is kept verbatim so reports can show it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other(String),
}

impl Gender {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "M" => Gender::Male,
            "F" => Gender::Female,
            other => Gender::Other(other.to_string()),
        }
    }

    /// Only `M` and `F` count towards the "gendered" statistic.
    pub fn is_known(&self) -> bool {
        matches!(self, Gender::Male | Gender::Female)
    }

    pub fn code(&self) -> &str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Other(code) => code,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The value side of a cast directory entry: who plays the part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    pub actor: String,
    pub gender: Gender,
}

impl CastMember {
    pub fn new(actor: impl Into<String>, gender: Gender) -> Self {
        Self { actor: actor.into(), gender }
    }
}

/// A speaking character extracted from a screenplay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    /// Dialogue lines per scene, in scene order.
    pub line_data: Vec<u32>,
}

impl Character {
    pub fn new(name: impl Into<String>, line_data: Vec<u32>) -> Self {
        Self { name: name.into(), line_data }
    }

    /// Total dialogue lines spoken across all scenes.
    pub fn line_count(&self) -> u64 {
        self.line_data.iter().map(|&n| u64::from(n)).sum()
    }
}

/// One movie of the corpus. Built once by the loader and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub imdb_id: String,
    pub title: String,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub director: Option<String>,
    pub rating: Option<f32>,
    pub bechdel_score: Option<i32>,
    pub oscar_winner: Option<bool>,
    /// `None` when the movie has no IMDb cast data at all.
    pub imdb_cast: Option<CastDirectory>,
    /// Screenplay characters in file order.
    pub characters: Vec<Character>,
}

impl Movie {
    /// A movie carrying only a title, cast and characters. Metadata fields stay empty.
    pub fn new(
        title: impl Into<String>,
        imdb_cast: Option<CastDirectory>,
        characters: Vec<Character>,
    ) -> Self {
        Self {
            imdb_id: String::new(),
            title: title.into(),
            year: None,
            genres: Vec::new(),
            director: None,
            rating: None,
            bechdel_score: None,
            oscar_winner: None,
            imdb_cast,
            characters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_count_sums_scenes() {
        let c = Character::new("SARAH CONNOR", vec![3, 0, 9]);
        assert_eq!(c.line_count(), 12);
        assert_eq!(Character::new("EXTRA", vec![]).line_count(), 0);
    }

    #[test]
    fn gender_codes() {
        assert_eq!(Gender::from_code("F"), Gender::Female);
        assert_eq!(Gender::from_code(" M "), Gender::Male);
        assert!(!Gender::from_code("None").is_known());
        assert_eq!(Gender::from_code("?").code(), "?");
    }
}
