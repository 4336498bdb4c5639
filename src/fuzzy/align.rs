// File: src/fuzzy/align.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Jaro-Winkler score a pair of names must reach under the threshold policy.
pub const DEFAULT_THRESHOLD: f64 = 0.85;

/// Decides whether a screenplay character name plausibly refers to an IMDb cast name.
///
/// Policies see name text only. They hold no mutable state, so one value can be
/// shared across movies and swapped without touching the resolver or the aggregator.
pub trait AlignmentPolicy: Send + Sync {
    /// Short label used in logs and reports.
    fn name(&self) -> &'static str;

    /// Graded similarity in `[0, 1]`.
    fn score(&self, imdb_name: &str, character_name: &str) -> f64;

    fn aligns(&self, imdb_name: &str, character_name: &str) -> bool;
}

/// Accepts when either lower-cased name contains the other ("sarah" ~ "sarah connor").
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringAlign;

/// Accepts when the Jaro-Winkler similarity of the lower-cased names, or of their
/// closest pair of words, meets a threshold.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdAlign {
    threshold: f64,
}

/// Substring OR threshold. Never rejects a pair either of the other two accepts.
#[derive(Debug, Clone, Copy)]
pub struct BlendedAlign {
    threshold: ThresholdAlign,
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn is_substring_pair(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}

/// Best Jaro-Winkler score between any word of `a` and any word of `b`.
/// Screenplays often name a character by surname alone ("REESE" for "kyle reese").
fn best_token_score(a: &str, b: &str) -> f64 {
    a.split_whitespace()
        .flat_map(|x| b.split_whitespace().map(move |y| strsim::jaro_winkler(x, y)))
        .fold(0.0, f64::max)
}

impl AlignmentPolicy for SubstringAlign {
    fn name(&self) -> &'static str {
        "substring"
    }

    fn score(&self, imdb_name: &str, character_name: &str) -> f64 {
        if self.aligns(imdb_name, character_name) {
            1.0
        } else {
            0.0
        }
    }

    fn aligns(&self, imdb_name: &str, character_name: &str) -> bool {
        is_substring_pair(&normalize(imdb_name), &normalize(character_name))
    }
}

impl ThresholdAlign {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for ThresholdAlign {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl AlignmentPolicy for ThresholdAlign {
    fn name(&self) -> &'static str {
        "threshold"
    }

    fn score(&self, imdb_name: &str, character_name: &str) -> f64 {
        let (a, b) = (normalize(imdb_name), normalize(character_name));
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        strsim::jaro_winkler(&a, &b).max(best_token_score(&a, &b))
    }

    fn aligns(&self, imdb_name: &str, character_name: &str) -> bool {
        self.score(imdb_name, character_name) >= self.threshold
    }
}

impl BlendedAlign {
    pub fn new(threshold: f64) -> Self {
        Self { threshold: ThresholdAlign::new(threshold) }
    }
}

impl Default for BlendedAlign {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl AlignmentPolicy for BlendedAlign {
    fn name(&self) -> &'static str {
        "blended"
    }

    fn score(&self, imdb_name: &str, character_name: &str) -> f64 {
        SubstringAlign
            .score(imdb_name, character_name)
            .max(self.threshold.score(imdb_name, character_name))
    }

    fn aligns(&self, imdb_name: &str, character_name: &str) -> bool {
        SubstringAlign.aligns(imdb_name, character_name)
            || self.threshold.aligns(imdb_name, character_name)
    }
}

/// Names the built-in policies so they can be picked from the CLI or a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    Substring,
    Threshold,
    Blended,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Substring, PolicyKind::Threshold, PolicyKind::Blended];

    pub fn build(self, threshold: f64) -> Box<dyn AlignmentPolicy> {
        match self {
            PolicyKind::Substring => Box::new(SubstringAlign),
            PolicyKind::Threshold => Box::new(ThresholdAlign::new(threshold)),
            PolicyKind::Blended => Box::new(BlendedAlign::new(threshold)),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PolicyKind::Substring => "substring",
            PolicyKind::Threshold => "threshold",
            PolicyKind::Blended => "blended",
        };
        f.write_str(label)
    }
}
