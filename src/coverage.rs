// File: src/coverage.rs
use crate::core::graph::CandidateGraph;
use crate::core::resolver::Resolver;
use crate::core::types::Movie;
use crate::fuzzy::align::AlignmentPolicy;
use crate::loader::Corpus;
use serde::Serialize;
use std::ops::{Add, AddAssign};
use tracing::{debug, info};

/// Character and line counts for alignment coverage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlignmentTotals {
    pub chars_matched: u64,
    pub chars_missed: u64,
    pub lines_matched: u64,
    pub lines_missed: u64,
}

impl AlignmentTotals {
    pub fn total_chars(&self) -> u64 {
        self.chars_matched + self.chars_missed
    }

    pub fn total_lines(&self) -> u64 {
        self.lines_matched + self.lines_missed
    }
}

impl Add for AlignmentTotals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            chars_matched: self.chars_matched + rhs.chars_matched,
            chars_missed: self.chars_missed + rhs.chars_missed,
            lines_matched: self.lines_matched + rhs.lines_matched,
            lines_missed: self.lines_missed + rhs.lines_missed,
        }
    }
}

impl AddAssign for AlignmentTotals {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Per-file and per-character counts for assignment coverage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssignmentTotals {
    pub files_succeeded: u64,
    pub files_failed: u64,
    pub chars_matched: u64,
    pub chars_missed: u64,
    pub lines_matched: u64,
    pub lines_missed: u64,
    pub chars_gendered: u64,
}

impl AssignmentTotals {
    pub fn total_files(&self) -> u64 {
        self.files_succeeded + self.files_failed
    }

    pub fn total_chars(&self) -> u64 {
        self.chars_matched + self.chars_missed
    }

    pub fn total_lines(&self) -> u64 {
        self.lines_matched + self.lines_missed
    }
}

impl Add for AssignmentTotals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            files_succeeded: self.files_succeeded + rhs.files_succeeded,
            files_failed: self.files_failed + rhs.files_failed,
            chars_matched: self.chars_matched + rhs.chars_matched,
            chars_missed: self.chars_missed + rhs.chars_missed,
            lines_matched: self.lines_matched + rhs.lines_matched,
            lines_missed: self.lines_missed + rhs.lines_missed,
            chars_gendered: self.chars_gendered + rhs.chars_gendered,
        }
    }
}

impl AddAssign for AssignmentTotals {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Counts, over the whole corpus, the characters that align with at least one
/// IMDb cast key under `policy`, and the lines those characters speak.
pub fn alignment_coverage(corpus: &Corpus, policy: &dyn AlignmentPolicy) -> AlignmentTotals {
    let totals = corpus
        .iter()
        .map(|movie| movie_alignment_coverage(movie, policy))
        .fold(AlignmentTotals::default(), Add::add);
    info!(policy = policy.name(), ?totals, "alignment coverage done");
    totals
}

pub fn movie_alignment_coverage(movie: &Movie, policy: &dyn AlignmentPolicy) -> AlignmentTotals {
    let mut totals = AlignmentTotals::default();
    for character in &movie.characters {
        let aligned = movie.imdb_cast.as_ref().map_or(false, |cast| {
            cast.keys().any(|key| policy.aligns(key, &character.name))
        });
        if aligned {
            totals.chars_matched += 1;
            totals.lines_matched += character.line_count();
        } else {
            totals.chars_missed += 1;
            totals.lines_missed += character.line_count();
        }
    }
    totals
}

/// Aligns every movie under `policy`, resolves the candidate graph with
/// `resolver`, and counts files, characters, lines and gendered characters.
///
/// A movie whose graph cannot be resolved is a failed file. That is an expected
/// outcome and never surfaces as an error.
pub fn assignment_coverage(
    corpus: &Corpus,
    policy: &dyn AlignmentPolicy,
    resolver: &Resolver,
) -> AssignmentTotals {
    let totals = corpus
        .iter()
        .map(|movie| movie_assignment_coverage(movie, policy, resolver))
        .fold(AssignmentTotals::default(), Add::add);
    info!(
        policy = policy.name(),
        mode = %resolver.mode(),
        ?totals,
        "assignment coverage done"
    );
    totals
}

pub fn movie_assignment_coverage(
    movie: &Movie,
    policy: &dyn AlignmentPolicy,
    resolver: &Resolver,
) -> AssignmentTotals {
    let mut totals = AssignmentTotals::default();
    let graph = CandidateGraph::build(movie, policy);

    let mut aligned_chars = 0;
    let mut aligned_lines = 0;
    for character in &movie.characters {
        if graph.contains(&character.name) {
            aligned_chars += 1;
            aligned_lines += character.line_count();
        } else {
            totals.chars_missed += 1;
            totals.lines_missed += character.line_count();
        }
    }

    match resolver.resolve(&graph) {
        Ok(assignment) => {
            if let Some(cast) = movie.imdb_cast.as_ref() {
                totals.chars_gendered = assignment
                    .iter()
                    .filter_map(|(_, key)| cast.get(key))
                    .filter(|member| member.gender.is_known())
                    .count() as u64;
            }
            totals.files_succeeded = 1;
            totals.chars_matched += aligned_chars;
            totals.lines_matched += aligned_lines;
        }
        Err(err) => {
            debug!(title = %movie.title, %err, "no assignment for movie");
            totals.files_failed = 1;
            totals.chars_missed += aligned_chars;
            totals.lines_missed += aligned_lines;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cast::CastDirectory;
    use crate::core::resolver::ResolveMode;
    use crate::core::types::Character;
    use crate::fuzzy::align::SubstringAlign;

    fn terminator() -> Movie {
        Movie::new(
            "The Terminator",
            CastDirectory::build(&[
                "Sarah | Linda Hamilton (F)",
                "Kyle Reese | Michael Biehn (M)",
            ])
            .unwrap(),
            vec![
                Character::new("Sarah Connor", vec![5, 7]),
                Character::new("TRAUCH", vec![2]),
            ],
        )
    }

    #[test]
    fn aligned_character_counts_its_lines() {
        let totals = movie_alignment_coverage(&terminator(), &SubstringAlign);
        assert_eq!(
            totals,
            AlignmentTotals { chars_matched: 1, chars_missed: 1, lines_matched: 12, lines_missed: 2 }
        );
    }

    #[test]
    fn movie_without_cast_misses_everything() {
        let movie = Movie::new(
            "Uncast",
            None,
            vec![
                Character::new("A", vec![1, 1]),
                Character::new("B", vec![3]),
                Character::new("C", vec![]),
            ],
        );
        let totals = movie_alignment_coverage(&movie, &SubstringAlign);
        assert_eq!(
            totals,
            AlignmentTotals { chars_matched: 0, chars_missed: 3, lines_matched: 0, lines_missed: 5 }
        );

        let assigned = movie_assignment_coverage(&movie, &SubstringAlign, &Resolver::new(ResolveMode::Soft));
        assert_eq!(assigned.files_failed, 1);
        assert_eq!(assigned.chars_missed, 3);
        assert_eq!(assigned.lines_missed, 5);
    }

    #[test]
    fn soft_counts_unassigned_candidates_as_matched() {
        let movie = Movie::new(
            "Twins",
            CastDirectory::build(&["X | Some One (M)"]).unwrap(),
            vec![Character::new("X", vec![4]), Character::new("x", vec![6])],
        );

        let soft = movie_assignment_coverage(&movie, &SubstringAlign, &Resolver::new(ResolveMode::Soft));
        assert_eq!(soft.files_succeeded, 1);
        assert_eq!(soft.chars_matched, 2);
        assert_eq!(soft.lines_matched, 10);
        assert_eq!(soft.chars_gendered, 1);

        let hard = movie_assignment_coverage(&movie, &SubstringAlign, &Resolver::new(ResolveMode::Hard));
        assert_eq!(hard.files_failed, 1);
        assert_eq!(hard.chars_matched, 0);
        assert_eq!(hard.chars_missed, 2);
        assert_eq!(hard.lines_missed, 10);
        assert_eq!(hard.chars_gendered, 0);
    }

    #[test]
    fn corpus_totals_add_up_per_movie() {
        let corpus = Corpus::from_movies(vec![terminator(), terminator()]);
        let totals = alignment_coverage(&corpus, &SubstringAlign);
        assert_eq!(totals.total_chars(), 4);
        assert_eq!(totals.lines_matched, 24);

        let assigned = assignment_coverage(&corpus, &SubstringAlign, &Resolver::new(ResolveMode::Hard));
        assert_eq!(assigned.files_succeeded, 2);
        assert_eq!(assigned.chars_matched, 2);
        assert_eq!(assigned.chars_gendered, 2);
        assert_eq!(assigned.chars_missed, 2);
    }
}
