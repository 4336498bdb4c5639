// File: src/core/resolver.rs
use crate::core::graph::CandidateGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Upper bound on search steps per movie before the resolver gives up.
pub const DEFAULT_MAX_SEARCH_STEPS: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no character has a candidate cast key")]
    NoCandidates,

    #[error("no assignment gives every aligned character its own cast key")]
    NoInjectiveAssignment,

    #[error("search gave up after {steps} steps")]
    SearchBudgetExhausted { steps: usize },
}

/// How strictly the resolver enforces one cast key per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// Keep the largest consistent partial assignment; characters that cannot
    /// get a free key stay unassigned.
    Soft,
    /// Every aligned character must get a distinct key, or the movie fails.
    Hard,
}

impl ResolveMode {
    pub const ALL: [ResolveMode; 2] = [ResolveMode::Soft, ResolveMode::Hard];
}

impl fmt::Display for ResolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResolveMode::Soft => "soft",
            ResolveMode::Hard => "hard",
        })
    }
}

/// The final per-movie choice: character name -> cast key, in graph row order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    pairs: Vec<(String, String)>,
}

impl Assignment {
    pub fn get(&self, character: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(name, _)| name == character)
            .map(|(_, key)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.pairs.iter().map(|(name, key)| (name.as_str(), key.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// True when no two characters share a cast key.
    pub fn is_injective(&self) -> bool {
        let mut seen = HashSet::new();
        self.pairs.iter().all(|(_, key)| seen.insert(key.as_str()))
    }
}

/// Turns a candidate graph into an assignment by depth-first backtracking.
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    mode: ResolveMode,
    max_steps: usize,
}

impl Resolver {
    pub fn new(mode: ResolveMode) -> Self {
        Self { mode, max_steps: DEFAULT_MAX_SEARCH_STEPS }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn mode(&self) -> ResolveMode {
        self.mode
    }

    pub fn resolve(&self, graph: &CandidateGraph) -> Result<Assignment, ResolveError> {
        if graph.is_empty() {
            return Err(ResolveError::NoCandidates);
        }
        let rows: Vec<(&str, &[String])> = graph.rows().collect();
        let search = Search::new(&rows, self.mode == ResolveMode::Soft);

        match self.mode {
            ResolveMode::Hard => search.first_complete(self.max_steps),
            ResolveMode::Soft => Ok(search.largest_partial(self.max_steps)),
        }
    }
}

/// Explicit work-stack search over "row index -> option index".
///
/// Row `i` has one option per candidate and, when skipping is allowed, one extra
/// trailing option meaning "leave this character unassigned".
struct Search<'a> {
    rows: &'a [(&'a str, &'a [String])],
    allow_skip: bool,
    /// Next option to try at each depth.
    cursor: Vec<usize>,
    /// Candidate chosen at each depth above the current one; `None` = skipped.
    chosen: Vec<Option<usize>>,
    claimed: HashSet<&'a str>,
    assigned: usize,
    depth: usize,
    steps: usize,
}

/// Outcome of one move of the search.
enum Step {
    Descended,
    Leaf,
    Exhausted,
}

impl<'a> Search<'a> {
    fn new(rows: &'a [(&'a str, &'a [String])], allow_skip: bool) -> Self {
        Self {
            rows,
            allow_skip,
            cursor: vec![0; rows.len()],
            chosen: vec![None; rows.len()],
            claimed: HashSet::new(),
            assigned: 0,
            depth: 0,
            steps: 0,
        }
    }

    fn first_complete(mut self, max_steps: usize) -> Result<Assignment, ResolveError> {
        loop {
            if self.steps >= max_steps {
                warn!(steps = self.steps, "hard assignment search exhausted its budget");
                return Err(ResolveError::SearchBudgetExhausted { steps: self.steps });
            }
            match self.advance() {
                Step::Leaf => return Ok(self.snapshot()),
                Step::Descended => {}
                Step::Exhausted => return Err(ResolveError::NoInjectiveAssignment),
            }
        }
    }

    fn largest_partial(mut self, max_steps: usize) -> Assignment {
        let mut best: Option<(usize, Assignment)> = None;
        loop {
            if let Some((best_count, _)) = &best {
                if self.steps >= max_steps {
                    warn!(steps = self.steps, "soft assignment search stopped at its budget");
                    break;
                }
                // Even assigning every remaining row cannot beat the best so far.
                if self.assigned + (self.rows.len() - self.depth) <= *best_count {
                    if !self.backtrack() {
                        break;
                    }
                    continue;
                }
            }
            match self.advance() {
                Step::Leaf => {
                    if best.as_ref().map_or(true, |(count, _)| self.assigned > *count) {
                        best = Some((self.assigned, self.snapshot()));
                    }
                    if self.assigned == self.rows.len() || !self.backtrack() {
                        break;
                    }
                }
                Step::Descended => {}
                Step::Exhausted => break,
            }
        }
        best.map(|(_, assignment)| assignment).unwrap_or_default()
    }

    /// Tries the next free option at the current depth, descending on success and
    /// backtracking on a dead end.
    fn advance(&mut self) -> Step {
        self.steps += 1;
        if self.depth == self.rows.len() {
            return Step::Leaf;
        }

        let candidates = self.rows[self.depth].1;
        let option_count = candidates.len() + usize::from(self.allow_skip);

        while self.cursor[self.depth] < option_count {
            let option = self.cursor[self.depth];
            self.cursor[self.depth] += 1;

            if option == candidates.len() {
                self.chosen[self.depth] = None;
                return self.descend();
            }
            let key = candidates[option].as_str();
            if self.claimed.insert(key) {
                self.chosen[self.depth] = Some(option);
                self.assigned += 1;
                return self.descend();
            }
        }

        if self.backtrack() {
            Step::Descended
        } else {
            Step::Exhausted
        }
    }

    fn descend(&mut self) -> Step {
        self.depth += 1;
        if self.depth == self.rows.len() {
            return Step::Leaf;
        }
        self.cursor[self.depth] = 0;
        Step::Descended
    }

    /// Undoes the decision of the most recently decided row so its next option
    /// can be tried. Returns false when there is nothing left to undo.
    fn backtrack(&mut self) -> bool {
        if self.depth < self.rows.len() {
            self.cursor[self.depth] = 0;
        }
        if self.depth == 0 {
            return false;
        }
        self.depth -= 1;
        if let Some(option) = self.chosen[self.depth].take() {
            self.claimed.remove(self.rows[self.depth].1[option].as_str());
            self.assigned -= 1;
        }
        true
    }

    fn snapshot(&self) -> Assignment {
        let pairs = self
            .rows
            .iter()
            .zip(&self.chosen)
            .filter_map(|((name, candidates), chosen)| {
                chosen.map(|option| (name.to_string(), candidates[option].clone()))
            })
            .collect();
        Assignment { pairs }
    }
}
