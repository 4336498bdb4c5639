// File: src/core/graph.rs
use crate::core::types::Movie;
use crate::fuzzy::align::AlignmentPolicy;

/// Candidate alignments for one movie: character name -> cast keys the policy accepted.
///
/// Rows keep the screenplay's character order and each row keeps the cast
/// directory's key order. Characters without any candidate are not rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateGraph {
    rows: Vec<(String, Vec<String>)>,
}

impl CandidateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `policy` to every (character, cast key) pair of the movie.
    pub fn build(movie: &Movie, policy: &dyn AlignmentPolicy) -> Self {
        let mut graph = Self::new();
        let Some(cast) = movie.imdb_cast.as_ref() else {
            return graph;
        };

        for character in &movie.characters {
            let candidates: Vec<String> = cast
                .keys()
                .filter(|key| policy.aligns(key, &character.name))
                .map(str::to_string)
                .collect();
            graph.insert(character.name.clone(), candidates);
        }
        graph
    }

    /// Adds a row. An empty candidate list leaves the graph unchanged.
    pub fn insert(&mut self, character: impl Into<String>, candidates: Vec<String>) {
        if candidates.is_empty() {
            return;
        }
        self.rows.push((character.into(), candidates));
    }

    pub fn candidates(&self, character: &str) -> Option<&[String]> {
        self.rows
            .iter()
            .find(|(name, _)| name == character)
            .map(|(_, candidates)| candidates.as_slice())
    }

    pub fn contains(&self, character: &str) -> bool {
        self.candidates(character).is_some()
    }

    /// Number of characters with at least one candidate.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.rows.iter().map(|(name, candidates)| (name.as_str(), candidates.as_slice()))
    }
}

impl<C: Into<String>, K: Into<String>> FromIterator<(C, Vec<K>)> for CandidateGraph {
    fn from_iter<I: IntoIterator<Item = (C, Vec<K>)>>(iter: I) -> Self {
        let mut graph = Self::new();
        for (character, candidates) in iter {
            graph.insert(character, candidates.into_iter().map(Into::into).collect());
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cast::CastDirectory;
    use crate::core::types::Character;
    use crate::fuzzy::align::SubstringAlign;

    #[test]
    fn build_keeps_character_and_cast_order() {
        let cast = CastDirectory::build(&[
            "Sarah Connor | Linda Hamilton (F)",
            "Sarah | Extra Actor (F)",
            "Kyle Reese | Michael Biehn (M)",
        ])
        .unwrap();
        let movie = Movie::new(
            "The Terminator",
            cast,
            vec![
                Character::new("KYLE", vec![4]),
                Character::new("SARAH", vec![12]),
                Character::new("COP", vec![1]),
            ],
        );

        let graph = CandidateGraph::build(&movie, &SubstringAlign);
        let rows: Vec<_> = graph.rows().map(|(name, c)| (name, c.to_vec())).collect();
        assert_eq!(
            rows,
            vec![
                ("KYLE", vec!["kyle reese".to_string()]),
                ("SARAH", vec!["sarah connor".to_string(), "sarah".to_string()]),
            ]
        );
        assert!(!graph.contains("COP"));
    }

    #[test]
    fn movie_without_cast_yields_empty_graph() {
        let movie = Movie::new("No Cast", None, vec![Character::new("A", vec![1])]);
        assert!(CandidateGraph::build(&movie, &SubstringAlign).is_empty());
    }
}
