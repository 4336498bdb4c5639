// File: src/persistence.rs
use crate::loader::Corpus;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("could not move snapshot into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Writes a bincode snapshot of the loaded corpus so later runs can skip parsing.
/// The file is written to a temp file next to `path` and renamed over it.
pub fn save_corpus(corpus: &Corpus, path: &Path) -> Result<(), PersistenceError> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        bincode::serialize_into(&mut writer, corpus)?;
        writer.flush()?;
    }

    temp_file.persist(path)?;
    Ok(())
}

pub fn load_corpus(path: &Path) -> Result<Corpus, PersistenceError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(bincode::deserialize_from(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cast::CastDirectory;
    use crate::core::types::{Character, Movie};

    #[test]
    fn snapshot_round_trip_keeps_cast_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("corpus.bin");

        let cast = CastDirectory::build(&["Sarah | A (F)", "Kyle | B (M)", "sarah | C (F)"]).unwrap();
        let corpus = Corpus::from_movies(vec![Movie::new(
            "T",
            cast,
            vec![Character::new("SARAH", vec![1, 2])],
        )]);

        save_corpus(&corpus, &path).unwrap();
        let restored = load_corpus(&path).unwrap();
        assert_eq!(restored, corpus);

        let keys: Vec<_> = restored.get_movie("T").unwrap().imdb_cast.as_ref().unwrap().keys().map(str::to_string).collect();
        assert_eq!(keys, vec!["sarah (a)", "kyle", "sarah (c)"]);
    }

    #[test]
    fn missing_snapshot_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_corpus(&dir.path().join("nope.bin")).unwrap_err();
        assert!(matches!(err, PersistenceError::Io(_)));
    }
}
