// src/lib.rs

pub mod config;
pub mod core;
pub mod coverage;
pub mod fuzzy;
pub mod loader;
pub mod persistence;
pub mod report;

pub use crate::config::EngineConfig;
pub use crate::core::cast::{CastDirectory, CastError};
pub use crate::core::graph::CandidateGraph;
pub use crate::core::resolver::{Assignment, ResolveError, ResolveMode, Resolver};
pub use crate::core::types::{CastMember, Character, Gender, Movie};
pub use crate::coverage::{alignment_coverage, assignment_coverage, AlignmentTotals, AssignmentTotals};
pub use crate::fuzzy::align::{AlignmentPolicy, BlendedAlign, PolicyKind, SubstringAlign, ThresholdAlign};
pub use crate::loader::{Corpus, LoadError};
