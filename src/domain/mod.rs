//! Domain layer: allocation tree and edit engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod baseline;
pub mod engine;
pub mod error;
pub mod node;
pub mod variance;

pub use baseline::Baseline;
pub use engine::{apply_edit, Edit, EditKind};
pub use error::{DomainError, DomainResult};
pub use node::{Node, RollupViolation, Tree, TreeIter, ROLLUP_TOLERANCE};
pub use variance::{round2, round_whole, variance, Variance};
