//! Hierarchical allocation model.
//!
//! A forest of labeled nodes where every parent's value is the total of its
//! children. Edits set a node's value by percentage or absolute amount; the
//! engine rolls the change up through the ancestors and, for absolute edits
//! on a parent, redistributes the new value across its children.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
