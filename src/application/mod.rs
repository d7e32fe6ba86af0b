//! Application layer: session state and seed loading
//!
//! This layer holds the caller side of the engine: the current tree, its
//! baseline and the pending per-node inputs.

pub mod error;
pub mod error_ext;
pub mod seed;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use seed::{demo_seed, load_seed, parse_seed, SeedFormat};
pub use services::{parse_magnitude, Row, Session};
