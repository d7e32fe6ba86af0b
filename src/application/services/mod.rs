//! Application services

pub mod session;

pub use session::{parse_magnitude, Row, Session};
