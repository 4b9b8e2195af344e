//! Token models: the immutable [`Token`] value, its redacted secrets, and raw provider metadata.

pub mod token;

pub use token::{extra::*, secret::*, *};
