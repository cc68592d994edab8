//! Output rendering and writing.

pub mod generator;

pub use generator::{render, write_atomic};
