//! Utility functions

mod sanitize;

pub use sanitize::sanitize_filename;
