//! Command implementations for the trackfill CLI.

pub mod generate;
pub mod values;

pub use generate::{GenerateCommand, GenerateConfig, GenerateStats};
pub use values::{ValuesCommand, ValuesStats};
