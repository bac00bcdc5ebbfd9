pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod resolver;

pub use classifier::{render, Classification, LibraryClassifier};
pub use error::{Result, ScanError};
