pub mod candidate;
pub mod library;
pub mod render;

pub use candidate::{derive_candidate, CandidateName, SkipKind, Skipped};
pub use library::{Classification, LibraryClassifier, ScanStats};
pub use render::{render, render_wrapped};
