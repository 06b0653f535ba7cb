pub mod actions;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use actions::body_text;
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
