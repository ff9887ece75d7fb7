pub mod actions;
pub mod assertions;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use assertions::{assert_error, assert_message};
#[allow(unused_imports)]
pub use mocks::RecordingExecutor;
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
