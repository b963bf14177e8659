// Unit tests for logger initialization
// Only one test installs the global logger; fern cannot be reset in-process.

use crate::logger::initialize;

use log::LevelFilter;

/// **VALUE**: Verifies that calling initialize() more than once is harmless.
///
/// **WHY THIS MATTERS**: Tests and the binary may both reach initialization.
/// A second `apply()` on fern fails because a global logger is already set.
///
/// **BUG THIS CATCHES**: Would catch removal of the Once/AtomicBool guards.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A temporary log directory
    let temp_dir = tempfile::tempdir().unwrap();

    // WHEN: Calling initialize twice
    let first = initialize(Some(temp_dir.path()), Some(LevelFilter::Debug));
    let second = initialize(None, None);

    // THEN: Both succeed and the file exists
    assert!(first.is_ok(), "First initialization should succeed");
    assert!(second.is_ok(), "Second initialization should be a no-op");
    assert!(temp_dir.path().join("extension-server.log").exists());
}
