//! Exit codes for the CLI.
//!
//! These follow common Unix conventions and provide meaningful
//! status information for scripting and automation.

/// Successful execution
pub const SUCCESS: u8 = 0;

/// General/unspecified error
pub const GENERAL_ERROR: u8 = 1;

// 2 is reserved for usage errors, which clap reports on its own.

/// The server could not start (serving directory or port unavailable)
pub const STARTUP_FAILED: u8 = 3;
