//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args)               |
//! | 10-19   | store            | Preference store (gsettings) failures    |

use mousespeed_core::{CommandFailure, StoreError};

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure (e.g. terminal setup for the panel).
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments (clap reports its own parse errors with this code too).
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Store (10-19)
// =============================================================================

/// Store program not found (not installed, wrong --program).
pub const EXIT_STORE_NOT_FOUND: u8 = 10;

/// Store program ran and exited non-zero (unknown schema/key, read-only key).
pub const EXIT_STORE_FAILED: u8 = 11;

/// Store program printed something that is not a number.
pub const EXIT_STORE_PARSE: u8 = 12;

/// Store program could not be spawned for another reason.
pub const EXIT_STORE_IO: u8 = 13;

/// Map a StoreError to its exit code.
pub fn store_exit_code(err: &StoreError) -> u8 {
    match err {
        StoreError::CommandFailed(CommandFailure::NotFound) => EXIT_STORE_NOT_FOUND,
        StoreError::CommandFailed(CommandFailure::Exit { .. }) => EXIT_STORE_FAILED,
        StoreError::CommandFailed(CommandFailure::Io(_)) => EXIT_STORE_IO,
        StoreError::ParseError(_) => EXIT_STORE_PARSE,
    }
}
