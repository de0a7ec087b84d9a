//! CLI command implementations
//!
//! Each command returns the process exit code:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success, or the queue was empty |
//! | 1 | Some messages were skipped or some inserts failed |
//! | 2 | Configuration error |
//! | 3 | Ambiguous pseudonym (`reverse`) |
//! | 4 | Queue or database connection error |
//! | 5 | Fatal error during the run |

pub mod reverse;
pub mod run;
pub mod validate;

/// Exit code for configuration errors
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Exit code for connection errors
pub const EXIT_CONNECTION_ERROR: i32 = 4;

/// Exit code for fatal errors
pub const EXIT_FATAL: i32 = 5;
