//! Process exit codes

/// Successful termination
pub const OK: i32 = 0;

/// Backend operation failed (remote call error, missing logs, unsupported operation)
pub const FAILURE: i32 = 1;

/// Command line usage error (unknown command, missing argument)
pub const USAGE: i32 = 2;
