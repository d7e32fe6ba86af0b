//! Standard exit codes (BSD sysexits.h compatible)

/// Successful termination
pub const OK: i32 = 0;

/// Command line usage error
pub const USAGE: i32 = 64;

/// Data format error: rejected edit, malformed seed, inconsistent tree
pub const DATAERR: i32 = 65;

/// Cannot open input (seed file)
pub const NOINPUT: i32 = 66;

/// Configuration error
pub const CONFIG: i32 = 78;
