//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - at least one unit succeeded, or nothing was selected
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Validation error - a unit is missing a required field
pub const VALIDATION_ERROR: i32 = 2;

/// Config error - manifest missing, unreadable or inconsistent
pub const CONFIG_ERROR: i32 = 3;

/// Execution error - every unit that ran failed
pub const EXECUTION_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Tool missing - helm or kubectl is not installed
pub const TOOL_MISSING: i32 = 6;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
