//! Exit code constants for the poml CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unreadable input, invalid config)
//! - 2: Validation failure (structural pre-check found problems)
//! - 3: Parse failure (malformed markup, unknown tag, unterminated expression)
//! - 4: Data failure (missing/unsupported/unparseable data source, duplicate binding)
//! - 5: Template failure (unresolved binding, invalid iteration target)
//! - 6: Render pass cancelled or past its deadline

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unreadable files, or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// Validation failure: missing root tags or missing referenced files.
pub const VALIDATION_FAILURE: i32 = 2;

/// Parse failure: the markup could not be turned into a document tree.
pub const PARSE_FAILURE: i32 = 3;

/// Data failure: a data source could not be resolved into a bound value.
pub const DATA_FAILURE: i32 = 4;

/// Template failure: an expression could not be expanded.
pub const TEMPLATE_FAILURE: i32 = 5;

/// The render pass was cancelled or exceeded its deadline.
pub const CANCELLED: i32 = 6;
