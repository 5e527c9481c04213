//! CLI Exit Code Registry
//!
//! Single source of truth for `xcheck` exit codes. Exit codes are part of
//! the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-9     | plan             | Plan parsing / wizard validation codes   |
//! | 40-49   | api              | Service auth/network codes               |

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Plan (3-9)
// =============================================================================

/// The plan file is not valid TOML or misses required sections.
pub const EXIT_PLAN_PARSE: u8 = 3;

/// A wizard step guard rejected the plan (validation failure).
pub const EXIT_PLAN_BLOCKED: u8 = 4;

/// The plan references a sheet or column the file does not have.
pub const EXIT_PLAN_INVALID: u8 = 5;

// =============================================================================
// API (40-49)
// =============================================================================

/// Not authenticated (no saved session, or token rejected).
pub const EXIT_API_NOT_AUTH: u8 = 40;

/// Server returned a validation error (bad request, unprocessable entity).
pub const EXIT_API_VALIDATION: u8 = 41;

/// Network or HTTP error communicating with the service.
pub const EXIT_API_NETWORK: u8 = 42;

/// Response from the service could not be parsed.
pub const EXIT_API_PARSE: u8 = 43;
