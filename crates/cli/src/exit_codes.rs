//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-9     | resolve          | Resolution pipeline codes                |
//! | 10-19   | query            | Lookup codes                             |
//! | 20-29   | oracle           | Oracle configuration codes               |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

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
// Resolve (3-9)
// =============================================================================

/// Project config cannot be read, parsed or validated.
pub const EXIT_CONFIG_INVALID: u8 = 3;

/// A candidate table could not be loaded (missing file or columns).
pub const EXIT_RESOLVE_INPUT: u8 = 4;

/// The resolved table could not be written.
pub const EXIT_RESOLVE_WRITE: u8 = 5;

/// `--fail-on-fallback` and at least one group took the fallback path.
pub const EXIT_RESOLVE_FALLBACK: u8 = 6;

// =============================================================================
// Query (10-19)
// =============================================================================

/// The query matched nothing in any loaded country.
pub const EXIT_QUERY_NOT_FOUND: u8 = 10;

/// The query was blank after trimming.
pub const EXIT_QUERY_EMPTY: u8 = 11;

/// No country table could be loaded; every country was skipped.
pub const EXIT_QUERY_NO_DATA: u8 = 12;

// =============================================================================
// Oracle (20-29)
// =============================================================================

/// Oracle disabled (provider=none); informational for `oracle doctor`.
pub const EXIT_ORACLE_DISABLED: u8 = 20;

/// Oracle provider configured but API key missing.
pub const EXIT_ORACLE_MISSING_KEY: u8 = 21;

/// `oracle doctor --test` could not get an answer from the backend.
pub const EXIT_ORACLE_UNREACHABLE: u8 = 22;
