//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain      | Description                               |
//! |---------|-------------|-------------------------------------------|
//! | 0       | Universal   | Success                                   |
//! | 1       | Universal   | General error (unspecified)               |
//! | 2       | Universal   | CLI usage error (bad args, missing file)  |
//! | 10-19   | config/auth | Configuration and credential codes        |
//! | 20-29   | catalog     | Catalog REST codes                        |
//! | 30-39   | policy      | Policy file codes                         |
//! | 40-49   | commit      | Reconciliation commit codes               |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use permsync_engine::CatalogError;

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
// Config / auth (10-19)
// =============================================================================

/// Configuration file missing, unreadable, or malformed.
pub const EXIT_CONFIG: u8 = 10;

/// Not authenticated (no credentials given and no cached token).
pub const EXIT_NOT_AUTH: u8 = 11;

/// Credentials rejected by the server (401/403).
pub const EXIT_AUTH: u8 = 12;

// =============================================================================
// Catalog (20-29)
// =============================================================================

/// The base catalog object does not exist.
pub const EXIT_CATALOG_NOT_FOUND: u8 = 20;

/// Network/transport error talking to the catalog server.
pub const EXIT_CATALOG_NETWORK: u8 = 21;

// =============================================================================
// Policy (30-39)
// =============================================================================

/// Policy file missing or malformed JSON.
pub const EXIT_POLICY_FORMAT: u8 = 30;

// =============================================================================
// Commit (40-49)
// =============================================================================

/// The commit fixed point left unrecoverable failures.
pub const EXIT_COMMIT_FAILED: u8 = 40;

/// Map a CatalogError to its exit code.
pub fn catalog_exit_code(err: &CatalogError) -> u8 {
    match err {
        CatalogError::NotFound(_) => EXIT_CATALOG_NOT_FOUND,
        CatalogError::Unauthorized | CatalogError::Forbidden => EXIT_AUTH,
        CatalogError::Transport(_) => EXIT_CATALOG_NETWORK,
        CatalogError::Conflict(_) | CatalogError::Http(..) | CatalogError::Parse(_) => {
            EXIT_CATALOG_NETWORK
        }
        CatalogError::Policy(_) => EXIT_POLICY_FORMAT,
        CatalogError::Io(_) => EXIT_ERROR,
    }
}
