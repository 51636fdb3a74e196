// crates/fleetcheck-config/src/error.rs
// ============================================================================
// Module: Config Errors
// Description: Typed failures for inventory and catalog loading.
// Purpose: Give the CLI a stable taxonomy for fatal setup failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every loading failure is one of three kinds: the file could not be read,
//! the YAML could not be parsed, or the parsed content violates a validation
//! rule. All three are fatal before execution starts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Config Errors
// ============================================================================

/// Operator file loading failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path of the file that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid YAML for the expected schema.
    #[error("cannot parse {path}: {source}")]
    Parse {
        /// Path of the file that failed to parse.
        path: String,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },
    /// The parsed content violates a validation rule.
    #[error("invalid {path}: {reason}")]
    Invalid {
        /// Path of the offending file.
        path: String,
        /// Violated rule.
        reason: String,
    },
}
