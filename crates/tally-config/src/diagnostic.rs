// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration error diagnostics rendered via miette.
//!
//! Figment deserialization errors and semantic validation failures are
//! converted into [`ConfigError`] values so the binary can render them all
//! at once instead of failing on the first problem.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error with diagnostic metadata.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A TOML/env deserialization error reported by Figment.
    #[error("{message}")]
    #[diagnostic(
        code(tally::config::parse),
        help("check tally.toml and TALLY_* environment variables")
    )]
    Parse {
        /// Figment's rendered error, including the offending key path.
        message: String,
    },

    /// A semantic validation error for a config value.
    #[error("validation error: {message}")]
    #[diagnostic(code(tally::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },
}

/// Convert a Figment error into one [`ConfigError::Parse`] per underlying error.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter()
        .map(|e| ConfigError::Parse {
            message: e.to_string(),
        })
        .collect()
}

/// Render all collected config errors to stderr as miette reports.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        eprintln!(
            "{:?}",
            miette::Report::msg(format!("invalid configuration: {error}"))
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figment_error_converts_to_parse_errors() {
        let err = crate::loader::load_config_from_str("[tasks]\nmax_pending = \"lots\"")
            .expect_err("type mismatch should fail");
        let errors = figment_to_config_errors(err);
        assert!(!errors.is_empty());
        assert!(matches!(errors[0], ConfigError::Parse { .. }));
    }

    #[test]
    fn validation_error_renders_message() {
        let err = ConfigError::Validation {
            message: "tasks.max_pending must be at least 1".to_string(),
        };
        assert!(err.to_string().contains("max_pending"));
    }
}
