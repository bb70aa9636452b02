//! Dispatcher configuration.

use hashfuncs_error::{HashError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Batches with at least this many rows are hashed on the rayon pool.
pub const DEFAULT_PARALLEL_ROW_THRESHOLD: usize = 16_384;
/// Rows per parallel work item.
pub const DEFAULT_PARALLEL_CHUNK_ROWS: usize = 4_096;

/// Tuning knobs for [`crate::HashEngine`].
///
/// None of these affect digests or validity; they only choose how the work
/// is scheduled and how a single-row result is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Minimum row count for the parallel path. `usize::MAX` disables it.
    pub parallel_row_threshold: usize,
    /// Rows handed to each parallel task.
    pub parallel_chunk_rows: usize,
    /// Represent a one-row result as a constant.
    pub collapse_single_row: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            parallel_row_threshold: DEFAULT_PARALLEL_ROW_THRESHOLD,
            parallel_chunk_rows: DEFAULT_PARALLEL_CHUNK_ROWS,
            collapse_single_row: true,
        }
    }
}

impl DispatchConfig {
    /// Configuration that never uses the parallel path.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel_row_threshold: usize::MAX,
            ..Self::default()
        }
    }

    /// Whether a batch of `rows` rows takes the parallel path.
    #[must_use]
    pub const fn use_parallel(&self, rows: usize) -> bool {
        rows >= self.parallel_row_threshold && rows > self.parallel_chunk_rows
    }

    /// # Errors
    ///
    /// Returns [`HashError::InvalidConfig`] if a threshold or chunk size is
    /// zero.
    pub fn validate(&self) -> Result<()> {
        if self.parallel_row_threshold == 0 {
            return Err(HashError::invalid_config(
                "parallel_row_threshold must be at least 1",
            ));
        }
        if self.parallel_chunk_rows == 0 {
            return Err(HashError::invalid_config(
                "parallel_chunk_rows must be at least 1",
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidConfig`] on malformed JSON, unknown fields
    /// or values rejected by [`DispatchConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| HashError::invalid_config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidConfig`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| HashError::invalid_config(err.to_string()))
    }

    /// Defaults overridden by environment variables.
    ///
    /// Reads:
    /// - `HASHFUNCS_PARALLEL_THRESHOLD`: row count, or `off` to disable
    /// - `HASHFUNCS_PARALLEL_CHUNK_ROWS`: rows per parallel task
    /// - `HASHFUNCS_COLLAPSE_SINGLE_ROW`: `0`/`false` to keep one-row results dense
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidConfig`] if a variable is set but
    /// unparsable, or the result fails validation.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup("HASHFUNCS_PARALLEL_THRESHOLD") {
            config.parallel_row_threshold = if raw.eq_ignore_ascii_case("off") {
                usize::MAX
            } else {
                parse_env("HASHFUNCS_PARALLEL_THRESHOLD", &raw)?
            };
        }
        if let Some(raw) = lookup("HASHFUNCS_PARALLEL_CHUNK_ROWS") {
            config.parallel_chunk_rows = parse_env("HASHFUNCS_PARALLEL_CHUNK_ROWS", &raw)?;
        }
        if let Some(raw) = lookup("HASHFUNCS_COLLAPSE_SINGLE_ROW") {
            config.collapse_single_row = match raw.to_ascii_lowercase().as_str() {
                "1" | "true" => true,
                "0" | "false" => false,
                _ => {
                    return Err(HashError::invalid_config(format!(
                        "HASHFUNCS_COLLAPSE_SINGLE_ROW must be true or false, got '{raw}'"
                    )));
                }
            };
        }

        config.validate()?;
        info!(
            parallel_row_threshold = config.parallel_row_threshold,
            parallel_chunk_rows = config.parallel_chunk_rows,
            collapse_single_row = config.collapse_single_row,
            "dispatch config loaded from environment"
        );
        Ok(config)
    }
}

fn parse_env(name: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .map_err(|_| HashError::invalid_config(format!("{name} must be a row count, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = DispatchConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.collapse_single_row);
        assert!(!config.use_parallel(10));
        assert!(config.use_parallel(DEFAULT_PARALLEL_ROW_THRESHOLD));
        assert!(!DispatchConfig::sequential().use_parallel(usize::MAX - 1));
    }

    #[test]
    fn zero_values_rejected() {
        let config = DispatchConfig {
            parallel_chunk_rows: 0,
            ..DispatchConfig::default()
        };
        let err = config.validate().expect_err("zero chunk");
        assert_eq!(
            err.to_string(),
            "invalid configuration: parallel_chunk_rows must be at least 1"
        );
    }

    #[test]
    fn json_partial_document_uses_defaults() {
        let config = DispatchConfig::from_json(r#"{"collapse_single_row": false}"#)
            .expect("valid json");
        assert!(!config.collapse_single_row);
        assert_eq!(config.parallel_row_threshold, DEFAULT_PARALLEL_ROW_THRESHOLD);

        let round = DispatchConfig::from_json(&config.to_json().expect("serialize"))
            .expect("round trip");
        assert_eq!(round, config);
    }

    #[test]
    fn json_rejects_unknown_fields_and_zero() {
        assert!(DispatchConfig::from_json(r#"{"threads": 4}"#).is_err());
        assert!(DispatchConfig::from_json(r#"{"parallel_row_threshold": 0}"#).is_err());
        assert!(DispatchConfig::from_json("not json").is_err());
    }

    #[test]
    fn env_overrides() {
        let config = DispatchConfig::from_lookup(lookup(&[
            ("HASHFUNCS_PARALLEL_THRESHOLD", "100"),
            ("HASHFUNCS_PARALLEL_CHUNK_ROWS", " 10 "),
            ("HASHFUNCS_COLLAPSE_SINGLE_ROW", "FALSE"),
        ]))
        .expect("valid env");
        assert_eq!(config.parallel_row_threshold, 100);
        assert_eq!(config.parallel_chunk_rows, 10);
        assert!(!config.collapse_single_row);

        let off = DispatchConfig::from_lookup(lookup(&[("HASHFUNCS_PARALLEL_THRESHOLD", "off")]))
            .expect("off");
        assert_eq!(off.parallel_row_threshold, usize::MAX);

        assert_eq!(
            DispatchConfig::from_lookup(lookup(&[])).expect("empty env"),
            DispatchConfig::default()
        );
    }

    #[test]
    fn env_rejects_garbage() {
        let err = DispatchConfig::from_lookup(lookup(&[("HASHFUNCS_PARALLEL_THRESHOLD", "many")]))
            .expect_err("not a number");
        assert!(err.to_string().contains("HASHFUNCS_PARALLEL_THRESHOLD"));
        assert!(
            DispatchConfig::from_lookup(lookup(&[("HASHFUNCS_COLLAPSE_SINGLE_ROW", "maybe")]))
                .is_err()
        );
    }
}
