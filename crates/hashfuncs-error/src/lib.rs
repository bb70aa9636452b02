use thiserror::Error;

/// Primary error type for hashfuncs operations.
///
/// Failures are total for the call in which they occur: a batch either hashes
/// completely or returns one of these without producing any output rows.
/// NULL rows are never errors; they propagate as invalid output rows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    // === Dispatch Errors ===
    /// The input batch's scalar type is outside the supported set.
    #[error("unsupported type for hashing: {type_name}")]
    UnsupportedType { type_name: String },

    /// Seed column type does not match the algorithm's seed width.
    #[error("seed for {function} must be {expected}, got {actual}")]
    SeedWidthMismatch {
        function: String,
        expected: String,
        actual: String,
    },

    /// Seed column and input column disagree on row count.
    #[error("seed column has {seed} rows but input has {input}")]
    RowCountMismatch { input: usize, seed: usize },

    // === Batch Errors ===
    /// A column batch is internally inconsistent.
    #[error("invalid column batch: {detail}")]
    InvalidBatch { detail: String },

    // === Catalog Errors ===
    /// No hash function with the given name.
    #[error("no such hash function: {name}")]
    UnknownFunction { name: String },

    /// Hash functions take a value and an optional seed.
    #[error("wrong number of arguments to function {function}(): {count}")]
    WrongArgumentCount { function: String, count: usize },

    // === Configuration Errors ===
    /// Dispatch configuration was rejected.
    #[error("invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    // === Input Errors ===
    /// A literal could not be parsed as the requested scalar type.
    #[error("cannot parse '{input}': {detail}")]
    Parse { input: String, detail: String },
}

/// Coarse error classes, used for exit codes and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorKind {
    /// Type not hashable.
    Unsupported = 1,
    /// Calling-boundary contract violated (seed width, row count, arity).
    Misuse = 2,
    /// Malformed batch.
    Format = 3,
    /// Unknown function name.
    NotFound = 4,
    /// Bad configuration value.
    Config = 5,
    /// Bad literal input.
    Parse = 6,
}

impl HashError {
    /// Classify this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedType { .. } => ErrorKind::Unsupported,
            Self::SeedWidthMismatch { .. }
            | Self::RowCountMismatch { .. }
            | Self::WrongArgumentCount { .. } => ErrorKind::Misuse,
            Self::InvalidBatch { .. } => ErrorKind::Format,
            Self::UnknownFunction { .. } => ErrorKind::NotFound,
            Self::InvalidConfig { .. } => ErrorKind::Config,
            Self::Parse { .. } => ErrorKind::Parse,
        }
    }

    /// Whether the caller can fix this without code changes.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedType { .. }
                | Self::SeedWidthMismatch { .. }
                | Self::UnknownFunction { .. }
                | Self::WrongArgumentCount { .. }
                | Self::InvalidConfig { .. }
                | Self::Parse { .. }
        )
    }

    /// Human-friendly suggestion for fixing this error.
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedType { .. } => {
                Some("Cast the value to an integer, float, date, time, text or blob type")
            }
            Self::SeedWidthMismatch { .. } => {
                Some("Cast the seed to UINTEGER for 32-bit seeds or UBIGINT for 64-bit seeds")
            }
            Self::WrongArgumentCount { .. } => Some("Pass a value and an optional seed"),
            Self::UnknownFunction { .. } => Some("Run with --list to see available functions"),
            _ => None,
        }
    }

    /// Get the process exit code for this error (for CLI use).
    pub const fn exit_code(&self) -> i32 {
        self.kind() as i32
    }

    /// Create an unsupported-type error.
    pub fn unsupported(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    /// Create an invalid-batch error.
    pub fn invalid_batch(detail: impl Into<String>) -> Self {
        Self::InvalidBatch {
            detail: detail.into(),
        }
    }

    /// Create an invalid-config error.
    pub fn invalid_config(detail: impl Into<String>) -> Self {
        Self::InvalidConfig {
            detail: detail.into(),
        }
    }

    /// Create a literal parse error.
    pub fn parse(input: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            detail: detail.into(),
        }
    }
}

/// Result type alias using `HashError`.
pub type Result<T> = std::result::Result<T, HashError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unsupported_type() {
        let err = HashError::unsupported("BOOLEAN");
        assert_eq!(err.to_string(), "unsupported type for hashing: BOOLEAN");
    }

    #[test]
    fn display_seed_width_mismatch() {
        let err = HashError::SeedWidthMismatch {
            function: "xxh64".to_owned(),
            expected: "UBIGINT".to_owned(),
            actual: "UINTEGER".to_owned(),
        };
        assert_eq!(err.to_string(), "seed for xxh64 must be UBIGINT, got UINTEGER");
    }

    #[test]
    fn display_row_count_mismatch() {
        let err = HashError::RowCountMismatch { input: 3, seed: 2 };
        assert_eq!(err.to_string(), "seed column has 2 rows but input has 3");
    }

    #[test]
    fn display_catalog_errors() {
        assert_eq!(
            HashError::UnknownFunction {
                name: "md5".to_owned()
            }
            .to_string(),
            "no such hash function: md5"
        );
        assert_eq!(
            HashError::WrongArgumentCount {
                function: "xxh32".to_owned(),
                count: 3
            }
            .to_string(),
            "wrong number of arguments to function xxh32(): 3"
        );
    }

    #[test]
    fn kind_mapping() {
        assert_eq!(HashError::unsupported("X").kind(), ErrorKind::Unsupported);
        assert_eq!(
            HashError::RowCountMismatch { input: 1, seed: 2 }.kind(),
            ErrorKind::Misuse
        );
        assert_eq!(HashError::invalid_batch("x").kind(), ErrorKind::Format);
        assert_eq!(HashError::invalid_config("x").kind(), ErrorKind::Config);
        assert_eq!(HashError::parse("x", "y").kind(), ErrorKind::Parse);
    }

    #[test]
    fn user_recoverable() {
        assert!(HashError::unsupported("BOOLEAN").is_user_recoverable());
        assert!(HashError::parse("abc", "not an integer").is_user_recoverable());
        assert!(!HashError::invalid_batch("offsets").is_user_recoverable());
        assert!(!HashError::RowCountMismatch { input: 1, seed: 0 }.is_user_recoverable());
    }

    #[test]
    fn suggestions() {
        assert!(HashError::unsupported("BOOLEAN").suggestion().is_some());
        assert!(
            HashError::UnknownFunction {
                name: "md5".to_owned()
            }
            .suggestion()
            .is_some()
        );
        assert!(HashError::invalid_batch("x").suggestion().is_none());
    }

    #[test]
    fn exit_code_matches_kind() {
        let err = HashError::parse("x", "y");
        assert_eq!(err.exit_code(), ErrorKind::Parse as i32);
        assert_ne!(err.exit_code(), 0);
    }
}
