use thiserror::Error;

/// Failures of the salary adjustment engine itself.
///
/// These are raised before any adjusted value is produced. An input that simply
/// does not overlap the inflation reference is *not* an error: it yields an
/// empty `Adjustment` and a warning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("No salary observations to process.")]
    EmptyInput,
    #[error("Column `{column}` not found in the input table.")]
    MissingColumn { column: String },
    #[error("Column `{column}` has no numeric amounts.")]
    NonNumericColumn { column: String },
    #[error("Column `{column}` has no recognizable dates/periods.")]
    UnparseablePeriods { column: String },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        let exit_code = match err {
            EngineError::EmptyInput => 3,
            EngineError::MissingColumn { .. }
            | EngineError::NonNumericColumn { .. }
            | EngineError::UnparseablePeriods { .. } => 2,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_exit_codes() {
        let empty: AppError = EngineError::EmptyInput.into();
        assert_eq!(empty.exit_code(), 3);

        let missing: AppError = EngineError::MissingColumn {
            column: "sueldo".to_string(),
        }
        .into();
        assert_eq!(missing.exit_code(), 2);
        assert!(missing.to_string().contains("sueldo"));
    }
}
