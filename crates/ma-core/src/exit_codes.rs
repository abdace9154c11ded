//! Exit codes for the ma-core CLI.
//!
//! Scripts can branch on the outcome of `analyze` without parsing output.

use ma_common::AnalyticsResult;
use ma_config::ValidationError;

/// Exit codes for ma-core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Run completed, no high or critical anomalies
    Clean = 0,

    /// Run completed with at least one high or critical anomaly
    AnomaliesFound = 1,

    /// Configuration could not be loaded or failed validation
    ConfigError = 10,

    /// Input files were missing values or malformed
    InputError = 11,

    /// Reading input or writing output failed
    IoError = 12,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates a completed run.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean | ExitCode::AnomaliesFound)
    }

    /// Check if this exit code indicates an error requiring attention.
    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Outcome of a completed analytics run.
    pub fn for_result(result: &AnalyticsResult) -> Self {
        if result.has_urgent_anomalies() {
            ExitCode::AnomaliesFound
        } else {
            ExitCode::Clean
        }
    }

    /// Map a unified error to its exit code.
    pub fn for_error(err: &ma_common::Error) -> Self {
        match err.code() {
            10..=19 => ExitCode::ConfigError,
            20..=29 => ExitCode::InputError,
            60..=69 => ExitCode::IoError,
            _ => ExitCode::InternalError,
        }
    }
}

/// Any failure to load or validate configuration, including an unreadable
/// config file, is a configuration error.
impl From<&ValidationError> for ExitCode {
    fn from(_err: &ValidationError) -> Self {
        ExitCode::ConfigError
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_and_error_partition() {
        assert!(ExitCode::Clean.is_success());
        assert!(ExitCode::AnomaliesFound.is_success());
        assert!(!ExitCode::AnomaliesFound.is_error());
        assert!(ExitCode::ConfigError.is_error());
        assert!(ExitCode::IoError.is_error());
        assert_eq!(i32::from(ExitCode::InputError), 11);
    }

    #[test]
    fn unified_errors_map_by_decade() {
        let err = ma_common::Error::InvalidInput("bad".into());
        assert_eq!(ExitCode::for_error(&err), ExitCode::InputError);
        let err = ma_common::Error::Config("bad".into());
        assert_eq!(ExitCode::for_error(&err), ExitCode::ConfigError);
        let err = ma_common::Error::Analysis("bad".into());
        assert_eq!(ExitCode::for_error(&err), ExitCode::InternalError);
    }

    #[test]
    fn config_errors() {
        assert_eq!(
            ExitCode::from(&ValidationError::IoError("gone".into())),
            ExitCode::ConfigError
        );
        assert_eq!(
            ExitCode::from(&ValidationError::ParseError("bad".into())),
            ExitCode::ConfigError
        );
    }
}
