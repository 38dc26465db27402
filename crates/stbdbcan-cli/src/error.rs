//! CLI exit code handling.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Input or I/O error (bad CSV, unknown entity, unwritable output)
//! - 2: Invalid configuration, or parameters incompatible with the data

use stbdbcan_core::StError;

/// Exit codes for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CliExitCode {
    /// Run completed, outputs written
    Success = 0,
    /// Input files could not be read, parsed or written
    InputError = 1,
    /// Configuration or parameters rejected
    InvalidParameters = 2,
}

impl From<CliExitCode> for i32 {
    fn from(code: CliExitCode) -> Self {
        code as i32
    }
}

impl From<&StError> for CliExitCode {
    fn from(err: &StError) -> Self {
        match err.exit_code() {
            1 => CliExitCode::InputError,
            _ => CliExitCode::InvalidParameters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stbdbcan_core::error::{ClusterError, ConfigError, InputError};

    #[test]
    fn test_exit_code_values() {
        assert_eq!(CliExitCode::Success as u8, 0);
        assert_eq!(CliExitCode::InputError as u8, 1);
        assert_eq!(CliExitCode::InvalidParameters as u8, 2);
        assert_eq!(i32::from(CliExitCode::InvalidParameters), 2);
        println!("[PASS] test_exit_code_values - Success=0, InputError=1, InvalidParameters=2");
    }

    #[test]
    fn test_error_classification() {
        let input: StError = InputError::EmptyDataset.into();
        assert_eq!(CliExitCode::from(&input), CliExitCode::InputError);

        let write: StError = InputError::write("out.csv", "disk full").into();
        assert_eq!(CliExitCode::from(&write), CliExitCode::InputError);

        let k: StError = ClusterError::undefined_k_distance(0, 10, 3).into();
        assert_eq!(CliExitCode::from(&k), CliExitCode::InvalidParameters);

        let config: StError = ConfigError::Parse("bad".into()).into();
        assert_eq!(CliExitCode::from(&config), CliExitCode::InvalidParameters);
    }
}
