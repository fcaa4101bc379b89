use std::path::PathBuf;

use leon::{ParseError, RenderError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Exit code used for every failure that is not the external tool's own status.
pub const FAILURE_EXIT_CODE: i32 = 1;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Command failed with exit code {}", .code)]
    SubProcessExit { code: i32 },

    #[error("Command was terminated by a signal before it could exit.")]
    SubProcessSignal,

    #[error("Error with sub process: {}", _0)]
    SubProcess(#[from] std::io::Error),

    #[error("`{}` failed with exit code {}: {}", .program, .code, .stderr.trim())]
    CapturedExit {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Yaml {
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    },

    #[error("No operations were found in the operation definition YAML. Is `{}` empty?", .path)]
    EmptyOperationDefinition { path: String },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("Settings file not found: {}", .0.display())]
    SettingsFileNotFound(PathBuf),

    #[error("Error reading settings file `{}`: {}", .path, .original)]
    SettingsFile {
        path: String,
        original: dotenvy::Error,
    },

    #[error("Missing required .env variables: {}", .names.join(", "))]
    MissingSettings {
        names: Vec<String>,
        searched: Option<PathBuf>,
    },

    #[error("Specified --sql-dir not found: {}", .0.display())]
    SqlDirNotFound(PathBuf),

    #[error("SQL file not found: {}", .0.display())]
    SqlFileNotFound(PathBuf),

    #[error("Error parsing placeholder string: {}", .0)]
    Parse(#[from] ParseError),

    #[error("Error rendering template string: {}", .0)]
    Render(#[from] RenderError),

    #[error("STDIO error: {}", .0)]
    Stdio(std::io::Error),

    #[error("Unknown catalog: `{}`", .0)]
    CatalogNotFound(String),

    #[error("Unknown operation: `{}`", .0)]
    OperationNotFound(String),

    #[error("Found a non-unique operation ID: `{}`", .0)]
    NonUniqueOperationId(String),

    #[error("Found a non-unique parameter ID on operation {}: `{}`", .0, .1)]
    NonUniqueParameterId(String, String),

    #[error("Operation {} references `{}`, which is neither a parameter nor a required setting", .0, .1)]
    UnresolvedToken(String, String),

    #[error("Operation {} reads its connection from `{}`, which is not a required setting", .0, .1)]
    ConnectionSettingNotRequired(String, String),

    #[error("Invalid ID: ID may not be empty")]
    EmptyId,

    #[error("Invalid ID `{}`: ID may not contain spaces", .0)]
    IdWithSpace(String),

    #[error("Invalid ID `{}`: ID may not contain a colon (reserved for future use)", .0)]
    IdWithColon(String),

    #[error("Invalid ID `{}`: ID cannot be purely numeric", .0)]
    NumericId(String),

    #[error("No value was provided for parameter `{}`", .0)]
    MissingParameter(String),

    #[error("Operation has no parameter named `{}`", .0)]
    UnknownParameter(String),

    #[error("Parameter `{}` is not in the format `key=value`", .0)]
    ParameterFormat(String),

    #[error("Expected {} positional values but {} were provided", .0, .1)]
    ParameterCountMismatch(usize, usize),

    #[error("Named (`-p key=value`) and positional values cannot be mixed")]
    MixedParameterMode,

    #[error("{} failed: {}", .operation, .message)]
    Service { operation: String, message: String },

    #[error("Could not parse {} output: {}", .operation, .original)]
    ServiceOutput {
        operation: String,
        original: serde_json::Error,
    },

    #[error("Dashboard cannot handle {} while {}", .event, .state)]
    InvalidTransition { state: String, event: String },

    #[error("Row {} is out of range, the table has {} rows", .0, .1)]
    RowOutOfRange(usize, usize),

    #[error("Misc error: {}", .0)]
    Misc(String),
}

impl Error {
    pub fn yaml_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }

    pub fn missing_settings(names: Vec<String>, searched: Option<PathBuf>) -> Self {
        Self::MissingSettings { names, searched }
    }

    pub fn service(operation: &str, message: impl ToString) -> Self {
        Self::Service {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }

    /// The process exit code this error should terminate the CLI with.
    ///
    /// A failing external tool passes its own status through; everything else
    /// is reported as `1`.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SubProcessExit { code } => *code,
            _ => FAILURE_EXIT_CODE,
        }
    }

    /// A secondary line to print under the error message, if any.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::MissingSettings { searched, .. } => {
                let searched = searched
                    .as_ref()
                    .map(|path| format!(" (searched: {})", path.display()))
                    .unwrap_or_default();
                Some(format!(
                    "Ensure .env is populated with Snowflake connection details.{searched}"
                ))
            }
            Self::SqlFileNotFound(_) | Self::SqlDirNotFound(_) => {
                Some("Pass --sql-dir to point at the project's sql/ directory.".to_string())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_settings_lists_every_name() {
        let error = Error::missing_settings(vec!["SA_ROLE".to_string(), "AI_MODEL".to_string()], None);
        assert_eq!(
            error.to_string(),
            "Missing required .env variables: SA_ROLE, AI_MODEL"
        );
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_missing_settings_hint_mentions_searched_path() {
        let error = Error::missing_settings(
            vec!["SA_ROLE".to_string()],
            Some(PathBuf::from("/project/.env")),
        );
        let hint = error.hint().unwrap();
        assert!(hint.ends_with("(searched: /project/.env)"));

        let error = Error::missing_settings(vec!["SA_ROLE".to_string()], None);
        assert!(!error.hint().unwrap().contains("searched"));
    }

    #[test]
    fn test_sub_process_exit_code_is_propagated() {
        let error = Error::SubProcessExit { code: 2 };
        assert_eq!(error.exit_code(), 2);
        assert_eq!(error.to_string(), "Command failed with exit code 2");
    }

    #[test]
    fn test_resource_errors_exit_with_one() {
        assert_eq!(Error::SqlFileNotFound(PathBuf::from("sql/x.sql")).exit_code(), 1);
        assert_eq!(Error::SqlDirNotFound(PathBuf::from("nope")).exit_code(), 1);
        assert_eq!(Error::SubProcessSignal.exit_code(), 1);
    }
}
