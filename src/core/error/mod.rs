use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigProjectNotFound,
    ConfigInvalidYaml,
    ConfigMissingEnvironment,
    ConfigMissingKey,

    ValidationInvalidArgument,

    DomainInvalid,

    TempResourceFailed,

    RemoteCommandFailed,
    RemoteGenerateFailed,
    DeliveryFailed,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigProjectNotFound => "config.project_not_found",
            ErrorCode::ConfigInvalidYaml => "config.invalid_yaml",
            ErrorCode::ConfigMissingEnvironment => "config.missing_environment",
            ErrorCode::ConfigMissingKey => "config.missing_key",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::DomainInvalid => "domain.invalid",

            ErrorCode::TempResourceFailed => "temp.resource_failed",

            ErrorCode::RemoteCommandFailed => "remote.command_failed",
            ErrorCode::RemoteGenerateFailed => "remote.generate_failed",
            ErrorCode::DeliveryFailed => "delivery.failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNotFoundDetails {
    pub search_start: String,
    pub markers: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidYamlDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMissingKeyDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingEnvironmentDetails {
    pub environment: String,
    pub available: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainInvalidDetails {
    pub domain: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TempResourceDetails {
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCommandFailedDetails {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepFailedDetails {
    pub environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    pub cause_code: String,
    pub cause: String,
    pub cause_details: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
        }
    }

    pub fn project_not_found(search_start: impl Into<String>, markers: Vec<String>) -> Self {
        Self::new(
            ErrorCode::ConfigProjectNotFound,
            "No site project found in this directory or any parent",
            to_details(ProjectNotFoundDetails {
                search_start: search_start.into(),
                markers,
            }),
        )
        .with_hint("Run the command from inside a project, or pass --project-dir <path>")
    }

    pub fn config_invalid_yaml(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidYaml,
            "Invalid YAML in site configuration",
            to_details(ConfigInvalidYamlDetails {
                path: path.into(),
                error: err.to_string(),
            }),
        )
    }

    pub fn config_missing_key(key: impl Into<String>, path: Option<String>) -> Self {
        Self::new(
            ErrorCode::ConfigMissingKey,
            "Missing required configuration key",
            to_details(ConfigMissingKeyDetails {
                key: key.into(),
                path,
            }),
        )
    }

    pub fn config_missing_environment(
        environment: impl Into<String>,
        available: Vec<String>,
    ) -> Self {
        let environment = environment.into();
        Self::new(
            ErrorCode::ConfigMissingEnvironment,
            format!("Environment '{}' is not configured", environment),
            to_details(MissingEnvironmentDetails {
                environment,
                available,
            }),
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
        tried: Option<Vec<String>>,
    ) -> Self {
        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            to_details(InvalidArgumentDetails {
                field: field.into(),
                problem: problem.into(),
                id,
                tried,
            }),
        )
    }

    pub fn domain_invalid(domain: impl Into<String>, problem: impl Into<String>) -> Self {
        let domain = domain.into();
        Self::new(
            ErrorCode::DomainInvalid,
            format!("Cannot derive hosts from '{}'", domain),
            to_details(DomainInvalidDetails {
                domain,
                problem: problem.into(),
            }),
        )
    }

    pub fn temp_resource(
        operation: impl Into<String>,
        path: Option<String>,
        error: impl Into<String>,
    ) -> Self {
        Self::new(
            ErrorCode::TempResourceFailed,
            "Scratch storage error",
            to_details(TempResourceDetails {
                operation: operation.into(),
                path,
                error: error.into(),
            }),
        )
    }

    pub fn remote_command_failed(details: RemoteCommandFailedDetails) -> Self {
        Self::new(
            ErrorCode::RemoteCommandFailed,
            "Remote command failed",
            to_details(details),
        )
    }

    /// Wraps a per-environment generation failure so the environment is named.
    pub fn remote_generate_failed(environment: impl Into<String>, cause: &Error) -> Self {
        let environment = environment.into();
        Self::new(
            ErrorCode::RemoteGenerateFailed,
            format!("Alias generation failed for environment '{}'", environment),
            to_details(StepFailedDetails {
                environment,
                artifact: None,
                cause_code: cause.code.as_str().to_string(),
                cause: cause.message.clone(),
                cause_details: cause.details.clone(),
            }),
        )
    }

    pub fn delivery_failed(
        environment: impl Into<String>,
        artifact: impl Into<String>,
        cause: &Error,
    ) -> Self {
        let environment = environment.into();
        Self::new(
            ErrorCode::DeliveryFailed,
            format!("Alias delivery failed for environment '{}'", environment),
            to_details(StepFailedDetails {
                environment,
                artifact: Some(artifact.into()),
                cause_code: cause.code.as_str().to_string(),
                cause: cause.message.clone(),
                cause_details: cause.details.clone(),
            }),
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalIoError,
            "IO error",
            to_details(InternalIoErrorDetails {
                error: error.into(),
                context,
            }),
        )
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalJsonError,
            "JSON error",
            to_details(InternalJsonErrorDetails {
                error: error.into(),
                context,
            }),
        )
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }

    /// Value of a string field in `details`, if present.
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_generate_failed_names_environment_and_cause() {
        let cause = Error::remote_command_failed(RemoteCommandFailedDetails {
            command: "ansible-playbook alias.yml".to_string(),
            exit_code: 2,
            stdout: String::new(),
            stderr: "UNREACHABLE".to_string(),
        });

        let err = Error::remote_generate_failed("staging", &cause);

        assert_eq!(err.code, ErrorCode::RemoteGenerateFailed);
        assert_eq!(err.detail_str("environment"), Some("staging"));
        assert_eq!(err.detail_str("causeCode"), Some("remote.command_failed"));
        assert!(err.message.contains("staging"));
        assert_eq!(err.details["causeDetails"]["exitCode"], 2);
    }

    #[test]
    fn delivery_failed_records_artifact_path() {
        let cause = Error::internal_unexpected("boom");
        let err = Error::delivery_failed("development", "/tmp/x/combined.yml", &cause);

        assert_eq!(err.code, ErrorCode::DeliveryFailed);
        assert_eq!(err.detail_str("artifact"), Some("/tmp/x/combined.yml"));
        assert_eq!(err.detail_str("environment"), Some("development"));
    }

    #[test]
    fn with_hint_appends() {
        let err = Error::internal_unexpected("x").with_hint("one").with_hint("two");
        assert_eq!(err.hints.len(), 2);
        assert_eq!(err.hints[1].message, "two");
    }

    #[test]
    fn project_not_found_carries_hint() {
        let err = Error::project_not_found("/srv", vec!["ansible.cfg".to_string()]);
        assert_eq!(err.code.as_str(), "config.project_not_found");
        assert!(!err.hints.is_empty());
    }
}
