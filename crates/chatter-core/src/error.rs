pub type Result<T> = std::result::Result<T, Error>;

/// One problem found while validating a [`crate::ChatConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {message}")]
pub struct ConfigIssue {
    pub path: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A configuration that failed validation.
///
/// Every issue found in one pass is kept, so callers can report all of them at once.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid configuration ({} issue(s)): {}", .issues.len(), join_issues(.issues))]
pub struct ConfigError {
    pub issues: Vec<ConfigIssue>,
}

impl ConfigError {
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![ConfigIssue::new(path, message)],
        }
    }
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid {format} configuration: {message}")]
    ConfigParse {
        format: &'static str,
        message: String,
    },

    #[error("Invalid conversation JSON: {message}")]
    ConversationJson { message: String },

    #[error("Invalid substitution map: {message}")]
    Substitutions { message: String },

    #[error("configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error should turn into the configuration error graphic.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Config(_) | Error::ConfigParse { .. })
    }
}
