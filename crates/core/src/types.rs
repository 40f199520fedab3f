use thiserror::Error;

/// Exit status used for configuration and resolution problems
pub const USAGE_EXIT_CODE: i32 = 2;

/// Exit status used when the user interrupts a running command
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// The main error type for Marshal operations
#[derive(Debug, Error)]
pub enum MarshalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{}", unknown_target_message(.name, .required_by.as_deref()))]
    UnknownTarget {
        name: String,
        required_by: Option<String>,
    },

    #[error("Circular dependency detected: {cycle}")]
    CyclicDependency { cycle: String },

    #[error("Command '{command}' in target '{target}' failed with exit code {code}")]
    CommandFailure {
        target: String,
        command: String,
        code: i32,
    },

    #[error("Failed to execute command '{command}': {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Interrupted while running '{command}' in target '{target}'")]
    Interrupted { target: String, command: String },
}

impl MarshalError {
    /// Process exit status that best represents this error
    pub fn exit_code(&self) -> i32 {
        match self {
            MarshalError::CommandFailure { code, .. } => *code,
            MarshalError::Interrupted { .. } => INTERRUPTED_EXIT_CODE,
            MarshalError::CommandSpawn { .. } | MarshalError::Io(_) => 1,
            _ => USAGE_EXIT_CODE,
        }
    }
}

fn unknown_target_message(name: &str, required_by: Option<&str>) -> String {
    match required_by {
        Some(parent) => format!("Target '{}' (required by '{}') not found", name, parent),
        None => format!("Target '{}' not found", name),
    }
}

/// Result type alias for Marshal operations
pub type MarshalResult<T> = Result<T, MarshalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_target_messages() {
        let top = MarshalError::UnknownTarget {
            name: "deploy".to_string(),
            required_by: None,
        };
        assert_eq!(top.to_string(), "Target 'deploy' not found");

        let nested = MarshalError::UnknownTarget {
            name: "lint".to_string(),
            required_by: Some("check".to_string()),
        };
        assert_eq!(
            nested.to_string(),
            "Target 'lint' (required by 'check') not found"
        );
    }

    #[test]
    fn test_exit_codes() {
        let failure = MarshalError::CommandFailure {
            target: "test".to_string(),
            command: "pytest".to_string(),
            code: 5,
        };
        assert_eq!(failure.exit_code(), 5);

        let cycle = MarshalError::CyclicDependency {
            cycle: "a -> b -> a".to_string(),
        };
        assert_eq!(cycle.exit_code(), USAGE_EXIT_CODE);

        let interrupted = MarshalError::Interrupted {
            target: "test".to_string(),
            command: "sleep 10".to_string(),
        };
        assert_eq!(interrupted.exit_code(), INTERRUPTED_EXIT_CODE);
    }
}
