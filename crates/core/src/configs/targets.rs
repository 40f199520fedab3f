use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{MarshalError, MarshalResult};

/// File names searched, in order, when no config path is given
pub const DEFAULT_CONFIG_FILES: &[&str] = &["marshal.yml", "marshal.yaml", "marshal.toml"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Command {
    /// Run through `sh -c`. A leading `@` suppresses echoing.
    Single(String),
    /// Run directly as an argument vector.
    Multiple(Vec<String>),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Single(cmd) => write!(f, "{}", cmd),
            Command::Multiple(args) => write!(f, "{}", args.join(" ")),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TargetConfig {
    pub name: String,
    pub description: Option<String>,
    /// Targets that must complete before this one, in execution order
    pub dependencies: Option<Vec<String>>,
    /// Plain files this target's output is compared against
    pub inputs: Option<Vec<String>>,
    /// File produced by this target. Targets without one are phony.
    pub output: Option<String>,
    pub commands: Option<Vec<Command>>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TargetsFileConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Target run when none is requested. Defaults to the first target.
    pub default: Option<String>,
    pub variables: Option<BTreeMap<String, String>>,
    pub targets: Vec<TargetConfig>,
}

pub fn parse_targets_config(yaml_str: &str) -> MarshalResult<TargetsFileConfig> {
    let config: TargetsFileConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}

pub fn parse_targets_config_toml(toml_str: &str) -> MarshalResult<TargetsFileConfig> {
    let config: TargetsFileConfig = toml::from_str(toml_str)?;
    Ok(config)
}

/// Read and parse a targets file, choosing the format from its extension
pub fn load_targets_config(path: &Path) -> MarshalResult<TargetsFileConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        MarshalError::Config(format!(
            "Failed to read targets file {}: {}",
            path.display(),
            e
        ))
    })?;

    let parsed = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => parse_targets_config_toml(&content),
        _ => parse_targets_config(&content),
    };

    parsed.map_err(|e| {
        MarshalError::Config(format!(
            "Failed to parse targets file {}: {}",
            path.display(),
            e
        ))
    })
}

/// Locate the targets file in `dir`
pub fn find_targets_file(dir: &Path) -> MarshalResult<PathBuf> {
    DEFAULT_CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            MarshalError::Config(format!(
                "No targets file found in {} (looked for {})",
                dir.display(),
                DEFAULT_CONFIG_FILES.join(", ")
            ))
        })
}

/// JSON schema describing the targets file format
pub fn targets_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(TargetsFileConfig);
    serde_json::to_value(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_with_mixed_commands() {
        let config = parse_targets_config(
            r#"
name: demo
default: build
variables:
  OPTS: "-x"
targets:
  - name: build
    dependencies: [prepare]
    output: dist/pkg.tar.gz
    commands:
      - python setup.py sdist
      - ["ls", "dist"]
  - name: prepare
"#,
        )
        .unwrap();

        assert_eq!(config.name.as_deref(), Some("demo"));
        assert_eq!(config.default.as_deref(), Some("build"));
        assert_eq!(config.targets.len(), 2);

        let build = &config.targets[0];
        assert_eq!(build.dependencies, Some(vec!["prepare".to_string()]));
        assert_eq!(build.output.as_deref(), Some("dist/pkg.tar.gz"));
        let commands = build.commands.as_ref().unwrap();
        assert_eq!(
            commands[0],
            Command::Single("python setup.py sdist".to_string())
        );
        assert_eq!(
            commands[1],
            Command::Multiple(vec!["ls".to_string(), "dist".to_string()])
        );

        assert!(config.targets[1].commands.is_none());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result = parse_targets_config(
            r#"
targets:
  - name: build
    steps: ["make"]
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_toml() {
        let config = parse_targets_config_toml(
            r#"
default = "test"

[variables]
OPTS = ""

[[targets]]
name = "test"
dependencies = ["install"]
commands = ["pytest $(OPTS)"]

[[targets]]
name = "install"
output = ".venv"
commands = [["virtualenv", ".venv"]]
"#,
        )
        .unwrap();

        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets[1].output.as_deref(), Some(".venv"));
        assert_eq!(
            config.variables.unwrap().get("OPTS").map(String::as_str),
            Some("")
        );
    }

    #[test]
    fn test_find_targets_file_prefers_yaml() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("marshal.toml"), "targets = []").unwrap();
        std::fs::write(temp_dir.path().join("marshal.yml"), "targets: []").unwrap();

        let found = find_targets_file(temp_dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "marshal.yml");

        let config = load_targets_config(&found).unwrap();
        assert!(config.targets.is_empty());
    }

    #[test]
    fn test_find_targets_file_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = find_targets_file(temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("No targets file found"));
    }

    #[test]
    fn test_schema_lists_target_fields() {
        let schema = targets_schema().to_string();
        assert!(schema.contains("dependencies"));
        assert!(schema.contains("output"));
    }
}
