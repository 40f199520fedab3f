//! Make-style variable expansion for target commands.
//!
//! # Syntax
//!
//! - `$(NAME)` and `${NAME}` are replaced with the variable's value
//! - `$$` produces a literal `$`
//! - any other `$` is kept as-is, so shell variables such as `$HOME` reach the shell
//!
//! Undefined variables expand to the empty string, so an optional
//! pass-through variable like `$(OPTS)` simply disappears when unset.

use std::collections::{BTreeMap, HashMap};

use crate::types::{MarshalError, MarshalResult};

/// Variable lookup with make's precedence: command-line definitions, then
/// the process environment, then the targets file.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    overrides: HashMap<String, String>,
    environment: HashMap<String, String>,
    file: BTreeMap<String, String>,
}

impl Variables {
    pub fn new(
        overrides: HashMap<String, String>,
        environment: HashMap<String, String>,
        file: BTreeMap<String, String>,
    ) -> Self {
        Self {
            overrides,
            environment,
            file,
        }
    }

    /// Build a lookup using the current process environment
    pub fn from_process_env(
        overrides: HashMap<String, String>,
        file: BTreeMap<String, String>,
    ) -> Self {
        Self::new(overrides, std::env::vars().collect(), file)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.overrides
            .get(name)
            .or_else(|| self.environment.get(name))
            .or_else(|| self.file.get(name))
            .map(String::as_str)
    }
}

/// Parse a `NAME=VALUE` definition as given on the command line
pub fn parse_definition(definition: &str) -> MarshalResult<(String, String)> {
    match definition.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(MarshalError::Config(format!(
            "Invalid variable definition '{}', expected NAME=VALUE",
            definition
        ))),
    }
}

/// Expand every variable reference in `input`
pub fn expand(input: &str, vars: &Variables) -> MarshalResult<String> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            output.push(c);
            continue;
        }

        let close = match chars.peek() {
            Some('$') => {
                chars.next();
                output.push('$');
                continue;
            }
            Some('(') => ')',
            Some('{') => '}',
            _ => {
                output.push('$');
                continue;
            }
        };
        chars.next();

        let mut name = String::new();
        let mut terminated = false;
        for c in chars.by_ref() {
            if c == close {
                terminated = true;
                break;
            }
            name.push(c);
        }

        if !terminated {
            return Err(MarshalError::Config(format!(
                "Unterminated variable reference in '{}'",
                input
            )));
        }

        match vars.get(name.trim()) {
            Some(value) => output.push_str(value),
            None => tracing::debug!("Variable '{}' is undefined, expanding to ''", name.trim()),
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(overrides: &[(&str, &str)], env: &[(&str, &str)], file: &[(&str, &str)]) -> Variables {
        let to_map = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>()
        };
        Variables::new(
            to_map(overrides),
            to_map(env),
            file.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_expands_both_reference_styles() {
        let v = vars(&[], &[], &[("VENV", ".venv"), ("OPTS", "-x")]);
        assert_eq!(
            expand("$(VENV)/bin/pytest ${OPTS} tests", &v).unwrap(),
            ".venv/bin/pytest -x tests"
        );
    }

    #[test]
    fn test_precedence_override_env_file() {
        let v = vars(&[("OPTS", "cli")], &[("OPTS", "env")], &[("OPTS", "file")]);
        assert_eq!(expand("$(OPTS)", &v).unwrap(), "cli");

        let v = vars(&[], &[("OPTS", "env")], &[("OPTS", "file")]);
        assert_eq!(expand("$(OPTS)", &v).unwrap(), "env");
    }

    #[test]
    fn test_undefined_expands_to_empty() {
        let v = Variables::default();
        assert_eq!(expand("pytest $(OPTS)", &v).unwrap(), "pytest ");
    }

    #[test]
    fn test_shell_dollars_pass_through() {
        let v = Variables::default();
        assert_eq!(expand("echo $HOME $$(pwd)", &v).unwrap(), "echo $HOME $(pwd)");
        assert_eq!(expand("cost: 5$", &v).unwrap(), "cost: 5$");
    }

    #[test]
    fn test_unterminated_reference() {
        let err = expand("echo $(OPTS", &Variables::default()).unwrap_err();
        assert!(err.to_string().contains("Unterminated"));
    }

    #[test]
    fn test_parse_definition() {
        assert_eq!(
            parse_definition("OPTS=-k smoke").unwrap(),
            ("OPTS".to_string(), "-k smoke".to_string())
        );
        assert_eq!(
            parse_definition("EMPTY=").unwrap(),
            ("EMPTY".to_string(), String::new())
        );
        assert!(parse_definition("novalue").is_err());
        assert!(parse_definition("=x").is_err());
    }
}
