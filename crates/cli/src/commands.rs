pub mod graph;
pub mod list;
pub mod plan;
pub mod run;
pub mod schema;

use std::collections::HashMap;

use anyhow::Result;
use marshal_core::interpolation::parse_definition;

/// Turn repeated `-D NAME=VALUE` flags into a variable map
pub fn parse_defines(defines: &[String]) -> Result<HashMap<String, String>> {
    let mut variables = HashMap::new();
    for definition in defines {
        let (name, value) = parse_definition(definition)?;
        variables.insert(name, value);
    }
    Ok(variables)
}
