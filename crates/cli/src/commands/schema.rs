use anyhow::Result;
use marshal_core::configs::targets::targets_schema;

pub fn execute() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&targets_schema())?);
    Ok(())
}
