use std::path::Path;

use anyhow::Result;

/// Scan a sources tree and print its module records as JSON.
pub fn cmd_sources(dir: &str) -> Result<()> {
    let records = phasekit_sources::scan(Path::new(dir))?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
