//! Input schema generation

use crate::console::CliConsole;
use crate::functions::BundledFunction;
use anyhow::{Context, Result};
use std::path::Path;

/// Write the pretty-printed inputs schema of `function` to `path`
pub fn generate(function: BundledFunction, path: &Path) -> Result<()> {
    let schema = serde_json::to_string_pretty(&function.input_schema())?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }
    std::fs::write(path, schema).with_context(|| format!("failed to write schema to '{}'", path.display()))?;

    CliConsole::new(true).success(&format!(
        "Wrote {} input schema to {}",
        function.name(),
        path.display()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_schema_written_with_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("schema.json");
        generate(BundledFunction::RandomSample, &path).unwrap();

        let schema: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(schema["properties"]["commentPhrase"].is_object());
        assert!(schema["properties"]["numberOfElements"].is_object());
    }
}
