// sentinela/src/commands/init.rs
//
// USE CASE: Scaffold a starter manifest.

use std::fs;
use std::path::PathBuf;

use sentinela_core::infrastructure::manifest::starter_manifest;

pub fn execute(dir: PathBuf, force: bool) -> anyhow::Result<()> {
    let path = dir.join("manifest.yaml");
    if path.exists() && !force {
        eprintln!(
            "❌ '{}' already exists (use --force to overwrite)",
            path.display()
        );
        std::process::exit(2);
    }

    fs::create_dir_all(&dir)?;
    fs::write(&path, starter_manifest())?;
    println!("✨ Starter manifest written to '{}'", path.display());
    println!("   Edit it, then run: sentinela validate <data.csv>");
    Ok(())
}
