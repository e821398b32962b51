// sentinela-core/src/infrastructure/fs.rs

use std::io::Write;
use std::path::Path;

use crate::infrastructure::error::InfrastructureError;

/// Write content to a file atomically using a temporary file.
///
/// The content lands in a temp file in the target's directory, then is
/// renamed over the target, so a report file is either complete or absent
/// even if the process dies mid-write.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    // Same directory, so the final rename never crosses filesystems
    let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(InfrastructureError::Io)?;

    temp_file
        .write_all(content.as_ref())
        .map_err(InfrastructureError::Io)?;

    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_creates_file() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("report.json");

        atomic_write(&file_path, "{\"passed\":true}")?;

        assert!(file_path.exists());
        assert_eq!(fs::read_to_string(file_path)?, "{\"passed\":true}");
        Ok(())
    }

    #[test]
    fn test_atomic_write_overwrites_existing() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("report.json");
        fs::write(&file_path, "old")?;

        atomic_write(&file_path, "new")?;

        assert_eq!(fs::read_to_string(file_path)?, "new");
        Ok(())
    }
}
