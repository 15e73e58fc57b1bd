//! Filesystem [`FileWriter`].

use std::fs;
use std::io;
use std::path::Path;

use socg_core::FileWriter;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct FsWriter;

impl FileWriter for FsWriter {
    fn ensure_file(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        if !path.exists() {
            fs::File::create(path)?;
        }
        Ok(())
    }

    fn write_file(&self, path: &Path, text: &str) -> io::Result<()> {
        fs::write(path, text)
    }

    fn empty_dir(&self, path: &Path) -> io::Result<()> {
        if is_protected(path)? {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing to empty {}", path.display()),
            ));
        }
        if !path.exists() {
            return fs::create_dir_all(path);
        }
        debug!(path = %path.display(), "Emptying output directory.");
        for entry in fs::read_dir(path)? {
            let entry_path = entry?.path();
            if entry_path.is_dir() {
                fs::remove_dir_all(&entry_path)?;
            } else {
                fs::remove_file(&entry_path)?;
            }
        }
        Ok(())
    }
}

/// The working directory and filesystem roots are never emptied.
fn is_protected(path: &Path) -> io::Result<bool> {
    if path.as_os_str().is_empty() || path.parent().is_none() {
        return Ok(true);
    }
    if !path.exists() {
        return Ok(false);
    }
    let cwd = std::env::current_dir()?;
    Ok(fs::canonicalize(path)? == fs::canonicalize(cwd)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a/b/index.ts");
        FsWriter.ensure_file(&file).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "");
        FsWriter.write_file(&file, "export {};\n").unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "export {};\n");
    }

    #[test]
    fn test_empty_dir_keeps_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir_all(out.join("pets")).unwrap();
        fs::write(out.join("pets/index.ts"), "old").unwrap();
        fs::write(out.join("model.ts"), "old").unwrap();

        FsWriter.empty_dir(&out).unwrap();
        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_empty_dir_creates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("fresh");
        FsWriter.empty_dir(&out).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_refuses_filesystem_root() {
        let err = FsWriter.empty_dir(Path::new("/")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
