//! Destinations for downloaded exports.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Where a finished download goes. `save` either stores the whole payload
/// or leaves nothing behind.
pub trait FileSink: Send + Sync {
    fn save(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Saves into a directory. Bytes go to a temp file in the same directory
/// first and are renamed into place; an existing file is never replaced,
/// the name gets a ` (n)` suffix instead.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

const MAX_SUFFIX: u32 = 999;

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSink for DirectorySink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;

        for n in 0..=MAX_SUFFIX {
            let target = self.dir.join(numbered_name(file_name, n));
            match tmp.persist_noclobber(&target) {
                Ok(_) => {
                    tracing::debug!("saved {} bytes to {}", bytes.len(), target.display());
                    return Ok(target);
                }
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => tmp = e.file,
                Err(e) => return Err(e.error),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free name for {} in {}", file_name, self.dir.display()),
        ))
    }
}

/// `Drugs.xlsx`, `Drugs (1).xlsx`, `Drugs (2).xlsx`, ...
fn numbered_name(file_name: &str, n: u32) -> String {
    if n == 0 {
        return file_name.to_string();
    }
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({n}).{ext}"),
        _ => format!("{file_name} ({n})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_names() {
        assert_eq!(numbered_name("Drugs.xlsx", 0), "Drugs.xlsx");
        assert_eq!(numbered_name("Drugs.xlsx", 2), "Drugs (2).xlsx");
        assert_eq!(numbered_name("README", 1), "README (1)");
    }

    #[test]
    fn save_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("exports"));
        let first = sink.save("Drugs.xlsx", b"one").unwrap();
        let second = sink.save("Drugs.xlsx", b"two").unwrap();
        assert_eq!(first.file_name().unwrap(), "Drugs.xlsx");
        assert_eq!(second.file_name().unwrap(), "Drugs (1).xlsx");
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
        assert_eq!(std::fs::read_dir(sink.dir()).unwrap().count(), 2);
    }
}
