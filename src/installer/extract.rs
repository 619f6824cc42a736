//! ZIP extraction into a staging directory

use std::fs::{self, File};
use std::io;
use std::path::Path;

use zip::ZipArchive;

use crate::error::{self, Result};

/// Extract every entry of `archive` below `dest`.
///
/// Entries whose names would resolve outside `dest` (absolute paths, `..`)
/// abort the extraction. Returns the number of files written.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<usize> {
    let unzip_err = |reason: String| error::unzip_failed(archive.display().to_string(), reason);

    let file = File::open(archive).map_err(|e| unzip_err(e.to_string()))?;
    let mut zip = ZipArchive::new(file).map_err(|e| unzip_err(e.to_string()))?;

    let mut written = 0;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| unzip_err(e.to_string()))?;

        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            return Err(unzip_err(format!(
                "entry '{}' escapes the extraction directory",
                entry.name()
            )));
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| unzip_err(e.to_string()))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| unzip_err(e.to_string()))?;
        }
        let mut out = File::create(&out_path).map_err(|e| unzip_err(e.to_string()))?;
        io::copy(&mut entry, &mut out).map_err(|e| unzip_err(e.to_string()))?;
        written += 1;
    }

    tracing::debug!(archive = %archive.display(), files = written, "archive extracted");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpdaterError;
    use crate::test_fixtures::write_zip;
    use tempfile::TempDir;

    #[test]
    fn test_extracts_nested_entries() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("bundle.zip");
        write_zip(
            &archive,
            &[
                ("index.bundle", b"code".as_slice()),
                ("assets/logo.png", b"png".as_slice()),
            ],
        );

        let dest = temp.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        assert_eq!(extract_zip(&archive, &dest).unwrap(), 2);
        assert_eq!(fs::read(dest.join("index.bundle")).unwrap(), b"code");
        assert!(dest.join("assets/logo.png").is_file());
    }

    #[test]
    fn test_rejects_escaping_entry() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("evil.zip");
        write_zip(&archive, &[("../escape.txt", b"x".as_slice())]);

        let dest = temp.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        let err = extract_zip(&archive, &dest).unwrap_err();
        assert!(matches!(err, UpdaterError::Unzip { .. }));
        assert!(!temp.path().join("escape.txt").exists());
    }

    #[test]
    fn test_rejects_non_zip() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("bundle.zip");
        fs::write(&archive, "definitely not a zip").unwrap();

        let err = extract_zip(&archive, temp.path()).unwrap_err();
        assert!(matches!(err, UpdaterError::Unzip { .. }));
    }
}
