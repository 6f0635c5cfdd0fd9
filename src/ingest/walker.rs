use walkdir::WalkDir;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use crate::error::Result;
use crate::note::NoteId;

/// A note file discovered on disk
#[derive(Debug, Clone)]
pub struct NoteFile {
    pub id: NoteId,
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Discover all note files below `root`.
///
/// Recursively walks the directory tree and keeps files named `<id>.<extension>`
/// where `<id>` is an unsigned integer. Anything else (README.md, images,
/// `draft.md`) is skipped. Results are sorted by id.
pub fn discover_notes(root: &Path, extension: &str) -> Result<Vec<NoteFile>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let matches_extension = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if !matches_extension {
            continue;
        }

        // Skip filenames which are not a positive note id
        let Some(id) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<NoteId>().ok())
            .filter(|&id| id > 0)
        else {
            log::debug!("Skipping non-note file {}", path.display());
            continue;
        };

        let metadata = std::fs::metadata(path)?;
        files.push(NoteFile {
            id,
            path: path.to_path_buf(),
            modified: metadata.modified()?,
        });
    }

    files.sort_by_key(|f| f.id);
    log::info!("Discovered {} notes in {}", files.len(), root.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use std::fs;

    #[test]
    fn test_discover_notes() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("archive")).unwrap();
        fs::write(root.join("2.md"), "two").unwrap();
        fs::write(root.join("10.md"), "ten").unwrap();
        fs::write(root.join("archive/7.md"), "seven").unwrap();
        fs::write(root.join("README.md"), "# Docs").unwrap();
        fs::write(root.join("3.txt"), "wrong extension").unwrap();
        fs::write(root.join("image.png"), b"\x89PNG\r\n\x1a\n").unwrap();
        fs::write(root.join("0.md"), "zero").unwrap();

        let files = discover_notes(root, "md").unwrap();
        let ids: Vec<NoteId> = files.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![2, 7, 10]);
        assert!(files[1].path.ends_with("archive/7.md"));
    }

    #[test]
    fn test_discover_notes_empty() {
        let temp_dir = TempDir::new().unwrap();
        let files = discover_notes(temp_dir.path(), "md").unwrap();
        assert_eq!(files.len(), 0);
    }
}
