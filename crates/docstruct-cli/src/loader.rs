//! Plain-text file loading into units

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use docstruct::{Metadata, Unit};
use walkdir::WalkDir;

/// Extensions loaded as plain text (compared case-insensitively)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "text", "md", "markdown"];

/// True if the path has a supported plain-text extension
pub fn is_supported(path: &Path) -> bool {
    extension(path)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

/// Expand files and directories into the supported files beneath them.
///
/// Explicit files with unsupported extensions are skipped with a warning;
/// directories are walked recursively in sorted order.
pub fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if !path.exists() {
            anyhow::bail!("Path not found: {}", path.display());
        }

        if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let entry_path = entry.path();
                if entry_path.is_file() && is_supported(entry_path) {
                    files.push(entry_path.to_path_buf());
                }
            }
        } else if is_supported(path) {
            files.push(path.clone());
        } else {
            tracing::warn!("Skipping unsupported file: {}", path.display());
        }
    }

    Ok(files)
}

/// Read one file into a unit with base file metadata
pub fn load_file(path: &Path) -> Result<Unit> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_size = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();

    let source = path.display().to_string();
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_type = extension(path)
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();
    let mime_type = mime_guess::from_path(path)
        .first_or_text_plain()
        .essence_str()
        .to_string();

    let mut metadata = Metadata::new();
    metadata.insert("source".to_string(), source.clone().into());
    metadata.insert("filename".to_string(), filename.into());
    metadata.insert("file_size".to_string(), file_size.into());
    metadata.insert("file_type".to_string(), file_type.into());
    metadata.insert("mime_type".to_string(), mime_type.into());

    tracing::debug!("Loaded {} ({} bytes)", source, file_size);

    Ok(Unit::with_metadata(content, metadata)
        .id(uuid::Uuid::new_v4().to_string())
        .source(source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported(Path::new("notes.txt")));
        assert!(is_supported(Path::new("README.MD")));
        assert!(is_supported(Path::new("a/b/c.Markdown")));
        assert!(!is_supported(Path::new("report.pdf")));
        assert!(!is_supported(Path::new("Makefile")));
    }

    #[test]
    fn test_load_file_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Guide.MD");
        fs::write(&path, "# Title\n\nBody").unwrap();

        let unit = load_file(&path).unwrap();
        assert_eq!(unit.content, "# Title\n\nBody");
        assert_eq!(unit.metadata["filename"], "Guide.MD");
        assert_eq!(unit.metadata["file_size"], 13);
        assert_eq!(unit.metadata["file_type"], ".md");
        assert_eq!(unit.metadata["mime_type"], "text/markdown");
        assert!(unit.metadata.contains_key("created_at"));
        assert_eq!(unit.source.as_deref(), Some(path.display().to_string().as_str()));
        assert!(unit.id.is_some());
    }

    #[test]
    fn test_collect_files_walks_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.md"), "a").unwrap();
        fs::write(dir.path().join("image.png"), [0u8; 4]).unwrap();
        fs::write(dir.path().join("nested").join("c.text"), "c").unwrap();

        let files = collect_files(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.md", "b.txt", "c.text"]);
    }

    #[test]
    fn test_missing_path_fails() {
        let err = collect_files(&[PathBuf::from("/no/such/input.txt")]).unwrap_err();
        assert!(err.to_string().contains("Path not found"));
    }
}
