use relative_path::RelativePath;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid notes directory: {0}")]
    InvalidNotesDir(String),
}

/// Read a markdown note, relative to the notes root
pub fn read_file(relative_path: &RelativePath, notes_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(notes_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    Ok(fs::read_to_string(&absolute_path)?)
}

/// Write a note's full text back, creating parent directories as needed
pub fn write_file(
    relative_path: &RelativePath,
    notes_root: &Path,
    content: &str,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(notes_root);

    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&absolute_path, content)?;
    log::info!(
        "saved {} ({} bytes)",
        absolute_path.display(),
        content.len()
    );
    Ok(())
}

/// Every `.md` file under the notes directory, sorted
pub fn scan_markdown_files(notes_root: &Path) -> Result<Vec<PathBuf>, IoError> {
    validate_notes_dir(notes_root)?;

    let mut files = Vec::new();
    scan_directory_recursive(notes_root, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == "md"
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_notes_dir(path: &Path) -> Result<(), IoError> {
    if !path.is_dir() {
        return Err(IoError::InvalidNotesDir(format!(
            "notes directory not found: {}",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn notes_with(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        dir
    }

    #[test]
    fn test_scan_finds_nested_markdown_only() {
        let notes = notes_with(&[
            ("plan.md", "```columns\ncolumns: 2\n```"),
            ("sub/nested.md", "# Nested"),
            ("image.png", "fake"),
        ]);

        let files = scan_markdown_files(notes.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(notes.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![PathBuf::from("plan.md"), PathBuf::from("sub/nested.md")]
        );
    }

    #[test]
    fn test_scan_rejects_missing_directory() {
        let result = scan_markdown_files(Path::new("/this/path/does/not/exist"));
        assert!(matches!(result, Err(IoError::InvalidNotesDir(_))));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("notes directory not found")
        );
    }

    #[test]
    fn test_read_file_not_found() {
        let notes = notes_with(&[]);
        let result = read_file(RelativePath::new("missing.md"), notes.path());
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[test]
    fn test_write_then_read_is_byte_exact() {
        let notes = notes_with(&[("plan.md", "old")]);
        let path = RelativePath::new("plan.md");
        let content = "Intro\r\n\n```columns\ncolumns: 1\n===column===\nx\n```\n";

        write_file(path, notes.path(), content).unwrap();
        assert_eq!(read_file(path, notes.path()).unwrap(), content);
    }

    #[test]
    fn test_write_file_creates_parent_directories() {
        let notes = notes_with(&[]);
        let path = RelativePath::new("folder/subfolder/new.md");

        write_file(path, notes.path(), "# New").unwrap();
        assert!(notes.path().join("folder/subfolder").is_dir());
        assert_eq!(read_file(path, notes.path()).unwrap(), "# New");
    }
}
