use std::path::Path;

use relative_path::RelativePathBuf;

use crate::io::{IoError, scan_markdown_files};

/// Most candidates offered for one completion query.
pub const COMPLETION_LIMIT: usize = 50;

/// Source of link targets for completion.
pub trait LinkIndex {
    fn list_candidate_link_targets(&self, query: &str) -> Vec<String>;
}

/// Note names found under a notes directory.
///
/// A note's name is its path relative to the notes root without the `.md`
/// extension, e.g. `journal/2024-01-01`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteIndex {
    names: Vec<String>,
}

impl NoteIndex {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Self { names }
    }

    /// Index every markdown file under `notes_root`.
    pub fn scan(notes_root: &Path) -> Result<Self, IoError> {
        let files = scan_markdown_files(notes_root)?;
        let names = files.iter().filter_map(|file| {
            let relative = file.strip_prefix(notes_root).ok()?;
            let relative = RelativePathBuf::from_path(relative).ok()?;
            relative
                .as_str()
                .strip_suffix(".md")
                .map(ToString::to_string)
        });
        let index = Self::from_names(names);
        log::debug!(
            "indexed {} notes under {}",
            index.len(),
            notes_root.display()
        );
        Ok(index)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl LinkIndex for NoteIndex {
    fn list_candidate_link_targets(&self, query: &str) -> Vec<String> {
        rank_candidates(&self.names, query)
    }
}

/// Case-insensitive prefix-or-substring match, prefix hits first, capped at
/// [`COMPLETION_LIMIT`]. An empty query matches everything.
pub fn rank_candidates(names: &[String], query: &str) -> Vec<String> {
    let query = query.trim().to_lowercase();
    let mut prefix = Vec::new();
    let mut substring = Vec::new();

    for name in names {
        let lower = name.to_lowercase();
        if lower.starts_with(&query) {
            prefix.push(name.clone());
        } else if lower.contains(&query) {
            substring.push(name.clone());
        }
    }

    prefix.extend(substring);
    prefix.truncate(COMPLETION_LIMIT);
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn prefix_matches_come_first() {
        let index = NoteIndex::from_names(["Old Project", "project plan", "Progress", "misc"]);
        assert_eq!(
            index.list_candidate_link_targets("pro"),
            vec!["Progress", "project plan", "Old Project"]
        );
    }

    #[test]
    fn results_are_capped() {
        let names: Vec<String> = (0..80).map(|i| format!("note {i:02}")).collect();
        let index = NoteIndex::from_names(names);
        assert_eq!(index.list_candidate_link_targets("").len(), COMPLETION_LIMIT);
    }

    #[test]
    fn scan_names_notes_by_relative_path() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("journal")).unwrap();
        std::fs::write(dir.path().join("index.md"), "# Home").unwrap();
        std::fs::write(dir.path().join("journal/2024-01-01.md"), "- day").unwrap();
        std::fs::write(dir.path().join("image.png"), "png").unwrap();

        let index = NoteIndex::scan(dir.path()).unwrap();
        assert_eq!(index.names(), ["index", "journal/2024-01-01"]);
    }
}
