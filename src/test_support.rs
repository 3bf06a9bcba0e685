use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory holding data files for a test render pass.
pub(crate) struct DataDir {
    dir: TempDir,
}

impl DataDir {
    pub(crate) fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `relative`, creating parent directories.
    pub(crate) fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("failed to create {}: {}", parent.display(), e));
        }
        std::fs::write(&path, content)
            .unwrap_or_else(|e| panic!("failed to write {}: {}", path.display(), e));
        path
    }
}

/// Markup from the end-to-end support-agent scenario.
pub(crate) const SUPPORT_MARKUP: &str = r#"<poml><role>Support agent</role><data src="h.csv" format="csv" name="hist"/><task>{{#each hist}}{{this.issue}}{{/each}}</task></poml>"#;

/// Data file for [`SUPPORT_MARKUP`].
pub(crate) const SUPPORT_CSV: &str = "issue\n\"billing\"\n\"shipping\"\n";
