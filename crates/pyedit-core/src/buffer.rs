use crate::analysis::CompletionItem;
use crate::position::word_at;
use crate::{CoreError, Result};
use std::fs;
use std::ops::Range as OffsetRange;
use std::path::{Path, PathBuf};

/// The live text of one open file.
///
/// Owned by a single editor; every mutation bumps [`generation`](Self::generation) so
/// results computed against older text can be recognised and dropped.
#[derive(Debug, Clone)]
pub struct AnalysisBuffer {
    path: PathBuf,
    text: String,
    generation: u64,
    read_only: bool,
}

impl AnalysisBuffer {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let read_only = is_stub(&path);
        Self {
            path,
            text: text.into(),
            generation: 0,
            read_only,
        }
    }

    /// Read a file from disk. Stub files (`.pyi`) open read-only.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let text = fs::read_to_string(&path).map_err(|source| CoreError::Load {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("Loaded {} ({} bytes)", path.display(), text.len());
        Ok(Self::new(path, text))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Point the buffer at a new file (save-as)
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
        self.read_only = is_stub(&self.path);
    }

    /// Replace the whole text
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.ensure_writable()?;
        self.text = text.into();
        self.generation += 1;
        Ok(())
    }

    pub fn insert(&mut self, offset: usize, text: &str) -> Result<()> {
        self.ensure_writable()?;
        self.check_offset(offset)?;
        self.text.insert_str(offset, text);
        self.generation += 1;
        Ok(())
    }

    pub fn delete(&mut self, range: OffsetRange<usize>) -> Result<()> {
        self.ensure_writable()?;
        self.check_offset(range.start)?;
        self.check_offset(range.end)?;
        if range.start > range.end {
            return Err(CoreError::InvalidOffset {
                offset: range.start,
                len: self.text.len(),
            });
        }
        self.text.replace_range(range, "");
        self.generation += 1;
        Ok(())
    }

    /// Accept a completion at `offset`, replacing the partial word before the cursor.
    ///
    /// Returns the offset just after the inserted label.
    pub fn apply_completion(&mut self, offset: usize, item: &CompletionItem) -> Result<usize> {
        self.ensure_writable()?;
        self.check_offset(offset)?;

        let start = word_at(&self.text, offset)
            .map_or(offset, |(start, _)| start.min(offset));
        self.text.replace_range(start..offset, &item.label);
        self.generation += 1;
        Ok(start + item.label.len())
    }

    /// Flush the text to disk. Last write wins.
    pub fn save(&self) -> std::io::Result<()> {
        fs::write(&self.path, &self.text)
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(CoreError::ReadOnly(self.path.clone()));
        }
        Ok(())
    }

    fn check_offset(&self, offset: usize) -> Result<()> {
        if offset > self.text.len() || !self.text.is_char_boundary(offset) {
            return Err(CoreError::InvalidOffset {
                offset,
                len: self.text.len(),
            });
        }
        Ok(())
    }
}

fn is_stub(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "pyi")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edits_bump_generation() {
        let mut buffer = AnalysisBuffer::new("/src/a.py", "x = 1\n");
        assert_eq!(buffer.generation(), 0);

        buffer.insert(0, "# header\n").unwrap();
        assert_eq!(buffer.text(), "# header\nx = 1\n");
        assert_eq!(buffer.generation(), 1);

        buffer.delete(0..9).unwrap();
        assert_eq!(buffer.text(), "x = 1\n");
        assert_eq!(buffer.generation(), 2);

        buffer.set_text("y = 2\n").unwrap();
        assert_eq!(buffer.generation(), 3);
    }

    #[test]
    fn test_invalid_offsets() {
        let mut buffer = AnalysisBuffer::new("/src/a.py", "é");
        assert!(matches!(
            buffer.insert(1, "x"),
            Err(CoreError::InvalidOffset { offset: 1, len: 2 })
        ));
        assert!(buffer.insert(5, "x").is_err());
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = 2..0;
        assert!(buffer.delete(reversed).is_err());
        assert_eq!(buffer.generation(), 0);
    }

    #[test]
    fn test_stub_files_are_read_only() {
        let mut buffer =
            AnalysisBuffer::new("/site-packages/os/__init__.pyi", "def getcwd() -> str: ...");
        assert!(buffer.is_read_only());
        assert!(matches!(buffer.set_text(""), Err(CoreError::ReadOnly(_))));

        buffer.set_path("/tmp/copy.py");
        assert!(!buffer.is_read_only());
    }

    #[test]
    fn test_apply_completion_replaces_prefix() {
        let mut buffer = AnalysisBuffer::new("/src/a.py", "import os\nos.get\n");
        let cursor = "import os\nos.get".len();

        let end = buffer
            .apply_completion(cursor, &CompletionItem::new("getcwd"))
            .unwrap();
        assert_eq!(buffer.text(), "import os\nos.getcwd\n");
        assert_eq!(end, "import os\nos.getcwd".len());
    }

    #[test]
    fn test_apply_completion_without_prefix_inserts() {
        let mut buffer = AnalysisBuffer::new("/src/a.py", "os.\n");
        let end = buffer.apply_completion(3, &CompletionItem::new("path")).unwrap();
        assert_eq!(buffer.text(), "os.path\n");
        assert_eq!(end, 7);
    }

    #[test]
    fn test_load_and_save() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("script.py");
        fs::write(&path, "print('hi')\n").unwrap();

        let mut buffer = AnalysisBuffer::load(&path).unwrap();
        assert_eq!(buffer.text(), "print('hi')\n");

        buffer.set_text("print('bye')\n").unwrap();
        buffer.save().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "print('bye')\n");
    }

    #[test]
    fn test_load_missing_file() {
        let err = AnalysisBuffer::load("/definitely/missing.py").unwrap_err();
        assert!(matches!(err, CoreError::Load { .. }));
    }
}
