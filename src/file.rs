//! The file a user picked for import.

use std::io::Read as _;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::validation::ValidationError;

/// Where the bytes of a [`SelectedFile`] live: a path read on demand, or
/// a buffer already in memory when there is no path.
#[derive(Clone)]
struct FileSource {
    /// File on disk.
    path: Option<PathBuf>,
    /// In-memory contents; empty for path-backed files.
    memory: Vec<u8>,
}

impl core::fmt::Debug for FileSource {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.path.as_deref() {
            Some(path) => f.debug_tuple("Path").field(&path).finish(),
            None => write!(f, "Memory({} bytes)", self.memory.len()),
        }
    }
}

/// A candidate import file: its metadata plus a handle to its contents.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// File name as presented to the user, including the extension.
    name: String,
    /// Size in bytes as of selection or the last [`SelectedFile::refreshed`].
    size_bytes: u64,
    /// Declared MIME type, if any. Empty strings are normalized to `None`.
    mime_type: Option<String>,
    /// Content handle.
    source: FileSource,
}

impl SelectedFile {
    /// Creates a file backed by an in-memory buffer.
    #[inline]
    #[must_use]
    pub fn in_memory<N: Into<String>>(name: N, mime_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size_bytes: bytes.len() as u64,
            mime_type: mime_type.filter(|mime| !mime.is_empty()),
            source: FileSource {
                path: None,
                memory: bytes,
            },
        }
    }

    /// Creates a file backed by a path on disk.
    ///
    /// The size is read from the filesystem metadata and the MIME type is
    /// guessed from the extension (`text/csv` for `.csv`, none otherwise).
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file metadata cannot be read.
    #[inline]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let location = path.as_ref();
        let metadata = std::fs::metadata(location)?;
        let name = location
            .file_name()
            .map(|os| os.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = location
            .extension()
            .filter(|ext| ext.eq_ignore_ascii_case("csv"))
            .map(|_| "text/csv".to_owned());
        tracing::trace!(name = %name, size = metadata.len(), "selected file from disk");
        Ok(Self {
            name,
            size_bytes: metadata.len(),
            mime_type,
            source: FileSource {
                path: Some(location.to_path_buf()),
                memory: Vec::new(),
            },
        })
    }

    /// Returns the file name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the size in bytes.
    #[inline]
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Returns the declared MIME type.
    #[inline]
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Returns the size formatted for display, e.g. `"1.5 KB"`.
    #[inline]
    #[must_use]
    pub fn display_size(&self) -> String {
        crate::present::format_file_size(self.size_bytes)
    }

    /// Reads at most `limit` bytes from the start of the file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a path-backed file cannot be read.
    #[inline]
    pub fn read_prefix(&self, limit: usize) -> Result<Vec<u8>> {
        match self.source.path.as_deref() {
            Some(path) => {
                let file = std::fs::File::open(path)?;
                let mut buf = Vec::with_capacity(limit.min(64 * 1024));
                _ = file.take(limit as u64).read_to_end(&mut buf)?;
                Ok(buf)
            }
            None => Ok(self.source.memory.iter().take(limit).copied().collect()),
        }
    }

    /// Returns a copy whose size reflects the file as it is now.
    ///
    /// Path-backed files may change on disk after selection; their metadata
    /// is read again. In-memory files are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file metadata cannot be read.
    #[inline]
    pub fn refreshed(&self) -> Result<Self> {
        let mut current = self.clone();
        if let Some(path) = self.source.path.as_deref() {
            current.size_bytes = std::fs::metadata(path)?.len();
            if current.size_bytes != self.size_bytes {
                tracing::debug!(
                    selected = self.size_bytes,
                    now = current.size_bytes,
                    "file size changed since selection"
                );
            }
        }
        Ok(current)
    }

    /// Reads the whole file, refusing to read more than `max` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::FileTooLarge`] if the contents exceed
    /// `max`, or an I/O error if a path-backed file cannot be read.
    #[inline]
    pub fn read_capped(&self, max: u64) -> Result<Vec<u8>> {
        let bytes = match self.source.path.as_deref() {
            Some(path) => {
                let file = std::fs::File::open(path)?;
                let mut buf = Vec::new();
                _ = file.take(max.saturating_add(1)).read_to_end(&mut buf)?;
                buf
            }
            None => self.source.memory.clone(),
        };
        let size = bytes.len() as u64;
        if size > max {
            return Err(ValidationError::FileTooLarge { size, max }.into());
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn in_memory_metadata() {
        let file = SelectedFile::in_memory("tx.csv", Some("text/csv".to_owned()), b"a,b".to_vec());
        assert_eq!(file.name(), "tx.csv");
        assert_eq!(file.size_bytes(), 3);
        assert_eq!(file.mime_type(), Some("text/csv"));
    }

    #[test]
    fn empty_mime_is_none() {
        let file = SelectedFile::in_memory("tx.csv", Some(String::new()), Vec::new());
        assert_eq!(file.mime_type(), None);
    }

    #[test]
    fn read_prefix_in_memory_is_bounded() {
        let file = SelectedFile::in_memory("tx.csv", None, vec![b'x'; 100]);
        assert_eq!(file.read_prefix(10).unwrap().len(), 10);
        assert_eq!(file.read_prefix(1000).unwrap().len(), 100);
    }

    #[test]
    fn from_path_reads_metadata_and_guesses_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Statement.CSV");
        let mut handle = std::fs::File::create(&path).unwrap();
        handle.write_all(b"Value Date;Text;Amount\n2024-01-01;Coffee;-3.50\n").unwrap();
        drop(handle);

        let file = SelectedFile::from_path(&path).unwrap();
        assert_eq!(file.name(), "Statement.CSV");
        assert_eq!(file.size_bytes(), 47);
        assert_eq!(file.mime_type(), Some("text/csv"));
        assert_eq!(file.read_prefix(10).unwrap(), b"Value Date");
        assert_eq!(file.read_capped(47).unwrap().len(), 47);
    }

    #[test]
    fn read_capped_refuses_oversized_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tx.csv");
        std::fs::write(&path, vec![b'x'; 100]).unwrap();
        let on_disk = SelectedFile::from_path(&path).unwrap();
        let in_memory = SelectedFile::in_memory("tx.csv", None, vec![b'x'; 100]);

        for file in [on_disk, in_memory] {
            assert_eq!(file.read_capped(100).unwrap().len(), 100);
            let err = file.read_capped(99).unwrap_err();
            assert!(matches!(
                err,
                crate::error::FintrackError::Validation(ValidationError::FileTooLarge { max: 99, .. })
            ));
        }
    }

    #[test]
    fn refreshed_picks_up_growth_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tx.csv");
        std::fs::write(&path, b"a;b\n").unwrap();
        let file = SelectedFile::from_path(&path).unwrap();
        assert_eq!(file.size_bytes(), 4);

        std::fs::write(&path, vec![b'x'; 4096]).unwrap();
        assert_eq!(file.size_bytes(), 4);
        assert_eq!(file.refreshed().unwrap().size_bytes(), 4096);

        let memory = SelectedFile::in_memory("tx.csv", None, b"abc".to_vec());
        assert_eq!(memory.refreshed().unwrap().size_bytes(), 3);
    }

    #[test]
    fn refreshed_fails_once_file_is_gone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tx.csv");
        std::fs::write(&path, b"a;b\n").unwrap();
        let file = SelectedFile::from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(file.refreshed(), Err(crate::error::FintrackError::Io(_))));
    }

    #[test]
    fn from_path_unknown_extension_has_no_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();
        let file = SelectedFile::from_path(&path).unwrap();
        assert_eq!(file.mime_type(), None);
    }

    #[test]
    fn from_path_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SelectedFile::from_path(dir.path().join("nope.csv")).is_err());
    }

    #[test]
    fn debug_hides_contents() {
        let file = SelectedFile::in_memory("tx.csv", None, b"secret".to_vec());
        let debug = format!("{file:?}");
        assert!(debug.contains("6 bytes"));
        assert!(!debug.contains("secret"));
    }
}
