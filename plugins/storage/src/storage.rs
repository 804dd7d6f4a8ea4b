//! File operations backing the shared storage document

use serde_json::{Map, Value};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Name of the shared storage file inside the host's config directory
pub const STORAGE_FILE_NAME: &str = ".pluginstorage.json";

/// The whole on-disk document: namespace -> that namespace's key/value map
pub type Document = Map<String, Value>;

/// Get the shared storage file path for a config directory
pub fn storage_path(config_dir: &Path) -> PathBuf {
    config_dir.join(STORAGE_FILE_NAME)
}

/// Read the storage file
///
/// Returns `Ok(None)` if the file doesn't exist.
pub(crate) fn read_contents(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Parse file contents into a document
///
/// Whitespace-only contents hold no document and yield `Ok(None)`. Anything
/// else must be a UTF-8 JSON object.
pub(crate) fn parse_document(contents: &[u8]) -> Result<Option<Document>, serde_json::Error> {
    if contents.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(contents).map(Some)
}

/// Read the current document before merging on save
///
/// A missing, unreadable or blank file counts as an empty document. Content
/// that does not parse is returned as an error so it is never overwritten.
pub(crate) fn read_document_for_merge(path: &Path) -> Result<Document, serde_json::Error> {
    match read_contents(path) {
        Ok(Some(contents)) => Ok(parse_document(&contents)?.unwrap_or_default()),
        Ok(None) => Ok(Document::new()),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "ignoring unreadable storage file while merging");
            Ok(Document::new())
        }
    }
}

/// Write serialized bytes to `path`
///
/// The bytes land in a sibling temp file first and are renamed over `path`,
/// so readers see either the old or the new document. The result is readable
/// by the owner only.
pub(crate) fn write_contents(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    // NamedTempFile is created 0o600 on unix
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    ensure_owner_only(path)?;

    #[cfg(unix)]
    {
        if let Ok(dir) = fs::File::open(dir) {
            let _ = dir.sync_all();
        }
    }
    Ok(())
}

fn ensure_owner_only(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_is_inside_config_dir() {
        assert_eq!(
            storage_path(Path::new("/etc/certmgr")),
            PathBuf::from("/etc/certmgr/.pluginstorage.json")
        );
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_contents(&dir.path().join("nope.json")).unwrap().is_none());
    }

    #[test]
    fn blank_contents_hold_no_document() {
        assert!(parse_document(b"").unwrap().is_none());
        assert!(parse_document(b"  \n\t").unwrap().is_none());
    }

    #[test]
    fn non_object_top_level_is_rejected() {
        assert!(parse_document(b"invalid json").is_err());
        assert!(parse_document(b"[1, 2]").is_err());
        assert!(parse_document(b"\"text\"").is_err());
        assert!(parse_document(&[0xff, 0xfe, b'{', b'}']).is_err());
    }

    #[test]
    fn merge_read_tolerates_missing_and_blank_but_not_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = storage_path(dir.path());
        assert!(read_document_for_merge(&path).unwrap().is_empty());

        fs::write(&path, " \n").unwrap();
        assert!(read_document_for_merge(&path).unwrap().is_empty());

        fs::write(&path, r#"{"a": {"k": 1}}"#).unwrap();
        assert_eq!(read_document_for_merge(&path).unwrap()["a"], json!({"k": 1}));

        fs::write(&path, "{not json").unwrap();
        assert!(read_document_for_merge(&path).is_err());
    }

    #[test]
    fn write_replaces_contents_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(STORAGE_FILE_NAME);

        write_contents(&path, b"{\"first\": {}}").unwrap();
        write_contents(&path, b"{}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name() != STORAGE_FILE_NAME)
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn written_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = storage_path(dir.path());
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_contents(&path, b"{}").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
