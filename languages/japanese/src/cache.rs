//! On-disk snapshot of a built [`JMdict`], so start-up can skip parsing.
//!
//! Layout: `MGKI` magic, little-endian `u32` format version, then the
//! bincode-encoded [`SourceStamp`] and index.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use bincode::Options;
use manganki_core::{CacheError, LoadError};
use serde::{Deserialize, Serialize};

use crate::dictionary::JMdict;

const SNAPSHOT_MAGIC: &[u8; 4] = b"MGKI";
const HEADER_LEN: u64 = 8;

/// Bump when `JMdict` or `DictionaryEntry` change shape
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Identifies the source a snapshot was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStamp {
    pub source: PathBuf,
    pub preferred_language: String,
    pub source_len: u64,
    pub modified_secs: Option<u64>,
}

impl SourceStamp {
    pub fn for_source(path: &Path, preferred_language: &str) -> Result<Self, LoadError> {
        let metadata = fs::metadata(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let modified_secs = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|elapsed| elapsed.as_secs());

        Ok(Self {
            source: path.to_path_buf(),
            preferred_language: preferred_language.to_string(),
            source_len: metadata.len(),
            modified_secs,
        })
    }

    fn mismatch(&self, expected: &SourceStamp) -> Option<String> {
        if self.source != expected.source {
            Some(format!(
                "built from {}, expected {}",
                self.source.display(),
                expected.source.display()
            ))
        } else if self.preferred_language != expected.preferred_language {
            Some(format!(
                "built for language {}, expected {}",
                self.preferred_language, expected.preferred_language
            ))
        } else if self.source_len != expected.source_len
            || self.modified_secs != expected.modified_secs
        {
            Some("source file changed".to_string())
        } else {
            None
        }
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    stamp: Option<&'a SourceStamp>,
    index: &'a JMdict,
}

#[derive(Deserialize)]
struct Snapshot {
    stamp: Option<SourceStamp>,
    index: JMdict,
}

/// Write `index` to `path`, replacing any previous snapshot atomically.
pub fn save_snapshot(
    index: &JMdict,
    stamp: Option<&SourceStamp>,
    path: &Path,
) -> Result<(), CacheError> {
    let io_error = |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() {
            fs::create_dir_all(parent_dir).map_err(io_error)?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let result = write_snapshot(index, stamp, &tmp_path).and_then(|()| {
        fs::rename(&tmp_path, path).map_err(io_error)
    });

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }

    result
}

fn write_snapshot(
    index: &JMdict,
    stamp: Option<&SourceStamp>,
    path: &Path,
) -> Result<(), CacheError> {
    let io_error = |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);

    writer.write_all(SNAPSHOT_MAGIC).map_err(io_error)?;
    writer
        .write_all(&SNAPSHOT_FORMAT_VERSION.to_le_bytes())
        .map_err(io_error)?;

    bincode::serialize_into(&mut writer, &SnapshotRef { stamp, index })
        .map_err(|e| bincode_error(path, e))?;

    writer.flush().map_err(io_error)?;
    Ok(())
}

/// Read a snapshot. With `expected` set, a snapshot built from another
/// source (or without a stamp) is rejected as stale.
pub fn load_snapshot(path: &Path, expected: Option<&SourceStamp>) -> Result<JMdict, CacheError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => CacheError::Missing {
            path: path.to_path_buf(),
        },
        _ => CacheError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let file_len = file
        .metadata()
        .map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    let mut reader = BufReader::new(file);

    let mut header = [0u8; HEADER_LEN as usize];
    reader.read_exact(&mut header).map_err(|source| match source.kind() {
        io::ErrorKind::UnexpectedEof => CacheError::Corrupt {
            path: path.to_path_buf(),
            message: "truncated header".to_string(),
        },
        _ => CacheError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    if &header[..4] != SNAPSHOT_MAGIC {
        return Err(CacheError::Corrupt {
            path: path.to_path_buf(),
            message: "not a dictionary snapshot".to_string(),
        });
    }

    let found = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    if found != SNAPSHOT_FORMAT_VERSION {
        return Err(CacheError::VersionMismatch {
            path: path.to_path_buf(),
            found,
            expected: SNAPSHOT_FORMAT_VERSION,
        });
    }

    // Length prefixes can never exceed what is left of the file
    let snapshot: Snapshot = bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_limit(file_len.saturating_sub(HEADER_LEN))
        .deserialize_from(reader)
        .map_err(|e| bincode_error(path, e))?;

    if let Some(expected) = expected {
        let reason = match &snapshot.stamp {
            Some(stamp) => stamp.mismatch(expected),
            None => Some("snapshot has no source stamp".to_string()),
        };
        if let Some(reason) = reason {
            return Err(CacheError::Stale {
                path: path.to_path_buf(),
                reason,
            });
        }
    }

    Ok(snapshot.index)
}

fn bincode_error(path: &Path, err: bincode::Error) -> CacheError {
    match *err {
        bincode::ErrorKind::Io(source) if source.kind() != io::ErrorKind::UnexpectedEof => {
            CacheError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
        other => CacheError::Corrupt {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}

impl JMdict {
    /// Save without a source stamp; see [`save_snapshot`]
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        save_snapshot(self, None, path)
    }

    /// Load any snapshot regardless of its source
    pub fn load(path: &Path) -> Result<JMdict, CacheError> {
        load_snapshot(path, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::tests::sample;

    fn stamp(language: &str) -> SourceStamp {
        SourceStamp {
            source: PathBuf::from("/data/jmdict.json"),
            preferred_language: language.to_string(),
            source_len: 1024,
            modified_secs: Some(1_700_000_000),
        }
    }

    #[test]
    fn round_trip_preserves_lookups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jmdict.snapshot");
        let dict = sample();

        dict.save(&path).unwrap();
        let loaded = JMdict::load(&path).unwrap();

        assert_eq!(loaded, dict);
        for key in ["箸", "はし", "はじ", "それ", "端"] {
            assert_eq!(loaded.lookup(key), dict.lookup(key), "key {key}");
        }
        assert_eq!(loaded.get_languages(), dict.get_languages());
    }

    #[test]
    fn save_creates_parent_dirs_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("nested").join("jmdict.snapshot");

        sample().save(&path).unwrap();

        assert!(path.exists());
        let names: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = JMdict::load(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, CacheError::Missing { .. }));
    }

    #[test]
    fn foreign_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foreign");
        fs::write(&path, b"PK\x03\x04 definitely a zip").unwrap();

        assert!(matches!(JMdict::load(&path), Err(CacheError::Corrupt { .. })));
    }

    #[test]
    fn truncated_snapshot_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jmdict.snapshot");
        sample().save(&path).unwrap();

        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();
        assert!(matches!(JMdict::load(&path), Err(CacheError::Corrupt { .. })));

        fs::write(&path, &bytes[..3]).unwrap();
        assert!(matches!(JMdict::load(&path), Err(CacheError::Corrupt { .. })));
    }

    #[test]
    fn oversized_length_prefix_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jmdict.snapshot");

        let mut bytes = Vec::new();
        bytes.extend_from_slice(SNAPSHOT_MAGIC);
        bytes.extend_from_slice(&SNAPSHOT_FORMAT_VERSION.to_le_bytes());
        bytes.push(0); // no stamp
        bytes.extend_from_slice(&1u64.to_le_bytes()); // one entry
        bytes.extend_from_slice(&(1u64 << 40).to_le_bytes()); // id length
        bytes.extend_from_slice(b"1358280");
        fs::write(&path, bytes).unwrap();

        assert!(matches!(JMdict::load(&path), Err(CacheError::Corrupt { .. })));
    }

    #[test]
    fn other_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jmdict.snapshot");
        sample().save(&path).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes[4..8].copy_from_slice(&(SNAPSHOT_FORMAT_VERSION + 1).to_le_bytes());
        fs::write(&path, bytes).unwrap();

        match JMdict::load(&path) {
            Err(CacheError::VersionMismatch { found, expected, .. }) => {
                assert_eq!(found, SNAPSHOT_FORMAT_VERSION + 1);
                assert_eq!(expected, SNAPSHOT_FORMAT_VERSION);
            }
            other => panic!("expected version mismatch, got {other:?}"),
        }
    }

    #[test]
    fn stamp_must_match_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jmdict.snapshot");
        save_snapshot(&sample(), Some(&stamp("eng")), &path).unwrap();

        assert!(load_snapshot(&path, Some(&stamp("eng"))).is_ok());
        assert!(matches!(
            load_snapshot(&path, Some(&stamp("ger"))),
            Err(CacheError::Stale { .. })
        ));

        let mut changed = stamp("eng");
        changed.source_len += 1;
        assert!(matches!(
            load_snapshot(&path, Some(&changed)),
            Err(CacheError::Stale { .. })
        ));
    }

    #[test]
    fn unstamped_snapshot_is_stale_for_stamped_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jmdict.snapshot");
        sample().save(&path).unwrap();

        assert!(matches!(
            load_snapshot(&path, Some(&stamp("eng"))),
            Err(CacheError::Stale { .. })
        ));
    }
}
