//! JSON file persistence
//!
//! Features:
//! - Atomic whole-file writes (tmp → fsync → rename)
//! - Typed errors distinguishing missing, malformed and unreadable files
//! - Corrupt-file backup so a bad file is kept for inspection but never reread

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::RacerError;

/// Read and parse a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, RacerError> {
    let text = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RacerError::ConfigMissing(path.to_path_buf())
        } else {
            RacerError::io(path, e)
        }
    })?;
    serde_json::from_str(&text).map_err(|source| RacerError::ConfigMalformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `value` as pretty JSON, replacing `path` atomically
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), RacerError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| RacerError::io(parent, e))?;
    }
    let tmp = tmp_path(path);
    let data = serde_json::to_vec_pretty(value).map_err(|source| RacerError::ConfigMalformed {
        path: path.to_path_buf(),
        source,
    })?;
    {
        let mut file = fs::File::create(&tmp).map_err(|e| RacerError::io(&tmp, e))?;
        file.write_all(&data).map_err(|e| RacerError::io(&tmp, e))?;
        file.sync_all().map_err(|e| RacerError::io(&tmp, e))?;
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        RacerError::io(path, e)
    })
}

/// Move an unreadable file aside to `<name>.bak`, returning the backup path
pub fn backup_corrupt(path: &Path) -> Option<PathBuf> {
    let backup = with_suffix(path, "bak");
    match fs::rename(path, &backup) {
        Ok(()) => {
            log::warn!("Backed up unreadable {} to {}", path.display(), backup.display());
            Some(backup)
        }
        Err(e) => {
            log::warn!("Could not back up {}: {}", path.display(), e);
            None
        }
    }
}

/// Load a config file, falling back to `T::default()` on any failure.
///
/// Missing files and read errors warn; malformed files warn and are backed up.
pub fn load_or_default<T: DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    match read_json(path) {
        Ok(value) => {
            log::info!("Loaded {} from {}", what, path.display());
            value
        }
        Err(RacerError::ConfigMissing(_)) => {
            log::warn!("No {} at {}, using defaults", what, path.display());
            T::default()
        }
        Err(err @ RacerError::ConfigMalformed { .. }) => {
            log::warn!("{}; using default {}", err, what);
            backup_corrupt(path);
            T::default()
        }
        Err(err) => {
            log::warn!("{}; using default {}", err, what);
            T::default()
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    with_suffix(path, "tmp")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

/// Fresh scratch directory for filesystem tests
#[cfg(test)]
pub(crate) fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("retro_racer_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create test dir");
    dir
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        values: Vec<u32>,
    }

    #[test]
    fn test_write_then_read() {
        let dir = test_dir("persist_rw");
        let path = dir.join("sample.json");
        let sample = Sample {
            name: "abc".into(),
            values: vec![3, 2, 1],
        };
        write_json_atomic(&path, &sample).unwrap();
        assert!(!tmp_path(&path).exists());
        let loaded: Sample = read_json(&path).unwrap();
        assert_eq!(loaded, sample);
    }

    #[test]
    fn test_missing_file() {
        let dir = test_dir("persist_missing");
        let result: Result<Sample, _> = read_json(&dir.join("nope.json"));
        assert!(matches!(result, Err(RacerError::ConfigMissing(_))));
        let fallback: Sample = load_or_default(&dir.join("nope.json"), "sample");
        assert_eq!(fallback, Sample::default());
    }

    #[test]
    fn test_malformed_file_is_backed_up() {
        let dir = test_dir("persist_bad");
        let path = dir.join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let result: Result<Sample, _> = read_json(&path);
        assert!(matches!(result, Err(RacerError::ConfigMalformed { .. })));

        let fallback: Sample = load_or_default(&path, "sample");
        assert_eq!(fallback, Sample::default());
        assert!(!path.exists());
        assert!(dir.join("bad.json.bak").exists());
    }

    #[test]
    fn test_write_creates_parent() {
        let dir = test_dir("persist_parent");
        let path = dir.join("nested").join("deeper").join("s.json");
        write_json_atomic(&path, &Sample::default()).unwrap();
        assert!(path.exists());
    }
}
