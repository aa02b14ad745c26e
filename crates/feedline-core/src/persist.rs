// ── Local snapshot persistence ──
//
// A JSON snapshot of the merged records plus a one-line marker file.
// Loads never fail: an absent or unreadable file means empty state.
// Saves replace the whole file atomically (temp file in the same
// directory, then rename).

use std::fs;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::CoreError;

/// JSON snapshot of `T` at a fixed path.
#[derive(Debug, Clone)]
pub struct SnapshotFile<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SnapshotFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot, or `T::default()` if it is absent or corrupt.
    pub fn load(&self) -> T {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot yet");
                return T::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "snapshot unreadable, starting empty");
                return T::default();
            }
        };

        serde_json::from_slice(&raw).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "snapshot corrupt, starting empty");
            T::default()
        })
    }

    /// Overwrite the snapshot with `value`.
    pub fn save(&self, value: &T) -> Result<(), CoreError> {
        let json = serde_json::to_vec_pretty(value)
            .map_err(|e| CoreError::Internal(format!("snapshot encoding failed: {e}")))?;
        write_atomic(&self.path, &json)
    }
}

/// Single opaque string: the last `Last-Modified` seen.
#[derive(Debug, Clone)]
pub struct MarkerFile {
    path: PathBuf,
}

impl MarkerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored marker. Empty or missing files mean "fetch everything".
    pub fn load(&self) -> Option<String> {
        fs::read_to_string(&self.path)
            .ok()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
    }

    pub fn save(&self, marker: &str) -> Result<(), CoreError> {
        write_atomic(&self.path, marker.as_bytes())
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), CoreError> {
    let persistence = |source| CoreError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(persistence)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(persistence)?;
    tmp.write_all(contents).map_err(persistence)?;
    tmp.as_file().sync_all().map_err(persistence)?;
    tmp.persist(path).map_err(|e| persistence(e.error))?;

    debug!(path = %path.display(), bytes = contents.len(), "written");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Aggregate;
    use crate::model::{Activity, RecordId};
    use pretty_assertions::assert_eq;

    fn activity(id: &str) -> Activity {
        Activity {
            id: RecordId::new(id),
            actor: "octo".into(),
            repo: "ReactiveX/RxSwift".into(),
            action: "PushEvent".into(),
            avatar_url: Some("https://avatars.test/u/1".into()),
            created_at: None,
        }
    }

    #[test]
    fn snapshot_round_trips_aggregate() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::<Vec<Activity>>::new(dir.path().join("activity.json"));
        let agg = Aggregate::from_records(vec![activity("2"), activity("1")], 50);

        file.save(&agg.records().to_vec()).unwrap();
        let loaded = Aggregate::from_records(file.load(), 50);

        assert_eq!(loaded, agg);
    }

    #[test]
    fn absent_snapshot_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::<Vec<Activity>>::new(dir.path().join("missing.json"));
        assert!(file.load().is_empty());
    }

    #[test]
    fn corrupt_snapshot_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.json");
        fs::write(&path, "[{\"id\": ").unwrap();

        let file = SnapshotFile::<Vec<Activity>>::new(&path);
        assert!(file.load().is_empty());
    }

    #[test]
    fn save_replaces_whole_file_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::<Vec<Activity>>::new(dir.path().join("activity.json"));

        file.save(&vec![activity("1"), activity("2"), activity("3")]).unwrap();
        file.save(&vec![activity("9")]).unwrap();

        assert_eq!(file.load(), vec![activity("9")]);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn save_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let file = MarkerFile::new(dir.path().join("nested/cache/modified.txt"));
        file.save("Tue, 01 Aug 2017 10:00:00 GMT").unwrap();
        assert_eq!(file.load().as_deref(), Some("Tue, 01 Aug 2017 10:00:00 GMT"));
    }

    #[test]
    fn blank_marker_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modified.txt");
        fs::write(&path, "  \n").unwrap();
        assert_eq!(MarkerFile::new(&path).load(), None);
        assert_eq!(MarkerFile::new(dir.path().join("nope")).load(), None);
    }
}
