// crates/meridian-store/src/file.rs
//
// On-disk snapshot files.
//
// One file per network: `<root_dir>/<network>.json`. The root directory is
// created on save if it does not exist.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use meridian_core::error::MeridianError;
use meridian_core::snapshot::Snapshot;

use crate::bundle;

/// Default user config root for snapshot files.
pub const DEFAULT_ROOT_DIR: &str = "~/.meridian";

/// File extension of persisted snapshots.
pub const SNAPSHOT_EXTENSION: &str = "json";

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// [`DEFAULT_ROOT_DIR`] with `~` expanded.
pub fn default_root_dir() -> PathBuf {
    expand_tilde(DEFAULT_ROOT_DIR)
}

/// Path of the snapshot file for `network` under `root_dir`.
///
/// # Errors
/// Returns `MeridianError::InvalidState` if the network name is empty or
/// would escape `root_dir`.
pub fn snapshot_path(root_dir: &Path, network: &str) -> Result<PathBuf, MeridianError> {
    if network.is_empty()
        || network == "."
        || network == ".."
        || network.contains('/')
        || network.contains('\\')
    {
        return Err(MeridianError::InvalidState(format!(
            "'{}' is not a usable network name",
            network
        )));
    }
    Ok(root_dir.join(format!("{}.{}", network, SNAPSHOT_EXTENSION)))
}

/// Write `snapshot` to `path`, creating parent directories as needed.
///
/// # Errors
/// Returns `MeridianError::Io` on filesystem failure, or the encoding error
/// from [`bundle::serialize`].
pub fn save_to_path(snapshot: &Snapshot, path: &Path) -> Result<(), MeridianError> {
    let bytes = bundle::serialize(snapshot)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            MeridianError::Io(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    fs::write(path, &bytes)
        .map_err(|e| MeridianError::Io(format!("Failed to write {}: {}", path.display(), e)))?;

    tracing::debug!(
        "Wrote snapshot n={} block={} ({} bytes) to {}",
        snapshot.n(),
        snapshot.block(),
        bytes.len(),
        path.display()
    );
    Ok(())
}

/// Read a snapshot from `path`.
///
/// # Errors
/// Returns `MeridianError::NotFound` if the file does not exist,
/// `MeridianError::Io` if it cannot be read, and
/// `MeridianError::Deserialization` if its contents are not a valid bundle.
pub fn load_from_path(path: &Path) -> Result<Snapshot, MeridianError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(MeridianError::NotFound(format!(
                "no snapshot at {}",
                path.display()
            )))
        }
        Err(e) => {
            return Err(MeridianError::Io(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    let snapshot = bundle::deserialize(&bytes)?;
    tracing::debug!(
        "Read snapshot n={} block={} from {}",
        snapshot.n(),
        snapshot.block(),
        path.display()
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::tests::sample_snapshot;

    fn temp_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("meridian_test_{}_{}", label, uuid::Uuid::now_v7()))
    }

    #[test]
    fn save_creates_directories_and_round_trips() {
        let root = temp_dir("save").join("nested").join("deeper");
        let path = snapshot_path(&root, "nakamoto").unwrap();
        let snapshot = sample_snapshot();

        save_to_path(&snapshot, &path).unwrap();
        assert!(path.is_file());

        let restored = load_from_path(&path).unwrap();
        assert_eq!(restored, snapshot);

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let path = temp_dir("missing").join("absent.json");
        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(err, MeridianError::NotFound(_)));
    }

    #[test]
    fn load_corrupt_file_is_deserialization_error() {
        let root = temp_dir("corrupt");
        fs::create_dir_all(&root).unwrap();
        let path = root.join("broken.json");
        fs::write(&path, b"{\"version\": 10, \"n\": ").unwrap();

        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(err, MeridianError::Deserialization(_)));

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn save_over_existing_file_replaces_it() {
        let root = temp_dir("overwrite");
        let path = snapshot_path(&root, "local").unwrap();

        save_to_path(&sample_snapshot(), &path).unwrap();
        save_to_path(&Snapshot::empty(), &path).unwrap();
        assert_eq!(load_from_path(&path).unwrap().n(), 0);

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn snapshot_path_uses_network_name() {
        let path = snapshot_path(Path::new("/var/lib/meridian"), "kusanagi").unwrap();
        assert_eq!(path, PathBuf::from("/var/lib/meridian/kusanagi.json"));
    }

    #[test]
    fn snapshot_path_rejects_traversal() {
        let root = Path::new("/tmp");
        assert!(snapshot_path(root, "").is_err());
        assert!(snapshot_path(root, "..").is_err());
        assert!(snapshot_path(root, "../etc/passwd").is_err());
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths_alone() {
        assert_eq!(expand_tilde("/opt/meridian"), PathBuf::from("/opt/meridian"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/.meridian"), home.join(".meridian"));
        }
    }
}
