use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use secrecy::SecretString;

use super::{
    Session, SessionStore, SessionStoreError, StoredValues, decode, encode, with_refreshed_token,
};

/// Session store backed by a JSON file.
///
/// The file holds a flat object with the three session keys. Writes go to a
/// sibling temporary file that is then renamed over the target, so a reader
/// sees either the old session or the new one. On Unix the file is created
/// with mode `0600`.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_values(&self) -> Option<StoredValues> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read session file");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(values) => Some(values),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Session file is malformed, ignoring it");
                None
            }
        }
    }

    /// A sibling temp file unique to this write, so concurrent writers in
    /// other processes never share one.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(format!(".{}.tmp", uuid::Uuid::new_v4()));
        self.path.with_file_name(name)
    }

    /// Write `values` atomically. Callers hold `self.lock`.
    fn write_values(&self, values: &StoredValues) -> Result<(), SessionStoreError> {
        let contents = serde_json::to_vec_pretty(values)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        let written = open_private(&temp)
            .and_then(|mut file| {
                file.write_all(&contents)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&temp, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<Session> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        decode(&self.read_values()?)
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        let values = encode(session)?;
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_values(&values)
    }

    fn replace_access_token(
        &self,
        refresh_token: &SecretString,
        access_token: SecretString,
    ) -> Result<Option<Session>, SessionStoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.read_values().and_then(|values| decode(&values));
        let Some(session) = with_refreshed_token(current, refresh_token, access_token) else {
            return Ok(None);
        };
        self.write_values(&encode(&session)?)?;
        Ok(Some(session))
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::{ExposeSecret, SecretString};

    use super::*;
    use crate::session::tests::session;

    fn temp_store() -> FileSessionStore {
        let dir = std::env::temp_dir().join(format!("vws-session-{}", uuid::Uuid::new_v4()));
        FileSessionStore::new(dir.join("session.json"))
    }

    fn dir_entries(store: &FileSessionStore) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(store.path().parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = temp_store();
        assert!(store.load().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_survives_restart() {
        let store = temp_store();
        store.save(&session("access-1")).unwrap();

        let reopened = FileSessionStore::new(store.path());
        let loaded = reopened.load().unwrap();
        assert_eq!(loaded.access_token.expose_secret(), "access-1");
        assert_eq!(loaded.user.username, "jdoe");

        fs::remove_dir_all(store.path().parent().unwrap()).unwrap();
    }

    #[test]
    fn test_save_replaces_previous_session() {
        let store = temp_store();
        store.save(&session("access-1")).unwrap();
        store
            .save(&session("access-1").with_access_token(SecretString::from("access-2")))
            .unwrap();

        assert_eq!(store.load().unwrap().access_token.expose_secret(), "access-2");
        assert_eq!(dir_entries(&store), ["session.json"]);

        fs::remove_dir_all(store.path().parent().unwrap()).unwrap();
    }

    #[test]
    fn test_clear_removes_file() {
        let store = temp_store();
        store.save(&session("access-1")).unwrap();
        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.load().is_none());

        fs::remove_dir_all(store.path().parent().unwrap()).unwrap();
    }

    #[test]
    fn test_garbage_file_is_empty() {
        let store = temp_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "not json at all").unwrap();
        assert!(store.load().is_none());

        fs::write(store.path(), r#"{"access_token": "a", "refresh_token": "r", "user": "null"}"#)
            .unwrap();
        assert!(store.load().is_none());

        fs::remove_dir_all(store.path().parent().unwrap()).unwrap();
    }

    #[test]
    fn test_temp_files_are_unique_per_write() {
        let store = temp_store();
        assert_ne!(store.temp_path(), store.temp_path());
        assert_eq!(store.temp_path().parent(), store.path().parent());
    }

    #[test]
    fn test_replace_access_token_keeps_refresh_token_and_user() {
        let store = temp_store();
        store.save(&session("access-1")).unwrap();

        let updated = store
            .replace_access_token(&SecretString::from("refresh-1"), SecretString::from("access-2"))
            .unwrap()
            .unwrap();
        assert_eq!(updated.access_token.expose_secret(), "access-2");

        let reopened = FileSessionStore::new(store.path()).load().unwrap();
        assert_eq!(reopened.access_token.expose_secret(), "access-2");
        assert_eq!(reopened.refresh_token.expose_secret(), "refresh-1");
        assert_eq!(reopened.user.username, "jdoe");
        assert_eq!(dir_entries(&store), ["session.json"]);

        fs::remove_dir_all(store.path().parent().unwrap()).unwrap();
    }

    #[test]
    fn test_replace_access_token_leaves_cleared_store_alone() {
        let store = temp_store();
        store.save(&session("access-1")).unwrap();
        store.clear().unwrap();

        let updated = store
            .replace_access_token(&SecretString::from("refresh-1"), SecretString::from("access-2"))
            .unwrap();
        assert!(updated.is_none());
        assert!(!store.path().exists());

        fs::remove_dir_all(store.path().parent().unwrap()).unwrap();
    }
}
