use crate::api::LoginGrant;
use crate::cache::LocalStorage;
use crate::models::Session;
use mockable::Clock;
use std::io;
use std::sync::Arc;
use tracing::info;

pub const SESSION_KEY: &str = "pgp_admin_session";

/// Persisted admin session. The API decides whether the token is still
/// valid; nothing here expires it.
pub struct SessionStore {
    storage: LocalStorage,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(storage: LocalStorage, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Stored session, or `None` when absent or unreadable (unreadable ones are removed)
    pub fn load(&self) -> Option<Session> {
        self.storage.get_json(SESSION_KEY)
    }

    pub fn save(&self, grant: LoginGrant) -> io::Result<Session> {
        let session = Session {
            username: grant.username,
            token: grant.token,
            login_time: self.clock.utc(),
        };
        self.storage.set_json(SESSION_KEY, &session)?;
        info!("Logged in as {}", session.username);
        Ok(session)
    }

    pub fn clear(&self) -> io::Result<()> {
        self.storage.remove_item(SESSION_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MutableClock;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> SessionStore {
        SessionStore::new(
            LocalStorage::open(dir.path()).unwrap(),
            Arc::new(MutableClock::at_epoch_secs(1_700_000_000)),
        )
    }

    #[test]
    fn saved_session_loads_back() {
        let dir = TempDir::new().unwrap();
        let sessions = store(&dir);

        let saved = sessions
            .save(LoginGrant {
                username: "admin".to_string(),
                token: "tok-123".to_string(),
            })
            .unwrap();

        assert_eq!(sessions.load(), Some(saved.clone()));
        assert_eq!(saved.login_time.timestamp(), 1_700_000_000);
    }

    #[test]
    fn stored_shape_uses_login_time_key() {
        let dir = TempDir::new().unwrap();
        let sessions = store(&dir);
        sessions
            .save(LoginGrant {
                username: "admin".to_string(),
                token: "t".to_string(),
            })
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join("pgp_admin_session.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["username"], "admin");
        assert_eq!(value["loginTime"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn corrupt_session_is_dropped() {
        let dir = TempDir::new().unwrap();
        let sessions = store(&dir);
        std::fs::write(dir.path().join("pgp_admin_session.json"), "admin").unwrap();

        assert_eq!(sessions.load(), None);
        assert!(!dir.path().join("pgp_admin_session.json").exists());
    }

    #[test]
    fn clear_removes_session() {
        let dir = TempDir::new().unwrap();
        let sessions = store(&dir);
        sessions
            .save(LoginGrant {
                username: "admin".to_string(),
                token: "t".to_string(),
            })
            .unwrap();

        sessions.clear().unwrap();
        assert_eq!(sessions.load(), None);
    }
}
