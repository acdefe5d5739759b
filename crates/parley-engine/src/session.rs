//! Session identity.
//!
//! A session identifier correlates every request from one storage profile
//! with one server-side conversation. It is generated once, persisted, and
//! reused until the store is cleared.

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{info, warn};

use crate::storage::KeyValueStore;

/// Storage key holding the session identifier.
pub const SESSION_KEY: &str = "sessionId";

/// Return the persisted session identifier, creating one if absent.
///
/// Storage failures never surface: an unreadable value counts as absent and
/// a failed write still returns the freshly generated identifier, which then
/// lives only as long as the caller keeps it.
pub fn get_or_create_session_id(store: &mut dyn KeyValueStore) -> String {
    match store.get(SESSION_KEY) {
        Ok(Some(id)) if !id.trim().is_empty() => return id,
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Could not read session id, generating a new one"),
    }

    let id = generate_session_id();
    if let Err(e) = store.set(SESSION_KEY, &id) {
        warn!(error = %e, "Could not persist session id, keeping it in memory");
    }
    info!(session_id = %id, "Created new session");
    id
}

/// Forget the persisted session so the next lookup generates a new one.
pub fn clear_session_id(store: &mut dyn KeyValueStore) {
    if let Err(e) = store.remove(SESSION_KEY) {
        warn!(error = %e, "Could not clear session id");
    }
}

/// Build `session-<unix millis>-<base36 suffix>`.
pub fn generate_session_id() -> String {
    let millis = Utc::now().timestamp_millis();
    format!("session-{millis}-{}", to_base36(random_suffix()))
}

/// OS randomness when available, otherwise the thread-local generator.
fn random_suffix() -> u32 {
    let mut bytes = [0u8; 4];
    match OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => u32::from_le_bytes(bytes),
        Err(e) => {
            warn!(error = %e, "OS randomness unavailable, falling back to thread rng");
            rand::random()
        }
    }
}

fn to_base36(mut n: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if n == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageError};

    /// Store whose writes always fail.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_session_id_is_stable_for_same_store() {
        let mut store = MemoryStore::new();
        let first = get_or_create_session_id(&mut store);
        let second = get_or_create_session_id(&mut store);
        assert_eq!(first, second);
        assert_eq!(store.get(SESSION_KEY).unwrap(), Some(first));
    }

    #[test]
    fn test_session_id_differs_across_fresh_stores() {
        let a = get_or_create_session_id(&mut MemoryStore::new());
        let b = get_or_create_session_id(&mut MemoryStore::new());
        assert_ne!(a, b);
    }

    #[test]
    fn test_existing_session_is_reused() {
        let mut store = MemoryStore::new();
        store.set(SESSION_KEY, "session-42-xyz").unwrap();
        assert_eq!(get_or_create_session_id(&mut store), "session-42-xyz");
    }

    #[test]
    fn test_session_id_format() {
        let id = generate_session_id();
        let parts: Vec<&str> = id.splitn(3, '-').collect();
        assert_eq!(parts[0], "session");
        assert!(parts[1].parse::<i64>().is_ok());
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_write_failure_still_returns_id() {
        let mut store = ReadOnlyStore;
        let id = get_or_create_session_id(&mut store);
        assert!(id.starts_with("session-"));
    }

    #[test]
    fn test_clear_session_rotates_on_next_lookup() {
        let mut store = MemoryStore::new();
        let first = get_or_create_session_id(&mut store);
        clear_session_id(&mut store);
        assert_eq!(store.get(SESSION_KEY).unwrap(), None);
        let second = get_or_create_session_id(&mut store);
        assert_ne!(first, second);
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(u32::MAX), "1z141z3");
    }
}
