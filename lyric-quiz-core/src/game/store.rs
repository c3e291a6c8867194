use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use super::session::GameSession;

pub type SharedSession = Arc<Mutex<GameSession>>;

/// Live sessions keyed by id.
///
/// The map lock is only held to look up, insert or remove an entry. Each
/// session has its own mutex, so work on one session never waits for
/// another.
#[derive(Debug, Default)]
pub struct SessionStore {
	sessions: RwLock<HashMap<String, SharedSession>>,
}

impl SessionStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&self, session: GameSession) {
		let id = session.id().to_owned();
		let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
		sessions.insert(id, Arc::new(Mutex::new(session)));
	}

	pub fn get(&self, id: &str) -> Option<SharedSession> {
		let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
		sessions.get(id).cloned()
	}

	/// Returns whether a session was removed.
	pub fn remove(&self, id: &str) -> bool {
		let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
		sessions.remove(id).is_some()
	}

	pub fn len(&self) -> usize {
		self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Locks one session, recovering it if a previous holder panicked.
pub fn lock_session(session: &SharedSession) -> MutexGuard<'_, GameSession> {
	session.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::thread;

	#[test]
	fn test_insert_get_remove() {
		let store = SessionStore::new();
		store.insert(GameSession::new("a", 100));
		store.insert(GameSession::new("b", 50));

		assert_eq!(store.len(), 2);
		let b = store.get("b").unwrap();
		assert_eq!(lock_session(&b).score(), 50);
		assert!(store.get("c").is_none());

		assert!(store.remove("a"));
		assert!(!store.remove("a"));
		assert_eq!(store.len(), 1);
	}

	#[test]
	fn test_handle_outlives_removal() {
		let store = SessionStore::new();
		store.insert(GameSession::new("a", 100));
		let handle = store.get("a").unwrap();
		assert!(store.remove("a"));
		assert_eq!(lock_session(&handle).id(), "a");
		assert!(store.is_empty());
	}

	#[test]
	fn test_concurrent_inserts_are_all_kept() {
		let store = Arc::new(SessionStore::new());
		let handles: Vec<_> = (0..8)
			.map(|t| {
				let store = Arc::clone(&store);
				thread::spawn(move || {
					for i in 0..50 {
						store.insert(GameSession::new(format!("{t}-{i}"), 100));
					}
				})
			})
			.collect();
		for handle in handles {
			handle.join().unwrap();
		}
		assert_eq!(store.len(), 400);
	}
}
