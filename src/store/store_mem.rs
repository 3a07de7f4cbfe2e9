use std::collections::HashMap;
use std::sync::Mutex;

use log::error;

use crate::store::{CreateError, FindError, USER_ID_STEP};
use crate::user::User;

type Result<T> = std::result::Result<T, ()>;

/// In-memory stand-in for the redis store, same surface. Sessions never
/// expire here; tests don't run for a week.
pub struct Store {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_user_id: i64,
    users: HashMap<i64, User>,
    usernames: HashMap<String, i64>,
    posts: Vec<String>,
    sessions: HashMap<String, String>,
}

impl Store {
    pub async fn new(_host: &str, _port: u16) -> Result<Self> {
        Ok(Self {
            inner: Mutex::new(Inner::default()),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| {
            error!("store mutex poisoned");
            e.into_inner()
        })
    }
}

impl Store {
    pub async fn create_user(
        &self,
        username: &str,
        pwhash: &str,
    ) -> std::result::Result<i64, CreateError> {
        let mut inner = self.lock();

        inner.next_user_id += USER_ID_STEP;
        let id = inner.next_user_id;

        if inner.usernames.contains_key(username) {
            return Err(CreateError::UsernameTaken);
        }

        inner.usernames.insert(username.into(), id);
        inner.users.insert(
            id,
            User {
                id,
                username: username.into(),
                pwhash: pwhash.into(),
            },
        );

        Ok(id)
    }

    pub async fn find_user(&self, username: &str) -> std::result::Result<User, FindError> {
        let inner = self.lock();

        let id = inner.usernames.get(username).ok_or(FindError::NotFound)?;

        inner.users.get(id).cloned().ok_or_else(|| {
            error!("username index points at missing user {id}");
            FindError::Internal
        })
    }
}

impl Store {
    pub async fn add_post(&self, entry: &str) -> Result<()> {
        self.lock().posts.push(entry.into());
        Ok(())
    }

    pub async fn posts(&self) -> Result<Vec<String>> {
        Ok(self.lock().posts.clone())
    }
}

impl Store {
    pub async fn create_session(&self, session_id: &str, username: &str) -> Result<()> {
        self.lock()
            .sessions
            .insert(session_id.into(), username.into());
        Ok(())
    }

    pub async fn session_user(&self, session_id: &str) -> Result<Option<String>> {
        Ok(self.lock().sessions.get(session_id).cloned())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn user_ids_step_by_1000() {
        let store = Store::new("", 0).await.unwrap();

        let alice = store.create_user("alice", "ha").await.unwrap();
        let bob = store.create_user("bob", "hb").await.unwrap();

        assert_eq!(alice, 1000);
        assert_eq!(bob, alice + USER_ID_STEP);
    }

    #[tokio::test]
    async fn duplicate_usernames_are_rejected() {
        let store = Store::new("", 0).await.unwrap();

        store.create_user("alice", "ha").await.unwrap();
        assert!(matches!(
            store.create_user("alice", "hb").await,
            Err(CreateError::UsernameTaken)
        ));
    }

    #[tokio::test]
    async fn find_user_returns_stored_hash() {
        let store = Store::new("", 0).await.unwrap();

        let id = store.create_user("alice", "ha").await.unwrap();
        let user = store.find_user("alice").await.unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.pwhash, "ha");

        assert!(matches!(
            store.find_user("nobody").await,
            Err(FindError::NotFound)
        ));
    }

    #[tokio::test]
    async fn posts_keep_append_order() {
        let store = Store::new("", 0).await.unwrap();

        store.add_post("first").await.unwrap();
        store.add_post("second").await.unwrap();

        assert_eq!(store.posts().await.unwrap(), ["first", "second"]);
    }

    #[tokio::test]
    async fn sessions_resolve_to_their_user() {
        let store = Store::new("", 0).await.unwrap();

        store.create_session("s1", "alice").await.unwrap();

        assert_eq!(
            store.session_user("s1").await.unwrap().as_deref(),
            Some("alice")
        );
        assert_eq!(store.session_user("s2").await.unwrap(), None);
    }
}
