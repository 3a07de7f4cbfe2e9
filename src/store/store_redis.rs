use std::collections::HashMap;

use log::{error, info};
use redis::{aio::ConnectionManager, AsyncCommands, Client};

use crate::store::{CreateError, FindError, SESSION_TTL_SECS, USER_ID_STEP};
use crate::user::User;

type Result<T> = std::result::Result<T, ()>;

pub struct Store {
    conn: ConnectionManager,
}

fn user_key(id: i64) -> String {
    format!("user:{id}")
}

fn username_key(username: &str) -> String {
    format!("username:{username}")
}

fn session_key(session_id: &str) -> String {
    format!("session:{session_id}")
}

const KEY_NEXT_USER_ID: &str = "next_user_id";
const KEY_POSTS: &str = "posts";

impl Store {
    pub async fn new(host: &str, port: u16) -> Result<Self> {
        let url = format!("redis://{host}:{port}/");

        let client = Client::open(url.as_str()).map_err(|e| {
            error!("invalid redis url {url}: {e}");
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            error!("couldn't connect to redis at {host}:{port}: {e}");
        })?;

        info!("connected to redis at {host}:{port}");
        Ok(Self { conn })
    }

    fn conn(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

impl Store {
    pub async fn create_user(
        &self,
        username: &str,
        pwhash: &str,
    ) -> std::result::Result<i64, CreateError> {
        let mut conn = self.conn();

        let emap = |e: redis::RedisError| {
            error!("error creating user {username}: {e}");
            CreateError::Internal
        };

        let id: i64 = conn
            .incr(KEY_NEXT_USER_ID, USER_ID_STEP)
            .await
            .map_err(emap)?;

        // claim the name; the id stays allocated either way
        let claimed: bool = conn.set_nx(username_key(username), id).await.map_err(emap)?;
        if !claimed {
            return Err(CreateError::UsernameTaken);
        }

        let _: () = conn
            .hset_multiple(user_key(id), &[("username", username), ("pwhash", pwhash)])
            .await
            .map_err(emap)?;

        Ok(id)
    }

    pub async fn find_user(&self, username: &str) -> std::result::Result<User, FindError> {
        let mut conn = self.conn();

        let emap = |e: redis::RedisError| {
            error!("error looking up user {username}: {e}");
            FindError::Internal
        };

        let id: Option<i64> = conn.get(username_key(username)).await.map_err(emap)?;
        let id = id.ok_or(FindError::NotFound)?;

        let fields: HashMap<String, String> = conn.hgetall(user_key(id)).await.map_err(emap)?;

        let pwhash = fields.get("pwhash").ok_or_else(|| {
            error!("user {id} record has no pwhash field");
            FindError::Internal
        })?;

        Ok(User {
            id,
            username: username.into(),
            pwhash: pwhash.clone(),
        })
    }
}

impl Store {
    pub async fn add_post(&self, entry: &str) -> Result<()> {
        let mut conn = self.conn();

        let _: () = conn.rpush(KEY_POSTS, entry).await.map_err(|e| {
            error!("error appending post: {e}");
        })?;

        Ok(())
    }

    pub async fn posts(&self) -> Result<Vec<String>> {
        let mut conn = self.conn();

        conn.lrange(KEY_POSTS, 0, -1).await.map_err(|e| {
            error!("error reading posts: {e}");
        })
    }
}

impl Store {
    pub async fn create_session(&self, session_id: &str, username: &str) -> Result<()> {
        let mut conn = self.conn();

        let _: () = conn
            .set_ex(session_key(session_id), username, SESSION_TTL_SECS)
            .await
            .map_err(|e| {
                error!("error storing session for {username}: {e}");
            })?;

        Ok(())
    }

    pub async fn session_user(&self, session_id: &str) -> Result<Option<String>> {
        let mut conn = self.conn();

        conn.get(session_key(session_id)).await.map_err(|e| {
            error!("error looking up session: {e}");
        })
    }
}
