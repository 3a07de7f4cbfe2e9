use std::result;

use log::{error, info, warn};
use warp::http;

use crate::auth::{Credentials, SessionId};
use crate::post::Post;
use crate::store::{CreateError, FindError, Store};
use crate::time::Timestamp;

pub struct Blog(Store);

#[derive(Copy, Clone, Debug)]
pub enum Error {
    Internal,
    Unauthorized,
    UsernameTaken,
}

pub type Result<T> = result::Result<T, Error>;

impl From<Error> for http::StatusCode {
    fn from(e: Error) -> Self {
        match e {
            Error::Internal => http::StatusCode::INTERNAL_SERVER_ERROR,
            Error::Unauthorized => http::StatusCode::UNAUTHORIZED,
            Error::UsernameTaken => http::StatusCode::CONFLICT,
        }
    }
}

impl Error {
    pub fn message(self) -> &'static str {
        match self {
            Self::Internal => "something went wrong",
            Self::Unauthorized => "wrong username or password",
            Self::UsernameTaken => "that username is taken",
        }
    }
}

impl warp::reject::Reject for Error {}

impl Blog {
    pub fn new(store: Store) -> Self {
        Self(store)
    }

    pub async fn register(&self, creds: &Credentials) -> Result<SessionId> {
        let username = creds.username();

        let id = self
            .0
            .create_user(username, &creds.pwhash())
            .await
            .map_err(|e| match e {
                CreateError::UsernameTaken => {
                    info!("rejecting registration for taken username {username}");
                    Error::UsernameTaken
                }
                CreateError::Internal => Error::Internal,
            })?;

        info!("registered {username} as user {id}");
        self.open_session(username).await
    }

    pub async fn login(&self, creds: &Credentials) -> Result<SessionId> {
        let username = creds.username();

        let user = self.0.find_user(username).await.map_err(|e| {
            if matches!(e, FindError::NotFound) {
                error!("rejecting non-existant user {username}");
                Error::Unauthorized
            } else {
                error!("couldn't authenticate user {username}: {e:?}");
                Error::Internal
            }
        })?;

        if creds.pwhash() != user.pwhash {
            error!("wrong password for user {username}");
            return Err(Error::Unauthorized);
        }

        info!("{} logged in as user {}", user.username, user.id);
        self.open_session(username).await
    }

    async fn open_session(&self, username: &str) -> Result<SessionId> {
        let session_id = SessionId::new();

        self.0
            .create_session(&session_id.to_string(), username)
            .await
            .map_err(|()| Error::Internal)?;

        Ok(session_id)
    }

    /// Resolves the sessionid cookie to a username. Store trouble degrades to
    /// an anonymous page rather than an error.
    pub async fn current_user(&self, session_id: Option<SessionId>) -> Option<String> {
        let session_id = session_id?;

        match self.0.session_user(&session_id.to_string()).await {
            Ok(user) => user,
            Err(()) => {
                warn!("couldn't resolve session {session_id}");
                None
            }
        }
    }
}

impl Blog {
    pub async fn add_post(&self, title: String, body: String) -> Result<()> {
        let post = Post {
            title,
            body,
            created: now()?,
        };

        let entry = serde_json::to_string(&post).map_err(|e| {
            error!("couldn't encode post: {e}");
            Error::Internal
        })?;

        self.0.add_post(&entry).await.map_err(|()| Error::Internal)?;

        info!("added post {:?}", post.title);
        Ok(())
    }

    pub async fn posts(&self) -> Result<Vec<Post>> {
        let entries = self.0.posts().await.map_err(|()| Error::Internal)?;

        let posts = entries
            .iter()
            .filter_map(|entry| match serde_json::from_str(entry) {
                Ok(post) => Some(post),
                Err(e) => {
                    warn!("skipping undecodable post entry: {e}");
                    None
                }
            })
            .collect();

        Ok(posts)
    }
}

fn now() -> Result<Timestamp> {
    Timestamp::now().map_err(|()| Error::Internal)
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::*;

    async fn blog() -> Blog {
        Blog::new(Store::new("", 0).await.unwrap())
    }

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials::new(username.into(), password.into())
    }

    #[tokio::test]
    async fn register_then_login() {
        let blog = blog().await;

        blog.register(&creds("alice", "x")).await.unwrap();
        let session = blog.login(&creds("alice", "x")).await.unwrap();

        assert_eq!(
            blog.current_user(Some(session)).await.as_deref(),
            Some("alice")
        );
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let blog = blog().await;

        blog.register(&creds("alice", "x")).await.unwrap();

        assert!(matches!(
            blog.login(&creds("alice", "y")).await,
            Err(Error::Unauthorized)
        ));
        assert!(matches!(
            blog.login(&creds("bob", "x")).await,
            Err(Error::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn register_rejects_taken_username() {
        let blog = blog().await;

        blog.register(&creds("alice", "x")).await.unwrap();

        assert!(matches!(
            blog.register(&creds("alice", "y")).await,
            Err(Error::UsernameTaken)
        ));
    }

    #[tokio::test]
    async fn unknown_session_is_anonymous() {
        let blog = blog().await;

        assert_eq!(blog.current_user(None).await, None);
        assert_eq!(
            blog.current_user(Some(crate::auth::SessionId::new())).await,
            None
        );
    }

    #[tokio::test]
    async fn posts_come_back_paired_and_in_order() {
        let blog = blog().await;

        blog.add_post("T".into(), "B".into()).await.unwrap();
        blog.add_post("T2".into(), "B2".into()).await.unwrap();

        let posts = blog.posts().await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!((&*posts[0].title, &*posts[0].body), ("T", "B"));
        assert_eq!((&*posts[1].title, &*posts[1].body), ("T2", "B2"));
    }

    #[tokio::test]
    async fn concurrent_posts_never_tear() {
        let blog = Arc::new(blog().await);

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let blog = Arc::clone(&blog);
                tokio::spawn(
                    async move { blog.add_post(format!("t{i}"), format!("b{i}")).await },
                )
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let posts = blog.posts().await.unwrap();
        assert_eq!(posts.len(), 16);

        for post in posts {
            let i = post.title.strip_prefix('t').unwrap();
            assert_eq!(post.body, format!("b{i}"));
        }
    }
}
