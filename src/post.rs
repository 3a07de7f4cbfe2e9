use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// One post, stored as a single serialized list entry so the title and body
/// commit together.
#[derive(Debug, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub body: String,
    pub created: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub post_body: String,
}
