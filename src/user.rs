use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub pwhash: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}
