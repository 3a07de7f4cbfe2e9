/// Step the user-id counter advances by per registration. The ids this
/// produces are sparse; see DESIGN.md before changing it.
pub const USER_ID_STEP: i64 = 1000;

/// How long a session record lives without being refreshed.
pub const SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug)]
pub enum FindError {
    NotFound,
    Internal,
}

#[derive(Debug)]
pub enum CreateError {
    UsernameTaken,
    Internal,
}

#[cfg(not(any(test, feature = "backend-mem")))]
mod store_redis;
#[cfg(not(any(test, feature = "backend-mem")))]
pub use store_redis::*;

#[cfg(any(test, feature = "backend-mem"))]
mod store_mem;
#[cfg(any(test, feature = "backend-mem"))]
pub use store_mem::*;
