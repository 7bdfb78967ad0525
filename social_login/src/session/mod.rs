mod cookie;
mod errors;
mod memory;
mod types;

pub use cookie::{new_session_id, sign_session_id, verify_signed_session_id};
pub use errors::SessionError;
pub use memory::InMemorySessionStore;
pub use types::{LoginSession, SessionHandle, SessionKey, SessionStore};
