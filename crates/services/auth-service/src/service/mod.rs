//! Session lifecycle.

mod session_store;

pub use session_store::{AuthState, SessionStore};
