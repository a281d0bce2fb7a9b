//! Session ownership: the token, the identity derived from it, and its lifecycle.

pub mod codec;
pub mod error;
pub mod state;
pub mod store;

pub use codec::TokenDecoder;
pub use error::SessionError;
pub use state::SessionState;
pub use store::{SessionOptions, SessionStore};
