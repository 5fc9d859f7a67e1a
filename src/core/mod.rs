//! Core chat session components
//!
//! The store holds every chat of the running process; the session controller
//! applies user actions to it and talks to the model.

mod session;
mod store;

pub use session::{SessionController, SessionError, SessionView};
pub use store::StoreError;
