//! Session Layer
//!
//! - `store`: the session holder the UI talks to
//! - `save`: persisted form of a session

pub mod save;
pub mod store;

pub use save::{SaveError, SavedSession, SAVE_VERSION};
pub use store::{GameSessionStore, GraphicsQuality, SessionError};
