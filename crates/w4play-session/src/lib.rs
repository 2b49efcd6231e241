//! Playground session state.
//!
//! Decides which source the editor starts with (share link, then local
//! storage, then a built-in sample), persists every edit, and drives
//! compiles through the background worker while exposing the current
//! source and compilation state as observable values.

pub mod codec;
mod error;
mod location;
mod observable;
mod playground;
mod source;
mod state;
mod storage;

pub use error::SessionError;
pub use location::Location;
pub use observable::Observable;
pub use playground::Playground;
pub use source::{
    Origin, default_text, infer_language, persist, reload_source, resolve, resolve_source,
    share_url, stored_text,
};
pub use state::CompilationState;
pub use storage::{FileStorage, MemoryStorage, Storage};

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
