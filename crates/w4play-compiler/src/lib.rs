/// WASM-4 playground compiler layer
///
/// Wraps the AssemblyScript and Roland toolchains behind one contract and
/// runs them from a background worker so callers never block on a build.

pub mod artifact;
pub mod backend;
pub mod dispatcher;
pub mod error;
pub mod language;

pub use artifact::{Compilation, CompilationArtifact, Diagnostic};
pub use backend::{AscOptions, AssemblyScript, Backend, Roland, RolandOptions};
pub use dispatcher::{Dispatcher, Reply, Request, Response, WorkerHandle};
pub use error::{BackendError, Result, UnknownLanguage, WorkerError};
pub use language::{Language, Source};
