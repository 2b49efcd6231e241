//! Compiler backends.
//!
//! Each backend turns source text into a [`Compilation`]. A rejected
//! program is `Ok(Compilation::Diagnostic(..))`; `Err` is reserved for the
//! toolchain itself failing (missing binary, failed initialization, I/O).

mod assemblyscript;
mod process;
mod roland;

pub use assemblyscript::{AscOptions, AssemblyScript, MEMORY_BASE, SUPPORT_HEADER};
pub use roland::{Roland, RolandOptions};

use async_trait::async_trait;

use crate::artifact::Compilation;
use crate::error::Result;
use crate::language::Language;

/// A compiler for one playground language.
#[async_trait]
pub trait Backend: Send + Sync {
    /// The language this backend accepts.
    fn language(&self) -> Language;

    /// Compile `text` into a cartridge module or a diagnostic.
    async fn compile(&self, text: &str) -> Result<Compilation>;
}
