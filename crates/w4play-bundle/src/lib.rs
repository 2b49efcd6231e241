//! Standalone executables for WASM-4 cartridges.
//!
//! A bundle is a native loader executable with the cartridge module and a
//! fixed 136-byte [`Footer`] appended:
//!
//! ```text
//! [loader bytes][module bytes][footer]
//! ```
//!
//! The loader finds the footer in the last 136 bytes of its own file and
//! the module by the length recorded there.

mod bundler;
mod error;
mod footer;
mod loader;
mod platform;

pub use bundler::{Bundle, Bundler};
pub use error::{BundleError, Result};
pub use footer::{DEFAULT_TITLE, FOOTER_LEN, Footer, MAGIC};
pub use loader::{AssetDir, LoaderSource};
pub use platform::{Platform, UnknownPlatform};
