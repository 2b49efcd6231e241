//! Roland backend, driving the `rolandc` command line compiler.

use std::ffi::OsString;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::Backend;
use super::process::Program;
use crate::artifact::{Compilation, CompilationArtifact, Diagnostic};
use crate::error::{BackendError, Result};
use crate::language::Language;

const MAIN_FILE: &str = "main.rol";
const MODULE_FILE: &str = "main.wasm";

/// How to invoke `rolandc`.
#[derive(Debug, Clone)]
pub struct RolandOptions {
    program: Program,
    target: String,
}

impl RolandOptions {
    pub fn new() -> Self {
        Self {
            program: Program::new("rolandc"),
            target: "wasm4".to_string(),
        }
    }

    pub fn program(mut self, path: impl Into<PathBuf>) -> Self {
        self.program = Program::new(path);
        self
    }

    pub fn command_line(mut self, command: &str) -> Self {
        self.program = Program::from_command_line(command, "rolandc");
        self
    }

    fn args(&self) -> Vec<OsString> {
        vec![
            "--target".into(),
            self.target.as_str().into(),
            MAIN_FILE.into(),
        ]
    }
}

impl Default for RolandOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// The Roland compiler adapter.
///
/// The toolchain is probed once before the first compile. A failed probe
/// fails only the request that triggered it; the next request probes again.
pub struct Roland {
    options: RolandOptions,
    version: OnceCell<String>,
}

impl Roland {
    pub fn new(options: RolandOptions) -> Self {
        Self {
            options,
            version: OnceCell::new(),
        }
    }

    /// The toolchain version, if initialization has completed.
    pub fn version(&self) -> Option<&str> {
        self.version.get().map(String::as_str)
    }

    async fn initialize(&self) -> Result<&str> {
        let version = self
            .version
            .get_or_try_init(|| async {
                let finished = self
                    .options
                    .program
                    .run(&[OsString::from("--version")], None)
                    .await
                    .map_err(|err| BackendError::Initialization {
                        language: Language::Roland,
                        reason: err.to_string(),
                    })?;

                if !finished.success() {
                    return Err(BackendError::Initialization {
                        language: Language::Roland,
                        reason: finished.summary(),
                    });
                }

                let version = finished.stdout.trim().to_string();
                tracing::info!(%version, "roland toolchain ready");
                Ok(version)
            })
            .await?;
        Ok(version)
    }
}

#[async_trait]
impl Backend for Roland {
    fn language(&self) -> Language {
        Language::Roland
    }

    async fn compile(&self, text: &str) -> Result<Compilation> {
        self.initialize().await?;

        let scratch = tempfile::Builder::new().prefix("w4play-rol-").tempdir()?;
        let dir = scratch.path();
        tokio::fs::write(dir.join(MAIN_FILE), text).await?;

        tracing::debug!(program = %self.options.program.display(), "invoking rolandc");
        let finished = self.options.program.run(&self.options.args(), Some(dir)).await?;

        if !finished.success() {
            let message = format!("Error compiling roland: '{}'", finished.diagnostics());
            return Ok(Diagnostic::new(message).into());
        }

        let module = tokio::fs::read(dir.join(MODULE_FILE)).await?;
        if module.is_empty() {
            return Ok(Diagnostic::new("Error compiling roland: 'empty module'").into());
        }

        // rolandc has no text output.
        Ok(CompilationArtifact::new(module, None).into())
    }
}
