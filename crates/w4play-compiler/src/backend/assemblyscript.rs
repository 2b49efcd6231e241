//! AssemblyScript backend, driving the `asc` command line compiler.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::Backend;
use super::process::Program;
use crate::artifact::{Compilation, CompilationArtifact, Diagnostic};
use crate::error::Result;
use crate::language::Language;

/// The WASM-4 API declarations compiled next to every user program.
pub const SUPPORT_HEADER: &str = include_str!("../../assets/wasm4.ts");

/// First byte of linear memory available to the cartridge; everything
/// below is reserved for the console's memory-mapped registers.
pub const MEMORY_BASE: u32 = 6560;

const MAIN_FILE: &str = "main.ts";
const HEADER_FILE: &str = "wasm4.ts";
const MODULE_FILE: &str = "cart.wasm";
const TEXT_FILE: &str = "cart.wat";

/// `--use` bindings: seed, abort and trace hooks resolved against the
/// support header. The abort hook must be bound for the console to load
/// the module.
const HOOKS: [&str; 3] = [
    "seed=wasm4/seedHandler",
    "abort=wasm4/abortHandler",
    "trace=",
];

/// How to invoke `asc`. The compiler flags themselves are fixed by the
/// console's memory layout and are not configurable.
#[derive(Debug, Clone)]
pub struct AscOptions {
    program: Program,
    emit_text: bool,
}

impl AscOptions {
    pub fn new() -> Self {
        Self {
            program: Program::new("asc"),
            emit_text: true,
        }
    }

    /// Set the compiler executable.
    pub fn program(mut self, path: impl Into<PathBuf>) -> Self {
        self.program = Program::new(path);
        self
    }

    /// Set the compiler from a command line such as `npx asc`.
    pub fn command_line(mut self, command: &str) -> Self {
        self.program = Program::from_command_line(command, "asc");
        self
    }

    /// Whether to also produce the text-format disassembly.
    pub fn emit_text(mut self, emit_text: bool) -> Self {
        self.emit_text = emit_text;
        self
    }

    pub fn emits_text(&self) -> bool {
        self.emit_text
    }

    /// The full argument list for one compilation in a scratch directory.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![MAIN_FILE.into(), HEADER_FILE.into()];
        let memory_base = MEMORY_BASE.to_string();

        #[rustfmt::skip]
        let fixed: [&str; 19] = [
            "--runtime", "incremental",
            "--importMemory",
            "--noExportMemory",
            "--initialMemory", "1",
            "--maximumMemory", "1",
            "--zeroFilledMemory",
            "--memoryBase", memory_base.as_str(),
            "--optimizeLevel", "3",
            "--shrinkLevel", "2",
            "--converge",
            "--noAssert",
            "--outFile", MODULE_FILE,
        ];
        args.extend(fixed.iter().map(|flag| OsString::from(*flag)));

        for hook in HOOKS {
            args.push("--use".into());
            args.push(hook.into());
        }

        if self.emit_text {
            args.push("--textFile".into());
            args.push(TEXT_FILE.into());
        }
        args
    }
}

impl Default for AscOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// The AssemblyScript compiler adapter.
pub struct AssemblyScript {
    options: AscOptions,
}

impl AssemblyScript {
    pub fn new(options: AscOptions) -> Self {
        Self { options }
    }

    async fn read_outputs(&self, dir: &Path) -> Result<Compilation> {
        let module = tokio::fs::read(dir.join(MODULE_FILE)).await?;
        if module.is_empty() {
            return Ok(Diagnostic::new("asc reported success but produced an empty module").into());
        }

        // The disassembly is a convenience; a build that skipped it still stands.
        let text = if self.options.emit_text {
            match tokio::fs::read_to_string(dir.join(TEXT_FILE)).await {
                Ok(text) => Some(text),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    tracing::debug!("asc wrote no text format");
                    None
                }
                Err(err) => return Err(err.into()),
            }
        } else {
            None
        };

        Ok(CompilationArtifact::new(module, text).into())
    }
}

#[async_trait]
impl Backend for AssemblyScript {
    fn language(&self) -> Language {
        Language::AssemblyScript
    }

    async fn compile(&self, text: &str) -> Result<Compilation> {
        let scratch = tempfile::Builder::new().prefix("w4play-asc-").tempdir()?;
        let dir = scratch.path();
        tokio::fs::write(dir.join(MAIN_FILE), text).await?;
        tokio::fs::write(dir.join(HEADER_FILE), SUPPORT_HEADER).await?;

        tracing::debug!(program = %self.options.program.display(), "invoking asc");
        let finished = self.options.program.run(&self.options.args(), Some(dir)).await?;

        if !finished.success() {
            tracing::debug!(status = %finished.status, "asc rejected the program");
            let message = match finished.diagnostics() {
                "" => finished.summary(),
                diagnostics => format!("{}: {}", finished.summary(), diagnostics),
            };
            return Ok(Diagnostic::new(message).into());
        }

        self.read_outputs(dir).await
    }
}
