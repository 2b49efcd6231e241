//! Compiler outputs: successful artifacts and recoverable diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A successful build: the cartridge module and, for backends that can
/// produce one, its text-format disassembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationArtifact {
    pub module: Vec<u8>,
    pub text: Option<String>,
}

impl CompilationArtifact {
    pub fn new(module: Vec<u8>, text: Option<String>) -> Self {
        Self { module, text }
    }
}

/// A user-facing description of why the compiler rejected the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostic(String);

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }

    pub fn into_message(self) -> String {
        self.0
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a backend hands back for a compile request. Exactly one of the two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compilation {
    Artifact(CompilationArtifact),
    Diagnostic(Diagnostic),
}

impl Compilation {
    pub fn is_artifact(&self) -> bool {
        matches!(self, Compilation::Artifact(_))
    }

    pub fn artifact(&self) -> Option<&CompilationArtifact> {
        match self {
            Compilation::Artifact(artifact) => Some(artifact),
            Compilation::Diagnostic(_) => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Compilation::Diagnostic(diagnostic) => Some(diagnostic),
            Compilation::Artifact(_) => None,
        }
    }
}

impl From<CompilationArtifact> for Compilation {
    fn from(artifact: CompilationArtifact) -> Self {
        Compilation::Artifact(artifact)
    }
}

impl From<Diagnostic> for Compilation {
    fn from(diagnostic: Diagnostic) -> Self {
        Compilation::Diagnostic(diagnostic)
    }
}
