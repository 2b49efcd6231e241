//! The single live compilation state.

use w4play_compiler::{Compilation, CompilationArtifact, Diagnostic, Reply};

/// Where the current compile stands. Replaced wholesale on every request;
/// there is no history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CompilationState {
    #[default]
    NotStarted,
    Loading,
    Success(CompilationArtifact),
    Failure(Diagnostic),
}

impl CompilationState {
    pub fn is_loading(&self) -> bool {
        matches!(self, CompilationState::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CompilationState::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CompilationState::Failure(_))
    }

    pub fn artifact(&self) -> Option<&CompilationArtifact> {
        match self {
            CompilationState::Success(artifact) => Some(artifact),
            _ => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            CompilationState::Failure(diagnostic) => Some(diagnostic),
            _ => None,
        }
    }
}

impl From<Compilation> for CompilationState {
    fn from(compilation: Compilation) -> Self {
        match compilation {
            Compilation::Artifact(artifact) => CompilationState::Success(artifact),
            Compilation::Diagnostic(diagnostic) => CompilationState::Failure(diagnostic),
        }
    }
}

impl From<Reply> for CompilationState {
    fn from(reply: Reply) -> Self {
        match reply {
            Reply::Artifact(artifact) => CompilationState::Success(artifact),
            Reply::Diagnostic(diagnostic) => CompilationState::Failure(diagnostic),
            Reply::Error(message) => CompilationState::Failure(Diagnostic::new(message)),
        }
    }
}
