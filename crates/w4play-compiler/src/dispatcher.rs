//! The compiler worker.
//!
//! A [`Dispatcher`] owns one backend per language and routes each request
//! strictly by its language tag. [`Dispatcher::spawn`] moves it onto a
//! background task so slow optimizing builds never stall the caller;
//! [`Dispatcher::serve`] speaks the same protocol as JSON lines over a byte
//! stream.
//!
//! Every request carries an id that the response echoes, so a caller that
//! issues overlapping requests can tell which reply is current.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};

use crate::artifact::{Compilation, CompilationArtifact, Diagnostic};
use crate::backend::{AscOptions, AssemblyScript, Backend, Roland, RolandOptions};
use crate::error::{Result, WorkerError};
use crate::language::{Language, Source};

/// Requests that may wait for the worker before `send` applies backpressure.
const QUEUE_DEPTH: usize = 8;

/// A compile request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    pub source: Source,
}

/// The reply to the request with the same `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub id: u64,
    pub reply: Reply,
}

/// Wire form of a compile outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Reply {
    Artifact(CompilationArtifact),
    Diagnostic(Diagnostic),
    /// The toolchain itself failed; the source was never judged.
    Error(String),
}

impl From<Result<Compilation>> for Reply {
    fn from(result: Result<Compilation>) -> Self {
        match result {
            Ok(Compilation::Artifact(artifact)) => Reply::Artifact(artifact),
            Ok(Compilation::Diagnostic(diagnostic)) => Reply::Diagnostic(diagnostic),
            Err(err) => Reply::Error(err.to_string()),
        }
    }
}

/// Routes sources to the backend for their language.
pub struct Dispatcher {
    assemblyscript: Arc<dyn Backend>,
    roland: Arc<dyn Backend>,
}

impl Dispatcher {
    /// # Panics
    ///
    /// Panics if either backend compiles a different language than its slot.
    pub fn new(assemblyscript: Arc<dyn Backend>, roland: Arc<dyn Backend>) -> Self {
        assert_eq!(
            assemblyscript.language(),
            Language::AssemblyScript,
            "backend in the AssemblyScript slot"
        );
        assert_eq!(roland.language(), Language::Roland, "backend in the Roland slot");
        Self {
            assemblyscript,
            roland,
        }
    }

    /// A dispatcher backed by the real `asc` and `rolandc` toolchains.
    pub fn with_toolchains(asc: AscOptions, rolandc: RolandOptions) -> Self {
        Self::new(
            Arc::new(AssemblyScript::new(asc)),
            Arc::new(Roland::new(rolandc)),
        )
    }

    pub fn backend(&self, lang: Language) -> &dyn Backend {
        match lang {
            Language::AssemblyScript => self.assemblyscript.as_ref(),
            Language::Roland => self.roland.as_ref(),
        }
    }

    /// Compile one source with the backend for its language.
    pub async fn dispatch(&self, source: &Source) -> Result<Compilation> {
        self.backend(source.lang).compile(&source.text).await
    }

    /// Handle one request, folding toolchain failures into the reply.
    pub async fn handle(&self, request: Request) -> Response {
        let Request { id, source } = request;
        tracing::debug!(id, lang = %source.lang, bytes = source.text.len(), "compile request");

        let result = self.dispatch(&source).await;
        match &result {
            Ok(Compilation::Artifact(artifact)) => {
                tracing::info!(id, lang = %source.lang, module_bytes = artifact.module.len(), "compiled")
            }
            Ok(Compilation::Diagnostic(_)) => {
                tracing::info!(id, lang = %source.lang, "compile rejected")
            }
            Err(err) => tracing::error!(id, lang = %source.lang, "toolchain failure: {}", err),
        }

        Response {
            id,
            reply: result.into(),
        }
    }

    /// Move the dispatcher onto a background task.
    ///
    /// Requests are handled one at a time in arrival order. The task ends
    /// once every [`WorkerHandle`] has been dropped.
    pub fn spawn(self) -> WorkerHandle {
        let (tx, mut rx) = mpsc::channel::<Envelope>(QUEUE_DEPTH);
        tokio::spawn(async move {
            while let Some(Envelope { request, reply_to }) = rx.recv().await {
                let response = self.handle(request).await;
                if reply_to.send(response).is_err() {
                    tracing::debug!("requester went away before the reply");
                }
            }
            tracing::debug!("compiler worker stopped");
        });
        WorkerHandle { tx }
    }

    /// Serve requests as JSON lines until `reader` reaches end of stream.
    ///
    /// Lines that do not parse as a [`Request`] are logged and skipped,
    /// since there is no id to answer them with.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::result::Result<(), WorkerError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let request: Request = match serde_json::from_str(&line) {
                Ok(request) => request,
                Err(err) => {
                    tracing::warn!("skipping malformed request: {}", err);
                    continue;
                }
            };

            let response = self.handle(request).await;
            let mut encoded = serde_json::to_vec(&response)?;
            encoded.push(b'\n');
            writer.write_all(&encoded).await?;
            writer.flush().await?;
        }
        Ok(())
    }
}

struct Envelope {
    request: Request,
    reply_to: oneshot::Sender<Response>,
}

/// Sending side of a spawned worker. Cheap to clone.
#[derive(Clone)]
pub struct WorkerHandle {
    tx: mpsc::Sender<Envelope>,
}

impl WorkerHandle {
    /// Submit a request and wait for its response.
    pub async fn send(&self, request: Request) -> std::result::Result<Response, WorkerError> {
        let id = request.id;
        let (reply_to, reply) = oneshot::channel();
        self.tx
            .send(Envelope { request, reply_to })
            .await
            .map_err(|_| WorkerError::Closed)?;
        reply.await.map_err(|_| WorkerError::Dropped(id))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
