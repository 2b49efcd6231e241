//! The compilation orchestrator.

use std::sync::{Arc, Mutex, PoisonError};

use w4play_compiler::{Diagnostic, Language, Request, Source, WorkerHandle};

use crate::location::Location;
use crate::observable::Observable;
use crate::source;
use crate::state::CompilationState;
use crate::storage::Storage;

/// One playground session: the live source, the live compilation state,
/// and the worker that compiles.
///
/// Every change to the source is persisted under its language tag. Each
/// compile request gets a fresh id; when requests overlap, only the reply
/// to the most recent one is applied and older replies are dropped.
pub struct Playground {
    source: Observable<Source>,
    state: Observable<CompilationState>,
    worker: WorkerHandle,
    storage: Arc<dyn Storage>,
    location: Location,
    /// Id of the latest request. Also serializes state transitions.
    latest: Mutex<u64>,
}

impl Playground {
    /// Start a session. The initial source is resolved from `location`,
    /// then `storage`, then the built-in sample for the language.
    pub fn new(
        worker: WorkerHandle,
        storage: Arc<dyn Storage>,
        location: Location,
        lang: Option<Language>,
    ) -> Self {
        let (initial, origin) = source::resolve(&location, storage.as_ref(), lang);
        tracing::info!(lang = %initial.lang, ?origin, "starting playground session");

        let source = Observable::new(initial);
        let sink = Arc::clone(&storage);
        source.subscribe(move |src: &Source| source::persist(sink.as_ref(), src));

        Self {
            source,
            state: Observable::new(CompilationState::NotStarted),
            worker,
            storage,
            location,
            latest: Mutex::new(0),
        }
    }

    pub fn source(&self) -> &Observable<Source> {
        &self.source
    }

    pub fn state(&self) -> &Observable<CompilationState> {
        &self.state
    }

    /// Replace the text of the current source, keeping its language.
    pub fn set_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.source.update(|current| Source::new(text, current.lang));
    }

    /// Switch the editor to `lang`, restoring what was last edited in it.
    pub fn switch_language(&self, lang: Language) {
        if self.source.get().lang == lang {
            return;
        }
        let next = source::reload_source(&self.location, self.storage.as_ref(), lang);
        tracing::debug!(%lang, "switching language");
        self.source.set(next);
    }

    /// Compile the current source and return the resulting state.
    ///
    /// The state is `Loading` from the moment this is called until the
    /// reply lands. If a newer compile was started meanwhile, this reply
    /// is discarded and the returned state is whatever is current.
    pub async fn compile(&self) -> CompilationState {
        let source = self.source.get();
        let id = {
            let mut latest = self.lock_latest();
            *latest += 1;
            self.state.set(CompilationState::Loading);
            *latest
        };
        tracing::debug!(id, lang = %source.lang, "compile requested");

        let next = match self.worker.send(Request { id, source }).await {
            Ok(response) => {
                debug_assert_eq!(response.id, id);
                CompilationState::from(response.reply)
            }
            Err(err) => {
                tracing::error!(id, "compile did not complete: {}", err);
                CompilationState::Failure(Diagnostic::new(format!("Compiler unavailable: {err}")))
            }
        };

        let latest = self.lock_latest();
        if *latest != id {
            tracing::debug!(id, latest = *latest, "discarding superseded compile result");
            return self.state.get();
        }
        self.state.set(next.clone());
        next
    }

    fn lock_latest(&self) -> std::sync::MutexGuard<'_, u64> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
