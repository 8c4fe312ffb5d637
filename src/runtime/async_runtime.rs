use super::message::AppMessage;
use crate::kernel::registry::{builtin_listing, BUILTIN_LISTING_SCHEME};
use crate::kernel::{Effect, LoadCompletion, LoadError, LoadRequest, UnitSource};
use std::io;
use std::sync::mpsc::Sender;
use std::sync::Arc;

pub struct AsyncRuntime {
    runtime: tokio::runtime::Runtime,
    tx: Sender<AppMessage>,
    source: Arc<dyn UnitSource>,
}

impl AsyncRuntime {
    pub fn new(tx: Sender<AppMessage>, source: Arc<dyn UnitSource>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
        Ok(Self {
            runtime,
            tx,
            source,
        })
    }

    pub fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::LoadUnit(request) => self.load_unit(request),
            Effect::LoadSourceListing {
                program_id,
                location,
            } => self.load_source_listing(program_id, location),
        }
    }

    /// Fetches and instantiates on the blocking pool; the completion is posted back
    /// even when the load has been superseded so the bridge can shut it down. A load
    /// that panics is posted as an instantiation failure.
    pub fn load_unit(&self, request: LoadRequest) {
        let tx = self.tx.clone();
        let source = self.source.clone();
        self.runtime.spawn(async move {
            let generation = request.generation;
            let program_id = request.descriptor.id.clone();
            let location = request.descriptor.load_location.clone();
            let result = tokio::task::spawn_blocking(move || request.perform(source.as_ref())).await;

            let completion = match result {
                Ok(completion) => completion,
                Err(e) => {
                    tracing::error!(program = %program_id, generation, error = %e, "load task failed");
                    LoadCompletion {
                        generation,
                        program_id,
                        result: Err(LoadError::instantiation(location, e)),
                    }
                }
            };
            let _ = tx.send(AppMessage::UnitLoaded(completion));
        });
    }

    pub fn load_source_listing(&self, program_id: String, location: String) {
        if location.starts_with(BUILTIN_LISTING_SCHEME) {
            let message = match builtin_listing(&location) {
                Some(text) => AppMessage::SourceLoaded {
                    program_id,
                    content: text.to_string(),
                },
                None => {
                    tracing::warn!(program = %program_id, location = %location, "no bundled listing");
                    AppMessage::SourceFailed {
                        program_id,
                        error: format!("no bundled listing for {location}"),
                    }
                }
            };
            let _ = self.tx.send(message);
            return;
        }

        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            match tokio::fs::read_to_string(&location).await {
                Ok(content) => {
                    let _ = tx.send(AppMessage::SourceLoaded {
                        program_id,
                        content,
                    });
                }
                Err(e) => {
                    tracing::warn!(program = %program_id, location = %location, error = %e, "source listing failed");
                    let _ = tx.send(AppMessage::SourceFailed {
                        program_id,
                        error: e.to_string(),
                    });
                }
            }
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/async_runtime.rs"]
mod tests;
