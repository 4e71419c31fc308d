use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn};

use crate::app::domain::content::{FetchTarget, FetchTicket};
use crate::app::infrastructure::error::FetchError;
use crate::app::services::fetcher::ContentFetcher;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContentState {
    #[default]
    Empty,
    Loading(FetchTicket),
    Ready {
        ticket: FetchTicket,
        markdown: String,
    },
    Failed {
        ticket: FetchTicket,
        error: FetchError,
    },
}

/// Tracks the one fetch whose result may still be shown.
///
/// Every `begin` bumps the generation, so a result carrying an older ticket
/// is dropped in `complete` no matter when it arrives.
#[derive(Debug, Default)]
pub struct ContentLoader {
    generation: u64,
    state: ContentState,
}

impl ContentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, target: &FetchTarget) -> FetchTicket {
        self.generation += 1;
        let ticket = FetchTicket {
            generation: self.generation,
            document_id: target.document_id.clone(),
            language_id: target.language_id.clone(),
        };
        info!(
            generation = ticket.generation,
            document = %ticket.document_id,
            language = %ticket.language_id,
            "loading guide"
        );
        self.state = ContentState::Loading(ticket.clone());
        ticket
    }

    /// Accept a fetch result. Returns false when it was stale and discarded.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<String, FetchError>) -> bool {
        if self.in_flight() != Some(&ticket) {
            warn!(
                generation = ticket.generation,
                document = %ticket.document_id,
                language = %ticket.language_id,
                "discarding stale guide content"
            );
            return false;
        }

        self.state = match result {
            Ok(markdown) => ContentState::Ready { ticket, markdown },
            Err(e) => {
                error!("Failed to load guide {}/{}: {}", ticket.document_id, ticket.language_id, e);
                ContentState::Failed { ticket, error: e }
            }
        };
        true
    }

    /// Forget the current fetch; anything still running becomes stale.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.state = ContentState::Empty;
    }

    pub fn state(&self) -> &ContentState {
        &self.state
    }

    pub fn in_flight(&self) -> Option<&FetchTicket> {
        match &self.state {
            ContentState::Loading(ticket) => Some(ticket),
            _ => None,
        }
    }
}

/// Run one fetch on a worker thread and hand the result to `on_complete`
/// from that thread.
pub fn spawn_fetch<F, C>(
    fetcher: Arc<F>,
    ticket: FetchTicket,
    location: String,
    on_complete: C,
) -> thread::JoinHandle<()>
where
    F: ContentFetcher + Send + Sync + ?Sized + 'static,
    C: FnOnce(FetchTicket, Result<String, FetchError>) + Send + 'static,
{
    thread::spawn(move || {
        let result = fetcher.fetch(&location);
        on_complete(ticket, result);
    })
}
