use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::query_client::{QueryClient, QueryOutcome};

const CHANNEL_CAPACITY: usize = 100;

/// A finished round trip, posted back to the UI loop.
#[derive(Debug)]
pub struct Completion {
    pub request_id: Uuid,
    pub query: String,
    pub outcome: QueryOutcome,
}

/// Runs each query on its own task and hands results back in the order they resolve.
///
/// Nothing is serialized: overlapping queries race, and a slow answer still
/// lands after a faster, later one.
pub struct Dispatcher {
    client: Arc<QueryClient>,
    tx: mpsc::Sender<Completion>,
    rx: mpsc::Receiver<Completion>,
}

impl Dispatcher {
    pub fn new(client: QueryClient) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            client: Arc::new(client),
            tx,
            rx,
        }
    }

    pub fn dispatch(&self, query: String) -> Uuid {
        let request_id = Uuid::new_v4();
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();

        info!(%request_id, %query, "Dispatching query");
        tokio::spawn(async move {
            let outcome = client.send(&query).await;
            debug!(%request_id, answered = outcome.is_answer(), "Query resolved");
            let completion = Completion {
                request_id,
                query,
                outcome,
            };
            if tx.send(completion).await.is_err() {
                warn!(%request_id, "UI loop gone before the query resolved");
            }
        });

        request_id
    }

    /// Non-blocking; `None` when nothing has resolved yet.
    pub fn try_next(&mut self) -> Option<Completion> {
        self.rx.try_recv().ok()
    }

    pub async fn next(&mut self) -> Option<Completion> {
        self.rx.recv().await
    }
}
