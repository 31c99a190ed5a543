//! In-process fan-out of cart count changes.
//!
//! Every cart mutation publishes the new item count keyed by the session's
//! cart key. Open pages of the same session listen through
//! `GET /cart/events` and swap their badge, so counts stay in step across
//! tabs without polling.

use async_stream::stream;
use futures::Stream;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// Buffered events before a slow subscriber starts skipping.
const CHANNEL_CAPACITY: usize = 256;

/// A cart's item count after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartEvent {
    pub cart_key: Uuid,
    pub item_count: u32,
}

/// Broadcast hub for [`CartEvent`]s.
#[derive(Debug, Clone)]
pub struct CartEvents {
    sender: broadcast::Sender<CartEvent>,
}

impl Default for CartEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl CartEvents {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish a new count. Having no listeners is not an error.
    pub fn publish(&self, cart_key: Uuid, item_count: u32) {
        let receivers = self
            .sender
            .send(CartEvent {
                cart_key,
                item_count,
            })
            .unwrap_or(0);
        debug!(%cart_key, item_count, receivers, "Cart event published");
    }

    /// Counts for one cart, as they happen.
    ///
    /// A subscriber that falls behind skips straight to newer events; only
    /// the latest count matters to a badge.
    pub fn subscribe(&self, cart_key: Uuid) -> impl Stream<Item = u32> + Send + use<> {
        let mut receiver = self.sender.subscribe();

        stream! {
            loop {
                match receiver.recv().await {
                    Ok(event) if event.cart_key == cart_key => yield event.item_count,
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(%cart_key, skipped, "Cart event subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}
