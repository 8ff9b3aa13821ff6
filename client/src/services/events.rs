// carepath/src/services/events.rs

use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
  /// The employee's local appointment cart changed after a checkout.
  CartChanged {
    employee_ref_id: Option<String>,
    remaining_items: usize,
  },
  /// The pharmacy cart mirror was replaced from the server.
  PharmacyCartRefreshed { item_count: usize },
}

/// Publish/subscribe channel for cart changes. Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct CartEvents {
  sender: broadcast::Sender<CartEvent>,
}

impl CartEvents {
  pub fn new(capacity: usize) -> Self {
    let (sender, _) = broadcast::channel(capacity);
    Self { sender }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
    self.sender.subscribe()
  }

  /// Returns how many subscribers received the event. Publishing with nobody
  /// listening is not an error.
  pub fn publish(&self, event: CartEvent) -> usize {
    match self.sender.send(event) {
      Ok(n) => n,
      Err(broadcast::error::SendError(event)) => {
        debug!(?event, "Cart event published with no subscribers.");
        0
      }
    }
  }
}

impl Default for CartEvents {
  fn default() -> Self {
    Self::new(16)
  }
}
