//! In-process event bus for order lifecycle notifications.
//!
//! Publishing is fire-and-forget over a tokio broadcast channel: a publish
//! with no live subscribers, or a subscriber that lags behind, never blocks
//! or fails the operation that emitted the event.

use tokio::sync::broadcast;

use mealflow_types::OrderEvent;

/// Broadcast bus for [`OrderEvent`]s.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<OrderEvent>,
}

impl EventBus {
	/// Creates a bus with the given channel capacity.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes an event to all current subscribers.
	pub fn publish(&self, event: OrderEvent) {
		// send only errors when there are no receivers, which is fine.
		let _ = self.sender.send(event);
	}

	/// Subscribes to events published after this call.
	pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
		self.sender.subscribe()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(256)
	}
}
