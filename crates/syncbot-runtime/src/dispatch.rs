//! Per-event ordered handler registry with short-circuiting invocation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use serde_json::Value;
use syncbot_core::Result;
use tracing::debug;

use crate::state::BotState;

/// Whether later handlers for the current trigger call should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Keep invoking the remaining handlers.
    Continue,
    /// Short-circuit: skip the remaining handlers for this trigger call.
    /// Registration is untouched.
    Stop,
}

/// An event handler.
///
/// Handlers may suspend; synchronous and suspending handlers are awaited
/// uniformly. A returned error aborts the remaining handlers for the event
/// and propagates to the run loop.
#[async_trait]
pub trait Handler: Send + Sync {
    /// React to one `(event, data)` pair.
    async fn handle(&self, state: &mut BotState, event: &str, data: &Value) -> Result<Control>;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: Fn(&mut BotState, &str, &Value) -> Result<Control> + Send + Sync,
{
    async fn handle(&self, state: &mut BotState, event: &str, data: &Value) -> Result<Control> {
        (self.0)(state, event, data)
    }
}

/// Wrap a synchronous closure as a [`Handler`].
pub fn handler_fn<F>(f: F) -> Arc<dyn Handler>
where
    F: Fn(&mut BotState, &str, &Value) -> Result<Control> + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}

/// Mapping from event name to an ordered handler list.
///
/// Insertion order is call order. Registering the identical handler (same
/// `Arc`) twice is silently rejected, so re-registration is idempotent.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<String, Vec<Arc<dyn Handler>>>,
}

impl EventDispatcher {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to the event's list unless already present.
    pub fn on(&mut self, event: &str, handler: Arc<dyn Handler>) {
        let list = self.handlers.entry(event.to_owned()).or_default();
        if list.iter().any(|h| Arc::ptr_eq(h, &handler)) {
            debug!(event, "handler already registered");
            return;
        }
        debug!(event, position = list.len(), "handler registered");
        list.push(handler);
    }

    /// Remove `handler` from the event's list. Absence is a no-op.
    pub fn off(&mut self, event: &str, handler: &Arc<dyn Handler>) {
        let removed = self
            .handlers
            .get_mut(event)
            .and_then(|list| {
                let pos = list.iter().position(|h| Arc::ptr_eq(h, handler))?;
                Some(list.remove(pos))
            })
            .is_some();
        if removed {
            debug!(event, "handler removed");
        } else {
            debug!(event, "handler not found");
        }
    }

    /// Number of handlers registered for `event`.
    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.get(event).map_or(0, Vec::len)
    }

    /// Invoke the event's handlers in registration order.
    ///
    /// A handler returning [`Control::Stop`] skips the rest for this call.
    /// An event with no registered handlers is a no-op.
    pub async fn trigger(&self, state: &mut BotState, event: &str, data: &Value) -> Result<()> {
        let Some(list) = self.handlers.get(event) else {
            debug!(event, "no handlers");
            return Ok(());
        };
        counter!("bot_events_dispatched_total").increment(1);
        for handler in list {
            if handler.handle(state, event, data).await? == Control::Stop {
                debug!(event, "handler chain short-circuited");
                break;
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
