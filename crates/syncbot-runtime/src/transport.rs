//! Transport collaborator contract.
//!
//! The wire protocol (framing, heartbeats, handshake) lives behind these
//! traits; this crate only relies on the contract below. Tests drive the
//! runtime with scripted in-memory sessions.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use syncbot_core::TransportError;

/// Opens transport sessions against a resolved endpoint URL.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a new session.
    async fn connect(&self, url: &str) -> Result<Box<dyn TransportSession>, TransportError>;
}

/// One live session.
///
/// Every method takes `&mut self`: a session belongs to exactly one bot, and
/// all of its operations share a single sequential flow of control. There is
/// at most one outstanding ack wait at any time.
#[async_trait]
pub trait TransportSession: Send {
    /// Fire-and-forget emit.
    async fn emit(&mut self, event: &str, payload: Value) -> Result<(), TransportError>;

    /// Emit and wait for the direct synchronous response to this frame.
    async fn request(&mut self, event: &str, payload: Value) -> Result<Value, TransportError>;

    /// Emit, then wait up to `timeout` for the named ack event.
    ///
    /// `None` means no ack arrived inside the window, which the protocol
    /// treats as acceptance.
    async fn emit_with_ack(
        &mut self,
        event: &str,
        payload: Value,
        ack_event: &str,
        timeout: Duration,
    ) -> Result<Option<Value>, TransportError>;

    /// Receive the next inbound `(event, payload)` pair.
    async fn recv(&mut self) -> Result<(String, Value), TransportError>;

    /// Close the session.
    async fn close(&mut self) -> Result<(), TransportError>;

    /// Reconnect backoff hint supplied by the transport, not computed here.
    fn retry_delay(&self) -> Duration;
}

/// Ack payload truthiness.
///
/// Mirrors the reference client: `null`, `false`, `0`, the empty string, and
/// empty containers all read as "no objection".
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn falsy_values() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(!is_truthy(&json!({})));
    }

    #[test]
    fn truthy_values() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("denied")));
        assert!(is_truthy(&json!([0])));
        assert!(is_truthy(&json!({"msg": "flood"})));
    }
}
