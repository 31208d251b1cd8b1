use async_trait::async_trait;
use bytes::Bytes;

/// Transport is the seam between the collection walk and the wire.
///
/// CONTRACT:
/// - `send` posts one complete request body and resolves with the
///   complete response body, fully drained: once it returns, no
///   connection or stream for that page remains open.
/// - One call per page; the walker never issues a second request
///   while one is outstanding.
/// - Implementations must not retry. A failed page is fatal to the
///   pass; retry policy belongs to the caller's schedule.
///
/// THREAD SAFETY:
/// - Must be Send + Sync; one instance is shared across passes.
///
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &str) -> anyhow::Result<Bytes>;
}
