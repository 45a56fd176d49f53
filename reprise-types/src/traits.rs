//! Collaborator traits: the chat transport and the metrics sink.

use crate::error::TransportError;
use crate::message::{ProviderRequest, ProviderResponse};
use crate::turn::TurnReport;
use std::future::Future;
use std::sync::Arc;

/// The already-implemented chat client the engine decorates.
///
/// One operation: send a conversation, receive a response. The transport
/// owns the wire format, including how `ProviderRequest::reasoning_state`
/// is attached to the outgoing payload.
///
/// Uses return-position `impl Trait` and is not object-safe; the engine is
/// generic over it.
pub trait Transport: Send + Sync {
    /// Send one physical request.
    fn send(
        &self,
        request: ProviderRequest,
    ) -> impl Future<Output = Result<ProviderResponse, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        request: ProviderRequest,
    ) -> impl Future<Output = Result<ProviderResponse, TransportError>> + Send {
        T::send(self, request)
    }
}

/// Receives one [`TurnReport`] per finished turn.
///
/// Fire-and-forget. The engine isolates panics raised here, but
/// implementations should not block.
pub trait MetricsSink: Send + Sync {
    /// Record a finished turn.
    fn record(&self, report: &TurnReport);
}
