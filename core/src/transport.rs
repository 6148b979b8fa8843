//! The seam where the host performs the actual HTTP round trip.

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes `HttpRequest` values built by `CartClient`.
///
/// Implementations must return 4xx and 5xx responses as `Ok` data so status
/// interpretation stays in the core. `Err` is reserved for failures where no
/// response exists at all.
pub trait Transport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request).await
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request).await
    }
}
