//! Async cart operations on top of `CartClient` and a host `Transport`.
//!
//! # Design
//! Every operation is one round trip: build the request, hand it to the
//! transport (bounded by the configured timeout), parse the snapshot. Only
//! after a snapshot has been parsed does a mutation publish `CartChanged`;
//! failures publish nothing. The session keeps no cart state of its own, so
//! concurrent calls need no locking and the server stays the only source of
//! truth.

use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

use tracing::{debug, error};

use crate::client::CartClient;
use crate::config::ClientConfig;
use crate::error::{ApiError, CartOperationFailed, FailureCause, TransportError};
use crate::events::{CartEvents, CartListener};
use crate::http::{HttpRequest, HttpResponse};
use crate::toast::{Toast, ToastSink};
use crate::transport::Transport;
use crate::types::{CartSnapshot, Operation, VariantId};

/// Cart operations bound to one transport, toast sink and event channel.
#[derive(Debug)]
pub struct CartSession<T, S = ()> {
    client: CartClient,
    transport: T,
    toasts: S,
    events: CartEvents,
    timeout: Option<Duration>,
}

impl<T: Transport> CartSession<T> {
    pub fn new(config: &ClientConfig, transport: T) -> Self {
        Self {
            client: CartClient::new(&config.base_url),
            transport,
            toasts: (),
            events: CartEvents::new(),
            timeout: config.request_timeout(),
        }
    }
}

impl<T: Transport, S: ToastSink> CartSession<T, S> {
    pub fn with_toasts<S2: ToastSink>(self, toasts: S2) -> CartSession<T, S2> {
        CartSession {
            client: self.client,
            transport: self.transport,
            toasts,
            events: self.events,
            timeout: self.timeout,
        }
    }

    /// Publish on an existing channel instead of a private one.
    pub fn with_events(mut self, events: CartEvents) -> Self {
        self.events = events;
        self
    }

    pub fn events(&self) -> &CartEvents {
        &self.events
    }

    pub fn subscribe(&self) -> CartListener {
        self.events.subscribe()
    }

    pub fn client(&self) -> &CartClient {
        &self.client
    }

    /// Adds `quantity` of `variant`. Use `NonZeroU32::MIN` for a single unit.
    pub async fn add_item(
        &self,
        variant: &VariantId,
        quantity: NonZeroU32,
    ) -> Result<CartSnapshot, CartOperationFailed> {
        let request = self.client.build_add_item(variant, quantity);
        self.run(Operation::Add, request).await
    }

    /// Sets the line for `variant` to zero.
    pub async fn remove_item(
        &self,
        variant: &VariantId,
    ) -> Result<CartSnapshot, CartOperationFailed> {
        let request = self.client.build_remove_item(variant);
        self.run(Operation::Remove, request).await
    }

    pub async fn set_quantity(
        &self,
        variant: &VariantId,
        quantity: u32,
    ) -> Result<CartSnapshot, CartOperationFailed> {
        let request = self.client.build_change_quantity(variant, quantity);
        self.run(Operation::Update, request).await
    }

    /// Reads the authoritative cart. Never notifies and never toasts.
    pub async fn fetch_cart(&self) -> Result<CartSnapshot, CartOperationFailed> {
        let request = self.client.build_get_cart();
        self.run(Operation::Fetch, Ok(request)).await
    }

    async fn run(
        &self,
        operation: Operation,
        request: Result<HttpRequest, ApiError>,
    ) -> Result<CartSnapshot, CartOperationFailed> {
        match self.round_trip(request).await {
            Ok(cart) => {
                debug!(%operation, item_count = ?cart.item_count(), "cart operation succeeded");
                if operation.is_mutation() {
                    self.events.publish();
                }
                if let Some(toast) = Toast::succeeded(operation) {
                    self.toasts.show(toast);
                }
                Ok(cart)
            }
            Err(cause) => {
                error!(%operation, error = %cause, "cart operation failed");
                if let Some(toast) = Toast::failed(operation) {
                    self.toasts.show(toast);
                }
                Err(CartOperationFailed { operation, cause })
            }
        }
    }

    async fn round_trip(
        &self,
        request: Result<HttpRequest, ApiError>,
    ) -> Result<CartSnapshot, FailureCause> {
        let request = request?;
        debug!(method = request.method.as_str(), path = %request.path, "sending cart request");
        let response = with_timeout(self.timeout, self.transport.execute(request)).await?;
        Ok(self.client.parse_cart(response)?)
    }
}

async fn with_timeout<F>(limit: Option<Duration>, fut: F) -> Result<HttpResponse, TransportError>
where
    F: Future<Output = Result<HttpResponse, TransportError>>,
{
    match limit {
        Some(after) => tokio::time::timeout(after, fut)
            .await
            .map_err(|_| TransportError::TimedOut { after })?,
        None => fut.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CartChanged;
    use crate::http::HttpMethod;
    use crate::toast::ToastKind;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Arc;

    /// Replays scripted outcomes and records every request it was handed.
    #[derive(Default)]
    struct ScriptedTransport {
        outcomes: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn replying(outcomes: Vec<Result<HttpResponse, TransportError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                seen: Mutex::default(),
            }
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.seen.lock().clone()
        }
    }

    impl Transport for ScriptedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().push(request);
            self.outcomes
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Unreachable("script exhausted".into())))
        }
    }

    /// Never answers.
    struct HangingTransport;

    impl Transport for HangingTransport {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            std::future::pending().await
        }
    }

    type Recorded = Arc<Mutex<Vec<Toast>>>;

    fn session(
        transport: ScriptedTransport,
    ) -> (CartSession<Arc<ScriptedTransport>, impl ToastSink>, Arc<ScriptedTransport>, Recorded) {
        let transport = Arc::new(transport);
        let toasts: Recorded = Arc::default();
        let sink = {
            let toasts = Arc::clone(&toasts);
            move |toast: Toast| toasts.lock().push(toast)
        };
        let session = CartSession::new(&ClientConfig::new("http://shop.test"), Arc::clone(&transport))
            .with_toasts(sink);
        (session, transport, toasts)
    }

    fn ok(body: serde_json::Value) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse::new(200, body.to_string()))
    }

    fn two() -> NonZeroU32 {
        NonZeroU32::new(2).unwrap()
    }

    #[tokio::test]
    async fn add_returns_server_snapshot_and_notifies_once() {
        let cart = json!({"item_count": 2, "items": [{"id": "123", "quantity": 2}]});
        let (session, transport, toasts) = session(ScriptedTransport::replying(vec![ok(cart.clone())]));
        let mut listener = session.subscribe();

        let snapshot = session.add_item(&"123".into(), two()).await.unwrap();

        assert_eq!(snapshot, cart);
        assert_eq!(listener.drain(), 1);
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "http://shop.test/cart/add");
        assert_eq!(
            *toasts.lock(),
            vec![Toast::new(ToastKind::Success, "Product added to cart!")]
        );
    }

    #[tokio::test]
    async fn notification_is_published_before_the_call_returns() {
        let (session, _, _) = session(ScriptedTransport::replying(vec![ok(json!({"item_count": 1}))]));
        let mut listener = session.subscribe();

        assert!(listener.try_changed().is_none());
        session.set_quantity(&"9".into(), 1).await.unwrap();
        assert_eq!(listener.try_changed(), Some(CartChanged));
    }

    #[tokio::test]
    async fn update_rejection_is_tagged_and_silent_on_the_channel() {
        let rejected = Ok(HttpResponse::new(422, r#"{"error":"invalid"}"#));
        let (session, _, toasts) = session(ScriptedTransport::replying(vec![rejected]));
        let mut listener = session.subscribe();

        let err = session.set_quantity(&"123".into(), 0).await.unwrap_err();

        assert_eq!(err.operation, Operation::Update);
        let rejection = err.rejection().unwrap();
        assert_eq!(rejection.status, 422);
        assert_eq!(rejection.description().as_deref(), Some("invalid"));
        assert_eq!(listener.drain(), 0);
        assert_eq!(
            *toasts.lock(),
            vec![Toast::new(ToastKind::Error, "Failed to update cart")]
        );
    }

    #[tokio::test]
    async fn transport_failure_is_tagged_and_silent_on_the_channel() {
        let down = Err(TransportError::Unreachable("connection refused".into()));
        let (session, _, toasts) = session(ScriptedTransport::replying(vec![down]));
        let mut listener = session.subscribe();

        let err = session.add_item(&"123".into(), NonZeroU32::MIN).await.unwrap_err();

        assert_eq!(err.operation, Operation::Add);
        assert!(err.is_transport());
        assert_eq!(listener.drain(), 0);
        assert_eq!(toasts.lock()[0].message, "Failed to add product to cart");
    }

    #[tokio::test]
    async fn remove_rejection_is_tagged_and_silent_on_the_channel() {
        let rejected = Ok(HttpResponse::new(
            422,
            r#"{"status":422,"message":"Cart Error","description":"Cannot find variant"}"#,
        ));
        let (session, _, toasts) = session(ScriptedTransport::replying(vec![rejected]));
        let mut listener = session.subscribe();

        let err = session.remove_item(&"123".into()).await.unwrap_err();

        assert_eq!(err.operation, Operation::Remove);
        assert_eq!(err.rejection().map(|r| r.status), Some(422));
        assert_eq!(listener.drain(), 0);
        assert_eq!(
            *toasts.lock(),
            vec![Toast::new(ToastKind::Error, "Failed to remove product from cart")]
        );
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_failure() {
        let garbled = Ok(HttpResponse::new(200, "<html>"));
        let (session, _, _) = session(ScriptedTransport::replying(vec![garbled]));
        let mut listener = session.subscribe();

        let err = session.remove_item(&"1".into()).await.unwrap_err();

        assert_eq!(err.operation, Operation::Remove);
        assert!(matches!(err.cause, FailureCause::Api(ApiError::Deserialization(_))));
        assert_eq!(listener.drain(), 0);
    }

    #[tokio::test]
    async fn remove_matches_set_quantity_zero() {
        let cart = json!({"item_count": 0, "items": []});
        let (session, transport, toasts) =
            session(ScriptedTransport::replying(vec![ok(cart.clone()), ok(cart.clone())]));
        let mut listener = session.subscribe();

        let removed = session.remove_item(&"123".into()).await.unwrap();
        let zeroed = session.set_quantity(&"123".into(), 0).await.unwrap();

        assert_eq!(removed, zeroed);
        let requests = transport.requests();
        assert_eq!(requests[0], requests[1]);
        assert_eq!(listener.drain(), 2);
        // Only the removal announces itself.
        assert_eq!(
            *toasts.lock(),
            vec![Toast::new(ToastKind::Info, "Product removed from cart")]
        );
    }

    #[tokio::test]
    async fn fetch_never_notifies() {
        let (session, transport, toasts) = session(ScriptedTransport::replying(vec![
            ok(json!({"item_count": 4})),
            Ok(HttpResponse::new(500, "")),
        ]));
        let mut listener = session.subscribe();

        let cart = session.fetch_cart().await.unwrap();
        assert_eq!(cart.item_count(), Some(4));
        assert_eq!(transport.requests()[0].method, HttpMethod::Get);

        let err = session.fetch_cart().await.unwrap_err();
        assert_eq!(err.operation, Operation::Fetch);
        assert_eq!(listener.drain(), 0);
        assert!(toasts.lock().is_empty());
    }

    #[tokio::test]
    async fn racing_mutations_each_notify() {
        let (session, _, _) = session(ScriptedTransport::replying(vec![
            ok(json!({"item_count": 1})),
            ok(json!({"item_count": 3})),
        ]));
        let mut listener = session.subscribe();
        let (first, second) = (VariantId::from("1"), VariantId::from("2"));

        let (a, b) = tokio::join!(
            session.add_item(&first, NonZeroU32::MIN),
            session.set_quantity(&second, 2),
        );

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(listener.drain(), 2);
    }

    #[tokio::test]
    async fn shared_channel_reaches_listeners_of_other_sessions() {
        let events = CartEvents::new();
        let mut badge = events.subscribe();
        let (session, _, _) = session(ScriptedTransport::replying(vec![ok(json!({}))]));
        let session = session.with_events(events.clone());

        session.set_quantity(&"1".into(), 1).await.unwrap();
        assert_eq!(badge.drain(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_request_times_out() {
        let config = ClientConfig::new("http://shop.test").with_timeout(Duration::from_secs(5));
        let session = CartSession::new(&config, HangingTransport);
        let mut listener = session.subscribe();

        let err = session.add_item(&"1".into(), NonZeroU32::MIN).await.unwrap_err();

        assert!(matches!(
            err.cause,
            FailureCause::Transport(TransportError::TimedOut { after }) if after == Duration::from_secs(5)
        ));
        assert_eq!(listener.drain(), 0);
    }
}
