//! Cart interaction layer for a storefront theme.
//!
//! # Overview
//! Adds, removes and re-quantifies line items in a remote cart service and
//! tells independent listeners when the cart changed, so UI widgets never
//! need to know who mutated it.
//!
//! # Design
//! - `CartClient` is sans-IO: `build_*` produces `HttpRequest` values and
//!   `parse_cart` consumes `HttpResponse` values. It holds only `base_url`.
//! - `CartSession` runs one round trip per operation through a host
//!   `Transport`, publishes `CartChanged` after a successful mutation, and
//!   hands user-visible messages to a `ToastSink`.
//! - There is no local cart cache. Listeners re-query with
//!   `CartSession::fetch_cart`.
//! - `timing` and `money` are standalone storefront utilities with no cart
//!   coupling.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod money;
pub mod session;
pub mod timing;
pub mod toast;
pub mod transport;
pub mod types;

pub use client::CartClient;
pub use config::ClientConfig;
pub use error::{ApiError, CartOperationFailed, FailureCause, ServiceRejection, TransportError};
pub use events::{CartChanged, CartEvents, CartListener};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use money::format_inr;
pub use session::CartSession;
pub use timing::{Debounce, Throttle};
pub use toast::{Toast, ToastKind, ToastSink};
pub use transport::Transport;
pub use types::{AddItem, AddItems, CartSnapshot, ChangeLineItem, LineItem, Operation, VariantId};
