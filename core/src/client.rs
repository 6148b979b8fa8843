//! Stateless HTTP request builder and response parser for the cart endpoints.
//!
//! # Design
//! `CartClient` holds only a `base_url` and carries no cart state between
//! calls. Each operation has a `build_*` method producing an `HttpRequest`;
//! every cart endpoint answers with the same snapshot shape, so a single
//! `parse_cart` consumes all of their responses.

use std::num::NonZeroU32;

use crate::error::{ApiError, ServiceRejection};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{AddItem, AddItems, CartSnapshot, ChangeLineItem, VariantId};

/// Synchronous, stateless client for the cart endpoints.
#[derive(Debug, Clone)]
pub struct CartClient {
    base_url: String,
}

impl CartClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_get_cart(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/cart", self.base_url),
            headers: vec![accept_json()],
            body: None,
        }
    }

    pub fn build_add_item(
        &self,
        variant: &VariantId,
        quantity: NonZeroU32,
    ) -> Result<HttpRequest, ApiError> {
        let payload = AddItems {
            items: vec![AddItem {
                id: variant.clone(),
                quantity,
            }],
        };
        self.post_json("cart/add", &payload)
    }

    pub fn build_change_quantity(
        &self,
        variant: &VariantId,
        quantity: u32,
    ) -> Result<HttpRequest, ApiError> {
        let payload = ChangeLineItem {
            id: variant.clone(),
            quantity,
        };
        self.post_json("cart/change", &payload)
    }

    /// Removal is a change to quantity zero.
    pub fn build_remove_item(&self, variant: &VariantId) -> Result<HttpRequest, ApiError> {
        self.build_change_quantity(variant, 0)
    }

    pub fn parse_cart(&self, response: HttpResponse) -> Result<CartSnapshot, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(ApiError::Deserialization)
    }

    fn post_json<T: serde::Serialize>(
        &self,
        endpoint: &str,
        payload: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload).map_err(ApiError::Serialization)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/{endpoint}", self.base_url),
            headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                accept_json(),
            ],
            body: Some(body),
        })
    }
}

fn accept_json() -> (String, String) {
    ("accept".to_string(), "application/json".to_string())
}

/// Any non-2xx status is a rejection; the service is opaque beyond that.
fn check_status(response: &HttpResponse) -> Result<(), ServiceRejection> {
    if response.is_success() {
        return Ok(());
    }
    Err(ServiceRejection {
        status: response.status,
        body: response.body.clone(),
    })
}
