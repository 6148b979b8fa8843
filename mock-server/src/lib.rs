use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A purchasable variant. Prices are in paise.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Variant {
    pub id: u64,
    pub title: String,
    pub price: u64,
    pub inventory: u32,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    variants: BTreeMap<u64, Variant>,
}

impl Catalog {
    pub fn new(variants: impl IntoIterator<Item = Variant>) -> Self {
        Self {
            variants: variants.into_iter().map(|v| (v.id, v)).collect(),
        }
    }

    /// The fragrances the storefront ships with.
    pub fn storefront() -> Self {
        Self::new([
            variant(40001, "Oud Noir - 50ml", 249_900, 10),
            variant(40002, "Oud Noir - 100ml", 399_900, 5),
            variant(40003, "Jasmine Dusk - 50ml", 189_900, 3),
            variant(40004, "Vetiver Rain - 30ml", 129_900, 0),
        ])
    }

    pub fn get(&self, id: u64) -> Option<&Variant> {
        self.variants.get(&id)
    }
}

fn variant(id: u64, title: &str, price: u64, inventory: u32) -> Variant {
    Variant {
        id,
        title: title.to_string(),
        price,
        inventory,
    }
}

/// Cart snapshot as returned by every endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    pub token: Uuid,
    pub item_count: u64,
    pub total_price: u64,
    pub currency: String,
    pub items: Vec<CartLine>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    pub id: u64,
    pub variant_id: u64,
    pub title: String,
    pub quantity: u32,
    pub price: u64,
    pub line_price: u64,
}

/// Variant ids arrive as JSON numbers or numeric strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum VariantRef {
    Number(u64),
    Text(String),
}

impl VariantRef {
    fn resolve(&self) -> Option<u64> {
        match self {
            VariantRef::Number(n) => Some(*n),
            VariantRef::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItem {
    pub id: VariantRef,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct AddItems {
    pub items: Vec<AddItem>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeLine {
    pub id: VariantRef,
    pub quantity: u32,
}

/// Error body shaped like the storefront AJAX API: `{status, message, description}`.
#[derive(Debug)]
pub struct CartError {
    status: StatusCode,
    description: String,
}

impl CartError {
    fn unprocessable(description: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            description: description.into(),
        }
    }

    fn bad_request(description: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            description: description.into(),
        }
    }
}

impl IntoResponse for CartError {
    fn into_response(self) -> Response {
        warn!(status = self.status.as_u16(), description = %self.description, "cart request rejected");
        let body = serde_json::json!({
            "status": self.status.as_u16(),
            "message": "Cart Error",
            "description": self.description,
        });
        (self.status, Json(body)).into_response()
    }
}

/// The single in-memory cart and the catalog it draws from.
#[derive(Debug)]
pub struct Store {
    token: Uuid,
    catalog: Catalog,
    /// (variant id, quantity) in insertion order.
    lines: Vec<(u64, u32)>,
}

impl Store {
    fn quantity_of(&self, id: u64) -> u32 {
        self.lines
            .iter()
            .find(|(variant, _)| *variant == id)
            .map_or(0, |(_, qty)| *qty)
    }

    fn set_quantity(&mut self, id: u64, quantity: u32) {
        match self.lines.iter().position(|(variant, _)| *variant == id) {
            Some(index) if quantity == 0 => {
                self.lines.remove(index);
            }
            Some(index) => self.lines[index].1 = quantity,
            None if quantity > 0 => self.lines.push((id, quantity)),
            None => {}
        }
    }

    fn snapshot(&self) -> Cart {
        let items: Vec<CartLine> = self
            .lines
            .iter()
            .filter_map(|&(id, quantity)| {
                let variant = self.catalog.get(id)?;
                Some(CartLine {
                    id,
                    variant_id: id,
                    title: variant.title.clone(),
                    quantity,
                    price: variant.price,
                    line_price: variant.price * u64::from(quantity),
                })
            })
            .collect();
        Cart {
            token: self.token,
            item_count: items.iter().map(|l| u64::from(l.quantity)).sum(),
            total_price: items.iter().map(|l| l.line_price).sum(),
            currency: "INR".to_string(),
            items,
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with_catalog(Catalog::storefront())
}

pub fn app_with_catalog(catalog: Catalog) -> Router {
    let db: Db = Arc::new(RwLock::new(Store {
        token: Uuid::new_v4(),
        catalog,
        lines: Vec::new(),
    }));
    Router::new()
        .route("/cart", get(get_cart))
        .route("/cart/add", post(add_items))
        .route("/cart/change", post(change_line))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn get_cart(State(db): State<Db>) -> Json<Cart> {
    Json(db.read().await.snapshot())
}

async fn add_items(
    State(db): State<Db>,
    Json(input): Json<AddItems>,
) -> Result<Json<Cart>, CartError> {
    let mut store = db.write().await;

    // Validate everything before touching the cart so a bad entry adds nothing.
    let mut wanted: BTreeMap<u64, u32> = BTreeMap::new();
    for item in &input.items {
        let variant = item
            .id
            .resolve()
            .and_then(|id| store.catalog.get(id))
            .ok_or_else(|| CartError::unprocessable("Cannot find variant"))?;
        if item.quantity == 0 {
            return Err(CartError::unprocessable("Quantity must be at least 1"));
        }
        let entry = wanted
            .entry(variant.id)
            .or_insert_with(|| store.quantity_of(variant.id));
        *entry = entry.saturating_add(item.quantity);
        if *entry > variant.inventory {
            return Err(CartError::unprocessable(sold_out(variant)));
        }
    }

    for (id, quantity) in wanted {
        store.set_quantity(id, quantity);
    }
    let cart = store.snapshot();
    info!(item_count = cart.item_count, "items added");
    Ok(Json(cart))
}

async fn change_line(
    State(db): State<Db>,
    Json(input): Json<ChangeLine>,
) -> Result<Json<Cart>, CartError> {
    let mut store = db.write().await;

    let id = input
        .id
        .resolve()
        .filter(|id| store.quantity_of(*id) > 0)
        .ok_or_else(|| CartError::bad_request("No valid id or line parameter"))?;
    if let Some(variant) = store.catalog.get(id) {
        if input.quantity > variant.inventory {
            return Err(CartError::unprocessable(sold_out(variant)));
        }
    }

    store.set_quantity(id, input.quantity);
    let cart = store.snapshot();
    debug!(variant = id, quantity = input.quantity, item_count = cart.item_count, "line changed");
    Ok(Json(cart))
}

fn sold_out(variant: &Variant) -> String {
    if variant.inventory == 0 {
        format!("{} is sold out.", variant.title)
    } else {
        format!("All {} {} are in your cart.", variant.inventory, variant.title)
    }
}
