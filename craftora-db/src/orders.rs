use crate::{
    enums::{OrderStatus, Role, Status},
    error::{CraftoraDbError, CraftoraDbResult as Result},
    products::Product,
    store::{Slot, Store},
    users::Session,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub(crate) const CART: Slot<Vec<CartItem>> = Slot::new("cart");
pub(crate) const ORDERS: Slot<Vec<Order>> = Slot::new("orders");

/// One line of the customer's cart. The owning artisan is copied from the
/// product at add time, so checkout never has to guess ownership.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    name: String,
    price: Decimal,
    quantity: u32,
    image: String,
    artisan_id: String,
}

impl CartItem {
    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_price(&self) -> Decimal {
        self.price
    }

    pub fn get_quantity(&self) -> u32 {
        self.quantity
    }

    pub fn get_image(&self) -> &str {
        &self.image
    }

    pub fn get_artisan_id(&self) -> &str {
        &self.artisan_id
    }

    fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A pseudo struct used to manage the `cart` slot
pub struct Cart;

impl Cart {
    /// Adding the same product name again merges into the existing line.
    pub fn add(store: &Store, product: &Product, quantity: u32) -> Result<()> {
        let quantity = quantity.max(1);
        let mut items = store.read(&CART)?;
        match items.iter_mut().find(|i| i.name == product.get_name()) {
            Some(item) => item.quantity += quantity,
            None => items.push(CartItem {
                name: product.get_name().to_string(),
                price: product.get_price(),
                quantity,
                image: product.get_image_url().to_string(),
                artisan_id: product.get_artisan_id().to_string(),
            }),
        }
        store.write(&CART, &items)
    }

    pub fn remove(store: &Store, name: &str) -> Result<()> {
        let mut items = store.read(&CART)?;
        items.retain(|i| i.name != name);
        store.write(&CART, &items)
    }

    pub fn items(store: &Store) -> Result<Vec<CartItem>> {
        store.read(&CART)
    }

    pub fn total(store: &Store) -> Result<Decimal> {
        Ok(store.read(&CART)?.iter().map(CartItem::subtotal).sum())
    }

    pub fn clear(store: &Store) -> Result<()> {
        store.clear(&CART)
    }
}

/// An order for exactly one artisan, created at checkout.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: String,
    artisan_id: String,
    customer_id: Option<String>,
    items: Vec<CartItem>,
    date: DateTime<Utc>,
    status: OrderStatus,
}

impl Order {
    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_artisan_id(&self) -> &str {
        &self.artisan_id
    }

    pub fn get_customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    pub fn get_items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get_date(&self) -> &DateTime<Utc> {
        &self.date
    }

    pub fn get_status(&self) -> &OrderStatus {
        &self.status
    }

    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::subtotal).sum()
    }
}

/// A pseudo struct used to manage the `orders` slot
pub struct Orders;

impl Orders {
    /// Checkout: partition the cart by owning artisan and create one order
    /// per partition. All orders are appended in a single write; the cart is
    /// cleared only after that write succeeded.
    pub fn checkout(store: &Store) -> Result<Vec<String>> {
        let items = store.read(&CART)?;
        if items.is_empty() {
            return Err(CraftoraDbError::EmptyCart);
        }

        let customer_id = Session::current(store)?.map(|s| s.id);

        let mut groups: BTreeMap<String, Vec<CartItem>> = BTreeMap::new();
        for item in items {
            groups.entry(item.artisan_id.clone()).or_default().push(item);
        }

        let now = Utc::now();
        let mut orders = store.read(&ORDERS)?;
        let mut created = Vec::with_capacity(groups.len());
        for (artisan_id, items) in groups {
            let order = Order {
                id: Uuid::new_v4().to_string(),
                artisan_id,
                customer_id: customer_id.clone(),
                items,
                date: now,
                status: OrderStatus::Placed,
            };
            created.push(order.id.clone());
            orders.push(order);
        }
        store.write(&ORDERS, &orders)?;

        Cart::clear(store)?;
        Ok(created)
    }

    /// Advance an order's status, one step at a time. Only the artisan the
    /// order belongs to may do this; skips and reversals are rejected.
    pub fn advance(
        store: &Store,
        session: &Session,
        order_id: &str,
        new_status: OrderStatus,
    ) -> Result<()> {
        let mut orders = store.read(&ORDERS)?;
        let order = orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or(CraftoraDbError::OrderNotFound)?;

        if session.role != Role::Artisan || order.artisan_id != session.id {
            return Err(CraftoraDbError::PermissionDenied);
        }
        if new_status != order.status.up() || new_status == order.status {
            return Err(CraftoraDbError::InvalidStatusTransition);
        }

        order.status = new_status;
        store.write(&ORDERS, &orders)
    }
}

/// A search query helper (builder) over the orders slot
pub struct OrderFinder {
    orders: Vec<Order>,
}

impl OrderFinder {
    pub fn list(store: &Store) -> Result<Vec<Order>> {
        Ok(Self::new(store)?.search())
    }

    pub fn new(store: &Store) -> Result<Self> {
        Ok(Self {
            orders: store.read(&ORDERS)?,
        })
    }

    pub fn id(mut self, id_provided: &str) -> Self {
        self.orders.retain(|o| o.id == id_provided);
        self
    }

    pub fn artisan(mut self, artisan_id: &str) -> Self {
        self.orders.retain(|o| o.artisan_id == artisan_id);
        self
    }

    pub fn customer(mut self, customer_id: &str) -> Self {
        self.orders
            .retain(|o| o.customer_id.as_deref() == Some(customer_id));
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.orders.retain(|o| o.status == status);
        self
    }

    pub fn search(self) -> Vec<Order> {
        self.orders
    }

    pub fn first(mut self) -> Result<Order> {
        if self.orders.is_empty() {
            Err(CraftoraDbError::OrderNotFound)
        } else {
            Ok(self.orders.remove(0))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArtisanStats {
    pub orders: usize,
    pub revenue: Decimal,
}

/// The admin dashboard numbers, recomputed by one linear fold over the
/// orders slot on every call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderStats {
    pub total_orders: usize,
    pub total_revenue: Decimal,
    pub average_order_value: Decimal,
    pub per_artisan: BTreeMap<String, ArtisanStats>,
}

impl OrderStats {
    pub fn compute(store: &Store) -> Result<Self> {
        let orders = store.read(&ORDERS)?;
        let mut stats = Self {
            total_orders: orders.len(),
            ..Self::default()
        };
        for order in &orders {
            let value = order.total();
            stats.total_revenue += value;
            let entry = stats
                .per_artisan
                .entry(order.artisan_id.clone())
                .or_default();
            entry.orders += 1;
            entry.revenue += value;
        }
        if stats.total_orders > 0 {
            stats.average_order_value = stats.total_revenue / Decimal::from(stats.total_orders as u64);
        }
        Ok(stats)
    }
}
