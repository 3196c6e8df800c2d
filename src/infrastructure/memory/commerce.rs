//! In-memory commerce repositories (carts, orders, payments, library).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::MemoryStore;
use crate::domain::{
    Cart, CartItem, CartRepository, CartStatus, LibraryEntry, LibraryRepository, Order,
    OrderRepository, OrderStatus, Payment, PaymentRepository, PaymentStatus,
};
use crate::shared::error::AppError;

fn cart_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Cart {} not found", id))
}

#[derive(Clone)]
pub struct MemoryCartRepository {
    store: Arc<MemoryStore>,
}

impl MemoryCartRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CartRepository for MemoryCartRepository {
    async fn find_active_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, AppError> {
        Ok(self
            .store
            .carts
            .iter()
            .find(|c| c.user_id == user_id && c.status == CartStatus::Active)
            .map(|c| c.value().clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Cart>, AppError> {
        Ok(self.store.carts.get(&id).map(|c| c.clone()))
    }

    async fn create(&self, cart: &Cart) -> Result<Cart, AppError> {
        let has_active = self
            .store
            .carts
            .iter()
            .any(|c| c.user_id == cart.user_id && c.status == CartStatus::Active);
        if has_active && cart.status == CartStatus::Active {
            return Err(AppError::Conflict(format!(
                "User {} already has an active cart",
                cart.user_id
            )));
        }
        self.store.carts.insert(cart.id, cart.clone());
        Ok(cart.clone())
    }

    async fn add_items(&self, cart_id: Uuid, items: &[CartItem]) -> Result<(), AppError> {
        let mut cart = self
            .store
            .carts
            .get_mut(&cart_id)
            .ok_or_else(|| cart_not_found(cart_id))?;

        if let Some(dup) = items.iter().find(|i| cart.contains_product(i.product_id)) {
            return Err(AppError::Conflict(format!(
                "Product {} is already in the cart",
                dup.product_id
            )));
        }
        cart.items.extend(items.iter().cloned().map(|mut i| {
            i.cart_id = cart_id;
            i
        }));
        cart.updated_at = Utc::now();
        Ok(())
    }

    async fn update_item_prices(
        &self,
        cart_id: Uuid,
        prices: &[(Uuid, Decimal)],
    ) -> Result<(), AppError> {
        let mut cart = self
            .store
            .carts
            .get_mut(&cart_id)
            .ok_or_else(|| cart_not_found(cart_id))?;

        for (item_id, price) in prices {
            if let Some(item) = cart.items.iter_mut().find(|i| i.id == *item_id) {
                item.price = *price;
            }
        }
        cart.updated_at = Utc::now();
        Ok(())
    }

    async fn remove_items(&self, cart_id: Uuid, item_ids: &[Uuid]) -> Result<(), AppError> {
        let mut cart = self
            .store
            .carts
            .get_mut(&cart_id)
            .ok_or_else(|| cart_not_found(cart_id))?;

        cart.items.retain(|i| !item_ids.contains(&i.id));
        cart.updated_at = Utc::now();
        Ok(())
    }

    async fn clear(&self, cart_id: Uuid) -> Result<(), AppError> {
        let mut cart = self
            .store
            .carts
            .get_mut(&cart_id)
            .ok_or_else(|| cart_not_found(cart_id))?;

        cart.items.clear();
        cart.updated_at = Utc::now();
        Ok(())
    }

    async fn set_status(&self, cart_id: Uuid, status: CartStatus) -> Result<(), AppError> {
        let mut cart = self
            .store
            .carts
            .get_mut(&cart_id)
            .ok_or_else(|| cart_not_found(cart_id))?;

        cart.status = status;
        cart.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Clone)]
pub struct MemoryOrderRepository {
    store: Arc<MemoryStore>,
}

impl MemoryOrderRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn create(&self, order: &Order) -> Result<Order, AppError> {
        self.store.orders.insert(order.id, order.clone());
        Ok(order.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        Ok(self.store.orders.get(&id).map(|o| o.clone()))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, AppError> {
        let mut orders: Vec<Order> = self
            .store
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .map(|o| o.value().clone())
            .collect();
        // v7 ids sort by creation time
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), AppError> {
        let mut order = self
            .store
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;

        order.status = status;
        order.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Clone)]
pub struct MemoryPaymentRepository {
    store: Arc<MemoryStore>,
}

impl MemoryPaymentRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PaymentRepository for MemoryPaymentRepository {
    async fn create(&self, payment: &Payment) -> Result<Payment, AppError> {
        if !self.store.orders.contains_key(&payment.order_id) {
            return Err(AppError::NotFound(format!(
                "Order {} not found",
                payment.order_id
            )));
        }
        self.store.payments.insert(payment.id, payment.clone());
        Ok(payment.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, AppError> {
        Ok(self.store.payments.get(&id).map(|p| p.clone()))
    }

    async fn find_by_order(&self, order_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let mut payments: Vec<Payment> = self
            .store
            .payments
            .iter()
            .filter(|p| p.order_id == order_id)
            .map(|p| p.value().clone())
            .collect();
        payments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(payments)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        provider_reference: Option<String>,
    ) -> Result<(), AppError> {
        let mut payment = self
            .store
            .payments
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Payment {} not found", id)))?;

        payment.status = status;
        if provider_reference.is_some() {
            payment.provider_reference = provider_reference;
        }
        payment.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Clone)]
pub struct MemoryLibraryRepository {
    store: Arc<MemoryStore>,
}

impl MemoryLibraryRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LibraryRepository for MemoryLibraryRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<LibraryEntry>, AppError> {
        let mut entries: Vec<LibraryEntry> = self
            .store
            .library
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by(|a, b| {
            a.acquired_at
                .cmp(&b.acquired_at)
                .then(a.product_id.cmp(&b.product_id))
        });
        Ok(entries)
    }

    async fn owned_product_ids(
        &self,
        user_id: Uuid,
        product_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, AppError> {
        Ok(product_ids
            .iter()
            .copied()
            .filter(|id| self.store.library.contains_key(&(user_id, *id)))
            .collect())
    }

    async fn add_entries(&self, entries: &[LibraryEntry]) -> Result<(), AppError> {
        for entry in entries {
            self.store
                .library
                .entry((entry.user_id, entry.product_id))
                .or_insert_with(|| entry.clone());
        }
        Ok(())
    }
}
