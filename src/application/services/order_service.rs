//! Order Service
//!
//! Checkout and payment completion. Checkout freezes the reconciled cart into
//! an order with a pending payment; completing the payment either grants the
//! products or cancels the order.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::application::services::cart_service::{CartError, CartService};
use crate::domain::{
    CartRepository, CartStatus, LibraryEntry, LibraryRepository, Order, OrderItem,
    OrderRepository, OrderStatus, Payment, PaymentRepository, PaymentStatus,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Order service trait
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Turn the user's active cart into a pending order
    async fn checkout(&self, user_id: Uuid) -> Result<CheckoutDto, OrderError>;

    /// Record the payment provider's verdict for a pending payment
    async fn complete_payment(
        &self,
        payment_id: Uuid,
        outcome: PaymentOutcome,
    ) -> Result<OrderDto, OrderError>;

    /// Get one of the user's orders
    async fn get_order(&self, user_id: Uuid, order_id: Uuid) -> Result<OrderDto, OrderError>;

    /// List the user's orders, newest first
    async fn list_orders(&self, user_id: Uuid) -> Result<Vec<OrderDto>, OrderError>;
}

/// Result reported by the payment provider
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub succeeded: bool,
    pub provider_reference: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OrderItemDto {
    pub product_id: Uuid,
    pub bundle_id: Option<Uuid>,
    pub price: Decimal,
}

#[derive(Debug, Clone)]
pub struct PaymentDto {
    pub id: Uuid,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub provider_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Payment> for PaymentDto {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            amount: payment.amount,
            status: payment.status,
            provider_reference: payment.provider_reference,
            created_at: payment.created_at,
        }
    }
}

/// Order data transfer object
#[derive(Debug, Clone)]
pub struct OrderDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub total: Decimal,
    pub items: Vec<OrderItemDto>,
    pub payments: Vec<PaymentDto>,
    pub created_at: DateTime<Utc>,
}

impl OrderDto {
    fn from_parts(order: Order, payments: Vec<Payment>) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            status: order.status,
            total: order.total,
            items: order
                .items
                .into_iter()
                .map(|i| OrderItemDto {
                    product_id: i.product_id,
                    bundle_id: i.bundle_id,
                    price: i.price,
                })
                .collect(),
            payments: payments.into_iter().map(PaymentDto::from).collect(),
            created_at: order.created_at,
        }
    }
}

/// Checkout result: the new order and the payment to settle it
#[derive(Debug, Clone)]
pub struct CheckoutDto {
    pub order: OrderDto,
    pub payment: PaymentDto,
}

/// Order service errors
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Cart contains products that are already owned")]
    AlreadyOwned,

    #[error("Order not found")]
    OrderNotFound,

    #[error("Payment not found")]
    PaymentNotFound,

    #[error("Payment is already {0}")]
    PaymentNotPending(&'static str),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::EmptyCart => AppError::BadRequest(err.to_string()),
            OrderError::OrderNotFound | OrderError::PaymentNotFound => {
                AppError::NotFound(err.to_string())
            }
            OrderError::AlreadyOwned | OrderError::PaymentNotPending(_) => {
                AppError::Conflict(err.to_string())
            }
            OrderError::Cart(e) => e.into(),
            OrderError::Repository(e) => e,
        }
    }
}

/// OrderService implementation
pub struct OrderServiceImpl<C, O, P, L>
where
    C: CartRepository,
    O: OrderRepository,
    P: PaymentRepository,
    L: LibraryRepository,
{
    cart_service: Arc<dyn CartService>,
    cart_repo: Arc<C>,
    order_repo: Arc<O>,
    payment_repo: Arc<P>,
    library_repo: Arc<L>,
}

impl<C, O, P, L> OrderServiceImpl<C, O, P, L>
where
    C: CartRepository,
    O: OrderRepository,
    P: PaymentRepository,
    L: LibraryRepository,
{
    pub fn new(
        cart_service: Arc<dyn CartService>,
        cart_repo: Arc<C>,
        order_repo: Arc<O>,
        payment_repo: Arc<P>,
        library_repo: Arc<L>,
    ) -> Self {
        Self {
            cart_service,
            cart_repo,
            order_repo,
            payment_repo,
            library_repo,
        }
    }

    async fn order_dto(&self, order: Order) -> Result<OrderDto, OrderError> {
        let payments = self.payment_repo.find_by_order(order.id).await?;
        Ok(OrderDto::from_parts(order, payments))
    }
}

#[async_trait]
impl<C, O, P, L> OrderService for OrderServiceImpl<C, O, P, L>
where
    C: CartRepository + 'static,
    O: OrderRepository + 'static,
    P: PaymentRepository + 'static,
    L: LibraryRepository + 'static,
{
    async fn checkout(&self, user_id: Uuid) -> Result<CheckoutDto, OrderError> {
        let cart = self
            .cart_service
            .reconciled_cart(user_id)
            .await?
            .filter(|c| !c.is_empty())
            .ok_or(OrderError::EmptyCart)?;

        let product_ids: Vec<Uuid> = cart.items.iter().map(|i| i.product_id).collect();
        let owned = self
            .library_repo
            .owned_product_ids(user_id, &product_ids)
            .await?;
        // Bundles may still contain owned products; standalone lines may not.
        if cart
            .standalone_items()
            .any(|i| owned.contains(&i.product_id))
        {
            return Err(OrderError::AlreadyOwned);
        }

        let now = Utc::now();
        let order_id = Uuid::now_v7();
        let order = Order {
            id: order_id,
            user_id,
            cart_id: cart.id,
            status: OrderStatus::Pending,
            total: cart.total(),
            items: cart
                .items
                .iter()
                .map(|i| OrderItem {
                    order_id,
                    product_id: i.product_id,
                    bundle_id: i.bundle_id,
                    price: i.price,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        };
        let order = self.order_repo.create(&order).await?;

        let payment = self
            .payment_repo
            .create(&Payment {
                id: Uuid::now_v7(),
                order_id: order.id,
                amount: order.total,
                status: PaymentStatus::Pending,
                provider_reference: None,
                created_at: now,
                updated_at: now,
            })
            .await?;

        self.cart_repo.set_status(cart.id, CartStatus::Ordered).await?;

        metrics::record_order(OrderStatus::Pending.as_str());
        tracing::info!(
            target: "audit",
            user_id = %user_id,
            cart_id = %cart.id,
            order_id = %order.id,
            payment_id = %payment.id,
            total = %order.total,
            "Checkout completed"
        );

        Ok(CheckoutDto {
            order: OrderDto::from_parts(order, vec![payment.clone()]),
            payment: payment.into(),
        })
    }

    async fn complete_payment(
        &self,
        payment_id: Uuid,
        outcome: PaymentOutcome,
    ) -> Result<OrderDto, OrderError> {
        let payment = self
            .payment_repo
            .find_by_id(payment_id)
            .await?
            .ok_or(OrderError::PaymentNotFound)?;
        if payment.status != PaymentStatus::Pending {
            return Err(OrderError::PaymentNotPending(payment.status.as_str()));
        }

        let mut order = self
            .order_repo
            .find_by_id(payment.order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;

        let (payment_status, order_status) = if outcome.succeeded {
            (PaymentStatus::Completed, OrderStatus::Paid)
        } else {
            (PaymentStatus::Failed, OrderStatus::Cancelled)
        };

        self.payment_repo
            .update_status(payment.id, payment_status, outcome.provider_reference)
            .await?;
        self.order_repo.update_status(order.id, order_status).await?;
        order.status = order_status;

        if outcome.succeeded {
            let now = Utc::now();
            let entries: Vec<LibraryEntry> = order
                .items
                .iter()
                .map(|i| LibraryEntry {
                    user_id: order.user_id,
                    product_id: i.product_id,
                    order_id: order.id,
                    acquired_at: now,
                })
                .collect();
            self.library_repo.add_entries(&entries).await?;
        }

        metrics::record_payment(outcome.succeeded);
        metrics::record_order(order_status.as_str());
        tracing::info!(
            target: "audit",
            user_id = %order.user_id,
            order_id = %order.id,
            payment_id = %payment.id,
            status = order_status.as_str(),
            "Payment completed"
        );

        self.order_dto(order).await
    }

    async fn get_order(&self, user_id: Uuid, order_id: Uuid) -> Result<OrderDto, OrderError> {
        let order = self
            .order_repo
            .find_by_id(order_id)
            .await?
            .filter(|o| o.user_id == user_id)
            .ok_or(OrderError::OrderNotFound)?;

        self.order_dto(order).await
    }

    async fn list_orders(&self, user_id: Uuid) -> Result<Vec<OrderDto>, OrderError> {
        let orders = self.order_repo.find_by_user(user_id).await?;

        let mut dtos = Vec::with_capacity(orders.len());
        for order in orders {
            dtos.push(self.order_dto(order).await?);
        }
        Ok(dtos)
    }
}
