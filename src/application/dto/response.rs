//! Response DTOs
//!
//! Data structures for API response bodies. Money is serialized as a
//! decimal string, timestamps as RFC 3339.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::application::services::{
    BundleDto, BundleMemberDto, CartBundleDto, CartDto, CartLineDto, CheckoutDto,
    LibraryEntryDto, OrderDto, OrderItemDto, PaymentDto, ProductDto,
};

/// Product response
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_game_id: Option<String>,
    pub base_price: Decimal,
    pub price: Decimal,
    pub discount_percent: Option<Decimal>,
}

impl From<ProductDto> for ProductResponse {
    fn from(dto: ProductDto) -> Self {
        Self {
            id: dto.id.to_string(),
            name: dto.name,
            kind: dto.kind,
            base_game_id: dto.base_game_id.map(|id| id.to_string()),
            base_price: dto.base_price,
            price: dto.price,
            discount_percent: dto.discount_percent,
        }
    }
}

/// Bundle member response
#[derive(Debug, Serialize)]
pub struct BundleMemberResponse {
    pub product_id: String,
    pub name: String,
    pub base_price: Decimal,
    pub share: Decimal,
}

impl From<BundleMemberDto> for BundleMemberResponse {
    fn from(dto: BundleMemberDto) -> Self {
        Self {
            product_id: dto.product_id.to_string(),
            name: dto.name,
            base_price: dto.base_price,
            share: dto.share,
        }
    }
}

/// Bundle response
#[derive(Debug, Serialize)]
pub struct BundleResponse {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub original_total: Decimal,
    pub members: Vec<BundleMemberResponse>,
}

impl From<BundleDto> for BundleResponse {
    fn from(dto: BundleDto) -> Self {
        Self {
            id: dto.id.to_string(),
            name: dto.name,
            price: dto.price,
            original_total: dto.original_total,
            members: dto.members.into_iter().map(Into::into).collect(),
        }
    }
}

/// Cart line response
#[derive(Debug, Serialize)]
pub struct CartLineResponse {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub original_price: Decimal,
    pub price: Decimal,
}

impl From<CartLineDto> for CartLineResponse {
    fn from(dto: CartLineDto) -> Self {
        Self {
            id: dto.item_id.to_string(),
            product_id: dto.product_id.to_string(),
            name: dto.name,
            original_price: dto.original_price,
            price: dto.price,
        }
    }
}

/// Bundle inside a cart
#[derive(Debug, Serialize)]
pub struct CartBundleResponse {
    pub bundle_id: String,
    pub name: String,
    pub price: Decimal,
    pub items: Vec<CartLineResponse>,
}

impl From<CartBundleDto> for CartBundleResponse {
    fn from(dto: CartBundleDto) -> Self {
        Self {
            bundle_id: dto.bundle_id.to_string(),
            name: dto.name,
            price: dto.price,
            items: dto.items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Cart response
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub id: Option<String>,
    pub items: Vec<CartLineResponse>,
    pub bundles: Vec<CartBundleResponse>,
    pub total: Decimal,
    pub original_total: Decimal,
    pub savings: Decimal,
}

impl From<CartDto> for CartResponse {
    fn from(dto: CartDto) -> Self {
        Self {
            id: dto.id.map(|id| id.to_string()),
            items: dto.items.into_iter().map(Into::into).collect(),
            bundles: dto.bundles.into_iter().map(Into::into).collect(),
            total: dto.total,
            original_total: dto.original_total,
            savings: dto.savings,
        }
    }
}

/// Payment response
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub amount: Decimal,
    pub status: String,
    pub provider_reference: Option<String>,
    pub created_at: String,
}

impl From<PaymentDto> for PaymentResponse {
    fn from(dto: PaymentDto) -> Self {
        Self {
            id: dto.id.to_string(),
            amount: dto.amount,
            status: dto.status.as_str().to_string(),
            provider_reference: dto.provider_reference,
            created_at: dto.created_at.to_rfc3339(),
        }
    }
}

/// Order line response
#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    pub price: Decimal,
}

impl From<OrderItemDto> for OrderItemResponse {
    fn from(dto: OrderItemDto) -> Self {
        Self {
            product_id: dto.product_id.to_string(),
            bundle_id: dto.bundle_id.map(|id| id.to_string()),
            price: dto.price,
        }
    }
}

/// Order response
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub status: String,
    pub total: Decimal,
    pub items: Vec<OrderItemResponse>,
    pub payments: Vec<PaymentResponse>,
    pub created_at: String,
}

impl From<OrderDto> for OrderResponse {
    fn from(dto: OrderDto) -> Self {
        Self {
            id: dto.id.to_string(),
            status: dto.status.as_str().to_string(),
            total: dto.total,
            items: dto.items.into_iter().map(Into::into).collect(),
            payments: dto.payments.into_iter().map(Into::into).collect(),
            created_at: dto.created_at.to_rfc3339(),
        }
    }
}

/// Checkout response
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order: OrderResponse,
    pub payment: PaymentResponse,
}

impl From<CheckoutDto> for CheckoutResponse {
    fn from(dto: CheckoutDto) -> Self {
        Self {
            order: dto.order.into(),
            payment: dto.payment.into(),
        }
    }
}

/// Library entry response
#[derive(Debug, Serialize)]
pub struct LibraryEntryResponse {
    pub product_id: String,
    pub name: String,
    pub kind: String,
    pub order_id: String,
    pub acquired_at: String,
}

impl From<LibraryEntryDto> for LibraryEntryResponse {
    fn from(dto: LibraryEntryDto) -> Self {
        Self {
            product_id: dto.product_id.to_string(),
            name: dto.name,
            kind: dto.kind,
            order_id: dto.order_id.to_string(),
            acquired_at: dto.acquired_at.to_rfc3339(),
        }
    }
}
