//! Sale recording
//!
//! A sale targets either a stock row or a pending row. [`plan_sale`] turns a
//! request into the exact set of writes to perform; the caller executes them.
//!
//! ```text
//! stock --full sale--> stock decremented (zeroed at 0)
//! stock --partial sale--> stock - 1, new pending row
//! pending --sale--> qty_sold updated, or row deleted once fully sold
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{NewPendingItem, NewSoldFactura, PendingItem, StockItem};

/// Traffic sources a sale can be attributed to
pub const SALE_SOURCES: &[&str] = &["TikTok", "Instagram", "Facebook", "Prieteni", "Google", "Altele"];

/// Label used for sales recorded without a source
pub const UNKNOWN_SOURCE_LABEL: &str = "Altă sursă";

/// A recorded sale. Never modified after insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoldItem {
    pub id: Uuid,
    /// Originating stock row, if it still exists
    pub stock_item_id: Option<Uuid>,
    pub name: String,
    pub category: String,
    pub description: String,
    pub unit: String,
    pub quantity_sold: i32,
    pub sale_price: Decimal,
    pub total_value: Decimal,
    /// Email of the user who recorded the sale
    pub sold_by: String,
    pub sold_date: DateTime<Utc>,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSoldItem {
    pub stock_item_id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    pub unit: String,
    pub quantity_sold: i32,
    pub sale_price: Decimal,
    pub total_value: Decimal,
    pub sold_by: String,
    pub sold_date: DateTime<Utc>,
    pub source: String,
}

/// Which table the sold row comes from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SaleContext {
    Stock,
    Pending,
}

/// Extra input when a stock unit is opened and sold piece by piece
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartialSale {
    /// Pieces contained in the opened unit
    pub total_pieces: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleRequest {
    pub context: SaleContext,
    pub item_id: Uuid,
    pub quantity: i32,
    /// Total amount received for this sale
    pub total_price: Decimal,
    pub source: String,
    #[serde(default)]
    pub partial: Option<PartialSale>,
}

/// The row a sale is recorded against, as read before planning
#[derive(Debug, Clone, PartialEq)]
pub enum SaleTarget {
    Stock(StockItem),
    Pending(PendingItem),
}

impl SaleTarget {
    pub fn context(&self) -> SaleContext {
        match self {
            SaleTarget::Stock(_) => SaleContext::Stock,
            SaleTarget::Pending(_) => SaleContext::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StockUpdate {
    /// Set the remaining quantity, other columns untouched
    Decrement { stock_item_id: Uuid, remaining: Decimal },
    /// Stock exhausted: quantity and value both become 0, the row stays
    Zero { stock_item_id: Uuid },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    Create(NewPendingItem),
    UpdateSold { pending_id: Uuid, qty_sold: i32 },
    Delete { pending_id: Uuid },
}

/// Writes that record one sale, in execution order
#[derive(Debug, Clone, PartialEq)]
pub struct SalePlan {
    pub sold_item: NewSoldItem,
    pub invoice: Option<NewSoldFactura>,
    pub stock_update: Option<StockUpdate>,
    pub pending: Option<PendingAction>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SaleError {
    #[error("Sale price must be greater than zero")]
    NonPositivePrice,

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Requested {requested} but only {available} in stock")]
    InsufficientStock { available: Decimal, requested: i32 },

    #[error("Requested {requested} but only {pending} pieces are pending")]
    ExceedsPending { pending: i32, requested: i32 },

    #[error("Pieces sold now ({sold}) must be fewer than the pieces in the unit ({total})")]
    InvalidTotalPieces { total: i32, sold: i32 },

    #[error("Pending items cannot be split into a new partial sale")]
    PartialFromPending,

    #[error("Unknown sale source: {0}")]
    UnknownSource(String),

    #[error("Stock item is exhausted")]
    Exhausted,

    #[error("Sale context does not match the target row")]
    ContextMismatch,
}

impl SaleError {
    /// Request field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            SaleError::NonPositivePrice => "total_price",
            SaleError::InvalidQuantity
            | SaleError::InsufficientStock { .. }
            | SaleError::ExceedsPending { .. }
            | SaleError::Exhausted => "quantity",
            SaleError::InvalidTotalPieces { .. } | SaleError::PartialFromPending => "partial",
            SaleError::UnknownSource(_) => "source",
            SaleError::ContextMismatch => "context",
        }
    }
}

pub fn is_known_source(source: &str) -> bool {
    SALE_SOURCES.contains(&source)
}

/// Validate a sale request against its target and compute the writes
pub fn plan_sale(
    target: &SaleTarget,
    request: &SaleRequest,
    seller: &str,
    sold_at: DateTime<Utc>,
) -> Result<SalePlan, SaleError> {
    if target.context() != request.context {
        return Err(SaleError::ContextMismatch);
    }
    if request.total_price <= Decimal::ZERO {
        return Err(SaleError::NonPositivePrice);
    }
    if request.quantity < 1 {
        return Err(SaleError::InvalidQuantity);
    }
    let source = request.source.trim();
    if !is_known_source(source) {
        return Err(SaleError::UnknownSource(request.source.clone()));
    }

    match target {
        SaleTarget::Stock(stock) => plan_stock_sale(stock, request, source, seller, sold_at),
        SaleTarget::Pending(pending) => plan_pending_sale(pending, request, source, seller, sold_at),
    }
}

fn sold_item(
    stock_item_id: Uuid,
    description: &str,
    unit: &str,
    request: &SaleRequest,
    source: &str,
    seller: &str,
    sold_at: DateTime<Utc>,
) -> NewSoldItem {
    NewSoldItem {
        stock_item_id,
        name: description.to_string(),
        category: String::new(),
        description: description.to_string(),
        unit: unit.to_string(),
        quantity_sold: request.quantity,
        sale_price: request.total_price,
        total_value: request.total_price,
        sold_by: seller.to_string(),
        sold_date: sold_at,
        source: source.to_string(),
    }
}

fn plan_stock_sale(
    stock: &StockItem,
    request: &SaleRequest,
    source: &str,
    seller: &str,
    sold_at: DateTime<Utc>,
) -> Result<SalePlan, SaleError> {
    if stock.is_exhausted() {
        return Err(SaleError::Exhausted);
    }

    // A partial sale opens exactly one unit
    let opened = match &request.partial {
        Some(partial) => {
            if request.quantity >= partial.total_pieces {
                return Err(SaleError::InvalidTotalPieces {
                    total: partial.total_pieces,
                    sold: request.quantity,
                });
            }
            Decimal::ONE
        }
        None => {
            let requested = Decimal::from(request.quantity);
            if requested > stock.quantity {
                return Err(SaleError::InsufficientStock {
                    available: stock.quantity,
                    requested: request.quantity,
                });
            }
            requested
        }
    };

    let remaining = stock.quantity - opened;
    let stock_update = if remaining <= Decimal::ZERO {
        StockUpdate::Zero { stock_item_id: stock.id }
    } else {
        StockUpdate::Decrement {
            stock_item_id: stock.id,
            remaining,
        }
    };

    let pending = request.partial.as_ref().map(|partial| {
        PendingAction::Create(NewPendingItem {
            stock_item_id: stock.id,
            description: stock.description.clone(),
            unit: stock.unit.clone(),
            qty_total: partial.total_pieces,
            qty_sold: request.quantity,
            comment: partial.comment.clone().unwrap_or_default().trim().to_string(),
        })
    });

    Ok(SalePlan {
        sold_item: sold_item(stock.id, &stock.description, &stock.unit, request, source, seller, sold_at),
        invoice: Some(NewSoldFactura {
            stock_item_id: stock.id,
            product_name: stock.description.clone(),
            invoice_price: stock.value,
        }),
        stock_update: Some(stock_update),
        pending,
    })
}

fn plan_pending_sale(
    pending: &PendingItem,
    request: &SaleRequest,
    source: &str,
    seller: &str,
    sold_at: DateTime<Utc>,
) -> Result<SalePlan, SaleError> {
    if request.partial.is_some() {
        return Err(SaleError::PartialFromPending);
    }
    if request.quantity > pending.qty_pending() {
        return Err(SaleError::ExceedsPending {
            pending: pending.qty_pending(),
            requested: request.quantity,
        });
    }

    let new_sold = pending.qty_sold + request.quantity;
    let action = if new_sold >= pending.qty_total {
        PendingAction::Delete { pending_id: pending.id }
    } else {
        PendingAction::UpdateSold {
            pending_id: pending.id,
            qty_sold: new_sold,
        }
    };

    Ok(SalePlan {
        sold_item: sold_item(
            pending.stock_item_id,
            &pending.description,
            &pending.unit,
            request,
            source,
            seller,
            sold_at,
        ),
        invoice: None,
        stock_update: None,
        pending: Some(action),
    })
}
