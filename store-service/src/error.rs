use diesel_async::pooled_connection::PoolError;
use shared::OrderStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("product {0} not found")]
    ProductNotFound(i32),

    #[error("insufficient inventory for product {product_id}: requested {requested}, available {available}")]
    InsufficientInventory {
        product_id: i32,
        requested: i32,
        available: i32,
    },

    #[error("order {0} not found")]
    OrderNotFound(i32),

    #[error("promo code {0} not found")]
    PromoCodeNotFound(i32),

    #[error("{0}")]
    PromoIneligible(String),

    #[error("a promo code with that code already exists")]
    DuplicatePromoCode,

    #[error("order status cannot change from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    #[error(transparent)]
    Parse(#[from] shared::ParseError),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] bb8::RunError<PoolError>),
}
