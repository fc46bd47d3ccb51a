use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use shared::{DiscountType, OrderStatus, ParseError};

use crate::schema::{order_items, orders, products, promo_code_usages, promo_codes};

#[derive(Debug, Clone, Queryable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = products)]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub price: BigDecimal,
    pub inventory: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = orders)]
pub struct OrderRow {
    pub id: i32,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub customer_address: String,
    pub notes: Option<String>,
    pub total: BigDecimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn status(&self) -> Result<OrderStatus, ParseError> {
        self.status.parse()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub customer_address: String,
    pub notes: Option<String>,
    pub total: BigDecimal,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize, Deserialize)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
pub struct OrderItemRow {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub price: BigDecimal,
    pub quantity: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub order_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub price: BigDecimal,
    pub quantity: i32,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = promo_codes)]
pub struct PromoCodeRow {
    pub id: i32,
    pub code: String,
    pub discount_type: String,
    pub discount_value: BigDecimal,
    pub min_order_amount: Option<BigDecimal>,
    pub max_discount_amount: Option<BigDecimal>,
    pub usage_limit: Option<i32>,
    pub per_user_limit: Option<i32>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub is_active: bool,
    pub usage_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PromoCodeRow {
    pub fn discount_type(&self) -> Result<DiscountType, ParseError> {
        self.discount_type.parse()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = promo_codes)]
pub struct NewPromoCodeRow {
    pub code: String,
    pub discount_type: String,
    pub discount_value: BigDecimal,
    pub min_order_amount: Option<BigDecimal>,
    pub max_discount_amount: Option<BigDecimal>,
    pub usage_limit: Option<i32>,
    pub per_user_limit: Option<i32>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub is_active: bool,
}

// None leaves a column untouched; nullable columns cannot be cleared through
// a partial update.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = promo_codes)]
pub struct PromoCodeChangeset {
    pub code: Option<String>,
    pub discount_type: Option<String>,
    pub discount_value: Option<BigDecimal>,
    pub min_order_amount: Option<BigDecimal>,
    pub max_discount_amount: Option<BigDecimal>,
    pub usage_limit: Option<i32>,
    pub per_user_limit: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize, Deserialize)]
#[diesel(table_name = promo_code_usages)]
#[diesel(belongs_to(PromoCodeRow, foreign_key = promo_code_id))]
pub struct PromoCodeUsageRow {
    pub id: i32,
    pub promo_code_id: i32,
    pub order_id: i32,
    pub user_id: Option<String>,
    pub discount_applied: BigDecimal,
    pub used_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = promo_code_usages)]
pub struct NewPromoCodeUsageRow {
    pub promo_code_id: i32,
    pub order_id: i32,
    pub user_id: Option<String>,
    pub discount_applied: BigDecimal,
}
