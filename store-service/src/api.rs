use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use shared::{DiscountType, OrderStatus};
use tracing::error;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::StoreError;
use crate::handlers::{
    DbPool, OrderDraft, OrderLine, OrderManager, PromoApplication, PromoManager, PromoValidation,
};
use crate::models::{
    NewPromoCodeRow, OrderItemRow, OrderRow, PromoCodeChangeset, PromoCodeRow, PromoCodeUsageRow,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemPayload {
    #[validate(range(min = 1, message = "productId must be positive"))]
    pub product_id: i32,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate]
    pub customer: CustomerPayload,
    #[validate]
    pub items: Vec<OrderItemPayload>,
    #[validate(range(min = 0.0, message = "total must not be negative"))]
    pub total: f64,
    pub promo_code: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    pub customer_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ValidatePromoCodeRequest {
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
    #[validate(range(min = 0.0, message = "cartTotal must not be negative"))]
    pub cart_total: f64,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePromoCodeRequest {
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
    pub discount_type: String,
    #[validate(range(min = 0.0, message = "discountValue must not be negative"))]
    pub discount_value: f64,
    #[validate(range(min = 0.0, message = "minOrderAmount must not be negative"))]
    pub min_order_amount: Option<f64>,
    #[validate(range(min = 0.0, message = "maxDiscountAmount must not be negative"))]
    pub max_discount_amount: Option<f64>,
    #[validate(range(min = 1, message = "usageLimit must be at least 1"))]
    pub usage_limit: Option<i32>,
    #[validate(range(min = 1, message = "perUserLimit must be at least 1"))]
    pub per_user_limit: Option<i32>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePromoCodeRequest {
    #[validate(length(min = 1, message = "code must not be empty"))]
    pub code: Option<String>,
    pub discount_type: Option<String>,
    #[validate(range(min = 0.0, message = "discountValue must not be negative"))]
    pub discount_value: Option<f64>,
    #[validate(range(min = 0.0, message = "minOrderAmount must not be negative"))]
    pub min_order_amount: Option<f64>,
    #[validate(range(min = 0.0, message = "maxDiscountAmount must not be negative"))]
    pub max_discount_amount: Option<f64>,
    #[validate(range(min = 1, message = "usageLimit must be at least 1"))]
    pub usage_limit: Option<i32>,
    #[validate(range(min = 1, message = "perUserLimit must be at least 1"))]
    pub per_user_limit: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub price: f64,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomerResponse {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i32,
    pub customer: OrderCustomerResponse,
    pub total: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

impl From<(OrderRow, Vec<OrderItemRow>)> for OrderResponse {
    fn from((order, items): (OrderRow, Vec<OrderItemRow>)) -> Self {
        Self {
            id: order.id,
            customer: OrderCustomerResponse {
                name: order.customer_name,
                email: order.customer_email,
                phone: order.customer_phone,
                address: order.customer_address,
                notes: order.notes,
            },
            total: order.total.to_f64().unwrap_or_default(),
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: items
                .into_iter()
                .map(|item| OrderItemResponse {
                    id: item.id,
                    product_id: item.product_id,
                    product_name: item.product_name,
                    price: item.price.to_f64().unwrap_or_default(),
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeResponse {
    pub id: i32,
    pub code: String,
    pub discount_type: String,
    pub discount_value: f64,
    pub min_order_amount: Option<f64>,
    pub max_discount_amount: Option<f64>,
    pub usage_limit: Option<i32>,
    pub per_user_limit: Option<i32>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub is_active: bool,
    pub usage_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PromoCodeRow> for PromoCodeResponse {
    fn from(row: PromoCodeRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            discount_type: row.discount_type,
            discount_value: row.discount_value.to_f64().unwrap_or_default(),
            min_order_amount: row.min_order_amount.and_then(|v| v.to_f64()),
            max_discount_amount: row.max_discount_amount.and_then(|v| v.to_f64()),
            usage_limit: row.usage_limit,
            per_user_limit: row.per_user_limit,
            valid_from: row.valid_from,
            valid_until: row.valid_until,
            is_active: row.is_active,
            usage_count: row.usage_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordPromoUsageRequest {
    #[validate(range(min = 1, message = "orderId must be positive"))]
    pub order_id: i32,
    #[validate(range(min = 0.0, message = "discountApplied must not be negative"))]
    pub discount_applied: f64,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeUsageResponse {
    pub id: i32,
    pub promo_code_id: i32,
    pub order_id: i32,
    pub user_id: Option<String>,
    pub discount_applied: f64,
    pub used_at: DateTime<Utc>,
}

impl From<PromoCodeUsageRow> for PromoCodeUsageResponse {
    fn from(row: PromoCodeUsageRow) -> Self {
        Self {
            id: row.id,
            promo_code_id: row.promo_code_id,
            order_id: row.order_id,
            user_id: row.user_id,
            discount_applied: row.discount_applied.to_f64().unwrap_or_default(),
            used_at: row.used_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeSummary {
    pub id: i32,
    pub code: String,
    pub discount_type: String,
    pub discount_value: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatePromoCodeResponse {
    pub valid: bool,
    pub promo_code: PromoCodeSummary,
    pub discount_amount: f64,
}

#[derive(Debug, Serialize)]
pub struct PromoRejection {
    pub valid: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ValidationErrorResponse {
    pub errors: Vec<FieldError>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/orders", post(create_order).get(list_orders))
        .route("/api/orders/:id", patch(update_order_status))
        .route("/api/promo-codes", post(create_promo_code).get(list_promo_codes))
        .route("/api/promo-codes/validate", post(validate_promo_code))
        .route(
            "/api/promo-codes/:id",
            patch(update_promo_code).delete(delete_promo_code),
        )
        .route("/api/promo-codes/:id/record-usage", post(record_promo_usage))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), Response> {
    let mut errors = collect_errors(&request);
    if request.items.is_empty() {
        errors.push(FieldError {
            field: "items".to_string(),
            message: "items must not be empty".to_string(),
        });
    }
    if !errors.is_empty() {
        return Err(validation_response(errors));
    }

    let total = to_decimal(request.total, "total")?;
    let draft = OrderDraft {
        customer_name: request.customer.name,
        customer_email: request.customer.email,
        customer_phone: request.customer.phone,
        customer_address: request.customer.address,
        notes: request.customer.notes,
        items: request
            .items
            .iter()
            .map(|item| OrderLine {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect(),
        total,
        promo: request.promo_code.map(|code| PromoApplication {
            code,
            user_id: request.user_id.clone(),
        }),
    };

    let manager = OrderManager::new(state.pool.clone());
    match manager.place_order(draft).await {
        Ok(created) => Ok((StatusCode::CREATED, Json(OrderResponse::from(created)))),
        Err(StoreError::PromoIneligible(reason)) => {
            Err(message_response(StatusCode::BAD_REQUEST, reason))
        }
        Err(err @ (StoreError::Database(_) | StoreError::Pool(_) | StoreError::Parse(_))) => {
            Err(internal_error(&err))
        }
        // product/inventory failures stay collapsed on the wire
        Err(_) => Err(message_response(
            StatusCode::BAD_REQUEST,
            "Unable to create order",
        )),
    }
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<OrderResponse>>, Response> {
    let manager = OrderManager::new(state.pool.clone());
    match manager.list_orders(query.customer_email.as_deref()).await {
        Ok(orders) => Ok(Json(orders.into_iter().map(OrderResponse::from).collect())),
        Err(err) => Err(internal_error(&err)),
    }
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<OrderResponse>, Response> {
    let status: OrderStatus = request
        .status
        .parse()
        .map_err(|_| message_response(StatusCode::BAD_REQUEST, "Invalid order status"))?;

    let manager = OrderManager::new(state.pool.clone());
    match manager.update_status(order_id, status).await {
        Ok(updated) => Ok(Json(OrderResponse::from(updated))),
        Err(StoreError::OrderNotFound(_)) => {
            Err(message_response(StatusCode::NOT_FOUND, "Order not found"))
        }
        Err(err @ StoreError::InvalidStatusTransition { .. }) => {
            Err(message_response(StatusCode::BAD_REQUEST, err.to_string()))
        }
        Err(err) => Err(internal_error(&err)),
    }
}

pub async fn validate_promo_code(
    State(state): State<AppState>,
    Json(request): Json<ValidatePromoCodeRequest>,
) -> Result<Json<ValidatePromoCodeResponse>, Response> {
    let errors = collect_errors(&request);
    if !errors.is_empty() {
        return Err(validation_response(errors));
    }
    let cart_total = to_decimal(request.cart_total, "cartTotal")?;

    let manager = PromoManager::new(state.pool.clone());
    match manager
        .validate(&request.code, &cart_total, request.user_id.as_deref())
        .await
    {
        Ok(PromoValidation::Eligible { promo, discount }) => Ok(Json(ValidatePromoCodeResponse {
            valid: true,
            promo_code: PromoCodeSummary {
                id: promo.id,
                code: promo.code,
                discount_type: promo.discount_type,
                discount_value: promo.discount_value.to_f64().unwrap_or_default(),
            },
            discount_amount: discount.to_f64().unwrap_or_default(),
        })),
        Ok(PromoValidation::Ineligible { reason }) => Err((
            StatusCode::BAD_REQUEST,
            Json(PromoRejection { valid: false, message: reason }),
        )
            .into_response()),
        Err(err) => Err(internal_error(&err)),
    }
}

pub async fn list_promo_codes(
    State(state): State<AppState>,
) -> Result<Json<Vec<PromoCodeResponse>>, Response> {
    let manager = PromoManager::new(state.pool.clone());
    match manager.list().await {
        Ok(rows) => Ok(Json(rows.into_iter().map(PromoCodeResponse::from).collect())),
        Err(err) => Err(internal_error(&err)),
    }
}

pub async fn create_promo_code(
    State(state): State<AppState>,
    Json(request): Json<CreatePromoCodeRequest>,
) -> Result<(StatusCode, Json<PromoCodeResponse>), Response> {
    let mut errors = collect_errors(&request);
    if request.discount_type.parse::<DiscountType>().is_err() {
        errors.push(FieldError {
            field: "discountType".to_string(),
            message: "discountType must be PERCENTAGE, FIXED_AMOUNT or FREE_SHIPPING".to_string(),
        });
    }
    if request.valid_until <= request.valid_from {
        errors.push(FieldError {
            field: "validUntil".to_string(),
            message: "validUntil must be after validFrom".to_string(),
        });
    }
    if !errors.is_empty() {
        return Err(validation_response(errors));
    }

    let new = NewPromoCodeRow {
        code: request.code,
        discount_type: request.discount_type,
        discount_value: to_decimal(request.discount_value, "discountValue")?,
        min_order_amount: to_optional_decimal(request.min_order_amount, "minOrderAmount")?,
        max_discount_amount: to_optional_decimal(request.max_discount_amount, "maxDiscountAmount")?,
        usage_limit: request.usage_limit,
        per_user_limit: request.per_user_limit,
        valid_from: request.valid_from,
        valid_until: request.valid_until,
        is_active: request.is_active,
    };

    let manager = PromoManager::new(state.pool.clone());
    match manager.create(new).await {
        Ok(row) => Ok((StatusCode::CREATED, Json(PromoCodeResponse::from(row)))),
        Err(StoreError::DuplicatePromoCode) => Err(message_response(
            StatusCode::CONFLICT,
            "A promo code with that code already exists",
        )),
        Err(err) => Err(internal_error(&err)),
    }
}

pub async fn update_promo_code(
    State(state): State<AppState>,
    Path(promo_id): Path<i32>,
    Json(request): Json<UpdatePromoCodeRequest>,
) -> Result<Json<PromoCodeResponse>, Response> {
    let mut errors = collect_errors(&request);
    if let Some(ty) = &request.discount_type {
        if ty.parse::<DiscountType>().is_err() {
            errors.push(FieldError {
                field: "discountType".to_string(),
                message: "discountType must be PERCENTAGE, FIXED_AMOUNT or FREE_SHIPPING"
                    .to_string(),
            });
        }
    }
    if let (Some(from), Some(until)) = (request.valid_from, request.valid_until) {
        if until <= from {
            errors.push(FieldError {
                field: "validUntil".to_string(),
                message: "validUntil must be after validFrom".to_string(),
            });
        }
    }
    if !errors.is_empty() {
        return Err(validation_response(errors));
    }

    let changes = PromoCodeChangeset {
        code: request.code,
        discount_type: request.discount_type,
        discount_value: to_optional_decimal(request.discount_value, "discountValue")?,
        min_order_amount: to_optional_decimal(request.min_order_amount, "minOrderAmount")?,
        max_discount_amount: to_optional_decimal(request.max_discount_amount, "maxDiscountAmount")?,
        usage_limit: request.usage_limit,
        per_user_limit: request.per_user_limit,
        valid_from: request.valid_from,
        valid_until: request.valid_until,
        is_active: request.is_active,
    };

    let manager = PromoManager::new(state.pool.clone());
    match manager.update(promo_id, changes).await {
        Ok(row) => Ok(Json(PromoCodeResponse::from(row))),
        Err(StoreError::PromoCodeNotFound(_)) => Err(message_response(
            StatusCode::NOT_FOUND,
            "Promo code not found",
        )),
        Err(StoreError::DuplicatePromoCode) => Err(message_response(
            StatusCode::CONFLICT,
            "A promo code with that code already exists",
        )),
        Err(err) => Err(internal_error(&err)),
    }
}

pub async fn record_promo_usage(
    State(state): State<AppState>,
    Path(promo_id): Path<i32>,
    Json(request): Json<RecordPromoUsageRequest>,
) -> Result<(StatusCode, Json<PromoCodeUsageResponse>), Response> {
    let errors = collect_errors(&request);
    if !errors.is_empty() {
        return Err(validation_response(errors));
    }
    let discount = to_decimal(request.discount_applied, "discountApplied")?;

    let manager = PromoManager::new(state.pool.clone());
    match manager
        .record_usage(promo_id, request.order_id, discount, request.user_id)
        .await
    {
        Ok(usage) => Ok((StatusCode::CREATED, Json(PromoCodeUsageResponse::from(usage)))),
        Err(StoreError::PromoCodeNotFound(_)) => Err(message_response(
            StatusCode::NOT_FOUND,
            "Promo code not found",
        )),
        Err(StoreError::Database(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::ForeignKeyViolation,
            _,
        ))) => Err(message_response(StatusCode::BAD_REQUEST, "Order not found")),
        Err(err) => Err(internal_error(&err)),
    }
}

pub async fn delete_promo_code(
    State(state): State<AppState>,
    Path(promo_id): Path<i32>,
) -> Result<StatusCode, Response> {
    let manager = PromoManager::new(state.pool.clone());
    match manager.delete(promo_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(StoreError::PromoCodeNotFound(_)) => Err(message_response(
            StatusCode::NOT_FOUND,
            "Promo code not found",
        )),
        Err(err) => Err(internal_error(&err)),
    }
}

pub async fn health_check() -> &'static str {
    "OK"
}

fn message_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { message: message.into() })).into_response()
}

fn validation_response(errors: Vec<FieldError>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ValidationErrorResponse { errors })).into_response()
}

fn internal_error(err: &StoreError) -> Response {
    error!("request failed: {}", err);
    message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

fn to_decimal(value: f64, field: &str) -> Result<BigDecimal, Response> {
    BigDecimal::from_f64(value).ok_or_else(|| {
        message_response(
            StatusCode::BAD_REQUEST,
            format!("{} must be a finite number", field),
        )
    })
}

fn to_optional_decimal(value: Option<f64>, field: &str) -> Result<Option<BigDecimal>, Response> {
    value.map(|v| to_decimal(v, field)).transpose()
}

fn collect_errors<T: Validate>(request: &T) -> Vec<FieldError> {
    let mut out = Vec::new();
    if let Err(errors) = request.validate() {
        flatten_errors("", &errors, &mut out);
    }
    out
}

fn flatten_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = format!("{}{}", prefix, camel_case(field));
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", path));
                    out.push(FieldError { field: path.clone(), message });
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                flatten_errors(&format!("{}.", path), nested, out);
            }
            ValidationErrorsKind::List(map) => {
                for (index, nested) in map {
                    flatten_errors(&format!("{}[{}].", path, index), nested, out);
                }
            }
        }
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_request(body: serde_json::Value) -> CreateOrderRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn well_formed_order_request_passes_validation() {
        let request = order_request(serde_json::json!({
            "customer": {
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "address": "12 Analytical Way"
            },
            "items": [{"productId": 1, "quantity": 2}],
            "total": 59.98
        }));
        assert!(collect_errors(&request).is_empty());
    }

    #[test]
    fn malformed_email_and_quantity_are_reported_per_field() {
        let request = order_request(serde_json::json!({
            "customer": {
                "name": "Ada Lovelace",
                "email": "not-an-email",
                "address": "12 Analytical Way"
            },
            "items": [{"productId": 1, "quantity": 0}],
            "total": 59.98
        }));
        let errors = collect_errors(&request);
        assert!(errors.iter().any(|e| e.field == "customer.email"));
        assert!(errors
            .iter()
            .any(|e| e.field == "items[0].quantity" && e.message == "quantity must be at least 1"));
    }

    #[test]
    fn negative_total_is_rejected() {
        let request = order_request(serde_json::json!({
            "customer": {
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "address": "12 Analytical Way"
            },
            "items": [{"productId": 1, "quantity": 1}],
            "total": -1.0
        }));
        let errors = collect_errors(&request);
        assert!(errors.iter().any(|e| e.field == "total"));
    }

    #[test]
    fn order_response_uses_camel_case_fields() {
        let now = Utc::now();
        let order = OrderRow {
            id: 7,
            customer_name: "Ada".to_string(),
            customer_email: "ada@example.com".to_string(),
            customer_phone: None,
            customer_address: "12 Analytical Way".to_string(),
            notes: None,
            total: "59.98".parse().unwrap(),
            status: "pending".to_string(),
            created_at: now,
            updated_at: now,
        };
        let item = OrderItemRow {
            id: 1,
            order_id: 7,
            product_id: 3,
            product_name: "Punch cards".to_string(),
            price: "29.99".parse().unwrap(),
            quantity: 2,
        };

        let json = serde_json::to_value(OrderResponse::from((order, vec![item]))).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["items"][0]["productId"], 3);
        assert_eq!(json["items"][0]["productName"], "Punch cards");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn snake_case_paths_render_as_camel_case() {
        assert_eq!(camel_case("product_id"), "productId");
        assert_eq!(camel_case("customer"), "customer");
        assert_eq!(camel_case("per_user_limit"), "perUserLimit");
    }
}
