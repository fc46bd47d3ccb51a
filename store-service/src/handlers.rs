use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel_async::{pooled_connection::bb8::Pool, AsyncConnection, AsyncPgConnection, RunQueryDsl};
use shared::{compute_discount, OrderStatus, PromoDecision};
use tracing::{error, info};

use crate::error::StoreError;
use crate::models::*;
use crate::schema::*;

pub type DbPool = Pool<AsyncPgConnection>;

#[derive(Debug, Clone)]
pub struct OrderLine {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct PromoApplication {
    pub code: String,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub customer_address: String,
    pub notes: Option<String>,
    pub items: Vec<OrderLine>,
    pub total: BigDecimal,
    pub promo: Option<PromoApplication>,
}

// Locks are always taken in ascending product id order so that two carts
// sharing products cannot deadlock each other.
fn sort_for_locking(lines: &mut [OrderLine]) {
    lines.sort_by_key(|line| line.product_id);
}

pub struct OrderManager {
    pool: DbPool,
}

impl OrderManager {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn place_order(
        &self,
        draft: OrderDraft,
    ) -> Result<(OrderRow, Vec<OrderItemRow>), StoreError> {
        let mut conn = self.pool.get().await?;

        let mut lines = draft.items;
        sort_for_locking(&mut lines);

        let new_order = NewOrderRow {
            customer_name: draft.customer_name,
            customer_email: draft.customer_email,
            customer_phone: draft.customer_phone,
            customer_address: draft.customer_address,
            notes: draft.notes,
            total: draft.total.clone(),
            status: OrderStatus::Pending.to_string(),
        };
        let total = draft.total;
        let promo = draft.promo;

        let result = conn
            .transaction::<_, StoreError, _>(|conn| {
                Box::pin(async move {
                    let header: OrderRow = diesel::insert_into(orders::table)
                        .values(&new_order)
                        .get_result(conn)
                        .await?;

                    let mut items = Vec::with_capacity(lines.len());
                    for line in &lines {
                        let product: ProductRow = products::table
                            .find(line.product_id)
                            .for_update()
                            .first(conn)
                            .await
                            .optional()?
                            .ok_or(StoreError::ProductNotFound(line.product_id))?;

                        if product.inventory < line.quantity {
                            return Err(StoreError::InsufficientInventory {
                                product_id: product.id,
                                requested: line.quantity,
                                available: product.inventory,
                            });
                        }

                        let item: OrderItemRow = diesel::insert_into(order_items::table)
                            .values(&NewOrderItemRow {
                                order_id: header.id,
                                product_id: product.id,
                                product_name: product.name.clone(),
                                price: product.price.clone(),
                                quantity: line.quantity,
                            })
                            .get_result(conn)
                            .await?;

                        diesel::update(products::table.find(product.id))
                            .set(products::inventory.eq(products::inventory - line.quantity))
                            .execute(conn)
                            .await?;

                        items.push(item);
                    }

                    if let Some(promo) = &promo {
                        redeem_promo(conn, &promo.code, &total, promo.user_id.as_deref(), header.id)
                            .await?;
                    }

                    Ok((header, items))
                })
            })
            .await;

        match &result {
            Ok((order, items)) => info!("order {} created with {} items", order.id, items.len()),
            Err(e) => error!("order transaction rolled back: {}", e),
        }
        result
    }

    pub async fn list_orders(
        &self,
        customer_email: Option<&str>,
    ) -> Result<Vec<(OrderRow, Vec<OrderItemRow>)>, StoreError> {
        let mut conn = self.pool.get().await?;

        let mut query = orders::table
            .order((orders::created_at.desc(), orders::id.desc()))
            .into_boxed();
        if let Some(email) = customer_email {
            query = query.filter(orders::customer_email.eq(email.to_owned()));
        }

        let order_rows: Vec<OrderRow> = query.load(&mut conn).await?;
        let items: Vec<OrderItemRow> = OrderItemRow::belonging_to(&order_rows)
            .load(&mut conn)
            .await?;
        let grouped = items.grouped_by(&order_rows);

        Ok(order_rows.into_iter().zip(grouped).collect())
    }

    pub async fn update_status(
        &self,
        order_id: i32,
        next: OrderStatus,
    ) -> Result<(OrderRow, Vec<OrderItemRow>), StoreError> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, StoreError, _>(|conn| {
            Box::pin(async move {
                let order: OrderRow = orders::table
                    .find(order_id)
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or(StoreError::OrderNotFound(order_id))?;

                let current = order.status()?;
                if !current.can_transition_to(next) {
                    return Err(StoreError::InvalidStatusTransition { from: current, to: next });
                }

                let updated: OrderRow = diesel::update(orders::table.find(order_id))
                    .set((
                        orders::status.eq(next.to_string()),
                        orders::updated_at.eq(diesel::dsl::now),
                    ))
                    .get_result(conn)
                    .await?;
                let items: Vec<OrderItemRow> =
                    OrderItemRow::belonging_to(&updated).load(conn).await?;

                info!("order {} moved from {} to {}", order_id, current, next);
                Ok((updated, items))
            })
        })
        .await
    }
}

#[derive(Debug)]
pub enum PromoValidation {
    Eligible {
        promo: PromoCodeRow,
        discount: BigDecimal,
    },
    Ineligible {
        reason: String,
    },
}

pub struct PromoManager {
    pool: DbPool,
}

impl PromoManager {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Read-only eligibility check; redemption is a separate write.
    pub async fn validate(
        &self,
        code: &str,
        cart_total: &BigDecimal,
        user_id: Option<&str>,
    ) -> Result<PromoValidation, StoreError> {
        let mut conn = self.pool.get().await?;

        let promo: Option<PromoCodeRow> = promo_codes::table
            .filter(promo_codes::code.eq(normalize_code(code)))
            .first(&mut conn)
            .await
            .optional()?;
        let Some(promo) = promo else {
            return Ok(PromoValidation::Ineligible { reason: "Invalid promo code".to_string() });
        };

        let user_redemptions = count_user_redemptions(&mut conn, &promo, user_id).await?;
        match evaluate_promo(&promo, cart_total, user_redemptions, Utc::now())? {
            PromoDecision::Eligible { discount } => Ok(PromoValidation::Eligible { promo, discount }),
            PromoDecision::Ineligible { reason } => Ok(PromoValidation::Ineligible { reason }),
        }
    }

    pub async fn record_usage(
        &self,
        promo_id: i32,
        order_id: i32,
        discount_applied: BigDecimal,
        user_id: Option<String>,
    ) -> Result<PromoCodeUsageRow, StoreError> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, StoreError, _>(|conn| {
            Box::pin(async move {
                let promo: PromoCodeRow = promo_codes::table
                    .find(promo_id)
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or(StoreError::PromoCodeNotFound(promo_id))?;

                record_usage_in(conn, &promo, order_id, &discount_applied, user_id.as_deref())
                    .await
            })
        })
        .await
    }

    pub async fn list(&self) -> Result<Vec<PromoCodeRow>, StoreError> {
        let mut conn = self.pool.get().await?;
        let rows = promo_codes::table
            .order((promo_codes::created_at.desc(), promo_codes::id.desc()))
            .load(&mut conn)
            .await?;
        Ok(rows)
    }

    pub async fn create(&self, mut new: NewPromoCodeRow) -> Result<PromoCodeRow, StoreError> {
        let mut conn = self.pool.get().await?;
        new.code = normalize_code(&new.code);

        match diesel::insert_into(promo_codes::table)
            .values(&new)
            .get_result(&mut conn)
            .await
        {
            Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(StoreError::DuplicatePromoCode)
            }
            other => other.map_err(Into::into),
        }
    }

    pub async fn update(
        &self,
        promo_id: i32,
        mut changes: PromoCodeChangeset,
    ) -> Result<PromoCodeRow, StoreError> {
        let mut conn = self.pool.get().await?;
        changes.code = changes.code.map(|code| normalize_code(&code));

        match diesel::update(promo_codes::table.find(promo_id))
            .set((&changes, promo_codes::updated_at.eq(diesel::dsl::now)))
            .get_result(&mut conn)
            .await
        {
            Err(diesel::result::Error::NotFound) => Err(StoreError::PromoCodeNotFound(promo_id)),
            Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(StoreError::DuplicatePromoCode)
            }
            other => other.map_err(Into::into),
        }
    }

    pub async fn delete(&self, promo_id: i32) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        let affected = diesel::delete(promo_codes::table.find(promo_id))
            .execute(&mut conn)
            .await?;
        if affected == 0 {
            return Err(StoreError::PromoCodeNotFound(promo_id));
        }
        Ok(())
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

async fn count_user_redemptions(
    conn: &mut AsyncPgConnection,
    promo: &PromoCodeRow,
    user_id: Option<&str>,
) -> Result<Option<i64>, StoreError> {
    match (user_id, promo.per_user_limit) {
        (Some(uid), Some(_)) => {
            let count = promo_code_usages::table
                .filter(promo_code_usages::promo_code_id.eq(promo.id))
                .filter(promo_code_usages::user_id.eq(uid.to_owned()))
                .count()
                .get_result::<i64>(conn)
                .await?;
            Ok(Some(count))
        }
        _ => Ok(None),
    }
}

/// Ordered eligibility gate, short-circuiting on the first failure.
fn evaluate_promo(
    promo: &PromoCodeRow,
    cart_total: &BigDecimal,
    user_redemptions: Option<i64>,
    now: DateTime<Utc>,
) -> Result<PromoDecision, shared::ParseError> {
    if !promo.is_active {
        return Ok(PromoDecision::ineligible("This promo code is no longer active"));
    }
    if now < promo.valid_from {
        return Ok(PromoDecision::ineligible("This promo code is not yet valid"));
    }
    if now > promo.valid_until {
        return Ok(PromoDecision::ineligible("This promo code has expired"));
    }
    if let Some(limit) = promo.usage_limit {
        if promo.usage_count >= limit {
            return Ok(PromoDecision::ineligible(
                "This promo code has reached its usage limit",
            ));
        }
    }
    if let (Some(limit), Some(count)) = (promo.per_user_limit, user_redemptions) {
        if count >= i64::from(limit) {
            return Ok(PromoDecision::ineligible(
                "You have reached the usage limit for this promo code",
            ));
        }
    }
    if let Some(min) = &promo.min_order_amount {
        if cart_total < min {
            return Ok(PromoDecision::ineligible(format!(
                "Minimum order amount of ${} required",
                min.with_scale(2)
            )));
        }
    }

    let discount = compute_discount(
        promo.discount_type()?,
        &promo.discount_value,
        cart_total,
        promo.max_discount_amount.as_ref(),
    );
    Ok(PromoDecision::Eligible { discount })
}

// Redemption on the caller's in-flight transaction. The promo row is locked
// so the usage counter cannot be read stale by a concurrent order.
async fn redeem_promo(
    conn: &mut AsyncPgConnection,
    code: &str,
    cart_total: &BigDecimal,
    user_id: Option<&str>,
    order_id: i32,
) -> Result<PromoCodeUsageRow, StoreError> {
    let promo: Option<PromoCodeRow> = promo_codes::table
        .filter(promo_codes::code.eq(normalize_code(code)))
        .for_update()
        .first(conn)
        .await
        .optional()?;
    let Some(promo) = promo else {
        return Err(StoreError::PromoIneligible("Invalid promo code".to_string()));
    };

    let user_redemptions = count_user_redemptions(conn, &promo, user_id).await?;
    match evaluate_promo(&promo, cart_total, user_redemptions, Utc::now())? {
        PromoDecision::Eligible { discount } => {
            record_usage_in(conn, &promo, order_id, &discount, user_id).await
        }
        PromoDecision::Ineligible { reason } => Err(StoreError::PromoIneligible(reason)),
    }
}

async fn record_usage_in(
    conn: &mut AsyncPgConnection,
    promo: &PromoCodeRow,
    order_id: i32,
    discount_applied: &BigDecimal,
    user_id: Option<&str>,
) -> Result<PromoCodeUsageRow, StoreError> {
    let usage: PromoCodeUsageRow = diesel::insert_into(promo_code_usages::table)
        .values(&NewPromoCodeUsageRow {
            promo_code_id: promo.id,
            order_id,
            user_id: user_id.map(str::to_owned),
            discount_applied: discount_applied.clone(),
        })
        .get_result(conn)
        .await?;

    diesel::update(promo_codes::table.find(promo.id))
        .set((
            promo_codes::usage_count.eq(promo_codes::usage_count + 1),
            promo_codes::updated_at.eq(diesel::dsl::now),
        ))
        .execute(conn)
        .await?;

    Ok(usage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    fn promo(now: DateTime<Utc>) -> PromoCodeRow {
        PromoCodeRow {
            id: 1,
            code: "SUMMER10".to_string(),
            discount_type: "PERCENTAGE".to_string(),
            discount_value: dec("10"),
            min_order_amount: None,
            max_discount_amount: None,
            usage_limit: None,
            per_user_limit: None,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            is_active: true,
            usage_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn reason(decision: PromoDecision) -> String {
        match decision {
            PromoDecision::Ineligible { reason } => reason,
            other => panic!("expected ineligible, got {:?}", other),
        }
    }

    #[test]
    fn eligible_percentage_discount() {
        let now = Utc::now();
        let decision = evaluate_promo(&promo(now), &dec("200.00"), None, now).unwrap();
        assert_eq!(decision, PromoDecision::Eligible { discount: dec("20.00") });
    }

    #[test]
    fn inactive_code_is_rejected() {
        let now = Utc::now();
        let mut promo = promo(now);
        promo.is_active = false;
        let decision = evaluate_promo(&promo, &dec("200.00"), None, now).unwrap();
        assert_eq!(reason(decision), "This promo code is no longer active");
    }

    #[test]
    fn code_before_window_is_rejected() {
        let now = Utc::now();
        let mut promo = promo(now);
        promo.valid_from = now + Duration::hours(1);
        let decision = evaluate_promo(&promo, &dec("200.00"), None, now).unwrap();
        assert_eq!(reason(decision), "This promo code is not yet valid");
    }

    #[test]
    fn expired_code_is_rejected() {
        let now = Utc::now();
        let mut promo = promo(now);
        promo.valid_until = now - Duration::hours(1);
        let decision = evaluate_promo(&promo, &dec("200.00"), None, now).unwrap();
        assert_eq!(reason(decision), "This promo code has expired");
    }

    #[test]
    fn exhausted_usage_limit_is_rejected() {
        let now = Utc::now();
        let mut promo = promo(now);
        promo.usage_limit = Some(5);
        promo.usage_count = 5;
        let decision = evaluate_promo(&promo, &dec("200.00"), None, now).unwrap();
        assert_eq!(reason(decision), "This promo code has reached its usage limit");
    }

    #[test]
    fn per_user_limit_is_enforced_for_known_users() {
        let now = Utc::now();
        let mut promo = promo(now);
        promo.per_user_limit = Some(1);
        let decision = evaluate_promo(&promo, &dec("200.00"), Some(1), now).unwrap();
        assert_eq!(
            reason(decision),
            "You have reached the usage limit for this promo code"
        );
    }

    #[test]
    fn per_user_limit_is_skipped_for_anonymous_carts() {
        let now = Utc::now();
        let mut promo = promo(now);
        promo.per_user_limit = Some(1);
        let decision = evaluate_promo(&promo, &dec("200.00"), None, now).unwrap();
        assert!(matches!(decision, PromoDecision::Eligible { .. }));
    }

    #[test]
    fn minimum_order_amount_is_enforced() {
        let now = Utc::now();
        let mut promo = promo(now);
        promo.min_order_amount = Some(dec("100.00"));
        let decision = evaluate_promo(&promo, &dec("99.99"), None, now).unwrap();
        assert_eq!(reason(decision), "Minimum order amount of $100.00 required");
    }

    #[test]
    fn checks_short_circuit_in_order() {
        // an inactive, expired, exhausted code reports inactivity first
        let now = Utc::now();
        let mut promo = promo(now);
        promo.is_active = false;
        promo.valid_until = now - Duration::hours(1);
        promo.usage_limit = Some(1);
        promo.usage_count = 1;
        let decision = evaluate_promo(&promo, &dec("200.00"), None, now).unwrap();
        assert_eq!(reason(decision), "This promo code is no longer active");
    }

    #[test]
    fn capped_percentage_discount_flows_through() {
        let now = Utc::now();
        let mut promo = promo(now);
        promo.discount_value = dec("50");
        promo.max_discount_amount = Some(dec("30.00"));
        let decision = evaluate_promo(&promo, &dec("200.00"), None, now).unwrap();
        assert_eq!(decision, PromoDecision::Eligible { discount: dec("30.00") });
    }

    #[test]
    fn fixed_discount_never_exceeds_cart_total() {
        let now = Utc::now();
        let mut promo = promo(now);
        promo.discount_type = "FIXED_AMOUNT".to_string();
        promo.discount_value = dec("75.00");
        let decision = evaluate_promo(&promo, &dec("50.00"), None, now).unwrap();
        assert_eq!(decision, PromoDecision::Eligible { discount: dec("50.00") });
    }

    #[test]
    fn free_shipping_gates_eligibility_only() {
        let now = Utc::now();
        let mut promo = promo(now);
        promo.discount_type = "FREE_SHIPPING".to_string();
        promo.discount_value = dec("0");
        let decision = evaluate_promo(&promo, &dec("80.00"), None, now).unwrap();
        assert_eq!(decision, PromoDecision::Eligible { discount: dec("0.00") });
    }

    #[test]
    fn corrupt_discount_type_is_an_error_not_a_decision() {
        let now = Utc::now();
        let mut promo = promo(now);
        promo.discount_type = "BOGO".to_string();
        assert!(evaluate_promo(&promo, &dec("80.00"), None, now).is_err());
    }

    #[test]
    fn lines_are_locked_in_ascending_product_order() {
        let mut lines = vec![
            OrderLine { product_id: 9, quantity: 1 },
            OrderLine { product_id: 2, quantity: 3 },
            OrderLine { product_id: 5, quantity: 2 },
        ];
        sort_for_locking(&mut lines);
        let ids: Vec<i32> = lines.iter().map(|line| line.product_id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }
}
