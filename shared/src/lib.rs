use bigdecimal::rounding::RoundingMode;
use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unknown order status: {0}")]
    UnknownStatus(String),
    #[error("unknown discount type: {0}")]
    UnknownDiscountType(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Fulfilled,
    Cancelled,
}

impl OrderStatus {
    // pending is the only non-terminal state
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Fulfilled)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Fulfilled => "fulfilled",
            OrderStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for OrderStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "fulfilled" => Ok(OrderStatus::Fulfilled),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(ParseError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    Percentage,
    FixedAmount,
    FreeShipping,
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiscountType::Percentage => "PERCENTAGE",
            DiscountType::FixedAmount => "FIXED_AMOUNT",
            DiscountType::FreeShipping => "FREE_SHIPPING",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for DiscountType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PERCENTAGE" => Ok(DiscountType::Percentage),
            "FIXED_AMOUNT" => Ok(DiscountType::FixedAmount),
            "FREE_SHIPPING" => Ok(DiscountType::FreeShipping),
            other => Err(ParseError::UnknownDiscountType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PromoDecision {
    Eligible { discount: BigDecimal },
    Ineligible { reason: String },
}

impl PromoDecision {
    pub fn ineligible(reason: impl Into<String>) -> Self {
        PromoDecision::Ineligible { reason: reason.into() }
    }
}

/// Discount owed for a cart total, rounded to cents (half-up).
///
/// A percentage discount is capped at `max_discount` when one is set; a
/// fixed discount never exceeds the cart total; free shipping only gates
/// eligibility and reports no amount.
pub fn compute_discount(
    discount_type: DiscountType,
    value: &BigDecimal,
    cart_total: &BigDecimal,
    max_discount: Option<&BigDecimal>,
) -> BigDecimal {
    let raw = match discount_type {
        DiscountType::Percentage => {
            let mut discount = (cart_total * value) / BigDecimal::from(100);
            if let Some(cap) = max_discount {
                if &discount > cap {
                    discount = cap.clone();
                }
            }
            discount
        }
        DiscountType::FixedAmount => {
            if value > cart_total {
                cart_total.clone()
            } else {
                value.clone()
            }
        }
        DiscountType::FreeShipping => BigDecimal::zero(),
    };
    raw.with_scale_round(2, RoundingMode::HalfUp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    #[test]
    fn percentage_discount() {
        let discount =
            compute_discount(DiscountType::Percentage, &dec("10"), &dec("200.00"), None);
        assert_eq!(discount, dec("20.00"));
    }

    #[test]
    fn percentage_discount_capped() {
        let discount = compute_discount(
            DiscountType::Percentage,
            &dec("50"),
            &dec("200.00"),
            Some(&dec("30.00")),
        );
        assert_eq!(discount, dec("30.00"));
    }

    #[test]
    fn fixed_discount_capped_at_cart_total() {
        let discount =
            compute_discount(DiscountType::FixedAmount, &dec("75.00"), &dec("50.00"), None);
        assert_eq!(discount, dec("50.00"));
    }

    #[test]
    fn fixed_discount_below_cart_total() {
        let discount =
            compute_discount(DiscountType::FixedAmount, &dec("5.00"), &dec("50.00"), None);
        assert_eq!(discount, dec("5.00"));
    }

    #[test]
    fn free_shipping_reports_zero() {
        let discount =
            compute_discount(DiscountType::FreeShipping, &dec("0"), &dec("120.00"), None);
        assert_eq!(discount, dec("0.00"));
    }

    #[test]
    fn discount_rounds_half_up_on_the_cent() {
        // 12.5% of 1.00 = 0.125
        let discount =
            compute_discount(DiscountType::Percentage, &dec("12.5"), &dec("1.00"), None);
        assert_eq!(discount, dec("0.13"));
    }

    #[test]
    fn pending_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Fulfilled));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn terminal_states_admit_no_transition() {
        assert!(!OrderStatus::Fulfilled.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Fulfilled.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Fulfilled));
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [OrderStatus::Pending, OrderStatus::Fulfilled, OrderStatus::Cancelled] {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn discount_type_round_trips_through_strings() {
        for ty in [
            DiscountType::Percentage,
            DiscountType::FixedAmount,
            DiscountType::FreeShipping,
        ] {
            assert_eq!(ty.to_string().parse::<DiscountType>().unwrap(), ty);
        }
        assert!("BOGO".parse::<DiscountType>().is_err());
    }
}
