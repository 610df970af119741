use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Adjustment applied to every tour selected in a bulk price update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceAction {
    Increase,
    Decrease,
    Set,
}

impl fmt::Display for PriceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PriceAction::Increase => "INCREASE",
            PriceAction::Decrease => "DECREASE",
            PriceAction::Set => "SET",
        };
        f.write_str(s)
    }
}

impl FromStr for PriceAction {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCREASE" => Ok(PriceAction::Increase),
            "DECREASE" => Ok(PriceAction::Decrease),
            "SET" => Ok(PriceAction::Set),
            other => Err(PricingError::UnknownAction(other.to_string())),
        }
    }
}

/// Amounts must be finite and strictly positive.
pub fn validate_amount(amount: f64) -> Result<f64, PricingError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(PricingError::InvalidAmount(amount));
    }
    Ok(amount)
}

/// Compute the new price for one tour. DECREASE floors at zero; SET stores
/// `amount` as given.
pub fn apply_price_action(current: f64, action: PriceAction, amount: f64) -> f64 {
    match action {
        PriceAction::Increase => current + amount,
        PriceAction::Decrease => (current - amount).max(0.0),
        PriceAction::Set => amount,
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PricingError {
    #[error("Unknown price action: {0}")]
    UnknownAction(String),

    #[error("Amount must be a positive number, got {0}")]
    InvalidAmount(f64),
}
