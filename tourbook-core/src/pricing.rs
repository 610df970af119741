use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

use tourbook_catalog::pricing::validate_amount;
use tourbook_catalog::{apply_price_action, PriceAction};

use crate::repository::TourRepository;
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceUpdate {
    pub id: Uuid,
    pub old_price: f64,
    pub new_price: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceFailure {
    pub id: Uuid,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct BulkPriceReport {
    pub updated: Vec<PriceUpdate>,
    pub failed: Vec<PriceFailure>,
}

impl BulkPriceReport {
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Adjust the price of every selected tour. Each tour is updated on its own;
/// a failure on one tour is reported and does not undo the others.
pub async fn bulk_adjust_prices(
    tours: &dyn TourRepository,
    tour_ids: &[Uuid],
    action: PriceAction,
    amount: f64,
) -> CoreResult<BulkPriceReport> {
    if tour_ids.is_empty() {
        return Err(CoreError::InvalidInput("At least one tour id is required".to_string()));
    }
    let amount = validate_amount(amount)?;

    let mut seen = HashSet::new();
    let ids: Vec<Uuid> = tour_ids.iter().copied().filter(|id| seen.insert(*id)).collect();

    let current = tours.current_prices(&ids).await?;

    let updates = ids.iter().map(|id| {
        let old_price = current.get(id).copied();
        async move {
            let Some(old_price) = old_price else {
                return Err(PriceFailure { id: *id, error: "Tour not found".to_string() });
            };
            let new_price = apply_price_action(old_price, action, amount);
            match tours.update_price(*id, new_price).await {
                Ok(()) => Ok(PriceUpdate { id: *id, old_price, new_price }),
                Err(e) => {
                    tracing::error!("Price update failed for tour {}: {}", id, e);
                    let error = match e {
                        CoreError::NotFound(_) => "Tour not found".to_string(),
                        _ => "Update failed".to_string(),
                    };
                    Err(PriceFailure { id: *id, error })
                }
            }
        }
    });

    let mut report = BulkPriceReport::default();
    for result in join_all(updates).await {
        match result {
            Ok(update) => report.updated.push(update),
            Err(failure) => report.failed.push(failure),
        }
    }

    Ok(report)
}
