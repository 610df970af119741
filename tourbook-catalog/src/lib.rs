pub mod tour;
pub mod pricing;
pub mod capacity;

pub use tour::{CatalogError, Category, ItineraryDay, NewCategory, Tour, TourDraft, TourImage, TourSummary};
pub use pricing::{apply_price_action, PriceAction, PricingError};
pub use capacity::{Capacity, CapacityError};
