use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::capacity::{Capacity, CapacityError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

impl NewCategory {
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::MissingField("name"));
        }
        let slug_ok = !self.slug.is_empty()
            && self
                .slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !slug_ok {
            return Err(CatalogError::InvalidSlug(self.slug.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItineraryDay {
    pub day: i32,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TourImage {
    pub url: String,
    pub alt: Option<String>,
    pub position: i32,
}

/// A bookable tour with its ordered itinerary and gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tour {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub price: f64,
    pub available: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub category_id: Option<Uuid>,
    pub itinerary: Vec<ItineraryDay>,
    pub images: Vec<TourImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tour {
    pub fn from_draft(id: Uuid, draft: TourDraft) -> Self {
        let now = Utc::now();
        let mut tour = Self {
            id,
            title: String::new(),
            description: None,
            location: None,
            price: 0.0,
            available: 0,
            start_date: draft.start_date,
            end_date: draft.end_date,
            is_active: true,
            category_id: None,
            itinerary: Vec::new(),
            images: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        tour.apply_draft(draft);
        tour
    }

    /// Overwrite the editable fields. Itinerary and images are replaced.
    pub fn apply_draft(&mut self, draft: TourDraft) {
        let draft = draft.normalized();
        self.title = draft.title;
        self.description = draft.description;
        self.location = draft.location;
        self.price = draft.price;
        self.available = draft.available;
        self.start_date = draft.start_date;
        self.end_date = draft.end_date;
        self.is_active = draft.is_active.unwrap_or(self.is_active);
        self.category_id = draft.category_id;
        self.itinerary = draft.itinerary;
        self.images = draft.images;
        self.updated_at = Utc::now();
    }

    pub fn summary(&self) -> TourSummary {
        TourSummary {
            id: self.id,
            title: self.title.clone(),
            price: self.price,
            available: self.available,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// The slice of a tour embedded in reservation payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TourSummary {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub available: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Editable tour fields, as submitted by the back office.
#[derive(Debug, Clone, Deserialize)]
pub struct TourDraft {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub price: f64,
    pub available: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: Option<bool>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub itinerary: Vec<ItineraryDay>,
    #[serde(default)]
    pub images: Vec<TourImage>,
}

impl TourDraft {
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.title.trim().is_empty() {
            return Err(CatalogError::MissingField("title"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(CatalogError::InvalidPrice(self.price));
        }
        Capacity::new(self.available)?;
        if self.start_date > self.end_date {
            return Err(CatalogError::InvalidSchedule {
                start: self.start_date,
                end: self.end_date,
            });
        }

        let mut days: Vec<i32> = self.itinerary.iter().map(|d| d.day).collect();
        days.sort_unstable();
        if days.iter().any(|d| *d < 1) || days.windows(2).any(|w| w[0] == w[1]) {
            return Err(CatalogError::InvalidItinerary);
        }
        if self.images.iter().any(|img| img.url.trim().is_empty()) {
            return Err(CatalogError::MissingField("images.url"));
        }
        Ok(())
    }

    fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.itinerary.sort_by_key(|d| d.day);
        self.images.sort_by_key(|img| img.position);
        self
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CatalogError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Price must be a non-negative number, got {0}")]
    InvalidPrice(f64),

    #[error(transparent)]
    Capacity(#[from] CapacityError),

    #[error("Start date {start} is after end date {end}")]
    InvalidSchedule { start: NaiveDate, end: NaiveDate },

    #[error("Itinerary days must be unique and start at 1")]
    InvalidItinerary,

    #[error("Invalid slug: {0}")]
    InvalidSlug(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> TourDraft {
        TourDraft {
            title: "  Atlas Trek ".to_string(),
            description: None,
            location: Some("Morocco".to_string()),
            price: 1200.0,
            available: 12,
            start_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 5, 3).unwrap(),
            is_active: None,
            category_id: None,
            itinerary: vec![
                ItineraryDay { day: 2, title: "Summit".to_string(), description: None },
                ItineraryDay { day: 1, title: "Arrival".to_string(), description: None },
            ],
            images: vec![
                TourImage { url: "b.jpg".to_string(), alt: None, position: 1 },
                TourImage { url: "a.jpg".to_string(), alt: None, position: 0 },
            ],
        }
    }

    #[test]
    fn test_from_draft_orders_children() {
        let tour = Tour::from_draft(Uuid::new_v4(), draft());
        assert_eq!(tour.title, "Atlas Trek");
        assert_eq!(tour.itinerary[0].day, 1);
        assert_eq!(tour.images[0].url, "a.jpg");
        assert!(tour.is_active);
    }

    #[test]
    fn test_validation_failures() {
        let mut d = draft();
        d.available = -1;
        assert!(matches!(d.validate(), Err(CatalogError::Capacity(_))));

        let mut d = draft();
        d.end_date = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        assert!(matches!(d.validate(), Err(CatalogError::InvalidSchedule { .. })));

        let mut d = draft();
        d.itinerary.push(ItineraryDay { day: 1, title: "Again".to_string(), description: None });
        assert_eq!(d.validate(), Err(CatalogError::InvalidItinerary));

        assert!(draft().validate().is_ok());
    }

    #[test]
    fn test_category_slug() {
        let ok = NewCategory { name: "Hiking".to_string(), slug: "hiking-2".to_string(), description: None };
        assert!(ok.validate().is_ok());
        let bad = NewCategory { name: "Hiking".to_string(), slug: "Hiking Tours".to_string(), description: None };
        assert!(bad.validate().is_err());
    }
}
