use serde::{Deserialize, Serialize};

/// Remaining bookable seats on a tour. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    available: i32,
}

impl Capacity {
    pub fn new(available: i32) -> Result<Self, CapacityError> {
        if available < 0 {
            return Err(CapacityError::Negative(available));
        }
        Ok(Self { available })
    }

    pub fn available(&self) -> i32 {
        self.available
    }

    /// Return seats freed by a cancelled reservation.
    pub fn release(&mut self, seats: i32) -> Result<(), CapacityError> {
        if seats <= 0 {
            return Err(CapacityError::InvalidSeatCount(seats));
        }

        self.available = self
            .available
            .checked_add(seats)
            .ok_or(CapacityError::Overflow)?;

        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CapacityError {
    #[error("Capacity cannot be negative: {0}")]
    Negative(i32),

    #[error("Seat count must be positive, got {0}")]
    InvalidSeatCount(i32),

    #[error("Capacity overflow")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_restores_seats() {
        let mut capacity = Capacity::new(5).unwrap();
        capacity.release(2).unwrap();
        assert_eq!(capacity.available(), 7);
    }

    #[test]
    fn test_negative_capacity_rejected() {
        assert_eq!(Capacity::new(-1), Err(CapacityError::Negative(-1)));
    }

    #[test]
    fn test_release_rejects_non_positive_counts() {
        let mut capacity = Capacity::new(3).unwrap();
        assert!(capacity.release(0).is_err());
        assert!(capacity.release(-4).is_err());
        assert_eq!(capacity.available(), 3);
    }

    #[test]
    fn test_release_overflow() {
        let mut capacity = Capacity::new(i32::MAX).unwrap();
        assert_eq!(capacity.release(1), Err(CapacityError::Overflow));
    }
}
