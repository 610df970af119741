use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wrapper for personal data (emails, names) that keeps the raw value out of
/// `Debug` and `Display` output. Serialization still emits the real value, so
/// API responses are unaffected.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct Masked<T>(pub T);

impl<T: fmt::Display> Masked<T> {
    fn redacted(&self) -> String {
        let raw = self.0.to_string();
        match raw.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
                let first: String = local.chars().take(1).collect();
                format!("{}***@{}", first, domain)
            }
            _ => "********".to_string(),
        }
    }
}

impl<T: fmt::Display> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

impl<T: fmt::Display> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_partially_redacted() {
        let email = Masked("jane.doe@example.com".to_string());
        assert_eq!(format!("{}", email), "j***@example.com");
        assert_eq!(format!("{:?}", email), "j***@example.com");
    }

    #[test]
    fn test_non_email_is_fully_redacted() {
        let name = Masked("Jane Doe".to_string());
        assert_eq!(name.to_string(), "********");
    }

    #[test]
    fn test_serialization_keeps_real_value() {
        let email = Masked("jane@example.com".to_string());
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"jane@example.com\"");
    }
}
