//! Bulk import requests.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors found by local validation of an [`ImportRequest`].
///
/// A request failing validation is never sent to the backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The number of products to import is zero.
    #[error("import count must be greater than zero")]
    InvalidCount,
    /// The search query is empty or whitespace.
    #[error("search query cannot be empty")]
    EmptyQuery,
}

/// Marketplace the backend imports products from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    AliExpress,
    Amazon,
    Custom,
}

impl Provider {
    /// Wire representation of the provider.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AliExpress => "aliexpress",
            Self::Amazon => "amazon",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aliexpress" => Ok(Self::AliExpress),
            "amazon" => Ok(Self::Amazon),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("invalid provider: {s}")),
        }
    }
}

/// A request to import `count` products matching `query` from `provider`.
///
/// Built from operator input and immutable once submitted. Fields are public
/// so that invalid input can still be represented and reported; call
/// [`ImportRequest::validate`] before sending it anywhere.
///
/// ## Examples
///
/// ```
/// use auraa_core::{ImportRequest, Provider, ValidationError};
///
/// let request = ImportRequest::new(500, "jewelry accessories", Provider::AliExpress);
/// assert!(request.validate().is_ok());
///
/// let empty = ImportRequest::new(10, "   ", Provider::Amazon);
/// assert_eq!(empty.validate(), Err(ValidationError::EmptyQuery));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRequest {
    /// Number of products to import.
    pub count: u32,
    /// Marketplace search query.
    pub query: String,
    /// Marketplace to import from.
    pub provider: Provider,
}

impl ImportRequest {
    /// Create a new import request.
    #[must_use]
    pub fn new(count: u32, query: impl Into<String>, provider: Provider) -> Self {
        Self {
            count,
            query: query.into(),
            provider,
        }
    }

    /// Check the request before it is submitted.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCount`] when `count` is zero and
    /// [`ValidationError::EmptyQuery`] when the query is blank. The count is
    /// checked first.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.count == 0 {
            return Err(ValidationError::InvalidCount);
        }

        if self.query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_valid_request() {
        let request = ImportRequest::new(1, "rings", Provider::Custom);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_count() {
        let request = ImportRequest::new(0, "rings", Provider::AliExpress);
        assert_eq!(request.validate(), Err(ValidationError::InvalidCount));
    }

    #[test]
    fn test_validate_blank_query() {
        for query in ["", " ", "\t\n"] {
            let request = ImportRequest::new(5, query, Provider::AliExpress);
            assert_eq!(request.validate(), Err(ValidationError::EmptyQuery));
        }
    }

    #[test]
    fn test_validate_reports_count_before_query() {
        let request = ImportRequest::new(0, "", Provider::AliExpress);
        assert_eq!(request.validate(), Err(ValidationError::InvalidCount));
    }

    #[test]
    fn test_wire_format() {
        let request = ImportRequest::new(500, "jewelry accessories", Provider::AliExpress);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "count": 500,
                "query": "jewelry accessories",
                "provider": "aliexpress"
            })
        );
    }

    #[test]
    fn test_provider_from_str_is_case_insensitive() {
        assert_eq!("AliExpress".parse::<Provider>().unwrap(), Provider::AliExpress);
        assert_eq!("AMAZON".parse::<Provider>().unwrap(), Provider::Amazon);
        assert!("ebay".parse::<Provider>().is_err());
    }
}
