//! OAuth scope handling.
//!
//! [`AuthScopes`] is used twice in the install flow: for the scopes the app
//! requests in the authorization URL, and for the scopes Shopify reports as
//! granted in the token exchange response.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A set of OAuth scopes.
///
/// Parsing trims and deduplicates entries and expands implied scopes: a
/// `write_foo` grant also carries `read_foo`, which is how Shopify reports
/// grants (`"write_products"` alone in a token response still means the app
/// can read products).
///
/// Serializes to a sorted, comma-separated string.
///
/// # Example
///
/// ```rust
/// use wholesale_sync::AuthScopes;
///
/// let granted: AuthScopes = "write_products, read_orders".parse().unwrap();
/// let required: AuthScopes = "read_products,read_orders".parse().unwrap();
/// assert!(granted.covers(&required));
/// assert_eq!(granted.to_string(), "read_orders,read_products,write_products");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AuthScopes {
    scopes: BTreeSet<String>,
}

impl AuthScopes {
    /// Creates an empty scope set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the scope set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns `true` if every scope in `other` is present here.
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        other.scopes.is_subset(&self.scopes)
    }

    /// Returns the scopes in `required` that this set lacks.
    #[must_use]
    pub fn missing<'a>(&'a self, required: &'a Self) -> Vec<&'a str> {
        required
            .scopes
            .difference(&self.scopes)
            .map(String::as_str)
            .collect()
    }

    /// Returns an iterator over the scopes in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    fn with_implied(mut scopes: BTreeSet<String>) -> Self {
        let implied: Vec<String> = scopes
            .iter()
            .filter_map(|scope| Self::implied_scope(scope))
            .collect();
        scopes.extend(implied);
        Self { scopes }
    }

    fn implied_scope(scope: &str) -> Option<String> {
        scope
            .strip_prefix("unauthenticated_write_")
            .map(|rest| format!("unauthenticated_read_{rest}"))
            .or_else(|| {
                scope
                    .strip_prefix("write_")
                    .map(|rest| format!("read_{rest}"))
            })
    }
}

impl FromStr for AuthScopes {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scopes = BTreeSet::new();

        for scope in s.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !scope.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ConfigError::InvalidScopes {
                    reason: format!("Invalid characters in scope: '{scope}'"),
                });
            }
            scopes.insert(scope.to_string());
        }

        Ok(Self::with_implied(scopes))
    }
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        f.write_str(&joined.join(","))
    }
}

impl Serialize for AuthScopes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AuthScopes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_comma_separated_with_whitespace() {
        let scopes: AuthScopes = " read_orders , ,read_inventory".parse().unwrap();
        assert_eq!(scopes.to_string(), "read_inventory,read_orders");
    }

    #[test]
    fn test_write_implies_read() {
        let scopes: AuthScopes = "write_inventory".parse().unwrap();
        assert!(scopes.iter().any(|s| s == "read_inventory"));

        let scopes: AuthScopes = "unauthenticated_write_checkouts".parse().unwrap();
        assert!(scopes.iter().any(|s| s == "unauthenticated_read_checkouts"));
    }

    #[test]
    fn test_rejects_invalid_characters() {
        let result = "read_products,write products".parse::<AuthScopes>();
        assert!(matches!(result, Err(ConfigError::InvalidScopes { .. })));
    }

    #[test]
    fn test_missing_reports_ungranted_scopes() {
        let granted: AuthScopes = "write_products".parse().unwrap();
        let required: AuthScopes = "read_products,read_orders".parse().unwrap();

        assert!(!granted.covers(&required));
        assert_eq!(granted.missing(&required), vec!["read_orders"]);
    }

    #[test]
    fn test_serde_uses_comma_separated_string() {
        let scopes: AuthScopes = "write_orders".parse().unwrap();
        let json = serde_json::to_string(&scopes).unwrap();
        assert_eq!(json, r#""read_orders,write_orders""#);

        let back: AuthScopes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scopes);
    }
}
