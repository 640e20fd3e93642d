//! Shopify Admin API version.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Shopify Admin API version used in `/admin/api/{version}/...` paths.
///
/// Shopify releases new versions quarterly. Known versions have their own
/// variant; any other well-formed `YYYY-MM` string parses to `Custom`.
///
/// # Example
///
/// ```rust
/// use wholesale_sync::ApiVersion;
///
/// let version: ApiVersion = "2024-01".parse().unwrap();
/// assert_eq!(version, ApiVersion::V2024_01);
/// assert_eq!(version.to_string(), "2024-01");
///
/// let future: ApiVersion = "2027-04".parse().unwrap();
/// assert_eq!(future.to_string(), "2027-04");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum ApiVersion {
    /// API version 2024-01, the version the app was built against.
    #[default]
    V2024_01,
    /// API version 2024-10
    V2024_10,
    /// API version 2025-01
    V2025_01,
    /// API version 2025-10
    V2025_10,
    /// Unstable API version for development and testing.
    Unstable,
    /// Any other well-formed `YYYY-MM` version.
    Custom(String),
}

impl ApiVersion {
    /// Returns the `/admin/api/{version}` prefix for REST paths.
    #[must_use]
    pub fn admin_path(&self) -> String {
        format!("/admin/api/{self}")
    }

    fn is_well_formed(s: &str) -> bool {
        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return false;
        }
        let digits_ok = bytes[..4].iter().chain(&bytes[5..]).all(u8::is_ascii_digit);
        let month = &s[5..];
        digits_ok && matches!(month, "01" | "04" | "07" | "10")
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "2024-01" => Ok(Self::V2024_01),
            "2024-10" => Ok(Self::V2024_10),
            "2025-01" => Ok(Self::V2025_01),
            "2025-10" => Ok(Self::V2025_10),
            "unstable" => Ok(Self::Unstable),
            other if Self::is_well_formed(other) => Ok(Self::Custom(other.to_string())),
            other => Err(ConfigError::InvalidApiVersion {
                version: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::V2024_01 => "2024-01",
            Self::V2024_10 => "2024-10",
            Self::V2025_01 => "2025-01",
            Self::V2025_10 => "2025-10",
            Self::Unstable => "unstable",
            Self::Custom(v) => v,
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_version_parses_known_versions() {
        assert_eq!("2024-01".parse::<ApiVersion>().unwrap(), ApiVersion::V2024_01);
        assert_eq!("2025-10".parse::<ApiVersion>().unwrap(), ApiVersion::V2025_10);
        assert_eq!("unstable".parse::<ApiVersion>().unwrap(), ApiVersion::Unstable);
    }

    #[test]
    fn test_api_version_accepts_future_quarters() {
        let version: ApiVersion = "2026-07".parse().unwrap();
        assert_eq!(version, ApiVersion::Custom("2026-07".to_string()));
    }

    #[test]
    fn test_api_version_rejects_malformed() {
        assert!("2024-02".parse::<ApiVersion>().is_err());
        assert!("24-01".parse::<ApiVersion>().is_err());
        assert!("latest".parse::<ApiVersion>().is_err());
        assert!("".parse::<ApiVersion>().is_err());
    }

    #[test]
    fn test_admin_path() {
        assert_eq!(ApiVersion::V2024_01.admin_path(), "/admin/api/2024-01");
    }
}
