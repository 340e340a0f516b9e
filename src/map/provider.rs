//! Map providers that can render a navigation link.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NavError;

/// The closed set of supported map services.
///
/// Parsing is case-sensitive: `"baidu"` is valid, `"BAIDU"` is not.  An
/// unknown name is always an error, never silently coerced to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapProvider {
    /// 百度地图, the default for domestic routes.
    Baidu,
    /// 高德地图.
    Amap,
    /// Google Maps, used for international routes.
    Google,
}

impl MapProvider {
    /// Every provider, in display order.
    pub const ALL: [MapProvider; 3] = [MapProvider::Baidu, MapProvider::Amap, MapProvider::Google];

    /// Configuration / request key of the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            MapProvider::Baidu => "baidu",
            MapProvider::Amap => "amap",
            MapProvider::Google => "google",
        }
    }

    /// Human-friendly product name.
    pub fn display_name(&self) -> &'static str {
        match self {
            MapProvider::Baidu => "百度地图",
            MapProvider::Amap => "高德地图",
            MapProvider::Google => "Google Maps",
        }
    }
}

impl Default for MapProvider {
    fn default() -> Self {
        MapProvider::Baidu
    }
}

impl fmt::Display for MapProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapProvider {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MapProvider::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| NavError::UnsupportedProvider(s.to_string()))
    }
}

/// Returns `true` when `name` parses as a [`MapProvider`].
pub fn is_valid_map_provider(name: &str) -> bool {
    name.parse::<MapProvider>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_providers() {
        assert_eq!("baidu".parse::<MapProvider>().unwrap(), MapProvider::Baidu);
        assert_eq!("amap".parse::<MapProvider>().unwrap(), MapProvider::Amap);
        assert_eq!("google".parse::<MapProvider>().unwrap(), MapProvider::Google);
    }

    #[test]
    fn unknown_provider_is_unsupported() {
        let err = "bing".parse::<MapProvider>().unwrap_err();
        assert!(matches!(err, NavError::UnsupportedProvider(ref p) if p == "bing"));
    }

    #[test]
    fn validity_is_case_sensitive() {
        assert!(is_valid_map_provider("baidu"));
        assert!(is_valid_map_provider("google"));
        assert!(!is_valid_map_provider("BAIDU"));
        assert!(!is_valid_map_provider(""));
        assert!(!is_valid_map_provider("bing"));
    }

    #[test]
    fn display_names() {
        assert_eq!(MapProvider::Baidu.display_name(), "百度地图");
        assert_eq!(MapProvider::Amap.display_name(), "高德地图");
        assert_eq!(MapProvider::Google.display_name(), "Google Maps");
    }

    #[test]
    fn default_is_baidu() {
        assert_eq!(MapProvider::default(), MapProvider::Baidu);
    }

    #[test]
    fn serde_uses_lowercase_keys() {
        let json = serde_json::to_string(&MapProvider::Amap).unwrap();
        assert_eq!(json, "\"amap\"");
    }
}
