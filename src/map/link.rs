//! Navigation link generation.
//!
//! [`generate`] is a pure function: the same `(start, end, provider)` always
//! yields the same bytes.  Endpoint strings are query-encoded and otherwise
//! passed through untouched (no trimming, no geocoding).

use url::form_urlencoded;

use crate::error::{NavError, Result};
use crate::map::provider::MapProvider;

// ---------------------------------------------------------------------------
// URL templates
// ---------------------------------------------------------------------------

/// Baidu web direction endpoint.
pub const BAIDU_BASE_URL: &str = "http://api.map.baidu.com/direction";
/// Amap web route planner.
pub const AMAP_BASE_URL: &str = "https://www.amap.com/dir";
/// Google Maps directions (URLs API).
pub const GOOGLE_BASE_URL: &str = "https://www.google.com/maps/dir/";

/// Baidu requires a `src` tag of the form `webapp.<company>.<app>`.
const BAIDU_SOURCE_TAG: &str = "webapp.voicenav.navigator";
const TRAVEL_MODE: &str = "transit";
/// Region used by Baidu when no city can be read off the endpoints.
const NATIONWIDE: &str = "全国";

/// Cities recognised as a prefix of a place name when picking a Baidu region.
const KNOWN_CITIES: &[&str] = &[
    "北京", "上海", "天津", "重庆", "广州", "深圳", "杭州", "南京", "苏州", "武汉", "成都",
    "西安", "长沙", "郑州", "青岛", "厦门", "沈阳", "大连", "济南", "合肥", "福州", "昆明",
    "哈尔滨", "长春", "石家庄", "太原", "南昌", "南宁", "贵阳", "兰州", "海口", "宁波", "无锡",
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the navigation URL for `provider`.
///
/// # Errors
///
/// [`NavError::Validation`] when `start` or `end` is empty.
pub fn generate(start: &str, end: &str, provider: MapProvider) -> Result<String> {
    if start.is_empty() || end.is_empty() {
        return Err(NavError::Validation(
            "start and end must both be non-empty".into(),
        ));
    }

    let url = match provider {
        MapProvider::Baidu => {
            let region = region_for(start, end);
            with_query(
                BAIDU_BASE_URL,
                &[
                    ("destination", end),
                    ("mode", TRAVEL_MODE),
                    ("origin", start),
                    ("output", "html"),
                    ("region", region.as_str()),
                    ("src", BAIDU_SOURCE_TAG),
                ],
            )
        }
        MapProvider::Amap => with_query(AMAP_BASE_URL, &[("from", start), ("to", end)]),
        MapProvider::Google => with_query(
            GOOGLE_BASE_URL,
            &[
                ("api", "1"),
                ("destination", end),
                ("origin", start),
                ("travelmode", TRAVEL_MODE),
            ],
        ),
    };

    Ok(url)
}

/// Like [`generate`] but takes the provider by name.
///
/// # Errors
///
/// [`NavError::UnsupportedProvider`] for an unknown name, otherwise as
/// [`generate`].
pub fn generate_for(start: &str, end: &str, provider: &str) -> Result<String> {
    let provider: MapProvider = provider.parse()?;
    generate(start, end, provider)
}

/// Pick the city a place name belongs to, for Baidu's `region` parameter.
///
/// Known major cities are matched as a prefix (`"上海东方明珠"` → `"上海"`).
/// A name that is itself a city (`"...市"`) is kept whole; anything else maps
/// to the nationwide region.
pub fn extract_city_name(place: &str) -> String {
    if let Some(city) = KNOWN_CITIES.iter().find(|c| place.starts_with(**c)) {
        return (*city).to_string();
    }
    if place.ends_with('市') {
        return place.to_string();
    }
    NATIONWIDE.to_string()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn region_for(start: &str, end: &str) -> String {
    let from_start = extract_city_name(start);
    if from_start != NATIONWIDE {
        return from_start;
    }
    extract_city_name(end)
}

fn with_query(base: &str, params: &[(&str, &str)]) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish();
    format!("{base}?{query}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baidu_url_shape() {
        let url = generate("北京天安门", "上海东方明珠", MapProvider::Baidu).unwrap();
        assert!(url.starts_with("http://api.map.baidu.com/direction?"));
        for key in ["origin=", "destination=", "mode=transit", "output=html", "src=", "region="] {
            assert!(url.contains(key), "missing {key} in {url}");
        }
    }

    #[test]
    fn baidu_parameters_are_encoded_in_fixed_order() {
        let url = generate("A B", "C&D", MapProvider::Baidu).unwrap();
        assert_eq!(
            url,
            "http://api.map.baidu.com/direction?destination=C%26D&mode=transit&origin=A+B\
             &output=html&region=%E5%85%A8%E5%9B%BD&src=webapp.voicenav.navigator"
        );
    }

    #[test]
    fn amap_url_shape() {
        let url = generate("北京", "上海", MapProvider::Amap).unwrap();
        assert_eq!(
            url,
            "https://www.amap.com/dir?from=%E5%8C%97%E4%BA%AC&to=%E4%B8%8A%E6%B5%B7"
        );
    }

    #[test]
    fn google_url_shape() {
        let url = generate("南京", "东京", MapProvider::Google).unwrap();
        assert!(url.starts_with("https://www.google.com/maps/dir/?api=1&"));
        assert!(url.contains("origin="));
        assert!(url.contains("destination="));
        assert!(url.contains("travelmode=transit"));
    }

    #[test]
    fn empty_endpoint_is_validation_error_for_every_provider() {
        for provider in MapProvider::ALL {
            assert!(matches!(generate("", "上海", provider), Err(NavError::Validation(_))));
            assert!(matches!(generate("北京", "", provider), Err(NavError::Validation(_))));
        }
    }

    #[test]
    fn generation_is_deterministic() {
        for provider in MapProvider::ALL {
            let a = generate("长泰广场", "七牛云", provider).unwrap();
            let b = generate("长泰广场", "七牛云", provider).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn endpoints_are_not_trimmed() {
        let url = generate(" 北京", "上海", MapProvider::Amap).unwrap();
        assert!(url.contains("from=+%E5%8C%97%E4%BA%AC"));
    }

    #[test]
    fn generate_for_rejects_unknown_provider() {
        let err = generate_for("北京", "上海", "bing").unwrap_err();
        assert!(matches!(err, NavError::UnsupportedProvider(_)));
        assert!(generate_for("北京", "上海", "amap").is_ok());
    }

    #[test]
    fn city_extraction() {
        assert_eq!(extract_city_name("上海东方明珠"), "上海");
        assert_eq!(extract_city_name("北京天安门"), "北京");
        assert_eq!(extract_city_name("北京"), "北京");
        assert_eq!(extract_city_name("深圳南山区"), "深圳");
        assert_eq!(extract_city_name("小城市"), "小城市");
        assert_eq!(extract_city_name("某个不知名的地方"), "全国");
    }

    #[test]
    fn region_falls_back_to_destination_city() {
        let url = generate("当前位置", "杭州西湖", MapProvider::Baidu).unwrap();
        assert!(url.contains("region=%E6%9D%AD%E5%B7%9E"));
    }
}
