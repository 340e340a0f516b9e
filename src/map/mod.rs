//! Map URL generation.
//!
//! * [`MapProvider`] is the closed set of map services.
//! * [`generate`] turns a resolved `(start, end, provider)` triple into a
//!   ready-to-open, query-encoded navigation URL.
//!
//! No network calls happen here.  Provider defaulting (baidu) is applied by
//! the caller, never inside [`generate`].

pub mod link;
pub mod provider;

pub use link::{
    extract_city_name, generate, generate_for, AMAP_BASE_URL, BAIDU_BASE_URL, GOOGLE_BASE_URL,
};
pub use provider::{is_valid_map_provider, MapProvider};
