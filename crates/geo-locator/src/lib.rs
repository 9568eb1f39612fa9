//! Location services for incident reports.
//!
//! Wraps the Google Maps web services (geocoding, reverse geocoding and
//! text place search) and provides a great-circle distance helper.
//! Lookups degrade instead of failing: a missing key, HTTP error or non-`OK`
//! status yields `None` or an empty list and logs a warning.

mod client;
mod config;
mod distance;
mod error;
mod types;

pub use client::GeoClient;
pub use config::GeoConfig;
pub use distance::{distance_meters, EARTH_RADIUS_METERS};
pub use error::GeoError;
pub use types::{LatLng, Place, SEARCH_RADIUS_METERS};
