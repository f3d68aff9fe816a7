//! Outbound HTTP clients for third-party APIs.

pub mod geocoder;

pub use geocoder::{GeocodeResult, Geocoder};
