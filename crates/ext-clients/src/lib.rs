//! HTTP clients for the two upstream services the planner depends on: a geocoder and a
//! driving-route engine.

mod config;
mod geocoder;
mod router;

pub use config::{GeocoderConfig, RouterConfig};
pub use geocoder::GeocoderClient;
pub use router::RoutingClient;
