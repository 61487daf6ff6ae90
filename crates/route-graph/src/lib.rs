//! Route geometry, corridor station selection, and fuel-purchase optimization.

pub mod geo;
mod optimizer;
mod selection;

pub use geo::{haversine_miles, lon_lat_to_miles_xy};
pub use optimizer::optimize_fuel_plan;
pub use selection::select;
