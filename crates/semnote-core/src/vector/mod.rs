//! Vector storage port and distance helpers.

pub mod distance;
pub mod store;
