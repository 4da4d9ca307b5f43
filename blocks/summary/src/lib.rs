pub mod costs;
pub mod stats;
