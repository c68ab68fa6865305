pub mod directions_api;
pub mod simulated_directions;

pub use directions_api::*;
pub use simulated_directions::*;
