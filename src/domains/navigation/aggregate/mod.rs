pub mod route;
pub mod state;
pub mod tracker;
pub mod types;

pub use route::*;
pub use state::*;
pub use tracker::*;
pub use types::*;
