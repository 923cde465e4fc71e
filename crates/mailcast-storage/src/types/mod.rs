//! Type definitions for mailcast storage.

mod addresses;
mod ids;
mod recipients;
mod users;

// Re-export all types from submodules
pub use addresses::*;
pub use ids::*;
pub use recipients::*;
pub use users::*;
