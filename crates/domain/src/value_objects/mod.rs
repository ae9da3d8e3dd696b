//! Domain Value Objects - Immutable domain concepts
//!
//! Value objects carry business meaning without identity.

pub mod rating_value;
pub mod role;

pub use rating_value::RatingValue;
pub use role::{effective_role, Role};
