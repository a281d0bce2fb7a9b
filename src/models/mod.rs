pub mod identity;
pub mod role;

pub use identity::{Claims, Identity};
pub use role::Role;
