//! Route protection driven by the session store.

pub mod decision;
pub mod policy;
pub mod route_guard;

pub use decision::{evaluate, GuardDecision};
pub use policy::RoutePolicy;
pub use route_guard::{GuardConfig, Rendered, RouteGuard, LOADING_MESSAGE};
