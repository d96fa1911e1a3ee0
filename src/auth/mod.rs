//! Authentication layer: credential checks, session tokens and the route guard.

pub mod credentials;
pub mod guard;
pub mod middleware;
pub mod password;
pub mod policy;
pub mod token;

pub use guard::{evaluate, route_guard, GuardOutcome};
pub use middleware::{check_rate_limit, AppState};
pub use policy::{landing_path, resolve_landing, RoutePolicy};
pub use token::{SessionClaims, TokenService};
