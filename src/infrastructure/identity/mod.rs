pub mod middleware;
pub mod rate_limit;
pub mod request_id;

pub use middleware::{client_identity_middleware, ClientIdentity};
pub use rate_limit::{rate_limit_middleware, RateLimiter};
pub use request_id::request_id_middleware;
