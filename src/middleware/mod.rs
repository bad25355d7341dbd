pub mod origin;
pub mod rate_limit;

pub use origin::{OriginPolicy, origin_guard};
pub use rate_limit::{Decision, RateLimiter, rate_limit_middleware};
