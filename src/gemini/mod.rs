pub mod client;
pub mod core;
pub mod rate_limit;
pub mod testing;

pub use client::*;
pub use self::core::*;
pub use rate_limit::RateLimiter;
