pub mod composer;
pub mod rate_limiter;
