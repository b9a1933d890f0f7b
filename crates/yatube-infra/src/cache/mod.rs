//! Cache implementations - in-memory by default, Redis when configured.

mod memory;
#[cfg(feature = "redis")]
mod redis_cache;

pub use memory::InMemoryCache;
#[cfg(feature = "redis")]
pub use redis_cache::{RedisCache, RedisConfig};
