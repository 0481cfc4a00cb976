mod connection;
mod verification_store_redis;

pub use connection::*;
pub use verification_store_redis::*;
