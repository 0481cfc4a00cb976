mod verification_store_memory;

pub use verification_store_memory::*;
