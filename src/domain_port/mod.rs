// store

mod verification_store;

pub use verification_store::*;
