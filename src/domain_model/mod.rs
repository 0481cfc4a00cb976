mod verification;

pub use verification::*;
