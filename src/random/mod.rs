//! Seeded randomness for the simulators.
//!
//! Every simulation call derives a string key from its inputs, hashes it to a
//! 32-bit seed and owns a fresh [`Mulberry32`] generator. Nothing here keeps
//! global state, so identical keys always replay identical draws.

mod distributions;
mod mulberry;
mod seed;

pub use distributions::{
    gamma, gaussian, log_normal, negative_binomial, poisson, uniform, uniform_index,
};
pub use mulberry::Mulberry32;
pub use seed::hash_key;

/// Creates the generator owned by one simulation call.
pub fn rng_from_key(key: &str) -> Mulberry32 {
    Mulberry32::new(hash_key(key))
}
