//! # Reproducible random numbers
//!
//! The simulations in this crate use the [`ChaCha8Rng`] RNG from the
//! [rand_chacha] crate. Besides being seedable, it supports independent
//! streams, which are used to give each simulated frame its own sequence of
//! random numbers regardless of the thread that simulates it.
//!
//! # Examples
//! ```
//! # use polar_toolbox::rand::*;
//! let mut a = Rng::seed_from_u64(42);
//! let mut b = Rng::seed_from_u64(42);
//! b.set_stream(1);
//! assert_eq!(a.next_u64(), 12578764544318200737);
//! assert_ne!(a.next_u64(), b.next_u64());
//! ```
use rand_chacha::ChaCha8Rng;
pub use rand_chacha::rand_core::SeedableRng;
pub use rand_core::RngCore;

/// The RNG used throughout this crate.
pub type Rng = ChaCha8Rng;
