//! Channel simulation.
//!
//! This module contains the simulation of an AWGN channel.

use super::Error;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// AWGN channel simulation.
///
/// This struct is used to add AWGN to real symbols.
#[derive(Debug, Clone)]
pub struct AwgnChannel {
    distr: Normal<f64>,
}

impl AwgnChannel {
    /// Creates a new AWGN channel.
    ///
    /// The channel noise follows a (real) normal distribution with mean zero
    /// and standard deviation sigma, which must be a non-negative finite
    /// number.
    pub fn new(noise_sigma: f64) -> Result<AwgnChannel, Error> {
        if !(noise_sigma.is_finite() && noise_sigma >= 0.0) {
            return Err(Error::NoiseSigma(noise_sigma));
        }
        Ok(AwgnChannel {
            distr: Normal::new(0.0, noise_sigma).map_err(|_| Error::NoiseSigma(noise_sigma))?,
        })
    }

    /// Adds noise to a sequence of symbols.
    ///
    /// The noise is added in-place to the slice `symbols`. An [Rng] is used as
    /// source of randomness.
    pub fn add_noise<R: Rng>(&self, rng: &mut R, symbols: &mut [f64]) {
        for x in symbols.iter_mut() {
            *x += self.distr.sample(rng);
        }
    }
}
