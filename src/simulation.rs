//! Simulation.
//!
//! This module contains utilities to simulate the BLER of polar codes in an
//! AWGN channel with BPSK modulation.

use crate::{decoder, encoder};
use thiserror::Error;

pub mod bler;
pub mod channel;
pub mod modulation;

/// Simulation error.
#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum Error {
    /// The channel noise standard deviation is negative or not finite.
    #[error("invalid noise standard deviation {0}")]
    NoiseSigma(f64),
    /// The encoder failed.
    #[error("encoder error: {0}")]
    Encoder(#[from] encoder::Error),
    /// The decoder failed.
    #[error("decoder error: {0}")]
    Decoder(#[from] decoder::Error),
}
