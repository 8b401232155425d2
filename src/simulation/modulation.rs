//! Modulation and demodulation.
//!
//! This module implements BPSK modulation of bits to symbols and demodulation
//! of symbols to LLRs.

/// BPSK modulator.
///
/// Maps the bit 0 to the symbol +1.0 and the bit 1 to the symbol -1.0.
#[derive(Debug, Clone, Default)]
pub struct BpskModulator {}

impl BpskModulator {
    /// Creates a new BPSK modulator.
    pub fn new() -> BpskModulator {
        BpskModulator::default()
    }

    /// Modulates a sequence of bits into symbols.
    pub fn modulate(&self, bits: &[u8]) -> Vec<f64> {
        bits.iter().map(|&b| 1.0 - 2.0 * f64::from(b)).collect()
    }
}

/// BPSK demodulator.
///
/// Assumes the same mapping as the [BpskModulator], so that positive LLRs
/// favour the bit 0.
#[derive(Debug, Clone, Default)]
pub struct BpskDemodulator {
    scale: f64,
}

impl BpskDemodulator {
    /// Creates a new BPSK demodulator.
    ///
    /// The `noise_sigma` indicates the channel noise standard deviation. The
    /// channel noise is assumed to be a real Gaussian with mean zero and
    /// standard deviation `noise_sigma`.
    pub fn new(noise_sigma: f64) -> BpskDemodulator {
        BpskDemodulator {
            scale: 2.0 / (noise_sigma * noise_sigma),
        }
    }

    /// Returns the LLRs corresponding to a sequence of symbols.
    pub fn demodulate(&self, symbols: &[f64]) -> Vec<f64> {
        symbols.iter().map(|&x| self.scale * x).collect()
    }
}
