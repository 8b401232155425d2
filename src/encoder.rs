//! Polar encoder.
//!
//! This module implements the encoder of a polar code. The message bits are
//! first placed at the unfrozen positions of an `n`-bit vector `u`, with zeros
//! at the frozen positions. The codeword is `x = u F^{⊗log2(n)}`, where `F` is
//! the 2x2 polar kernel `[[1, 0], [1, 1]]`. The transform is computed in place
//! with a butterfly whose pairing matches the decoders in [`crate::decoder`].

use crate::code::PolarCode;
use thiserror::Error;

/// Polar encoder error.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// The message length does not match the message size of the code.
    #[error("expected a message of {expected} bits, got {actual}")]
    MessageLength {
        /// Message size of the code.
        expected: usize,
        /// Length of the message given.
        actual: usize,
    },
    /// The message contains a value other than 0 or 1.
    #[error("message element {index} has invalid bit value {value}")]
    InvalidBit {
        /// Index of the element in the message.
        index: usize,
        /// Value of the element.
        value: u8,
    },
}

/// Polar encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoder {
    code: PolarCode,
}

impl Encoder {
    /// Creates the encoder of a polar code.
    pub fn new(code: PolarCode) -> Encoder {
        Encoder { code }
    }

    /// Returns the code used by the encoder.
    pub fn code(&self) -> &PolarCode {
        &self.code
    }

    /// Places the message bits at the unfrozen positions.
    ///
    /// The message bits are placed in the unfrozen positions in ascending
    /// order. The frozen positions are set to zero.
    pub fn bits_insertion(&self, message: &[u8]) -> Result<Vec<u8>, Error> {
        if message.len() != self.code.k() {
            return Err(Error::MessageLength {
                expected: self.code.k(),
                actual: message.len(),
            });
        }
        if let Some((index, &value)) = message.iter().enumerate().find(|(_, &b)| b > 1) {
            return Err(Error::InvalidBit { index, value });
        }
        let mut u = vec![0; self.code.n()];
        for (&position, &bit) in self.code.partition().unfrozen().iter().zip(message.iter()) {
            u[position] = bit;
        }
        Ok(u)
    }

    /// Encodes a message into a codeword.
    pub fn encode(&self, message: &[u8]) -> Result<Vec<u8>, Error> {
        let mut x = self.bits_insertion(message)?;
        polar_transform(&mut x);
        Ok(x)
    }
}

/// Applies the polar transform in place.
///
/// The length of `x` must be a power of two. The transform is an involution,
/// so it also computes the inverse transform.
pub fn polar_transform(x: &mut [u8]) {
    debug_assert!(x.len().is_power_of_two());
    let mut half = x.len() / 2;
    while half >= 1 {
        for block in x.chunks_exact_mut(2 * half) {
            let (upper, lower) = block.split_at_mut(half);
            for (a, &b) in upper.iter_mut().zip(lower.iter()) {
                *a ^= b;
            }
        }
        half /= 2;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bits_insertion() {
        let code = PolarCode::with_unfrozen(8, 3, [3, 5, 7]).unwrap();
        let encoder = Encoder::new(code);
        assert_eq!(
            encoder.bits_insertion(&[1, 0, 1]).unwrap(),
            vec![0, 0, 0, 1, 0, 0, 0, 1]
        );
    }

    #[test]
    fn encode_n4() {
        let code = PolarCode::with_unfrozen(4, 4, 0..4).unwrap();
        let encoder = Encoder::new(code);
        // x0 = u0 + u1 + u2 + u3, x1 = u1 + u3, x2 = u2 + u3, x3 = u3
        assert_eq!(encoder.encode(&[1, 0, 0, 0]).unwrap(), vec![1, 0, 0, 0]);
        assert_eq!(encoder.encode(&[0, 1, 0, 0]).unwrap(), vec![1, 1, 0, 0]);
        assert_eq!(encoder.encode(&[0, 0, 1, 0]).unwrap(), vec![1, 0, 1, 0]);
        assert_eq!(encoder.encode(&[0, 0, 0, 1]).unwrap(), vec![1, 1, 1, 1]);
        assert_eq!(encoder.encode(&[1, 1, 0, 1]).unwrap(), vec![1, 0, 1, 1]);
    }

    #[test]
    fn transform_is_involution() {
        let original: Vec<u8> = (0..64).map(|j| ((j * 37 + 11) % 7 % 2) as u8).collect();
        let mut x = original.clone();
        polar_transform(&mut x);
        assert_ne!(x, original);
        polar_transform(&mut x);
        assert_eq!(x, original);
    }

    #[test]
    fn wrong_message() {
        let encoder = Encoder::new(PolarCode::new(16, 8).unwrap());
        assert_eq!(
            encoder.encode(&[0; 7]),
            Err(Error::MessageLength {
                expected: 8,
                actual: 7
            })
        );
        assert_eq!(
            encoder.encode(&[0, 1, 0, 2, 0, 0, 0, 0]),
            Err(Error::InvalidBit { index: 3, value: 2 })
        );
    }
}
