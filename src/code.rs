//! Polar code parameters.
//!
//! This module contains the description of a polar code as seen by the
//! encoder and the decoders: the codeword size `n`, the message size `k`, and
//! the partition of the `n` bit positions into frozen and unfrozen positions.

use crate::sequence::{PolarSequence, PolarizationWeight};
use thiserror::Error;

/// Minimum supported codeword size.
pub const MIN_CODEWORD_SIZE: usize = 4;

/// Maximum supported codeword size.
pub const MAX_CODEWORD_SIZE: usize = 1024;

/// Polar code configuration error.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// The codeword size is outside the supported range.
    #[error("codeword size {0} is outside the range [4, 1024]")]
    CodewordSizeOutOfRange(usize),
    /// The codeword size is not a power of two.
    #[error("codeword size {0} is not a power of two")]
    CodewordSizeNotPowerOfTwo(usize),
    /// The message size is larger than the codeword size.
    #[error("message size {k} exceeds codeword size {n}")]
    MessageSizeTooLarge {
        /// Codeword size.
        n: usize,
        /// Message size.
        k: usize,
    },
    /// A partition position does not belong to the codeword.
    #[error("position {0} is outside the codeword")]
    PositionOutOfRange(usize),
    /// A partition position is listed more than once.
    #[error("position {0} is listed more than once")]
    DuplicatePosition(usize),
    /// The number of unfrozen positions does not match the message size.
    #[error("expected {expected} unfrozen positions, got {actual}")]
    UnfrozenCount {
        /// Message size.
        expected: usize,
        /// Number of unfrozen positions given.
        actual: usize,
    },
}

/// Polar code parameters.
///
/// Holds the codeword size `n`, the message size `k` and the number of
/// polarization stages `log2(n)`. The parameters can only be constructed
/// through [`CodeParameters::new`], which validates them.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CodeParameters {
    n: usize,
    k: usize,
    stages: usize,
}

impl CodeParameters {
    /// Creates and validates polar code parameters.
    ///
    /// The codeword size `n` must be a power of two between
    /// [`MIN_CODEWORD_SIZE`] and [`MAX_CODEWORD_SIZE`], and the message size `k`
    /// cannot exceed `n`.
    pub fn new(n: usize, k: usize) -> Result<CodeParameters, Error> {
        if !(MIN_CODEWORD_SIZE..=MAX_CODEWORD_SIZE).contains(&n) {
            return Err(Error::CodewordSizeOutOfRange(n));
        }
        if !n.is_power_of_two() {
            return Err(Error::CodewordSizeNotPowerOfTwo(n));
        }
        if k > n {
            return Err(Error::MessageSizeTooLarge { n, k });
        }
        Ok(CodeParameters {
            n,
            k,
            stages: n.trailing_zeros() as usize,
        })
    }

    /// Returns the codeword size.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Returns the message size.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the number of polarization stages, `log2(n)`.
    pub fn stages(&self) -> usize {
        self.stages
    }

    /// Returns the rate `k / n` of the code.
    pub fn rate(&self) -> f64 {
        self.k as f64 / self.n as f64
    }
}

/// Partition of the codeword positions into frozen and unfrozen positions.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Partition {
    frozen: Box<[bool]>,
    unfrozen: Box<[usize]>,
}

impl Partition {
    /// Creates a partition from the list of unfrozen positions.
    ///
    /// The positions can be given in any order, but each position in `0..n`
    /// must appear at most once and exactly `k` positions must be given. All
    /// the remaining positions are frozen.
    pub fn from_unfrozen<I>(params: &CodeParameters, unfrozen: I) -> Result<Partition, Error>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut frozen = vec![true; params.n()].into_boxed_slice();
        let mut count = 0;
        for position in unfrozen {
            let slot = frozen
                .get_mut(position)
                .ok_or(Error::PositionOutOfRange(position))?;
            if !*slot {
                return Err(Error::DuplicatePosition(position));
            }
            *slot = false;
            count += 1;
        }
        if count != params.k() {
            return Err(Error::UnfrozenCount {
                expected: params.k(),
                actual: count,
            });
        }
        let unfrozen = frozen
            .iter()
            .enumerate()
            .filter_map(|(j, &f)| if f { None } else { Some(j) })
            .collect();
        Ok(Partition { frozen, unfrozen })
    }

    /// Returns `true` if `position` is frozen.
    ///
    /// # Panics
    ///
    /// Panics if `position` is outside the codeword.
    pub fn is_frozen(&self, position: usize) -> bool {
        self.frozen[position]
    }

    /// Returns the unfrozen positions in ascending order.
    pub fn unfrozen(&self) -> &[usize] {
        &self.unfrozen
    }

    /// Returns an iterator over the frozen positions in ascending order.
    pub fn frozen(&self) -> impl Iterator<Item = usize> + '_ {
        self.frozen
            .iter()
            .enumerate()
            .filter_map(|(j, &f)| if f { Some(j) } else { None })
    }
}

/// Polar code.
///
/// A polar code is defined by its [`CodeParameters`] together with the
/// [`Partition`] of its positions. This is shared read-only by the encoder and
/// the decoders.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct PolarCode {
    params: CodeParameters,
    partition: Partition,
}

impl PolarCode {
    /// Creates a polar code using the default construction.
    ///
    /// The partition is obtained from the [`PolarizationWeight`] sequence.
    pub fn new(n: usize, k: usize) -> Result<PolarCode, Error> {
        PolarCode::with_sequence(n, k, &PolarizationWeight::new())
    }

    /// Creates a polar code using a given sequence to obtain the partition.
    pub fn with_sequence<S>(n: usize, k: usize, sequence: &S) -> Result<PolarCode, Error>
    where
        S: PolarSequence + ?Sized,
    {
        let params = CodeParameters::new(n, k)?;
        let partition = sequence.partition(&params);
        Ok(PolarCode { params, partition })
    }

    /// Creates a polar code with an explicit list of unfrozen positions.
    pub fn with_unfrozen<I>(n: usize, k: usize, unfrozen: I) -> Result<PolarCode, Error>
    where
        I: IntoIterator<Item = usize>,
    {
        let params = CodeParameters::new(n, k)?;
        let partition = Partition::from_unfrozen(&params, unfrozen)?;
        Ok(PolarCode { params, partition })
    }

    /// Returns the code parameters.
    pub fn params(&self) -> &CodeParameters {
        &self.params
    }

    /// Returns the position partition.
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Returns the codeword size.
    pub fn n(&self) -> usize {
        self.params.n()
    }

    /// Returns the message size.
    pub fn k(&self) -> usize {
        self.params.k()
    }

    /// Returns the number of polarization stages.
    pub fn stages(&self) -> usize {
        self.params.stages()
    }
}
