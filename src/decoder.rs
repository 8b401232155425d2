//! Polar successive cancellation decoders.
//!
//! This module provides two implementations of the successive cancellation
//! (SC) decoder for polar codes. Both propagate LLRs from the channel (stage
//! `n`) down to the decisions (stage 0) over a butterfly of `log2(n)` stages,
//! decide the positions in bit-reversed order, and propagate the decided bits
//! back up so that later bit-node combinations can use them. They only differ
//! in how they traverse the butterfly:
//!
//! - [`recursive::Decoder`] computes the LLRs with a memoized recursion.
//! - [`iterative::Decoder`] sweeps the butterfly stage by stage.
//!
//! The results of both decoders are identical bit for bit.
//!
//! The check nodes use the min-sum approximation
//! `sign(a) * sign(b) * min(|a|, |b|)`. Positive LLRs favour a zero bit.

use crate::code::{CodeParameters, Partition, PolarCode};
use ndarray::Array2;
use thiserror::Error;

pub mod factory;
pub mod iterative;
pub mod recursive;

/// Decoder error.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// The decoder cannot be constructed with the requested code.
    #[error("invalid decoder configuration: {0}")]
    Configuration(#[from] crate::code::Error),
    /// The number of LLRs given to the decoder is not the codeword size.
    #[error("expected {expected} LLRs, got {actual}")]
    Validation {
        /// Codeword size.
        expected: usize,
        /// Number of LLRs given.
        actual: usize,
    },
    /// A bit was used before it was decided.
    ///
    /// This indicates an error in the traversal order of the decoder.
    #[error("bit at position {position}, stage {stage} was used before being decided")]
    InvariantViolation {
        /// Position of the bit.
        position: usize,
        /// Stage of the bit.
        stage: usize,
    },
}

/// Generic polar decoder.
///
/// This trait is used to form polar decoder trait objects, abstracting over
/// the internal implementation of the decoder. Decoders only hold read-only
/// configuration, so a single decoder can be shared by several threads.
pub trait PolarDecoder: std::fmt::Debug + Send + Sync {
    /// Decodes a message.
    ///
    /// The parameter contains the LLRs for the received codeword, in natural
    /// order. The function returns the `k` message bits, which are the
    /// decisions at the unfrozen positions in ascending order.
    fn decode(&self, llrs: &[f64]) -> Result<Vec<u8>, Error>;

    /// Returns the code used by the decoder.
    fn code(&self) -> &PolarCode;
}

/// Polar decoder output.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct DecoderOutput {
    /// Decoded message.
    ///
    /// Contains the decisions at the unfrozen positions, in ascending order.
    pub message: Vec<u8>,
    /// Decisions.
    ///
    /// Contains the decisions at all the positions, including the frozen
    /// positions, which are always zero.
    pub decisions: Vec<u8>,
    /// Codeword.
    ///
    /// Contains the codeword obtained by re-encoding the decisions.
    pub codeword: Vec<u8>,
}

fn check_node(a: f64, b: f64) -> f64 {
    a.signum() * b.signum() * a.abs().min(b.abs())
}

fn bit_node(own: f64, paired: f64, paired_bit: u8) -> f64 {
    if paired_bit == 0 {
        own + paired
    } else {
        own - paired
    }
}

// NaN LLRs, which appear when infinite LLRs of opposite signs are added,
// decide 1.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
fn hard_decision(llr: f64) -> u8 {
    u8::from(!(llr >= 0.0))
}

fn validate(params: &CodeParameters, llrs: &[f64]) -> Result<(), Error> {
    if llrs.len() != params.n() {
        return Err(Error::Validation {
            expected: params.n(),
            actual: llrs.len(),
        });
    }
    Ok(())
}

// Position of a butterfly node relative to its block at a given stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Node {
    // Check node. Contains the position of the paired lower node.
    Check { lower: usize },
    // Bit node. Contains the position of the paired upper node.
    Bit { upper: usize },
}

impl Node {
    // At stage `stage < stages` the blocks have size 2^(stages - stage).
    fn at(position: usize, stage: usize, stages: usize) -> Node {
        let half = 1 << (stages - stage - 1);
        if position & half == 0 {
            Node::Check {
                lower: position + half,
            }
        } else {
            Node::Bit {
                upper: position - half,
            }
        }
    }

    fn paired(self) -> usize {
        match self {
            Node::Check { lower } => lower,
            Node::Bit { upper } => upper,
        }
    }
}

/// Decoding tables.
///
/// The tables are indexed by `[position, stage]`. Each cell is either unset or
/// holds a value. The LLRs at stage `n` hold the channel LLRs.
#[derive(Debug, Clone, PartialEq)]
struct Tables {
    stages: usize,
    llrs: Array2<Option<f64>>,
    bits: Array2<Option<u8>>,
    #[cfg(test)]
    evaluations: usize,
}

impl Tables {
    fn new(params: &CodeParameters, channel_llrs: &[f64]) -> Tables {
        let stages = params.stages();
        let mut llrs = Array2::from_elem((params.n(), stages + 1), None);
        for (cell, &llr) in llrs.column_mut(stages).iter_mut().zip(channel_llrs.iter()) {
            *cell = Some(llr);
        }
        Tables {
            stages,
            llrs,
            bits: Array2::from_elem((params.n(), stages + 1), None),
            #[cfg(test)]
            evaluations: 0,
        }
    }

    fn llr(&self, position: usize, stage: usize) -> Option<f64> {
        self.llrs[[position, stage]]
    }

    fn bit(&self, position: usize, stage: usize) -> Result<u8, Error> {
        self.bits[[position, stage]].ok_or(Error::InvariantViolation { position, stage })
    }

    fn set_bit(&mut self, position: usize, stage: usize, bit: u8) {
        debug_assert!(self.bits[[position, stage]].is_none());
        self.bits[[position, stage]] = Some(bit);
    }

    // Computes the LLR of a node at a stage below `stages` from the LLRs at the
    // next stage, which must have been computed already.
    fn combine(&mut self, position: usize, stage: usize) -> Result<f64, Error> {
        debug_assert!(self.llrs[[position, stage]].is_none());
        let child = |p: usize| {
            self.llr(p, stage + 1)
                .ok_or(Error::InvariantViolation { position: p, stage: stage + 1 })
        };
        let llr = match Node::at(position, stage, self.stages) {
            Node::Check { lower } => check_node(child(position)?, child(lower)?),
            Node::Bit { upper } => bit_node(child(position)?, child(upper)?, self.bit(upper, stage)?),
        };
        self.llrs[[position, stage]] = Some(llr);
        #[cfg(test)]
        {
            self.evaluations += 1;
        }
        Ok(llr)
    }

    fn decide(&mut self, position: usize, partition: &Partition) -> Result<(), Error> {
        let llr = self.llr(position, 0).ok_or(Error::InvariantViolation {
            position,
            stage: 0,
        })?;
        let bit = if partition.is_frozen(position) {
            0
        } else {
            hard_decision(llr)
        };
        self.set_bit(position, 0, bit);
        Ok(())
    }

    // Propagates a decided bit at a bit node one stage up. Returns the two
    // positions whose bits were set at the next stage, or `None` if the node
    // is a check node, whose bit is propagated together with its bit node.
    fn propagate(&mut self, position: usize, stage: usize) -> Result<Option<[usize; 2]>, Error> {
        if stage >= self.stages {
            return Ok(None);
        }
        match Node::at(position, stage, self.stages) {
            Node::Check { .. } => Ok(None),
            Node::Bit { upper } => {
                let bit = self.bit(position, stage)?;
                let upper_bit = self.bit(upper, stage)?;
                self.set_bit(upper, stage + 1, bit ^ upper_bit);
                self.set_bit(position, stage + 1, bit);
                Ok(Some([position, upper]))
            }
        }
    }

    fn output(&self, partition: &Partition) -> Result<DecoderOutput, Error> {
        let column = |stage: usize| {
            (0..self.bits.nrows())
                .map(|position| self.bit(position, stage))
                .collect::<Result<Vec<u8>, Error>>()
        };
        let decisions = column(0)?;
        let codeword = column(self.stages)?;
        let message = partition.unfrozen().iter().map(|&j| decisions[j]).collect();
        Ok(DecoderOutput {
            message,
            decisions,
            codeword,
        })
    }
}
