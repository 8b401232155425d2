//! Recursive successive cancellation decoder.
//!
//! This module implements the SC decoder described in *H. Vangala, E. Viterbo
//! and Y. Hong, "Permuted successive cancellation decoder for polar codes,"
//! ISITA 2014*, using LLRs instead of likelihood ratios. The LLR of each node
//! is computed on demand by a recursion towards the channel, and memoized in
//! the decoding tables, so that each node is computed exactly once.

use super::{validate, DecoderOutput, Error, Node, PolarDecoder, Tables};
use crate::{code::PolarCode, util::bit_reverse};

/// Recursive SC decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoder {
    code: PolarCode,
}

impl Decoder {
    /// Creates a new recursive SC decoder.
    ///
    /// The code uses the default construction in [`PolarCode::new`].
    pub fn new(n: usize, k: usize) -> Result<Decoder, Error> {
        Ok(Decoder::from_code(PolarCode::new(n, k)?))
    }

    /// Creates a new recursive SC decoder for a given code.
    pub fn from_code(code: PolarCode) -> Decoder {
        tracing::debug!(n = code.n(), k = code.k(), "built recursive SC decoder");
        Decoder { code }
    }

    /// Decodes a message.
    ///
    /// Besides the message, the output contains the decisions at all the
    /// positions and the re-encoded codeword.
    pub fn decode_output(&self, llrs: &[f64]) -> Result<DecoderOutput, Error> {
        self.decode_tables(llrs)?.output(self.code.partition())
    }

    fn decode_tables(&self, llrs: &[f64]) -> Result<Tables, Error> {
        validate(self.code.params(), llrs)?;
        let stages = self.code.stages();
        let mut tables = Tables::new(self.code.params(), llrs);
        for b in 0..self.code.n() {
            let position = bit_reverse(b, stages);
            self.update_llr(&mut tables, position, 0)?;
            tables.decide(position, self.code.partition())?;
            self.update_bits(&mut tables, position, 0)?;
        }
        Ok(tables)
    }

    fn llr(&self, tables: &mut Tables, position: usize, stage: usize) -> Result<f64, Error> {
        match tables.llr(position, stage) {
            Some(llr) => Ok(llr),
            None => self.update_llr(tables, position, stage),
        }
    }

    fn update_llr(&self, tables: &mut Tables, position: usize, stage: usize) -> Result<f64, Error> {
        let paired = Node::at(position, stage, self.code.stages()).paired();
        self.llr(tables, position, stage + 1)?;
        self.llr(tables, paired, stage + 1)?;
        tables.combine(position, stage)
    }

    fn update_bits(&self, tables: &mut Tables, position: usize, stage: usize) -> Result<(), Error> {
        if let Some([lower, upper]) = tables.propagate(position, stage)? {
            self.update_bits(tables, lower, stage + 1)?;
            self.update_bits(tables, upper, stage + 1)?;
        }
        Ok(())
    }
}

impl PolarDecoder for Decoder {
    fn decode(&self, llrs: &[f64]) -> Result<Vec<u8>, Error> {
        Ok(self.decode_output(llrs)?.message)
    }

    fn code(&self) -> &PolarCode {
        &self.code
    }
}
