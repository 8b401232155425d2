//! Iterative successive cancellation decoder.
//!
//! This decoder performs the same computations as the
//! [recursive decoder](super::recursive), but replaces the recursions by
//! sweeps over the stages of the butterfly. For each position, in bit-reversed
//! order, it first collects the nodes whose LLRs are still unknown and that
//! the decision at the position depends on, one stage at a time going towards
//! the channel. Then it computes these LLRs going back towards the decisions,
//! decides the position and propagates the decided bit towards the channel.

use super::{validate, DecoderOutput, Error, Node, PolarDecoder, Tables};
use crate::{code::PolarCode, util::bit_reverse};

/// Iterative SC decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoder {
    code: PolarCode,
}

impl Decoder {
    /// Creates a new iterative SC decoder.
    ///
    /// The code uses the default construction in [`PolarCode::new`].
    pub fn new(n: usize, k: usize) -> Result<Decoder, Error> {
        Ok(Decoder::from_code(PolarCode::new(n, k)?))
    }

    /// Creates a new iterative SC decoder for a given code.
    pub fn from_code(code: PolarCode) -> Decoder {
        tracing::debug!(n = code.n(), k = code.k(), "built iterative SC decoder");
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
        // Pending nodes of each stage
        let mut pending = vec![Vec::new(); stages];
        let mut front = Vec::new();
        let mut next_front = Vec::new();
        for b in 0..self.code.n() {
            let position = bit_reverse(b, stages);

            pending[0].push(position);
            for stage in 0..stages - 1 {
                let (current, next) = pending.split_at_mut(stage + 1);
                for &p in current[stage].iter() {
                    let paired = Node::at(p, stage, stages).paired();
                    for child in [p, paired] {
                        if tables.llr(child, stage + 1).is_none() {
                            debug_assert!(!next[0].contains(&child));
                            next[0].push(child);
                        }
                    }
                }
            }
            for stage in (0..stages).rev() {
                for p in pending[stage].drain(..) {
                    tables.combine(p, stage)?;
                }
            }

            tables.decide(position, self.code.partition())?;

            front.push(position);
            for stage in 0..stages {
                for &p in front.iter() {
                    if let Some(updated) = tables.propagate(p, stage)? {
                        next_front.extend(updated);
                    }
                }
                front.clear();
                std::mem::swap(&mut front, &mut next_front);
                if front.is_empty() {
                    break;
                }
            }
            front.clear();
        }
        Ok(tables)
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

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        decoder::recursive,
        encoder::Encoder,
        rand::{Rng, SeedableRng},
        sequence::Bhattacharyya,
    };
    use rand::Rng as _;
    use rand_distr::{Distribution, Normal};

    #[test]
    fn n4_k2() {
        let code = PolarCode::with_unfrozen(4, 2, [2, 3]).unwrap();
        let decoder = Decoder::from_code(code);
        // Codeword [1, 0, 1, 0]
        let llrs = [-20.0, 20.0, -20.0, 20.0];
        assert_eq!(decoder.decode(&llrs).unwrap(), vec![1, 0]);
    }

    #[test]
    fn each_node_computed_once() {
        let mut rng = Rng::seed_from_u64(10);
        for stages in 2..=10 {
            let n = 1 << stages;
            let decoder = Decoder::new(n, n / 4).unwrap();
            let llrs: Vec<f64> = (0..n).map(|_| rng.gen_range(-5.0..5.0)).collect();
            let tables = decoder.decode_tables(&llrs).unwrap();
            assert_eq!(tables.evaluations, n * stages);
            assert!(tables.bits.iter().all(Option::is_some));
        }
    }

    #[test]
    fn matches_recursive_decoder() {
        let mut rng = Rng::seed_from_u64(11);
        let noise = Normal::new(0.0, 1.0).unwrap();
        for stages in 2..=10 {
            let n = 1 << stages;
            for k in [0, n / 8, n / 2, n - 1] {
                let code = PolarCode::with_sequence(n, k, &Bhattacharyya::new(1.0)).unwrap();
                let encoder = Encoder::new(code.clone());
                let iterative = Decoder::from_code(code.clone());
                let recursive = recursive::Decoder::from_code(code);
                for _ in 0..8 {
                    let message: Vec<u8> = (0..k).map(|_| rng.gen_range(0..=1)).collect();
                    let llrs: Vec<f64> = encoder
                        .encode(&message)
                        .unwrap()
                        .iter()
                        .map(|&b| 2.0 * (1.0 - 2.0 * f64::from(b)) + 2.0 * noise.sample(&mut rng))
                        .collect();
                    assert_eq!(
                        iterative.decode_output(&llrs).unwrap(),
                        recursive.decode_output(&llrs).unwrap()
                    );
                }
            }
        }
    }

    #[test]
    fn wrong_llr_length() {
        let decoder = Decoder::new(8, 4).unwrap();
        assert_eq!(
            decoder.decode(&[]),
            Err(Error::Validation {
                expected: 8,
                actual: 0
            })
        );
    }
}
