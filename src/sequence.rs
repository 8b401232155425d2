//! Polar code construction.
//!
//! This module computes the partition of the codeword positions into frozen
//! and unfrozen positions. Both constructions rank the positions by the
//! reliability of the bit channel they see under successive cancellation
//! decoding, and select the `k` most reliable positions to carry the message.
//!
//! The reliabilities are computed for the butterfly used by the decoders in
//! [`crate::decoder`], which pair positions at distance 1 next to the channel
//! and at distance `n / 2` next to the decisions, and decide the positions in
//! bit-reversed order.

use crate::{
    code::{CodeParameters, Partition},
    util::bit_reverse,
};
use clap::ValueEnum;

/// Polar sequence.
///
/// A polar sequence gives the frozen/unfrozen partition for any valid code
/// parameters. The result must be deterministic.
pub trait PolarSequence: std::fmt::Debug + Send + Sync {
    /// Returns the partition for the code parameters `params`.
    fn partition(&self, params: &CodeParameters) -> Partition;
}

/// Ranks positions by a reliability score and keeps the `k` most reliable.
///
/// Higher scores are more reliable. Equal scores are ranked by index, with the
/// lower index being less reliable.
fn partition_from_scores(params: &CodeParameters, scores: &[f64]) -> Partition {
    let mut order: Vec<usize> = (0..params.n()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]).then(a.cmp(&b)));
    let unfrozen = order[params.n() - params.k()..].iter().copied();
    Partition::from_unfrozen(params, unfrozen)
        .expect("reliability ranking always yields a valid partition")
}

/// Polarization weight construction.
///
/// This uses the β-expansion of *G. He et al., "β-expansion: A Theoretical
/// Framework for Fast and Recursive Construction of Polar Codes," GLOBECOM
/// 2017*, with β = 2^(1/4). It does not depend on the channel SNR.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolarizationWeight {}

impl PolarizationWeight {
    /// The expansion base `2^(1/4)`.
    pub const BETA: f64 = 1.189_207_115_002_721;

    /// Creates a new polarization weight construction.
    pub fn new() -> PolarizationWeight {
        PolarizationWeight::default()
    }

    /// Returns the polarization weight of a position.
    ///
    /// The bit of `position` that selects the butterfly next to the channel
    /// (the least significant one) gets the largest weight.
    pub fn weight(position: usize, stages: usize) -> f64 {
        let reversed = bit_reverse(position, stages);
        (0..stages)
            .filter(|&j| (reversed >> j) & 1 == 1)
            .map(|j| Self::BETA.powi(j as i32))
            .sum()
    }
}

impl PolarSequence for PolarizationWeight {
    fn partition(&self, params: &CodeParameters) -> Partition {
        let scores: Vec<f64> = (0..params.n())
            .map(|j| Self::weight(j, params.stages()))
            .collect();
        tracing::debug!(
            n = params.n(),
            k = params.k(),
            "polarization weight construction"
        );
        partition_from_scores(params, &scores)
    }
}

/// Bhattacharyya parameter construction.
///
/// The Bhattacharyya parameters of the bit channels are obtained by
/// propagating the parameter of the physical channel through the polar
/// butterfly, using the exact recursions for the binary erasure channel as an
/// approximation. The computations are done in the log domain, so that they do
/// not underflow for large codes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bhattacharyya {
    design_esn0_db: f64,
}

impl Bhattacharyya {
    /// Creates a new Bhattacharyya construction.
    ///
    /// The parameter `design_esn0_db` is the design Es/N0 in dB units.
    pub fn new(design_esn0_db: f64) -> Bhattacharyya {
        Bhattacharyya { design_esn0_db }
    }

    /// Returns the logarithm of the Bhattacharyya parameter of each position.
    pub fn log_parameters(&self, params: &CodeParameters) -> Vec<f64> {
        let esn0 = 10.0_f64.powf(0.1 * self.design_esn0_db);
        let stages = params.stages();
        let mut z = vec![-esn0; params.n()];
        for stage in (0..stages).rev() {
            let half = 1 << (stages - stage - 1);
            for block in z.chunks_exact_mut(2 * half) {
                let (upper, lower) = block.split_at_mut(half);
                for (a, b) in upper.iter_mut().zip(lower.iter_mut()) {
                    let (za, zb) = (*a, *b);
                    *a = log_check_node(za, zb);
                    *b = za + zb;
                }
            }
        }
        z
    }
}

// ln(za + zb - za * zb) computed from ln(za) and ln(zb).
fn log_check_node(a: f64, b: f64) -> f64 {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    let sum = hi + (lo - hi).exp().ln_1p();
    sum + (-(a + b - sum).exp()).ln_1p()
}

impl PolarSequence for Bhattacharyya {
    fn partition(&self, params: &CodeParameters) -> Partition {
        let scores: Vec<f64> = self.log_parameters(params).iter().map(|z| -z).collect();
        tracing::debug!(
            n = params.n(),
            k = params.k(),
            design_esn0_db = self.design_esn0_db,
            "Bhattacharyya construction"
        );
        partition_from_scores(params, &scores)
    }
}

/// Polar sequence kind.
///
/// This enum lists the constructions that can be selected from the CLI.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, ValueEnum)]
#[clap(rename_all = "verbatim")]
pub enum SequenceKind {
    /// Polarization weight (β-expansion) construction.
    PolarizationWeight,
    /// Bhattacharyya parameter construction.
    Bhattacharyya,
}

impl SequenceKind {
    /// Builds the sequence.
    ///
    /// The `design_esn0_db` is only used by the constructions that depend on
    /// the channel.
    pub fn build_sequence(&self, design_esn0_db: f64) -> Box<dyn PolarSequence> {
        match self {
            SequenceKind::PolarizationWeight => Box::new(PolarizationWeight::new()),
            SequenceKind::Bhattacharyya => Box::new(Bhattacharyya::new(design_esn0_db)),
        }
    }
}

impl std::str::FromStr for SequenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<SequenceKind, String> {
        Ok(match s {
            "PolarizationWeight" => SequenceKind::PolarizationWeight,
            "Bhattacharyya" => SequenceKind::Bhattacharyya,
            _ => Err(format!("invalid sequence {s}"))?,
        })
    }
}

impl std::fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "{}",
            match self {
                SequenceKind::PolarizationWeight => "PolarizationWeight",
                SequenceKind::Bhattacharyya => "Bhattacharyya",
            }
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn check_contract(sequence: &dyn PolarSequence, n: usize, k: usize) {
        let params = CodeParameters::new(n, k).unwrap();
        let partition = sequence.partition(&params);
        assert_eq!(partition.unfrozen().len(), k);
        assert_eq!(partition.frozen().count(), n - k);
        for j in 0..n {
            assert_eq!(partition.is_frozen(j), !partition.unfrozen().contains(&j));
        }
    }

    #[test]
    fn contract() {
        let sequences: [Box<dyn PolarSequence>; 2] = [
            Box::new(PolarizationWeight::new()),
            Box::new(Bhattacharyya::new(0.0)),
        ];
        for sequence in sequences.iter() {
            for stages in 2..=10 {
                let n = 1 << stages;
                for k in [0, 1, n / 4, n / 2, n - 1, n] {
                    check_contract(sequence.as_ref(), n, k);
                }
            }
        }
    }

    #[test]
    fn polarization_weight_n4() {
        // The position paired with its neighbour next to the channel and
        // decided last in its pair is better than the one paired at distance 2.
        let params = CodeParameters::new(4, 2).unwrap();
        let partition = PolarizationWeight::new().partition(&params);
        assert_eq!(partition.unfrozen(), &[1, 3]);
    }

    #[test]
    fn extreme_positions() {
        // Position 0 is always the worst channel and position n - 1 the best.
        for stages in 2..=10 {
            let n = 1 << stages;
            let params = CodeParameters::new(n, 1).unwrap();
            assert_eq!(PolarizationWeight::new().partition(&params).unfrozen(), &[n - 1]);
            assert_eq!(Bhattacharyya::new(0.0).partition(&params).unfrozen(), &[n - 1]);
            let params = CodeParameters::new(n, n - 1).unwrap();
            assert!(PolarizationWeight::new().partition(&params).is_frozen(0));
            assert!(Bhattacharyya::new(0.0).partition(&params).is_frozen(0));
        }
    }

    #[test]
    fn bhattacharyya_n4() {
        // Erasure channel with z = 1/2 at every channel position
        let esn0_db = 10.0 * 2.0_f64.ln().log10();
        let z: Vec<f64> = Bhattacharyya::new(esn0_db)
            .log_parameters(&CodeParameters::new(4, 2).unwrap())
            .iter()
            .map(|x| x.exp())
            .collect();
        let expected = [0.9375, 0.4375, 0.5625, 0.0625];
        for (a, b) in z.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn sequence_kind_from_str() {
        for kind in SequenceKind::value_variants() {
            assert_eq!(&kind.to_string().parse::<SequenceKind>().unwrap(), kind);
        }
        assert!("PW".parse::<SequenceKind>().is_err());
    }
}
