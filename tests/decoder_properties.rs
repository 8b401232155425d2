//! Property-based tests for code construction, encoding and SC decoding.

use polar_toolbox::{
    code::{self, PolarCode},
    decoder::{self, iterative, recursive, PolarDecoder},
    encoder::Encoder,
    sequence::{Bhattacharyya, PolarSequence},
};
use proptest::prelude::*;

// Code size, number of information bits and message.
fn code_and_message() -> impl Strategy<Value = (usize, usize, Vec<u8>)> {
    (2_usize..=8)
        .prop_flat_map(|stages| {
            let n = 1 << stages;
            (Just(n), 0..=n)
        })
        .prop_flat_map(|(n, k)| (Just(n), Just(k), prop::collection::vec(0_u8..=1, k)))
}

fn to_llrs(codeword: &[u8], amplitude: f64) -> Vec<f64> {
    codeword
        .iter()
        .map(|&b| if b == 0 { amplitude } else { -amplitude })
        .collect()
}

proptest! {
    #[test]
    fn prop_construction(n in 0_usize..2048, k in 0_usize..2048) {
        let result = PolarCode::new(n, k);
        let valid = (4..=1024).contains(&n) && n.is_power_of_two() && k <= n;
        prop_assert_eq!(result.is_ok(), valid);
        match &result {
            Ok(code) => {
                prop_assert_eq!(code.partition().unfrozen().len(), k);
                prop_assert_eq!(code.partition().frozen().count(), n - k);
            }
            Err(e) if (4..=1024).contains(&n) && !n.is_power_of_two() => {
                prop_assert_eq!(*e, code::Error::CodewordSizeNotPowerOfTwo(n));
            }
            Err(_) => (),
        }
    }

    #[test]
    fn prop_validation((n, k, _) in code_and_message(), len in 0_usize..300) {
        let decoder = recursive::Decoder::new(n, k).unwrap();
        let result = decoder.decode(&vec![1.0; len]);
        if len == n {
            prop_assert_eq!(result.unwrap().len(), k);
        } else {
            prop_assert_eq!(result, Err(decoder::Error::Validation { expected: n, actual: len }));
        }
    }

    #[test]
    fn prop_noiseless_round_trip((n, k, message) in code_and_message(), amplitude in 0.1_f64..100.0) {
        let decoder = recursive::Decoder::new(n, k).unwrap();
        let encoder = Encoder::new(decoder.code().clone());
        let codeword = encoder.encode(&message).unwrap();
        let output = decoder.decode_output(&to_llrs(&codeword, amplitude)).unwrap();
        prop_assert_eq!(&output.message, &message);
        prop_assert_eq!(&output.codeword, &codeword);
    }

    #[test]
    fn prop_frozen_decisions_are_zero(
        (n, k, _) in code_and_message(),
        llrs in prop::collection::vec(-10.0_f64..10.0, 256),
    ) {
        let decoder = iterative::Decoder::new(n, k).unwrap();
        let output = decoder.decode_output(&llrs[..n]).unwrap();
        for j in decoder.code().partition().frozen() {
            prop_assert_eq!(output.decisions[j], 0);
        }
    }

    #[test]
    fn prop_implementations_agree(
        (n, k, _) in code_and_message(),
        llrs in prop::collection::vec(-10.0_f64..10.0, 256),
        design_esn0_db in -2.0_f64..4.0,
    ) {
        let code = PolarCode::with_sequence(n, k, &Bhattacharyya::new(design_esn0_db)).unwrap();
        let recursive = recursive::Decoder::from_code(code.clone());
        let iterative = iterative::Decoder::from_code(code);
        prop_assert_eq!(
            recursive.decode_output(&llrs[..n]).unwrap(),
            iterative.decode_output(&llrs[..n]).unwrap()
        );
    }

    #[test]
    fn prop_sequence_partition_is_exact(stages in 2_usize..=10, k_fraction in 0.0_f64..=1.0) {
        let n = 1 << stages;
        let k = (k_fraction * n as f64).floor() as usize;
        let params = code::CodeParameters::new(n, k).unwrap();
        let partition = Bhattacharyya::new(0.0).partition(&params);
        let unfrozen = partition.unfrozen();
        prop_assert_eq!(unfrozen.len(), k);
        prop_assert!(unfrozen.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(unfrozen.iter().filter(|&&j| partition.is_frozen(j)).count(), 0);
    }
}
