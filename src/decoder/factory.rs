//! Polar decoder factory.
//!
//! This module contains routines to build a polar decoder generically over its
//! implementation. Such decoders are represented by `Box<dyn PolarDecoder>`,
//! using the trait [`PolarDecoder`].

use super::{iterative, recursive, PolarDecoder};
use crate::code::PolarCode;
use clap::ValueEnum;

/// Decoder factory.
///
/// This trait is implemented by types that can build polar decoders. It can be
/// implemented outside this crate to plug other decoders into the BLER test.
pub trait DecoderFactory: std::fmt::Display + Clone + Sync + Send + 'static {
    /// Builds a polar decoder for a given code.
    fn build_decoder(&self, code: PolarCode) -> Box<dyn PolarDecoder>;
}

/// Polar decoder implementation.
///
/// This enum lists the decoder implementations provided by this crate.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, ValueEnum)]
#[clap(rename_all = "verbatim")]
pub enum DecoderImplementation {
    /// The [`recursive::Decoder`] implementation.
    Recursive,
    /// The [`iterative::Decoder`] implementation.
    Iterative,
}

impl DecoderFactory for DecoderImplementation {
    fn build_decoder(&self, code: PolarCode) -> Box<dyn PolarDecoder> {
        match self {
            DecoderImplementation::Recursive => Box::new(recursive::Decoder::from_code(code)),
            DecoderImplementation::Iterative => Box::new(iterative::Decoder::from_code(code)),
        }
    }
}

impl std::str::FromStr for DecoderImplementation {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Recursive" => DecoderImplementation::Recursive,
            "Iterative" => DecoderImplementation::Iterative,
            _ => return Err("invalid decoder implementation"),
        })
    }
}

impl std::fmt::Display for DecoderImplementation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "{}",
            match self {
                DecoderImplementation::Recursive => "Recursive",
                DecoderImplementation::Iterative => "Iterative",
            }
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_and_display() {
        for implementation in DecoderImplementation::value_variants() {
            let parsed: DecoderImplementation = implementation.to_string().parse().unwrap();
            assert_eq!(&parsed, implementation);
        }
        assert!("SCL".parse::<DecoderImplementation>().is_err());
    }

    #[test]
    fn build_decoders() {
        let code = PolarCode::new(32, 12).unwrap();
        for implementation in DecoderImplementation::value_variants() {
            let decoder = implementation.build_decoder(code.clone());
            assert_eq!(decoder.code(), &code);
            assert_eq!(decoder.decode(&[3.0; 32]).unwrap(), vec![0; 12]);
        }
    }
}
