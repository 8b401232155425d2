//! `polar-toolbox` CLI application
//!
//! The CLI application is organized in several subcommands. The
//! supported subcommands can be seen by running `polar-toolbox`.
//! See the modules below for examples and more information about
//! how to use each subcommand.
//!
//! Diagnostic logging is written to stderr. Its verbosity can be controlled
//! with the `RUST_LOG` environment variable (for instance `RUST_LOG=debug`).

use crate::{code::PolarCode, sequence::SequenceKind};
use clap::Parser;
use std::error::Error;

pub mod bler;
pub mod decode;
pub mod encode;
pub mod sequence;

/// Trait to run a CLI subcommand
pub trait Run {
    /// Run the CLI subcommand
    fn run(&self) -> Result<(), Box<dyn Error>>;
}

/// CLI arguments.
#[derive(Debug, Parser)]
#[command(author, version, name = "polar-toolbox", about = "Polar code toolbox")]
pub enum Args {
    /// bler subcommand
    BLER(bler::Args),
    /// decode subcommand
    Decode(decode::Args),
    /// encode subcommand
    Encode(encode::Args),
    /// sequence subcommand
    Sequence(sequence::Args),
}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        match self {
            Args::BLER(x) => x.run(),
            Args::Decode(x) => x.run(),
            Args::Encode(x) => x.run(),
            Args::Sequence(x) => x.run(),
        }
    }
}

/// Code construction CLI arguments.
///
/// These arguments are shared by all the subcommands that need to construct a
/// polar code.
#[derive(Debug, Clone, clap::Args)]
pub struct CodeArgs {
    /// Codeword size (N)
    #[arg(long)]
    pub n: usize,
    /// Number of information bits (K)
    #[arg(long)]
    pub k: usize,
    /// Reliability sequence used to choose the frozen bits
    #[arg(long, default_value_t = SequenceKind::PolarizationWeight)]
    pub sequence: SequenceKind,
    /// Design Es/N0 (dB) for the Bhattacharyya sequence
    #[arg(long, default_value = "0.0")]
    pub design_esn0: f64,
    /// Explicit list of unfrozen positions (format "3,5,6,7")
    #[arg(long)]
    pub unfrozen: Option<String>,
}

impl CodeArgs {
    /// Constructs the polar code described by the arguments.
    ///
    /// An explicit list of unfrozen positions takes precedence over the
    /// reliability sequence.
    pub fn code(&self) -> Result<PolarCode, Box<dyn Error>> {
        Ok(match &self.unfrozen {
            Some(s) => PolarCode::with_unfrozen(self.n, self.k, parse_list::<usize>(s)?)?,
            None => {
                let sequence = self.sequence.build_sequence(self.design_esn0);
                PolarCode::with_sequence(self.n, self.k, &*sequence)?
            }
        })
    }
}

/// Parses a comma-separated list.
///
/// The format for the list should be like `"1,2,3"`. Whitespace around the
/// elements is ignored.
pub fn parse_list<T: std::str::FromStr>(s: &str) -> Result<Vec<T>, &'static str> {
    s.split(',')
        .map(|a| a.trim().parse().map_err(|_| "invalid list element"))
        .collect()
}

/// Parses a string of bits.
///
/// The string must contain only the characters `'0'` and `'1'`, as in
/// `"0110"`.
pub fn parse_bits(s: &str) -> Result<Vec<u8>, &'static str> {
    s.chars()
        .map(|c| match c {
            '0' => Ok(0),
            '1' => Ok(1),
            _ => Err("invalid bit string"),
        })
        .collect()
}

/// Formats bits as a string of `'0'` and `'1'` characters.
pub fn format_bits(bits: &[u8]) -> String {
    bits.iter().map(|&b| if b == 0 { '0' } else { '1' }).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn list() {
        assert_eq!(parse_list::<usize>("3, 5,6").unwrap(), vec![3, 5, 6]);
        assert_eq!(parse_list::<f64>("1.5,-2").unwrap(), vec![1.5, -2.0]);
        assert!(parse_list::<usize>("1,x").is_err());
    }

    #[test]
    fn bits() {
        assert_eq!(parse_bits("0110").unwrap(), vec![0, 1, 1, 0]);
        assert!(parse_bits("012").is_err());
        assert_eq!(format_bits(&[1, 0, 0, 1]), "1001");
    }

    #[test]
    fn code_args() {
        let args = CodeArgs {
            n: 4,
            k: 2,
            sequence: SequenceKind::PolarizationWeight,
            design_esn0: 0.0,
            unfrozen: Some("2,3".to_string()),
        };
        assert_eq!(args.code().unwrap().partition().unfrozen(), &[2, 3]);
        let args = CodeArgs {
            unfrozen: None,
            ..args
        };
        assert_eq!(args.code().unwrap().partition().unfrozen(), &[1, 3]);
    }

    #[test]
    fn parse_args() {
        let args = Args::try_parse_from([
            "polar-toolbox",
            "decode",
            "--n",
            "4",
            "--k",
            "2",
            "1,1,1,1",
        ]);
        assert!(matches!(args, Ok(Args::Decode(_))));
        assert!(Args::try_parse_from(["polar-toolbox", "foo"]).is_err());
    }
}
