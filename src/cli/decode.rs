//! Decode CLI subcommand.
//!
//! This command decodes a single frame of channel LLRs with a polar SC
//! decoder and prints the decoded message as a string of bits. Positive LLRs
//! favour the bit 0.
//!
//! # Examples
//!
//! ```shell
//! $ polar-toolbox decode --n 4 --k 2 --unfrozen 2,3 1.0,-1.0,1.0,-1.0
//! 11
//! ```
//!
//! With `--verbose`, the decisions for all the leaves and the re-encoded
//! codeword are also printed.

use crate::{
    cli::*,
    decoder::{factory::DecoderImplementation, iterative, recursive},
};
use clap::Parser;
use std::error::Error;

/// Decode CLI arguments.
#[derive(Debug, Parser)]
#[command(about = "Performs polar SC decoding")]
pub struct Args {
    #[command(flatten)]
    code: CodeArgs,
    /// Decoder implementation
    #[arg(long, default_value_t = DecoderImplementation::Recursive)]
    decoder: DecoderImplementation,
    /// Prints the leaf decisions and the codeword
    #[arg(long)]
    verbose: bool,
    /// Channel LLRs (format "1.5,-0.3,2.0,0.7")
    #[arg(allow_hyphen_values = true)]
    llrs: String,
}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        let code = self.code.code()?;
        let llrs = parse_list::<f64>(&self.llrs)?;
        let output = match self.decoder {
            DecoderImplementation::Recursive => {
                recursive::Decoder::from_code(code).decode_output(&llrs)?
            }
            DecoderImplementation::Iterative => {
                iterative::Decoder::from_code(code).decode_output(&llrs)?
            }
        };
        println!("{}", format_bits(&output.message));
        if self.verbose {
            println!("decisions: {}", format_bits(&output.decisions));
            println!("codeword: {}", format_bits(&output.codeword));
        }
        Ok(())
    }
}
