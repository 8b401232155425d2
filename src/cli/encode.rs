//! Encode CLI subcommand.
//!
//! This command can be used to encode a message with a polar code. The
//! message is given as a string of bits, and the codeword is printed in the
//! same format.
//!
//! # Examples
//!
//! ```shell
//! $ polar-toolbox encode --n 4 --k 2 --unfrozen 2,3 11
//! 0101
//! ```

use crate::{cli::*, encoder::Encoder};
use clap::Parser;
use std::error::Error;

/// Encode CLI arguments.
#[derive(Debug, Parser)]
#[command(about = "Performs polar encoding")]
pub struct Args {
    #[command(flatten)]
    code: CodeArgs,
    /// Message bits (format "0110")
    message: String,
}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        let encoder = Encoder::new(self.code.code()?);
        let message = parse_bits(&self.message)?;
        let codeword = encoder.encode(&message)?;
        println!("{}", format_bits(&codeword));
        Ok(())
    }
}
