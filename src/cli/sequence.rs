//! Sequence CLI subcommand.
//!
//! This subcommand prints the frozen/unfrozen partition of a polar code,
//! either as two lists of positions or as a mask with `--mask`.
//!
//! # Examples
//!
//! The unfrozen positions of a rate 1/2 code of size 16 constructed with the
//! Bhattacharyya parameters at a design Es/N0 of 1 dB can be obtained with
//! ```shell
//! $ polar-toolbox sequence --n 16 --k 8 --sequence Bhattacharyya --design-esn0 1.0
//! ```

use crate::cli::*;
use clap::Parser;
use std::error::Error;

/// Sequence CLI arguments.
#[derive(Debug, Parser)]
#[command(about = "Prints the frozen bit partition of a polar code")]
pub struct Args {
    #[command(flatten)]
    code: CodeArgs,
    /// Prints a frozen mask ('F' for frozen and 'U' for unfrozen positions)
    #[arg(long)]
    mask: bool,
}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        let code = self.code.code()?;
        let partition = code.partition();
        if self.mask {
            let mask = (0..code.n())
                .map(|j| if partition.is_frozen(j) { 'F' } else { 'U' })
                .collect::<String>();
            println!("{mask}");
        } else {
            println!("unfrozen: {}", format_positions(partition.unfrozen().iter().copied()));
            println!("frozen: {}", format_positions(partition.frozen()));
        }
        Ok(())
    }
}

fn format_positions(positions: impl Iterator<Item = usize>) -> String {
    positions
        .map(|j| j.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn positions() {
        assert_eq!(format_positions([3, 5, 6, 7].into_iter()), "3,5,6,7");
        assert_eq!(format_positions(std::iter::empty()), "");
    }
}
