//! # Polar toolbox
//!
//! `polar_toolbox` is a collection of Rust utilities to construct, encode and
//! decode polar codes using successive cancellation (SC) decoding.
//!
//! It can be used as a Rust library, as a shared library through a small C
//! API, or as a CLI tool that allows access from the command line to the
//! encoder, the decoders and a BLER simulator. See [`cli`] for documentation
//! about the usage of the CLI tool.
//!
//! # Examples
//! ```
//! use polar_toolbox::{
//!     code::PolarCode,
//!     decoder::{recursive::Decoder, PolarDecoder},
//!     encoder::Encoder,
//! };
//!
//! let code = PolarCode::new(8, 4).unwrap();
//! let encoder = Encoder::new(code.clone());
//! let decoder = Decoder::from_code(code);
//! let message = [1, 0, 1, 1];
//! let codeword = encoder.encode(&message).unwrap();
//! let llrs: Vec<f64> = codeword.iter().map(|&b| if b == 0 { 4.0 } else { -4.0 }).collect();
//! assert_eq!(decoder.decode(&llrs).unwrap(), message);
//! ```

#![warn(missing_docs)]

mod c_api;
pub mod cli;
pub mod code;
pub mod decoder;
pub mod encoder;
pub mod rand;
pub mod sequence;
pub mod simulation;

mod util;
