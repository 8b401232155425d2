//! BLER test CLI subcommand.
//!
//! This subcommand can be used to perform a BLER test of a polar SC decoder
//! over an AWGN channel with BPSK modulation.
//!
//! # Examples
//!
//! A rate 1/2 code of size 256 can be simulated with
//! ```shell
//! $ polar-toolbox bler --n 256 --k 128 --min-ebn0 0.0 --max-ebn0 4.05 \
//!       --step-ebn0 0.5 --frame-errors 100
//! ```

use crate::{
    cli::*,
    decoder::factory::{DecoderFactory, DecoderImplementation},
    simulation::bler::{BlerTest, BlerTestParameters, Report, Reporter, Statistics},
};
use clap::{Parser, ValueEnum};
use console::Term;
use std::{
    error::Error,
    fs::File,
    io::Write,
    sync::mpsc::{self, Receiver},
    time::Duration,
};

/// BLER test CLI arguments.
#[derive(Debug, Parser)]
#[command(about = "Performs a BLER simulation")]
pub struct Args<Dec: DecoderFactory + ValueEnum = DecoderImplementation> {
    #[command(flatten)]
    code: CodeArgs,
    /// Output file for simulation results
    #[arg(long)]
    output_file: Option<String>,
    /// Decoder implementation
    #[arg(long, default_value = "Recursive")]
    decoder: Dec,
    /// Minimum Eb/N0 (dB)
    #[arg(long)]
    min_ebn0: f64,
    /// Maximum Eb/N0 (dB)
    #[arg(long)]
    max_ebn0: f64,
    /// Eb/N0 step (dB)
    #[arg(long)]
    step_ebn0: f64,
    /// Maximum number of frames to simulate at each Eb/N0
    #[arg(long, default_value = "100000")]
    max_frames: u64,
    /// Number of frame errors to collect (0 means no limit)
    #[arg(long, default_value = "100")]
    frame_errors: u64,
    /// Number of frames simulated in parallel in each batch
    #[arg(long, default_value = "1024")]
    batch_size: u64,
    /// Seed for the random number generators
    #[arg(long, default_value = "0")]
    seed: u64,
    /// Number of worker threads (defaults to the number of CPUs)
    #[arg(long)]
    threads: Option<usize>,
}

impl<Dec: DecoderFactory + ValueEnum> Run for Args<Dec> {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        if self.step_ebn0.is_nan() || self.step_ebn0 <= 0.0 || self.max_ebn0 < self.min_ebn0 {
            return Err("invalid Eb/N0 range".into());
        }
        let code = self.code.code()?;
        let mut output_file = if let Some(f) = &self.output_file {
            Some(File::create(f)?)
        } else {
            None
        };
        let num_ebn0s = ((self.max_ebn0 - self.min_ebn0) / self.step_ebn0).floor() as usize + 1;
        let ebn0s = (0..num_ebn0s)
            .map(|k| (self.min_ebn0 + k as f64 * self.step_ebn0) as f32)
            .collect::<Vec<_>>();
        let (report_tx, report_rx) = mpsc::channel();
        let reporter = Reporter {
            tx: report_tx,
            interval: Duration::from_millis(500),
        };
        let test = BlerTest::new(BlerTestParameters {
            code,
            decoder_implementation: self.decoder.clone(),
            ebn0s_db: &ebn0s,
            max_frames: self.max_frames,
            max_frame_errors: Some(self.frame_errors).filter(|&e| e > 0),
            batch_size: self.batch_size,
            seed: self.seed,
            reporter: Some(reporter),
        });
        let threads = self.threads.unwrap_or_else(num_cpus::get);
        self.write_details(std::io::stdout(), &test, threads)?;
        if let Some(f) = &mut output_file {
            self.write_details(&*f, &test, threads)?;
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;
        let mut progress = Progress::new(report_rx, output_file);
        let progress = std::thread::spawn(move || progress.run());
        let result = pool.install(|| test.run());
        // This block cannot actually be written with the ? operator
        #[allow(clippy::question_mark)]
        if let Err(e) = progress.join().map_err(|_| "progress thread panicked")? {
            return Err(e);
        }
        result?;
        Ok(())
    }
}

impl<Dec: DecoderFactory + ValueEnum> Args<Dec> {
    fn write_details<W: Write>(
        &self,
        mut f: W,
        test: &BlerTest<Dec>,
        threads: usize,
    ) -> std::io::Result<()> {
        writeln!(f, "BLER TEST PARAMETERS")?;
        writeln!(f, "--------------------")?;
        writeln!(f, "Simulation:")?;
        writeln!(f, " - Minimum Eb/N0: {:.2} dB", self.min_ebn0)?;
        writeln!(f, " - Maximum Eb/N0: {:.2} dB", self.max_ebn0)?;
        writeln!(f, " - Eb/N0 step: {:.2} dB", self.step_ebn0)?;
        writeln!(f, " - Maximum number of frames: {}", self.max_frames)?;
        if self.frame_errors > 0 {
            writeln!(f, " - Number of frame errors: {}", self.frame_errors)?;
        }
        writeln!(f, " - Seed: {}", self.seed)?;
        writeln!(f, " - Threads: {threads}")?;
        writeln!(f, "Channel:")?;
        writeln!(f, " - Modulation: BPSK")?;
        writeln!(f, "Polar code:")?;
        match &self.code.unfrozen {
            Some(unfrozen) => writeln!(f, " - Unfrozen positions: {unfrozen}")?,
            None => writeln!(f, " - Sequence: {}", self.code.sequence)?,
        }
        writeln!(f, " - Information bits (K): {}", test.k())?;
        writeln!(f, " - Codeword size (N): {}", test.n())?;
        writeln!(f, " - Code rate: {:.3}", test.rate())?;
        writeln!(f, "Polar decoder:")?;
        writeln!(f, " - Implementation: {}", test.decoder_implementation())?;
        writeln!(f)?;
        Ok(())
    }
}

#[derive(Debug)]
struct Progress {
    rx: Receiver<Report>,
    term: Term,
    output_file: Option<File>,
}

impl Progress {
    fn new(rx: Receiver<Report>, output_file: Option<File>) -> Progress {
        Progress {
            rx,
            term: Term::stdout(),
            output_file,
        }
    }

    fn run(&mut self) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
        ctrlc::set_handler({
            let term = self.term.clone();
            move || {
                let _ = term.write_line("");
                let _ = term.show_cursor();
                std::process::exit(0);
            }
        })?;

        let ret = self.work();
        self.term.write_line("")?;
        self.term.show_cursor()?;
        ret
    }

    fn work(&mut self) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
        self.term.set_title("polar-toolbox bler");
        self.term.hide_cursor()?;
        self.term.write_line(Self::format_header())?;
        if let Some(f) = &mut self.output_file {
            writeln!(f, "{}", Self::format_header())?;
        }
        let mut last_stats: Option<Statistics> = None;
        // The channel is closed without a Finished report if the test fails.
        while let Ok(Report::Statistics(stats)) = self.rx.recv() {
            match &last_stats {
                Some(s) if s.ebn0_db == stats.ebn0_db => {
                    self.term.move_cursor_up(1)?;
                    self.term.clear_line()?;
                }
                Some(s) => {
                    if let Some(f) = &mut self.output_file {
                        writeln!(f, "{}", Self::format_progress(s))?;
                    }
                }
                None => (),
            }
            self.term.write_line(&Self::format_progress(&stats))?;
            last_stats = Some(stats);
        }
        if let (Some(f), Some(s)) = (&mut self.output_file, &last_stats) {
            writeln!(f, "{}", Self::format_progress(s))?;
        }
        Ok(())
    }

    fn format_header() -> &'static str {
        "  Eb/N0 |   Frames | Bit errs | Frame er |     BER |    BLER | Throughp | Elapsed\n\
         --------|----------|----------|----------|---------|---------|----------|----------"
    }

    fn format_progress(stats: &Statistics) -> String {
        format!(
            "{:7.2} | {:8} | {:8} | {:8} | {:7.2e} | {:7.2e} | {:8.3} | {}",
            stats.ebn0_db,
            stats.num_frames,
            stats.bit_errors,
            stats.frame_errors,
            stats.ber,
            stats.bler,
            stats.throughput_mbps,
            humantime::format_duration(Duration::from_secs(stats.elapsed.as_secs()))
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn progress_line() {
        let stats = Statistics {
            ebn0_db: 1.5,
            noise_sigma: 0.6,
            num_frames: 1000,
            bit_errors: 30,
            frame_errors: 10,
            ber: 0.0075,
            bler: 0.01,
            elapsed: Duration::from_millis(61_500),
            throughput_mbps: 0.25,
        };
        assert_eq!(
            Progress::format_progress(&stats),
            "   1.50 |     1000 |       30 |       10 | 7.50e-3 | 1.00e-2 |    0.250 | 1m 1s"
        );
    }

    #[test]
    fn header_matches_progress() {
        let header = Progress::format_header().lines().next().unwrap();
        assert_eq!(header.matches('|').count(), 7);
    }
}
