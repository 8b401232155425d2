//! BLER simulation
//!
//! This module contains utilities for Monte-Carlo simulation of the block
//! error rate (BLER) of a polar decoder. The frames of each Eb/N0 point are
//! simulated in parallel batches. Each frame uses its own random number stream,
//! derived from the seed of the test, the index of the Eb/N0 point and the
//! index of the frame, so that the results do not depend on the number of
//! threads used.

use super::{
    channel::AwgnChannel,
    modulation::{BpskDemodulator, BpskModulator},
    Error,
};
use crate::{
    code::PolarCode,
    decoder::{
        factory::{DecoderFactory, DecoderImplementation},
        PolarDecoder,
    },
    encoder::Encoder,
    rand::{Rng, SeedableRng},
};
use rand::{distributions::Standard, Rng as _};
use rayon::prelude::*;
use std::{
    sync::mpsc::Sender,
    time::{Duration, Instant},
};

/// BLER test parameters.
#[derive(Debug)]
pub struct BlerTestParameters<'a, Dec = DecoderImplementation> {
    /// Polar code.
    pub code: PolarCode,
    /// Decoder implementation.
    pub decoder_implementation: Dec,
    /// List of Eb/N0's (in dB) to simulate.
    pub ebn0s_db: &'a [f32],
    /// Maximum number of frames to simulate at each Eb/N0.
    pub max_frames: u64,
    /// Number of frame errors at which to stop the simulation of an Eb/N0.
    pub max_frame_errors: Option<u64>,
    /// Number of frames simulated in parallel in each batch.
    pub batch_size: u64,
    /// Seed for the random number generators.
    pub seed: u64,
    /// An optional reporter object to which the BLER test will send
    /// periodic updates about its progress.
    pub reporter: Option<Reporter>,
}

/// BLER test.
///
/// This struct is used to configure and run a BLER test.
#[derive(Debug)]
pub struct BlerTest<Dec = DecoderImplementation> {
    link: Link,
    decoder_implementation: Dec,
    ebn0s_db: Vec<f32>,
    max_frames: u64,
    max_frame_errors: Option<u64>,
    batch_size: u64,
    seed: u64,
    reporter: Option<Reporter>,
}

// Encoder, modulator and decoder, shared by all the threads.
#[derive(Debug)]
struct Link {
    encoder: Encoder,
    modulator: BpskModulator,
    decoder: Box<dyn PolarDecoder>,
}

/// Progress reporter.
///
/// A reporter can optionally be passed to the BLER test on construction in
/// order to receive periodic updates about the progress of the test.
#[derive(Debug, Clone)]
pub struct Reporter {
    /// Sender element of a channel used to send the reports.
    pub tx: Sender<Report>,
    /// Reporting interval.
    pub interval: Duration,
}

/// BLER test progress report.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// Statistics for the current Eb/N0 being simulated.
    ///
    /// The last report sent for each Eb/N0 contains its final statistics.
    Statistics(Statistics),
    /// The BLER test has finished.
    Finished,
}

/// BLER test statistics.
///
/// This structure contains the statistics for a single Eb/N0 case in a BLER
/// test.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    /// Eb/N0 in dB units.
    pub ebn0_db: f32,
    /// Channel noise standard deviation.
    pub noise_sigma: f64,
    /// Number of frames tested.
    pub num_frames: u64,
    /// Number of message bit errors.
    pub bit_errors: u64,
    /// Number of frame errors.
    pub frame_errors: u64,
    /// Bit error rate.
    pub ber: f64,
    /// Block error rate.
    pub bler: f64,
    /// Elapsed time for this test case.
    pub elapsed: Duration,
    /// Throughput in Mbps (referred to information bits).
    pub throughput_mbps: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct CurrentStatistics {
    num_frames: u64,
    bit_errors: u64,
    frame_errors: u64,
    start: Instant,
    end: Option<Instant>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct FrameResult {
    bit_errors: u64,
}

impl<Dec: DecoderFactory> BlerTest<Dec> {
    /// Creates a new BLER test.
    ///
    /// This function only defines the BLER test. To run it it is necessary to
    /// call the [`BlerTest::run`] method.
    pub fn new(parameters: BlerTestParameters<Dec>) -> BlerTest<Dec> {
        let decoder = parameters
            .decoder_implementation
            .build_decoder(parameters.code.clone());
        BlerTest {
            link: Link {
                encoder: Encoder::new(parameters.code),
                modulator: BpskModulator::new(),
                decoder,
            },
            decoder_implementation: parameters.decoder_implementation,
            ebn0s_db: parameters.ebn0s_db.to_owned(),
            max_frames: parameters.max_frames,
            max_frame_errors: parameters.max_frame_errors,
            batch_size: parameters.batch_size.max(1),
            seed: parameters.seed,
            reporter: parameters.reporter,
        }
    }

    /// Returns the codeword size of the code.
    pub fn n(&self) -> usize {
        self.link.encoder.code().n()
    }

    /// Returns the number of information bits of the code.
    pub fn k(&self) -> usize {
        self.link.encoder.code().k()
    }

    /// Returns the rate of the code.
    pub fn rate(&self) -> f64 {
        self.link.encoder.code().params().rate()
    }

    /// Returns the decoder implementation.
    pub fn decoder_implementation(&self) -> &Dec {
        &self.decoder_implementation
    }

    /// Runs the BLER test.
    ///
    /// This function runs the BLER test until completion. It returns a list of
    /// statistics for each Eb/N0, or an error.
    pub fn run(self) -> Result<Vec<Statistics>, Error> {
        let mut statistics = Vec::with_capacity(self.ebn0s_db.len());
        for (point, &ebn0_db) in self.ebn0s_db.iter().enumerate() {
            statistics.push(self.run_point(point, ebn0_db)?);
        }
        if let Some(reporter) = &self.reporter {
            reporter.report(Report::Finished);
        }
        Ok(statistics)
    }

    fn run_point(&self, point: usize, ebn0_db: f32) -> Result<Statistics, Error> {
        let noise_sigma = noise_sigma(self.rate(), ebn0_db);
        let channel = AwgnChannel::new(noise_sigma)?;
        let demodulator = BpskDemodulator::new(noise_sigma);
        tracing::info!(ebn0_db, noise_sigma, "starting Eb/N0 point");

        let link = &self.link;
        let seed = self.seed;
        let mut current = CurrentStatistics::new();
        let mut last_report = Instant::now();
        'frames: while current.num_frames < self.max_frames {
            let first = current.num_frames;
            let last = self.max_frames.min(first + self.batch_size);
            let batch_start = Instant::now();
            let results = (0..(last - first) as usize)
                .into_par_iter()
                .map(|j| {
                    let mut rng = Rng::seed_from_u64(seed);
                    rng.set_stream(stream_id(point, first + j as u64));
                    link.simulate_frame(&mut rng, &channel, &demodulator)
                })
                .collect::<Result<Vec<FrameResult>, Error>>()?;
            let batch_elapsed = batch_start.elapsed();
            tracing::debug!(ebn0_db, first, last, "simulated batch");
            // Results are accumulated in frame order, so that stopping at a
            // number of frame errors gives the same counts for any batch size.
            let batch_len = results.len();
            for (j, result) in results.into_iter().enumerate() {
                current.update(result);
                if self
                    .max_frame_errors
                    .is_some_and(|max| current.frame_errors >= max)
                {
                    // The frames of the batch after the stop are not counted,
                    // so neither is their share of the batch time.
                    current.end = Some(prorated_end(
                        batch_start,
                        batch_elapsed,
                        j + 1,
                        batch_len,
                    ));
                    break 'frames;
                }
            }
            if let Some(reporter) = &self.reporter {
                if last_report.elapsed() >= reporter.interval {
                    reporter.report(Report::Statistics(Statistics::from_current(
                        &current,
                        ebn0_db,
                        noise_sigma,
                        self.k(),
                    )));
                    last_report = Instant::now();
                }
            }
        }

        let stats = Statistics::from_current(&current, ebn0_db, noise_sigma, self.k());
        tracing::info!(
            ebn0_db,
            frames = stats.num_frames,
            frame_errors = stats.frame_errors,
            bler = stats.bler,
            "finished Eb/N0 point"
        );
        if let Some(reporter) = &self.reporter {
            reporter.report(Report::Statistics(stats.clone()));
        }
        Ok(stats)
    }
}

impl Link {
    fn simulate_frame(
        &self,
        rng: &mut Rng,
        channel: &AwgnChannel,
        demodulator: &BpskDemodulator,
    ) -> Result<FrameResult, Error> {
        let message = Self::random_message(rng, self.encoder.code().k());
        let codeword = self.encoder.encode(&message)?;
        let mut symbols = self.modulator.modulate(&codeword);
        channel.add_noise(rng, &mut symbols);
        let llrs = demodulator.demodulate(&symbols);
        let decoded = self.decoder.decode(&llrs)?;
        let bit_errors = message
            .iter()
            .zip(decoded.iter())
            .filter(|(&a, &b)| a != b)
            .count() as u64;
        Ok(FrameResult { bit_errors })
    }

    fn random_message(rng: &mut Rng, size: usize) -> Vec<u8> {
        rng.sample_iter(Standard)
            .map(<u8 as From<bool>>::from)
            .take(size)
            .collect()
    }
}

impl Reporter {
    fn report(&self, report: Report) {
        // A receiver that has hung up does not stop the test.
        let _ = self.tx.send(report);
    }
}

/// Returns the channel noise standard deviation for an Eb/N0.
///
/// The noise standard deviation corresponds to BPSK symbols of unit energy
/// carrying `rate` information bits each.
pub fn noise_sigma(rate: f64, ebn0_db: f32) -> f64 {
    let ebn0 = 10.0_f64.powf(0.1 * f64::from(ebn0_db));
    let esn0 = rate * ebn0;
    (0.5 / esn0).sqrt()
}

// Instant at which the first `used` frames of a batch of `total` frames would
// have finished, assuming they take the same time each.
fn prorated_end(
    batch_start: Instant,
    batch_elapsed: Duration,
    used: usize,
    total: usize,
) -> Instant {
    batch_start + batch_elapsed.mul_f64(used as f64 / total as f64)
}

// The frame index occupies the 40 least significant bits of the stream.
fn stream_id(point: usize, frame: u64) -> u64 {
    ((point as u64) << 40) | (frame & ((1 << 40) - 1))
}

impl CurrentStatistics {
    fn new() -> CurrentStatistics {
        CurrentStatistics {
            num_frames: 0,
            bit_errors: 0,
            frame_errors: 0,
            start: Instant::now(),
            end: None,
        }
    }

    fn update(&mut self, result: FrameResult) {
        self.num_frames += 1;
        self.bit_errors += result.bit_errors;
        if result.bit_errors > 0 {
            self.frame_errors += 1;
        }
    }
}

impl Default for CurrentStatistics {
    fn default() -> CurrentStatistics {
        CurrentStatistics::new()
    }
}

impl Statistics {
    fn from_current(
        stats: &CurrentStatistics,
        ebn0_db: f32,
        noise_sigma: f64,
        k: usize,
    ) -> Statistics {
        let elapsed = stats.end.unwrap_or_else(Instant::now) - stats.start;
        let info_bits = k as f64 * stats.num_frames as f64;
        Statistics {
            ebn0_db,
            noise_sigma,
            num_frames: stats.num_frames,
            bit_errors: stats.bit_errors,
            frame_errors: stats.frame_errors,
            ber: stats.bit_errors as f64 / info_bits,
            bler: stats.frame_errors as f64 / stats.num_frames as f64,
            elapsed,
            throughput_mbps: 1e-6 * info_bits / elapsed.as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::mpsc;

    fn parameters(ebn0s_db: &[f32], max_frames: u64) -> BlerTestParameters<'_> {
        BlerTestParameters {
            code: PolarCode::new(16, 8).unwrap(),
            decoder_implementation: DecoderImplementation::Recursive,
            ebn0s_db,
            max_frames,
            max_frame_errors: None,
            batch_size: 1000,
            seed: 42,
            reporter: None,
        }
    }

    #[test]
    fn noise_sigma_rate_half() {
        // Es/N0 = 0 dB for rate 1/2 and Eb/N0 = 3.01 dB
        let sigma = noise_sigma(0.5, 10.0 * 2.0_f32.log10());
        assert!((sigma - 0.5_f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn bler_decreases_with_ebn0() {
        let stats = BlerTest::new(parameters(&[1.0, 6.0], 10_000)).run().unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].num_frames, 10_000);
        assert_eq!(stats[1].num_frames, 10_000);
        assert!(stats[0].bler > stats[1].bler);
        assert!(stats[0].ber <= stats[0].bler);
    }

    #[test]
    fn reproducible() {
        let a = BlerTest::new(parameters(&[2.0], 2000)).run().unwrap();
        let mut params = parameters(&[2.0], 2000);
        params.batch_size = 77;
        params.decoder_implementation = DecoderImplementation::Iterative;
        let b = BlerTest::new(params).run().unwrap();
        assert_eq!(a[0].bit_errors, b[0].bit_errors);
        assert_eq!(a[0].frame_errors, b[0].frame_errors);
    }

    #[test]
    fn stop_at_frame_errors() {
        let mut params = parameters(&[0.0], 100_000);
        params.max_frame_errors = Some(25);
        params.batch_size = 64;
        let stats = BlerTest::new(params).run().unwrap();
        assert_eq!(stats[0].frame_errors, 25);
        assert!(stats[0].num_frames < 100_000);
    }

    #[test]
    fn prorated_batch_time() {
        let start = Instant::now();
        let elapsed = Duration::from_secs(8);
        assert_eq!(
            prorated_end(start, elapsed, 2, 8),
            start + Duration::from_secs(2)
        );
        assert_eq!(prorated_end(start, elapsed, 8, 8), start + elapsed);
    }

    #[test]
    fn elapsed_excludes_frames_after_stop() {
        let mut params = parameters(&[0.0], 100_000);
        params.max_frame_errors = Some(1);
        params.batch_size = 100_000;
        let before = Instant::now();
        let stats = BlerTest::new(params).run().unwrap();
        let total = before.elapsed();
        assert_eq!(stats[0].frame_errors, 1);
        // Only a few frames of the single large batch are counted
        assert!(stats[0].num_frames < 1000);
        assert!(stats[0].elapsed * 10 < total);
    }

    #[test]
    fn reports() {
        let (tx, rx) = mpsc::channel();
        let mut params = parameters(&[1.0, 2.0], 500);
        params.reporter = Some(Reporter {
            tx,
            interval: Duration::from_secs(3600),
        });
        let stats = BlerTest::new(params).run().unwrap();
        let reports: Vec<Report> = rx.iter().collect();
        assert_eq!(
            reports,
            vec![
                Report::Statistics(stats[0].clone()),
                Report::Statistics(stats[1].clone()),
                Report::Finished
            ]
        );
    }

    #[test]
    fn no_information_bits() {
        let mut params = parameters(&[1.0], 10);
        params.code = PolarCode::new(16, 0).unwrap();
        assert!(matches!(
            BlerTest::new(params).run(),
            Err(Error::NoiseSigma(_))
        ));
    }
}
