use anyhow::Result;
use chanplan::{
    AdmissionController, AdmissionError, ChannelHandle, ChannelSpan, HardwareApplier, LoEvent,
    TunerConfig,
};
use clap::Parser;
use crossbeam::channel::Sender;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

/// Exercises the admission planner with concurrent channel requests
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Lowest tunable frequency in Hz
    #[arg(long, default_value_t = 100_000_000)]
    min_frequency: u64,

    /// Highest tunable frequency in Hz
    #[arg(long, default_value_t = 200_000_000)]
    max_frequency: u64,

    /// Device bandwidth in Hz
    #[arg(long, default_value_t = 1_000_000)]
    bandwidth: u64,

    /// Fraction of the bandwidth usable for channel placement
    #[arg(long, default_value_t = 0.80)]
    usable_fraction: f64,

    /// Half-width of the central dead zone in Hz
    #[arg(long, default_value_t = 6_000)]
    dead_zone: u64,

    /// Worker threads requesting channels
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Admission attempts per worker
    #[arg(long, default_value_t = 50)]
    iterations: usize,

    /// Width of each requested channel in Hz
    #[arg(long, default_value_t = 12_500)]
    channel_width: u64,

    /// Seed for reproducible request sequences
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

/// Stands in for the tuner driver and logs each committed retune
struct LoggingApplier;

impl HardwareApplier for LoggingApplier {
    fn apply(&mut self, center_frequency: u64) -> Result<()> {
        log::info!("retuning device to {} Hz", center_frequency);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Admitted,
    OutOfRange,
    InsufficientBandwidth,
    NoFeasibleCenter,
    DownstreamUnavailable,
    Released,
}

struct AdmissionRecord {
    worker: usize,
    outcome: Outcome,
}

#[derive(Debug, Default)]
struct Tally {
    admitted: usize,
    out_of_range: usize,
    insufficient_bandwidth: usize,
    no_feasible_center: usize,
    downstream_unavailable: usize,
    released: usize,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();
    log::info!("chanplan v0.1.0 starting...");

    let args = Args::parse();

    // Run the simulation
    if let Err(e) = run(&args) {
        log::error!("Simulation error: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let config = TunerConfig {
        min_frequency: args.min_frequency,
        max_frequency: args.max_frequency,
        bandwidth: args.bandwidth,
        usable_bandwidth_fraction: args.usable_fraction,
        dead_zone_half_width: args.dead_zone,
        initial_frequency: args.min_frequency,
    };

    let controller = Arc::new(AdmissionController::new(config, Box::new(LoggingApplier))?);

    // Count committed retunes as the listeners see them
    let retunes = Arc::new(AtomicU64::new(0));
    let retune_counter = retunes.clone();
    controller.add_frequency_listener(move |event| {
        if let LoEvent::FrequencyChanged(_) = event {
            retune_counter.fetch_add(1, Ordering::Relaxed);
        }
    });

    let started = chrono::Utc::now();
    let (tx, rx) = crossbeam::channel::unbounded::<AdmissionRecord>();

    // Collector thread runs until every worker has dropped its sender
    let collector = thread::spawn(move || {
        let mut tally = Tally::default();

        for record in rx {
            log::debug!("worker {} reported {:?}", record.worker, record.outcome);
            match record.outcome {
                Outcome::Admitted => tally.admitted += 1,
                Outcome::OutOfRange => tally.out_of_range += 1,
                Outcome::InsufficientBandwidth => tally.insufficient_bandwidth += 1,
                Outcome::NoFeasibleCenter => tally.no_feasible_center += 1,
                Outcome::DownstreamUnavailable => tally.downstream_unavailable += 1,
                Outcome::Released => tally.released += 1,
            }
        }

        tally
    });

    let mut workers = Vec::new();
    for worker in 0..args.workers {
        let controller = controller.clone();
        let tx = tx.clone();
        let iterations = args.iterations;
        let channel_width = args.channel_width;
        let seed = args.seed;

        workers.push(thread::spawn(move || {
            worker_loop(worker, iterations, channel_width, seed, controller, tx);
        }));
    }

    // Drop the original sender so the collector sees disconnect once the
    // workers are done
    drop(tx);

    for worker in workers {
        if worker.join().is_err() {
            anyhow::bail!("worker thread panicked");
        }
    }

    let tally = collector
        .join()
        .map_err(|_| anyhow::anyhow!("collector thread panicked"))?;
    let elapsed_ms = (chrono::Utc::now() - started).num_milliseconds();

    println!("Admission run complete in {} ms", elapsed_ms);
    println!("  admitted:               {}", tally.admitted);
    println!("  released:               {}", tally.released);
    println!("  out of range:           {}", tally.out_of_range);
    println!("  insufficient bandwidth: {}", tally.insufficient_bandwidth);
    println!("  no feasible center:     {}", tally.no_feasible_center);
    println!("  downstream unavailable: {}", tally.downstream_unavailable);
    println!("  device retunes:         {}", retunes.load(Ordering::Relaxed));
    println!(
        "Final state: center {} Hz, {} active channel(s)",
        controller.frequency(),
        controller.channel_count()
    );
    for span in controller.active_spans() {
        println!("  {} - {} Hz", span.min_frequency, span.max_frequency);
    }

    log::info!("chanplan shutting down");
    Ok(())
}

fn worker_loop(
    worker: usize,
    iterations: usize,
    channel_width: u64,
    seed: u64,
    controller: Arc<AdmissionController>,
    tx: Sender<AdmissionRecord>,
) {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(worker as u64));
    let mut held: Vec<ChannelHandle> = Vec::new();

    // Cluster requests in one region so the workers contend for the same
    // capture window
    let min_frequency = controller.min_frequency();
    let region = min_frequency + (controller.max_frequency() - min_frequency) / 3;
    let spread = controller.usable_bandwidth() * 2;

    for _ in 0..iterations {
        let min = region + rng.gen_range(0..spread);
        let span = ChannelSpan::new(min, min + channel_width);

        let outcome = match controller.try_admit(span) {
            Ok(handle) => {
                held.push(handle);
                Outcome::Admitted
            }
            Err(AdmissionError::OutOfRange { .. }) => Outcome::OutOfRange,
            Err(AdmissionError::InsufficientBandwidth { .. }) => Outcome::InsufficientBandwidth,
            Err(AdmissionError::NoFeasibleCenter) => Outcome::NoFeasibleCenter,
            Err(AdmissionError::DownstreamUnavailable(_)) => Outcome::DownstreamUnavailable,
        };

        if tx.send(AdmissionRecord { worker, outcome }).is_err() {
            break;
        }

        // Hand some channels back so the mix keeps moving
        if !held.is_empty() && rng.gen_bool(0.4) {
            let index = rng.gen_range(0..held.len());
            let handle = held.swap_remove(index);
            controller.release(&handle);
            let _ = tx.send(AdmissionRecord {
                worker,
                outcome: Outcome::Released,
            });
        }
    }

    log::info!("worker {} finished holding {} channel(s)", worker, held.len());
}
