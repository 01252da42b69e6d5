//! imu-blocks - Main Entry Point
//!
//! Runs the IMU block graph on its worker thread and drives it with a
//! synthetic signal source.

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use imu_blocks::{
    config::{default_config_path, AppConfig, LoggingConfig},
    error::ImuError,
    imu::ImuGraphBuilder,
    pipeline::{bridge::CMD_CHANNEL_CAPACITY, GraphBridge, GraphWorker, Sample, SinkMessage},
    session::{SessionMetadata, SessionRecording},
    signal::{SignalPattern, SignalSource},
    types::{ImuChannel, ImuDevice, ImuPosition},
};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "imu-blocks")]
#[command(author, version, about = "Block-based IMU signal pipeline", long_about = None)]
struct Cli {
    /// Config file (TOML). Defaults to the app data directory.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a session from the synthetic signal source
    Record(RecordArgs),

    /// List the channel catalogue
    Channels,

    /// Write the effective configuration to a file
    InitConfig {
        /// Output file. Defaults to the config path.
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Waveform types for CLI
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum CliWaveform {
    #[default]
    Sine,
    Square,
    Triangle,
    Sawtooth,
    Constant,
}

#[derive(Args)]
struct RecordArgs {
    /// Session name
    #[arg(long)]
    name: String,

    /// Device family (WimU, XSens, Delsys Trigno, or any other name)
    #[arg(long)]
    device: Option<String>,

    /// Body position of the unit
    #[arg(long)]
    position: Option<String>,

    /// Free-form notes stored with the session
    #[arg(long)]
    notes: Option<String>,

    /// Number of samples per channel
    #[arg(long, default_value = "500")]
    samples: u32,

    /// Waveform fed to every tri-axial channel
    #[arg(long, value_enum, default_value_t = CliWaveform::Sine)]
    waveform: CliWaveform,

    /// Waveform frequency in Hz
    #[arg(long, default_value = "1.0")]
    frequency: f64,

    /// Waveform amplitude
    #[arg(long, default_value = "1.0")]
    amplitude: f64,

    /// Uniform noise amplitude added to every channel
    #[arg(long, default_value = "0.0")]
    noise: f64,

    /// Pace writes at the configured sample rate instead of as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Print the recording as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl RecordArgs {
    fn pattern(&self) -> SignalPattern {
        let period = if self.frequency > 0.0 {
            1.0 / self.frequency
        } else {
            1.0
        };
        match self.waveform {
            CliWaveform::Sine => SignalPattern::Sine {
                frequency: self.frequency,
                amplitude: self.amplitude,
                offset: 0.0,
            },
            CliWaveform::Square => SignalPattern::Square {
                period,
                amplitude: self.amplitude,
            },
            CliWaveform::Triangle => SignalPattern::Triangle {
                period,
                amplitude: self.amplitude,
            },
            CliWaveform::Sawtooth => SignalPattern::Sawtooth {
                period,
                amplitude: self.amplitude,
            },
            CliWaveform::Constant => SignalPattern::Constant(self.amplitude),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(default_config_path);
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => config_path
            .as_deref()
            .map(|path| AppConfig::load_or_default(path))
            .unwrap_or_default(),
    };

    let _guard = init_logging(&config.logging)?;
    tracing::debug!("Using config {:?}", config_path);

    match cli.command {
        Commands::Record(args) => record(config, args),
        Commands::Channels => {
            list_channels(&config);
            Ok(())
        }
        Commands::InitConfig { output, force } => {
            let path = output
                .or(config_path)
                .ok_or_else(|| anyhow!("Could not determine a config path"))?;
            init_config(&config, &path, force)
        }
    }
}

/// Console logging on stderr, plus a daily file when `log_dir` is set.
/// `RUST_LOG` overrides the configured filter.
fn init_logging(logging: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.filter))
        .context("Invalid logging filter")?;
    let console = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match &logging.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "imu-blocks.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .init();
            Ok(None)
        }
    }
}

fn record(config: AppConfig, args: RecordArgs) -> anyhow::Result<()> {
    let mut metadata = SessionMetadata::new(&args.name)
        .with_sample_rate(config.collection.sample_rate_hz)
        .with_device(match &args.device {
            Some(name) => name.parse::<ImuDevice>().map_err(|e| anyhow!(e))?,
            None => config.recorder.device.clone(),
        })
        .with_position(match &args.position {
            Some(name) => name.parse::<ImuPosition>().map_err(|e| anyhow!(e))?,
            None => config.recorder.position,
        });
    if let Some(notes) = &args.notes {
        metadata = metadata.with_notes(notes);
    }

    let (bridge, cmd_rx, msg_tx) =
        GraphBridge::with_capacity(CMD_CHANNEL_CAPACITY, config.collection.channel_buffer_size);
    let (mut graph, ids) =
        ImuGraphBuilder::new(config.clone()).build(Some(msg_tx.clone()))?;
    ids.start_recording(&mut graph, metadata)?;
    let handle = GraphWorker::new(graph, cmd_rx, msg_tx)
        .start()
        .context("Failed to start graph worker")?;

    let mut source =
        SignalSource::for_sensors(&config.graph.sensors, args.pattern()).with_noise(args.noise);
    let period = config.sample_period();
    let mut tally = Tally::default();

    tracing::info!(
        "Feeding {} samples x {} channels at {} Hz",
        args.samples,
        source.channels().len(),
        config.collection.sample_rate_hz
    );

    for i in 0..args.samples {
        let timestamp = period * i;
        for (identifier, value) in source.sample(timestamp) {
            bridge.write(identifier, Sample::Float(value), Some(timestamp))?;
        }
        tally.absorb(bridge.drain());
        if args.realtime {
            std::thread::sleep(period);
        }
    }

    bridge.shutdown();
    let mut graph = handle
        .join()
        .map_err(|_| ImuError::Worker("graph worker panicked".to_string()))?;
    tally.absorb(bridge.drain());

    let recording = ids.finish_recording(&mut graph)?;
    let dropped = ids.channel_sink(&graph).map_or(0, |sink| sink.dropped());

    if args.json {
        println!("{}", recording.to_json()?);
        eprint!("{}", summary(&recording, &graph.stats(), &tally, dropped));
    } else {
        print!("{}", summary(&recording, &graph.stats(), &tally, dropped));
    }
    Ok(())
}

#[derive(Default)]
struct Tally {
    updates: u64,
    errors: u64,
}

impl Tally {
    fn absorb(&mut self, msgs: Vec<SinkMessage>) {
        for msg in msgs {
            match msg {
                SinkMessage::Update { .. } => self.updates += 1,
                SinkMessage::WriteError { identifier, error } => {
                    self.errors += 1;
                    tracing::warn!("Write to '{}' failed: {}", identifier, error);
                }
                SinkMessage::Stats(_) | SinkMessage::Shutdown => {}
            }
        }
    }
}

fn summary(
    recording: &SessionRecording,
    stats: &imu_blocks::pipeline::GraphStats,
    tally: &Tally,
    dropped: u64,
) -> String {
    let meta = &recording.metadata;
    let mut out = String::new();
    out.push_str(&format!("Session:       {}\n", meta.name));
    out.push_str(&format!("Device:        {} ({})\n", meta.device, meta.position));
    out.push_str(&format!("Duration:      {:.3} s\n", meta.duration.as_secs_f64()));
    out.push_str(&format!("Frames:        {}\n", recording.frame_count()));
    out.push_str(&format!("Samples:       {}\n", meta.total_samples));
    out.push_str(&format!(
        "Writes:        {} ok, {} failed\n",
        stats.writes, stats.failed_writes
    ));
    out.push_str(&format!("Notifications: {}\n", stats.notifications));
    out.push_str(&format!(
        "Updates:       {} received, {} dropped\n",
        tally.updates, dropped
    ));
    if tally.errors > 0 {
        out.push_str(&format!("Errors:        {}\n", tally.errors));
    }
    for channel in recording.channels() {
        let series = recording.channel_series(channel);
        let values: Vec<f64> = series.iter().map(|(_, s)| s.as_f64()).collect();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        out.push_str(&format!(
            "  {:<16} n={:<6} min={:>10.4} max={:>10.4}\n",
            channel,
            values.len(),
            min,
            max
        ));
    }
    out
}

fn list_channels(config: &AppConfig) {
    let enabled = config.enabled_channels();
    println!("{:<16} {:<14} {:<6} {}", "IDENTIFIER", "SENSOR", "UNIT", "ENABLED");
    for channel in ImuChannel::all() {
        println!(
            "{:<16} {:<14} {:<6} {}",
            channel.identifier(),
            channel.sensor.display_name(),
            channel.unit().symbol(),
            if enabled.contains(&channel) { "yes" } else { "no" }
        );
    }
}

fn init_config(config: &AppConfig, path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists, pass --force to overwrite", path.display());
    }
    config.save(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
