use clap::Parser;
use serial_echo::config::{Config, ConfigLoader, ConfigResult, PortConfig};
use serial_echo::{
    logging, DiagnosticSink, EchoError, EchoResult, FlowStrategy, TracingSink, TransferEngine,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "serial-echo",
    version,
    about = "Echo every frame received on a serial line back to the sender.",
    long_about = "Reads up to one frame from a serial device, writes exactly those bytes back, and repeats until the line fails. RTS follows CTS between transfers. Values given here override the configuration file and SERIAL_ECHO_* environment variables."
)]
struct Args {
    /// Serial device to echo on.
    #[arg(short, long)]
    port: Option<String>,

    /// Line speed in baud.
    #[arg(short, long, alias = "baud_rate")]
    baud_rate: Option<u32>,

    /// Diagnostic level (0 - none, 1 - full).
    #[arg(short, long, alias = "debug_level")]
    debug_level: Option<u8>,

    /// Largest single transfer in bytes (1 to 4096).
    #[arg(long)]
    frame_size: Option<usize>,

    /// How RTS is driven between transfers.
    #[arg(long, value_enum)]
    flow_control: Option<FlowStrategy>,

    /// Log filter directive, e.g. "info" or "serial_echo=debug".
    #[arg(long)]
    log_level: Option<String>,

    /// Configuration file to use instead of the standard locations.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Args {
    /// Layer command-line values over the loaded configuration.
    fn apply(&self, config: &mut Config) {
        if let Some(ref port) = self.port {
            config.serial.port = Some(port.clone());
        }
        if let Some(baud_rate) = self.baud_rate {
            config.serial.baud_rate = Some(baud_rate);
        }
        if let Some(debug_level) = self.debug_level {
            config.serial.debug_level = debug_level;
        }
        if let Some(frame_size) = self.frame_size {
            config.serial.frame_size = frame_size;
        }
        if let Some(flow_control) = self.flow_control {
            config.serial.flow_control = flow_control;
        }
        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }
    }
}

/// Resolve the configuration, returning the file it came from, if any.
fn load_config(args: &Args) -> ConfigResult<(Config, Option<PathBuf>)> {
    let loader = match args.config {
        Some(ref path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load()?,
    };
    let source = loader.config_path.clone();

    let mut config = loader.into_config();
    args.apply(&mut config);
    Ok((config, source))
}

async fn serve(config: &Config, sink: Arc<dyn DiagnosticSink>) -> EchoResult<()> {
    let port_config = PortConfig::try_from(&config.serial)?;

    info!("Serial port device was set to {}", port_config.path());
    info!("Serial port device baud rate was set to {}", port_config.baud_rate());
    info!("Debug level was set to {}", port_config.debug_level());
    info!(
        frame_size = port_config.frame_size(),
        flow_control = %port_config.flow_strategy(),
        "Echo parameters"
    );

    info!("Opening port: {}", port_config.path());
    let mut engine = TransferEngine::open(port_config, sink)?;
    engine.run().await
}

/// Print the fatal report on stderr and hand it to the diagnostic sink.
///
/// stderr is written directly so the report survives a filter that mutes
/// the sink (`RUST_LOG=off`).
fn report_fatal(err: &EchoError, sink: &dyn DiagnosticSink, stderr: &mut impl Write) {
    let report = err.report();
    let _ = writeln!(stderr, "{report}");
    sink.error(&report);
}

// --- Main Application Entry Point ---
#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let (config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", EchoError::from(e).report());
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::install(&config.logging) {
        eprintln!("{}", EchoError::from(e).report());
        return ExitCode::FAILURE;
    }

    if let Some(path) = source {
        info!("Loaded configuration from {}", path.display());
    }

    let sink: Arc<dyn DiagnosticSink> = Arc::new(TracingSink);
    match serve(&config, Arc::clone(&sink)).await {
        Ok(()) => {
            info!("Closing port");
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_fatal(&e, sink.as_ref(), &mut io::stderr());
            ExitCode::FAILURE
        }
    }
}
