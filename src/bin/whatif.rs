//! What-If Risk Simulator
//!
//! Hosts one simulator session in the terminal:
//! - TOML config file with CLI overrides
//! - Slider moves read from stdin (`age 55`, `weight=92`, `quit`)
//! - Boosted risk chart redrawn on stdout after every completed cycle
//! - Structured logging with tracing on stderr
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin whatif -- --base-url http://127.0.0.1:5000
//! cargo run --bin whatif -- --offline --policy latest-dispatch-wins
//! cargo run --bin whatif -- boost 0.5 60 100
//! ```

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tracing::{error, info, warn};

use whatif_risk_sim::{
    init_logging, AppConfig, ControlEvent, Error, HttpPredictionClient, LogFormat, OfflineModel,
    PredictionClient, SequencingPolicy, SimulationController, Slider, TerminalChart,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser)]
#[command(name = "whatif")]
#[command(version, about = "What-if diabetes risk simulator", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "whatif.toml")]
    config: String,

    /// Prediction service base URL
    #[arg(long, env = "WHATIF_BASE_URL")]
    base_url: Option<String>,

    /// Route of the what-if prediction endpoint
    #[arg(long)]
    path: Option<String>,

    /// Per-request timeout in milliseconds (default: none)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Use the built-in offline model instead of the remote service
    #[arg(long)]
    offline: bool,

    /// How overlapping prediction cycles are reconciled
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Width of the chart bars in characters
    #[arg(long, default_value = "40")]
    chart_width: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output format (pretty, json, compact)
    #[arg(long)]
    log_format: Option<String>,

    /// Log file path (JSON lines, rotated daily)
    #[arg(long)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    LastCompletedWins,
    LatestDispatchWins,
}

impl From<PolicyArg> for SequencingPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::LastCompletedWins => SequencingPolicy::LastCompletedWins,
            PolicyArg::LatestDispatchWins => SequencingPolicy::LatestDispatchWins,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive session (default)
    Run,
    /// Generate a sample config file
    GenerateConfig {
        /// Output file path
        #[arg(short, long, default_value = "whatif.toml")]
        output: String,
    },
    /// Validate config without running
    ValidateConfig,
    /// Print the boosted value for a raw probability
    Boost {
        probability: f64,
        age: f64,
        weight: f64,
    },
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::GenerateConfig { output }) => {
            generate_sample_config(output)?;
            return Ok(());
        }
        Some(Commands::ValidateConfig) => {
            let config = load_config(&cli)?;
            config.validate()?;
            println!("Configuration is valid:\n{:#?}", config);
            return Ok(());
        }
        Some(Commands::Boost {
            probability,
            age,
            weight,
        }) => {
            let config = load_config(&cli)?;
            let boosted = config.simulation.boost.apply(*probability, *age, *weight);
            println!(
                "multiplier={:.4} boosted={:.4}",
                config.simulation.boost.multiplier(*age, *weight),
                boosted
            );
            return Ok(());
        }
        Some(Commands::Run) | None => {}
    }

    let config = load_config(&cli)?;
    let _log_guard = init_logging(&config.logging)?;

    // Missing controls leave the simulator inert rather than crashing
    if let Err(e) = config.validate() {
        error!(error = %e, "What-if simulator inert: setup precondition failed");
        return Ok(());
    }

    let client = build_client(&cli, &config)?;
    let surface = TerminalChart::stdout(cli.chart_width);
    let mut controller = match SimulationController::new(
        config.sliders.clone(),
        &config.simulation,
        client,
        surface,
    ) {
        Ok(controller) => controller,
        Err(e) => {
            error!(error = %e, "What-if simulator inert: controller setup failed");
            return Ok(());
        }
    };

    let (tx, mut rx) = unbounded_channel();
    tokio::spawn(read_stdin_commands(tx));

    eprintln!("Move sliders with `<age|weight|insulin> <value>`, `quit` to stop.");
    let summary = controller.run(&mut rx).await;
    info!(
        dispatched = summary.cycles_dispatched,
        applied = summary.cycles_applied,
        failed = summary.cycles_failed,
        stale = summary.cycles_stale,
        "Session summary"
    );

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Load the config file and fold CLI overrides into it.
fn load_config(cli: &Cli) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = AppConfig::load(&cli.config)?;

    if let Some(ref base_url) = cli.base_url {
        config.endpoint.base_url = base_url.clone();
    }
    if let Some(ref path) = cli.path {
        config.endpoint.path = path.clone();
    }
    if cli.timeout_ms.is_some() {
        config.endpoint.timeout_ms = cli.timeout_ms;
    }
    if let Some(policy) = cli.policy {
        config.simulation.sequencing = policy.into();
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.logging.format = format.parse::<LogFormat>()?;
    }
    if let Some(ref file) = cli.log_file {
        config.logging.log_file = Some(file.into());
    }

    Ok(config)
}

fn build_client(
    cli: &Cli,
    config: &AppConfig,
) -> Result<Arc<dyn PredictionClient>, Box<dyn std::error::Error>> {
    if cli.offline {
        info!("Using offline model");
        return Ok(Arc::new(OfflineModel::new(config.offline.clone())));
    }

    let client = HttpPredictionClient::new(
        config.endpoint.base_url.clone(),
        config.endpoint.path.clone(),
        config.endpoint.timeout(),
    )?;
    info!(endpoint = %client.endpoint(), "Using remote prediction service");
    Ok(Arc::new(client))
}

/// Parse one stdin line into a control event.
///
/// Returns `Ok(None)` for blank lines.
fn parse_command(line: &str) -> Result<Option<ControlEvent>, Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if matches!(line, "quit" | "exit" | "q") {
        return Ok(Some(ControlEvent::Shutdown));
    }

    let (name, value) = line
        .split_once(|c: char| c == '=' || c.is_whitespace())
        .ok_or_else(|| Error::config(format!("expected `<slider> <value>`, got '{line}'")))?;
    let slider: Slider = name.parse()?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("not a number: '{}'", value.trim())))?;

    Ok(Some(ControlEvent::Input { slider, value }))
}

async fn read_stdin_commands(tx: UnboundedSender<ControlEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_command(&line) {
                Ok(Some(event)) => {
                    let shutdown = event == ControlEvent::Shutdown;
                    if tx.send(event).is_err() || shutdown {
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Ignoring input line"),
            },
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Failed to read stdin");
                return;
            }
        }
    }
}

fn generate_sample_config(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let sample = AppConfig::default();
    let content = sample.to_toml()?;

    let with_comments = format!(
        r#"# What-If Risk Simulator Configuration
# See: cargo run --bin whatif -- --help

{}
"#,
        content
    );

    std::fs::write(path, with_comments)?;
    println!("Sample config written to: {}", path);
    Ok(())
}
