//! keytrace CLI
//!
//! Transparent foreground keystroke transcript recorder.

use anyhow::Context;
use clap::{Parser, Subcommand};
use keytrace::{
    capture::{CaptureConfig, KeyCapture},
    config::Config,
    session::{CaptureSession, SessionInfo, SessionLogger},
    translate::KeyTranslator,
    OPERATOR_NOTICE, VERSION,
};
use std::fs::OpenOptions;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const SUMMARY_RULE: &str = "══════════════════════════════════════";

#[derive(Parser)]
#[command(name = "keytrace")]
#[command(version = VERSION)]
#[command(about = "Transparent foreground keystroke transcript recorder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start recording keystrokes until the stop key or Ctrl+C
    Start {
        /// Transcript file to append to (overrides the configured path)
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Function key that ends the session (F1 through F12)
        #[arg(long)]
        stop_key: Option<String>,
    },

    /// Display the operator notice
    Notice,

    /// Show configuration
    Config {
        /// Write a default configuration file
        #[arg(long)]
        init: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start { log_file, stop_key } => cmd_start(log_file, stop_key),
        Commands::Notice => {
            cmd_notice();
            Ok(())
        }
        Commands::Config { init } => cmd_config(init),
    }
}

fn cmd_start(log_file: Option<PathBuf>, stop_key: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load().unwrap_or_default();
    if let Some(path) = log_file {
        config.log_path = path;
    }
    if let Some(name) = stop_key {
        config.stop_key = name;
    }

    let stop_code = config.stop_key_code().context("invalid stop key")?;

    config
        .ensure_log_dir()
        .with_context(|| format!("could not create directory for {:?}", config.log_path))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| format!("could not open transcript file {:?}", config.log_path))?;

    let info = SessionInfo::gather(config.log_path.clone());

    println!("keytrace v{VERSION}");
    println!();
    println!("This process records every keystroke typed on this machine,");
    println!("including passwords, until it is stopped.");
    println!("Run `keytrace notice` for the full operator notice.");
    println!();
    println!("  Transcript: {:?}", config.log_path);
    println!("  Session:    {}", info.session_id);
    println!("  Stop key:   {}", config.stop_key);
    println!();
    println!("Recording. Press {} or Ctrl+C to stop.", config.stop_key);

    // Set up Ctrl+C handler
    let interrupt = Arc::new(AtomicBool::new(false));
    ctrlc_handler(interrupt.clone());

    let capture = KeyCapture::new(CaptureConfig {
        stop_key: stop_code,
    });
    let logger = SessionLogger::new(BufWriter::new(file));
    let mut session = CaptureSession::new(capture, KeyTranslator::new(), logger, info);

    let summary = session.run(&interrupt).context("capture session failed")?;

    println!();
    println!("Capture stopped.");
    println!();
    println!("Session summary:");
    println!("{SUMMARY_RULE}");
    println!("  Duration:         {}", summary.duration_display());
    println!("  Total keystrokes: {}", summary.event_count);
    println!(
        "  Average rate:     {:.2} keys/min",
        summary.events_per_minute()
    );
    println!("  Transcript:       {:?}", config.log_path);
    println!("{SUMMARY_RULE}");

    Ok(())
}

fn cmd_notice() {
    println!("{OPERATOR_NOTICE}");
}

fn cmd_config(init: bool) -> anyhow::Result<()> {
    if init {
        let config = Config::default();
        config.save().context("could not write configuration")?;
        println!("Wrote default configuration to {:?}", Config::config_path());
        return Ok(());
    }

    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );

    Ok(())
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(interrupt: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        interrupt.store(true, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
