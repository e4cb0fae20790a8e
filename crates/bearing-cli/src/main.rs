//! `bearing-cli` – terminal simulator for the bearing AR overlay.
//!
//! 1. Loads `~/.bearing/config.toml`, writing the defaults on first run, and
//!    applies `BEARING_*` env overrides.
//! 2. Builds an [`ArSession`] over simulated geolocation, orientation, and
//!    consent sources.
//! 3. Drops the user into a slash-command REPL that feeds those sources.
//! 4. Intercepts **Ctrl-C** to stop every sensor subscription and exit.

mod config;
mod repl;

use colored::Colorize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use bearing_hal::sim::{SimConsent, SimGeolocation, SimOrientation};
use bearing_kernel::PermissionGate;
use bearing_runtime::{ArSession, ContentProvider, StaticContentProvider, telemetry};
use bearing_types::BearingError;
use parking_lot::Mutex;

fn main() {
    let _telemetry = telemetry::init_tracing("bearing");

    print_banner();

    if !config::config_path().exists() {
        match config::save(&config::Config::default()) {
            Ok(()) => println!(
                "  {} Default config written to {}",
                "✓".green().bold(),
                config::config_path().display().to_string().bold()
            ),
            Err(e) => println!("{}: {}", "Error saving config".red(), e),
        }
    }

    let cfg = match config::load() {
        Ok(cfg) => {
            println!(
                "  Config: {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };
    info!(?cfg, "configuration loaded");

    let content: Arc<dyn ContentProvider> = match cfg.content_file.as_deref().map(load_content) {
        Some(Ok(provider)) => Arc::new(provider),
        Some(Err(e)) => {
            println!("{}: {}", "Content error".red(), e);
            println!("  Using the demo payload.");
            Arc::new(StaticContentProvider::demo())
        }
        None => Arc::new(StaticContentProvider::demo()),
    };

    let gate = if cfg.require_consent {
        PermissionGate::new(Arc::new(SimConsent::granting()))
    } else {
        PermissionGate::unrestricted()
    };

    let geolocation = Arc::new(SimGeolocation::new());
    let orientation = Arc::new(SimOrientation::new());
    let session = match ArSession::new(
        geolocation.clone(),
        orientation.clone(),
        gate,
        content,
        cfg.session_config(),
    ) {
        Ok(session) => Arc::new(Mutex::new(session)),
        Err(e) => {
            eprintln!("{}: {}", "Failed to create session".red(), e);
            std::process::exit(1);
        }
    };

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    let session_for_ctrlc = session.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping sensors …".yellow().bold());
        session_for_ctrlc.lock().stop();
        println!("{}", "  ✓ All sensor subscriptions cancelled.".green());
        shutdown_clone.store(true, Ordering::SeqCst);
        std::process::exit(130);
    }) {
        warn!(error = %e, "failed to install Ctrl-C handler");
    }

    println!();
    println!("  Type {} for a list of commands.\n", "/help".bold().cyan());

    match repl::Shell::new(session, geolocation, orientation) {
        Ok(shell) => shell.run(shutdown),
        Err(e) => eprintln!("{}: {}", "Failed to start async runtime".red(), e),
    }
}

fn load_content(path: &Path) -> Result<StaticContentProvider, BearingError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| BearingError::Config(format!("failed to read {}: {e}", path.display())))?;
    StaticContentProvider::from_json(&raw)
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"    __                     _            "#.bold().cyan());
    println!("{}", r#"   / /_  ___  ____ ______(_)___  ____ _"#.bold().cyan());
    println!("{}", r#"  / __ \/ _ \/ __ `/ ___/ / __ \/ __ `/"#.bold().cyan());
    println!("{}", r#" / /_/ /  __/ /_/ / /  / / / / / /_/ / "#.bold().cyan());
    println!("{}", r#"/_.___/\___/\__,_/_/  /_/_/ /_/\__, /  "#.bold().cyan());
    println!("{}", r#"                              /____/   "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "bearing".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Face north, tap, and read what's there.");
    println!();
}
