//! REPL – drives a simulated AR session from the terminal.
//!
//! Supported slash-commands:
//!   /start                 – begin the AR session (geolocation watch)
//!   /stop                  – cancel every sensor subscription
//!   /enable                – request orientation access and subscribe
//!   /fix <lat> <lon> [acc] – deliver a position fix
//!   /geoerr                – deliver a position failure
//!   /heading <deg>         – deliver a compass-heading sample
//!   /alpha <deg>           – deliver an alpha-only sample
//!   /orient <a> <b> <g>    – deliver a full alpha/beta/gamma sample
//!   /tap                   – tap the reveal affordance
//!   /swipe <dy>            – complete a vertical drag (positive = down)
//!   /close                 – close the overlay
//!   /hud                   – print the sensor readout
//!   /help                  – show this list
//!   /quit | /exit          – stop sensors and exit

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bearing_hal::GeolocationError;
use bearing_hal::sim::{SimGeolocation, SimOrientation};
use bearing_runtime::{ArSession, OrientationActivation};
use bearing_types::{OrientationSample, OverlayState, PropertySnapshot};
use parking_lot::Mutex;

const DEFAULT_ACCURACY_METERS: f64 = 5.0;

// ─────────────────────────────────────────────────────────────────────────────
// Command parsing
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Stop,
    Enable,
    Fix {
        latitude: f64,
        longitude: f64,
        accuracy: f64,
    },
    GeoError,
    Heading(f64),
    Alpha(f64),
    Orient {
        alpha: f64,
        beta: f64,
        gamma: f64,
    },
    Tap,
    Swipe(f64),
    Close,
    Hud,
    Help,
    Quit,
}

fn number(args: &[&str], index: usize, name: &str) -> Result<f64, String> {
    let raw = args.get(index).ok_or_else(|| format!("missing <{name}>"))?;
    raw.parse::<f64>()
        .map_err(|_| format!("<{name}> must be a number, got '{raw}'"))
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((head, args)) = words.split_first() else {
            return Err("empty command".to_string());
        };

        let cmd = match *head {
            "/start" => Self::Start,
            "/stop" => Self::Stop,
            "/enable" => Self::Enable,
            "/fix" => Self::Fix {
                latitude: number(args, 0, "lat")?,
                longitude: number(args, 1, "lon")?,
                accuracy: if args.len() > 2 {
                    number(args, 2, "acc")?
                } else {
                    DEFAULT_ACCURACY_METERS
                },
            },
            "/geoerr" => Self::GeoError,
            "/heading" => Self::Heading(number(args, 0, "deg")?),
            "/alpha" => Self::Alpha(number(args, 0, "deg")?),
            "/orient" => Self::Orient {
                alpha: number(args, 0, "a")?,
                beta: number(args, 1, "b")?,
                gamma: number(args, 2, "g")?,
            },
            "/tap" => Self::Tap,
            "/swipe" => Self::Swipe(number(args, 0, "dy")?),
            "/close" => Self::Close,
            "/hud" => Self::Hud,
            "/help" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            other => return Err(format!("unknown command '{other}'")),
        };
        Ok(cmd)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shell
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The simulated platform plus the session it feeds.
pub struct Shell {
    pub session: Arc<Mutex<ArSession>>,
    pub geolocation: Arc<SimGeolocation>,
    pub orientation: Arc<SimOrientation>,
    runtime: tokio::runtime::Runtime,
}

impl Shell {
    pub fn new(
        session: Arc<Mutex<ArSession>>,
        geolocation: Arc<SimGeolocation>,
        orientation: Arc<SimOrientation>,
    ) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        Ok(Self {
            session,
            geolocation,
            orientation,
            runtime,
        })
    }

    pub fn execute(&self, cmd: Command) -> Flow {
        match cmd {
            Command::Start => {
                self.session.lock().start();
                println!("{}", "AR session started.".green());
            }
            Command::Stop => {
                self.session.lock().stop();
                println!("{}", "Sensors stopped.".yellow());
            }
            Command::Enable => self.cmd_enable(),
            Command::Fix {
                latitude,
                longitude,
                accuracy,
            } => {
                let delivered = self
                    .geolocation
                    .push_coordinates(latitude, longitude, accuracy);
                report_delivery("fix", delivered);
            }
            Command::GeoError => {
                let delivered = self.geolocation.push_error(GeolocationError::PositionUnavailable(
                    "simulated failure".to_string(),
                ));
                report_delivery("failure", delivered);
            }
            Command::Heading(deg) => self.push_orientation(OrientationSample::from_compass(deg)),
            Command::Alpha(deg) => self.push_orientation(OrientationSample::from_alpha(deg)),
            Command::Orient { alpha, beta, gamma } => self.push_orientation(OrientationSample {
                alpha: Some(alpha),
                beta: Some(beta),
                gamma: Some(gamma),
                compass_heading: None,
            }),
            Command::Tap => {
                let mut session = self.session.lock();
                let state = session.tap();
                print_overlay(state, session.content());
            }
            Command::Swipe(dy) => {
                let mut session = self.session.lock();
                let state = session.swipe(dy);
                print_overlay(state, session.content());
            }
            Command::Close => {
                let state = self.session.lock().close();
                print_overlay(state, None);
            }
            Command::Hud => self.cmd_hud(),
            Command::Help => cmd_help(),
            Command::Quit => {
                self.session.lock().stop();
                println!("{}", "Goodbye.".green());
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    fn cmd_enable(&self) {
        let mut session = self.session.lock();
        let activation = self.runtime.block_on(session.enable_orientation());
        match activation {
            OrientationActivation::Subscribed(decision) => {
                println!("{} ({decision:?})", "Orientation enabled.".green())
            }
            OrientationActivation::AlreadySubscribed => {
                println!("{}", "Orientation already enabled.".dimmed())
            }
            OrientationActivation::Denied => println!(
                "{}",
                "Orientation access denied. Run /enable to ask again.".red()
            ),
            OrientationActivation::NotRunning => {
                println!("{} Run {} first.", "Session not started.".yellow(), "/start".bold())
            }
            OrientationActivation::Cancelled => {
                println!("{}", "Session stopped before access resolved.".yellow())
            }
            OrientationActivation::Unavailable => {
                println!("{}", "Orientation sensor unavailable.".red())
            }
        }
    }

    fn push_orientation(&self, sample: OrientationSample) {
        let delivered = self.orientation.push(sample);
        report_delivery("orientation sample", delivered);
        if delivered > 0 && self.session.lock().affordance_visible() {
            println!("  {} Facing target. {} to reveal.", "◎".cyan().bold(), "/tap".bold());
        }
    }

    fn cmd_hud(&self) {
        let mut session = self.session.lock();
        let hud = session.hud();
        println!();
        for line in hud.to_string().lines() {
            println!("  {line}");
        }
        if !hud.orientation_enabled {
            println!("  {} to enable orientation", "/enable".bold().cyan());
        }
        println!("  Overlay:  {:?}", session.overlay_state());
        println!();
    }

    /// Read commands from stdin until EOF, `/quit`, or `shutdown` is set.
    pub fn run(&self, shutdown: Arc<AtomicBool>) {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            if shutdown.load(Ordering::SeqCst) {
                break;
            }

            print!("{} ", "bearing>".bold().cyan());
            stdout.flush().ok();

            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) => {
                    self.session.lock().stop();
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("{}: {}", "Read error".red(), e);
                    break;
                }
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match Command::parse(line) {
                Ok(cmd) => {
                    if self.execute(cmd) == Flow::Quit {
                        shutdown.store(true, Ordering::SeqCst);
                        break;
                    }
                }
                Err(e) => println!(
                    "{} {}. Type {} for available commands.",
                    "Error:".red(),
                    e.yellow(),
                    "/help".bold()
                ),
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output helpers
// ─────────────────────────────────────────────────────────────────────────────

fn report_delivery(what: &str, delivered: usize) {
    if delivered == 0 {
        println!("  {} {what} dropped: no active subscription", "·".dimmed());
    } else {
        println!("  {} {what} delivered", "✓".green());
    }
}

fn print_overlay(state: OverlayState, content: Option<&PropertySnapshot>) {
    match (state, content) {
        (OverlayState::Revealed, Some(snap)) => {
            println!();
            println!("  {}", snap.building_name.bold().underline());
            println!("  {}", snap.location.dimmed());
            println!(
                "  {}: {} {} (confidence: {})",
                snap.estimate.kind,
                snap.estimate.amount.bold(),
                snap.estimate.currency,
                snap.estimate.confidence
            );
            println!(
                "  Projection: 1y {} · 5y {} · trend {}",
                snap.projection.one_year, snap.projection.five_year, snap.projection.trend
            );
            println!("  Grocery: {}", snap.nearby_grocery.join(", "));
            println!("  Schools: {}", snap.nearby_schools.join(", "));
            println!("  {}", "/swipe <dy> or /close to dismiss".dimmed());
            println!();
        }
        (OverlayState::Revealed, None) => println!("  Overlay: {}", "revealed".green()),
        (OverlayState::Hidden, _) => println!("  Overlay: {}", "hidden".dimmed()),
    }
}

fn cmd_help() {
    println!();
    println!("{}", "Bearing Commands".bold().underline());
    println!("  {}                 – begin the AR session", "/start".bold().cyan());
    println!("  {}                  – stop all sensors", "/stop".bold().cyan());
    println!("  {}                – request orientation access", "/enable".bold().cyan());
    println!("  {} – simulate a position fix", "/fix <lat> <lon> [acc]".bold().cyan());
    println!("  {}                – simulate a position failure", "/geoerr".bold().cyan());
    println!("  {}         – simulate a compass heading", "/heading <deg>".bold().cyan());
    println!("  {}           – simulate an alpha-only sample", "/alpha <deg>".bold().cyan());
    println!("  {}    – simulate a full orientation sample", "/orient <a> <b> <g>".bold().cyan());
    println!("  {}                   – tap the reveal affordance", "/tap".bold().cyan());
    println!("  {}            – drag the overlay (positive = down)", "/swipe <dy>".bold().cyan());
    println!("  {}                 – close the overlay", "/close".bold().cyan());
    println!("  {}                   – print the sensor readout", "/hud".bold().cyan());
    println!("  {}          – exit", "/quit  /exit".bold().cyan());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use bearing_hal::sim::SimConsent;
    use bearing_kernel::PermissionGate;
    use bearing_runtime::{SessionConfig, StaticContentProvider};

    fn shell(gate: PermissionGate) -> Shell {
        let geolocation = Arc::new(SimGeolocation::new());
        let orientation = Arc::new(SimOrientation::new());
        let session = ArSession::new(
            geolocation.clone(),
            orientation.clone(),
            gate,
            Arc::new(StaticContentProvider::demo()),
            SessionConfig::default(),
        )
        .unwrap();
        Shell::new(Arc::new(Mutex::new(session)), geolocation, orientation).unwrap()
    }

    #[test]
    fn parses_every_command() {
        assert_eq!(Command::parse("/start"), Ok(Command::Start));
        assert_eq!(Command::parse("  /tap  "), Ok(Command::Tap));
        assert_eq!(Command::parse("/exit"), Ok(Command::Quit));
        assert_eq!(Command::parse("/heading -10"), Ok(Command::Heading(-10.0)));
        assert_eq!(Command::parse("/swipe 120.5"), Ok(Command::Swipe(120.5)));
        assert_eq!(
            Command::parse("/orient 1 2 3"),
            Ok(Command::Orient {
                alpha: 1.0,
                beta: 2.0,
                gamma: 3.0
            })
        );
    }

    #[test]
    fn fix_accuracy_is_optional() {
        assert_eq!(
            Command::parse("/fix 43.7 -79.2"),
            Ok(Command::Fix {
                latitude: 43.7,
                longitude: -79.2,
                accuracy: DEFAULT_ACCURACY_METERS
            })
        );
        assert_eq!(
            Command::parse("/fix 43.7 -79.2 12"),
            Ok(Command::Fix {
                latitude: 43.7,
                longitude: -79.2,
                accuracy: 12.0
            })
        );
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(Command::parse("/heading").is_err());
        assert!(Command::parse("/heading north").is_err());
        assert!(Command::parse("/fix 43.7").is_err());
        assert!(Command::parse("/launch").is_err());
        assert!(Command::parse("").is_err());
    }

    #[test]
    fn scripted_session_reveals_and_dismisses() {
        let sh = shell(PermissionGate::new(Arc::new(SimConsent::granting())));
        for line in ["/start", "/enable", "/fix 43.77 -79.23", "/heading -10", "/tap"] {
            assert_eq!(sh.execute(Command::parse(line).unwrap()), Flow::Continue);
        }
        assert_eq!(sh.session.lock().overlay_state(), OverlayState::Revealed);
        assert_eq!(sh.session.lock().hud().heading, "350°");

        sh.execute(Command::Swipe(150.0));
        assert_eq!(sh.session.lock().overlay_state(), OverlayState::Hidden);
    }

    #[test]
    fn quit_stops_every_sensor() {
        let sh = shell(PermissionGate::unrestricted());
        sh.execute(Command::Start);
        sh.execute(Command::Enable);
        assert_eq!(sh.geolocation.active_watches(), 1);
        assert_eq!(sh.orientation.active_listeners(), 1);

        assert_eq!(sh.execute(Command::Quit), Flow::Quit);
        assert_eq!(sh.geolocation.active_watches(), 0);
        assert_eq!(sh.orientation.active_listeners(), 0);
    }

    #[test]
    fn samples_before_start_are_dropped() {
        let sh = shell(PermissionGate::unrestricted());
        sh.execute(Command::Heading(0.0));
        sh.execute(Command::Tap);
        assert_eq!(sh.session.lock().overlay_state(), OverlayState::Hidden);
    }
}
