//! Colorful console output for protocol runs.
//!
//! Provides a custom `tracing` layer that renders run events as one line each.
//!
//! ## Log Levels
//!
//! - **INFO**: Protocol setup, run start/end, one line per mixture
//! - **DEBUG**: Individual transfers
//! - **WARN**: Tips released before the run
//! - **ERROR**: Aborted runs
//!
//! Set `RUST_LOG=platemix_runner=debug` to see every transfer.

use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();
static RUN_START_NANOS: AtomicU64 = AtomicU64::new(0);

const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_FILTER: &str = "platemix_runner=info,platemix_robot=warn";

/// Initializes console output.
///
/// Safe to call multiple times - only the first call has effect.
/// `RUST_LOG` overrides the default filter.
pub fn init() {
    INIT.get_or_init(|| {
        print_banner();

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(RunConsoleLayer)
            .try_init();
    });
}

fn mark_run_start() {
    let epoch = EPOCH.get_or_init(Instant::now);
    let nanos = epoch.elapsed().as_nanos() as u64;
    RUN_START_NANOS.store(nanos, Ordering::Relaxed);
}

fn elapsed_secs() -> f64 {
    let Some(epoch) = EPOCH.get() else {
        return 0.0;
    };
    let start_nanos = RUN_START_NANOS.load(Ordering::Relaxed);
    let now_nanos = epoch.elapsed().as_nanos() as u64;
    now_nanos.saturating_sub(start_nanos) as f64 / 1_000_000_000.0
}

fn print_banner() {
    let banner = format!("PlateMix v{} - combinatorial mixture runner", VERSION);
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "\n{}\n", banner.bright_cyan().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats run events with colors.
pub struct RunConsoleLayer;

impl<S: Subscriber> Layer<S> for RunConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();

        if !target.starts_with("platemix_runner")
            && !target.starts_with("platemix_robot")
            && !target.starts_with("platemix::")
        {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Debug, Default)]
struct EventVisitor {
    event: Option<String>,
    protocol: Option<String>,
    api_level: Option<String>,
    mixture_count: Option<u64>,
    well_capacity: Option<u64>,
    instrument_count: Option<u64>,
    index: Option<u64>,
    well: Option<String>,
    mixture: Option<String>,
    reagent: Option<String>,
    volume: Option<u64>,
    instrument: Option<String>,
    mixtures_placed: Option<u64>,
    transfers: Option<u64>,
    error: Option<String>,
}

impl EventVisitor {
    fn set_text(&mut self, name: &str, value: String) {
        match name {
            "event" => self.event = Some(value),
            "protocol" => self.protocol = Some(value),
            "api_level" => self.api_level = Some(value),
            "well" => self.well = Some(value),
            "mixture" => self.mixture = Some(value),
            "reagent" => self.reagent = Some(value),
            "instrument" => self.instrument = Some(value),
            "error" => self.error = Some(value),
            _ => {}
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.set_text(field.name(), s.trim_matches('"').to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "mixture_count" => self.mixture_count = Some(value),
            "well_capacity" => self.well_capacity = Some(value),
            "instrument_count" => self.instrument_count = Some(value),
            "index" => self.index = Some(value),
            "volume" => self.volume = Some(value),
            "mixtures_placed" => self.mixtures_placed = Some(value),
            "transfers" => self.transfers = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value as u64);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.set_text(field.name(), value.to_string());
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    match v.event.as_deref().unwrap_or("") {
        "protocol_setup" => format_protocol_setup(v),
        "run_start" => format_run_start(v),
        "mixture" => format_mixture(v),
        "transfer" if level <= Level::DEBUG => format_transfer(v),
        "leftover_tip" => format_leftover_tip(v),
        "run_end" => format_run_end(v),
        "run_aborted" => format_run_aborted(v),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn format_protocol_setup(v: &EventVisitor) -> String {
    let protocol = v.protocol.as_deref().unwrap_or("Unnamed protocol");
    let api_level = v.api_level.as_deref().unwrap_or("?");

    format!(
        "{} {} {} │ API {}",
        format_elapsed(),
        "⚙".bright_blue(),
        protocol.white().bold(),
        api_level.bright_yellow()
    )
}

fn format_run_start(v: &EventVisitor) -> String {
    mark_run_start();
    let mixtures = v.mixture_count.unwrap_or(0);
    let wells = v.well_capacity.unwrap_or(0);

    let mut output = format!(
        "{} {} Placing │ {} mixtures │ {} wells free",
        format_elapsed(),
        "▶".bright_green().bold(),
        mixtures.bright_yellow(),
        wells.bright_yellow(),
    );

    if let Some(instruments) = v.instrument_count {
        output.push_str(&format!(" │ {} instruments", instruments.bright_yellow()));
    }

    output
}

fn format_mixture(v: &EventVisitor) -> String {
    let index = v.index.unwrap_or(0);
    let well = v.well.as_deref().unwrap_or("?");
    let mixture = v.mixture.as_deref().unwrap_or("");

    format!(
        "{} {} #{:<4} {:>4} │ {}",
        format_elapsed(),
        "●".bright_cyan(),
        index.white(),
        well.bright_magenta().bold(),
        mixture
    )
}

fn format_transfer(v: &EventVisitor) -> String {
    let reagent = v.reagent.as_deref().unwrap_or("?");
    let volume = v.volume.unwrap_or(0);
    let instrument = v.instrument.as_deref().unwrap_or("?");

    format!(
        "{}     {} {} uL {} │ {}",
        format_elapsed(),
        "↳".bright_black(),
        volume.bright_yellow(),
        reagent.white(),
        instrument.bright_black()
    )
}

fn format_leftover_tip(v: &EventVisitor) -> String {
    let instrument = v.instrument.as_deref().unwrap_or("?");

    format!(
        "{} {} Dropped leftover tip │ {}",
        format_elapsed(),
        "!".bright_yellow().bold(),
        instrument
    )
}

fn format_run_end(v: &EventVisitor) -> String {
    let placed = v.mixtures_placed.unwrap_or(0);
    let transfers = v.transfers.unwrap_or(0);

    format!(
        "{} {} Run complete │ {} mixtures │ {} transfers",
        format_elapsed(),
        "■".bright_cyan().bold(),
        placed.bright_green().bold(),
        transfers.bright_green()
    )
}

fn format_run_aborted(v: &EventVisitor) -> String {
    let index = v.index.unwrap_or(0);
    let error = v.error.as_deref().unwrap_or("unknown error");

    format!(
        "{} {} Run aborted at mixture {} │ {}",
        format_elapsed(),
        "✗".bright_red().bold(),
        index,
        error.bright_red()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visitor(event: &str) -> EventVisitor {
        EventVisitor {
            event: Some(event.to_string()),
            ..EventVisitor::default()
        }
    }

    #[test]
    fn test_run_start_line() {
        let v = EventVisitor {
            mixture_count: Some(66),
            well_capacity: Some(96),
            instrument_count: Some(2),
            ..visitor("run_start")
        };
        let line = format_event(&v, Level::INFO);
        assert!(line.contains("Placing"));
        assert!(line.contains("66"));
        assert!(line.contains("96"));
        assert!(line.contains("instruments"));
    }

    #[test]
    fn test_mixture_line() {
        let v = EventVisitor {
            index: Some(11),
            well: Some("D2".to_string()),
            mixture: Some("{Reagent_A: 10, Reagent_B: 0, Reagent_C: 90}".to_string()),
            ..visitor("mixture")
        };
        let line = format_event(&v, Level::INFO);
        assert!(line.contains("D2"));
        assert!(line.contains("{Reagent_A: 10, Reagent_B: 0, Reagent_C: 90}"));
    }

    #[test]
    fn test_transfer_line() {
        let v = EventVisitor {
            reagent: Some("Reagent_B".to_string()),
            volume: Some(40),
            instrument: Some("flex_1channel_50 (right)".to_string()),
            ..visitor("transfer")
        };
        let line = format_event(&v, Level::DEBUG);
        assert!(line.contains("Reagent_B"));
        assert!(line.contains("flex_1channel_50 (right)"));
        assert!(format_event(&v, Level::TRACE).is_empty());
    }

    #[test]
    fn test_run_end_and_abort_lines() {
        let end = EventVisitor {
            mixtures_placed: Some(66),
            transfers: Some(153),
            ..visitor("run_end")
        };
        assert!(format_event(&end, Level::INFO).contains("Run complete"));

        let aborted = EventVisitor {
            index: Some(4),
            error: Some("no free well".to_string()),
            ..visitor("run_aborted")
        };
        let line = format_event(&aborted, Level::ERROR);
        assert!(line.contains("mixture 4"));
        assert!(line.contains("no free well"));
    }

    #[test]
    fn test_unknown_events_are_silent() {
        assert!(format_event(&visitor("mixture_generated"), Level::TRACE).is_empty());
        assert!(format_event(&EventVisitor::default(), Level::INFO).is_empty());
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }
}
