use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::data::aggregate::GlobalTotals;
use crate::server;
use crate::view::controller::{CurrentWeek, InteractionController};
use crate::view::selector::Variable;

const USAGE: &str = "usage: covid-tracker [serve|summary] [--debug]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation {
    pub command: Command,
    pub debug: bool,
}

/// `args[0]` is the program name. No subcommand means `serve`.
pub fn parse_args(args: &[String]) -> Option<Invocation> {
    let mut command = None;
    let mut debug = false;
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--debug" | "-d" => debug = true,
            "serve" if command.is_none() => command = Some(Command::Serve),
            "summary" if command.is_none() => command = Some(Command::Summary),
            _ => return None,
        }
    }
    Some(Invocation {
        command: command.unwrap_or(Command::Serve),
        debug,
    })
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(invocation) = parse_args(args) else {
        eprintln!("{USAGE}");
        return 2;
    };

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            init_tracing(invocation.debug);
            error!(%err, "invalid configuration");
            eprintln!("configuration error: {err}");
            return 1;
        }
    };
    config.debug |= invocation.debug;
    init_tracing(config.debug);

    match invocation.command {
        Command::Serve => handle_serve(&config),
        Command::Summary => handle_summary(&config),
    }
}

/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--debug`.
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_dashboard(config: &Config) -> Option<std::sync::Arc<Dashboard>> {
    match Dashboard::load(config) {
        Ok(dashboard) => Some(dashboard),
        Err(err) => {
            error!(%err, "startup failed");
            eprintln!("startup failed: {err}");
            None
        }
    }
}

fn handle_serve(config: &Config) -> i32 {
    let Some(dashboard) = load_dashboard(config) else {
        return 1;
    };
    info!(bind = %config.bind_addr, "starting server");
    match server::run_server(&config.bind_addr, dashboard) {
        Ok(()) => 0,
        Err(err) => {
            error!(%err, "server error");
            eprintln!("server error: {err}");
            1
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub region: String,
    pub records: usize,
    pub countries: usize,
    pub weeks: usize,
    pub totals: GlobalTotals,
    pub last_week: Vec<CurrentWeek>,
}

pub fn build_summary(dashboard: &Dashboard) -> SummaryReport {
    let mut controller = InteractionController::new(dashboard);
    let last_week = Variable::ALL
        .into_iter()
        .filter_map(|variable| {
            controller.on_variable_changed(variable);
            controller.render().ok().map(|update| update.current_week)
        })
        .collect();

    SummaryReport {
        region: dashboard.world_location().to_string(),
        records: dashboard.record_count(),
        countries: dashboard.snapshot().len(),
        weeks: dashboard.weekly().len(),
        totals: *dashboard.totals(),
        last_week,
    }
}

fn handle_summary(config: &Config) -> i32 {
    let Some(dashboard) = load_dashboard(config) else {
        return 1;
    };
    match serde_json::to_string_pretty(&build_summary(&dashboard)) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize summary: {err}");
            1
        }
    }
}
