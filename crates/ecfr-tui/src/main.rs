use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ratatui::Terminal;
use ratatui::crossterm::event;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use ecfr_core::{Config, DashboardBackend, HttpBackend, config_file};

mod action;
mod app;
mod backend;
mod input;
mod model;
mod theme;
mod tui_event;
mod view;

use app::App;

/// eCFR corrections dashboard: browse titles, fetch their data and chart corrections.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Title registry listing URL
    #[arg(long)]
    registry_url: Option<String>,

    /// Base URL of the acquisition service (title number is appended)
    #[arg(long)]
    acquisition_url: Option<String>,

    /// Base URL of the corrections service (title number is appended)
    #[arg(long)]
    corrections_url: Option<String>,

    /// Per-request timeout in seconds (0 disables)
    #[arg(long)]
    request_timeout: Option<u64>,

    /// Color theme: default or mono
    #[arg(long)]
    theme: Option<String>,

    /// Directory for the log file
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

/// Resolve config from CLI flags > env vars > config file > defaults.
fn resolve_config(args: &Args, file: &config_file::ConfigFile) -> Config {
    let mut config = Config::default();
    file.apply_to(&mut config);

    let endpoints = &mut config.endpoints;
    for (flag, var, slot) in [
        (&args.registry_url, "ECFR_REGISTRY_URL", &mut endpoints.registry_url),
        (&args.acquisition_url, "ECFR_ACQUISITION_URL", &mut endpoints.acquisition_url),
        (&args.corrections_url, "ECFR_CORRECTIONS_URL", &mut endpoints.corrections_url),
    ] {
        if let Some(url) = flag.clone().or_else(|| std::env::var(var).ok()) {
            *slot = url;
        }
    }

    if let Some(secs) = args.request_timeout {
        config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }
    config
}

/// Log to a file; stdout belongs to the terminal UI.
fn init_logging(log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    let dir = log_dir.or_else(|| dirs::data_local_dir().map(|d| d.join("ecfr-dashboard")))?;
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Warning: cannot create log directory {}: {e}", dir.display());
        return None;
    }
    let appender = tracing_appender::rolling::never(&dir, "ecfr-tui.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ecfr_core=info,ecfr_tui=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let _log_guard = init_logging(args.log_dir.clone());

    let file = config_file::load_config();
    let config = resolve_config(&args, &file);
    tracing::info!(
        registry = %config.endpoints.registry_url,
        acquisition = %config.endpoints.acquisition_url,
        corrections = %config.endpoints.corrections_url,
        timeout_secs = config.request_timeout.map(|d| d.as_secs()),
        "starting dashboard"
    );

    let backend: Arc<dyn DashboardBackend> = Arc::new(HttpBackend::new(&config)?);

    let theme_name = args
        .theme
        .as_deref()
        .or(file.theme())
        .unwrap_or("default");
    let theme = theme::Theme::from_name(theme_name);

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Restore the terminal before the panic message is printed
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    // Drain stray input (e.g. the Enter that launched the command)
    while event::poll(Duration::from_millis(50)).unwrap_or(false) {
        let _ = event::read();
    }

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    tokio::spawn(backend::run_command_listener(
        backend,
        cmd_rx,
        event_tx,
        cancel.clone(),
    ));

    let mut app = App::new(theme);
    app.backend_cmd_tx = Some(cmd_tx);
    app.request_registry();

    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_for_signal.cancel();
        }
    });

    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|f| app.view(f))?;

        tokio::select! {
            Some(backend_event) = event_rx.recv() => {
                app.handle_backend_event(backend_event);
                while let Ok(evt) = event_rx.try_recv() {
                    app.handle_backend_event(evt);
                }
            }
            _ = cancel.cancelled() => {
                app.should_quit = true;
            }
            _ = async {
                if event::poll(tick_rate).unwrap_or(false)
                    && let Ok(evt) = event::read()
                {
                    app.update(input::map_event(&evt));
                }
            } => {}
        }

        app.update(action::Action::Tick);

        if app.should_quit {
            cancel.cancel();
            break;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    tracing::info!("dashboard exited");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["ecfr-tui"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn cli_flags_override_config_file() {
        let file = config_file::ConfigFile {
            endpoints: Some(config_file::EndpointsConfig {
                registry_url: Some("http://file.example/titles".into()),
                ..Default::default()
            }),
            http: Some(config_file::HttpConfig {
                request_timeout_secs: Some(30),
                user_agent: Some("dashboard-test".into()),
            }),
            display: None,
        };
        let config = resolve_config(
            &args(&["--registry-url", "http://cli.example/titles", "--request-timeout", "0"]),
            &file,
        );
        assert_eq!(config.endpoints.registry_url, "http://cli.example/titles");
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.user_agent, "dashboard-test");
    }

    #[test]
    fn config_file_timeout_applies_without_flag() {
        let file = config_file::ConfigFile {
            http: Some(config_file::HttpConfig {
                request_timeout_secs: Some(30),
                user_agent: None,
            }),
            ..Default::default()
        };
        let config = resolve_config(&args(&[]), &file);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }
}
