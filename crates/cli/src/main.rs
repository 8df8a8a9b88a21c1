mod channel_commands;
mod check_commands;

use std::path::{Path, PathBuf};

use {
    anyhow::Context as _,
    autoping_config::{AutoPingConfig, Severity, ValidationResult},
    clap::{Parser, Subcommand},
    tracing::{error, info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "autoping",
    about = "AutoPing: posts a preset message into every new thread of a Discord channel"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery of ./autoping.toml and
    /// ~/.config/autoping/autoping.toml).
    #[arg(long, global = true, env = "AUTOPING_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the configured channel (default when no subcommand is provided).
    Run,
    /// Print every channel the account can see, with ids, then exit.
    ListChannels,
    /// Validate the configuration without connecting.
    Check,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Panics inside event tasks are contained by the runtime; make sure they
/// still reach the log.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        error!(panic = %info, "unhandled panic, continuing");
    }));
}

/// Load the config file (explicit or discovered), then apply environment
/// overrides.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<(AutoPingConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => autoping_config::find_config_file(),
    };
    let mut config = match &path {
        Some(path) => autoping_config::load_config(path)
            .with_context(|| format!("invalid config file {}", path.display()))?,
        None => AutoPingConfig::default(),
    };
    autoping_config::apply_env_overrides(&mut config);
    Ok((config, path))
}

fn log_diagnostics(result: &ValidationResult) {
    for diagnostic in &result.diagnostics {
        match diagnostic.severity {
            Severity::Error => error!(path = %diagnostic.path, "{}", diagnostic.message),
            Severity::Warning => warn!(path = %diagnostic.path, "{}", diagnostic.message),
            Severity::Info => info!(path = %diagnostic.path, "{}", diagnostic.message),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);
    install_panic_hook();

    match cli.command {
        Some(Commands::Check) => check_commands::handle_check(cli.config.as_deref()),
        Some(Commands::ListChannels) => {
            let config = startup_config(cli.config.as_deref())?;
            channel_commands::handle_list_channels(&config).await
        },
        None | Some(Commands::Run) => {
            info!(version = env!("CARGO_PKG_VERSION"), "autoping starting");
            let config = startup_config(cli.config.as_deref())?;
            autoping_discord::run(&config).await?;
            Ok(())
        },
    }
}

/// Load and validate. Configuration errors are fatal at startup.
fn startup_config(explicit: Option<&Path>) -> anyhow::Result<AutoPingConfig> {
    let (config, path) = load_config(explicit)?;
    if let Some(path) = &path {
        info!(path = %path.display(), "config loaded");
    }

    let validation = autoping_config::validate_config(&config, path.as_deref());
    log_diagnostics(&validation);
    if validation.has_errors() {
        anyhow::bail!(
            "configuration has {} error(s); run `autoping check` for details",
            validation.count(Severity::Error)
        );
    }
    Ok(config)
}
