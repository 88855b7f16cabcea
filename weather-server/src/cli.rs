use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use weather_core::{Config, StorageBackend};
use weather_server::startup::App;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Historical weather data backend")]
pub struct Cli {
    /// Log filter, e.g. "info" or "weather_core=debug". Defaults to RUST_LOG, then "info".
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct ConfigArg {
    /// Config file; the platform config directory when absent.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server.
    Serve {
        #[command(flatten)]
        config: ConfigArg,

        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        /// Keep artifacts in memory instead of the cloud bucket.
        #[arg(long)]
        mock_storage: bool,
    },

    /// Write a config file with default values.
    InitConfig {
        #[command(flatten)]
        config: ConfigArg,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration (file plus environment overrides).
    ShowConfig {
        #[command(flatten)]
        config: ConfigArg,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { config, host, port, mock_storage } => {
                let mut cfg = load_config(&config)?;
                if let Some(host) = host {
                    cfg.server.host = host;
                }
                if let Some(port) = port {
                    cfg.server.port = port;
                }
                if mock_storage {
                    cfg.storage.backend = StorageBackend::Mock;
                }
                cfg.validate()?;

                let app = App::build(&cfg)?;
                info!(
                    host = %cfg.server.host,
                    port = app.port(),
                    storage = %cfg.storage.backend,
                    "starting weather data backend"
                );
                app.run().await.context("HTTP server terminated with an error")?;
            }
            Command::InitConfig { config, force } => {
                let path = config_path(&config)?;
                init_config(&path, force)?;
                println!("Wrote default configuration to {}", path.display());
            }
            Command::ShowConfig { config } => {
                print!("{}", render_config(&load_config(&config)?)?);
            }
        }

        Ok(())
    }
}

fn config_path(arg: &ConfigArg) -> anyhow::Result<PathBuf> {
    match arg.config {
        Some(ref p) => Ok(p.clone()),
        None => Config::config_file_path(),
    }
}

fn load_config(arg: &ConfigArg) -> anyhow::Result<Config> {
    let mut cfg = Config::load(arg.config.as_deref())?;
    cfg.apply_env()?;
    Ok(cfg)
}

/// Write the default configuration to `path`, refusing to replace an existing file unless `force`.
fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!(
            "Config file already exists: {}\nHint: pass --force to overwrite it.",
            path.display()
        );
    }
    Config::default().save(path)
}

fn render_config(cfg: &Config) -> anyhow::Result<String> {
    toml::to_string_pretty(cfg).context("Failed to serialize configuration to TOML")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn init_config_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather").join("config.toml");

        init_config(&path, false).unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap(), Config::default());

        std::fs::write(&path, "[server]\nport = 9999\n").unwrap();
        let err = init_config(&path, false).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Config file already exists"));
        assert!(msg.contains("--force"));
        assert_eq!(Config::load(Some(&path)).unwrap().server.port, 9999);

        init_config(&path, true).unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap(), Config::default());
    }

    #[test]
    fn show_config_renders_loadable_toml() {
        let mut cfg = Config::default();
        cfg.storage.backend = StorageBackend::Mock;
        cfg.server.port = 8123;

        let rendered = render_config(&cfg).unwrap();
        assert!(rendered.contains("backend = \"mock\""));

        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::parse_from([
            "weather-server",
            "serve",
            "--port",
            "9000",
            "--mock-storage",
            "--log-level",
            "debug",
        ]);

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Serve { port, mock_storage, host, .. } => {
                assert_eq!(port, Some(9000));
                assert!(mock_storage);
                assert!(host.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
