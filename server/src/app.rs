//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::{PostgresService, QueryExecutor};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub executor: Arc<dyn QueryExecutor>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Check) => Self::check_database(&cli_config).await,
            Some(Commands::Start) | None => {
                let app = Self::init(&cli_config).await?;
                Self::start_server(app).await
            }
        }
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let postgres = PostgresService::init(&config.database.postgres, config.debug)
            .await
            .context("Failed to connect to PostgreSQL")?;

        let executor: Arc<dyn QueryExecutor> = Arc::new(postgres);
        let shutdown = ShutdownService::new(executor.clone());

        Ok(Self {
            shutdown,
            config,
            executor,
        })
    }

    /// Connect and report which required tables exist
    async fn check_database(cli: &CliConfig) -> Result<()> {
        let config = AppConfig::load(cli)?;
        let postgres = PostgresService::init(&config.database.postgres, config.debug)
            .await
            .context("Failed to connect to PostgreSQL")?;

        let report = postgres.check_tables().await?;
        postgres.close().await;

        let missing: Vec<&str> = report
            .iter()
            .filter(|(_, exists)| !exists)
            .map(|(table, _)| *table)
            .collect();

        println!("Connected to PostgreSQL");
        for (table, exists) in &report {
            let mark = if *exists { "ok" } else { "missing" };
            println!("  {:<18} {}", table, mark);
        }

        if missing.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("Missing tables: {}", missing.join(", "))
        }
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            &app.config.database.postgres,
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }
}
