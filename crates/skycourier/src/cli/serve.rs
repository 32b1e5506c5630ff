//! the `serve` subcommand - runs the dispatch server.

use std::net::SocketAddr;

use clap::Args;
use color_eyre::eyre::{Context, Result, bail};
use tokio::net::TcpListener;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use skycourier_db::SkycourierDb;
use skycourier_types::Config;

/// run the skycourier dispatch server
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// sqlite database file path
    #[arg(long, default_value = "skycourier.db", env = "SKYCOURIER_DB_PATH")]
    db_path: String,

    /// address to listen on
    #[arg(long, default_value = "0.0.0.0:8080", env = "SKYCOURIER_LISTEN_ADDR")]
    listen_addr: String,

    /// hs256 signing secret for bearer tokens; required
    #[arg(long, env = "SKYCOURIER_JWT_SECRET")]
    jwt_secret: Option<String>,

    /// request paths that bypass authentication
    #[arg(long, default_value = "/health", env = "SKYCOURIER_ALLOW_UNAUTHENTICATED")]
    allow_unauthenticated: String,

    /// log level
    #[arg(long, default_value = "info", env = "SKYCOURIER_LOG_LEVEL")]
    log_level: String,
}

impl ServeCommand {
    /// convert cli arguments into a Config struct.
    fn into_config(self) -> Result<Config> {
        let Some(jwt_secret) = self.jwt_secret.filter(|s| !s.is_empty()) else {
            bail!("JWT secret is required; set SKYCOURIER_JWT_SECRET or pass --jwt-secret");
        };

        let mut config = Config {
            listen_addr: self.listen_addr,
            ..Default::default()
        };
        config.database.path = self.db_path;
        config.auth.jwt_secret = jwt_secret;
        config.auth.allow_unauthenticated = self
            .allow_unauthenticated
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Ok(config)
    }

    /// run the serve command.
    pub async fn run(self) -> Result<()> {
        let log_level = match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
        tracing::subscriber::set_global_default(subscriber)?;

        info!("starting skycourier...");

        let config = self.into_config()?;
        info!("{config}");

        let db = SkycourierDb::new(&config)
            .await
            .context("failed to initialize database")?;
        info!("database initialized and migrated");

        let app = crate::create_app(db, config.clone());

        let addr: SocketAddr = config
            .listen_addr
            .parse()
            .context("invalid listen address")?;
        info!("starting http server on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, app).await.context("server error")?;

        Ok(())
    }
}
