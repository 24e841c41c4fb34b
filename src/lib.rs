//! sheetd - character sheet session daemon
//!
//! A single-character D&D 5e combat and resource engine served over HTTP.
//! The live session lives in memory; SQLite keeps a whole-document copy of
//! the state for restarts.

pub mod api;
pub mod db;
pub mod error;
pub mod init;
pub mod model;
pub mod rules;
pub mod session;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Result};
use axum::Router;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::{watch, RwLock};
use tracing::info;

use db::Database;
use session::Session;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub db_path: Option<String>,
    /// Character to serve; defaults to the first one in the database
    pub character: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            db_path: None, // None = in-memory
            character: None,
        }
    }
}

impl Config {
    /// Load configuration: defaults, then sheetd.toml, then SHEETD_* env vars
    pub fn load() -> Result<Self> {
        let config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("sheetd.toml"))
            .merge(Env::prefixed("SHEETD_"))
            .extract()?;
        Ok(config)
    }
}

/// The sheetd server instance
pub struct Server {
    config: Config,
    db: Arc<Database>,
    character_id: String,
    session: Arc<RwLock<Session>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Create a new server instance and load the character session
    pub async fn new(config: Config) -> Result<Self> {
        let db = Database::new(config.db_path.as_deref()).await?;

        let character_id = match &config.character {
            Some(id) => id.clone(),
            None => match db.first_character_id().await? {
                Some(id) => id,
                None => bail!("no characters in database; run sheetd_init first"),
            },
        };

        let bundle = db.load_bundle(&character_id).await?;
        info!(
            "Loaded character '{}' ({})",
            bundle.character.name, character_id
        );
        let session = Session::new(bundle);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            db: Arc::new(db),
            character_id,
            session: Arc::new(RwLock::new(session)),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Get the database handle
    pub fn db(&self) -> Arc<Database> {
        self.db.clone()
    }

    /// Build the router
    fn router(&self) -> Router {
        api::router(
            self.db.clone(),
            self.character_id.clone(),
            self.session.clone(),
        )
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("sheetd listening on {}", local_addr);

        let router = self.router();
        let mut shutdown_rx = self.shutdown_rx.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await?;

        info!("sheetd shutdown complete");
        Ok(())
    }

    /// Signal the server to shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}
