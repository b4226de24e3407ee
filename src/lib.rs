//! Anime Tier Backend
//!
//! Layered architecture:
//! - domain: Tier registry, board rules, profiles and comments
//! - dnd: Drag interaction controller
//! - repository: Data access abstractions, SQLite stores, board persistence
//! - storage: Cover image object store
//! - session: Signed-in identity context
//! - commands: Handlers the UI calls

pub mod commands;
pub mod config;
pub mod dnd;
pub mod domain;
pub mod repository;
pub mod session;
pub mod storage;

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;

use commands::BoardWorkspace;
use config::AppConfig;
use domain::DomainResult;
use repository::{
    init_db, BoardBridge, CommentRepository, CommentStore, DbState, ProfileRepository,
    TierRepository,
};
use session::SessionContext;
use storage::{LocalObjectStore, ObjectStore};

/// Application state shared across commands
pub struct AppState {
    pub config: AppConfig,
    pub db_state: DbState,
    pub session: SessionContext,
    pub bridge: BoardBridge,
    pub comments: Arc<dyn CommentStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub workspace: Mutex<BoardWorkspace>,
}

impl AppState {
    /// Wire the stores over an initialized database
    pub fn new(config: AppConfig, db_state: &DbState, objects: Arc<dyn ObjectStore>) -> Self {
        let conn = db_state.connection();
        Self {
            bridge: BoardBridge::new(
                Arc::new(TierRepository::new(conn.clone())),
                Arc::new(ProfileRepository::new(conn.clone())),
            ),
            comments: Arc::new(CommentRepository::new(conn)),
            objects,
            session: SessionContext::new(),
            workspace: Mutex::new(BoardWorkspace::default()),
            db_state: db_state.clone(),
            config,
        }
    }

    /// Open the database and local image store described by `config`
    pub async fn open(config: AppConfig) -> DomainResult<Self> {
        config.ensure_dirs()?;
        let db_state = init_db(&config.db_path()).await?;
        let objects = Arc::new(LocalObjectStore::new(&config.assets_dir));
        Ok(Self::new(config, &db_state, objects))
    }
}

/// Start logging, open storage and begin following sign-ins.
/// `config_path` overrides the usual config lookup.
pub async fn bootstrap(config_path: Option<&Path>) -> DomainResult<Arc<AppState>> {
    let config = AppConfig::load(config_path)?;

    if let Err(e) = rolling_logger::init_logger_with_retention(
        config.log_dir.clone(),
        &config.app_name,
        config.log_retention,
    ) {
        eprintln!("Failed to init logger: {}", e);
    }

    let state = match AppState::open(config).await {
        Ok(state) => {
            let _ = rolling_logger::info("DB init success");
            Arc::new(state)
        }
        Err(e) => {
            let _ = rolling_logger::error(&format!("DB init failed: {}", e));
            return Err(e);
        }
    };

    commands::watch_session(state.clone());
    Ok(state)
}
