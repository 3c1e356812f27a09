pub mod auth;
pub mod backup;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod service;
pub mod ui;
pub mod validation;

pub use db::DbPool;

use config::Config;
use service::Desk;
use ui::SessionRegistry;

pub struct AppState {
    pub config: Config,
    pub desk: Desk,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(config: Config, desk: Desk) -> Self {
        Self {
            config,
            desk,
            sessions: SessionRegistry::new(),
        }
    }
}
