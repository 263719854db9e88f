use std::sync::Arc;

use db::DBService;
use services::services::{
    auth::{AuthService, generate_secret},
    config::{Config, load_config_from_file, save_config_to_file},
};
use tokio::sync::RwLock;
use utils::assets::config_path;

pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;
#[cfg(test)]
pub mod test_support;

#[derive(Clone)]
pub struct AppState {
    config: Arc<RwLock<Config>>,
    db: DBService,
    auth: AuthService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let mut raw_config = load_config_from_file(&config_path()).await;

        let jwt_secret = match raw_config.jwt_secret.clone() {
            Some(secret) => secret,
            None => {
                let secret = generate_secret();
                raw_config.jwt_secret = Some(secret.clone());
                tracing::info!("Generated new session signing secret");
                secret
            }
        };
        save_config_to_file(&raw_config, &config_path()).await?;

        let auth = AuthService::new(jwt_secret, raw_config.token_ttl_hours);
        let db = DBService::new().await?;

        Ok(Self {
            config: Arc::new(RwLock::new(raw_config)),
            db,
            auth,
        })
    }

    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.config
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }
}
