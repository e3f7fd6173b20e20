use std::sync::Arc;

use crate::auth::AuthGate;
use crate::config::AppConfig;
use crate::database::DrinkRepository;

/// Everything a request handler needs, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub drinks: Arc<dyn DrinkRepository>,
    pub gate: Arc<AuthGate>,
}

impl AppState {
    pub fn new(config: AppConfig, drinks: Arc<dyn DrinkRepository>, gate: AuthGate) -> Self {
        Self {
            config: Arc::new(config),
            drinks,
            gate: Arc::new(gate),
        }
    }
}
