use std::sync::Arc;

use tg_broker::BrokerApi;
use tg_domain::config::Config;
use tg_sessions::SessionService;

/// Shared application state passed to all gateway handlers.
///
/// The gateway holds no session data of its own: everything it knows about
/// a caller comes from `sessions` on each request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<dyn SessionService>,
    pub broker: Arc<dyn BrokerApi>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        sessions: Arc<dyn SessionService>,
        broker: Arc<dyn BrokerApi>,
    ) -> Self {
        Self {
            config,
            sessions,
            broker,
        }
    }
}
