pub mod api;
pub mod cli;
pub mod commands;
pub mod fields;
pub mod session;
pub mod store;

use std::sync::Arc;
use url::Url;

use api::ApiClient;
use session::{SessionEvents, SessionGuard};
use store::TokenStore;

/// Everything the console needs to run against one API origin and one
/// token store.
pub struct ConsoleConfig {
    /// Origin of the content-admin API
    pub api_origin: Url,
    /// Durable token store shared by the guard and the API client
    pub store: Arc<dyn TokenStore>,
}

/// Assembled console: the session guard and the API client sharing one
/// store and one event bus.
pub struct Console {
    pub guard: SessionGuard,
    pub api: Arc<ApiClient>,
    pub store: Arc<dyn TokenStore>,
    pub events: SessionEvents,
}

/// Construct the console. The guard subscribes to the event bus here;
/// tear it down with [`SessionGuard::shutdown`] before exit.
pub fn connect(config: ConsoleConfig) -> Console {
    let events = SessionEvents::new();
    let api = Arc::new(ApiClient::new(
        config.api_origin,
        config.store.clone(),
        events.clone(),
    ));
    let guard = SessionGuard::new(config.store.clone(), api.clone(), &events);

    Console {
        guard,
        api,
        store: config.store,
        events,
    }
}
