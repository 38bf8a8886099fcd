pub mod auth;
pub mod movies;
pub mod saved;

use anyhow::{Result, bail};
use reelsync_application::{
    RouteGuard, SavedItemSynchronizer, SearchUseCase, SessionManager, TrendingCounter,
};
use reelsync_core::config::ClientConfig;
use reelsync_core::route::{Route, RouteDecision};
use reelsync_core::session::Session;
use reelsync_core::store::DocumentStore;
use reelsync_infrastructure::{
    FileKeyValueStore, HttpCredentialService, HttpDocumentStore, TmdbCatalog, build_client,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Everything a command needs, wired once per invocation.
pub struct AppContext {
    pub config: ClientConfig,
    pub session: Arc<SessionManager>,
    pub guard: RouteGuard,
    pub saved: SavedItemSynchronizer,
    pub trending: Arc<TrendingCounter>,
    pub search: SearchUseCase,
}

impl AppContext {
    pub fn build(config: ClientConfig, token_file: PathBuf) -> Result<Self> {
        let client = build_client(config.request_timeout_secs.map(Duration::from_secs))?;

        let credentials = Arc::new(HttpCredentialService::new(
            client.clone(),
            config.backend_url.clone(),
        ));
        let storage = Arc::new(FileKeyValueStore::new(token_file));
        let session = Arc::new(SessionManager::new(credentials, storage));

        let documents: Arc<dyn DocumentStore> =
            Arc::new(HttpDocumentStore::new(client.clone(), config.store.clone()));
        let catalog = Arc::new(TmdbCatalog::new(client, &config.catalog));
        let image_base_url = config.catalog.image_base_url.clone();

        let trending = Arc::new(TrendingCounter::new(documents.clone(), image_base_url.clone()));

        Ok(Self {
            guard: RouteGuard::new(session.subscribe()),
            saved: SavedItemSynchronizer::new(documents, image_base_url),
            search: SearchUseCase::new(catalog, trending.clone()),
            trending,
            session,
            config,
        })
    }

    /// Gates a command on its route; returns the session for protected routes.
    pub async fn enter(&mut self, route: Route) -> Result<Option<Session>> {
        match self.guard.settle(&route).await {
            RouteDecision::Allow => Ok(self.session.state().session().cloned()),
            RouteDecision::Redirect(Route::Login) => {
                bail!("Not signed in. Run `reelsync login` first.")
            }
            RouteDecision::Redirect(other) => bail!("Redirected to {}", other.path()),
            RouteDecision::Wait => bail!("Session state could not be determined"),
        }
    }

    /// Like [`AppContext::enter`] for routes that always need a session.
    pub async fn require(&mut self, route: Route) -> Result<Session> {
        match self.enter(route).await? {
            Some(session) => Ok(session),
            None => Ok(self.session.require_session()?),
        }
    }
}
