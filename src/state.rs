use axum::extract::FromRef;

use crate::config::Config;
use crate::session::SessionManager;
use crate::store::ExamStore;

#[derive(Clone)]
pub struct AppState {
    pub store: ExamStore,
    pub sessions: SessionManager,
    pub config: Config,
}

impl FromRef<AppState> for ExamStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for SessionManager {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
