use std::sync::Arc;

use crate::{gateway::Gateway, session::SessionStore};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn Gateway>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn Gateway>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { gateway, sessions }
    }
}
