use std::sync::Arc;

use eventgate_order::PlacementWorkflow;

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<PlacementWorkflow>,
}
