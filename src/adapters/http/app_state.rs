use std::sync::Arc;

use crate::{
    application::use_cases::{
        callback::CallbackProcessor, charge::ChargeRequestHandler, recurring::RecurringEngine,
    },
    infra::config::GatewayConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub callback: Arc<CallbackProcessor>,
    pub recurring: Arc<RecurringEngine>,
    pub charges: Arc<ChargeRequestHandler>,
}
