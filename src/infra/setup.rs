use crate::{
    adapters::{http::app_state::AppState, persistence::PostgresPersistence},
    application::{
        helpers::audit::AuditLog,
        ports::{ledger::LedgerGateway, payment_provider::PaymentProviderPort},
        use_cases::{
            callback::CallbackProcessor,
            charge::ChargeRequestHandler,
            recurring::{MandateStore, PendingTransactionStore, RecurringEngine, SubscriptionStore},
        },
    },
    infra::{config::GatewayConfig, mollie_client::MollieClient, postgres_persistence},
};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = GatewayConfig::from_env();

    let postgres_arc: Arc<PostgresPersistence> =
        Arc::new(postgres_persistence(&config.database_url).await?);

    let ledger_arc = postgres_arc.clone() as Arc<dyn LedgerGateway>;
    let mandates_arc = postgres_arc.clone() as Arc<dyn MandateStore>;
    let subscriptions_arc = postgres_arc.clone() as Arc<dyn SubscriptionStore>;
    let pending_arc = postgres_arc.clone() as Arc<dyn PendingTransactionStore>;

    let provider_arc =
        Arc::new(MollieClient::new(config.api_key().clone())) as Arc<dyn PaymentProviderPort>;

    let audit = AuditLog::new(
        ledger_arc.clone(),
        config.gateway_name.clone(),
        config.sandbox,
    );

    let recurring = Arc::new(RecurringEngine::new(
        provider_arc.clone(),
        mandates_arc,
        subscriptions_arc.clone(),
        pending_arc.clone(),
        ledger_arc.clone(),
        audit.clone(),
        config.webhook_url(),
    ));

    let callback = Arc::new(CallbackProcessor::new(
        provider_arc,
        ledger_arc.clone(),
        recurring.clone(),
        subscriptions_arc.clone(),
        pending_arc,
        audit.clone(),
        config.gateway_name.clone(),
        config.is_active(),
        config.sandbox,
        config.enable_recurring,
    ));

    let charges = Arc::new(ChargeRequestHandler::new(
        recurring.clone(),
        subscriptions_arc,
        ledger_arc,
        audit,
        config.gateway_name.clone(),
        config.is_active(),
        config.enable_recurring,
        config.recurring_type,
    ));

    Ok(AppState {
        config: Arc::new(config),
        callback,
        recurring,
        charges,
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mollie_gateway=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don’t show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
