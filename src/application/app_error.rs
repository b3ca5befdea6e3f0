use thiserror::Error;

/// Application-wide error type.
///
/// Display strings double as the operator-facing message catalog: the
/// callback's audit lines and the charge handler's structured outcomes
/// render these verbatim, so the wording here is part of the contract.
#[derive(Error, Debug)]
pub enum AppError {
    /// Transaction metadata carries no invoice reference.
    #[error("Invoice ID is missing from transaction metadata")]
    MissingBinding,

    /// Invoice is unknown or not assigned to this gateway.
    #[error("Invoice {0} does not belong to this gateway")]
    InvalidInvoice(i64),

    /// Billing client has no stored provider customer reference.
    #[error("Customer ID not found for client {0}.")]
    NoCustomer(i64),

    /// Billing client has no valid mandate to charge against.
    #[error(
        "No valid mandate found for client {0}. Client must make a first payment to authorize recurring payments."
    )]
    NoMandate(i64),

    /// Webhook named a subscription this system has no record of.
    #[error("Cannot find client ID for subscription {0}")]
    UnknownSubscription(String),

    /// Idempotency short-circuit; expected under duplicate webhook
    /// delivery and never logged as an error.
    #[error("Transaction {0} has already been processed")]
    AlreadyProcessed(String),

    /// Any failure talking to the payment provider, including responses
    /// that do not parse into the typed model.
    #[error("{0}")]
    Provider(String),

    #[error("Resource not found")]
    NotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Machine-readable error codes for API responses.
#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    MissingBinding,
    InvalidInvoice,
    NoCustomer,
    NoMandate,
    UnknownSubscription,
    AlreadyProcessed,
    ProviderError,
    NotFound,
    InvalidInput,
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingBinding => "MISSING_BINDING",
            ErrorCode::InvalidInvoice => "INVALID_INVOICE",
            ErrorCode::NoCustomer => "NO_CUSTOMER",
            ErrorCode::NoMandate => "NO_MANDATE",
            ErrorCode::UnknownSubscription => "UNKNOWN_SUBSCRIPTION",
            ErrorCode::AlreadyProcessed => "ALREADY_PROCESSED",
            ErrorCode::ProviderError => "PROVIDER_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
