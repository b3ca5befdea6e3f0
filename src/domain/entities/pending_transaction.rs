use chrono::NaiveDateTime;

/// Transient invoice → provider transaction association, kept while a
/// payment is awaiting its webhook callback and deleted once the callback
/// resolves. Not authoritative; the provider record is.
#[derive(Debug, Clone)]
pub struct PendingTransaction {
    pub invoice_id: i64,
    pub transaction_id: String,
    pub created_at: NaiveDateTime,
}
