//! Test data factories for payment gateway fixtures.
//!
//! Each factory builds a fully valid value and applies the caller's
//! overrides on top, so tests only spell out the fields they care about.

use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    application::ports::payment_provider::{
        CustomerId, MandateInfo, Payment, PaymentMetadata, SubscriptionInfo,
    },
    application::use_cases::recurring::{ChargeParams, SubscriptionParams},
    domain::entities::{
        amount::Amount,
        mandate::{MandateMethod, MandateStatus},
        payment_mode::PaymentMode,
        payment_status::PaymentStatus,
        sequence_type::SequenceType,
        subscription::{Subscription, SubscriptionStatus},
    },
};

/// Fixed calendar date for deterministic fixtures.
pub fn test_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn test_datetime() -> NaiveDateTime {
    test_date(2026, 8, 1).and_hms_opt(12, 0, 0).unwrap()
}

/// Create a provider payment: test mode, paid, EUR 19.99, bound to
/// invoice 42.
pub fn create_test_payment(overrides: impl FnOnce(&mut Payment)) -> Payment {
    let mut payment = Payment {
        id: "tr_ABC".to_string(),
        mode: PaymentMode::Test,
        status: PaymentStatus::Paid,
        amount: Amount::new("EUR", "19.99"),
        customer_id: Some(CustomerId::new("cst_8wmqcHMN4U")),
        mandate_id: None,
        sequence_type: Some(SequenceType::Oneoff),
        metadata: PaymentMetadata {
            invoice_id: Some(42),
            service_id: None,
            recurring: false,
            first_payment: false,
        },
        checkout_url: None,
    };
    overrides(&mut payment);
    payment
}

/// Create a valid direct-debit mandate as the provider reports it.
pub fn create_test_mandate_info(overrides: impl FnOnce(&mut MandateInfo)) -> MandateInfo {
    let mut mandate = MandateInfo {
        id: "mdt_AcQl5fdL4h".to_string(),
        status: MandateStatus::Valid,
        method: MandateMethod::DirectDebit,
    };
    overrides(&mut mandate);
    mandate
}

/// Create an active provider subscription with a next charge date.
pub fn create_test_subscription_info(
    overrides: impl FnOnce(&mut SubscriptionInfo),
) -> SubscriptionInfo {
    let mut subscription = SubscriptionInfo {
        id: "sub_8EjeBVgtEn".to_string(),
        status: SubscriptionStatus::Active,
        next_payment_date: Some(test_date(2026, 9, 1)),
    };
    overrides(&mut subscription);
    subscription
}

/// Create a local subscription row for a client. The row starts active
/// with no provider-reported next payment date yet.
pub fn create_test_subscription(
    client_id: i64,
    overrides: impl FnOnce(&mut Subscription),
) -> Subscription {
    let mut subscription = Subscription {
        id: 1,
        client_id,
        service_id: 0,
        subscription_id: "sub_8EjeBVgtEn".to_string(),
        status: SubscriptionStatus::Active,
        next_payment_date: None,
        created_at: test_datetime(),
        updated_at: None,
    };
    overrides(&mut subscription);
    subscription
}

/// Charge parameters for an invoice: EUR 19.99, no service binding.
pub fn charge_params(invoice_id: i64) -> ChargeParams {
    ChargeParams {
        invoice_id,
        service_id: None,
        amount: Amount::new("EUR", "19.99"),
        description: format!("Invoice {invoice_id}"),
        return_url: None,
    }
}

/// Monthly subscription parameters for a client.
pub fn subscription_params(client_id: i64) -> SubscriptionParams {
    SubscriptionParams {
        client_id,
        service_id: None,
        amount: Amount::new("EUR", "19.99"),
        interval: "1 month".to_string(),
        description: "Monthly hosting".to_string(),
        start_date: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_payment_applies_overrides() {
        let payment = create_test_payment(|p| p.status = PaymentStatus::Open);
        assert_eq!(payment.id, "tr_ABC");
        assert_eq!(payment.status, PaymentStatus::Open);
        assert_eq!(payment.metadata.invoice_id, Some(42));
    }

    #[test]
    fn test_create_test_subscription_binds_client() {
        let row = create_test_subscription(9, |_| {});
        assert_eq!(row.client_id, 9);
        assert_eq!(row.status, SubscriptionStatus::Active);
        assert_eq!(row.next_payment_date, None);
    }

    #[test]
    fn test_mandate_defaults_are_chargeable() {
        let mandate = create_test_mandate_info(|_| {});
        assert!(mandate.status.is_valid());
        assert_eq!(mandate.method, MandateMethod::DirectDebit);
    }
}
