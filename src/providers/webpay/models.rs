//! Form payload and status-token vocabulary for the web session gateway.

use crate::payment::PaymentRequest;
use crate::status::PaymentStatus;

/// Map the gateway's webhook status token onto the canonical status. The
/// vocabulary is small and fixed: `"Ok"` affirms settlement, `"NOK"` denies
/// it, anything else leaves the transaction pending.
pub fn notification_token_to_status(token: &str) -> PaymentStatus {
    match token {
        "Ok" => PaymentStatus::Success,
        "NOK" => PaymentStatus::Failed,
        _ => PaymentStatus::Pending,
    }
}

/// Build the form-encoded checkout payload. Amounts are sent in minor units
/// with the ISO numeric currency code.
pub fn checkout_form(
    session_id: &str,
    merchant_id: &str,
    brand: Option<&str>,
    request: &PaymentRequest,
) -> String {
    let mut form = url::form_urlencoded::Serializer::new(String::new());
    form.append_pair("sessionid", session_id);
    form.append_pair("merchantid", merchant_id);
    form.append_pair("amount", &request.amount.to_provider_amount(true));
    form.append_pair("currency", request.amount.currency().numeric_code());
    form.append_pair("purchaseref", &request.reference);
    form.append_pair("description", &request.description);
    form.append_pair("phonenumber", request.phone_number.local_format());

    if let Some(url) = &request.success_url {
        form.append_pair("accepturl", url);
    }
    if let Some(url) = &request.failure_url {
        form.append_pair("declineurl", url);
    }
    if let Some(url) = &request.cancel_url {
        form.append_pair("cancelurl", url);
    }
    if let Some(brand) = brand {
        form.append_pair("brand", brand);
    }

    form.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Currency, Money};
    use crate::phone::Phone;

    #[test]
    fn test_notification_token_vocabulary() {
        assert_eq!(notification_token_to_status("Ok"), PaymentStatus::Success);
        assert_eq!(notification_token_to_status("NOK"), PaymentStatus::Failed);
        assert_eq!(notification_token_to_status("OK"), PaymentStatus::Pending);
        assert_eq!(notification_token_to_status(""), PaymentStatus::Pending);
        assert_eq!(
            notification_token_to_status("whatever"),
            PaymentStatus::Pending
        );
    }

    #[test]
    fn test_checkout_form_fields() {
        let mut request = PaymentRequest::new(
            Money::from_minor_units(1234, Currency::MRU),
            Phone::parse("31234567").unwrap(),
            "ref-1",
        );
        request.description = "order 42".into();
        request.success_url = Some("https://shop.example.test/ok".into());

        let form = checkout_form("sess-1", "m-1", Some("ACME"), &request);

        assert!(form.contains("sessionid=sess-1"));
        assert!(form.contains("merchantid=m-1"));
        assert!(form.contains("amount=1234"));
        assert!(form.contains("currency=929"));
        assert!(form.contains("purchaseref=ref-1"));
        assert!(form.contains("phonenumber=31234567"));
        assert!(form.contains("accepturl="));
        assert!(form.contains("brand=ACME"));
        assert!(!form.contains("declineurl="));
    }
}
