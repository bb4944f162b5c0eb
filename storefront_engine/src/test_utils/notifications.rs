use payfast_tools::{signature, FieldSet, PayfastConfig};
use sf_common::{Cents, Secret};

pub const TEST_MERCHANT_ID: &str = "10000100";
pub const TEST_MERCHANT_KEY: &str = "46f0cd694581a";
pub const TEST_PASSPHRASE: &str = "jt7NOE43FZPn";

/// Sandbox merchant credentials, suitable for signing requests and notifications in tests.
pub fn test_payfast_config() -> PayfastConfig {
    PayfastConfig {
        merchant_id: TEST_MERCHANT_ID.into(),
        merchant_key: TEST_MERCHANT_KEY.into(),
        passphrase: Secret::from(TEST_PASSPHRASE.to_string()),
        return_url: "https://shop.example.com/return".into(),
        cancel_url: "https://shop.example.com/cancel".into(),
        notify_url: "https://shop.example.com/api/webhook/payment".into(),
        ..PayfastConfig::default()
    }
}

/// The fields of an ITN for the given order reference, without a signature.
pub fn itn_fields(payment_id: &str, payment_status: &str, amount: Cents) -> FieldSet {
    FieldSet::new()
        .with("m_payment_id", payment_id)
        .with("pf_payment_id", "1089250")
        .with("payment_status", payment_status)
        .with("item_name", format!("Order #{payment_id}"))
        .with("amount_gross", amount.to_string())
        .with("merchant_id", TEST_MERCHANT_ID)
}

/// Appends the signature the gateway would compute using `passphrase`, and encodes the result as a form body.
pub fn signed_itn_body(fields: FieldSet, passphrase: &str) -> String {
    let sig = signature::sign(&fields, passphrase);
    fields.with(signature::SIGNATURE_FIELD, sig).to_urlencoded()
}

/// A correctly signed ITN body for the order.
pub fn itn_body(order_id: i64, payment_status: &str, amount: Cents) -> String {
    signed_itn_body(itn_fields(&order_id.to_string(), payment_status, amount), TEST_PASSPHRASE)
}
