// service/payment_provider.rs
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::{config::Config, service::error::ServiceError};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize, Deserialize)]
pub struct GatewaySource {
    pub id: String,
    pub checkout_url: String,
    pub status: String,
}

/// Gateway-side view of a payment, folded down from PayMongo's
/// stringly-typed statuses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GatewayStatus {
    Pending,
    Paid,
    Failed,
    Expired,
}

impl GatewayStatus {
    pub fn from_gateway_str(s: &str) -> GatewayStatus {
        match s {
            "chargeable" | "paid" => GatewayStatus::Paid,
            "failed" | "cancelled" => GatewayStatus::Failed,
            "expired" => GatewayStatus::Expired,
            _ => GatewayStatus::Pending,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaymentGatewayService {
    secret_key: String,
    webhook_secret: String,
    app_url: String,
}

impl PaymentGatewayService {
    pub fn new(config: &Config) -> Self {
        Self {
            secret_key: config.paymongo_secret_key.clone(),
            webhook_secret: config.paymongo_webhook_secret.clone(),
            app_url: config.app_url.clone(),
        }
    }

    /// Create a checkout source for the given amount (in centavos).
    pub async fn create_source(
        &self,
        amount_centavos: i64,
        reference: &str,
        description: &str,
    ) -> Result<GatewaySource, ServiceError> {
        let client = reqwest::Client::new();
        let payload = serde_json::json!({
            "data": {
                "attributes": {
                    "amount": amount_centavos,
                    "currency": "PHP",
                    "type": "gcash",
                    "description": description,
                    "redirect": {
                        "success": format!("{}/payments/success?ref={}", self.app_url, reference),
                        "failed": format!("{}/payments/failed?ref={}", self.app_url, reference),
                    },
                    "metadata": { "reference": reference }
                }
            }
        });

        let response = client
            .post("https://api.paymongo.com/v1/sources")
            // PayMongo uses basic auth with the secret key as username.
            .basic_auth(&self.secret_key, Some(""))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| ServiceError::Gateway {
                message: format!("gateway unreachable: {}", e),
                retryable: true,
            })?;

        let status = response.status();
        let body: serde_json::Value = response.json().await.map_err(|e| ServiceError::Gateway {
            message: format!("invalid gateway response: {}", e),
            retryable: true,
        })?;

        if !status.is_success() {
            let message = body["errors"][0]["detail"]
                .as_str()
                .unwrap_or("payment source creation failed")
                .to_string();
            return Err(ServiceError::Gateway {
                message,
                retryable: status.is_server_error(),
            });
        }

        let data = &body["data"];
        Ok(GatewaySource {
            id: data["id"].as_str().unwrap_or("").to_string(),
            checkout_url: data["attributes"]["redirect"]["checkout_url"]
                .as_str()
                .unwrap_or("")
                .to_string(),
            status: data["attributes"]["status"].as_str().unwrap_or("pending").to_string(),
        })
    }

    /// Poll a source's current status; used by the reconciliation sweep.
    pub async fn get_source_status(&self, source_id: &str) -> Result<GatewayStatus, ServiceError> {
        let client = reqwest::Client::new();
        let response = client
            .get(format!("https://api.paymongo.com/v1/sources/{}", source_id))
            .basic_auth(&self.secret_key, Some(""))
            .send()
            .await
            .map_err(|e| ServiceError::Gateway {
                message: format!("gateway unreachable: {}", e),
                retryable: true,
            })?;

        let body: serde_json::Value = response.json().await.map_err(|e| ServiceError::Gateway {
            message: format!("invalid gateway response: {}", e),
            retryable: true,
        })?;

        let status = body["data"]["attributes"]["status"].as_str().unwrap_or("pending");
        Ok(GatewayStatus::from_gateway_str(status))
    }

    /// Verify a webhook signature header of the form
    /// `t=<timestamp>,te=<test sig>,li=<live sig>`; the signature is
    /// HMAC-SHA256 over `<timestamp>.<raw payload>`.
    pub fn verify_webhook_signature(&self, payload: &str, signature_header: &str) -> bool {
        verify_signature(&self.webhook_secret, payload, signature_header)
    }
}

fn verify_signature(secret: &str, payload: &str, signature_header: &str) -> bool {
    let mut timestamp = None;
    let mut signature = None;
    for part in signature_header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", v)) => timestamp = Some(v),
            Some(("te", v)) | Some(("li", v)) => {
                if signature.is_none() || part.trim().starts_with("li=") {
                    signature = Some(v);
                }
            }
            _ => {}
        }
    }

    let (Some(timestamp), Some(signature)) = (timestamp, signature) else {
        return false;
    };
    let Ok(expected_sig) = hex::decode(signature) else {
        return false;
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(format!("{}.{}", timestamp, payload).as_bytes());
    let computed = mac.finalize().into_bytes();

    computed.ct_eq(expected_sig.as_slice()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_status_mapping() {
        assert_eq!(GatewayStatus::from_gateway_str("chargeable"), GatewayStatus::Paid);
        assert_eq!(GatewayStatus::from_gateway_str("paid"), GatewayStatus::Paid);
        assert_eq!(GatewayStatus::from_gateway_str("failed"), GatewayStatus::Failed);
        assert_eq!(GatewayStatus::from_gateway_str("expired"), GatewayStatus::Expired);
        assert_eq!(GatewayStatus::from_gateway_str("pending"), GatewayStatus::Pending);
        assert_eq!(GatewayStatus::from_gateway_str("unknown"), GatewayStatus::Pending);
    }

    #[test]
    fn test_webhook_signature_roundtrip() {
        let secret = "whsk_test";
        let payload = r#"{"data":{"id":"evt_1"}}"#;
        let timestamp = "1700000000";

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, payload).as_bytes());
        let sig = hex::encode(mac.finalize().into_bytes());

        let header = format!("t={},te={}", timestamp, sig);
        assert!(verify_signature(secret, payload, &header));
        assert!(!verify_signature(secret, payload, &format!("t={},te={}", timestamp, "deadbeef")));
        assert!(!verify_signature("other_secret", payload, &header));
        assert!(!verify_signature(secret, "tampered", &header));
    }
}
