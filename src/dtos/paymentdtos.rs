use serde::{Deserialize, Serialize};

use crate::models::paymentmodel::Payment;

#[derive(Debug, Serialize, Deserialize)]
pub struct InitiatedPaymentDto {
    pub payment: Payment,
    pub checkout_url: String,
}

/// Minimal shape of a PayMongo webhook delivery; only the event type and
/// the reference stashed in source metadata matter here.
#[derive(Debug, Deserialize)]
pub struct GatewayWebhookEvent {
    pub data: GatewayWebhookData,
}

#[derive(Debug, Deserialize)]
pub struct GatewayWebhookData {
    pub attributes: GatewayWebhookAttributes,
}

#[derive(Debug, Deserialize)]
pub struct GatewayWebhookAttributes {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: GatewayEventResource,
}

#[derive(Debug, Deserialize)]
pub struct GatewayEventResource {
    pub attributes: GatewayResourceAttributes,
}

#[derive(Debug, Deserialize)]
pub struct GatewayResourceAttributes {
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl GatewayWebhookEvent {
    /// Pull the payment reference out of the resource metadata.
    pub fn payment_reference(&self) -> Option<&str> {
        self.data
            .attributes
            .data
            .attributes
            .metadata
            .as_ref()
            .and_then(|m| m["reference"].as_str())
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self.data.attributes.event_type.as_str(),
            "source.chargeable" | "payment.paid"
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self.data.attributes.event_type.as_str(),
            "payment.failed" | "source.expired" | "source.cancelled"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(event_type: &str, reference: Option<&str>) -> GatewayWebhookEvent {
        let metadata = reference.map(|r| serde_json::json!({ "reference": r }));
        serde_json::from_value(serde_json::json!({
            "data": {
                "attributes": {
                    "type": event_type,
                    "data": { "attributes": { "metadata": metadata } }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_webhook_event_classification() {
        assert!(event("source.chargeable", Some("HB-1")).is_success());
        assert!(event("payment.paid", Some("HB-1")).is_success());
        assert!(event("payment.failed", Some("HB-1")).is_failure());
        assert!(event("source.expired", Some("HB-1")).is_failure());

        let other = event("source.created", Some("HB-1"));
        assert!(!other.is_success());
        assert!(!other.is_failure());
    }

    #[test]
    fn test_webhook_reference_extraction() {
        assert_eq!(event("payment.paid", Some("HB-ABC")).payment_reference(), Some("HB-ABC"));
        assert_eq!(event("payment.paid", None).payment_reference(), None);
    }
}
