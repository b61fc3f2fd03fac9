//! Failure classification and per-operation not-found suppression

use crate::descriptor::{NotFoundPolicy, OperationDescriptor};
use crate::error::CloudError;
use crate::interpret::Interpreted;
use crate::transport::WireResponse;

const MAX_MESSAGE_LEN: usize = 512;

/// Map a non-2xx response to its failure category
pub fn classify(op: &OperationDescriptor, target: &str, response: &WireResponse) -> CloudError {
    let operation = op.name.to_string();
    let target = target.to_string();
    let status = response.status;

    match status {
        404 => CloudError::NotFound { operation, target },
        400..=499 => CloudError::ClientRequest {
            operation,
            target,
            status,
            message: error_message(response),
        },
        _ => CloudError::ProviderServer {
            operation,
            target,
            status,
            message: error_message(response),
        },
    }
}

/// Apply the operation's not-found policy to a failure
///
/// Only a [`CloudError::NotFound`] on an operation declared with
/// [`NotFoundPolicy::ReturnNone`] turns into a result; everything else is
/// returned unchanged.
pub fn apply_not_found_policy(
    op: &OperationDescriptor,
    error: CloudError,
) -> Result<Interpreted, CloudError> {
    match (&error, op.not_found) {
        (CloudError::NotFound { target, .. }, NotFoundPolicy::ReturnNone) => {
            tracing::debug!("{}: {} not found, returning none", op.name, target);
            Ok(Interpreted::Absent)
        }
        _ => Err(error),
    }
}

/// Short human-readable message from an error body
fn error_message(response: &WireResponse) -> String {
    let text = response.text();
    let text = text.trim();
    if text.is_empty() {
        return format!("HTTP {}", response.status);
    }

    // Common JSON error envelopes: {"error": "..."} / {"message": "..."}
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(text) {
        for key in ["error", "message", "errorMessage"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }

    match text.char_indices().nth(MAX_MESSAGE_LEN) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static GET: OperationDescriptor =
        OperationDescriptor::get("get_vapp").not_found(NotFoundPolicy::ReturnNone);
    static POWER_ON: OperationDescriptor = OperationDescriptor::post("power_on_vapp");

    #[test]
    fn test_classify_by_status() {
        let target = "https://vcloud/vapp/1";
        assert!(matches!(
            classify(&GET, target, &WireResponse::new(404)),
            CloudError::NotFound { .. }
        ));
        assert!(matches!(
            classify(&GET, target, &WireResponse::new(403)),
            CloudError::ClientRequest { status: 403, .. }
        ));
        assert!(matches!(
            classify(&GET, target, &WireResponse::new(502)),
            CloudError::ProviderServer { status: 502, .. }
        ));
    }

    #[test]
    fn test_message_extracted_from_json_envelope() {
        let response = WireResponse::json(500, &serde_json::json!({"error": "order failed"}));
        let err = classify(&POWER_ON, "https://x", &response);
        assert_eq!(
            err.to_string(),
            "power_on_vapp https://x: provider error 500: order failed"
        );
    }

    #[test]
    fn test_not_found_policy_is_per_operation() {
        let nf = |op: &OperationDescriptor| classify(op, "https://x", &WireResponse::new(404));

        assert!(matches!(
            apply_not_found_policy(&GET, nf(&GET)),
            Ok(Interpreted::Absent)
        ));
        assert!(matches!(
            apply_not_found_policy(&POWER_ON, nf(&POWER_ON)),
            Err(CloudError::NotFound { .. })
        ));

        let forbidden = classify(&GET, "https://x", &WireResponse::new(403));
        assert!(apply_not_found_policy(&GET, forbidden).is_err());
    }
}
