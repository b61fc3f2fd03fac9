//! Response interpretation

use crate::classify::{apply_not_found_policy, classify};
use crate::descriptor::{OperationDescriptor, ResponseStrategy};
use crate::error::{CloudError, Result};
use crate::transport::WireResponse;

/// Untyped outcome of an operation, before conversion to the caller's type
#[derive(Debug, Clone, PartialEq)]
pub enum Interpreted {
    Document(serde_json::Value),
    Header(String),
    Text(String),
    Void,
    /// The resource does not exist and the operation tolerates that
    Absent,
}

/// Turn a wire response into a result according to the operation's
/// declared response strategy. Failure statuses go through
/// [`classify`] and the operation's not-found policy.
pub fn interpret(
    op: &OperationDescriptor,
    target: &str,
    response: WireResponse,
) -> Result<Interpreted> {
    if !response.is_success() {
        return apply_not_found_policy(op, classify(op, target, &response));
    }

    match op.response {
        ResponseStrategy::Json => {
            if response.body.iter().all(u8::is_ascii_whitespace) {
                return Err(CloudError::parse(
                    op.name,
                    target,
                    format!("empty body (status {})", response.status),
                ));
            }
            serde_json::from_slice(&response.body)
                .map(Interpreted::Document)
                .map_err(|e| CloudError::parse(op.name, target, e.to_string()))
        }
        ResponseStrategy::Header(name) => response
            .header(name)
            .map(|v| Interpreted::Header(v.to_string()))
            .ok_or_else(|| {
                CloudError::parse(op.name, target, format!("response has no {} header", name))
            }),
        ResponseStrategy::Text => Ok(Interpreted::Text(response.text())),
        ResponseStrategy::Void => Ok(Interpreted::Void),
    }
}
