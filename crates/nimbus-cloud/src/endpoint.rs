//! Endpoint resolution
//!
//! Turns an operation's arguments into the URI it targets. Resolvers may
//! issue read-only provider queries (list orgs, then catalogs, ...) through
//! the dispatcher they are handed, but keep no state of their own: the same
//! arguments against the same listings always give the same URI.

use crate::args::CallArgs;
use crate::dispatch::Dispatcher;
use crate::error::{CloudError, Result};
use async_trait::async_trait;

/// Computes a target URI from call arguments
#[async_trait]
pub trait EndpointResolver: Send + Sync {
    async fn resolve(&self, ctx: &Dispatcher, args: &CallArgs) -> Result<String>;
}

/// Append `path` to `base`, avoiding doubled or missing slashes
pub fn join(base: &str, path: &str) -> String {
    if path.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Fill `{name}` segments of a path template from `args`' path params.
/// Values are percent-encoded as single path segments.
pub fn expand_path(template: &str, args: &CallArgs) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| CloudError::resolution(format!("unclosed '{{' in path {}", template)))?;
        let name = &after[..close];
        let value = args
            .path_params()
            .get(name)
            .ok_or_else(|| CloudError::resolution(format!("no value for path param '{}'", name)))?;
        out.push_str(&encode_segment(value));
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Percent-encode everything but RFC 3986 unreserved characters
pub fn encode_segment(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Decode `%XX` escapes and `+`; malformed escapes are kept literally
pub fn decode_name(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(b) => {
                        out.push(b);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Names are equal ignoring case and URL encoding
pub fn names_match(a: &str, b: &str) -> bool {
    decode_name(a).to_lowercase() == decode_name(b).to_lowercase()
}

/// Pick the entry called `name`, or the single entry when `name` is `None`.
///
/// A `None` name with zero or several candidates is an error: there is no
/// default to fall back on and picking one arbitrarily would hide mistakes.
pub fn select<'a, T>(
    items: &'a [T],
    name: Option<&str>,
    kind: &str,
    name_of: impl Fn(&T) -> &str,
) -> Result<&'a T> {
    match name {
        Some(name) => items
            .iter()
            .find(|item| names_match(name_of(item), name))
            .ok_or_else(|| {
                let known: Vec<&str> = items.iter().map(&name_of).collect();
                CloudError::resolution(format!(
                    "{} '{}' not found (available: {})",
                    kind,
                    name,
                    known.join(", ")
                ))
            }),
        None => match items {
            [only] => Ok(only),
            [] => Err(CloudError::resolution(format!("no {} available", kind))),
            _ => Err(CloudError::resolution(format!(
                "{} {}s available and none specified",
                items.len(),
                kind
            ))),
        },
    }
}
