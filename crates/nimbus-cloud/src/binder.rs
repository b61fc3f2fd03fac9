//! Request payload binding

use crate::args::{ArgValue, CallArgs};
use crate::error::{CloudError, Result};
use crate::transport::{Payload, WireRequest};
use std::collections::BTreeMap;
use tera::{Context, Tera};

/// Produces the body of a request from the call's arguments
///
/// Binders must not depend on anything but their own configuration and
/// the arguments: binding the same call twice yields the same bytes.
pub trait PayloadBinder: Send + Sync {
    fn bind(&self, request: WireRequest, args: &CallArgs) -> Result<WireRequest>;
}

/// Renders a tera payload template with `{{ name }}` placeholders
///
/// Values are looked up, lowest priority first, in the binder's defaults,
/// the call's payload params, then any options values among the call's
/// arguments. A placeholder with no value anywhere fails the bind.
#[derive(Debug, Clone)]
pub struct TemplateBinder {
    template: String,
    content_type: String,
    defaults: BTreeMap<String, String>,
    escape_xml: bool,
}

impl TemplateBinder {
    pub fn new(template: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            content_type: content_type.into(),
            defaults: BTreeMap::new(),
            escape_xml: false,
        }
    }

    /// A template whose substituted values are XML-escaped
    pub fn xml(template: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            escape_xml: true,
            ..Self::new(template, content_type)
        }
    }

    /// Provider default for a placeholder; `None` leaves it unset
    pub fn with_default(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.defaults.insert(name.into(), value);
        }
        self
    }

    /// Merged placeholder values for a call
    pub fn params(&self, args: &CallArgs) -> BTreeMap<String, String> {
        let mut params = self.defaults.clone();
        params.extend(
            args.payload_params()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        for options in args.options_values() {
            for (name, value) in options.payload_params() {
                params.insert(name.to_string(), value);
            }
        }
        params
    }

    pub fn render(&self, args: &CallArgs) -> Result<String> {
        let mut context = Context::new();
        for (name, value) in self.params(args) {
            context.insert(name, &value);
        }

        // autoescape applies by template name suffix
        let name = if self.escape_xml { "payload.xml" } else { "payload" };
        let mut tera = Tera::default();
        tera.set_escape_fn(xml_escape);
        tera.add_raw_template(name, &self.template)
            .map_err(|e| CloudError::binding(tera_error_detail(&e)))?;
        tera.render(name, &context)
            .map_err(|e| CloudError::binding(tera_error_detail(&e)))
    }
}

impl PayloadBinder for TemplateBinder {
    fn bind(&self, request: WireRequest, args: &CallArgs) -> Result<WireRequest> {
        let body = self.render(args)?;
        Ok(request.with_payload(Payload::new(self.content_type.clone(), body)))
    }
}

/// Innermost cause of a tera failure, which names the missing variable
fn tera_error_detail(error: &tera::Error) -> String {
    let mut detail = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        detail = cause.to_string();
        source = cause.source();
    }
    detail
}

fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Send the string argument at `index` as the body
pub fn bind_text(
    request: WireRequest,
    args: &CallArgs,
    index: usize,
    content_type: &str,
) -> Result<WireRequest> {
    let text = args
        .text_at(index)
        .ok_or_else(|| CloudError::binding(format!("argument {} is not a string payload", index)))?;
    Ok(request.with_payload(Payload::new(content_type, text)))
}

/// Serialize the JSON argument at `index` as the body
pub fn bind_json(
    request: WireRequest,
    args: &CallArgs,
    index: usize,
    content_type: &str,
) -> Result<WireRequest> {
    match args.get(index) {
        Some(ArgValue::Json(value)) => {
            let body = serde_json::to_vec(value)?;
            Ok(request.with_payload(Payload::new(content_type, body)))
        }
        _ => Err(CloudError::binding(format!(
            "argument {} is not a JSON payload",
            index
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::PayloadOptions;
    use crate::transport::Verb;

    const TEMPLATE: &str =
        r#"<Params name="{{ name }}"><Cpu>{{ count }}</Cpu><Mem>{{ megabytes }}</Mem><Net href="{{ network }}"/></Params>"#;

    #[derive(Debug)]
    struct CpuOptions(u32);

    impl PayloadOptions for CpuOptions {
        fn payload_params(&self) -> Vec<(&'static str, String)> {
            vec![("count", self.0.to_string())]
        }
    }

    fn binder() -> TemplateBinder {
        TemplateBinder::xml(TEMPLATE, "application/xml")
            .with_default("network", Some("https://vcloud/network/1".to_string()))
            .with_default("count", Some("1".to_string()))
            .with_default("megabytes", Some("512".to_string()))
    }

    #[test]
    fn test_defaults_overridden_by_options() {
        let args = CallArgs::new()
            .payload_param("name", "web&db")
            .options(CpuOptions(4));

        let body = binder().render(&args).unwrap();
        assert_eq!(
            body,
            r#"<Params name="web&amp;db"><Cpu>4</Cpu><Mem>512</Mem><Net href="https://vcloud/network/1"/></Params>"#
        );
    }

    #[test]
    fn test_binding_is_idempotent() {
        let args = CallArgs::new().payload_param("name", "n1");
        let request = WireRequest::new(Verb::Post, "https://vcloud/vdc/1");

        let first = binder().bind(request.clone(), &args).unwrap();
        let second = binder().bind(request, &args).unwrap();
        assert_eq!(first.payload, second.payload);
    }

    #[test]
    fn test_missing_placeholder_fails() {
        let binder = TemplateBinder::xml(TEMPLATE, "application/xml")
            .with_default("network", None)
            .with_default("count", Some("1".to_string()))
            .with_default("megabytes", Some("512".to_string()));
        let err = binder
            .render(&CallArgs::new().payload_param("name", "n1"))
            .unwrap_err();

        assert!(matches!(err, CloudError::Binding { .. }));
        assert!(err.to_string().contains("network"));
    }

    #[test]
    fn test_plain_template_keeps_json_braces_unescaped() {
        let binder = TemplateBinder::new(r#"{ "name": "{{ name }}" }"#, "application/json");
        let body = binder
            .render(&CallArgs::new().payload_param("name", "a<b"))
            .unwrap();
        assert_eq!(body, r#"{ "name": "a<b" }"#);
    }

    #[test]
    fn test_malformed_template_fails_binding() {
        let binder = TemplateBinder::xml("<Params name=\"{{ name \"/>", "application/xml");
        let err = binder
            .render(&CallArgs::new().payload_param("name", "n1"))
            .unwrap_err();
        assert!(matches!(err, CloudError::Binding { .. }));
    }

    #[test]
    fn test_bind_text_and_json() {
        let request = WireRequest::new(Verb::Put, "https://x");
        let args = CallArgs::new().text("hello").json(serde_json::json!({"a": 1}));

        let text = bind_text(request.clone(), &args, 0, "text/plain").unwrap();
        assert_eq!(text.payload.unwrap().as_str(), Some("hello"));

        let json = bind_json(request.clone(), &args, 1, "application/json").unwrap();
        assert_eq!(json.payload.unwrap().as_str(), Some(r#"{"a":1}"#));

        assert!(bind_json(request, &args, 0, "application/json").is_err());
    }
}
