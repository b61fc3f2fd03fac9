//! Per-invocation call arguments

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// An options value that can override payload template placeholders
///
/// Options types are plain immutable values; their `Default` is the
/// "no options" instance. Binders scan a call's arguments for options
/// and let each one contribute placeholder values.
pub trait PayloadOptions: fmt::Debug + Send + Sync {
    /// Placeholder name/value pairs set by this options value
    fn payload_params(&self) -> Vec<(&'static str, String)>;
}

/// One positional argument
#[derive(Debug, Clone)]
pub enum ArgValue {
    /// A string argument; `None` is an explicit null (e.g. "default org")
    Text(Option<String>),
    /// A structured argument serialized as-is by JSON binders
    Json(serde_json::Value),
    /// An options value
    Options(Arc<dyn PayloadOptions>),
}

/// Ordered arguments of a single call plus its named path/payload params
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    values: Vec<ArgValue>,
    path_params: BTreeMap<String, String>,
    payload_params: BTreeMap<String, String>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, value: impl Into<String>) -> Self {
        self.values.push(ArgValue::Text(Some(value.into())));
        self
    }

    /// Push a nullable string argument
    pub fn optional(mut self, value: Option<&str>) -> Self {
        self.values.push(ArgValue::Text(value.map(str::to_string)));
        self
    }

    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.values.push(ArgValue::Json(value));
        self
    }

    pub fn options<O: PayloadOptions + 'static>(mut self, options: O) -> Self {
        self.values.push(ArgValue::Options(Arc::new(options)));
        self
    }

    /// Value for a `{name}` segment of the operation's path template
    pub fn path_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.path_params.insert(name.into(), value.to_string());
        self
    }

    /// Value for a `{{ name }}` placeholder of the payload template
    pub fn payload_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload_params.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, index: usize) -> Option<&ArgValue> {
        self.values.get(index)
    }

    /// String argument at `index`; `None` when absent, null or not a string
    pub fn text_at(&self, index: usize) -> Option<&str> {
        match self.values.get(index) {
            Some(ArgValue::Text(Some(value))) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn path_params(&self) -> &BTreeMap<String, String> {
        &self.path_params
    }

    pub fn payload_params(&self) -> &BTreeMap<String, String> {
        &self.payload_params
    }

    /// Options values among the positional arguments, in call order
    pub fn options_values(&self) -> impl Iterator<Item = &dyn PayloadOptions> {
        self.values.iter().filter_map(|v| match v {
            ArgValue::Options(options) => Some(options.as_ref()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct MemoryOptions {
        megabytes: Option<u32>,
    }

    impl PayloadOptions for MemoryOptions {
        fn payload_params(&self) -> Vec<(&'static str, String)> {
            self.megabytes
                .map(|m| vec![("megabytes", m.to_string())])
                .unwrap_or_default()
        }
    }

    #[test]
    fn test_positional_access() {
        let args = CallArgs::new()
            .optional(None)
            .text("catalog")
            .options(MemoryOptions { megabytes: Some(512) });

        assert_eq!(args.len(), 3);
        assert_eq!(args.text_at(0), None);
        assert_eq!(args.text_at(1), Some("catalog"));
        assert_eq!(args.text_at(2), None);
        assert_eq!(args.options_values().count(), 1);
    }
}
