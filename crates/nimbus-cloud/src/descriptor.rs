//! Static operation metadata
//!
//! Every provider operation is declared once as a `static`
//! [`OperationDescriptor`] and executed by the generic
//! [`Dispatcher`](crate::dispatch::Dispatcher):
//!
//! ```ignore
//! pub static GET_CATALOG: OperationDescriptor = OperationDescriptor::get("get_catalog")
//!     .endpoint(EndpointStrategy::Arg(0))
//!     .consumes(CATALOG_JSON)
//!     .response(ResponseStrategy::Json)
//!     .not_found(NotFoundPolicy::ReturnNone);
//! ```

use crate::transport::Verb;
use std::collections::HashMap;

/// Where the target URI of an operation comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointStrategy {
    /// The dispatcher's base endpoint
    Base,
    /// The positional string argument at this index is itself a URI
    Arg(usize),
    /// A named resolver registered on the dispatcher
    Resolver(&'static str),
}

/// How the request body is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadStrategy {
    None,
    /// The string argument at this index is sent verbatim
    Text { arg: usize },
    /// The JSON argument at this index is serialized
    Json { arg: usize },
    /// A named binder registered on the dispatcher
    Binder(&'static str),
}

/// How a successful response is turned into a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStrategy {
    /// Parse the body as a JSON document
    Json,
    /// Take the value of a response header (e.g. `Location` of a task)
    Header(&'static str),
    /// Body as text
    Text,
    /// No content expected
    Void,
}

/// What a 404 means for this operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotFoundPolicy {
    /// Surface as [`CloudError::NotFound`](crate::CloudError::NotFound)
    #[default]
    Fail,
    /// Succeed with an absent result
    ReturnNone,
}

/// Immutable description of one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub verb: Verb,
    pub endpoint: EndpointStrategy,
    /// Suffix appended to the resolved endpoint; `{name}` segments are
    /// filled from the call's path params
    pub path: Option<&'static str>,
    /// Media type of the request body
    pub produces: Option<&'static str>,
    /// Media type accepted in the response
    pub consumes: Option<&'static str>,
    pub payload: PayloadStrategy,
    pub response: ResponseStrategy,
    pub not_found: NotFoundPolicy,
}

impl OperationDescriptor {
    pub const fn new(name: &'static str, verb: Verb) -> Self {
        Self {
            name,
            verb,
            endpoint: EndpointStrategy::Base,
            path: None,
            produces: None,
            consumes: None,
            payload: PayloadStrategy::None,
            response: ResponseStrategy::Void,
            not_found: NotFoundPolicy::Fail,
        }
    }

    pub const fn get(name: &'static str) -> Self {
        Self::new(name, Verb::Get)
    }

    pub const fn post(name: &'static str) -> Self {
        Self::new(name, Verb::Post)
    }

    pub const fn put(name: &'static str) -> Self {
        Self::new(name, Verb::Put)
    }

    pub const fn delete(name: &'static str) -> Self {
        Self::new(name, Verb::Delete)
    }

    pub const fn endpoint(self, endpoint: EndpointStrategy) -> Self {
        Self { endpoint, ..self }
    }

    pub const fn path(self, path: &'static str) -> Self {
        Self {
            path: Some(path),
            ..self
        }
    }

    pub const fn produces(self, media_type: &'static str) -> Self {
        Self {
            produces: Some(media_type),
            ..self
        }
    }

    pub const fn consumes(self, media_type: &'static str) -> Self {
        Self {
            consumes: Some(media_type),
            ..self
        }
    }

    pub const fn payload(self, payload: PayloadStrategy) -> Self {
        Self { payload, ..self }
    }

    pub const fn response(self, response: ResponseStrategy) -> Self {
        Self { response, ..self }
    }

    pub const fn not_found(self, not_found: NotFoundPolicy) -> Self {
        Self { not_found, ..self }
    }
}

/// Operation descriptors of one provider, keyed by name
#[derive(Debug, Default)]
pub struct OperationTable {
    operations: HashMap<&'static str, &'static OperationDescriptor>,
}

impl OperationTable {
    pub fn new(operations: &[&'static OperationDescriptor]) -> Self {
        Self {
            operations: operations.iter().map(|op| (op.name, *op)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&'static OperationDescriptor> {
        self.operations.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Names of all operations, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.operations.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Operations that turn a 404 into an absent result
    pub fn suppressing_not_found(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .operations
            .values()
            .filter(|op| op.not_found == NotFoundPolicy::ReturnNone)
            .map(|op| op.name)
            .collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static GET_THING: OperationDescriptor = OperationDescriptor::get("get_thing")
        .endpoint(EndpointStrategy::Arg(0))
        .consumes("application/json")
        .response(ResponseStrategy::Json)
        .not_found(NotFoundPolicy::ReturnNone);

    static REBOOT_THING: OperationDescriptor = OperationDescriptor::post("reboot_thing")
        .path("/things/{id}/reboot");

    #[test]
    fn test_const_builder_defaults() {
        assert_eq!(REBOOT_THING.verb, Verb::Post);
        assert_eq!(REBOOT_THING.endpoint, EndpointStrategy::Base);
        assert_eq!(REBOOT_THING.response, ResponseStrategy::Void);
        assert_eq!(REBOOT_THING.not_found, NotFoundPolicy::Fail);
        assert_eq!(REBOOT_THING.path, Some("/things/{id}/reboot"));
    }

    #[test]
    fn test_table_lookup() {
        let table = OperationTable::new(&[&GET_THING, &REBOOT_THING]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("get_thing").unwrap().consumes, Some("application/json"));
        assert!(table.get("missing").is_none());
        assert_eq!(table.names(), vec!["get_thing", "reboot_thing"]);
        assert_eq!(table.suppressing_not_found(), vec!["get_thing"]);
    }
}
