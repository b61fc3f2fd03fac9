//! Generic request dispatcher
//!
//! [`Dispatcher::invoke`] runs one operation end to end:
//!
//! ```text
//! descriptor + args
//!   -> resolve endpoint   (EndpointStrategy / EndpointResolver)
//!   -> bind payload       (PayloadStrategy / PayloadBinder)
//!   -> filters + send     (RequestFilter / Transport)
//!   -> interpret          (ResponseStrategy, classify, NotFoundPolicy)
//! ```
//!
//! Each step can fail on its own. The returned future does nothing until
//! polled, and dropping it cancels the call at its current await point;
//! the in-flight transport future is dropped with it.

use crate::args::CallArgs;
use crate::binder::{PayloadBinder, bind_json, bind_text};
use crate::classify::apply_not_found_policy;
use crate::descriptor::{EndpointStrategy, OperationDescriptor, PayloadStrategy};
use crate::endpoint::{EndpointResolver, expand_path, join};
use crate::error::{CloudError, Result};
use crate::interpret::{Interpreted, interpret};
use crate::transport::{RequestFilter, Transport, WireRequest};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Executes operation descriptors against one provider endpoint
///
/// Holds only read-only configuration plus the shared transport, so one
/// dispatcher serves any number of concurrent invocations.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    base: String,
    filters: Vec<Arc<dyn RequestFilter>>,
    resolvers: HashMap<&'static str, Arc<dyn EndpointResolver>>,
    binders: HashMap<&'static str, Arc<dyn PayloadBinder>>,
}

/// Builder for [`Dispatcher`]
pub struct DispatcherBuilder {
    inner: Dispatcher,
}

impl DispatcherBuilder {
    pub fn filter(mut self, filter: impl RequestFilter + 'static) -> Self {
        self.inner.filters.push(Arc::new(filter));
        self
    }

    pub fn resolver(mut self, name: &'static str, resolver: impl EndpointResolver + 'static) -> Self {
        self.inner.resolvers.insert(name, Arc::new(resolver));
        self
    }

    pub fn binder(mut self, name: &'static str, binder: impl PayloadBinder + 'static) -> Self {
        self.inner.binders.insert(name, Arc::new(binder));
        self
    }

    pub fn build(self) -> Dispatcher {
        self.inner
    }
}

impl Dispatcher {
    pub fn builder(transport: Arc<dyn Transport>, base: impl Into<String>) -> DispatcherBuilder {
        DispatcherBuilder {
            inner: Dispatcher {
                transport,
                base: base.into(),
                filters: Vec::new(),
                resolvers: HashMap::new(),
                binders: HashMap::new(),
            },
        }
    }

    pub fn base_endpoint(&self) -> &str {
        &self.base
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    /// Target URI of `op` for these arguments
    pub async fn resolve(&self, op: &OperationDescriptor, args: &CallArgs) -> Result<String> {
        let endpoint = match op.endpoint {
            EndpointStrategy::Base => self.base.clone(),
            EndpointStrategy::Arg(index) => args
                .text_at(index)
                .map(str::to_string)
                .ok_or_else(|| {
                    CloudError::resolution(format!("argument {} must be an endpoint URI", index))
                })?,
            EndpointStrategy::Resolver(name) => {
                let resolver = self.resolvers.get(name).ok_or_else(|| {
                    CloudError::resolution(format!("no endpoint resolver named '{}'", name))
                })?;
                resolver.resolve(self, args).await?
            }
        };

        match op.path {
            Some(template) => Ok(join(&endpoint, &expand_path(template, args)?)),
            None => Ok(endpoint),
        }
    }

    /// Build the wire request for `op` targeting `uri`, before filters
    pub fn build_request(
        &self,
        op: &OperationDescriptor,
        uri: String,
        args: &CallArgs,
    ) -> Result<WireRequest> {
        let mut request = WireRequest::new(op.verb, uri);
        if let Some(accept) = op.consumes {
            request = request.with_header("Accept", accept);
        }

        let content_type = op.produces.unwrap_or(DEFAULT_CONTENT_TYPE);
        request = match op.payload {
            PayloadStrategy::None => request,
            PayloadStrategy::Text { arg } => bind_text(request, args, arg, content_type)?,
            PayloadStrategy::Json { arg } => bind_json(request, args, arg, content_type)?,
            PayloadStrategy::Binder(name) => {
                let binder = self.binders.get(name).ok_or_else(|| {
                    CloudError::binding(format!("no payload binder named '{}'", name))
                })?;
                binder.bind(request, args)?
            }
        };

        if let (Some(produces), Some(payload)) = (op.produces, request.payload.as_mut()) {
            payload.content_type = produces.to_string();
        }
        Ok(request)
    }

    /// Run `op` and interpret its response
    pub async fn invoke(&self, op: &OperationDescriptor, args: CallArgs) -> Result<Interpreted> {
        self.call(op, args).await.map(|(_, interpreted)| interpreted)
    }

    /// Run `op`, returning the resolved target with the outcome
    async fn call(&self, op: &OperationDescriptor, args: CallArgs) -> Result<(String, Interpreted)> {
        let uri = self
            .resolve(op, &args)
            .await
            .map_err(|e| e.in_operation(op.name))?;
        let mut request = self
            .build_request(op, uri.clone(), &args)
            .map_err(|e| e.in_operation(op.name))?;
        for filter in &self.filters {
            request = filter.filter(request)?;
        }

        tracing::debug!("{} {} ({})", op.verb, uri, op.name);
        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                return apply_not_found_policy(op, e.in_operation(op.name))
                    .map(|interpreted| (uri, interpreted));
            }
        };
        tracing::debug!("{} {} -> {}", op.verb, uri, response.status);

        let interpreted = interpret(op, &uri, response)?;
        Ok((uri, interpreted))
    }

    /// Run `op` on a runtime task; aborting the handle cancels the call
    pub fn spawn(
        self: &Arc<Self>,
        op: &'static OperationDescriptor,
        args: CallArgs,
    ) -> JoinHandle<Result<Interpreted>> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.invoke(op, args).await })
    }

    /// Run `op` and deserialize its JSON document; `None` when absent
    pub async fn invoke_json<T: DeserializeOwned>(
        &self,
        op: &OperationDescriptor,
        args: CallArgs,
    ) -> Result<Option<T>> {
        match self.call(op, args).await? {
            (uri, Interpreted::Document(value)) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| CloudError::parse(op.name, uri, e.to_string())),
            (_, Interpreted::Absent) => Ok(None),
            (uri, other) => Err(unexpected(op, &uri, &other)),
        }
    }

    /// Run `op` and return the header value its response strategy names
    pub async fn invoke_header(
        &self,
        op: &OperationDescriptor,
        args: CallArgs,
    ) -> Result<Option<String>> {
        match self.call(op, args).await? {
            (_, Interpreted::Header(value)) => Ok(Some(value)),
            (_, Interpreted::Absent) => Ok(None),
            (uri, other) => Err(unexpected(op, &uri, &other)),
        }
    }

    pub async fn invoke_text(&self, op: &OperationDescriptor, args: CallArgs) -> Result<Option<String>> {
        match self.call(op, args).await? {
            (_, Interpreted::Text(value)) => Ok(Some(value)),
            (_, Interpreted::Absent) => Ok(None),
            (uri, other) => Err(unexpected(op, &uri, &other)),
        }
    }

    /// Run `op` for its side effect only
    pub async fn invoke_void(&self, op: &OperationDescriptor, args: CallArgs) -> Result<()> {
        self.invoke(op, args).await.map(|_| ())
    }
}

fn unexpected(op: &OperationDescriptor, target: &str, got: &Interpreted) -> CloudError {
    CloudError::parse(
        op.name,
        target,
        format!("response strategy {:?} produced {:?}", op.response, got),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::TemplateBinder;
    use crate::descriptor::{NotFoundPolicy, ResponseStrategy};
    use crate::transport::mock::MockTransport;
    use crate::transport::{CookieFilter, Verb, WireResponse};
    use async_trait::async_trait;
    use serde::Deserialize;

    const BASE: &str = "https://cloud.example/api";

    static LIST_ORGS: OperationDescriptor = OperationDescriptor::get("list_orgs")
        .path("/org")
        .consumes("application/json")
        .response(ResponseStrategy::Json);

    static GET_ORG: OperationDescriptor = OperationDescriptor::get("get_org")
        .endpoint(EndpointStrategy::Resolver("org"))
        .response(ResponseStrategy::Json)
        .not_found(NotFoundPolicy::ReturnNone);

    static STRICT_GET_ORG: OperationDescriptor = OperationDescriptor::get("strict_get_org")
        .endpoint(EndpointStrategy::Resolver("org"))
        .response(ResponseStrategy::Json);

    static CREATE: OperationDescriptor = OperationDescriptor::post("create")
        .endpoint(EndpointStrategy::Arg(0))
        .path("/action/create")
        .produces("application/vnd.create+xml")
        .payload(PayloadStrategy::Binder("create"))
        .response(ResponseStrategy::Header("Location"));

    #[derive(Debug, Deserialize)]
    struct OrgRef {
        name: String,
        href: String,
    }

    #[derive(Debug, Deserialize)]
    struct Org {
        name: String,
    }

    /// Resolves an org href by name with a listing query
    struct OrgByName;

    #[async_trait]
    impl EndpointResolver for OrgByName {
        async fn resolve(&self, ctx: &Dispatcher, args: &CallArgs) -> Result<String> {
            let orgs: Vec<OrgRef> = ctx
                .invoke_json(&LIST_ORGS, CallArgs::new())
                .await?
                .unwrap_or_default();
            let org = crate::endpoint::select(&orgs, args.text_at(0), "org", |o| o.name.as_str())?;
            Ok(org.href.clone())
        }
    }

    fn dispatcher(mock: Arc<MockTransport>) -> Dispatcher {
        Dispatcher::builder(mock, BASE)
            .filter(CookieFilter::new("token", "abc"))
            .resolver("org", OrgByName)
            .binder(
                "create",
                TemplateBinder::xml("<Create name=\"{{ name }}\"/>", "application/xml"),
            )
            .build()
    }

    fn org_listing() -> WireResponse {
        WireResponse::json(
            200,
            &serde_json::json!([
                {"name": "Org1", "href": "https://cloud.example/api/org/1"},
                {"name": "Org2", "href": "https://cloud.example/api/org/2"}
            ]),
        )
    }

    #[tokio::test]
    async fn test_resolution_is_repeatable() {
        let mock = Arc::new(MockTransport::new());
        mock.on(Verb::Get, format!("{}/org", BASE), org_listing());
        let d = dispatcher(mock.clone());

        let args = CallArgs::new().text("org2");
        let first = d.resolve(&GET_ORG, &args).await.unwrap();
        let second = d.resolve(&GET_ORG, &args).await.unwrap();
        assert_eq!(first, "https://cloud.example/api/org/2");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_ambiguous_default_fails_resolution() {
        let mock = Arc::new(MockTransport::new());
        mock.on(Verb::Get, format!("{}/org", BASE), org_listing());
        let d = dispatcher(mock.clone());

        let err = d
            .invoke(&GET_ORG, CallArgs::new().optional(None))
            .await
            .unwrap_err();
        match err {
            CloudError::Resolution { operation, reason } => {
                assert_eq!(operation, "get_org");
                assert!(reason.contains("none specified"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_not_found_suppressed_only_when_declared() {
        let mock = Arc::new(MockTransport::new());
        mock.on(Verb::Get, format!("{}/org", BASE), org_listing());
        mock.on(Verb::Get, "https://cloud.example/api/org/1", WireResponse::new(404));
        let d = dispatcher(mock.clone());

        let found: Option<Org> = d
            .invoke_json(&GET_ORG, CallArgs::new().text("Org1"))
            .await
            .unwrap();
        assert!(found.is_none());

        let err = d
            .invoke_json::<Org>(&STRICT_GET_ORG, CallArgs::new().text("Org1"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_typed_document_result() {
        let mock = Arc::new(MockTransport::new());
        mock.on(Verb::Get, format!("{}/org", BASE), org_listing());
        mock.on(
            Verb::Get,
            "https://cloud.example/api/org/2",
            WireResponse::json(200, &serde_json::json!({"name": "Org2"})),
        );
        let d = dispatcher(mock.clone());

        let org: Org = d
            .invoke_json(&GET_ORG, CallArgs::new().text("Org2"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(org.name, "Org2");
    }

    #[tokio::test]
    async fn test_request_synthesis() {
        let mock = Arc::new(MockTransport::new());
        let vdc = "https://cloud.example/api/vdc/9";
        mock.on(
            Verb::Post,
            format!("{}/action/create", vdc),
            WireResponse::new(202).with_header("Location", "https://cloud.example/api/task/1"),
        );
        let d = dispatcher(mock.clone());

        let location = d
            .invoke_header(&CREATE, CallArgs::new().text(vdc).payload_param("name", "web"))
            .await
            .unwrap();
        assert_eq!(location.as_deref(), Some("https://cloud.example/api/task/1"));

        let sent = &mock.requests()[0];
        assert_eq!(sent.verb, Verb::Post);
        assert_eq!(sent.header("Cookie"), Some("token=abc"));
        let payload = sent.payload.as_ref().unwrap();
        assert_eq!(payload.content_type, "application/vnd.create+xml");
        assert_eq!(payload.as_str(), Some("<Create name=\"web\"/>"));
    }

    #[tokio::test]
    async fn test_binding_error_stops_before_send() {
        let mock = Arc::new(MockTransport::new());
        let d = dispatcher(mock.clone());

        let err = d
            .invoke(&CREATE, CallArgs::new().text("https://cloud.example/api/vdc/9"))
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::Binding { ref operation, .. } if operation == "create"));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_classified() {
        let mock = Arc::new(MockTransport::new());
        mock.fail(Verb::Get, format!("{}/org", BASE), "connection refused");
        let d = dispatcher(mock.clone());

        let err = d.invoke(&LIST_ORGS, CallArgs::new()).await.unwrap_err();
        match err {
            CloudError::Transport {
                operation,
                target,
                message,
            } => {
                assert_eq!(operation, "list_orgs");
                assert_eq!(target, format!("{}/org", BASE));
                assert_eq!(message, "connection refused");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_spawned_invocations_are_independent() {
        let mock = Arc::new(MockTransport::new());
        mock.on(Verb::Get, format!("{}/org", BASE), org_listing());
        let d = Arc::new(dispatcher(mock.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| d.spawn(&LIST_ORGS, CallArgs::new()))
            .collect();
        for handle in handles {
            assert!(matches!(handle.await.unwrap(), Ok(Interpreted::Document(_))));
        }
        assert_eq!(mock.count(Verb::Get, &format!("{}/org", BASE)), 8);
    }
}
