//! Name-based endpoint resolvers
//!
//! Each resolver walks the org → catalog/vdc → item hierarchy with
//! read-only lookups. A `None` org, catalog or vdc name picks the only one
//! available; with several to choose from, resolution fails.

use crate::domain::{Catalog, CatalogItem, Org, ReferenceType, Vdc};
use crate::ops;
use async_trait::async_trait;
use nimbus_cloud::endpoint::select;
use nimbus_cloud::{CallArgs, CloudError, Dispatcher, EndpointResolver, OperationDescriptor, Result};
use serde::de::DeserializeOwned;

async fn fetch<T: DeserializeOwned>(
    ctx: &Dispatcher,
    op: &OperationDescriptor,
    reference: &ReferenceType,
    kind: &str,
) -> Result<T> {
    ctx.invoke_json(op, CallArgs::new().text(&reference.href))
        .await?
        .ok_or_else(|| {
            CloudError::resolution(format!("{} '{}' disappeared while resolving", kind, reference.name))
        })
}

async fn fetch_org(ctx: &Dispatcher, name: Option<&str>) -> Result<Org> {
    let orgs: Vec<ReferenceType> = ctx
        .invoke_json(&ops::LIST_ORGS, CallArgs::new())
        .await?
        .unwrap_or_default();
    let reference = select(&orgs, name, "org", |o| o.name.as_str())?;
    fetch(ctx, &ops::GET_ORG, reference, "org").await
}

fn required<'a>(args: &'a CallArgs, index: usize, what: &str) -> Result<&'a str> {
    args.text_at(index)
        .ok_or_else(|| CloudError::resolution(format!("{} name is required", what)))
}

/// `(org?)` → org href
pub struct OrgNameToEndpoint;

#[async_trait]
impl EndpointResolver for OrgNameToEndpoint {
    async fn resolve(&self, ctx: &Dispatcher, args: &CallArgs) -> Result<String> {
        let orgs: Vec<ReferenceType> = ctx
            .invoke_json(&ops::LIST_ORGS, CallArgs::new())
            .await?
            .unwrap_or_default();
        Ok(select(&orgs, args.text_at(0), "org", |o| o.name.as_str())?
            .href
            .clone())
    }
}

/// `(org?, catalog?)` → catalog href
pub struct OrgNameAndCatalogNameToEndpoint;

#[async_trait]
impl EndpointResolver for OrgNameAndCatalogNameToEndpoint {
    async fn resolve(&self, ctx: &Dispatcher, args: &CallArgs) -> Result<String> {
        let org = fetch_org(ctx, args.text_at(0)).await?;
        let catalog = select(&org.catalogs, args.text_at(1), "catalog", |c| c.name.as_str())?;
        Ok(catalog.href.clone())
    }
}

/// `(org?, catalog?, template)` → vApp template href
pub struct OrgNameCatalogNameVAppTemplateNameToEndpoint;

#[async_trait]
impl EndpointResolver for OrgNameCatalogNameVAppTemplateNameToEndpoint {
    async fn resolve(&self, ctx: &Dispatcher, args: &CallArgs) -> Result<String> {
        let item_name = required(args, 2, "vApp template")?;
        let org = fetch_org(ctx, args.text_at(0)).await?;
        let reference = select(&org.catalogs, args.text_at(1), "catalog", |c| c.name.as_str())?;
        let catalog: Catalog = fetch(ctx, &ops::GET_CATALOG, reference, "catalog").await?;

        let item_ref = select(&catalog.catalog_items, Some(item_name), "catalog item", |i| {
            i.name.as_str()
        })?;
        let item: CatalogItem = fetch(ctx, &ops::GET_CATALOG_ITEM, item_ref, "catalog item").await?;
        Ok(item.entity.href)
    }
}

/// `(org?, vdc?, entity)` → href of a vApp, template or network in the vdc
pub struct OrgNameVdcNameResourceEntityNameToEndpoint;

#[async_trait]
impl EndpointResolver for OrgNameVdcNameResourceEntityNameToEndpoint {
    async fn resolve(&self, ctx: &Dispatcher, args: &CallArgs) -> Result<String> {
        let entity_name = required(args, 2, "resource entity")?;
        let org = fetch_org(ctx, args.text_at(0)).await?;
        let reference = select(&org.vdcs, args.text_at(1), "vdc", |v| v.name.as_str())?;
        let vdc: Vdc = fetch(ctx, &ops::GET_VDC, reference, "vdc").await?;

        let entities: Vec<&ReferenceType> = vdc.entities().collect();
        let entity = select(&entities, Some(entity_name), "entity", |e| e.name.as_str())?;
        Ok(entity.href.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_cloud::transport::mock::MockTransport;
    use nimbus_cloud::{Verb, WireResponse};
    use serde_json::json;
    use std::sync::Arc;

    const BASE: &str = "https://vcloud.example/api";

    fn dispatcher(mock: Arc<MockTransport>) -> Dispatcher {
        Dispatcher::builder(mock, BASE).build()
    }

    fn seed(mock: &MockTransport) {
        mock.on(
            Verb::Get,
            format!("{}/org", BASE),
            WireResponse::json(200, &json!([{"name": "Acme Corp", "href": format!("{}/org/1", BASE)}])),
        );
        mock.on(
            Verb::Get,
            format!("{}/org/1", BASE),
            WireResponse::json(
                200,
                &json!({
                    "name": "Acme Corp",
                    "href": format!("{}/org/1", BASE),
                    "catalogs": [
                        {"name": "public", "href": format!("{}/catalog/1", BASE)},
                        {"name": "private", "href": format!("{}/catalog/2", BASE)}
                    ],
                    "vdcs": [{"name": "Miami", "href": format!("{}/vdc/1", BASE)}]
                }),
            ),
        );
        mock.on(
            Verb::Get,
            format!("{}/catalog/1", BASE),
            WireResponse::json(
                200,
                &json!({
                    "name": "public",
                    "href": format!("{}/catalog/1", BASE),
                    "catalogItems": [{"name": "Ubuntu 10.04", "href": format!("{}/catalogItem/5", BASE)}]
                }),
            ),
        );
        mock.on(
            Verb::Get,
            format!("{}/catalogItem/5", BASE),
            WireResponse::json(
                200,
                &json!({
                    "name": "Ubuntu 10.04",
                    "href": format!("{}/catalogItem/5", BASE),
                    "entity": {"name": "Ubuntu 10.04", "href": format!("{}/vAppTemplate/5", BASE)}
                }),
            ),
        );
        mock.on(
            Verb::Get,
            format!("{}/vdc/1", BASE),
            WireResponse::json(
                200,
                &json!({
                    "name": "Miami",
                    "href": format!("{}/vdc/1", BASE),
                    "resourceEntities": [{"name": "web-1", "href": format!("{}/vapp/10", BASE)}],
                    "availableNetworks": [{"name": "10.1.1.0/24", "href": format!("{}/network/7", BASE)}]
                }),
            ),
        );
    }

    #[tokio::test]
    async fn test_org_default_and_encoded_names() {
        let mock = Arc::new(MockTransport::new());
        seed(&mock);
        let d = dispatcher(mock);

        let by_default = OrgNameToEndpoint
            .resolve(&d, &CallArgs::new().optional(None))
            .await
            .unwrap();
        let by_name = OrgNameToEndpoint
            .resolve(&d, &CallArgs::new().text("acme%20corp"))
            .await
            .unwrap();
        assert_eq!(by_default, format!("{}/org/1", BASE));
        assert_eq!(by_default, by_name);
    }

    #[tokio::test]
    async fn test_catalog_requires_name_when_ambiguous() {
        let mock = Arc::new(MockTransport::new());
        seed(&mock);
        let d = dispatcher(mock);

        let err = OrgNameAndCatalogNameToEndpoint
            .resolve(&d, &CallArgs::new().optional(None).optional(None))
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::Resolution { ref reason, .. } if reason.contains("2 catalogs")));

        let href = OrgNameAndCatalogNameToEndpoint
            .resolve(&d, &CallArgs::new().optional(None).text("PRIVATE"))
            .await
            .unwrap();
        assert_eq!(href, format!("{}/catalog/2", BASE));
    }

    #[tokio::test]
    async fn test_template_resolves_through_catalog_item() {
        let mock = Arc::new(MockTransport::new());
        seed(&mock);
        let d = dispatcher(mock);

        let href = OrgNameCatalogNameVAppTemplateNameToEndpoint
            .resolve(
                &d,
                &CallArgs::new()
                    .optional(None)
                    .text("public")
                    .text("ubuntu 10.04"),
            )
            .await
            .unwrap();
        assert_eq!(href, format!("{}/vAppTemplate/5", BASE));
    }

    #[tokio::test]
    async fn test_vdc_entities_cover_vapps_and_networks() {
        let mock = Arc::new(MockTransport::new());
        seed(&mock);
        let d = dispatcher(mock);

        let vapp = OrgNameVdcNameResourceEntityNameToEndpoint
            .resolve(&d, &CallArgs::new().optional(None).optional(None).text("web-1"))
            .await
            .unwrap();
        let network = OrgNameVdcNameResourceEntityNameToEndpoint
            .resolve(
                &d,
                &CallArgs::new().text("Acme Corp").text("miami").text("10.1.1.0%2F24"),
            )
            .await
            .unwrap();
        assert_eq!(vapp, format!("{}/vapp/10", BASE));
        assert_eq!(network, format!("{}/network/7", BASE));
    }

    #[tokio::test]
    async fn test_missing_entity_lists_candidates() {
        let mock = Arc::new(MockTransport::new());
        seed(&mock);
        let d = dispatcher(mock);

        let err = OrgNameVdcNameResourceEntityNameToEndpoint
            .resolve(&d, &CallArgs::new().optional(None).optional(None).text("db-1"))
            .await
            .unwrap_err();
        match err {
            CloudError::Resolution { reason, .. } => {
                assert!(reason.contains("'db-1' not found"));
                assert!(reason.contains("web-1"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = OrgNameVdcNameResourceEntityNameToEndpoint
            .resolve(&d, &CallArgs::new().optional(None).optional(None))
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::Resolution { .. }));
    }
}
