//! vCloud Express operation table
//!
//! Every remote call the client makes is declared here. Lookups by href
//! take the href as argument 0; `find_*_named` lookups resolve names to an
//! href through the resolvers in [`crate::resolvers`].

use nimbus_cloud::{
    EndpointStrategy, NotFoundPolicy, OperationDescriptor, OperationTable, PayloadStrategy,
    ResponseStrategy,
};

pub const ORG_LIST: &str = "application/vnd.vmware.vcloud.orgList+json";
pub const ORG: &str = "application/vnd.vmware.vcloud.org+json";
pub const CATALOG: &str = "application/vnd.vmware.vcloud.catalog+json";
pub const CATALOG_ITEM: &str = "application/vnd.vmware.vcloud.catalogItem+json";
pub const VDC: &str = "application/vnd.vmware.vcloud.vdc+json";
pub const VAPP_TEMPLATE: &str = "application/vnd.vmware.vcloud.vAppTemplate+json";
pub const NETWORK: &str = "application/vnd.vmware.vcloud.network+json";
pub const VAPP: &str = "application/vnd.vmware.vcloud.vApp+json";
pub const TASK: &str = "application/vnd.vmware.vcloud.task+json";

pub const INSTANTIATE_PARAMS: &str =
    "application/vnd.vmware.vcloud.instantiateVAppTemplateParams+xml";
pub const CLONE_PARAMS: &str = "application/vnd.vmware.vcloud.cloneVAppParams+xml";

/// Resolver names registered on the dispatcher
pub mod resolver {
    pub const ORG: &str = "org_name";
    pub const ORG_CATALOG: &str = "org_catalog_name";
    pub const ORG_CATALOG_ITEM: &str = "org_catalog_item_name";
    pub const ORG_VDC_ENTITY: &str = "org_vdc_entity_name";
}

/// Binder names registered on the dispatcher
pub mod binder {
    pub const INSTANTIATE: &str = "instantiate_vapp_template_params";
    pub const CLONE: &str = "clone_vapp_params";
}

const BY_HREF: EndpointStrategy = EndpointStrategy::Arg(0);

/// Session login; the token comes back as a cookie
pub static LOGIN: OperationDescriptor = OperationDescriptor::post("login")
    .path("/login")
    .response(ResponseStrategy::Header("Set-Cookie"));

pub static LIST_ORGS: OperationDescriptor = OperationDescriptor::get("list_orgs")
    .path("/org")
    .consumes(ORG_LIST)
    .response(ResponseStrategy::Json);

pub static GET_ORG: OperationDescriptor = OperationDescriptor::get("get_org")
    .endpoint(BY_HREF)
    .consumes(ORG)
    .response(ResponseStrategy::Json)
    .not_found(NotFoundPolicy::ReturnNone);

pub static FIND_ORG_NAMED: OperationDescriptor = OperationDescriptor::get("find_org_named")
    .endpoint(EndpointStrategy::Resolver(resolver::ORG))
    .consumes(ORG)
    .response(ResponseStrategy::Json)
    .not_found(NotFoundPolicy::ReturnNone);

pub static GET_CATALOG: OperationDescriptor = OperationDescriptor::get("get_catalog")
    .endpoint(BY_HREF)
    .consumes(CATALOG)
    .response(ResponseStrategy::Json)
    .not_found(NotFoundPolicy::ReturnNone);

pub static FIND_CATALOG_IN_ORG_NAMED: OperationDescriptor =
    OperationDescriptor::get("find_catalog_in_org_named")
        .endpoint(EndpointStrategy::Resolver(resolver::ORG_CATALOG))
        .consumes(CATALOG)
        .response(ResponseStrategy::Json)
        .not_found(NotFoundPolicy::ReturnNone);

pub static GET_CATALOG_ITEM: OperationDescriptor = OperationDescriptor::get("get_catalog_item")
    .endpoint(BY_HREF)
    .consumes(CATALOG_ITEM)
    .response(ResponseStrategy::Json)
    .not_found(NotFoundPolicy::ReturnNone);

pub static GET_VDC: OperationDescriptor = OperationDescriptor::get("get_vdc")
    .endpoint(BY_HREF)
    .consumes(VDC)
    .response(ResponseStrategy::Json)
    .not_found(NotFoundPolicy::ReturnNone);

pub static GET_VAPP_TEMPLATE: OperationDescriptor = OperationDescriptor::get("get_vapp_template")
    .endpoint(BY_HREF)
    .consumes(VAPP_TEMPLATE)
    .response(ResponseStrategy::Json)
    .not_found(NotFoundPolicy::ReturnNone);

pub static FIND_VAPP_TEMPLATE_IN_ORG_CATALOG_NAMED: OperationDescriptor =
    OperationDescriptor::get("find_vapp_template_in_org_catalog_named")
        .endpoint(EndpointStrategy::Resolver(resolver::ORG_CATALOG_ITEM))
        .consumes(VAPP_TEMPLATE)
        .response(ResponseStrategy::Json)
        .not_found(NotFoundPolicy::ReturnNone);

pub static GET_NETWORK: OperationDescriptor = OperationDescriptor::get("get_network")
    .endpoint(BY_HREF)
    .consumes(NETWORK)
    .response(ResponseStrategy::Json)
    .not_found(NotFoundPolicy::ReturnNone);

pub static FIND_NETWORK_IN_ORG_VDC_NAMED: OperationDescriptor =
    OperationDescriptor::get("find_network_in_org_vdc_named")
        .endpoint(EndpointStrategy::Resolver(resolver::ORG_VDC_ENTITY))
        .consumes(NETWORK)
        .response(ResponseStrategy::Json)
        .not_found(NotFoundPolicy::ReturnNone);

pub static INSTANTIATE_VAPP_TEMPLATE_IN_VDC: OperationDescriptor =
    OperationDescriptor::post("instantiate_vapp_template_in_vdc")
        .endpoint(BY_HREF)
        .path("/action/instantiateVAppTemplate")
        .produces(INSTANTIATE_PARAMS)
        .consumes(VAPP)
        .payload(PayloadStrategy::Binder(binder::INSTANTIATE))
        .response(ResponseStrategy::Json);

pub static CLONE_VAPP_IN_VDC: OperationDescriptor = OperationDescriptor::post("clone_vapp_in_vdc")
    .endpoint(BY_HREF)
    .path("/action/cloneVApp")
    .produces(CLONE_PARAMS)
    .consumes(TASK)
    .payload(PayloadStrategy::Binder(binder::CLONE))
    .response(ResponseStrategy::Json);

pub static FIND_VAPP_IN_ORG_VDC_NAMED: OperationDescriptor =
    OperationDescriptor::get("find_vapp_in_org_vdc_named")
        .endpoint(EndpointStrategy::Resolver(resolver::ORG_VDC_ENTITY))
        .consumes(VAPP)
        .response(ResponseStrategy::Json)
        .not_found(NotFoundPolicy::ReturnNone);

pub static GET_VAPP: OperationDescriptor = OperationDescriptor::get("get_vapp")
    .endpoint(BY_HREF)
    .consumes(VAPP)
    .response(ResponseStrategy::Json)
    .not_found(NotFoundPolicy::ReturnNone);

const fn vapp_action(name: &'static str, path: &'static str) -> OperationDescriptor {
    OperationDescriptor::post(name)
        .endpoint(BY_HREF)
        .path(path)
        .consumes(TASK)
        .response(ResponseStrategy::Json)
}

pub static DEPLOY_VAPP: OperationDescriptor = vapp_action("deploy_vapp", "/action/deploy");
pub static UNDEPLOY_VAPP: OperationDescriptor = vapp_action("undeploy_vapp", "/action/undeploy");
pub static POWER_ON_VAPP: OperationDescriptor =
    vapp_action("power_on_vapp", "/power/action/powerOn");
pub static POWER_OFF_VAPP: OperationDescriptor =
    vapp_action("power_off_vapp", "/power/action/powerOff");
pub static RESET_VAPP: OperationDescriptor = vapp_action("reset_vapp", "/power/action/reset");
pub static SUSPEND_VAPP: OperationDescriptor =
    vapp_action("suspend_vapp", "/power/action/suspend");

pub static SHUTDOWN_VAPP: OperationDescriptor = OperationDescriptor::post("shutdown_vapp")
    .endpoint(BY_HREF)
    .path("/power/action/shutdown")
    .response(ResponseStrategy::Void);

pub static DELETE_VAPP: OperationDescriptor = OperationDescriptor::delete("delete_vapp")
    .endpoint(BY_HREF)
    .response(ResponseStrategy::Header("Location"))
    .not_found(NotFoundPolicy::ReturnNone);

pub static GET_TASK: OperationDescriptor = OperationDescriptor::get("get_task")
    .endpoint(BY_HREF)
    .consumes(TASK)
    .response(ResponseStrategy::Json)
    .not_found(NotFoundPolicy::ReturnNone);

/// All vCloud Express operations, keyed by name
pub fn operations() -> OperationTable {
    OperationTable::new(&[
        &LOGIN,
        &LIST_ORGS,
        &GET_ORG,
        &FIND_ORG_NAMED,
        &GET_CATALOG,
        &FIND_CATALOG_IN_ORG_NAMED,
        &GET_CATALOG_ITEM,
        &GET_VDC,
        &GET_VAPP_TEMPLATE,
        &FIND_VAPP_TEMPLATE_IN_ORG_CATALOG_NAMED,
        &GET_NETWORK,
        &FIND_NETWORK_IN_ORG_VDC_NAMED,
        &INSTANTIATE_VAPP_TEMPLATE_IN_VDC,
        &CLONE_VAPP_IN_VDC,
        &FIND_VAPP_IN_ORG_VDC_NAMED,
        &GET_VAPP,
        &DEPLOY_VAPP,
        &UNDEPLOY_VAPP,
        &POWER_ON_VAPP,
        &POWER_OFF_VAPP,
        &SHUTDOWN_VAPP,
        &RESET_VAPP,
        &SUSPEND_VAPP,
        &DELETE_VAPP,
        &GET_TASK,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_cloud::Verb;

    #[test]
    fn test_table_is_complete() {
        let table = operations();
        assert_eq!(table.len(), 25);
        assert_eq!(
            table.get("delete_vapp").map(|op| op.response),
            Some(ResponseStrategy::Header("Location"))
        );
        assert_eq!(
            table.get("shutdown_vapp").map(|op| op.response),
            Some(ResponseStrategy::Void)
        );
    }

    #[test]
    fn test_not_found_suppression_is_limited_to_lookups_and_delete() {
        let table = operations();
        for name in table.suppressing_not_found() {
            assert!(
                name.starts_with("get_") || name.starts_with("find_") || name == "delete_vapp",
                "{} suppresses not-found",
                name
            );
        }
        for name in table.names() {
            let op = table.get(name).unwrap();
            if name.starts_with("get_") || name.starts_with("find_") {
                assert_eq!(op.not_found, NotFoundPolicy::ReturnNone, "{}", name);
            }
            if op.verb == Verb::Post {
                assert_eq!(op.not_found, NotFoundPolicy::Fail, "{}", name);
            }
        }
    }
}
