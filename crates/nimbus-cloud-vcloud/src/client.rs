//! vCloud Express API client

use crate::binders::{clone_binder, instantiate_binder};
use crate::config::VCloudConfig;
use crate::domain::{Catalog, Org, OrgNetwork, ReferenceType, Task, TaskStatus, VApp, VAppTemplate};
use crate::error::{Result, VCloudError};
use crate::ops::{self, binder, resolver};
use crate::options::{CloneVAppOptions, InstantiateVAppTemplateOptions};
use crate::resolvers::{
    OrgNameAndCatalogNameToEndpoint, OrgNameCatalogNameVAppTemplateNameToEndpoint,
    OrgNameToEndpoint, OrgNameVdcNameResourceEntityNameToEndpoint,
};
use nimbus_cloud::{
    BasicAuthFilter, CallArgs, CloudError, CookieFilter, Dispatcher, OperationDescriptor,
    PollConfig, Transport, retry_until,
};
use std::sync::Arc;

/// Name of the session cookie set by `/login`
pub const TOKEN_COOKIE: &str = "vcloud-token";

/// An authenticated vCloud Express session
pub struct VCloudClient {
    dispatcher: Arc<Dispatcher>,
    task_poll: PollConfig,
}

impl VCloudClient {
    /// Log in and build a client whose requests carry the session cookie
    pub async fn connect(config: &VCloudConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let login = Dispatcher::builder(transport.clone(), &config.endpoint)
            .filter(BasicAuthFilter::new(&config.user, &config.password))
            .build();
        let cookie = login
            .invoke_header(&ops::LOGIN, CallArgs::new())
            .await?
            .ok_or_else(|| VCloudError::LoginFailed("no session cookie returned".to_string()))?;
        let token = parse_token(&cookie)?;
        tracing::info!("Logged in to {} as {}", config.endpoint, config.user);

        Ok(Self::with_token(config, transport, &token))
    }

    /// Build a client for an existing session token
    pub fn with_token(config: &VCloudConfig, transport: Arc<dyn Transport>, token: &str) -> Self {
        let dispatcher = Dispatcher::builder(transport, &config.endpoint)
            .filter(CookieFilter::new(TOKEN_COOKIE, token))
            .resolver(resolver::ORG, OrgNameToEndpoint)
            .resolver(resolver::ORG_CATALOG, OrgNameAndCatalogNameToEndpoint)
            .resolver(resolver::ORG_CATALOG_ITEM, OrgNameCatalogNameVAppTemplateNameToEndpoint)
            .resolver(resolver::ORG_VDC_ENTITY, OrgNameVdcNameResourceEntityNameToEndpoint)
            .binder(binder::INSTANTIATE, instantiate_binder(config))
            .binder(binder::CLONE, clone_binder())
            .build();

        Self {
            dispatcher: Arc::new(dispatcher),
            task_poll: config.task_poll,
        }
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.clone()
    }

    async fn by_href<T: serde::de::DeserializeOwned>(
        &self,
        op: &OperationDescriptor,
        href: &str,
    ) -> Result<Option<T>> {
        Ok(self.dispatcher.invoke_json(op, CallArgs::new().text(href)).await?)
    }

    async fn named<T: serde::de::DeserializeOwned>(
        &self,
        op: &OperationDescriptor,
        args: CallArgs,
    ) -> Result<Option<T>> {
        Ok(self.dispatcher.invoke_json(op, args).await?)
    }

    async fn action(&self, op: &OperationDescriptor, vapp_href: &str) -> Result<Task> {
        self.by_href(op, vapp_href).await?.ok_or_else(|| {
            VCloudError::Cloud(CloudError::parse(op.name, vapp_href, "no task returned"))
        })
    }

    /// Orgs the current user can access
    pub async fn list_orgs(&self) -> Result<Vec<ReferenceType>> {
        Ok(self
            .dispatcher
            .invoke_json(&ops::LIST_ORGS, CallArgs::new())
            .await?
            .unwrap_or_default())
    }

    pub async fn get_org(&self, href: &str) -> Result<Option<Org>> {
        self.by_href(&ops::GET_ORG, href).await
    }

    pub async fn find_org_named(&self, org: Option<&str>) -> Result<Option<Org>> {
        self.named(&ops::FIND_ORG_NAMED, CallArgs::new().optional(org))
            .await
    }

    pub async fn get_catalog(&self, href: &str) -> Result<Option<Catalog>> {
        self.by_href(&ops::GET_CATALOG, href).await
    }

    pub async fn find_catalog_in_org_named(
        &self,
        org: Option<&str>,
        catalog: Option<&str>,
    ) -> Result<Option<Catalog>> {
        self.named(
            &ops::FIND_CATALOG_IN_ORG_NAMED,
            CallArgs::new().optional(org).optional(catalog),
        )
        .await
    }

    pub async fn get_vapp_template(&self, href: &str) -> Result<Option<VAppTemplate>> {
        self.by_href(&ops::GET_VAPP_TEMPLATE, href).await
    }

    pub async fn find_vapp_template_in_org_catalog_named(
        &self,
        org: Option<&str>,
        catalog: Option<&str>,
        template: &str,
    ) -> Result<Option<VAppTemplate>> {
        self.named(
            &ops::FIND_VAPP_TEMPLATE_IN_ORG_CATALOG_NAMED,
            CallArgs::new().optional(org).optional(catalog).text(template),
        )
        .await
    }

    pub async fn get_network(&self, href: &str) -> Result<Option<OrgNetwork>> {
        self.by_href(&ops::GET_NETWORK, href).await
    }

    pub async fn find_network_in_org_vdc_named(
        &self,
        org: Option<&str>,
        vdc: Option<&str>,
        network: &str,
    ) -> Result<Option<OrgNetwork>> {
        self.named(
            &ops::FIND_NETWORK_IN_ORG_VDC_NAMED,
            CallArgs::new().optional(org).optional(vdc).text(network),
        )
        .await
    }

    /// Create a vApp named `name` from `template` in the vdc at `vdc_href`
    pub async fn instantiate_vapp_template_in_vdc(
        &self,
        vdc_href: &str,
        template: &str,
        name: &str,
        options: InstantiateVAppTemplateOptions,
    ) -> Result<VApp> {
        let op = &ops::INSTANTIATE_VAPP_TEMPLATE_IN_VDC;
        let args = CallArgs::new()
            .text(vdc_href)
            .payload_param("template", template)
            .payload_param("name", name)
            .options(options);
        tracing::info!("Instantiating {} from {}", name, template);
        self.named(op, args).await?.ok_or_else(|| {
            VCloudError::Cloud(CloudError::parse(op.name, vdc_href, "no vApp returned"))
        })
    }

    pub async fn clone_vapp_in_vdc(
        &self,
        vdc_href: &str,
        vapp_href: &str,
        new_name: &str,
        options: CloneVAppOptions,
    ) -> Result<Task> {
        let op = &ops::CLONE_VAPP_IN_VDC;
        let args = CallArgs::new()
            .text(vdc_href)
            .payload_param("vApp", vapp_href)
            .payload_param("newName", new_name)
            .options(options);
        self.named(op, args).await?.ok_or_else(|| {
            VCloudError::Cloud(CloudError::parse(op.name, vdc_href, "no task returned"))
        })
    }

    pub async fn find_vapp_in_org_vdc_named(
        &self,
        org: Option<&str>,
        vdc: Option<&str>,
        vapp: &str,
    ) -> Result<Option<VApp>> {
        self.named(
            &ops::FIND_VAPP_IN_ORG_VDC_NAMED,
            CallArgs::new().optional(org).optional(vdc).text(vapp),
        )
        .await
    }

    pub async fn get_vapp(&self, href: &str) -> Result<Option<VApp>> {
        self.by_href(&ops::GET_VAPP, href).await
    }

    pub async fn deploy_vapp(&self, href: &str) -> Result<Task> {
        self.action(&ops::DEPLOY_VAPP, href).await
    }

    pub async fn undeploy_vapp(&self, href: &str) -> Result<Task> {
        self.action(&ops::UNDEPLOY_VAPP, href).await
    }

    pub async fn power_on_vapp(&self, href: &str) -> Result<Task> {
        self.action(&ops::POWER_ON_VAPP, href).await
    }

    pub async fn power_off_vapp(&self, href: &str) -> Result<Task> {
        self.action(&ops::POWER_OFF_VAPP, href).await
    }

    /// Graceful guest shutdown; returns no task
    pub async fn shutdown_vapp(&self, href: &str) -> Result<()> {
        Ok(self
            .dispatcher
            .invoke_void(&ops::SHUTDOWN_VAPP, CallArgs::new().text(href))
            .await?)
    }

    pub async fn reset_vapp(&self, href: &str) -> Result<Task> {
        self.action(&ops::RESET_VAPP, href).await
    }

    pub async fn suspend_vapp(&self, href: &str) -> Result<Task> {
        self.action(&ops::SUSPEND_VAPP, href).await
    }

    /// Delete a vApp; `None` when it was already gone
    pub async fn delete_vapp(&self, href: &str) -> Result<Option<Task>> {
        let location = self
            .dispatcher
            .invoke_header(&ops::DELETE_VAPP, CallArgs::new().text(href))
            .await?;
        Ok(location.map(Task::from_location))
    }

    pub async fn get_task(&self, href: &str) -> Result<Option<Task>> {
        self.by_href(&ops::GET_TASK, href).await
    }

    /// Poll `task` until it succeeds
    ///
    /// A task ending in error or cancellation fails with
    /// [`CloudError::ProvisioningRejected`]; running past the poll budget
    /// fails with [`CloudError::ProvisioningTimeout`].
    pub async fn wait_for_task(&self, task: &Task) -> Result<Task> {
        let href = task.href.as_str();
        let succeeded = retry_until(&self.task_poll, || self.task_success(href)).await?;
        if !succeeded {
            return Err(CloudError::ProvisioningTimeout {
                target: href.to_string(),
                waited_ms: self.task_poll.timeout.as_millis(),
            }
            .into());
        }
        self.get_task(href).await?.ok_or_else(|| {
            VCloudError::Cloud(CloudError::NotFound {
                operation: ops::GET_TASK.name.to_string(),
                target: href.to_string(),
            })
        })
    }

    /// Readiness predicate over a fresh `get_task`
    async fn task_success(&self, href: &str) -> nimbus_cloud::Result<bool> {
        let task = self
            .dispatcher
            .invoke_json::<Task>(&ops::GET_TASK, CallArgs::new().text(href))
            .await?
            .ok_or_else(|| CloudError::NotFound {
                operation: ops::GET_TASK.name.to_string(),
                target: href.to_string(),
            })?;
        tracing::debug!("Task {} is {}", href, task.status);

        match task.status {
            TaskStatus::Success => Ok(true),
            status if status.is_failure() => Err(CloudError::ProvisioningRejected {
                target: href.to_string(),
                reason: task
                    .error
                    .map(|e| e.message)
                    .unwrap_or_else(|| format!("task {}", status)),
            }),
            _ => Ok(false),
        }
    }
}

/// Extract the session token from a `Set-Cookie` header value
pub fn parse_token(set_cookie: &str) -> Result<String> {
    set_cookie
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            VCloudError::LoginFailed(format!("no {} cookie in '{}'", TOKEN_COOKIE, set_cookie))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token() {
        assert_eq!(
            parse_token("vcloud-token=abc123; path=/; Secure").unwrap(),
            "abc123"
        );
        assert!(parse_token("JSESSIONID=1; path=/").is_err());
        assert!(parse_token("vcloud-token=; path=/").is_err());
    }
}
