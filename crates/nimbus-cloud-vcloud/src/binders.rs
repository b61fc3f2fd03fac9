//! vApp request payload templates

use crate::config::VCloudConfig;
use nimbus_cloud::TemplateBinder;

/// Payload of `instantiate_vapp_template_in_vdc`
pub const INSTANTIATE_VAPP_TEMPLATE_PARAMS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<InstantiateVAppTemplateParams name="{{ name }}" xmlns="http://www.vmware.com/vcloud/v0.8" xmlns:ovf="http://schemas.dmtf.org/ovf/envelope/1">
    <VAppTemplate href="{{ template }}"/>
    <InstantiationParams>
        <VirtualHardwareSection>
            <Item>
                <InstanceID>1</InstanceID>
                <ResourceType>3</ResourceType>
                <VirtualQuantity>{{ count }}</VirtualQuantity>
            </Item>
            <Item>
                <InstanceID>2</InstanceID>
                <ResourceType>4</ResourceType>
                <VirtualQuantity>{{ megabytes }}</VirtualQuantity>
            </Item>
        </VirtualHardwareSection>
        <NetworkConfigSection>
            <NetworkConfig>
                <NetworkAssociation href="{{ network }}"/>
            </NetworkConfig>
        </NetworkConfigSection>
    </InstantiationParams>
</InstantiateVAppTemplateParams>"#;

/// Payload of `clone_vapp_in_vdc`
pub const CLONE_VAPP_PARAMS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CloneVAppParams name="{{ newName }}" deploy="{{ deploy }}" powerOn="{{ powerOn }}" xmlns="http://www.vmware.com/vcloud/v0.8">
    <VApp href="{{ vApp }}"/>
    <Description>{{ description }}</Description>
</CloneVAppParams>"#;

/// Binder for instantiate requests, seeded with the configured network,
/// CPU count and memory
pub fn instantiate_binder(config: &VCloudConfig) -> TemplateBinder {
    TemplateBinder::xml(INSTANTIATE_VAPP_TEMPLATE_PARAMS, crate::ops::INSTANTIATE_PARAMS)
        .with_default("network", config.default_network.clone())
        .with_default("count", Some(config.default_cpu_count.to_string()))
        .with_default("megabytes", Some(config.default_memory.to_string()))
}

pub fn clone_binder() -> TemplateBinder {
    TemplateBinder::xml(CLONE_VAPP_PARAMS, crate::ops::CLONE_PARAMS)
        .with_default("deploy", Some("false".to_string()))
        .with_default("powerOn", Some("false".to_string()))
        .with_default("description", Some(String::new()))
}
