//! Options for vApp instantiation and cloning

use nimbus_cloud::PayloadOptions;

/// Overrides for the instantiate-vApp-template payload
///
/// Unset fields fall back to the configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstantiateVAppTemplateOptions {
    pub cpu_count: Option<u32>,
    pub megabytes: Option<u32>,
    /// Network href
    pub network: Option<String>,
}

impl InstantiateVAppTemplateOptions {
    pub const NONE: InstantiateVAppTemplateOptions = InstantiateVAppTemplateOptions {
        cpu_count: None,
        megabytes: None,
        network: None,
    };

    pub fn builder() -> InstantiateVAppTemplateOptionsBuilder {
        InstantiateVAppTemplateOptionsBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct InstantiateVAppTemplateOptionsBuilder {
    inner: InstantiateVAppTemplateOptions,
}

impl InstantiateVAppTemplateOptionsBuilder {
    pub fn cpu_count(mut self, count: u32) -> Self {
        self.inner.cpu_count = Some(count);
        self
    }

    pub fn memory(mut self, megabytes: u32) -> Self {
        self.inner.megabytes = Some(megabytes);
        self
    }

    pub fn in_network(mut self, href: impl Into<String>) -> Self {
        self.inner.network = Some(href.into());
        self
    }

    pub fn build(self) -> InstantiateVAppTemplateOptions {
        self.inner
    }
}

impl PayloadOptions for InstantiateVAppTemplateOptions {
    fn payload_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(count) = self.cpu_count {
            params.push(("count", count.to_string()));
        }
        if let Some(megabytes) = self.megabytes {
            params.push(("megabytes", megabytes.to_string()));
        }
        if let Some(network) = &self.network {
            params.push(("network", network.clone()));
        }
        params
    }
}

/// Clone-vApp settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneVAppOptions {
    pub deploy: bool,
    pub power_on: bool,
    pub description: Option<String>,
}

impl CloneVAppOptions {
    pub const NONE: CloneVAppOptions = CloneVAppOptions {
        deploy: false,
        power_on: false,
        description: None,
    };

    pub fn builder() -> CloneVAppOptionsBuilder {
        CloneVAppOptionsBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct CloneVAppOptionsBuilder {
    inner: CloneVAppOptions,
}

impl CloneVAppOptionsBuilder {
    pub fn deploy(mut self) -> Self {
        self.inner.deploy = true;
        self
    }

    /// Power on after cloning; implies deploy
    pub fn power_on(mut self) -> Self {
        self.inner.deploy = true;
        self.inner.power_on = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.inner.description = Some(description.into());
        self
    }

    pub fn build(self) -> CloneVAppOptions {
        self.inner
    }
}

impl PayloadOptions for CloneVAppOptions {
    fn payload_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("deploy", self.deploy.to_string()),
            ("powerOn", self.power_on.to_string()),
        ];
        if let Some(description) = &self.description {
            params.push(("description", description.clone()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_sets_nothing() {
        assert!(InstantiateVAppTemplateOptions::NONE.payload_params().is_empty());
        assert_eq!(InstantiateVAppTemplateOptions::default(), InstantiateVAppTemplateOptions::NONE);
        assert_eq!(CloneVAppOptions::default(), CloneVAppOptions::NONE);
    }

    #[test]
    fn test_instantiate_options() {
        let options = InstantiateVAppTemplateOptions::builder()
            .cpu_count(2)
            .memory(1024)
            .in_network("https://vcloud.example/api/network/7")
            .build();
        assert_eq!(
            options.payload_params(),
            vec![
                ("count", "2".to_string()),
                ("megabytes", "1024".to_string()),
                ("network", "https://vcloud.example/api/network/7".to_string()),
            ]
        );
    }

    #[test]
    fn test_power_on_implies_deploy() {
        let options = CloneVAppOptions::builder().power_on().build();
        assert!(options.deploy);
        assert!(options.power_on);
    }
}
