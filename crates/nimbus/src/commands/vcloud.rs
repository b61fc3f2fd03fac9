use crate::VCloudCommands;
use crate::output::{self, Format};
use clap::ValueEnum;
use colored::Colorize;
use nimbus_cloud_vcloud::{InstantiateVAppTemplateOptions, Task, VCloudClient, VCloudConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PowerAction {
    Deploy,
    Undeploy,
    On,
    Off,
    Reset,
    Suspend,
}

pub async fn handle(command: VCloudCommands, format: Format) -> anyhow::Result<()> {
    let config = VCloudConfig::from_env()?;
    let client = VCloudClient::connect(&config, super::transport()?).await?;

    match command {
        VCloudCommands::Orgs => {
            let orgs = client.list_orgs().await?;
            if format == Format::Json {
                return output::json(&orgs);
            }
            output::pairs(
                ("ORG", "HREF"),
                orgs.iter().map(|o| (o.name.clone(), o.href.as_str())),
            )
        }
        VCloudCommands::Catalog { org, catalog } => {
            let Some(catalog) = client
                .find_catalog_in_org_named(org.as_deref(), catalog.as_deref())
                .await?
            else {
                anyhow::bail!("catalog not found");
            };
            if format == Format::Json {
                return output::json(&catalog);
            }
            println!("{} {}", "Catalog".bold(), catalog.name.cyan());
            output::pairs(
                ("ITEM", "HREF"),
                catalog
                    .catalog_items
                    .iter()
                    .map(|i| (i.name.clone(), i.href.as_str())),
            )
        }
        VCloudCommands::Vapp { org, vdc, name } => {
            let Some(vapp) = client
                .find_vapp_in_org_vdc_named(org.as_deref(), vdc.as_deref(), &name)
                .await?
            else {
                anyhow::bail!("vApp '{}' not found", name);
            };
            if format == Format::Json {
                return output::json(&vapp);
            }
            let power = if vapp.is_on() { "on".green() } else { "off".dimmed() };
            println!("{} {} ({})", "vApp".bold(), vapp.name.cyan(), power);
            println!("  href: {}", vapp.href);
            println!("  ips:  {}", vapp.ip_addresses.join(", "));
            for task in &vapp.tasks {
                println!("  task: {} {}", task.href, task.status);
            }
            Ok(())
        }
        VCloudCommands::Instantiate {
            org,
            vdc,
            catalog,
            template,
            name,
            cpus,
            memory,
            network,
        } => {
            let Some(found) = client
                .find_vapp_template_in_org_catalog_named(
                    org.as_deref(),
                    catalog.as_deref(),
                    &template,
                )
                .await?
            else {
                anyhow::bail!("vApp template '{}' not found", template);
            };
            let vdc_href = find_vdc(&client, org.as_deref(), vdc.as_deref()).await?;

            let mut options = InstantiateVAppTemplateOptions::builder();
            if let Some(cpus) = cpus {
                options = options.cpu_count(cpus);
            }
            if let Some(memory) = memory {
                options = options.memory(memory);
            }
            if let Some(network) = network {
                options = options.in_network(network);
            }

            let vapp = client
                .instantiate_vapp_template_in_vdc(&vdc_href, &found.href, &name, options.build())
                .await?;
            for task in &vapp.tasks {
                client.wait_for_task(task).await?;
            }
            if format == Format::Json {
                return output::json(&vapp);
            }
            println!("{}", format!("✓ {} instantiated at {}", vapp.name, vapp.href).green());
            Ok(())
        }
        VCloudCommands::Power { action, href } => {
            let task = match action {
                PowerAction::Deploy => client.deploy_vapp(&href).await?,
                PowerAction::Undeploy => client.undeploy_vapp(&href).await?,
                PowerAction::On => client.power_on_vapp(&href).await?,
                PowerAction::Off => client.power_off_vapp(&href).await?,
                PowerAction::Reset => client.reset_vapp(&href).await?,
                PowerAction::Suspend => client.suspend_vapp(&href).await?,
            };
            finish(&client, task, format).await
        }
        VCloudCommands::Delete { href } => match client.delete_vapp(&href).await? {
            Some(task) => finish(&client, task, format).await,
            None => {
                println!("{}", "vApp already gone".dimmed());
                Ok(())
            }
        },
    }
}

async fn finish(client: &VCloudClient, task: Task, format: Format) -> anyhow::Result<()> {
    let done = client.wait_for_task(&task).await?;
    if format == Format::Json {
        return output::json(&done);
    }
    println!("{}", format!("✓ {} {}", done.href, done.status).green());
    Ok(())
}

/// Href of the vdc new vApps land in
async fn find_vdc(
    client: &VCloudClient,
    org: Option<&str>,
    vdc: Option<&str>,
) -> anyhow::Result<String> {
    let Some(org) = client.find_org_named(org).await? else {
        anyhow::bail!("organization not found");
    };
    let vdc = nimbus_cloud::endpoint::select(&org.vdcs, vdc, "vdc", |v| v.name.as_str())?;
    Ok(vdc.href.clone())
}
