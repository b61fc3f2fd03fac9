use crate::SoftLayerCommands;
use crate::output::{self, Format};
use colored::Colorize;
use nimbus_cloud::{ComputeService, Template, TemplateOptions};
use nimbus_cloud_softlayer::{SoftLayerComputeServiceAdapter, SoftLayerConfig, hardware_id};

pub async fn handle(command: SoftLayerCommands, format: Format) -> anyhow::Result<()> {
    let config = SoftLayerConfig::from_env()?;
    let adapter = SoftLayerComputeServiceAdapter::new(&config, super::transport()?)?;
    let compute = ComputeService::new(adapter);

    match command {
        SoftLayerCommands::Nodes => output::nodes(&compute.list_nodes().await?, format),
        SoftLayerCommands::Node { id } => match compute.get_node(&id).await? {
            Some(node) => output::node(&node, format),
            None => anyhow::bail!("virtual guest {} not found", id),
        },
        SoftLayerCommands::Hardware => {
            let profiles = compute.list_hardware_profiles().await?;
            if format == Format::Json {
                return output::json(&profiles);
            }
            let rows: Vec<(String, String)> = profiles
                .iter()
                .map(|profile| {
                    let description: Vec<&str> =
                        profile.iter().map(|i| i.description.as_str()).collect();
                    (hardware_id(profile), description.join(" / "))
                })
                .collect();
            output::pairs(
                ("HARDWARE ID", "DESCRIPTION"),
                rows.iter().map(|(id, d)| (id.clone(), d.as_str())),
            )
        }
        SoftLayerCommands::Images => {
            let images = compute.list_images().await?;
            if format == Format::Json {
                return output::json(&images);
            }
            output::pairs(
                ("IMAGE ID", "DESCRIPTION"),
                images.iter().map(|i| {
                    let id = i.price_id().map(|p| p.to_string()).unwrap_or_default();
                    (id, i.description.as_str())
                }),
            )
        }
        SoftLayerCommands::Locations => {
            let locations = compute.list_locations().await?;
            if format == Format::Json {
                return output::json(&locations);
            }
            output::pairs(
                ("LOCATION ID", "NAME"),
                locations.iter().map(|d| (d.id.to_string(), d.name.as_str())),
            )
        }
        SoftLayerCommands::Create {
            group,
            name,
            image,
            hardware,
            location,
            domain,
        } => {
            let mut options = TemplateOptions::builder();
            if let Some(domain) = domain {
                options = options.domain_name(domain);
            }
            let template = Template::new(image, hardware, location).with_options(options.build());

            if format == Format::Table {
                println!("{}", "Ordering virtual guest...".blue());
            }
            let node = compute.create_node(&group, &name, &template).await?;
            if format == Format::Table {
                println!("{}", format!("✓ {} is ready", node.name).green());
            }
            output::node(&node, format)
        }
        SoftLayerCommands::Destroy { id } => {
            compute.destroy_node(&id).await?;
            println!("{}", format!("✓ {} destroyed", id).green());
            Ok(())
        }
        SoftLayerCommands::Reboot { id } => {
            compute.reboot_node(&id).await?;
            println!("{}", format!("✓ {} rebooting", id).green());
            Ok(())
        }
        SoftLayerCommands::Suspend { id } => {
            compute.suspend_node(&id).await?;
            println!("{}", format!("✓ {} paused", id).green());
            Ok(())
        }
        SoftLayerCommands::Resume { id } => {
            compute.resume_node(&id).await?;
            println!("{}", format!("✓ {} resumed", id).green());
            Ok(())
        }
    }
}
