mod commands;
mod output;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nimbus")]
#[command(about = "Provision and manage cloud nodes on vCloud Express and SoftLayer", long_about = None)]
struct Cli {
    /// Print results as JSON instead of tables
    #[arg(long, global = true, env = "NIMBUS_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// SoftLayer virtual guests (SOFTLAYER_USER / SOFTLAYER_API_KEY)
    #[command(subcommand)]
    Softlayer(SoftLayerCommands),
    /// vCloud Express vApps (VCLOUD_ENDPOINT / VCLOUD_USER / VCLOUD_PASSWORD)
    #[command(subcommand)]
    Vcloud(VCloudCommands),
    /// Show version
    Version,
}

#[derive(Subcommand)]
pub enum SoftLayerCommands {
    /// List virtual guests
    Nodes,
    /// Show one virtual guest
    Node { id: String },
    /// List hardware profiles of the configured package
    Hardware,
    /// List operating system images
    Images,
    /// List datacenters
    Locations,
    /// Order a guest and wait until it accepts logins
    Create {
        /// Group the node belongs to (prefix of its hostname)
        #[arg(short, long)]
        group: String,
        /// Node name within the group
        #[arg(short, long)]
        name: String,
        /// OS price id
        #[arg(short, long)]
        image: String,
        /// Comma-separated CPU, RAM and disk price ids
        #[arg(long)]
        hardware: String,
        /// Datacenter id
        #[arg(short, long)]
        location: String,
        /// DNS domain of the guest
        #[arg(short, long, env = "SOFTLAYER_DOMAIN")]
        domain: Option<String>,
    },
    /// Cancel a guest (no-op when it is already gone)
    Destroy { id: String },
    /// Hard reboot
    Reboot { id: String },
    /// Pause a guest
    Suspend { id: String },
    /// Resume a paused guest
    Resume { id: String },
}

#[derive(Subcommand)]
pub enum VCloudCommands {
    /// List organizations
    Orgs,
    /// Show a catalog by name
    Catalog {
        #[arg(short, long, env = "VCLOUD_ORG")]
        org: Option<String>,
        /// Catalog name (optional when the org has one catalog)
        catalog: Option<String>,
    },
    /// Show a vApp by name
    Vapp {
        #[arg(short, long, env = "VCLOUD_ORG")]
        org: Option<String>,
        #[arg(short, long, env = "VCLOUD_VDC")]
        vdc: Option<String>,
        name: String,
    },
    /// Instantiate a vApp from a catalog template
    Instantiate {
        #[arg(short, long, env = "VCLOUD_ORG")]
        org: Option<String>,
        #[arg(short, long, env = "VCLOUD_VDC")]
        vdc: Option<String>,
        #[arg(short, long)]
        catalog: Option<String>,
        /// Template name in the catalog
        #[arg(short, long)]
        template: String,
        /// Name of the new vApp
        name: String,
        #[arg(long)]
        cpus: Option<u32>,
        /// Memory in MB
        #[arg(long)]
        memory: Option<u32>,
        /// Network href (defaults to VCLOUD_DEFAULT_NETWORK)
        #[arg(long)]
        network: Option<String>,
    },
    /// Run a power action on a vApp and wait for its task
    Power {
        #[arg(value_enum)]
        action: commands::vcloud::PowerAction,
        /// vApp href
        href: String,
    },
    /// Delete a vApp (no-op when it is already gone)
    Delete {
        /// vApp href
        href: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries results, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let format = if cli.json {
        output::Format::Json
    } else {
        output::Format::Table
    };

    match cli.command {
        Commands::Softlayer(command) => commands::softlayer::handle(command, format).await,
        Commands::Vcloud(command) => commands::vcloud::handle(command, format).await,
        Commands::Version => {
            println!("nimbus {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_create_arguments() {
        let cli = Cli::try_parse_from([
            "nimbus",
            "--json",
            "softlayer",
            "create",
            "--group",
            "web",
            "--name",
            "n1",
            "--image",
            "1693",
            "--hardware",
            "1641,1644,1639",
            "--location",
            "3",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Softlayer(SoftLayerCommands::Create {
                group, hardware, ..
            }) => {
                assert_eq!(group, "web");
                assert_eq!(hardware, "1641,1644,1639");
            }
            _ => panic!("expected softlayer create"),
        }
    }

    #[test]
    fn test_vcloud_org_from_env() {
        temp_env::with_vars(
            [("VCLOUD_ORG", Some("Acme")), ("VCLOUD_VDC", None::<&str>)],
            || {
                let cli = Cli::try_parse_from(["nimbus", "vcloud", "vapp", "web-1"]).unwrap();
                match cli.command {
                    Commands::Vcloud(VCloudCommands::Vapp { org, vdc, name }) => {
                        assert_eq!(org.as_deref(), Some("Acme"));
                        assert_eq!(vdc, None);
                        assert_eq!(name, "web-1");
                    }
                    _ => panic!("expected vcloud vapp"),
                }
            },
        );
    }
}
