use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dhcpsetup::{Config, Error, Result, ServerState, configure};

#[derive(Parser)]
#[command(name = "dhcpsetup")]
#[command(author, version, about = "Configures the DHCPv4 server of a link", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the interface's settings to a DHCP server and print its state
    Configure,
    ShowConfig,
    ListStaticLeases,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let config = Config::load_or_create(&cli.config)?;

    match cli.command.unwrap_or(Commands::Configure) {
        Commands::Configure => {
            info!("Configuring DHCP server on {} with config: {:?}", config.interface, cli.config);
            let links = config.links()?;
            let link = links.get(&config.interface).ok_or_else(|| {
                Error::InvalidConfig(format!("interface {} is not a known link", config.interface))
            })?;

            let mut server = ServerState::new();
            configure(link, &links, &mut server, &config.environment)?;
            println!("{}", serde_json::to_string_pretty(&server)?);
            Ok(())
        }
        Commands::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::ListStaticLeases => {
            let links = config.links()?;
            let leases = links
                .get(&config.interface)
                .and_then(|link| link.network.as_ref())
                .map(|network| &network.dhcp_server.static_leases);

            match leases {
                Some(leases) if !leases.is_empty() => {
                    println!("{:<24} {:<16}", "Client ID", "IP Address");
                    println!("{}", "-".repeat(40));

                    for lease in leases.iter() {
                        println!("{:<24} {:<16}", lease.client_id.to_string(), lease.address);
                    }
                }
                _ => println!("No static leases."),
            }

            Ok(())
        }
    }
}
