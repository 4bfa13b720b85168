mod client;
mod printer;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use client::{ApiClient, Outcome};
use pkg_constants::network::DEFAULT_API_ADDR;
use pkg_constants::rbac::DEFAULT_NAMESPACE;
use pkg_manifest::parse_documents;
use pkg_types::api::AuthRequest;

#[derive(Parser)]
#[command(name = "rbacctl", about = "CLI tool for managing RBAC roles and bindings")]
struct Cli {
    /// Server API endpoint
    #[arg(long, env = "RBACCTL_SERVER", default_value = DEFAULT_API_ADDR)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply resources from YAML manifests
    Apply {
        /// Manifest files, comma separated or repeated
        #[arg(short = 'f', long = "file", required = true, value_delimiter = ',')]
        files: Vec<String>,

        /// Also print each resource in this format
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Parse and print only; nothing is sent to the server
        #[arg(long)]
        dry_run: bool,
    },
    /// List resources of one kind
    Get {
        #[arg(value_enum)]
        resource: ResourceKind,

        /// Namespace to list
        #[arg(short, long)]
        namespace: Option<String>,

        /// List across all namespaces
        #[arg(short = 'A', long, conflicts_with = "namespace")]
        all_namespaces: bool,
    },
    /// Inspect authorization
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Check whether a subject may perform a verb on a resource
    CanI {
        verb: String,
        resource: String,

        /// Subject name to check
        #[arg(long = "as")]
        subject: String,

        #[arg(short, long, default_value = DEFAULT_NAMESPACE)]
        namespace: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ResourceKind {
    Role,
    Rolebinding,
}

/// Namespace filter for `get`: `-A` lists everything, otherwise `-n` or `default`.
fn namespace_filter(namespace: Option<&str>, all_namespaces: bool) -> Option<&str> {
    if all_namespaces {
        None
    } else {
        Some(namespace.unwrap_or(DEFAULT_NAMESPACE))
    }
}

async fn apply(
    client: &ApiClient,
    files: &[String],
    output: Option<OutputFormat>,
    dry_run: bool,
) -> anyhow::Result<()> {
    for file in files {
        let raw = std::fs::read_to_string(file).with_context(|| format!("reading \"{}\"", file))?;
        let resources = parse_documents(&raw, output == Some(OutputFormat::Yaml))
            .with_context(|| format!("parsing \"{}\"", file))?;

        for parsed in &resources {
            match output {
                Some(OutputFormat::Yaml) => {
                    if let Some(yaml) = &parsed.yaml {
                        println!("{}", yaml);
                    }
                }
                Some(OutputFormat::Json) => println!("{}", String::from_utf8_lossy(&parsed.json)),
                None => {}
            }

            if dry_run {
                println!("{} created (dry run)", parsed.display_name);
                continue;
            }

            info!("Applying {} from {}", parsed.display_name, file);
            match client.submit(parsed).await? {
                (Outcome::Created, _) => println!("{} created", parsed.display_name),
                (_, reason) => anyhow::bail!("{}: {}", parsed.display_name, reason),
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let client = ApiClient::new(&cli.server)?;

    match &cli.command {
        Commands::Apply {
            files,
            output,
            dry_run,
        } => apply(&client, files, *output, *dry_run).await?,
        Commands::Get {
            resource,
            namespace,
            all_namespaces,
        } => {
            let ns = namespace_filter(namespace.as_deref(), *all_namespaces);
            info!("Querying {:?} from {}", resource, cli.server);
            let table = match resource {
                ResourceKind::Role => {
                    let roles = client.list_roles(ns).await?;
                    printer::namespace_table(
                        roles
                            .iter()
                            .map(|r| (r.metadata.namespace.as_str(), r.metadata.name.as_str())),
                    )
                }
                ResourceKind::Rolebinding => {
                    let bindings = client.list_role_bindings(ns).await?;
                    printer::namespace_table(
                        bindings
                            .iter()
                            .map(|rb| (rb.metadata.namespace.as_str(), rb.metadata.name.as_str())),
                    )
                }
            };
            print!("{}", table);
        }
        Commands::Auth { action } => match action {
            AuthAction::CanI {
                verb,
                resource,
                subject,
                namespace,
            } => {
                let req = AuthRequest {
                    name: subject.clone(),
                    verb: verb.clone(),
                    resource: resource.clone(),
                    namespace: namespace.clone(),
                };
                if client.can_i(&req).await? {
                    println!("yes");
                } else {
                    println!("no");
                    std::process::exit(1);
                }
            }
        },
    }

    Ok(())
}
