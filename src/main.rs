// ABOUTME: Entry point for the ecs-runtime CLI application.
// ABOUTME: Parses arguments, then either serves a manager or acts as a remote client.

mod cli;

use std::env;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Commands};
use ecs_runtime::config::{self, Config};
use ecs_runtime::descriptor::BasicContainerDescriptor;
use ecs_runtime::directory::ContainerMirror;
use ecs_runtime::effector::SimulatedEffector;
use ecs_runtime::error::Result;
use ecs_runtime::manager::ContainerManager;
use ecs_runtime::operations::ContainerOperations;
use ecs_runtime::output::{Output, OutputMode};
use ecs_runtime::remote::{self, ContainerClient, ContainerServer};
use ecs_runtime::types::{ContainerUri, ResourceId};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins unless -v asks for debug
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    if let Err(e) = run(cli, &mut output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &mut Output) -> Result<()> {
    let cwd = env::current_dir()?;

    if let Commands::Init { resource_id, force } = &cli.command {
        let path = config::init_config(&cwd, resource_id.as_deref(), *force)?;
        output.success(
            &format!("Created {}", path.display()),
            Some(&path.display().to_string()),
        );
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::discover_or_default(&cwd)?,
    };

    if let Commands::Serve { listen } = cli.command {
        return serve(config, listen, output).await;
    }

    let resource = match &cli.resource {
        Some(id) => ResourceId::new(id.as_str())?,
        None => config.resource_id()?,
    };
    let client = ContainerClient::connect(&config.resolver()?, resource.clone())?
        .with_namespace(config.namespace.clone());

    output.start_timer();
    match cli.command {
        Commands::Add { location } => {
            let location = location_uri(&cwd, &location)?;
            output.progress(&format!("Adding {location} on {resource}..."));
            let id = client.add_container(&location).await?;
            output.success(&format!("Added container {id}"), Some(&id));
        }
        Commands::Start { id } => {
            client.start_container(&id).await?;
            output.success(&format!("Started container {id}"), None);
        }
        Commands::Stop { id } => {
            client.stop_container(&id).await?;
            output.success(&format!("Stopped container {id}"), None);
        }
        Commands::Migrate { id, target } => {
            let target = ResourceId::new(target)?;
            client.migrate_container(&id, &target).await?;
            output.success(&format!("Migrated container {id} to {target}"), None);
        }
        Commands::Update { id, location } => {
            let location = location_uri(&cwd, &location)?;
            client.update_container(&id, &location).await?;
            output.success(&format!("Updated container {id} from {location}"), None);
        }
        Commands::Undeploy { id } => {
            client.undeploy_container(&id).await?;
            output.success(&format!("Undeployed container {id}"), None);
        }
        Commands::State { id, poll } => {
            let state = if poll {
                client.poll_state(&id).await
            } else {
                client.get_state(&id).await
            };
            output.success(&format!("{id}: {state}"), Some(state.as_str()));
        }
        Commands::Info => {
            let name = client.container_system_name().await;
            let version = client.container_system_version().await;
            let info = format!("{name} {version}");
            output.success(&format!("{resource}: {info}"), Some(&info));
        }
        Commands::Init { .. } | Commands::Serve { .. } => {}
    }
    Ok(())
}

async fn serve(
    config: Config,
    listen: Option<std::net::SocketAddr>,
    output: &mut Output,
) -> Result<()> {
    let resource = config.resource_id()?;
    let addr = listen.unwrap_or(config.listen);

    let mirror = Arc::new(ContainerMirror::new(resource.clone()));
    let effector = SimulatedEffector::<BasicContainerDescriptor>::new(
        config.container_system.name.clone(),
        config.container_system.version.clone(),
    )
    .with_delays(
        config.simulation.deploy_delay,
        config.simulation.stop_delay,
    );
    let manager = Arc::new(ContainerManager::<BasicContainerDescriptor, _>::new(
        mirror.clone(),
        effector,
    ));
    let server =
        Arc::new(ContainerServer::new(config.namespace.clone(), manager).with_mirror(mirror));

    let listener = TcpListener::bind(addr).await?;
    let bound = listener.local_addr()?;
    output.success(
        &format!("Serving resource {resource} on {bound}"),
        Some(&bound.to_string()),
    );

    remote::serve_with_timeout(listener, server, config.request_timeout, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await?;
    Ok(())
}

/// A location argument is either a URI or a (possibly relative) file path.
fn location_uri(cwd: &Path, location: &str) -> Result<ContainerUri> {
    if let Ok(uri) = ContainerUri::parse(location) {
        return Ok(uri);
    }
    Ok(ContainerUri::from_file_path(&cwd.join(location))?)
}
