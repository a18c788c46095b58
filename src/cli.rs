// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ecs-runtime")]
#[command(about = "Container lifecycle manager for edge devices")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: discover ecs-runtime.yml in the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Emit JSON lines
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub json: bool,

    /// Print only the bare result
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Resource to act on (default: this device)
    #[arg(short, long, global = true, value_name = "RESOURCE_ID")]
    pub resource: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the container manager and serve its remote operations
    Serve {
        /// Override the configured listen address
        #[arg(long, value_name = "ADDR")]
        listen: Option<SocketAddr>,
    },

    /// Register the container described at a location (URI or file path)
    Add { location: String },

    /// Start an available container
    Start { id: String },

    /// Stop a container
    Stop { id: String },

    /// Migrate a deployed container to another resource
    Migrate { id: String, target: String },

    /// Replace a deployed container with the one described at a location
    Update { id: String, location: String },

    /// Remove an available or stopped container
    Undeploy { id: String },

    /// Show the state of a container
    State {
        id: String,

        /// Read the mirrored property instead of invoking getState
        #[arg(long)]
        poll: bool,
    },

    /// Show the container system name and version
    Info,

    /// Initialize a new ecs-runtime.yml configuration file
    Init {
        /// Resource id written into the template
        #[arg(long, value_name = "ID")]
        resource_id: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
