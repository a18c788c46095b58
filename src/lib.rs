// ABOUTME: Library root for ecs-runtime - container lifecycle management for edge devices.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod descriptor;
pub mod directory;
pub mod effector;
pub mod error;
pub mod manager;
pub mod operations;
pub mod output;
pub mod registry;
pub mod remote;
pub mod state;
pub mod types;
