//! Snowrun CLI Library
//!
//! This crate provides the command-line interface for snowrun. It parses
//! arguments, dispatches operations to the core pipeline and renders the
//! dashboard as plain text.
//!
//! # Architecture
//!
//! - [`cli_args`]: Command-line argument parsing with `clap`
//! - [`arguments`]: Named and positional parameter values for catalog operations
//! - [`commands`]: Dispatch of each subcommand, listing and error reporting
//! - [`dashboard_view`]: Text output for dashboard sessions
//!
//! # Examples
//!
//! ```bash
//! # Preview the Iceberg demo setup
//! snowrun hirc setup --dry-run
//!
//! # Grant access on a different table
//! snowrun hirc grant-rbac --table ORDERS
//!
//! # Smart Crowd Counter roles come from flags
//! snowrun scc create-role --admin-role ACCOUNTADMIN --demo-role CROWD_ROLE
//!
//! # Operations from a YAML file, with named or positional values
//! snowrun run report --operations-file ops.yml -p region=EU
//! snowrun run report --operations-file ops.yml EU
//!
//! # Dashboard
//! snowrun dashboard upload photos/*.jpg
//! snowrun dashboard show 0
//! ```

pub mod arguments;
pub mod cli_args;
pub mod commands;
pub mod dashboard_view;
