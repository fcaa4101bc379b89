//! Snowrun Core Library
//!
//! This crate provides the core functionality for snowrun, a command runner that
//! reads connection settings from a `.env` file, maps them onto SQL template
//! variables and runs `snow sql` against a project's SQL templates.
//!
//! # Key Features
//!
//! - **Settings**: Load `.env` files into an explicit settings object without
//!   touching the process environment
//! - **Operation Definitions**: Parse and validate YAML operation tables, including
//!   the built-in `hirc` and `scc` catalogs
//! - **Variable Templating**: Render template variables from settings and parameters
//! - **Execution**: Preview or run `snow sql` and propagate its exit code
//! - **Dashboard**: Stage upload, refresh and view browsing for the crowd counter
//!
//! # Examples
//!
//! Previewing a built-in operation:
//!
//! ```no_run
//! use indexmap::IndexMap;
//! use snowrun_core::catalog::{Catalog, HIRC};
//! use snowrun_core::execution::ProcessExecutor;
//! use snowrun_core::runner::{run_operation, RunOptions};
//!
//! let catalog = Catalog::builtin(HIRC)?;
//! let options = RunOptions {
//!     dry_run: true,
//!     ..RunOptions::default()
//! };
//! run_operation(
//!     catalog.find("setup")?,
//!     &IndexMap::new(),
//!     &options,
//!     &mut ProcessExecutor,
//!     &mut std::io::stdout(),
//! )?;
//! # Ok::<(), snowrun_core::error::Error>(())
//! ```

pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod execution;
pub mod file_handling;
pub mod interpolation;
pub mod invocation;
pub mod operation_definitions;
pub mod runner;
pub mod settings;
