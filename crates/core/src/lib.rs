//! Marshal Core Library
//!
//! This is the core library for the Marshal build runner. It loads a targets
//! file, resolves the requested targets and their prerequisites into a
//! dependency-respecting order, and executes their commands one at a time,
//! skipping file targets whose output is already up to date.
//!
//! ## Architecture
//!
//! - [`manager`] - High-level interface used by the CLI
//! - [`graph`] - Immutable target graph, resolution and cycle detection
//! - [`execution`] - Command runner abstraction and the target runner
//! - [`freshness`] - Output modification-time checks
//! - [`interpolation`] - `$(NAME)` variable expansion in commands
//! - [`configs`] - Targets file parsing (YAML or TOML) and JSON schema
//! - [`results`] - Result types for manager operations
//! - [`style`] - Terminal colors
//! - [`types`] - Error type and result alias
//!
//! ## Usage
//!
//! ```rust,no_run
//! use marshal_core::manager::{TargetManager, TargetManagerConfig};
//! use std::path::PathBuf;
//!
//! # fn example() -> marshal_core::types::MarshalResult<()> {
//! let manager = TargetManager::new(TargetManagerConfig {
//!     working_dir: PathBuf::from("."),
//!     config_file: None,
//! })?;
//!
//! for target in manager.list_targets().targets {
//!     println!("{}", target.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod configs;
pub mod execution;
pub mod freshness;
pub mod graph;
pub mod interpolation;
pub mod manager;
pub mod results;
pub mod style;
pub mod types;

// Re-export the main types for easier usage
pub use manager::{TargetManager, TargetManagerConfig};
pub use types::{MarshalError, MarshalResult};
