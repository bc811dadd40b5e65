// src/lib.rs

//! Chopsticks
//!
//! Manages dotfile and system packages defined in a git-backed repository
//! of `pkg.toml` files. Each package declares its dependencies and the
//! reversible actions (links, files, services, firewall rules, native
//! packages) that install, update or uninstall it.
//!
//! # Architecture
//!
//! - Resolver: orders packages so dependencies come first on install and last on uninstall
//! - Executor: runs a package's actions and rolls back the applied ones on failure
//! - State: a JSON file recording installed versions, saved after every package

pub mod action;
pub mod commands;
pub mod config;
mod error;
pub mod executor;
pub mod filesystem;
pub mod packages;
pub mod repository;
pub mod resolver;
pub mod state;

pub use error::{Error, Result};
