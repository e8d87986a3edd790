#![forbid(unsafe_code)]

//! The panview browser shell.
//!
//! # Role in panview
//! `panview` is the outermost crate: it owns windows, the window-selection
//! grid, the history and bookmark stores, configuration and logging, and
//! ships the `panview` binary that replays input traces through the whole
//! interaction stack.
//!
//! # Primary responsibilities
//! - **Shell**: windows, home/browsing mode, chrome toggles, event log.
//! - **BrowsingView / HomeView**: the two surfaces input is routed to.
//! - **Stores**: versioned flat-file history and bookmarks.
//! - **ShellConfig**: TOML/JSON configuration with validation.
//! - **Trace replay**: deterministic virtual-clock replay of JSON-lines
//!   input traces.

pub mod browsing;
pub mod cli;
pub mod config;
pub mod error;
pub mod home;
pub mod logging;
pub mod shell;
pub mod store;
pub mod trace;

pub use browsing::{BrowsingView, Chrome};
pub use cli::{Cli, run, run_from_env};
pub use config::{FlagOverrides, ShellConfig};
pub use error::{Result, ShellError};
pub use home::{HomeAction, HomeView, WindowTile};
pub use shell::{Mode, Shell, ShellEvent, Window};
pub use store::{BookmarkStore, HistoryStore, UrlEntry};
