#![forbid(unsafe_code)]
//! shelf-core library.
//!
//! Decision core of an add-on collection page: which query parameters the
//! page reads, when it fetches, where it redirects and which page it lands
//! on after a removal. Nothing here performs I/O beyond reading config; the
//! page state machine returns [`command::Command`]s for a host to execute.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums for typed failures, each mapped to an
//!   [`error::ErrorCode`]; `anyhow::Result` for config loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod collection;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod error_handler;
pub mod fetch;
pub mod filters;
pub mod identity;
pub mod paging;
pub mod route;
pub mod view;

pub use collection::{CollectionSummary, Viewer};
pub use command::Command;
pub use config::ShelfConfig;
pub use controller::{CollectionPage, PageError, PageEvent, PageSettings};
pub use error::ErrorCode;
pub use error_handler::{ErrorHandlerId, RequestFailure};
pub use fetch::{FetchDecision, FetchDecisionEngine, LoadState};
pub use filters::{Filters, SortKey};
pub use route::{CollectionRoute, PageMode, Route, RouteParams};
pub use view::PageView;
