//! Wayland shell-surface backend for desktop panels
//!
//! This crate gives the windows of a desktop panel their Wayland shell roles:
//! the panel strip is docked to a screen edge with the wlroots layer-shell
//! protocol, and its menus and tooltips are mapped as xdg popups placed
//! relative to the widget they belong to. When the compositor has no
//! layer-shell support, the panel falls back to a regular xdg toplevel.
//!
//! The crate does not draw anything and does not handle input. The host
//! toolkit keeps ownership of its windows and widgets, describes them through
//! the [`HostToolkit`] trait, and forwards its window callbacks to a
//! [`PanelShell`]:
//!
//! ```no_run
//! # use wayland_panel_shell::*;
//! # fn run<H: HostToolkit + 'static>(host: H, panel: WindowId) -> Result<(), ShellError> {
//! let mut shell = PanelShell::connect(host, ShellConfig::default())?;
//! shell.on_window_realize(panel, WindowKind::PanelToplevel, |_| {
//!     // the toolkit's own realize handler
//! });
//! shell.set_strut(panel, ScreenEdge::Bottom, 32, 0, 0);
//! loop {
//!     shell.backend_mut().blocking_dispatch()?;
//! }
//! # }
//! ```
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`](https://docs.rs/log) facade. A missing
//! protocol or a popup the compositor refused is reported as a warning, a
//! misuse of the API (such as initializing twice) as an error.
//!
//! ## Cargo features
//!
//! The `system` feature makes `wayland-client` use the system `libwayland`,
//! for toolkits that share their connection with this crate.

#![warn(missing_docs, missing_debug_implementations)]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod backend;
pub mod config;
mod error;
pub mod geometry;
pub mod hooks;
pub mod host;
pub mod placement;
pub mod positioner;
pub mod registry;
pub mod shell_surface;
mod shims;

pub use backend::{ShellState, WaylandBackend};
pub use config::{is_using_wayland, ShellConfig};
pub use error::ShellError;
pub use geometry::{Corner, Point, Rectangle, ScreenEdge, Size, StackingLayer};
pub use host::{HostToolkit, Transient, TooltipOrigin, WidgetId, WindowId, WindowKind};
pub use shims::{PanelShell, Realize, RealizeChain, WindowChain};

pub use wayland_client;
