//! Backend configuration

use std::env;

use crate::geometry::StackingLayer;

/// Default gap between a widget and its tooltip, in logical pixels
pub const TOOLTIP_SPACING: i32 = 6;

/// Tunables of the shell backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// layer-shell namespace of panel surfaces, also the app id of fallback toplevels
    pub namespace: String,
    /// stacking layer of panel surfaces
    pub panel_layer: StackingLayer,
    /// gap between a widget and its tooltip
    pub tooltip_spacing: i32,
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            namespace: "panel".into(),
            panel_layer: StackingLayer::Top,
            tooltip_spacing: TOOLTIP_SPACING,
        }
    }
}

impl ShellConfig {
    /// Set the layer-shell namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the stacking layer of panel surfaces
    pub fn with_panel_layer(mut self, layer: StackingLayer) -> Self {
        self.panel_layer = layer;
        self
    }
}

/// Whether the environment points at a Wayland compositor
///
/// This checks the same variables as `Connection::connect_to_env()`, without
/// connecting.
pub fn is_using_wayland() -> bool {
    env::var_os("WAYLAND_SOCKET").is_some() || env::var_os("WAYLAND_DISPLAY").is_some()
}
