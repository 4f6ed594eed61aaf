//! Per-window shell surfaces
//!
//! A [`ShellSurface`] holds the protocol objects giving a window's native
//! `wl_surface` its role: a layer surface for a docked panel, an xdg toplevel
//! when layer-shell is unavailable, or an xdg popup for menus and tooltips.
//! A surface holds at most one role at a time, and every role transition goes
//! through [`ShellSurface::unmap`] so the compositor never sees two roles
//! alive on the same surface.

use wayland_client::{backend::ObjectId, protocol::wl_surface::WlSurface, Proxy, QueueHandle};
use wayland_protocols::xdg::shell::client::{xdg_popup, xdg_surface, xdg_toplevel};
use wayland_protocols_wlr::layer_shell::v1::client::zwlr_layer_surface_v1::{
    self, KeyboardInteractivity,
};

use crate::{
    backend::ShellState,
    config::ShellConfig,
    error::ShellError,
    geometry::{ScreenEdge, Size, StackingLayer},
    host::{Transient, WindowId},
    positioner::PositionerParams,
    registry::ProtocolCapabilities,
};

/// What shell-surface operations need from the backend
#[derive(Debug, Clone, Copy)]
pub struct ShellContext<'a> {
    /// the bound globals
    pub capabilities: &'a ProtocolCapabilities,
    /// backend configuration
    pub config: &'a ShellConfig,
    /// queue new protocol objects are attached to
    pub qh: &'a QueueHandle<ShellState>,
}

/// Last anchor and exclusive zone sent for a layer surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSurfaceInfo {
    /// anchored edges
    pub anchor: zwlr_layer_surface_v1::Anchor,
    /// reserved space along the anchored edge
    pub exclusive_zone: i32,
}

/// A docked layer surface
#[derive(Debug)]
pub struct LayerRole {
    /// the layer surface
    pub layer_surface: zwlr_layer_surface_v1::ZwlrLayerSurfaceV1,
    /// `None` until anchor and exclusive zone are first set
    pub info: Option<LayerSurfaceInfo>,
}

/// A plain xdg toplevel
#[derive(Debug)]
pub struct ToplevelRole {
    /// the xdg surface
    pub xdg_surface: xdg_surface::XdgSurface,
    /// the toplevel built on it
    pub xdg_toplevel: xdg_toplevel::XdgToplevel,
}

/// An xdg popup
#[derive(Debug)]
pub struct PopupRole {
    /// the xdg surface
    pub xdg_surface: xdg_surface::XdgSurface,
    /// the popup built on it
    pub xdg_popup: xdg_popup::XdgPopup,
}

/// The protocol role currently held by a surface
#[derive(Debug, Default)]
pub enum Role {
    /// no protocol objects
    #[default]
    Unmapped,
    /// docked with layer-shell
    Layer(LayerRole),
    /// mapped as an xdg toplevel
    Toplevel(ToplevelRole),
    /// mapped as an xdg popup
    Popup(PopupRole),
}

/// Discriminant of [`Role`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleKind {
    /// see [`Role::Unmapped`]
    Unmapped,
    /// see [`Role::Layer`]
    Layer,
    /// see [`Role::Toplevel`]
    Toplevel,
    /// see [`Role::Popup`]
    Popup,
}

impl Role {
    /// The discriminant of this role
    pub fn kind(&self) -> RoleKind {
        match self {
            Role::Unmapped => RoleKind::Unmapped,
            Role::Layer(_) => RoleKind::Layer,
            Role::Toplevel(_) => RoleKind::Toplevel,
            Role::Popup(_) => RoleKind::Popup,
        }
    }
}

/// The surface a popup is created against
#[derive(Debug, Clone)]
pub enum PopupParent {
    /// a layer surface, the popup is created parentless and then adopted
    Layer(zwlr_layer_surface_v1::ZwlrLayerSurfaceV1),
    /// an xdg toplevel or popup
    Xdg(xdg_surface::XdgSurface),
}

/// The shell state of one window
#[derive(Debug)]
pub struct ShellSurface {
    window: WindowId,
    surface: WlSurface,
    transient_for: Option<Transient>,
    is_tooltip: bool,
    is_panel: bool,
    size: Size,
    role: Role,
}

impl ShellSurface {
    /// Create an unmapped shell surface for a window's native surface
    pub fn new(window: WindowId, surface: WlSurface, is_panel: bool) -> ShellSurface {
        ShellSurface {
            window,
            surface,
            transient_for: None,
            is_tooltip: false,
            is_panel,
            size: Size::default(),
            role: Role::Unmapped,
        }
    }

    /// The window this surface belongs to
    pub fn window(&self) -> WindowId {
        self.window
    }

    /// The native surface
    pub fn surface(&self) -> &WlSurface {
        &self.surface
    }

    /// The widget and window this surface is positioned relative to
    pub fn transient_for(&self) -> Option<Transient> {
        self.transient_for
    }

    /// Attach this surface to a widget
    pub fn set_transient_for(&mut self, transient: Option<Transient>) {
        self.transient_for = transient;
    }

    /// Whether this surface shows a tooltip
    pub fn is_tooltip(&self) -> bool {
        self.is_tooltip
    }

    /// Mark this surface as a tooltip
    pub fn set_tooltip(&mut self, is_tooltip: bool) {
        self.is_tooltip = is_tooltip;
    }

    /// Whether this surface is a panel strip
    pub fn is_panel(&self) -> bool {
        self.is_panel
    }

    /// Last size set, `0x0` while unmapped
    pub fn size(&self) -> Size {
        self.size
    }

    /// The active role
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// The discriminant of the active role
    pub fn role_kind(&self) -> RoleKind {
        self.role.kind()
    }

    /// The last anchor and exclusive zone sent, if docked
    pub fn layer_info(&self) -> Option<LayerSurfaceInfo> {
        match &self.role {
            Role::Layer(layer) => layer.info,
            _ => None,
        }
    }

    /// What a popup transient for this surface should be created against
    pub fn popup_parent(&self) -> Option<PopupParent> {
        match &self.role {
            Role::Unmapped => None,
            Role::Layer(layer) => Some(PopupParent::Layer(layer.layer_surface.clone())),
            Role::Toplevel(toplevel) => Some(PopupParent::Xdg(toplevel.xdg_surface.clone())),
            Role::Popup(popup) => Some(PopupParent::Xdg(popup.xdg_surface.clone())),
        }
    }

    /// Whether `id` is the role object currently backing this surface
    ///
    /// Events from a popup or layer surface that was since replaced must not
    /// affect the current role.
    pub fn is_current_role_object(&self, id: &ObjectId) -> bool {
        match &self.role {
            Role::Unmapped => false,
            Role::Layer(layer) => layer.layer_surface.id() == *id,
            Role::Toplevel(toplevel) => toplevel.xdg_toplevel.id() == *id,
            Role::Popup(popup) => popup.xdg_popup.id() == *id,
        }
    }

    /// Dock this surface to a screen edge with layer-shell
    pub fn map_as_panel_layer(
        &mut self,
        ctx: &ShellContext<'_>,
        edge: ScreenEdge,
        layer: StackingLayer,
    ) -> Result<(), ShellError> {
        let layer_shell =
            ctx.capabilities.layer_shell.as_ref().ok_or(ShellError::MissingGlobal("zwlr_layer_shell_v1"))?;
        self.teardown_role();

        let layer_surface = layer_shell.get_layer_surface(
            &self.surface,
            None,
            layer.into(),
            ctx.config.namespace.clone(),
            ctx.qh,
            self.window,
        );
        layer_surface.set_keyboard_interactivity(KeyboardInteractivity::None);
        if !self.size.is_empty() {
            layer_surface.set_size(self.size.width as u32, self.size.height as u32);
        }
        self.role = Role::Layer(LayerRole { layer_surface, info: None });
        log::debug!("{} mapped as a layer surface on {:?}", self.window, edge);

        self.set_layer_info(edge, 0).map(|_| ())
    }

    /// Map this surface as a plain xdg toplevel
    pub fn map_as_toplevel(&mut self, ctx: &ShellContext<'_>) -> Result<(), ShellError> {
        let wm_base = ctx.capabilities.xdg_wm_base.as_ref().ok_or(ShellError::MissingGlobal("xdg_wm_base"))?;
        self.teardown_role();

        let xdg_surface = wm_base.get_xdg_surface(&self.surface, ctx.qh, self.window);
        let xdg_toplevel = xdg_surface.get_toplevel(ctx.qh, self.window);
        xdg_toplevel.set_title(ctx.config.namespace.clone());
        xdg_toplevel.set_app_id(ctx.config.namespace.clone());
        if !self.size.is_empty() {
            xdg_surface.set_window_geometry(0, 0, self.size.width, self.size.height);
        }
        self.role = Role::Toplevel(ToplevelRole { xdg_surface, xdg_toplevel });
        self.surface.commit();
        log::debug!("{} mapped as an xdg toplevel", self.window);
        Ok(())
    }

    /// Map this surface as a popup of `parent`
    ///
    /// Any role held before is torn down first, so each call creates fresh
    /// protocol objects.
    pub fn map_as_popup(
        &mut self,
        ctx: &ShellContext<'_>,
        parent: &PopupParent,
        params: &PositionerParams,
    ) -> Result<(), ShellError> {
        self.unmap();

        if self.transient_for.is_none() {
            return Err(ShellError::NotTransient(self.window));
        }
        let wm_base = ctx.capabilities.xdg_wm_base.as_ref().ok_or(ShellError::MissingGlobal("xdg_wm_base"))?;

        let positioner = wm_base.create_positioner(ctx.qh, ());
        params.apply(&positioner);

        let xdg_surface = wm_base.get_xdg_surface(&self.surface, ctx.qh, self.window);
        let xdg_popup = match parent {
            PopupParent::Layer(layer_surface) => {
                let xdg_popup = xdg_surface.get_popup(None, &positioner, ctx.qh, self.window);
                layer_surface.get_popup(&xdg_popup);
                xdg_popup
            }
            PopupParent::Xdg(parent) => {
                xdg_surface.get_popup(Some(parent), &positioner, ctx.qh, self.window)
            }
        };
        positioner.destroy();

        if !xdg_popup.is_alive() {
            xdg_surface.destroy();
            return Err(ShellError::PopupNotCreated(self.window));
        }

        self.size = params.size;
        xdg_surface.set_window_geometry(0, 0, self.size.width, self.size.height);
        self.role = Role::Popup(PopupRole { xdg_surface, xdg_popup });
        self.surface.commit();
        log::debug!("{} mapped as a popup with {:?}", self.window, params);
        Ok(())
    }

    /// Update the cached size, forwarding it to the active role
    ///
    /// Returns `false` without issuing any request if the size is unchanged.
    pub fn set_size(&mut self, size: Size) -> bool {
        if size == self.size {
            return false;
        }
        self.size = size;
        match &self.role {
            Role::Unmapped => {}
            Role::Layer(layer) => {
                layer.layer_surface.set_size(size.width.max(0) as u32, size.height.max(0) as u32);
            }
            Role::Toplevel(ToplevelRole { xdg_surface, .. })
            | Role::Popup(PopupRole { xdg_surface, .. }) => {
                xdg_surface.set_window_geometry(0, 0, size.width, size.height);
            }
        }
        true
    }

    /// Set the docking edge and the exclusive zone of a layer surface
    ///
    /// Only the fields that differ from the last call are sent, followed by a
    /// single commit. Returns whether anything was sent.
    pub fn set_layer_info(&mut self, edge: ScreenEdge, exclusive_zone: i32) -> Result<bool, ShellError> {
        let Role::Layer(layer) = &mut self.role else {
            return Err(ShellError::NotLayerSurface(self.window));
        };

        let next = LayerSurfaceInfo { anchor: edge.layer_anchor(), exclusive_zone };
        let mut changed = false;
        if layer.info.map(|info| info.anchor) != Some(next.anchor) {
            layer.layer_surface.set_anchor(next.anchor);
            changed = true;
        }
        if layer.info.map(|info| info.exclusive_zone) != Some(next.exclusive_zone) {
            layer.layer_surface.set_exclusive_zone(next.exclusive_zone);
            changed = true;
        }
        layer.info = Some(next);

        if changed {
            self.surface.commit();
        }
        Ok(changed)
    }

    /// Destroy every role object, leaving the surface unmapped
    ///
    /// The cached size is always reset. Nothing is sent for an unmapped
    /// surface.
    pub fn unmap(&mut self) {
        self.size = Size::default();
        if self.teardown_role() {
            log::debug!("{} unmapped", self.window);
        }
    }

    // destroys the role objects but keeps the cached size for the next role
    fn teardown_role(&mut self) -> bool {
        match std::mem::take(&mut self.role) {
            Role::Unmapped => return false,
            Role::Popup(PopupRole { xdg_surface, xdg_popup }) => {
                xdg_popup.destroy();
                xdg_surface.destroy();
            }
            Role::Toplevel(ToplevelRole { xdg_surface, xdg_toplevel }) => {
                xdg_toplevel.destroy();
                xdg_surface.destroy();
            }
            Role::Layer(LayerRole { layer_surface, .. }) => {
                layer_surface.destroy();
            }
        }
        true
    }

    /// Tear down the shell surface
    ///
    /// This must happen before the toolkit destroys the native surface.
    pub fn destroy(mut self) {
        self.unmap();
    }
}
