//! The Wayland connection and the shell surfaces of every window
//!
//! [`WaylandBackend`] owns the connection to the compositor, its event queue
//! and a [`ShellSurface`] per managed window. Event handlers never touch the
//! shell surfaces directly: they record what happened in [`ShellState`], and
//! the backend applies it once dispatching returns, so host notifications can
//! never re-enter a dispatch.

use std::collections::{HashMap, HashSet};

use wayland_client::{
    backend::ObjectId,
    delegate_dispatch, delegate_noop,
    protocol::{wl_compositor, wl_registry, wl_surface},
    Connection, Dispatch, EventQueue, Proxy, QueueHandle,
};
use wayland_protocols::xdg::shell::client::{
    xdg_popup, xdg_positioner, xdg_surface, xdg_toplevel, xdg_wm_base,
};
use wayland_protocols_wlr::layer_shell::v1::client::{zwlr_layer_shell_v1, zwlr_layer_surface_v1};

use crate::{
    config::ShellConfig,
    error::ShellError,
    geometry::{Rectangle, ScreenEdge, Size},
    host::{HostToolkit, Transient, WidgetId, WindowId},
    placement::{place, PlacementContext},
    positioner::{compute_positioner, logical_rect},
    registry::{GlobalDescription, GlobalList, ProtocolCapabilities},
    shell_surface::{PopupParent, RoleKind, ShellContext, ShellSurface},
};

// bound on transient-for walks, a longer chain can only be a cycle
const MAX_TRANSIENT_DEPTH: usize = 64;

/// Something the compositor told us, applied after dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingEvent {
    /// a popup was dismissed or a layer surface closed
    Dismissed { window: WindowId, object: ObjectId },
    /// the compositor chose a size
    Configure { window: WindowId, object: ObjectId, size: Size },
}

/// The state of the backend's event queue
#[derive(Debug, Default)]
pub struct ShellState {
    globals: GlobalList,
    pending: Vec<PendingEvent>,
}

impl AsMut<GlobalList> for ShellState {
    fn as_mut(&mut self) -> &mut GlobalList {
        &mut self.globals
    }
}

delegate_dispatch!(ShellState: [wl_registry::WlRegistry: ()] => GlobalList);

delegate_noop!(ShellState: wl_compositor::WlCompositor);
delegate_noop!(ShellState: ignore wl_surface::WlSurface);
delegate_noop!(ShellState: xdg_positioner::XdgPositioner);
delegate_noop!(ShellState: zwlr_layer_shell_v1::ZwlrLayerShellV1);

impl Dispatch<xdg_wm_base::XdgWmBase, ()> for ShellState {
    fn event(
        _: &mut Self,
        wm_base: &xdg_wm_base::XdgWmBase,
        event: xdg_wm_base::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let xdg_wm_base::Event::Ping { serial } = event {
            wm_base.pong(serial);
        }
    }
}

impl Dispatch<xdg_surface::XdgSurface, WindowId> for ShellState {
    fn event(
        _: &mut Self,
        xdg_surface: &xdg_surface::XdgSurface,
        event: xdg_surface::Event,
        _: &WindowId,
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let xdg_surface::Event::Configure { serial } = event {
            xdg_surface.ack_configure(serial);
        }
    }
}

impl Dispatch<xdg_toplevel::XdgToplevel, WindowId> for ShellState {
    fn event(
        state: &mut Self,
        toplevel: &xdg_toplevel::XdgToplevel,
        event: xdg_toplevel::Event,
        window: &WindowId,
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            xdg_toplevel::Event::Configure { width, height, .. } => {
                state.configure(*window, toplevel.id(), Size::new(width, height));
            }
            xdg_toplevel::Event::Close => {
                log::debug!("compositor asked to close {}, panels stay open", window);
            }
            _ => {}
        }
    }
}

impl Dispatch<xdg_popup::XdgPopup, WindowId> for ShellState {
    fn event(
        state: &mut Self,
        popup: &xdg_popup::XdgPopup,
        event: xdg_popup::Event,
        window: &WindowId,
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            xdg_popup::Event::Configure { x, y, width, height } => {
                log::trace!("popup {} placed at {},{}", window, x, y);
                state.configure(*window, popup.id(), Size::new(width, height));
            }
            xdg_popup::Event::PopupDone => {
                state.pending.push(PendingEvent::Dismissed { window: *window, object: popup.id() });
            }
            _ => {}
        }
    }
}

impl Dispatch<zwlr_layer_surface_v1::ZwlrLayerSurfaceV1, WindowId> for ShellState {
    fn event(
        state: &mut Self,
        layer_surface: &zwlr_layer_surface_v1::ZwlrLayerSurfaceV1,
        event: zwlr_layer_surface_v1::Event,
        window: &WindowId,
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            zwlr_layer_surface_v1::Event::Configure { serial, width, height } => {
                layer_surface.ack_configure(serial);
                state.configure(*window, layer_surface.id(), Size::new(width as i32, height as i32));
            }
            zwlr_layer_surface_v1::Event::Closed => {
                state
                    .pending
                    .push(PendingEvent::Dismissed { window: *window, object: layer_surface.id() });
            }
            _ => {}
        }
    }
}

impl ShellState {
    // a zero dimension leaves the choice to the client
    fn configure(&mut self, window: WindowId, object: ObjectId, size: Size) {
        if !size.is_empty() {
            self.pending.push(PendingEvent::Configure { window, object, size });
        }
    }

    /// The globals advertised by the compositor
    pub fn globals(&self) -> &GlobalList {
        &self.globals
    }
}

/// The Wayland side of the panel
pub struct WaylandBackend<H> {
    conn: Connection,
    queue: EventQueue<ShellState>,
    state: ShellState,
    registry: Option<wl_registry::WlRegistry>,
    capabilities: ProtocolCapabilities,
    surfaces: HashMap<WindowId, ShellSurface>,
    host: H,
    config: ShellConfig,
}

impl<H> std::fmt::Debug for WaylandBackend<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaylandBackend")
            .field("initialized", &self.registry.is_some())
            .field("capabilities", &self.capabilities)
            .field("surfaces", &self.surfaces.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<H: HostToolkit> WaylandBackend<H> {
    /// Create a backend on an existing connection
    ///
    /// Nothing is sent to the compositor before [`initialize`](Self::initialize).
    pub fn new(conn: Connection, host: H, config: ShellConfig) -> Self {
        let queue = conn.new_event_queue();
        WaylandBackend {
            conn,
            queue,
            state: ShellState::default(),
            registry: None,
            capabilities: ProtocolCapabilities::default(),
            surfaces: HashMap::new(),
            host,
            config,
        }
    }

    /// Connect to the compositor named by the environment
    pub fn connect(host: H, config: ShellConfig) -> Result<Self, ShellError> {
        let conn = Connection::connect_to_env()?;
        Ok(Self::new(conn, host, config))
    }

    /// Enumerate and bind the globals
    ///
    /// This blocks until the compositor answered. It can only succeed once.
    pub fn initialize(&mut self) -> Result<(), ShellError> {
        if self.registry.is_some() {
            log::error!("the wayland backend was initialized twice");
            return Err(ShellError::AlreadyInitialized);
        }

        let qh = self.queue.handle();
        let registry = self.conn.display().get_registry(&qh, ());
        self.queue.roundtrip(&mut self.state)?;

        self.capabilities = ProtocolCapabilities::bind(&self.state.globals, &qh, &registry);
        self.registry = Some(registry);

        if self.capabilities.layer_shell.is_none() {
            log::warn!(
                "the compositor does not support the layer shell protocol, \
                 panels will be regular windows and placement will be approximate"
            );
        }
        if self.capabilities.xdg_wm_base.is_none() {
            log::warn!("the compositor does not support xdg-shell, menus and tooltips will not be shown");
        }

        self.queue.roundtrip(&mut self.state)?;
        Ok(())
    }

    /// Whether [`initialize`](Self::initialize) succeeded
    pub fn is_initialized(&self) -> bool {
        self.registry.is_some()
    }

    /// The bound protocol globals
    pub fn capabilities(&self) -> &ProtocolCapabilities {
        &self.capabilities
    }

    /// Every global the compositor advertised
    pub fn globals(&self) -> &[GlobalDescription] {
        self.state.globals.list()
    }

    /// The configuration this backend was created with
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// The connection to the compositor
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// The host toolkit
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host toolkit
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Create a native surface for hosts that have no compositor binding of their own
    pub fn create_surface(&self) -> Result<wl_surface::WlSurface, ShellError> {
        let compositor =
            self.capabilities.compositor.as_ref().ok_or(ShellError::MissingGlobal("wl_compositor"))?;
        Ok(compositor.create_surface(&self.queue.handle(), ()))
    }

    /// The shell surface of a window
    pub fn shell_surface(&self, window: WindowId) -> Option<&ShellSurface> {
        self.surfaces.get(&window)
    }

    /// The role a window's surface currently holds
    pub fn role_kind(&self, window: WindowId) -> Option<RoleKind> {
        self.surfaces.get(&window).map(ShellSurface::role_kind)
    }

    /// Create the shell surface of a realized window
    ///
    /// The surface starts unmapped.
    pub fn create_shell_surface(
        &mut self,
        window: WindowId,
        is_panel: bool,
        transient_for: Option<Transient>,
    ) -> Result<&mut ShellSurface, ShellError> {
        if self.surfaces.contains_key(&window) {
            return Err(ShellError::AlreadyExists(window));
        }
        let surface = self.host.native_surface(window).ok_or(ShellError::NoNativeSurface(window))?;

        let mut shell_surface = ShellSurface::new(window, surface, is_panel);
        shell_surface.set_transient_for(transient_for);
        log::debug!("created shell surface for {} (panel: {})", window, is_panel);
        Ok(self.surfaces.entry(window).or_insert(shell_surface))
    }

    /// Create a shell surface positioned relative to `attach`
    ///
    /// Returns `false` without creating anything when the window containing
    /// `attach` has no shell surface of its own, such windows are left to the
    /// toolkit.
    pub fn create_transient(
        &mut self,
        window: WindowId,
        attach: WidgetId,
        is_tooltip: bool,
    ) -> Result<bool, ShellError> {
        let Some(attach_window) = self.host.widget_window(attach) else {
            log::debug!("{} is not in any window, {} is left to the toolkit", attach, window);
            return Ok(false);
        };
        if !self.surfaces.contains_key(&attach_window) {
            log::debug!("{} has no shell surface, {} is left to the toolkit", attach_window, window);
            return Ok(false);
        }

        let transient = Transient { widget: attach, window: attach_window };
        let shell_surface = self.create_shell_surface(window, false, Some(transient))?;
        shell_surface.set_tooltip(is_tooltip);
        Ok(true)
    }

    /// Point an existing transient surface at another widget
    pub fn set_transient_for(
        &mut self,
        window: WindowId,
        attach: WidgetId,
        is_tooltip: bool,
    ) -> Result<(), ShellError> {
        let attach_window = self.host.widget_window(attach);
        let shell_surface = self.surfaces.get_mut(&window).ok_or(ShellError::UnknownWindow(window))?;
        shell_surface.set_transient_for(attach_window.map(|window| Transient { widget: attach, window }));
        shell_surface.set_tooltip(is_tooltip);
        Ok(())
    }

    /// Realize a window as the panel strip and dock it
    pub fn realize_panel_toplevel(&mut self, window: WindowId) -> Result<(), ShellError> {
        if !self.surfaces.contains_key(&window) {
            self.create_shell_surface(window, true, None)?;
        }
        self.map_panel(window)
    }

    /// Dock a panel's surface to its screen edge
    ///
    /// Without layer-shell the panel becomes a regular toplevel window.
    pub fn map_panel(&mut self, window: WindowId) -> Result<(), ShellError> {
        let edge = self.host.panel_edge(window).unwrap_or(ScreenEdge::Bottom);
        let size = self.host.window_size(window);

        let qh = self.queue.handle();
        let ctx = ShellContext { capabilities: &self.capabilities, config: &self.config, qh: &qh };
        let shell_surface = self.surfaces.get_mut(&window).ok_or(ShellError::UnknownWindow(window))?;

        shell_surface.set_size(size);
        if ctx.capabilities.layer_shell.is_some() {
            shell_surface.map_as_panel_layer(&ctx, edge, self.config.panel_layer)?;
        } else {
            log::warn!("{} is mapped as a regular window, its position is up to the compositor", window);
            shell_surface.map_as_toplevel(&ctx)?;
        }

        self.roundtrip()
    }

    /// Place and map a transient window as a popup
    ///
    /// A transient window or a popup is unmapped first, so a failed map
    /// leaves it unmapped. Any other window keeps its role.
    pub fn map_popup(&mut self, window: WindowId) -> Result<(), ShellError> {
        let shell_surface = self.surfaces.get_mut(&window).ok_or(ShellError::UnknownWindow(window))?;
        let transient = shell_surface.transient_for();
        if transient.is_some() || shell_surface.role_kind() == RoleKind::Popup {
            shell_surface.unmap();
        }
        let transient = transient.ok_or(ShellError::NotTransient(window))?;
        let is_tooltip = shell_surface.is_tooltip();

        let parent = self.popup_parent(window)?;
        let nested = self
            .surfaces
            .get(&transient.window)
            .map_or(false, |parent| parent.transient_for().is_some());

        let toplevel = self.toplevel_of(window).filter(|toplevel| *toplevel != window);
        let panel = toplevel.filter(|toplevel| self.surfaces.get(toplevel).map_or(false, ShellSurface::is_panel));
        let panel_edge = toplevel.and_then(|toplevel| self.host.panel_edge(toplevel)).unwrap_or(ScreenEdge::Bottom);
        let attached_to_panel = panel.map_or(false, |panel| {
            transient.window == panel && self.host.root_widget(panel) == Some(transient.widget)
        });
        let pointer = panel.and_then(|panel| self.host.pointer_position(panel));

        let placement = place(&PlacementContext {
            is_tooltip,
            nested,
            panel_edge,
            attached_to_panel,
            pointer,
            tooltip_spacing: self.config.tooltip_spacing,
        });

        let anchor_rect = self
            .host
            .widget_allocation(transient.widget)
            .unwrap_or_else(|| Rectangle::from_size(self.host.window_size(transient.window)));
        let surface_size = self.host.window_size(window);
        let logical = logical_rect(&self.host.child_allocations(window), surface_size);
        let params = compute_positioner(
            anchor_rect,
            logical,
            surface_size,
            placement.anchor,
            placement.gravity,
            placement.offset,
        );

        let qh = self.queue.handle();
        let ctx = ShellContext { capabilities: &self.capabilities, config: &self.config, qh: &qh };
        let shell_surface = self.surfaces.get_mut(&window).ok_or(ShellError::UnknownWindow(window))?;
        shell_surface.map_as_popup(&ctx, &parent, &params)?;

        self.roundtrip()
    }

    /// The window a shell surface is transient for, if it has a shell surface too
    pub fn parent_of(&self, window: WindowId) -> Option<WindowId> {
        let transient = self.surfaces.get(&window)?.transient_for()?;
        self.surfaces.contains_key(&transient.window).then_some(transient.window)
    }

    /// The outermost window of a transient chain
    ///
    /// A window that is not transient for anything is its own toplevel.
    pub fn toplevel_of(&self, window: WindowId) -> Option<WindowId> {
        if !self.surfaces.contains_key(&window) {
            return None;
        }
        let mut current = window;
        let mut seen = HashSet::new();
        while let Some(parent) = self.parent_of(current) {
            if !seen.insert(current) || seen.len() > MAX_TRANSIENT_DEPTH {
                log::warn!("transient chain of {} loops back on itself", window);
                break;
            }
            current = parent;
        }
        Some(current)
    }

    // the nearest ancestor holding a role a popup can be created against
    fn popup_parent(&self, window: WindowId) -> Result<PopupParent, ShellError> {
        let mut current = window;
        let mut seen = HashSet::new();
        while let Some(parent) = self.parent_of(current) {
            if !seen.insert(current) || seen.len() > MAX_TRANSIENT_DEPTH {
                break;
            }
            if let Some(popup_parent) = self.surfaces.get(&parent).and_then(ShellSurface::popup_parent) {
                return Ok(popup_parent);
            }
            current = parent;
        }
        Err(ShellError::NoMappedAncestor(window))
    }

    /// Set the size of a window's surface
    ///
    /// Returns whether anything was sent.
    pub fn set_size(&mut self, window: WindowId, size: Size) -> Result<bool, ShellError> {
        let shell_surface = self.surfaces.get_mut(&window).ok_or(ShellError::UnknownWindow(window))?;
        Ok(shell_surface.set_size(size))
    }

    /// Reserve `size` pixels along the edge a panel is docked to
    ///
    /// Layer-shell has no notion of a partial strut, `start` and `end` are
    /// accepted for toolkits that track them but not sent. A panel that is not
    /// docked with layer-shell has no strut and is left alone.
    pub fn set_strut(
        &mut self,
        window: WindowId,
        edge: ScreenEdge,
        size: u32,
        start: u32,
        end: u32,
    ) -> Result<bool, ShellError> {
        let shell_surface = self.surfaces.get_mut(&window).ok_or(ShellError::UnknownWindow(window))?;
        if shell_surface.role_kind() != RoleKind::Layer {
            log::debug!("{} is not docked, ignoring its strut", window);
            return Ok(false);
        }
        log::trace!("strut of {}: {} px on {:?} from {} to {}", window, size, edge, start, end);
        shell_surface.set_layer_info(edge, size.min(i32::MAX as u32) as i32)
    }

    /// Remove a window's role, keeping its shell surface for a later map
    pub fn unmap(&mut self, window: WindowId) -> Result<(), ShellError> {
        let shell_surface = self.surfaces.get_mut(&window).ok_or(ShellError::UnknownWindow(window))?;
        shell_surface.unmap();
        Ok(())
    }

    /// Destroy a window's shell surface
    ///
    /// This must run before the toolkit destroys the native surface.
    pub fn destroy(&mut self, window: WindowId) -> Result<(), ShellError> {
        let shell_surface = self.surfaces.remove(&window).ok_or(ShellError::UnknownWindow(window))?;
        shell_surface.destroy();
        log::debug!("destroyed shell surface of {}", window);
        Ok(())
    }

    /// Block until the compositor processed every request sent so far
    pub fn roundtrip(&mut self) -> Result<(), ShellError> {
        self.queue.roundtrip(&mut self.state)?;
        self.process_pending();
        Ok(())
    }

    /// Dispatch the events already read from the connection
    pub fn dispatch_pending(&mut self) -> Result<usize, ShellError> {
        let count = self.queue.dispatch_pending(&mut self.state)?;
        self.process_pending();
        Ok(count)
    }

    /// Wait for events and dispatch them
    pub fn blocking_dispatch(&mut self) -> Result<usize, ShellError> {
        let count = self.queue.blocking_dispatch(&mut self.state)?;
        self.process_pending();
        Ok(count)
    }

    /// Send every pending request to the compositor
    pub fn flush(&self) -> Result<(), ShellError> {
        self.queue.flush()?;
        Ok(())
    }

    fn process_pending(&mut self) {
        for event in std::mem::take(&mut self.state.pending) {
            match event {
                PendingEvent::Dismissed { window, object } => {
                    let Some(shell_surface) = self.surfaces.get_mut(&window) else {
                        continue;
                    };
                    if !shell_surface.is_current_role_object(&object) {
                        log::debug!("ignoring dismissal of a previous role of {}", window);
                        continue;
                    }
                    log::debug!("the compositor dismissed {}", window);
                    shell_surface.unmap();
                    self.host.surface_dismissed(window);
                }
                PendingEvent::Configure { window, object, size } => {
                    let current = self
                        .surfaces
                        .get(&window)
                        .map_or(false, |shell_surface| shell_surface.is_current_role_object(&object));
                    if current {
                        self.host.resize_window(window, size);
                    }
                }
            }
        }
    }
}
