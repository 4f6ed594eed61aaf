//! Entry points for the host toolkit
//!
//! The toolkit calls [`PanelShell`] from its own window callbacks. Each
//! callback runs a [`HookChain`] around the toolkit's native handler: shell
//! setup is registered after the native realize and map handlers, shell
//! teardown before the native unmap and destroy handlers, so protocol objects
//! are always gone before the surface they decorate.
//!
//! Errors stop at this boundary. They are logged, and the window stays
//! unmapped or undocked.

use crate::{
    backend::WaylandBackend,
    config::ShellConfig,
    error::ShellError,
    geometry::{Point, ScreenEdge, Size},
    hooks::HookChain,
    host::{HostToolkit, TooltipOrigin, WidgetId, WindowId, WindowKind},
    shell_surface::RoleKind,
};

/// A window being realized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Realize {
    /// the window
    pub window: WindowId,
    /// what it is to the panel
    pub kind: WindowKind,
}

/// Chain run when a window is realized
pub type RealizeChain<H> = HookChain<WaylandBackend<H>, Realize>;
/// Chain run on window map, unmap and destroy
pub type WindowChain<H> = HookChain<WaylandBackend<H>, WindowId>;

/// The panel's Wayland shell integration
#[derive(Debug)]
pub struct PanelShell<H> {
    backend: WaylandBackend<H>,
    realize: RealizeChain<H>,
    map: WindowChain<H>,
    unmap: WindowChain<H>,
    destroy: WindowChain<H>,
}

impl<H: HostToolkit + 'static> PanelShell<H> {
    /// Wrap an initialized backend
    pub fn new(backend: WaylandBackend<H>) -> Self {
        let mut realize = RealizeChain::new();
        realize.after(|backend, event| realize_core(backend, event));
        let mut map = WindowChain::new();
        map.after(|backend, window| map_core(backend, *window));
        let mut unmap = WindowChain::new();
        unmap.before(|backend, window| unmap_core(backend, *window));
        let mut destroy = WindowChain::new();
        destroy.before(|backend, window| destroy_core(backend, *window));

        PanelShell { backend, realize, map, unmap, destroy }
    }

    /// Connect to the compositor named by the environment and bind its globals
    pub fn connect(host: H, config: ShellConfig) -> Result<Self, ShellError> {
        let mut backend = WaylandBackend::connect(host, config)?;
        backend.initialize()?;
        Ok(Self::new(backend))
    }

    /// The backend
    pub fn backend(&self) -> &WaylandBackend<H> {
        &self.backend
    }

    /// The backend
    pub fn backend_mut(&mut self) -> &mut WaylandBackend<H> {
        &mut self.backend
    }

    /// Hooks around window realization
    pub fn realize_hooks(&mut self) -> &mut RealizeChain<H> {
        &mut self.realize
    }

    /// Hooks around window map
    pub fn map_hooks(&mut self) -> &mut WindowChain<H> {
        &mut self.map
    }

    /// Hooks around window unmap
    pub fn unmap_hooks(&mut self) -> &mut WindowChain<H> {
        &mut self.unmap
    }

    /// Hooks around window destruction
    pub fn destroy_hooks(&mut self) -> &mut WindowChain<H> {
        &mut self.destroy
    }

    /// A window was realized
    pub fn on_window_realize(&mut self, window: WindowId, kind: WindowKind, native: impl FnOnce(&Realize)) {
        self.realize.run(&mut self.backend, &Realize { window, kind }, native);
    }

    /// A window was mapped
    ///
    /// A panel unmapped earlier is docked again, a transient window is placed
    /// as a popup.
    pub fn on_window_map(&mut self, window: WindowId, native: impl FnOnce(&WindowId)) {
        self.map.run(&mut self.backend, &window, native);
    }

    /// Place and map a popup
    pub fn on_popup_map(&mut self, window: WindowId) {
        report("mapping popup", self.backend.map_popup(window));
    }

    /// The toolkit asks whether a widget has a tooltip
    ///
    /// The returned origin is to be handed back to
    /// [`on_tooltip_show`](Self::on_tooltip_show) with the tooltip window.
    pub fn on_query_tooltip(&self, widget: WidgetId, x: i32, y: i32, text: Option<&str>) -> Option<TooltipOrigin> {
        let text = text?;
        log::trace!("{} queried a tooltip at {},{}: {:?}", widget, x, y, text);
        Some(TooltipOrigin { widget, position: Point::new(x, y) })
    }

    /// A tooltip window is about to be shown for `origin`
    ///
    /// Toolkits reuse one tooltip window for every widget, so the window is
    /// attached to the origin's widget again on each call.
    pub fn on_tooltip_show(&mut self, window: WindowId, origin: TooltipOrigin) {
        let attached = if self.backend.shell_surface(window).is_some() {
            self.backend.set_transient_for(window, origin.widget, true).map(|()| true)
        } else {
            self.backend.create_transient(window, origin.widget, true)
        };
        if report("attaching tooltip", attached) == Some(true) {
            report("showing tooltip", self.backend.map_popup(window));
        }
    }

    /// The toolkit allocated a new size to a window
    pub fn on_window_resize(&mut self, window: WindowId, size: Size) {
        if self.backend.shell_surface(window).is_some() {
            report("resizing", self.backend.set_size(window, size));
        }
    }

    /// A window is being unmapped
    pub fn on_window_unmap(&mut self, window: WindowId, native: impl FnOnce(&WindowId)) {
        self.unmap.run(&mut self.backend, &window, native);
    }

    /// A window is being destroyed
    pub fn on_window_destroy(&mut self, window: WindowId, native: impl FnOnce(&WindowId)) {
        self.destroy.run(&mut self.backend, &window, native);
    }

    /// Realize a window as the panel strip and dock it
    pub fn realize_panel_toplevel(&mut self, window: WindowId) {
        report("realizing panel", self.backend.realize_panel_toplevel(window));
    }

    /// Reserve screen space along the edge a panel is docked to
    pub fn set_strut(&mut self, window: WindowId, edge: ScreenEdge, size: u32, start: u32, end: u32) {
        report("setting strut", self.backend.set_strut(window, edge, size, start, end));
    }

    /// Dispatch pending events, see [`WaylandBackend::dispatch_pending`]
    pub fn dispatch_pending(&mut self) {
        report("dispatching events", self.backend.dispatch_pending());
    }
}

fn realize_core<H: HostToolkit>(backend: &mut WaylandBackend<H>, event: &Realize) {
    match event.kind {
        WindowKind::PanelToplevel => {
            report("realizing panel", backend.realize_panel_toplevel(event.window));
        }
        WindowKind::Popup { attach } => {
            report("realizing popup", backend.create_transient(event.window, attach, false));
        }
        WindowKind::Tooltip(origin) => {
            report("realizing tooltip", backend.create_transient(event.window, origin.widget, true));
        }
        WindowKind::Plain => {}
    }
}

fn map_core<H: HostToolkit>(backend: &mut WaylandBackend<H>, window: WindowId) {
    let Some(shell_surface) = backend.shell_surface(window) else {
        return;
    };
    if shell_surface.role_kind() != RoleKind::Unmapped {
        return;
    }
    let (is_panel, is_transient) = (shell_surface.is_panel(), shell_surface.transient_for().is_some());
    if is_panel {
        report("mapping panel", backend.map_panel(window));
    } else if is_transient {
        report("mapping popup", backend.map_popup(window));
    }
}

fn unmap_core<H: HostToolkit>(backend: &mut WaylandBackend<H>, window: WindowId) {
    if backend.shell_surface(window).is_some() {
        report("unmapping", backend.unmap(window));
    }
}

fn destroy_core<H: HostToolkit>(backend: &mut WaylandBackend<H>, window: WindowId) {
    if backend.shell_surface(window).is_some() {
        report("destroying", backend.destroy(window));
    }
}

fn report<T>(operation: &str, result: Result<T, ShellError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) if err.is_invariant_violation() => {
            log::error!("{} failed: {}", operation, err);
            None
        }
        Err(err) => {
            log::warn!("{} failed: {}", operation, err);
            None
        }
    }
}
