// A compositor implementing just enough of the core, xdg-shell and
// layer-shell protocols to record what the panel backend asks for.

use std::sync::{Arc, Mutex};

use crate::helpers::ways;

use ways::protocol::{wl_compositor, wl_region, wl_surface};
use ways::{Client, DataInit, Dispatch, DisplayHandle, GlobalDispatch, New, Resource};

use wayland_protocols::xdg::shell::server::{
    xdg_popup, xdg_positioner, xdg_surface, xdg_toplevel, xdg_wm_base,
};
use wayland_protocols_wlr::layer_shell::v1::server::{zwlr_layer_shell_v1, zwlr_layer_surface_v1};

/// Size the fake output gives to layer surfaces leaving a dimension at 0
pub const OUTPUT_SIZE: (u32, u32) = (1920, 1080);

/// Serial of the ping sent to every client binding `xdg_wm_base`
pub const PING_SERIAL: u32 = 42;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionerState {
    pub size: (i32, i32),
    pub anchor_rect: (i32, i32, i32, i32),
    pub anchor: Option<xdg_positioner::Anchor>,
    pub gravity: Option<xdg_positioner::Gravity>,
    pub offset: (i32, i32),
    pub constraint_adjustment: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    SurfaceCreated,
    Commit,
    Pong(u32),
    LayerSurface { layer: Option<zwlr_layer_shell_v1::Layer>, namespace: String },
    LayerKeyboardInteractivity(Option<zwlr_layer_surface_v1::KeyboardInteractivity>),
    LayerSize(u32, u32),
    LayerAnchor(Option<zwlr_layer_surface_v1::Anchor>),
    ExclusiveZone(i32),
    LayerGetPopup,
    LayerDestroyed,
    XdgSurface,
    XdgSurfaceDestroyed,
    WindowGeometry(i32, i32, i32, i32),
    Toplevel,
    ToplevelTitle(String),
    ToplevelAppId(String),
    ToplevelDestroyed,
    Popup { with_parent: bool, positioner: PositionerState },
    PopupDestroyed,
}

/// Which globals the fake compositor advertises
#[derive(Debug, Clone, Copy)]
pub struct Globals {
    pub compositor: bool,
    pub layer_shell: bool,
    pub xdg_wm_base: bool,
}

impl Globals {
    pub fn all() -> Globals {
        Globals { compositor: true, layer_shell: true, xdg_wm_base: true }
    }

    pub fn without_layer_shell() -> Globals {
        Globals { layer_shell: false, ..Globals::all() }
    }

    pub fn without_xdg_shell() -> Globals {
        Globals { xdg_wm_base: false, ..Globals::all() }
    }
}

/// Something the test asks the compositor to do
#[derive(Debug, Clone, Copy)]
pub enum Command {
    DismissPopups,
    CloseLayerSurfaces,
}

pub struct LayerData {
    surface: wl_surface::WlSurface,
    // requested size, and whether a configure is owed
    state: Mutex<((u32, u32), bool)>,
}

pub struct FakeCompositor {
    log: Arc<Mutex<Vec<Recorded>>>,
    serial: u32,
    layer_surfaces: Vec<zwlr_layer_surface_v1::ZwlrLayerSurfaceV1>,
    popups: Vec<xdg_popup::XdgPopup>,
}

impl FakeCompositor {
    pub fn new(log: Arc<Mutex<Vec<Recorded>>>) -> FakeCompositor {
        FakeCompositor { log, serial: 0, layer_surfaces: Vec::new(), popups: Vec::new() }
    }

    pub fn create_globals(dh: &DisplayHandle, globals: Globals) {
        if globals.compositor {
            dh.create_global::<Self, wl_compositor::WlCompositor, _>(4, ());
        }
        if globals.layer_shell {
            dh.create_global::<Self, zwlr_layer_shell_v1::ZwlrLayerShellV1, _>(4, ());
        }
        if globals.xdg_wm_base {
            dh.create_global::<Self, xdg_wm_base::XdgWmBase, _>(3, ());
        }
    }

    pub fn execute(&mut self, command: Command) {
        match command {
            Command::DismissPopups => {
                // topmost first
                for popup in self.popups.drain(..).rev() {
                    if popup.is_alive() {
                        popup.popup_done();
                    }
                }
            }
            Command::CloseLayerSurfaces => {
                for layer_surface in self.layer_surfaces.drain(..) {
                    if layer_surface.is_alive() {
                        layer_surface.closed();
                    }
                }
            }
        }
    }

    fn record(&self, event: Recorded) {
        self.log.lock().unwrap().push(event);
    }

    fn next_serial(&mut self) -> u32 {
        self.serial += 1;
        self.serial
    }

    fn configure_layer_surfaces(&mut self, surface: &wl_surface::WlSurface) {
        self.layer_surfaces.retain(|layer_surface| layer_surface.is_alive());
        let owed: Vec<_> = self
            .layer_surfaces
            .iter()
            .filter_map(|layer_surface| {
                let data = layer_surface.data::<LayerData>()?;
                if data.surface != *surface {
                    return None;
                }
                let mut state = data.state.lock().unwrap();
                let ((width, height), owed) = *state;
                state.1 = false;
                owed.then(|| {
                    let width = if width == 0 { OUTPUT_SIZE.0 } else { width };
                    let height = if height == 0 { OUTPUT_SIZE.1 } else { height };
                    (layer_surface.clone(), width, height)
                })
            })
            .collect();
        for (layer_surface, width, height) in owed {
            let serial = self.next_serial();
            layer_surface.configure(serial, width, height);
        }
    }
}

impl GlobalDispatch<wl_compositor::WlCompositor, ()> for FakeCompositor {
    fn bind(
        _: &mut Self,
        _: &DisplayHandle,
        _: &Client,
        resource: New<wl_compositor::WlCompositor>,
        _: &(),
        data_init: &mut DataInit<'_, Self>,
    ) {
        data_init.init(resource, ());
    }
}

impl Dispatch<wl_compositor::WlCompositor, ()> for FakeCompositor {
    fn request(
        state: &mut Self,
        _: &Client,
        _: &wl_compositor::WlCompositor,
        request: wl_compositor::Request,
        _: &(),
        _: &DisplayHandle,
        data_init: &mut DataInit<'_, Self>,
    ) {
        match request {
            wl_compositor::Request::CreateSurface { id } => {
                data_init.init(id, ());
                state.record(Recorded::SurfaceCreated);
            }
            wl_compositor::Request::CreateRegion { id } => {
                data_init.init(id, ());
            }
            _ => {}
        }
    }
}

impl Dispatch<wl_surface::WlSurface, ()> for FakeCompositor {
    fn request(
        state: &mut Self,
        _: &Client,
        surface: &wl_surface::WlSurface,
        request: wl_surface::Request,
        _: &(),
        _: &DisplayHandle,
        _: &mut DataInit<'_, Self>,
    ) {
        if let wl_surface::Request::Commit = request {
            state.record(Recorded::Commit);
            state.configure_layer_surfaces(surface);
        }
    }
}

impl Dispatch<wl_region::WlRegion, ()> for FakeCompositor {
    fn request(
        _: &mut Self,
        _: &Client,
        _: &wl_region::WlRegion,
        _: wl_region::Request,
        _: &(),
        _: &DisplayHandle,
        _: &mut DataInit<'_, Self>,
    ) {
    }
}

impl GlobalDispatch<zwlr_layer_shell_v1::ZwlrLayerShellV1, ()> for FakeCompositor {
    fn bind(
        _: &mut Self,
        _: &DisplayHandle,
        _: &Client,
        resource: New<zwlr_layer_shell_v1::ZwlrLayerShellV1>,
        _: &(),
        data_init: &mut DataInit<'_, Self>,
    ) {
        data_init.init(resource, ());
    }
}

impl Dispatch<zwlr_layer_shell_v1::ZwlrLayerShellV1, ()> for FakeCompositor {
    fn request(
        state: &mut Self,
        _: &Client,
        _: &zwlr_layer_shell_v1::ZwlrLayerShellV1,
        request: zwlr_layer_shell_v1::Request,
        _: &(),
        _: &DisplayHandle,
        data_init: &mut DataInit<'_, Self>,
    ) {
        if let zwlr_layer_shell_v1::Request::GetLayerSurface { id, surface, layer, namespace, .. } =
            request
        {
            let layer_surface =
                data_init.init(id, LayerData { surface, state: Mutex::new(((0, 0), true)) });
            state.layer_surfaces.push(layer_surface);
            state.record(Recorded::LayerSurface { layer: layer.into_result().ok(), namespace });
        }
    }
}

impl Dispatch<zwlr_layer_surface_v1::ZwlrLayerSurfaceV1, LayerData> for FakeCompositor {
    fn request(
        state: &mut Self,
        _: &Client,
        _: &zwlr_layer_surface_v1::ZwlrLayerSurfaceV1,
        request: zwlr_layer_surface_v1::Request,
        data: &LayerData,
        _: &DisplayHandle,
        _: &mut DataInit<'_, Self>,
    ) {
        match request {
            zwlr_layer_surface_v1::Request::SetSize { width, height } => {
                *data.state.lock().unwrap() = ((width, height), true);
                state.record(Recorded::LayerSize(width, height));
            }
            zwlr_layer_surface_v1::Request::SetAnchor { anchor } => {
                state.record(Recorded::LayerAnchor(anchor.into_result().ok()));
            }
            zwlr_layer_surface_v1::Request::SetExclusiveZone { zone } => {
                state.record(Recorded::ExclusiveZone(zone));
            }
            zwlr_layer_surface_v1::Request::SetKeyboardInteractivity { keyboard_interactivity } => {
                state.record(Recorded::LayerKeyboardInteractivity(
                    keyboard_interactivity.into_result().ok(),
                ));
            }
            zwlr_layer_surface_v1::Request::GetPopup { .. } => {
                state.record(Recorded::LayerGetPopup);
            }
            zwlr_layer_surface_v1::Request::Destroy => {
                state.record(Recorded::LayerDestroyed);
            }
            _ => {}
        }
    }
}

impl GlobalDispatch<xdg_wm_base::XdgWmBase, ()> for FakeCompositor {
    fn bind(
        _: &mut Self,
        _: &DisplayHandle,
        _: &Client,
        resource: New<xdg_wm_base::XdgWmBase>,
        _: &(),
        data_init: &mut DataInit<'_, Self>,
    ) {
        let wm_base = data_init.init(resource, ());
        wm_base.ping(PING_SERIAL);
    }
}

impl Dispatch<xdg_wm_base::XdgWmBase, ()> for FakeCompositor {
    fn request(
        state: &mut Self,
        _: &Client,
        _: &xdg_wm_base::XdgWmBase,
        request: xdg_wm_base::Request,
        _: &(),
        _: &DisplayHandle,
        data_init: &mut DataInit<'_, Self>,
    ) {
        match request {
            xdg_wm_base::Request::CreatePositioner { id } => {
                data_init.init(id, Mutex::new(PositionerState::default()));
            }
            xdg_wm_base::Request::GetXdgSurface { id, surface } => {
                data_init.init(id, surface);
                state.record(Recorded::XdgSurface);
            }
            xdg_wm_base::Request::Pong { serial } => {
                state.record(Recorded::Pong(serial));
            }
            _ => {}
        }
    }
}

impl Dispatch<xdg_positioner::XdgPositioner, Mutex<PositionerState>> for FakeCompositor {
    fn request(
        _: &mut Self,
        _: &Client,
        _: &xdg_positioner::XdgPositioner,
        request: xdg_positioner::Request,
        data: &Mutex<PositionerState>,
        _: &DisplayHandle,
        _: &mut DataInit<'_, Self>,
    ) {
        let mut positioner = data.lock().unwrap();
        match request {
            xdg_positioner::Request::SetSize { width, height } => {
                positioner.size = (width, height);
            }
            xdg_positioner::Request::SetAnchorRect { x, y, width, height } => {
                positioner.anchor_rect = (x, y, width, height);
            }
            xdg_positioner::Request::SetAnchor { anchor } => {
                positioner.anchor = anchor.into_result().ok();
            }
            xdg_positioner::Request::SetGravity { gravity } => {
                positioner.gravity = gravity.into_result().ok();
            }
            xdg_positioner::Request::SetOffset { x, y } => {
                positioner.offset = (x, y);
            }
            xdg_positioner::Request::SetConstraintAdjustment { constraint_adjustment } => {
                positioner.constraint_adjustment = constraint_adjustment;
            }
            _ => {}
        }
    }
}

impl Dispatch<xdg_surface::XdgSurface, wl_surface::WlSurface> for FakeCompositor {
    fn request(
        state: &mut Self,
        _: &Client,
        xdg_surface: &xdg_surface::XdgSurface,
        request: xdg_surface::Request,
        _: &wl_surface::WlSurface,
        _: &DisplayHandle,
        data_init: &mut DataInit<'_, Self>,
    ) {
        match request {
            xdg_surface::Request::GetToplevel { id } => {
                let toplevel = data_init.init(id, ());
                state.record(Recorded::Toplevel);
                toplevel.configure(0, 0, Vec::new());
                let serial = state.next_serial();
                xdg_surface.configure(serial);
            }
            xdg_surface::Request::GetPopup { id, parent, positioner } => {
                let positioner = positioner
                    .data::<Mutex<PositionerState>>()
                    .map(|data| *data.lock().unwrap())
                    .unwrap_or_default();
                let popup = data_init.init(id, ());
                state.record(Recorded::Popup { with_parent: parent.is_some(), positioner });
                popup.configure(0, 0, positioner.size.0, positioner.size.1);
                let serial = state.next_serial();
                xdg_surface.configure(serial);
                state.popups.push(popup);
            }
            xdg_surface::Request::SetWindowGeometry { x, y, width, height } => {
                state.record(Recorded::WindowGeometry(x, y, width, height));
            }
            xdg_surface::Request::Destroy => {
                state.record(Recorded::XdgSurfaceDestroyed);
            }
            _ => {}
        }
    }
}

impl Dispatch<xdg_toplevel::XdgToplevel, ()> for FakeCompositor {
    fn request(
        state: &mut Self,
        _: &Client,
        _: &xdg_toplevel::XdgToplevel,
        request: xdg_toplevel::Request,
        _: &(),
        _: &DisplayHandle,
        _: &mut DataInit<'_, Self>,
    ) {
        match request {
            xdg_toplevel::Request::SetTitle { title } => state.record(Recorded::ToplevelTitle(title)),
            xdg_toplevel::Request::SetAppId { app_id } => {
                state.record(Recorded::ToplevelAppId(app_id))
            }
            xdg_toplevel::Request::Destroy => state.record(Recorded::ToplevelDestroyed),
            _ => {}
        }
    }
}

impl Dispatch<xdg_popup::XdgPopup, ()> for FakeCompositor {
    fn request(
        state: &mut Self,
        _: &Client,
        _: &xdg_popup::XdgPopup,
        request: xdg_popup::Request,
        _: &(),
        _: &DisplayHandle,
        _: &mut DataInit<'_, Self>,
    ) {
        if let xdg_popup::Request::Destroy = request {
            state.record(Recorded::PopupDestroyed);
        }
    }
}
