//! Tracking and binding the compositor globals

use std::ops::RangeInclusive;

use wayland_client::{
    protocol::{wl_compositor, wl_registry},
    Connection, Dispatch, Proxy, QueueHandle,
};
use wayland_protocols::xdg::shell::client::xdg_wm_base;
use wayland_protocols_wlr::layer_shell::v1::client::zwlr_layer_shell_v1;

/// Description of an advertized global
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalDescription {
    /// identifier of this global
    pub name: u32,
    /// interface name
    pub interface: String,
    /// advertized version
    pub version: u32,
}

/// The list of globals advertized by the compositor
///
/// `GlobalList` is used as a [`Dispatch`] delegate for the `wl_registry`. The
/// state type must give access to it through [`AsMut`].
#[derive(Debug, Default)]
pub struct GlobalList {
    globals: Vec<GlobalDescription>,
}

impl<D> Dispatch<wl_registry::WlRegistry, (), D> for GlobalList
where
    D: Dispatch<wl_registry::WlRegistry, ()> + AsMut<GlobalList>,
{
    fn event(
        handle: &mut D,
        _: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<D>,
    ) {
        let me = handle.as_mut();
        match event {
            wl_registry::Event::Global { name, interface, version } => {
                log::debug!("global {} advertized: {} v{}", name, interface, version);
                me.globals.push(GlobalDescription { name, interface, version });
            }
            wl_registry::Event::GlobalRemove { name } => {
                me.globals.retain(|desc| desc.name != name);
            }
            _ => {}
        }
    }
}

impl AsMut<GlobalList> for GlobalList {
    fn as_mut(&mut self) -> &mut GlobalList {
        self
    }
}

impl GlobalList {
    /// Create an empty `GlobalList`
    pub fn new() -> Self {
        Self { globals: Vec::new() }
    }

    /// Access the list of currently advertized globals
    pub fn list(&self) -> &[GlobalDescription] {
        &self.globals
    }

    /// Bind a global
    ///
    /// The bound version is the lowest of the advertized version, the end of
    /// the requested range and the highest version the bindings know.
    pub fn bind<I, U, D>(
        &self,
        qh: &QueueHandle<D>,
        registry: &wl_registry::WlRegistry,
        version: RangeInclusive<u32>,
        user_data: U,
    ) -> Result<I, BindError>
    where
        I: Proxy + 'static,
        U: Send + Sync + 'static,
        D: Dispatch<I, U> + 'static,
    {
        let interface = I::interface();
        let desc = self
            .globals
            .iter()
            .find(|desc| desc.interface == interface.name)
            .ok_or(BindError::MissingGlobal { interface: interface.name })?;

        if desc.version < *version.start() {
            return Err(BindError::WrongVersion {
                interface: interface.name,
                requested: version,
                got: desc.version,
            });
        }

        let bound = desc.version.min(*version.end()).min(interface.version);
        Ok(registry.bind::<I, U, D>(desc.name, bound, qh, user_data))
    }
}

/// An error that occurred trying to bind a global
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// The global was not advertized
    #[error("requested global was not advertized by the server: {interface}")]
    MissingGlobal {
        /// name of the missing interface
        interface: &'static str,
    },
    /// The advertized version is too old
    #[error("global {interface} has version {got}, which is outside of the requested range ({requested:?})")]
    WrongVersion {
        /// name of the interface
        interface: &'static str,
        /// the requested versions
        requested: RangeInclusive<u32>,
        /// the advertized version
        got: u32,
    },
}

/// The protocol globals the shell backend works with
///
/// Every handle is optional: a compositor without layer-shell still supports
/// popups, and one without xdg-shell still lets panels dock. Operations that
/// need a missing global log a warning and give up.
#[derive(Debug, Clone, Default)]
pub struct ProtocolCapabilities {
    /// `wl_compositor`, to create native surfaces
    pub compositor: Option<wl_compositor::WlCompositor>,
    /// `zwlr_layer_shell_v1`, to dock panels
    pub layer_shell: Option<zwlr_layer_shell_v1::ZwlrLayerShellV1>,
    /// `xdg_wm_base`, for popups, tooltips and fallback toplevels
    pub xdg_wm_base: Option<xdg_wm_base::XdgWmBase>,
}

impl ProtocolCapabilities {
    /// Bind every global the backend knows about from a populated list
    pub fn bind<D>(globals: &GlobalList, qh: &QueueHandle<D>, registry: &wl_registry::WlRegistry) -> Self
    where
        D: Dispatch<wl_compositor::WlCompositor, ()>
            + Dispatch<zwlr_layer_shell_v1::ZwlrLayerShellV1, ()>
            + Dispatch<xdg_wm_base::XdgWmBase, ()>
            + 'static,
    {
        ProtocolCapabilities {
            compositor: optional(globals.bind(qh, registry, 1..=4, ())),
            layer_shell: optional(globals.bind(qh, registry, 1..=4, ())),
            xdg_wm_base: optional(globals.bind(qh, registry, 1..=3, ())),
        }
    }
}

fn optional<I>(bound: Result<I, BindError>) -> Option<I> {
    match bound {
        Ok(proxy) => Some(proxy),
        Err(err) => {
            log::debug!("{}", err);
            None
        }
    }
}
