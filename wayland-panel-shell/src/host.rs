//! The boundary with the host GUI toolkit
//!
//! The backend never owns toolkit objects. Windows and widgets are referred to
//! by opaque ids, and everything the backend needs to know about them is
//! queried through the [`HostToolkit`] trait.

use std::fmt;

use wayland_client::protocol::wl_surface::WlSurface;

use crate::geometry::{Point, Rectangle, ScreenEdge, Size};

/// Identifier of a toolkit window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Identifier of a toolkit widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub u64);

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "widget#{}", self.0)
    }
}

/// What a shell surface is positioned relative to
///
/// This is an id pair, not an owning reference: the window it names may be
/// gone by the time it is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transient {
    /// widget the popup is attached to
    pub widget: WidgetId,
    /// window containing that widget
    pub window: WindowId,
}

/// The widget that asked for a tooltip
///
/// Returned by the tooltip query hook and handed back when the tooltip window
/// is shown, so the tooltip can be attached to the widget it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooltipOrigin {
    /// the widget under the pointer
    pub widget: WidgetId,
    /// pointer position inside the widget when the tooltip was queried
    pub position: Point,
}

/// How a window being realized relates to the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// a panel strip docked to a screen edge
    PanelToplevel,
    /// a menu or other popup attached to a widget
    Popup {
        /// the attach widget
        attach: WidgetId,
    },
    /// a tooltip window
    Tooltip(TooltipOrigin),
    /// any other window, left to the toolkit
    Plain,
}

/// Queries and notifications the backend needs from the host toolkit
pub trait HostToolkit {
    /// The native Wayland surface backing a realized window
    fn native_surface(&self, window: WindowId) -> Option<WlSurface>;

    /// Current allocated size of a window's surface
    fn window_size(&self, window: WindowId) -> Size;

    /// Allocations of the direct children of a window, in window coordinates
    fn child_allocations(&self, window: WindowId) -> Vec<Rectangle>;

    /// The window containing a widget
    fn widget_window(&self, widget: WidgetId) -> Option<WindowId>;

    /// The widget filling a whole window
    fn root_widget(&self, window: WindowId) -> Option<WidgetId>;

    /// Allocation of a widget in the coordinates of its window
    fn widget_allocation(&self, widget: WidgetId) -> Option<Rectangle>;

    /// Pointer position relative to a window
    fn pointer_position(&self, window: WindowId) -> Option<Point>;

    /// Screen edge a panel window is docked to, `None` for non-panel windows
    fn panel_edge(&self, window: WindowId) -> Option<ScreenEdge>;

    /// The compositor chose a size for a window
    fn resize_window(&mut self, _window: WindowId, _size: Size) {}

    /// The compositor dismissed a window's surface (popup done or layer closed)
    fn surface_dismissed(&mut self, _window: WindowId) {}
}
