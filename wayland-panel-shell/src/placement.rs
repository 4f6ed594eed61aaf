//! Where popups and tooltips open relative to the panel

use crate::geometry::{Corner, Point, ScreenEdge};

/// Everything the placement policy needs to know about a popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementContext {
    /// the popup is a tooltip
    pub is_tooltip: bool,
    /// the popup's parent is itself transient for another window (a submenu)
    pub nested: bool,
    /// edge of the screen the panel owning this popup chain is docked to
    pub panel_edge: ScreenEdge,
    /// the popup is attached to the panel window itself rather than one of its widgets
    pub attached_to_panel: bool,
    /// pointer position relative to the panel window, if known
    pub pointer: Option<Point>,
    /// gap between a widget and its tooltip
    pub tooltip_spacing: i32,
}

/// Anchor, gravity and extra offset chosen for a popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// point of the anchor rectangle the popup attaches to
    pub anchor: Corner,
    /// direction the popup opens in
    pub gravity: Corner,
    /// additional displacement
    pub offset: Point,
}

/// Decide how a popup is placed
///
/// Tooltips sit just outside the panel, on the side away from the screen edge.
/// Popups of popups cascade to the bottom-right like submenus. Other popups
/// open away from the screen edge the panel is docked to.
pub fn place(ctx: &PlacementContext) -> Placement {
    let gap = ctx.tooltip_spacing;

    if ctx.is_tooltip {
        let (side, offset) = match ctx.panel_edge {
            ScreenEdge::Top => (Corner::Bottom, Point::new(0, gap)),
            ScreenEdge::Right => (Corner::Left, Point::new(-gap, 0)),
            ScreenEdge::Bottom => (Corner::Top, Point::new(0, -gap)),
            ScreenEdge::Left => (Corner::Right, Point::new(gap, 0)),
        };
        return Placement { anchor: side, gravity: side, offset };
    }

    // heuristic: a popup whose parent is transient for something is a submenu
    if ctx.nested {
        return Placement {
            anchor: Corner::TopRight,
            gravity: Corner::BottomRight,
            offset: Point::default(),
        };
    }

    let (mut anchor, gravity) = match ctx.panel_edge {
        ScreenEdge::Top => (Corner::BottomLeft, Corner::BottomRight),
        ScreenEdge::Right => (Corner::TopLeft, Corner::BottomLeft),
        ScreenEdge::Bottom => (Corner::TopLeft, Corner::TopRight),
        ScreenEdge::Left => (Corner::TopRight, Corner::BottomRight),
    };
    let mut offset = Point::default();

    if ctx.attached_to_panel {
        // the anchor rectangle is the whole panel, follow the pointer instead
        anchor = Corner::TopLeft;
        if let Some(pointer) = ctx.pointer {
            offset = pointer;
        }
    }

    Placement { anchor, gravity, offset }
}
