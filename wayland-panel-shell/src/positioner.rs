//! Popup positioning
//!
//! Toolkits draw shadows and borders inside the popup's surface, so only a
//! sub-rectangle of it is what the user perceives as the popup. The functions
//! in this module derive the `xdg_positioner` parameters that make the
//! *visible* part of the popup land on the requested anchor point.

use wayland_protocols::xdg::shell::client::xdg_positioner::{self, ConstraintAdjustment};

use crate::geometry::{Corner, Point, Rectangle, Size};

/// Parameters of an `xdg_positioner`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionerParams {
    /// size of the popup surface
    pub size: Size,
    /// anchor rectangle, relative to the parent surface
    pub anchor_rect: Rectangle,
    /// point of the anchor rectangle the popup is attached to
    pub anchor: Corner,
    /// direction the popup extends from the anchor point
    pub gravity: Corner,
    /// displacement of the popup from its computed position
    pub offset: Point,
    /// how the compositor may adjust the popup if it would be constrained
    pub constraint_adjustment: ConstraintAdjustment,
}

impl PositionerParams {
    /// Issue the requests describing these parameters on a positioner
    pub fn apply(&self, positioner: &xdg_positioner::XdgPositioner) {
        positioner.set_size(self.size.width, self.size.height);
        positioner.set_anchor_rect(
            self.anchor_rect.origin.x,
            self.anchor_rect.origin.y,
            self.anchor_rect.size.width,
            self.anchor_rect.size.height,
        );
        positioner.set_anchor(self.anchor.anchor());
        positioner.set_gravity(self.gravity.gravity());
        positioner.set_offset(self.offset.x, self.offset.y);
        positioner.set_constraint_adjustment(self.constraint_adjustment.bits());
    }
}

/// The visually meaningful part of a popup surface
///
/// If the popup window has exactly one child, its allocation is the content
/// and everything around it is decoration. Otherwise the whole surface counts.
pub fn logical_rect(children: &[Rectangle], surface_size: Size) -> Rectangle {
    match children {
        [child] => *child,
        _ => Rectangle::from_size(surface_size),
    }
}

/// Compute the positioner parameters for a popup
///
/// `anchor_rect` is the rectangle of the widget the popup is attached to, in
/// the coordinate space of that widget's window. `popup_logical_rect` is the
/// content of the popup inside its `popup_surface_size` surface.
pub fn compute_positioner(
    anchor_rect: Rectangle,
    popup_logical_rect: Rectangle,
    popup_surface_size: Size,
    anchor: Corner,
    gravity: Corner,
    extra_offset: Point,
) -> PositionerParams {
    let (attach_x, attach_y) = gravity.popup_attach();
    let margin_x = popup_surface_size.width - popup_logical_rect.size.width;
    let margin_y = popup_surface_size.height - popup_logical_rect.size.height;
    let offset = Point::new(attach_x.scale(margin_x), attach_y.scale(margin_y))
        - popup_logical_rect.origin
        + extra_offset;

    // compositors reject empty or negative anchor rectangles
    let anchor_rect = Rectangle::new(
        anchor_rect.origin.x.max(0),
        anchor_rect.origin.y.max(0),
        anchor_rect.size.width.max(1),
        anchor_rect.size.height.max(1),
    );

    PositionerParams {
        size: Size::new(popup_surface_size.width.max(1), popup_surface_size.height.max(1)),
        anchor_rect,
        anchor,
        gravity,
        offset,
        constraint_adjustment: ConstraintAdjustment::FlipX | ConstraintAdjustment::FlipY,
    }
}
