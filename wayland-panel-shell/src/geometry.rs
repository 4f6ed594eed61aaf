//! Geometry value types shared by the placement policy and the positioner

use wayland_protocols::xdg::shell::client::xdg_positioner;
use wayland_protocols_wlr::layer_shell::v1::client::{zwlr_layer_shell_v1, zwlr_layer_surface_v1};

/// A point in surface-local logical coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    /// horizontal coordinate
    pub x: i32,
    /// vertical coordinate
    pub y: i32,
}

impl Point {
    /// Create a new point
    pub const fn new(x: i32, y: i32) -> Point {
        Point { x, y }
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point { x: self.x + other.x, y: self.y + other.y }
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point { x: self.x - other.x, y: self.y - other.y }
    }
}

/// A size in logical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    /// width
    pub width: i32,
    /// height
    pub height: i32,
}

impl Size {
    /// Create a new size
    pub const fn new(width: i32, height: i32) -> Size {
        Size { width, height }
    }

    /// Whether this size has no area
    ///
    /// The compositor uses zero dimensions to leave the choice to the client.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// A rectangle in logical coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rectangle {
    /// top-left corner
    pub origin: Point,
    /// extent
    pub size: Size,
}

impl Rectangle {
    /// Create a rectangle from its coordinates and extent
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Rectangle {
        Rectangle { origin: Point::new(x, y), size: Size::new(width, height) }
    }

    /// A rectangle at the origin covering `size`
    pub const fn from_size(size: Size) -> Rectangle {
        Rectangle { origin: Point::new(0, 0), size }
    }
}

/// Position of one axis of a popup relative to its attachment point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attach {
    /// the popup's leading edge (left or top) touches the anchor point
    Start,
    /// the popup is centered on the anchor point
    Center,
    /// the popup's trailing edge (right or bottom) touches the anchor point
    End,
}

impl Attach {
    /// The fractional position along the popup of the attachment point
    pub fn fraction(self) -> f64 {
        match self {
            Attach::Start => 0.0,
            Attach::Center => 0.5,
            Attach::End => 1.0,
        }
    }

    /// Scale `length` by this attachment's fraction, in integer arithmetic
    pub fn scale(self, length: i32) -> i32 {
        match self {
            Attach::Start => 0,
            Attach::Center => length / 2,
            Attach::End => length,
        }
    }
}

/// One of the nine anchor/gravity positions of an `xdg_positioner`
///
/// As an anchor it designates a point on the anchor rectangle, as a gravity it
/// designates the direction the popup extends in from that point.
/// [`Corner::None`] is the center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    /// center
    None,
    /// middle of the top edge
    Top,
    /// middle of the bottom edge
    Bottom,
    /// middle of the left edge
    Left,
    /// middle of the right edge
    Right,
    /// top-left corner
    TopLeft,
    /// bottom-left corner
    BottomLeft,
    /// top-right corner
    TopRight,
    /// bottom-right corner
    BottomRight,
}

impl Corner {
    /// All nine positions
    pub const ALL: [Corner; 9] = [
        Corner::None,
        Corner::Top,
        Corner::Bottom,
        Corner::Left,
        Corner::Right,
        Corner::TopLeft,
        Corner::BottomLeft,
        Corner::TopRight,
        Corner::BottomRight,
    ];

    /// The position mirrored through the center on both axes
    pub fn opposite(self) -> Corner {
        match self {
            Corner::None => Corner::None,
            Corner::Top => Corner::Bottom,
            Corner::Bottom => Corner::Top,
            Corner::Left => Corner::Right,
            Corner::Right => Corner::Left,
            Corner::TopLeft => Corner::BottomRight,
            Corner::BottomLeft => Corner::TopRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    /// Where the popup attaches on each axis when this is used as a gravity
    ///
    /// Gravity pointing toward an edge means the opposite edge of the popup
    /// touches the anchor point: gravity `BottomRight` attaches the popup by
    /// its top-left corner.
    pub fn popup_attach(self) -> (Attach, Attach) {
        let x = match self {
            Corner::Left | Corner::TopLeft | Corner::BottomLeft => Attach::End,
            Corner::Right | Corner::TopRight | Corner::BottomRight => Attach::Start,
            Corner::None | Corner::Top | Corner::Bottom => Attach::Center,
        };
        let y = match self {
            Corner::Top | Corner::TopLeft | Corner::TopRight => Attach::End,
            Corner::Bottom | Corner::BottomLeft | Corner::BottomRight => Attach::Start,
            Corner::None | Corner::Left | Corner::Right => Attach::Center,
        };
        (x, y)
    }

    /// [`Corner::popup_attach`] as fractions of the popup size
    pub fn popup_anchor_fraction(self) -> (f64, f64) {
        let (x, y) = self.popup_attach();
        (x.fraction(), y.fraction())
    }

    /// The corresponding `xdg_positioner` anchor
    pub fn anchor(self) -> xdg_positioner::Anchor {
        use xdg_positioner::Anchor;
        match self {
            Corner::None => Anchor::None,
            Corner::Top => Anchor::Top,
            Corner::Bottom => Anchor::Bottom,
            Corner::Left => Anchor::Left,
            Corner::Right => Anchor::Right,
            Corner::TopLeft => Anchor::TopLeft,
            Corner::BottomLeft => Anchor::BottomLeft,
            Corner::TopRight => Anchor::TopRight,
            Corner::BottomRight => Anchor::BottomRight,
        }
    }

    /// The corresponding `xdg_positioner` gravity
    pub fn gravity(self) -> xdg_positioner::Gravity {
        use xdg_positioner::Gravity;
        match self {
            Corner::None => Gravity::None,
            Corner::Top => Gravity::Top,
            Corner::Bottom => Gravity::Bottom,
            Corner::Left => Gravity::Left,
            Corner::Right => Gravity::Right,
            Corner::TopLeft => Gravity::TopLeft,
            Corner::BottomLeft => Gravity::BottomLeft,
            Corner::TopRight => Gravity::TopRight,
            Corner::BottomRight => Gravity::BottomRight,
        }
    }
}

/// The screen edge a panel is docked to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenEdge {
    /// top of the output
    Top,
    /// right side of the output
    Right,
    /// bottom of the output
    Bottom,
    /// left side of the output
    Left,
}

impl ScreenEdge {
    /// The layer-surface anchor docking a surface to this edge
    pub fn layer_anchor(self) -> zwlr_layer_surface_v1::Anchor {
        use zwlr_layer_surface_v1::Anchor;
        match self {
            ScreenEdge::Top => Anchor::Top,
            ScreenEdge::Right => Anchor::Right,
            ScreenEdge::Bottom => Anchor::Bottom,
            ScreenEdge::Left => Anchor::Left,
        }
    }
}

/// The layer-shell stacking layer a panel surface lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackingLayer {
    /// above normal windows, the usual place for a docked panel strip
    Top,
    /// below normal windows, for floating surfaces that only host popups
    Bottom,
}

impl From<StackingLayer> for zwlr_layer_shell_v1::Layer {
    fn from(layer: StackingLayer) -> Self {
        match layer {
            StackingLayer::Top => zwlr_layer_shell_v1::Layer::Top,
            StackingLayer::Bottom => zwlr_layer_shell_v1::Layer::Bottom,
        }
    }
}
