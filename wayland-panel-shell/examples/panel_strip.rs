//! Dock a coloured strip to a screen edge
//!
//! Usage: `cargo run --example panel_strip -- [top|right|bottom|left]`
//!
//! The strip reserves its thickness as an exclusive zone and exits when the
//! compositor closes it.

use std::{error::Error, fs::File, os::unix::io::AsFd};

use wayland_client::{
    delegate_dispatch, delegate_noop,
    protocol::{wl_buffer, wl_registry, wl_shm, wl_shm_pool, wl_surface},
    QueueHandle,
};
use wayland_panel_shell::{
    registry::GlobalList, HostToolkit, PanelShell, Point, Rectangle, ScreenEdge, ShellConfig,
    Size, WaylandBackend, WidgetId, WindowId, WindowKind,
};

const PANEL: WindowId = WindowId(1);
const PANEL_ROOT: WidgetId = WidgetId(1);
const THICKNESS: i32 = 32;
const LENGTH: i32 = 800;

struct StripHost {
    edge: ScreenEdge,
    surface: Option<wl_surface::WlSurface>,
    size: Size,
    needs_redraw: bool,
    running: bool,
}

impl HostToolkit for StripHost {
    fn native_surface(&self, window: WindowId) -> Option<wl_surface::WlSurface> {
        (window == PANEL).then(|| self.surface.clone()).flatten()
    }

    fn window_size(&self, _: WindowId) -> Size {
        self.size
    }

    fn child_allocations(&self, _: WindowId) -> Vec<Rectangle> {
        Vec::new()
    }

    fn widget_window(&self, widget: WidgetId) -> Option<WindowId> {
        (widget == PANEL_ROOT).then_some(PANEL)
    }

    fn root_widget(&self, window: WindowId) -> Option<WidgetId> {
        (window == PANEL).then_some(PANEL_ROOT)
    }

    fn widget_allocation(&self, widget: WidgetId) -> Option<Rectangle> {
        (widget == PANEL_ROOT).then_some(Rectangle::from_size(self.size))
    }

    fn pointer_position(&self, _: WindowId) -> Option<Point> {
        None
    }

    fn panel_edge(&self, window: WindowId) -> Option<ScreenEdge> {
        (window == PANEL).then_some(self.edge)
    }

    fn resize_window(&mut self, _: WindowId, size: Size) {
        self.size = size;
        self.needs_redraw = true;
    }

    fn surface_dismissed(&mut self, _: WindowId) {
        self.running = false;
    }
}

#[derive(Default)]
struct Buffers {
    globals: GlobalList,
}

impl AsMut<GlobalList> for Buffers {
    fn as_mut(&mut self) -> &mut GlobalList {
        &mut self.globals
    }
}

delegate_dispatch!(Buffers: [wl_registry::WlRegistry: ()] => GlobalList);
delegate_noop!(Buffers: ignore wl_shm::WlShm);
delegate_noop!(Buffers: wl_shm_pool::WlShmPool);
delegate_noop!(Buffers: ignore wl_buffer::WlBuffer);

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let edge = match std::env::args().nth(1).as_deref() {
        Some("top") => ScreenEdge::Top,
        Some("right") => ScreenEdge::Right,
        Some("left") => ScreenEdge::Left,
        _ => ScreenEdge::Bottom,
    };
    let size = match edge {
        ScreenEdge::Top | ScreenEdge::Bottom => Size::new(LENGTH, THICKNESS),
        ScreenEdge::Left | ScreenEdge::Right => Size::new(THICKNESS, LENGTH),
    };
    let host = StripHost { edge, surface: None, size, needs_redraw: true, running: true };

    let mut backend =
        WaylandBackend::connect(host, ShellConfig::default().with_namespace("panel-strip"))?;
    backend.initialize()?;
    let surface = backend.create_surface()?;
    backend.host_mut().surface = Some(surface.clone());

    let mut shell = PanelShell::new(backend);
    shell.on_window_realize(PANEL, WindowKind::PanelToplevel, |_| {});
    shell.set_strut(PANEL, edge, THICKNESS as u32, 0, 0);

    let conn = shell.backend().connection().clone();
    let mut queue = conn.new_event_queue::<Buffers>();
    let qh = queue.handle();
    let registry = conn.display().get_registry(&qh, ());
    let mut buffers = Buffers::default();
    queue.roundtrip(&mut buffers)?;
    let shm: wl_shm::WlShm = buffers.globals.bind(&qh, &registry, 1..=1, ())?;

    while shell.backend().host().running {
        let host = shell.backend_mut().host_mut();
        if host.needs_redraw {
            host.needs_redraw = false;
            let size = host.size;
            let buffer = create_buffer(&shm, &qh, size)?;
            surface.attach(Some(&buffer), 0, 0);
            surface.damage_buffer(0, 0, size.width, size.height);
            surface.commit();
        }
        shell.backend_mut().blocking_dispatch()?;
        queue.dispatch_pending(&mut buffers)?;
    }

    Ok(())
}

fn create_buffer(
    shm: &wl_shm::WlShm,
    qh: &QueueHandle<Buffers>,
    size: Size,
) -> Result<wl_buffer::WlBuffer, Box<dyn Error>> {
    let mut file = tempfile::tempfile()?;
    draw(&mut file, size)?;
    let pool = shm.create_pool(file.as_fd(), size.width * size.height * 4, qh, ());
    let buffer = pool.create_buffer(
        0,
        size.width,
        size.height,
        size.width * 4,
        wl_shm::Format::Argb8888,
        qh,
        (),
    );
    pool.destroy();
    Ok(buffer)
}

fn draw(tmp: &mut File, size: Size) -> std::io::Result<()> {
    use std::io::Write;
    let mut buf = std::io::BufWriter::new(tmp);
    for y in 0..size.height {
        for x in 0..size.width {
            let shade = ((x + y) * 0x40 / (size.width + size.height).max(1)) as u32;
            let color = 0xFF00_0000u32 + ((0x20 + shade) << 16) + ((0x30 + shade) << 8) + 0x50;
            buf.write_all(&color.to_ne_bytes())?;
        }
    }
    buf.flush()
}
