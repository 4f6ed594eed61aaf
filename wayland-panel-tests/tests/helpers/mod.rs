// This module contains helpers functions and types that
// are not test in themselves, but are used by several tests.

#![allow(dead_code)]

pub extern crate wayland_client as wayc;
pub extern crate wayland_server as ways;

pub mod compositor;

use std::collections::HashMap;
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, sync_channel, Sender, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use wayland_panel_shell::{
    HostToolkit, Point, Rectangle, ScreenEdge, ShellConfig, Size, WaylandBackend, WidgetId,
    WindowId,
};

#[allow(unused_imports)]
pub use compositor::{Command, FakeCompositor, Globals, PositionerState, Recorded};

/// A fake compositor running in its own thread
///
/// The backend does blocking roundtrips, so the server cannot be driven from
/// the test thread.
pub struct TestServer {
    kill_switch: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    commands: Sender<(Command, SyncSender<()>)>,
    log: Arc<Mutex<Vec<Recorded>>>,
}

impl TestServer {
    pub fn start(globals: Globals) -> (TestServer, wayc::Connection) {
        let kill_switch = Arc::new(AtomicBool::new(false));
        let server_kill_switch = kill_switch.clone();
        let log = Arc::new(Mutex::new(Vec::new()));
        let server_log = log.clone();
        let (commands, command_rx) = channel::<(Command, SyncSender<()>)>();
        let (server_socket, client_socket) = UnixStream::pair().unwrap();

        let thread = ::std::thread::spawn(move || {
            let mut display = ways::Display::<FakeCompositor>::new().unwrap();
            FakeCompositor::create_globals(&display.handle(), globals);
            display.handle().insert_client(server_socket, Arc::new(DumbClientData)).unwrap();
            let mut compositor = FakeCompositor::new(server_log);

            loop {
                display.dispatch_clients(&mut compositor).unwrap();
                let mut done = Vec::new();
                while let Ok((command, ack)) = command_rx.try_recv() {
                    compositor.execute(command);
                    done.push(ack);
                }
                display.flush_clients().unwrap();
                for ack in done {
                    let _ = ack.send(());
                }
                if server_kill_switch.load(Ordering::Acquire) {
                    break;
                }
                ::std::thread::sleep(Duration::from_millis(1));
            }
        });

        let conn = wayc::Connection::from_socket(client_socket).expect("Failed to connect to server.");
        let server = TestServer { kill_switch, thread: Some(thread), commands, log };
        (server, conn)
    }

    /// Every request recorded so far
    pub fn recorded(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    /// The requests recorded since the last call
    pub fn take_recorded(&self) -> Vec<Recorded> {
        std::mem::take(&mut *self.log.lock().unwrap())
    }

    /// Send `popup_done` to every popup, and wait until it is on the wire
    pub fn dismiss_popups(&self) {
        self.execute(Command::DismissPopups);
    }

    /// Send `closed` to every layer surface, and wait until it is on the wire
    pub fn close_layer_surfaces(&self) {
        self.execute(Command::CloseLayerSurfaces);
    }

    fn execute(&self, command: Command) {
        let (ack, done) = sync_channel(1);
        self.commands.send((command, ack)).unwrap();
        done.recv().unwrap();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.kill_switch.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

pub struct DumbClientData;

impl ways::backend::ClientData for DumbClientData {
    fn initialized(&self, _: ways::backend::ClientId) {}
    fn disconnected(&self, _: ways::backend::ClientId, _: ways::backend::DisconnectReason) {}
}

#[derive(Debug, Clone, Default)]
pub struct FakeWindow {
    pub surface: Option<wayc::protocol::wl_surface::WlSurface>,
    pub size: Size,
    pub children: Vec<Rectangle>,
    pub root: Option<WidgetId>,
    pub edge: Option<ScreenEdge>,
}

#[derive(Debug, Clone, Copy)]
pub struct FakeWidget {
    pub window: WindowId,
    pub allocation: Rectangle,
}

/// A toolkit made of plain maps
#[derive(Debug, Default)]
pub struct TestHost {
    pub windows: HashMap<WindowId, FakeWindow>,
    pub widgets: HashMap<WidgetId, FakeWidget>,
    pub pointer: Option<Point>,
    pub resized: Vec<(WindowId, Size)>,
    pub dismissed: Vec<WindowId>,
}

impl TestHost {
    pub fn window_mut(&mut self, window: WindowId) -> &mut FakeWindow {
        self.windows.entry(window).or_default()
    }

    pub fn add_widget(&mut self, widget: WidgetId, window: WindowId, allocation: Rectangle) {
        self.widgets.insert(widget, FakeWidget { window, allocation });
    }
}

impl HostToolkit for TestHost {
    fn native_surface(&self, window: WindowId) -> Option<wayc::protocol::wl_surface::WlSurface> {
        self.windows.get(&window)?.surface.clone()
    }

    fn window_size(&self, window: WindowId) -> Size {
        self.windows.get(&window).map(|window| window.size).unwrap_or_default()
    }

    fn child_allocations(&self, window: WindowId) -> Vec<Rectangle> {
        self.windows.get(&window).map(|window| window.children.clone()).unwrap_or_default()
    }

    fn widget_window(&self, widget: WidgetId) -> Option<WindowId> {
        self.widgets.get(&widget).map(|widget| widget.window)
    }

    fn root_widget(&self, window: WindowId) -> Option<WidgetId> {
        self.windows.get(&window)?.root
    }

    fn widget_allocation(&self, widget: WidgetId) -> Option<Rectangle> {
        self.widgets.get(&widget).map(|widget| widget.allocation)
    }

    fn pointer_position(&self, _: WindowId) -> Option<Point> {
        self.pointer
    }

    fn panel_edge(&self, window: WindowId) -> Option<ScreenEdge> {
        self.windows.get(&window)?.edge
    }

    fn resize_window(&mut self, window: WindowId, size: Size) {
        self.resized.push((window, size));
    }

    fn surface_dismissed(&mut self, window: WindowId) {
        self.dismissed.push(window);
    }
}

pub type TestBackend = WaylandBackend<TestHost>;

/// Start a fake compositor and an initialized backend connected to it
pub fn start(globals: Globals) -> (TestServer, TestBackend) {
    let _ = env_logger::builder().is_test(true).try_init();
    let (server, conn) = TestServer::start(globals);
    let mut backend = WaylandBackend::new(conn, TestHost::default(), ShellConfig::default());
    backend.initialize().unwrap();
    (server, backend)
}

/// Give `window` a native surface of `size`
pub fn add_window(backend: &mut TestBackend, window: WindowId, size: Size) {
    let surface = backend.create_surface().unwrap();
    let fake = backend.host_mut().window_mut(window);
    fake.surface = Some(surface);
    fake.size = size;
    backend.roundtrip().unwrap();
}

/// Add a panel window docked to `edge` whose root widget is `root`
pub fn add_panel(
    backend: &mut TestBackend,
    window: WindowId,
    root: WidgetId,
    edge: ScreenEdge,
    size: Size,
) {
    add_window(backend, window, size);
    let host = backend.host_mut();
    let fake = host.window_mut(window);
    fake.root = Some(root);
    fake.edge = Some(edge);
    host.add_widget(root, window, Rectangle::from_size(size));
}
