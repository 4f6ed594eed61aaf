use wayland_client::{backend::WaylandError, ConnectError, DispatchError};

use crate::host::WindowId;
use crate::registry::BindError;

/// An error from a shell-surface operation
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// A protocol global required by the operation was never advertised
    #[error("the compositor does not advertise {0}")]
    MissingGlobal(&'static str),

    /// The protocol capabilities were already bound
    #[error("protocol capabilities are already initialized")]
    AlreadyInitialized,

    /// A window already has a shell surface
    #[error("{0} already has a shell surface")]
    AlreadyExists(WindowId),

    /// A window has no shell surface
    #[error("{0} has no shell surface")]
    UnknownWindow(WindowId),

    /// A popup operation on a surface that is not transient for any window
    #[error("{0} is not transient for any window")]
    NotTransient(WindowId),

    /// A layer-surface operation on a surface mapped with another role
    #[error("{0} is not mapped as a layer surface")]
    NotLayerSurface(WindowId),

    /// The toolkit has no native surface for a window
    #[error("{0} has no native wayland surface")]
    NoNativeSurface(WindowId),

    /// None of the windows a popup is transient for is mapped
    #[error("no ancestor of {0} holds a mapped shell role")]
    NoMappedAncestor(WindowId),

    /// The popup object could not be created
    #[error("the compositor did not create a popup for {0}")]
    PopupNotCreated(WindowId),

    /// A global could not be bound
    #[error(transparent)]
    Bind(#[from] BindError),

    /// Connecting to the compositor failed
    #[error("could not connect to the compositor: {0}")]
    Connect(#[from] ConnectError),

    /// Dispatching events failed, the connection is most likely dead
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Sending requests to the compositor failed
    #[error("the wayland connection failed: {0}")]
    Connection(#[from] WaylandError),
}

impl ShellError {
    /// Whether this error reveals a bug in the caller rather than a runtime condition
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            ShellError::AlreadyInitialized
                | ShellError::AlreadyExists(_)
                | ShellError::UnknownWindow(_)
                | ShellError::NotTransient(_)
                | ShellError::NotLayerSurface(_)
        )
    }
}
