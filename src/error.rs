use thiserror::Error;

use crate::backend::BufferId;

/// Failures to acquire or use a rendering resource.
///
/// None of these are fatal once the loop is running: a failed draw drops that
/// part for the frame, a failed frame acquisition skips the frame.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("Failed to find a suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("Failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("Failed to acquire frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),
    #[error("Surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("Refusing to upload empty vertex buffer '{0}'")]
    EmptyUpload(String),
    #[error("Unknown vertex buffer {0:?}")]
    UnknownBuffer(BufferId),
    #[error("Draw range {first}..{end} exceeds buffer {buffer:?} of {len} vertices")]
    DrawRange {
        buffer: BufferId,
        first: u32,
        end: u32,
        len: u32,
    },
}

/// Failures that stop the application before or while its event loop runs.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
