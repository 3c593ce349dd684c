//! # Render Error Types

use thiserror::Error;

/// Errors raised by the GPU side.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No adapter can present to the window.
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    /// The window surface could not be created.
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    /// The adapter refused the device request.
    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    /// A frame was rejected before upload; the previous texture stays in use.
    #[error("frame upload rejected: {0}")]
    UploadRejected(String),

    /// The surface was lost or outdated and has been reconfigured; skip this frame.
    #[error("surface reconfigured, frame skipped")]
    SurfaceReconfigured,

    /// Any other surface acquisition failure.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;
