//! # Frame Texture
//!
//! GPU side of the frame bridge. Once per display refresh the render thread
//! calls [`FrameTexture::sync`]:
//!
//! ```text
//!   bridge.take_pending() ── None ───────────────► Unchanged (reuse texture)
//!            │
//!          Some(frame) ── validate ── Err ──► log, Failed (reuse texture)
//!                            │
//!                            Ok ── resize texture if needed ── write_texture ──► Uploaded
//! ```
//!
//! The watchdog is fed from here, so a camera that stops delivering is
//! reported even though the last image stays on screen.

use std::time::Instant;

use mirrorplay_core::{Frame, FrameBridge, FrameWatchdog, PixelFormat};
use mirrorplay_shared::Rotation;

use crate::error::{RenderError, RenderResult};

/// What a [`FrameTexture::sync`] call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No new frame; the previous content is reused.
    Unchanged,
    /// A new frame was uploaded.
    Uploaded {
        /// The texture was recreated; bind groups must be rebuilt.
        resized: bool,
    },
    /// A new frame was rejected; the previous content is reused.
    Failed,
}

/// Camera texture kept in sync with a [`FrameBridge`].
pub struct FrameTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: (u32, u32),
    rotation: Rotation,
    generation: u64,
    watchdog: FrameWatchdog,
}

impl FrameTexture {
    /// Creates a 1x1 black placeholder so there is always something to sample.
    #[must_use]
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, watchdog: FrameWatchdog) -> Self {
        let texture = create_texture(device, 1, 1);
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &[0, 0, 0, 255],
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            size: (1, 1),
            rotation: Rotation::Deg0,
            generation: 0,
            watchdog,
        }
    }

    /// Pulls the newest bridged frame, if any, and uploads it.
    ///
    /// Upload failures are logged and swallowed; the last good frame stays
    /// bound.
    pub fn sync(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bridge: &FrameBridge,
        now: Instant,
    ) -> SyncOutcome {
        let Some(frame) = bridge.take_pending() else {
            self.watchdog.check(now);
            return SyncOutcome::Unchanged;
        };
        self.watchdog.record_frame(now);

        match self.upload(device, queue, &frame) {
            Ok(resized) => SyncOutcome::Uploaded { resized },
            Err(e) => {
                tracing::error!("Camera frame upload failed, keeping previous frame: {}", e);
                SyncOutcome::Failed
            }
        }
    }

    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, frame: &Frame) -> RenderResult<bool> {
        let max = device.limits().max_texture_dimension_2d;
        if frame.width() > max || frame.height() > max {
            return Err(RenderError::UploadRejected(format!(
                "{}x{} exceeds max texture dimension {}",
                frame.width(),
                frame.height(),
                max
            )));
        }

        let rgba;
        let frame = match frame.format() {
            PixelFormat::Rgba8 => frame,
            PixelFormat::Rgb8 => {
                rgba = frame.to_rgba8();
                &rgba
            }
        };

        let size = (frame.width(), frame.height());
        let resized = size != self.size;
        if resized {
            tracing::info!("Camera texture resized to {}x{}", size.0, size.1);
            self.texture = create_texture(device, size.0, size.1);
            self.view = self.texture.create_view(&wgpu::TextureViewDescriptor::default());
            self.size = size;
            self.generation += 1;
        }
        self.rotation = frame.rotation();

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            frame.data(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(size.0 * 4),
                rows_per_image: Some(size.1),
            },
            wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
        );
        Ok(resized)
    }

    /// View of the current content.
    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Texture size in pixels.
    #[must_use]
    pub const fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Sensor rotation of the last uploaded frame.
    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Bumped whenever the underlying texture is recreated.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Liveness watchdog fed by [`sync`](Self::sync).
    #[must_use]
    pub fn watchdog(&self) -> &FrameWatchdog {
        &self.watchdog
    }
}

fn create_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("camera-frame"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}
