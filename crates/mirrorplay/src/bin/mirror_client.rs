//! # MIRRORPLAY Desktop Client
//!
//! Window, mirror feed and game overlay on one screen.
//!
//! ```text
//!   capture thread ──on_frame──► FrameBridge ──sync──► FrameTexture ─┐
//!         │                                                          ├─► surface
//!         └──submit──► SegmentationWorker ──HitMask──► GameSession ──┘
//!                                                   (overlay batch)
//! ```
//!
//! ## Usage
//!
//! ```text
//! mirror_client [--plain] [--config <game.toml>] [--profile <profile.toml>] [--camera <index>]
//! ```
//!
//! `--plain` runs the mirror renderer alone, without game or segmentation.
//! Without the `camera` feature the feed is a synthetic test pattern.
//!
//! ## Controls
//!
//! - Left click / touch: catch a ball
//! - `R`: restart the stage
//! - `1` / `2` / `3`: full, left-mirrored, right-mirrored
//! - `S`: toggle the segmentation silhouette
//! - `Esc`: quit

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, MouseButton, Touch, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use mirrorplay::core::{Frame, FrameBridge, FrameWatchdog, PixelFormat, SharedTunables};
use mirrorplay::rendering::{
    FrameTexture, GpuContext, MirrorRenderer, OverlayBatch, OverlayRenderer, RenderError,
};
use mirrorplay::shared::constants::TICK_INTERVAL;
use mirrorplay::shared::{GameConfig, MirrorMode, Vec2};
use mirrorplay::vision::{BackgroundDiffSegmenter, SegmentationWorker};
use mirrorplay::{EventBus, EventReceiver, GameSession, TomlProfileStore, UiEvent};

const STATUS_INTERVAL: Duration = Duration::from_secs(5);
const STAGE_OVER_DIM: f32 = 0.55;

// =============================================================================
// ARGUMENTS
// =============================================================================

struct ClientArgs {
    plain: bool,
    config: Option<PathBuf>,
    profile: PathBuf,
    camera: u32,
}

fn parse_args() -> Result<ClientArgs, String> {
    let mut args = ClientArgs {
        plain: false,
        config: None,
        profile: PathBuf::from("mirrorplay_profile.toml"),
        camera: 0,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--plain" => args.plain = true,
            "--config" => {
                args.config = Some(iter.next().ok_or("--config needs a path")?.into());
            }
            "--profile" => {
                args.profile = iter.next().ok_or("--profile needs a path")?.into();
            }
            "--camera" => {
                let index = iter.next().ok_or("--camera needs an index")?;
                args.camera = index.parse().map_err(|_| format!("bad camera index: {index}"))?;
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(args)
}

// =============================================================================
// FRAME SOURCES
// =============================================================================

/// Producer of camera frames. Created and polled on the capture thread.
trait FrameSource {
    fn name(&self) -> &'static str;

    /// Blocks until the next frame. `None` means this attempt failed.
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Moving gradient with a bright block sweeping across it, so the
/// background segmenter has something to find.
struct TestPattern {
    width: u32,
    height: u32,
    interval: Duration,
    started: Instant,
    next_due: Instant,
}

impl TestPattern {
    fn new(width: u32, height: u32, fps: u32) -> Self {
        let now = Instant::now();
        Self {
            width,
            height,
            interval: Duration::from_secs(1) / fps.max(1),
            started: now,
            next_due: now,
        }
    }
}

impl FrameSource for TestPattern {
    fn name(&self) -> &'static str {
        "test pattern"
    }

    fn next_frame(&mut self) -> Option<Frame> {
        let now = Instant::now();
        if self.next_due > now {
            thread::sleep(self.next_due - now);
        }
        self.next_due += self.interval;

        let elapsed = self.started.elapsed();
        let t = elapsed.as_secs_f32();
        let (w, h) = (self.width, self.height);
        let block_w = w / 5;
        let sweep = (t * 0.25).fract();
        let block_x = (sweep * (w - block_w) as f32) as u32;
        let block_y = h / 4;

        let mut data = Vec::with_capacity((w * h * 4) as usize);
        for y in 0..h {
            for x in 0..w {
                // Warm-up frames are plain gradient; the block appears once
                // the background is learned.
                let in_block = t > 2.0
                    && (block_x..block_x + block_w).contains(&x)
                    && (block_y..h).contains(&y);
                if in_block {
                    data.extend_from_slice(&[240, 220, 200, 255]);
                } else {
                    let r = (x * 255 / w) as u8;
                    let g = (y * 255 / h) as u8;
                    data.extend_from_slice(&[r, g, 96, 255]);
                }
            }
        }
        match Frame::new(w, h, PixelFormat::Rgba8, data) {
            Ok(frame) => Some(frame.with_timestamp(elapsed)),
            Err(e) => {
                tracing::error!("Test pattern produced a bad frame: {}", e);
                None
            }
        }
    }
}

#[cfg(feature = "camera")]
struct CameraSource {
    camera: nokhwa::Camera,
    started: Instant,
}

#[cfg(feature = "camera")]
impl CameraSource {
    fn open(index: u32) -> Result<Self, nokhwa::NokhwaError> {
        use nokhwa::pixel_format::RgbFormat;
        use nokhwa::utils::{
            CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
        };

        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(Resolution::new(640, 480), FrameFormat::YUYV, 30),
        ));
        let mut camera = nokhwa::Camera::new(CameraIndex::Index(index), requested)?;
        camera.open_stream()?;
        tracing::info!("Camera {} opened at {}", index, camera.resolution());
        Ok(Self {
            camera,
            started: Instant::now(),
        })
    }
}

#[cfg(feature = "camera")]
impl FrameSource for CameraSource {
    fn name(&self) -> &'static str {
        "camera"
    }

    fn next_frame(&mut self) -> Option<Frame> {
        use nokhwa::pixel_format::RgbFormat;

        let buffer = match self.camera.frame() {
            Ok(buffer) => buffer,
            Err(e) => {
                tracing::warn!("Camera frame failed: {}", e);
                thread::sleep(Duration::from_millis(50));
                return None;
            }
        };
        let image = match buffer.decode_image::<RgbFormat>() {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("Camera frame decode failed: {}", e);
                return None;
            }
        };
        let (width, height) = (image.width(), image.height());
        match Frame::new(width, height, PixelFormat::Rgb8, image.into_raw()) {
            Ok(frame) => Some(frame.to_rgba8().with_timestamp(self.started.elapsed())),
            Err(e) => {
                tracing::warn!("Camera delivered a bad frame: {}", e);
                None
            }
        }
    }
}

#[cfg(feature = "camera")]
fn open_source(camera: u32) -> Box<dyn FrameSource> {
    match CameraSource::open(camera) {
        Ok(camera) => Box::new(camera),
        Err(e) => {
            tracing::warn!("Camera {} unavailable ({}), using test pattern", camera, e);
            Box::new(TestPattern::new(640, 480, 30))
        }
    }
}

#[cfg(not(feature = "camera"))]
fn open_source(_camera: u32) -> Box<dyn FrameSource> {
    Box::new(TestPattern::new(640, 480, 30))
}

/// Opens a source with `open` on a new thread and polls it until `running`
/// clears. Every frame goes to the bridge and, when present, to the
/// segmentation worker.
fn spawn_capture<F>(
    open: F,
    bridge: Arc<FrameBridge>,
    worker: Option<Arc<Mutex<SegmentationWorker>>>,
    running: Arc<AtomicBool>,
) -> std::io::Result<thread::JoinHandle<()>>
where
    F: FnOnce() -> Box<dyn FrameSource> + Send + 'static,
{
    thread::Builder::new().name("capture".into()).spawn(move || {
        let mut source = open();
        tracing::info!("Capture started from {}", source.name());
        while running.load(Ordering::Relaxed) {
            let Some(frame) = source.next_frame() else {
                continue;
            };
            if let Some(worker) = &worker {
                if let Err(e) = worker.lock().submit(frame.clone()) {
                    tracing::warn!("Segmentation unavailable: {}", e);
                }
            }
            bridge.on_frame(frame);
        }
        tracing::info!("Capture stopped");
    })
}

// =============================================================================
// GAME LAYER
// =============================================================================

/// Everything that only exists outside `--plain`.
struct GameLayer {
    session: GameSession,
    events: EventReceiver,
    worker: Arc<Mutex<SegmentationWorker>>,
    overlay: OverlayRenderer,
    batch: OverlayBatch,
}

impl GameLayer {
    /// Runs every game tick due at `now`. Returns when the next one is due.
    fn update(&mut self, now: Instant) -> Instant {
        self.session.poll_worker(&mut self.worker.lock());
        self.session.advance_to(now);
        for event in self.events.drain() {
            log_event(&event);
        }
        now + self.session.time_to_next_tick()
    }

    fn draw(
        &mut self,
        gpu: &GpuContext<'_>,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        tunables: &SharedTunables,
    ) {
        let engine = self.session.engine();
        self.batch.clear();
        for ball in engine.balls() {
            self.batch
                .push_ball(ball.position(), ball.radius(), ball.color(), ball.scale());
        }
        for popup in engine.popups() {
            self.batch.push_popup(popup.origin, popup.size, popup.cue);
        }
        let dim = self.session.orchestrator().stage_over_opacity();
        if dim > 0.0 {
            self.batch
                .push_quad(Vec2::ZERO, engine.view(), [0.0, 0.0, 0.0, dim * STAGE_OVER_DIM]);
        }

        let mask = if tunables.segmentation_visible() {
            engine.mask()
        } else {
            None
        };
        self.overlay
            .draw(&gpu.device, &gpu.queue, encoder, target, &self.batch, mask);
    }
}

fn log_event(event: &UiEvent) {
    match event {
        UiEvent::TargetAnnounced { prompt, .. } => tracing::info!("{}", prompt),
        UiEvent::StageTick { seconds_remaining } => {
            tracing::debug!("{} s left", seconds_remaining);
        }
        UiEvent::StageEnded {
            final_success_count,
            new_record,
        } => {
            tracing::info!(
                "Stage over: {} caught{}",
                final_success_count,
                if *new_record { ", new record!" } else { "" }
            );
        }
        other => tracing::debug!("{:?}", other),
    }
}

// =============================================================================
// CLIENT
// =============================================================================

struct Client {
    gpu: GpuContext<'static>,
    bridge: Arc<FrameBridge>,
    frame_texture: FrameTexture,
    mirror: MirrorRenderer,
    tunables: Arc<SharedTunables>,
    game: Option<GameLayer>,
    cursor: Vec2,
    last_status: Instant,
}

impl Client {
    /// Advances game time. Called whenever the event loop wakes, so ticks
    /// keep running while redraws are withheld (minimised or occluded window).
    fn update(&mut self, now: Instant) -> Instant {
        match self.game.as_mut() {
            Some(game) => game.update(now),
            None => now + TICK_INTERVAL,
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        self.frame_texture
            .sync(&self.gpu.device, &self.gpu.queue, &self.bridge, now);

        let output = match self.gpu.acquire() {
            Ok(output) => output,
            Err(RenderError::SurfaceReconfigured) => return,
            Err(e) => {
                tracing::error!("Failed to acquire surface texture: {}", e);
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame"),
            });

        self.mirror.draw(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &view,
            &self.frame_texture,
        );
        if let Some(game) = self.game.as_mut() {
            game.draw(&self.gpu, &mut encoder, &view, &self.tunables);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if self.last_status.elapsed() >= STATUS_INTERVAL {
            self.log_status();
            self.last_status = Instant::now();
        }
    }

    fn log_status(&self) {
        let bridge = self.bridge.stats();
        tracing::info!(
            "Frames: {} received, {} shown, {} superseded{}",
            bridge.received,
            bridge.consumed,
            bridge.superseded,
            if self.frame_texture.watchdog().is_stalled() { " (STALLED)" } else { "" }
        );
        if let Some(game) = &self.game {
            let worker = game.worker.lock().stats();
            let ticks = game.session.tick_stats();
            tracing::info!(
                "Segmentation: {} analyzed, {} failed, {} evicted | Ticks: {} (avg {} us, {} late)",
                worker.analyzed,
                worker.failed,
                worker.evicted,
                ticks.total_ticks,
                ticks.avg_tick_us,
                ticks.late_ticks
            );
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.gpu.resize(size.width, size.height);
        self.mirror.resize(size.width, size.height);
        if let Some(game) = self.game.as_mut() {
            game.overlay.resize(size.width, size.height);
            game.session.resize(size.width as f32, size.height as f32);
        }
    }

    fn pointer_down(&mut self, position: Vec2) {
        if let Some(game) = self.game.as_mut() {
            let taps = game.session.pointer_down(position.x, position.y);
            if !taps.is_empty() {
                tracing::debug!("Touch at ({:.0}, {:.0}) caught {} ball(s)", position.x, position.y, taps.len());
            }
        }
    }

    fn set_mirror_mode(&mut self, mode: MirrorMode) {
        match self.game.as_mut() {
            Some(game) => game.session.set_mirror_mode_override(mode),
            None => {
                self.tunables.set_mirror_mode(mode);
            }
        }
        tracing::info!("Mirror mode: {:?}", mode);
    }

    fn key_pressed(&mut self, key: KeyCode) {
        match key {
            KeyCode::KeyR => {
                if let Some(game) = self.game.as_mut() {
                    tracing::info!("Restarting stage");
                    game.session.restart();
                }
            }
            KeyCode::Digit1 => self.set_mirror_mode(MirrorMode::Full),
            KeyCode::Digit2 => self.set_mirror_mode(MirrorMode::MirrorLeft),
            KeyCode::Digit3 => self.set_mirror_mode(MirrorMode::MirrorRight),
            KeyCode::KeyS => {
                let visible = !self.tunables.segmentation_visible();
                self.tunables.set_segmentation_visible(visible);
                tracing::info!("Segmentation overlay {}", if visible { "on" } else { "off" });
            }
            _ => {}
        }
    }
}

// =============================================================================
// MAIN
// =============================================================================

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mirrorplay=info,mirror_client=info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => GameConfig::from_file(path)?,
        None => GameConfig::default(),
    };
    tracing::info!("MIRRORPLAY starting ({} mode)", if args.plain { "plain" } else { "game" });

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("MIRRORPLAY")
            .with_inner_size(PhysicalSize::new(720, 1280))
            .build(&event_loop)?,
    );
    let size = window.inner_size();

    let gpu = pollster::block_on(GpuContext::new(window.clone(), size.width, size.height))?;
    let tunables = Arc::new(SharedTunables::new(MirrorMode::Full));
    let bridge = Arc::new(FrameBridge::new());
    let frame_texture = FrameTexture::new(
        &gpu.device,
        &gpu.queue,
        FrameWatchdog::new(config.watchdog_threshold()),
    );
    let mut mirror = MirrorRenderer::new(&gpu.device, gpu.format(), Arc::clone(&tunables));
    mirror.resize(size.width, size.height);

    let game = if args.plain {
        None
    } else {
        let worker = Arc::new(Mutex::new(SegmentationWorker::spawn(
            BackgroundDiffSegmenter::default(),
            config.mask_threshold,
        )?));
        let (tx, events) = EventBus::create_pair(EventBus::DEFAULT_CAPACITY);
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        let mut session = GameSession::new(
            config.clone(),
            Box::new(TomlProfileStore::new(&args.profile, "player")),
            Arc::clone(&tunables),
            tx,
            (size.width as f32, size.height as f32),
            seed,
        )?;
        session.start();

        let mut overlay = OverlayRenderer::new(&gpu.device, gpu.format());
        overlay.resize(size.width, size.height);
        Some(GameLayer {
            session,
            events,
            worker,
            overlay,
            batch: OverlayBatch::new(),
        })
    };

    let running = Arc::new(AtomicBool::new(true));
    let camera = args.camera;
    let capture = spawn_capture(
        move || open_source(camera),
        Arc::clone(&bridge),
        game.as_ref().map(|g| Arc::clone(&g.worker)),
        Arc::clone(&running),
    )?;

    let mut client = Client {
        gpu,
        bridge,
        frame_texture,
        mirror,
        tunables,
        game,
        cursor: Vec2::ZERO,
        last_status: Instant::now(),
    };

    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent { event, window_id } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => elwt.exit(),

                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(key),
                            state: ElementState::Pressed,
                            repeat: false,
                            ..
                        },
                    ..
                } => {
                    if key == KeyCode::Escape {
                        elwt.exit();
                    } else {
                        client.key_pressed(key);
                    }
                }

                WindowEvent::CursorMoved { position, .. } => {
                    client.cursor = Vec2::new(position.x as f32, position.y as f32);
                }

                WindowEvent::MouseInput {
                    button: MouseButton::Left,
                    state: ElementState::Pressed,
                    ..
                } => client.pointer_down(client.cursor),

                WindowEvent::Touch(Touch {
                    phase: TouchPhase::Started,
                    location,
                    ..
                }) => client.pointer_down(Vec2::new(location.x as f32, location.y as f32)),

                WindowEvent::Resized(new_size) => client.resize(new_size),

                WindowEvent::RedrawRequested => client.redraw(),

                _ => {}
            },

            Event::AboutToWait => {
                let next_tick = client.update(Instant::now());
                window.request_redraw();
                elwt.set_control_flow(ControlFlow::WaitUntil(next_tick));
            }

            _ => {}
        }
    })?;

    running.store(false, Ordering::Relaxed);
    if capture.join().is_err() {
        tracing::error!("Capture thread panicked");
    }
    Ok(())
}
