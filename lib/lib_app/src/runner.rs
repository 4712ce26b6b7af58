use std::{sync::Arc, time::Instant};

use glam::{UVec2, Vec2};
use lib_renderer::{Assets, Renderer, RenderContext, Screen, SetupError, WgpuBackend};
use wgpu::{
    Device, DeviceDescriptor, Instance, PollType, Queue, RequestAdapterOptions, Surface,
    SurfaceConfiguration, SurfaceError, TextureViewDescriptor,
};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowAttributes, WindowId},
};

use crate::{AppConfig, AppContext, AppEvent, AppFlow, AppHandler};

pub fn run_app<T: AppHandler>() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = T::config();

    let event_loop = EventLoop::new().expect("Failed to create event loop");

    let mut application = AppRunner::<T>::Uninitialized(config);

    event_loop
        .run_app(&mut application)
        .expect("Failed to run app");
}

enum AppRunner<T: AppHandler> {
    Uninitialized(AppConfig),
    Initialized(InitializedAppRunner<T>),
    Failed,
}

struct InitializedAppRunner<T: AppHandler> {
    window: Arc<Window>,
    device: Device,
    queue: Queue,
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    config: AppConfig,
    screen: Screen,
    assets: Assets,
    renderer: Renderer,
    backend: WgpuBackend,
    alt_left_is_held: bool,
    alt_right_is_held: bool,
    app: T,
    last_instant: Instant,
}

macro_rules! app_ctx {
    ($runner:expr) => {
        AppContext {
            window: &$runner.window,
            device: &$runner.device,
            queue: &$runner.queue,
            surface_format: $runner.surface_config.format,
            screen: $runner.screen,
        }
    };
}

macro_rules! render_ctx {
    ($runner:expr) => {
        RenderContext {
            device: &$runner.device,
            queue: &$runner.queue,
            surface_format: $runner.surface_config.format,
        }
    };
}

impl<T: AppHandler> ApplicationHandler for AppRunner<T> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let AppRunner::Uninitialized(config) = self else {
            return;
        };

        match InitializedAppRunner::new(event_loop, config.clone()) {
            Ok(runner) => *self = AppRunner::Initialized(runner),
            Err(err) => {
                log::error!("setup failed: {err}");
                *self = AppRunner::Failed;
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let AppRunner::Initialized(init_self) = self else {
            return;
        };

        let now = Instant::now();
        let delta_time = now.duration_since(init_self.last_instant);
        init_self.last_instant = now;

        handle_appflow!(
            event_loop,
            init_self.app.update(delta_time, app_ctx!(init_self))
        );

        init_self.window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Self::Initialized(init_self) = self else {
            return;
        };

        init_self.fsswitch_window_event(&event);

        match &event {
            WindowEvent::RedrawRequested => init_self.redraw(event_loop),
            WindowEvent::Resized(size) => init_self.resize(UVec2::new(size.width, size.height)),
            _ => {}
        }

        let app_event = match &event {
            WindowEvent::CloseRequested => AppEvent::CloseRequested,
            WindowEvent::Resized(_) => AppEvent::Resized(init_self.screen),
            WindowEvent::CursorMoved { position, .. } => AppEvent::CursorMoved(
                init_self
                    .screen
                    .to_canvas(Vec2::new(position.x as f32, position.y as f32)),
            ),
            WindowEvent::KeyboardInput { event, .. } => AppEvent::Key(event),
            WindowEvent::RedrawRequested => return,
            _ => AppEvent::UnhandledWindowEvent(&event),
        };

        handle_appflow!(
            event_loop,
            init_self.app.event(app_event, app_ctx!(init_self))
        );
    }
}

impl<T: AppHandler> InitializedAppRunner<T> {
    fn new(event_loop: &ActiveEventLoop, config: AppConfig) -> Result<Self, SetupError> {
        let window = Arc::new(
            event_loop
                .create_window(
                    WindowAttributes::default()
                        .with_title(config.title.clone())
                        .with_maximized(config.maximized),
                )
                .expect("Failed to create main window"),
        );

        let instance = Instance::default();

        let adapter =
            pollster::block_on(instance.request_adapter(&RequestAdapterOptions::default()))
                .expect("Failed to get adapter");

        let (device, queue) =
            pollster::block_on(adapter.request_device(&DeviceDescriptor::default()))
                .expect("Failed to get device");

        let surface = instance
            .create_surface(window.clone())
            .expect("Failed to create surface");

        let size = window.inner_size();
        let surface_config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .expect("Failed to get default surface configuration");

        surface.configure(&device, &surface_config);

        let screen = Screen::fit(
            config.screen,
            UVec2::new(surface_config.width, surface_config.height),
        );

        log::info!(
            "canvas {}x{} at zoom {}",
            screen.canvas.x,
            screen.canvas.y,
            screen.zoom
        );

        let ctx = RenderContext {
            device: &device,
            queue: &queue,
            surface_format: surface_config.format,
        };

        let mut backend = WgpuBackend::new(screen, config.border(), ctx);

        let mut assets = Assets::new(config.bin_size);
        let app = T::new(
            &mut assets,
            AppContext {
                window: &window,
                device: &device,
                queue: &queue,
                surface_format: surface_config.format,
                screen,
            },
        )?;

        backend.upload_assets(&mut assets, ctx)?;

        let last_instant = Instant::now();

        Ok(Self {
            window,
            device,
            queue,
            surface,
            surface_config,
            config,
            screen,
            assets,
            renderer: Renderer::default(),
            backend,
            alt_left_is_held: false,
            alt_right_is_held: false,
            app,
            last_instant,
        })
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                return;
            }
            Err(err) => {
                log::warn!("failed to acquire surface texture: {err}");
                return;
            }
        };

        let view = texture
            .texture
            .create_view(&TextureViewDescriptor::default());

        self.app
            .draw(&mut self.renderer.frame(&self.assets, self.screen.canvas));

        self.renderer
            .flush(&mut self.backend.frame(&view, render_ctx!(self)));

        if let Some(err) = self.renderer.take_error() {
            handle_appflow!(event_loop, self.app.render_error(err, app_ctx!(self)));
        }

        self.window.pre_present_notify();
        texture.present();

        if let Err(err) = self.device.poll(PollType::Poll) {
            log::warn!("device poll failed: {err}");
        }
    }

    fn resize(&mut self, size: UVec2) {
        if size.x == 0 || size.y == 0 {
            return;
        }

        self.surface_config.width = size.x;
        self.surface_config.height = size.y;

        self.surface.configure(&self.device, &self.surface_config);

        self.screen = Screen::fit(self.config.screen, size);
        self.backend.resize(self.screen, render_ctx!(self));
    }

    fn fsswitch_window_event(&mut self, event: &WindowEvent) {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return;
        };

        if event.repeat {
            return;
        }

        let PhysicalKey::Code(keycode) = event.physical_key else {
            return;
        };

        match keycode {
            KeyCode::AltLeft => self.alt_left_is_held = event.state.is_pressed(),
            KeyCode::AltRight => self.alt_right_is_held = event.state.is_pressed(),

            KeyCode::Enter if event.state.is_pressed() => {
                if self.alt_left_is_held || self.alt_right_is_held {
                    match self.window.fullscreen() {
                        Some(_) => self.window.set_fullscreen(None),
                        None => self
                            .window
                            .set_fullscreen(Some(Fullscreen::Borderless(None))),
                    }
                }
            }

            _ => {}
        }
    }
}

macro_rules! handle_appflow {
    ($event_loop:expr, $flow:expr) => {
        match $flow {
            AppFlow::Continue => {}
            AppFlow::Exit => {
                $event_loop.exit();
                return;
            }
        }
    };
}

use handle_appflow;
