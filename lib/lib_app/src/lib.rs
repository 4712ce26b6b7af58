use std::time::Duration;

use glam::I16Vec2;
use lib_renderer::{Assets, Frame, RenderError, Screen, SetupError};
use wgpu::{Device, Queue, TextureFormat};
use winit::{
    event::{KeyEvent, WindowEvent},
    window::Window,
};

mod config;
mod runner;
pub use config::*;

pub trait AppHandler: Sized {
    /// Called once before the window opens. Reads `pixlet.toml` by default.
    fn config() -> AppConfig {
        AppConfig::discover().unwrap_or_else(|err| {
            log::error!("{err}, using default config");
            AppConfig::default()
        })
    }

    /// Declares pictures and fonts. They are packed and uploaded right after.
    fn new(assets: &mut Assets, ctx: AppContext<'_>) -> Result<Self, SetupError>;

    fn update(&mut self, _delta_time: Duration, _ctx: AppContext<'_>) -> AppFlow {
        AppFlow::Continue
    }

    fn event(&mut self, event: AppEvent<'_>, _ctx: AppContext<'_>) -> AppFlow {
        match event {
            AppEvent::CloseRequested => AppFlow::Exit,
            _ => AppFlow::Continue,
        }
    }

    fn draw(&mut self, frame: &mut Frame<'_>);

    /// Called after a frame whose submission failed.
    fn render_error(&mut self, _err: RenderError, _ctx: AppContext<'_>) -> AppFlow {
        AppFlow::Continue
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AppContext<'a> {
    pub window: &'a Window,
    pub device: &'a Device,
    pub queue: &'a Queue,
    pub surface_format: TextureFormat,
    pub screen: Screen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppFlow {
    Continue,
    Exit,
}

#[non_exhaustive]
#[derive(Debug, Clone, Copy)]
pub enum AppEvent<'a> {
    CloseRequested,
    Resized(Screen),
    /// `None` when the cursor is over the letterbox margins.
    CursorMoved(Option<I16Vec2>),
    Key(&'a KeyEvent),
    UnhandledWindowEvent(&'a WindowEvent),
}

#[macro_export]
macro_rules! app_main {
    ($App:ty) => {
        fn main() {
            $crate::hidden::run_app::<$App>();
        }
    };
}

#[doc(hidden)]
pub mod hidden {
    pub use crate::runner::run_app;
}
