use glam::{I16Vec2, UVec2, Vec2};
use serde::{Deserialize, Serialize};

/// How the canvas follows the window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenMode {
    /// Fixed canvas resolution, scaled by the largest integer zoom that fits.
    Zoom { target: UVec2 },
    /// Fixed zoom, the canvas grows with the window.
    Extend { pixel: u32 },
}

impl Default for ScreenMode {
    fn default() -> Self {
        ScreenMode::Zoom {
            target: UVec2::new(320, 180),
        }
    }
}

/// Placement of the canvas inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub window: UVec2,
    pub canvas: UVec2,
    pub zoom: u32,
    /// Top-left corner of the zoomed canvas, in window pixels.
    pub origin: UVec2,
}

impl Screen {
    pub fn fit(mode: ScreenMode, window: UVec2) -> Self {
        let (canvas, zoom) = match mode {
            ScreenMode::Zoom { target } => {
                let target = target.max(UVec2::ONE);
                let zoom = (window / target).min_element().max(1);
                (target, zoom)
            }
            ScreenMode::Extend { pixel } => {
                let zoom = pixel.max(1);
                ((window / zoom).max(UVec2::ONE), zoom)
            }
        };

        let origin = window.saturating_sub(canvas * zoom) / 2;

        Self {
            window,
            canvas,
            zoom,
            origin,
        }
    }

    /// Size of the zoomed canvas in window pixels.
    pub fn extent(&self) -> UVec2 {
        self.canvas * self.zoom
    }

    /// Canvas pixel under a window position, if any.
    pub fn to_canvas(&self, window_position: Vec2) -> Option<I16Vec2> {
        let p = ((window_position - self.origin.as_vec2()) / self.zoom as f32).floor();

        let inside = p.cmpge(Vec2::ZERO).all() && p.cmplt(self.canvas.as_vec2()).all();
        inside.then(|| p.as_i16vec2())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_picks_largest_integer_factor() {
        let screen = Screen::fit(
            ScreenMode::Zoom {
                target: UVec2::new(320, 180),
            },
            UVec2::new(1000, 600),
        );

        assert_eq!(screen.zoom, 3);
        assert_eq!(screen.canvas, UVec2::new(320, 180));
        assert_eq!(screen.extent(), UVec2::new(960, 540));
        assert_eq!(screen.origin, UVec2::new(20, 30));
    }

    #[test]
    fn zoom_never_drops_below_one() {
        let screen = Screen::fit(
            ScreenMode::Zoom {
                target: UVec2::new(320, 180),
            },
            UVec2::new(200, 100),
        );

        assert_eq!(screen.zoom, 1);
        assert_eq!(screen.origin, UVec2::ZERO);
    }

    #[test]
    fn extend_grows_the_canvas() {
        let screen = Screen::fit(ScreenMode::Extend { pixel: 4 }, UVec2::new(1002, 801));

        assert_eq!(screen.zoom, 4);
        assert_eq!(screen.canvas, UVec2::new(250, 200));
        assert_eq!(screen.origin, UVec2::new(1, 0));

        let minimized = Screen::fit(ScreenMode::Extend { pixel: 4 }, UVec2::ZERO);
        assert_eq!(minimized.canvas, UVec2::ONE);
    }

    #[test]
    fn window_positions_map_to_canvas_pixels() {
        let screen = Screen::fit(
            ScreenMode::Zoom {
                target: UVec2::new(320, 180),
            },
            UVec2::new(1000, 600),
        );

        assert_eq!(screen.to_canvas(Vec2::new(20.0, 30.0)), Some(I16Vec2::ZERO));
        assert_eq!(
            screen.to_canvas(Vec2::new(979.5, 569.0)),
            Some(I16Vec2::new(319, 179))
        );
        assert_eq!(screen.to_canvas(Vec2::new(19.0, 300.0)), None);
        assert_eq!(screen.to_canvas(Vec2::new(980.0, 300.0)), None);
    }

    #[test]
    fn modes_read_from_toml_style_values() {
        #[derive(Deserialize)]
        struct Wrapper {
            screen: ScreenMode,
        }

        let w: Wrapper = toml::from_str("screen = { extend = { pixel = 3 } }").unwrap();
        assert_eq!(w.screen, ScreenMode::Extend { pixel: 3 });
    }
}
