//! Drawing surface abstraction
//!
//! The scene is drawn through [`Surface`] so the same frame code targets the
//! browser's 2D canvas context and the recording surface used in tests.

/// Horizontal anchor for text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
        }
    }
}

/// Immediate-mode 2D drawing operations
pub trait Surface {
    /// Fill a rectangle with a top-to-bottom gradient; stops are (offset 0..1, color)
    fn fill_vertical_gradient(&mut self, x: f64, y: f64, w: f64, h: f64, stops: &[(f32, &str)]);

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str);

    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: &str);

    fn fill_triangle(&mut self, points: [(f64, f64); 3], color: &str);

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), color: &str, width: f64);

    fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &str, color: &str, align: TextAlign);

    /// Glow applied to subsequent fills; `blur == 0` turns it off
    fn set_glow(&mut self, color: &str, blur: f64);
}

#[cfg(target_arch = "wasm32")]
mod canvas {
    use std::f64::consts::TAU;

    use web_sys::CanvasRenderingContext2d;

    use super::{Surface, TextAlign};

    impl Surface for CanvasRenderingContext2d {
        fn fill_vertical_gradient(
            &mut self,
            x: f64,
            y: f64,
            w: f64,
            h: f64,
            stops: &[(f32, &str)],
        ) {
            let gradient = self.create_linear_gradient(x, y, x, y + h);
            for &(offset, color) in stops {
                let _ = gradient.add_color_stop(offset, color);
            }
            self.set_fill_style_canvas_gradient(&gradient);
            CanvasRenderingContext2d::fill_rect(self, x, y, w, h);
        }

        fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str) {
            self.set_fill_style_str(color);
            CanvasRenderingContext2d::fill_rect(self, x, y, w, h);
        }

        fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: &str) {
            self.set_fill_style_str(color);
            self.begin_path();
            if self.arc(cx, cy, r, 0.0, TAU).is_ok() {
                self.fill();
            }
        }

        fn fill_triangle(&mut self, points: [(f64, f64); 3], color: &str) {
            self.set_fill_style_str(color);
            self.begin_path();
            self.move_to(points[0].0, points[0].1);
            self.line_to(points[1].0, points[1].1);
            self.line_to(points[2].0, points[2].1);
            self.close_path();
            self.fill();
        }

        fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), color: &str, width: f64) {
            self.set_stroke_style_str(color);
            self.set_line_width(width);
            self.begin_path();
            self.move_to(from.0, from.1);
            self.line_to(to.0, to.1);
            self.stroke();
        }

        fn fill_text(
            &mut self,
            text: &str,
            x: f64,
            y: f64,
            font: &str,
            color: &str,
            align: TextAlign,
        ) {
            self.set_font(font);
            self.set_fill_style_str(color);
            self.set_text_align(align.as_str());
            let _ = CanvasRenderingContext2d::fill_text(self, text, x, y);
        }

        fn set_glow(&mut self, color: &str, blur: f64) {
            self.set_shadow_color(color);
            self.set_shadow_blur(blur);
        }
    }
}
