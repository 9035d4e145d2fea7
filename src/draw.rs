use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};

use crate::model::Color;

pub const OUTLINE_THICKNESS: u32 = 5;

/// Draw an unfilled rectangle outline with its thickness centered on the
/// (x0, y0)-(x1, y1) corner rectangle: concentric 1-px hollow rectangles at
/// offsets -2..=+2. Out-of-bounds parts are clipped; offsets that would
/// collapse the rectangle are skipped.
pub fn draw_outline(image: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
    let half = OUTLINE_THICKNESS as i32 / 2;
    for off in -half..=half {
        let width = i64::from(x1 - x0) + 2 * i64::from(off) + 1;
        let height = i64::from(y1 - y0) + 2 * i64::from(off) + 1;
        if width <= 0 || height <= 0 {
            continue;
        }
        draw_hollow_rect_mut(
            image,
            Rect::at(x0 - off, y0 - off).of_size(width as u32, height as u32),
            Rgb(color),
        );
    }
}
