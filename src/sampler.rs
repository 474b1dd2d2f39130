//! Per-triangle pixel sampling.
//!
//! Brute-force scan of the triangle's bounding box against an RGBA buffer.
//! Triangles are small relative to the image and sampling runs once per
//! mutation, so the O(bbox area) cost is fine.

use crate::color::Color;
use crate::mesh::{bounding_box, point_in_triangle, Point};

/// Average color of all pixels inside the triangle.
///
/// The scan is half-open: integer rows/columns satisfying
/// `top_left <= v < bottom_right`, so the bottom/right border row and
/// column of the box are excluded. Channel sums are 64-bit; a triangle
/// that covers no pixel centers averages to black (the divisor is forced
/// to 1). The output alpha is always `fixed_alpha`, never the sampled
/// alpha, although alpha is accumulated alongside the other channels.
pub fn sample_triangle(
    corners: [Point; 3],
    rgba: &[u8],
    width: u32,
    height: u32,
    fixed_alpha: u8,
) -> Color {
    let bbox = bounding_box(corners);

    // Clamping to the pixel grid keeps the scan in-buffer for meshes that
    // arrived from a document rather than through the bounds checks.
    let y_start = (bbox.top_left.y as i64).max(0);
    let y_end = (bbox.bottom_right.y.ceil() as i64).min(height as i64);
    let x_start = (bbox.top_left.x as i64).max(0);
    let x_end = (bbox.bottom_right.x.ceil() as i64).min(width as i64);

    let mut sum_a = 0i64;
    let mut sum_r = 0i64;
    let mut sum_g = 0i64;
    let mut sum_b = 0i64;
    let mut pixel_count = 0i64;

    for y in y_start..y_end {
        for x in x_start..x_end {
            if !point_in_triangle(corners, Point::new(x as f64, y as f64)) {
                continue;
            }

            let offset = (y as usize * width as usize + x as usize) * 4;
            sum_r += rgba[offset] as i64;
            sum_g += rgba[offset + 1] as i64;
            sum_b += rgba[offset + 2] as i64;
            sum_a += rgba[offset + 3] as i64;
            pixel_count += 1;
        }
    }

    if pixel_count == 0 {
        pixel_count = 1;
    }

    // sum_a is intentionally not part of the output; see fixed_alpha.
    let _ = sum_a;

    Color::from_argb(
        fixed_alpha,
        (sum_r / pixel_count) as u8,
        (sum_g / pixel_count) as u8,
        (sum_b / pixel_count) as u8,
    )
}
