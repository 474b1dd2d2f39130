//! One-way SVG export of a colored mesh.
//!
//! One filled polygon per triangle. Coordinates are shifted so the minimum
//! point coordinate lands at the origin and truncated to integers; the
//! fill is the triangle's stored color as a 6-hex-digit RGB string (alpha
//! is not encoded) and the stroke is fully transparent black.

use crate::mesh::Mesh;
use std::fmt::Write as _;

/// Default extension for exported vector files.
pub const SVG_EXTENSION: &str = ".svg";

pub fn mesh_to_svg(mesh: &Mesh) -> Result<String, String> {
    if mesh.points().is_empty() {
        return Err("cannot export an empty mesh as SVG".to_string());
    }

    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;
    for point in mesh.points() {
        min_x = min_x.min(point.position.x);
        min_y = min_y.min(point.position.y);
        max_x = max_x.max(point.position.x);
        max_y = max_y.max(point.position.y);
    }

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n");
    let _ = writeln!(
        out,
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">",
        max_x - min_x,
        max_y - min_y
    );

    for triangle in mesh.triangles() {
        let corners = mesh
            .triangle_corners(triangle)
            .ok_or_else(|| "triangle references a point missing from the mesh".to_string())?;

        let _ = writeln!(
            out,
            "<polygon fill=\"{}\" stroke-opacity=\"0\" stroke=\"#000000\" points=\"{},{} {},{} {},{}\" class=\"triangle\" />",
            triangle.fill.hex(),
            (corners[0].x - min_x) as i64,
            (corners[0].y - min_y) as i64,
            (corners[1].x - min_x) as i64,
            (corners[1].y - min_y) as i64,
            (corners[2].x - min_x) as i64,
            (corners[2].y - min_y) as i64,
        );
    }

    out.push_str("</svg>\n");
    Ok(out)
}
