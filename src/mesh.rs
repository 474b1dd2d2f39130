//! Point/edge/triangle graph describing the low-poly decomposition of an
//! image.
//!
//! Points live in the mesh keyed by a stable integer id; edges and
//! triangles reference points by id only and are resolved with an explicit
//! lookup. Spatial rejections (out-of-bounds positions, duplicate
//! triangles) are policy, not faults, and come back as `Option`/`bool`.

use crate::color::Color;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Stable point handle, monotonically allocated by the owning mesh.
pub type PointId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounds of a triangle, inclusive on both corners.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub top_left: Point,
    pub bottom_right: Point,
}

#[derive(Debug, Clone, Copy)]
pub struct GraphPoint {
    pub id: PointId,
    pub position: Point,
}

#[derive(Debug, Clone, Copy)]
pub struct GraphEdge {
    pub start: PointId,
    pub end: PointId,
}

#[derive(Debug, Clone, Copy)]
pub struct GraphTriangle {
    pub points: [PointId; 3],
    pub fill: Color,
}

impl GraphTriangle {
    pub fn uses(&self, id: PointId) -> bool {
        self.points.contains(&id)
    }
}

/// Min/max of the three vertex positions.
pub fn bounding_box(corners: [Point; 3]) -> BoundingBox {
    let [a, b, c] = corners;
    BoundingBox {
        top_left: Point::new(a.x.min(b.x).min(c.x), a.y.min(b.y).min(c.y)),
        bottom_right: Point::new(a.x.max(b.x).max(c.x), a.y.max(b.y).max(c.y)),
    }
}

fn sign(p1: Point, p2: Point, p3: Point) -> f64 {
    (p1.x - p3.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p3.y)
}

/// Half-plane containment test. The point is inside iff the sign of the
/// test against each edge matches the sign against edge (2,3), which makes
/// the result independent of triangle winding.
pub fn point_in_triangle(corners: [Point; 3], p: Point) -> bool {
    let [c1, c2, c3] = corners;
    let b2 = sign(p, c2, c3) < 0.0;
    (sign(p, c1, c2) < 0.0) == b2 && b2 == (sign(p, c3, c1) < 0.0)
}

/// The mesh graph. One instance is active per session and is replaced
/// wholesale on load/reset.
#[derive(Debug, Clone)]
pub struct Mesh {
    next_id: PointId,
    /// Path of the raster the mesh traces; persisted with the document.
    pub image_filename: Option<String>,
    /// Where the document itself was last saved. Never persisted.
    pub filename: Option<PathBuf>,
    /// Pixel bounds new geometry must stay inside (inclusive of the far
    /// edge). Unbounded until a source image is loaded.
    bounds: (f64, f64),
    points: Vec<GraphPoint>,
    edges: Vec<GraphEdge>,
    triangles: Vec<GraphTriangle>,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            image_filename: None,
            filename: None,
            bounds: (f64::INFINITY, f64::INFINITY),
            points: Vec::new(),
            edges: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub(crate) fn from_parts(
        next_id: PointId,
        image_filename: Option<String>,
        points: Vec<GraphPoint>,
        edges: Vec<GraphEdge>,
        triangles: Vec<GraphTriangle>,
    ) -> Self {
        Self {
            next_id,
            image_filename,
            filename: None,
            bounds: (f64::INFINITY, f64::INFINITY),
            points,
            edges,
            triangles,
        }
    }

    pub fn set_bounds(&mut self, width: f64, height: f64) {
        self.bounds = (width, height);
    }

    pub fn in_bounds(&self, position: Point) -> bool {
        position.x >= 0.0
            && position.x <= self.bounds.0
            && position.y >= 0.0
            && position.y <= self.bounds.1
    }

    pub fn next_id(&self) -> PointId {
        self.next_id
    }

    fn alloc_id(&mut self) -> PointId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn points(&self) -> &[GraphPoint] {
        &self.points
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn triangles(&self) -> &[GraphTriangle] {
        &self.triangles
    }

    pub fn point(&self, id: PointId) -> Option<&GraphPoint> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn position(&self, id: PointId) -> Option<Point> {
        self.point(id).map(|p| p.position)
    }

    /// Add a point at `position`, rejecting positions outside the image
    /// bounds. Returns the allocated id.
    pub fn add_point(&mut self, position: Point) -> Option<PointId> {
        if !self.in_bounds(position) {
            return None;
        }

        let id = self.alloc_id();
        self.points.push(GraphPoint { id, position });
        Some(id)
    }

    /// Connect two existing points. Rejects unknown ids and end positions
    /// outside the image bounds.
    pub fn add_edge(&mut self, start: PointId, end: PointId) -> bool {
        if self.point(start).is_none() {
            return false;
        }
        let Some(end_position) = self.position(end) else {
            return false;
        };
        if !self.in_bounds(end_position) {
            return false;
        }

        self.edges.push(GraphEdge { start, end });
        true
    }

    /// Connect an existing point to a brand-new one, admitting the new
    /// point into the mesh. Returns the id of the admitted end point.
    pub fn add_edge_to(&mut self, start: PointId, end: Point) -> Option<PointId> {
        if self.point(start).is_none() {
            return None;
        }
        if !self.in_bounds(end) {
            return None;
        }

        let end_id = self.alloc_id();
        self.points.push(GraphPoint {
            id: end_id,
            position: end,
        });
        self.edges.push(GraphEdge {
            start,
            end: end_id,
        });
        Some(end_id)
    }

    /// Order-independent duplicate check: true when an existing triangle
    /// uses exactly this set of three point ids.
    pub fn has_triangle(&self, p1: PointId, p2: PointId, p3: PointId) -> bool {
        self.triangles
            .iter()
            .any(|t| t.uses(p1) && t.uses(p2) && t.uses(p3))
    }

    /// Insert a triangle with an already-decided fill. Rejects duplicates
    /// and unknown point ids. Color bookkeeping is the caller's concern.
    pub fn insert_triangle(&mut self, p1: PointId, p2: PointId, p3: PointId, fill: Color) -> bool {
        if self.has_triangle(p1, p2, p3) {
            return false;
        }
        if self.point(p1).is_none() || self.point(p2).is_none() || self.point(p3).is_none() {
            return false;
        }

        self.triangles.push(GraphTriangle {
            points: [p1, p2, p3],
            fill,
        });
        true
    }

    pub fn triangle_corners(&self, triangle: &GraphTriangle) -> Option<[Point; 3]> {
        Some([
            self.position(triangle.points[0])?,
            self.position(triangle.points[1])?,
            self.position(triangle.points[2])?,
        ])
    }

    /// Move a point, subject to the same bounds policy as `add_point`.
    pub fn move_point(&mut self, id: PointId, position: Point) -> bool {
        if !self.in_bounds(position) {
            return false;
        }
        match self.points.iter_mut().find(|p| p.id == id) {
            Some(point) => {
                point.position = position;
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_triangle_fill(&mut self, index: usize, fill: Color) {
        self.triangles[index].fill = fill;
    }

    /// Cascade removal: every edge referencing the point goes first, then
    /// every triangle, then the point itself. The removed triangles are
    /// handed back so the caller can release their fills.
    pub fn remove_point(&mut self, id: PointId) -> Vec<GraphTriangle> {
        self.edges.retain(|e| e.start != id && e.end != id);

        let mut removed = Vec::new();
        self.triangles.retain(|t| {
            if t.uses(id) {
                removed.push(*t);
                false
            } else {
                true
            }
        });

        self.points.retain(|p| p.id != id);
        removed
    }
}
