//! Persisted mesh document.
//!
//! The on-disk shape is fixed: `nextId`, optional `imageFilename`, and the
//! three flat collections with id cross-references. Fills, bounds and the
//! document's own path are transient and re-derived after load. Any edge or
//! triangle referencing a missing point id fails the whole load.

use crate::mesh::{GraphEdge, GraphPoint, GraphTriangle, Mesh, Point, PointId};
use crate::palette::PLACEHOLDER_COLOR;
use serde::{Deserialize, Serialize};

/// Default extension for saved mesh documents.
pub const FILE_EXTENSION: &str = ".lpm";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshDocument {
    pub next_id: PointId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_filename: Option<String>,
    pub points: Vec<PointRecord>,
    pub edges: Vec<EdgeRecord>,
    pub triangles: Vec<TriangleRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointRecord {
    pub id: PointId,
    pub position: Point,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub start_point_id: PointId,
    pub end_point_id: PointId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriangleRecord {
    pub point1_id: PointId,
    pub point2_id: PointId,
    pub point3_id: PointId,
}

impl MeshDocument {
    pub fn from_mesh(mesh: &Mesh) -> Self {
        Self {
            next_id: mesh.next_id(),
            image_filename: mesh.image_filename.clone(),
            points: mesh
                .points()
                .iter()
                .map(|p| PointRecord {
                    id: p.id,
                    position: p.position,
                })
                .collect(),
            edges: mesh
                .edges()
                .iter()
                .map(|e| EdgeRecord {
                    start_point_id: e.start,
                    end_point_id: e.end,
                })
                .collect(),
            triangles: mesh
                .triangles()
                .iter()
                .map(|t| TriangleRecord {
                    point1_id: t.points[0],
                    point2_id: t.points[1],
                    point3_id: t.points[2],
                })
                .collect(),
        }
    }

    /// Rebuild a live mesh, resolving every id reference against the
    /// loaded points. Triangle fills start as the placeholder color; the
    /// session re-derives them once a pixel source is available.
    pub fn into_mesh(self) -> Result<Mesh, String> {
        let points: Vec<GraphPoint> = self
            .points
            .iter()
            .map(|p| GraphPoint {
                id: p.id,
                position: p.position,
            })
            .collect();

        let resolve = |id: PointId, context: &str| -> Result<PointId, String> {
            if points.iter().any(|p| p.id == id) {
                Ok(id)
            } else {
                Err(format!("{} references unknown point id {}", context, id))
            }
        };

        let mut edges = Vec::with_capacity(self.edges.len());
        for edge in &self.edges {
            edges.push(GraphEdge {
                start: resolve(edge.start_point_id, "edge")?,
                end: resolve(edge.end_point_id, "edge")?,
            });
        }

        let mut triangles = Vec::with_capacity(self.triangles.len());
        for triangle in &self.triangles {
            triangles.push(GraphTriangle {
                points: [
                    resolve(triangle.point1_id, "triangle")?,
                    resolve(triangle.point2_id, "triangle")?,
                    resolve(triangle.point3_id, "triangle")?,
                ],
                fill: PLACEHOLDER_COLOR,
            });
        }

        Ok(Mesh::from_parts(
            self.next_id,
            self.image_filename,
            points,
            edges,
            triangles,
        ))
    }
}

pub fn to_json(mesh: &Mesh) -> Result<String, String> {
    serde_json::to_string_pretty(&MeshDocument::from_mesh(mesh))
        .map_err(|e| format!("Failed to serialize mesh document: {}", e))
}

pub fn from_json(text: &str) -> Result<Mesh, String> {
    let document: MeshDocument =
        serde_json::from_str(text).map_err(|e| format!("Failed to parse mesh document: {}", e))?;
    document.into_mesh()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn sample_mesh() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.set_bounds(100.0, 100.0);
        mesh.image_filename = Some("portrait.png".to_string());

        let a = mesh.add_point(Point::new(0.0, 0.0)).unwrap();
        let b = mesh.add_point(Point::new(10.0, 0.0)).unwrap();
        let c = mesh.add_point(Point::new(0.0, 10.0)).unwrap();
        let d = mesh.add_point(Point::new(10.0, 10.0)).unwrap();

        assert!(mesh.add_edge(a, b));
        assert!(mesh.add_edge(b, c));
        assert!(mesh.insert_triangle(a, b, c, Color::from_argb(200, 9, 9, 9)));
        assert!(mesh.insert_triangle(b, c, d, Color::from_argb(200, 5, 5, 5)));
        mesh
    }

    #[test]
    fn round_trip_preserves_counts_and_references() {
        let mesh = sample_mesh();
        let json = to_json(&mesh).expect("serialize");
        let loaded = from_json(&json).expect("deserialize");

        assert_eq!(loaded.points().len(), mesh.points().len());
        assert_eq!(loaded.edges().len(), mesh.edges().len());
        assert_eq!(loaded.triangles().len(), mesh.triangles().len());
        assert_eq!(loaded.next_id(), mesh.next_id());
        assert_eq!(loaded.image_filename, mesh.image_filename);

        for (original, restored) in mesh.points().iter().zip(loaded.points()) {
            assert_eq!(original.id, restored.id);
            assert_eq!(original.position, restored.position);
        }
        for edge in loaded.edges() {
            assert!(loaded.point(edge.start).is_some());
            assert!(loaded.point(edge.end).is_some());
        }
        for triangle in loaded.triangles() {
            for id in triangle.points {
                assert!(loaded.point(id).is_some());
            }
        }
    }

    #[test]
    fn document_uses_the_agreed_field_names() {
        let json = to_json(&sample_mesh()).expect("serialize");
        for field in [
            "nextId",
            "imageFilename",
            "startPointId",
            "endPointId",
            "point1Id",
            "point2Id",
            "point3Id",
        ] {
            assert!(json.contains(field), "missing field {}", field);
        }
        // fills are transient
        assert!(!json.contains("fill"));
    }

    #[test]
    fn dangling_triangle_reference_fails_the_load() {
        let text = r#"{
            "nextId": 2,
            "points": [
                {"id": 0, "position": {"x": 0.0, "y": 0.0}},
                {"id": 1, "position": {"x": 5.0, "y": 0.0}}
            ],
            "edges": [],
            "triangles": [{"point1Id": 0, "point2Id": 1, "point3Id": 7}]
        }"#;

        let err = from_json(text).expect_err("load must fail");
        assert!(err.contains("unknown point id 7"), "got: {}", err);
    }

    #[test]
    fn dangling_edge_reference_fails_the_load() {
        let text = r#"{
            "nextId": 1,
            "points": [{"id": 0, "position": {"x": 0.0, "y": 0.0}}],
            "edges": [{"startPointId": 0, "endPointId": 3}],
            "triangles": []
        }"#;

        assert!(from_json(text).is_err());
    }

    #[test]
    fn image_filename_is_optional() {
        let text = r#"{"nextId": 0, "points": [], "edges": [], "triangles": []}"#;
        let mesh = from_json(text).expect("load");
        assert!(mesh.image_filename.is_none());
    }
}
