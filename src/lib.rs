//! Low-poly image tracing engine.
//!
//! A caller traces a triangle mesh over a raster image; each triangle gets
//! a flat color averaged from the pixels underneath it. The crate owns the
//! mesh graph, the pixel sampler, the deduplicating/lockable color palette
//! and the palette-ordering heuristic, plus the persisted document format
//! and SVG export. Rendering and interaction stay with the caller, driven
//! through [`Session`].
//!
//! ```no_run
//! use lowpoly::{Point, Session};
//!
//! let mut session = Session::new();
//! session.load_image(std::path::Path::new("portrait.png"))?;
//!
//! let a = session.add_point(Point::new(10.0, 10.0)).unwrap();
//! let b = session.add_point(Point::new(60.0, 12.0)).unwrap();
//! let c = session.add_point(Point::new(30.0, 70.0)).unwrap();
//! session.add_triangle(a, b, c);
//!
//! session.export_svg(std::path::Path::new("portrait.svg"))?;
//! # Ok::<(), String>(())
//! ```

pub mod color;
pub mod document;
pub mod mesh;
pub mod ordering;
pub mod palette;
pub mod sampler;
pub mod session;
pub mod svg;

pub use color::Color;
pub use mesh::{GraphEdge, GraphPoint, GraphTriangle, Mesh, Point, PointId};
pub use palette::{PaletteManager, DEFAULT_TRIANGLE_ALPHA, PLACEHOLDER_COLOR};
pub use session::Session;
