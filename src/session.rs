//! Editing session: the single active mesh + palette pair.
//!
//! Every operation that touches both sides of the system (triangle fills,
//! cascade removals, document load) goes through here, so mesh geometry
//! and palette bookkeeping can never drift apart. There is no global
//! state; callers own the session.

use crate::color::Color;
use crate::document;
use crate::mesh::{Mesh, Point, PointId};
use crate::ordering;
use crate::palette::{PaletteManager, PLACEHOLDER_COLOR};
use crate::svg;
use std::fs;
use std::path::Path;

#[derive(Debug, Default)]
pub struct Session {
    mesh: Mesh,
    palette: PaletteManager,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn palette(&self) -> &PaletteManager {
        &self.palette
    }

    /// Alpha applied to sampled triangle fills; takes effect on the next
    /// sample. Direct palette mutation stays inside the session so fills
    /// and usage counts cannot drift apart.
    pub fn set_triangle_alpha(&mut self, alpha: u8) {
        self.palette.set_triangle_alpha(alpha);
    }

    /// Decode a raster image from disk and make it the pixel source. The
    /// mesh keeps the filename and adopts the pixel bounds; the palette
    /// and every triangle fill are re-derived from the new pixels.
    pub fn load_image(&mut self, path: &Path) -> Result<(u32, u32), String> {
        let decoded = image::open(path)
            .map_err(|e| format!("Failed to decode image {}: {}", path.display(), e))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();

        self.palette.set_source_rgba(rgba.into_raw(), width, height)?;
        self.mesh.set_bounds(width as f64, height as f64);
        self.mesh.image_filename = Some(path.to_string_lossy().to_string());
        // Installing a source clears the palette; stale fills sampled from
        // the previous image were counted there and must not survive.
        self.refresh_fills();

        log::info!(
            "Loaded source image {} ({}x{})",
            path.display(),
            width,
            height
        );
        Ok((width, height))
    }

    /// Install a wire-order B,G,R,A buffer as the pixel source, for
    /// callers that already hold decoded pixels. Clears the palette and
    /// re-derives every triangle fill, like [`Session::load_image`].
    pub fn set_image_bgra(&mut self, bgra: &[u8], width: u32, height: u32) -> Result<(), String> {
        self.palette.set_source_bgra(bgra, width, height)?;
        self.mesh.set_bounds(width as f64, height as f64);
        self.refresh_fills();
        Ok(())
    }

    /// Install an already-decoded R,G,B,A buffer as the pixel source.
    pub fn set_image_rgba(&mut self, rgba: Vec<u8>, width: u32, height: u32) -> Result<(), String> {
        self.palette.set_source_rgba(rgba, width, height)?;
        self.mesh.set_bounds(width as f64, height as f64);
        self.refresh_fills();
        Ok(())
    }

    pub fn add_point(&mut self, position: Point) -> Option<PointId> {
        self.mesh.add_point(position)
    }

    pub fn add_edge(&mut self, start: PointId, end: PointId) -> bool {
        self.mesh.add_edge(start, end)
    }

    pub fn add_edge_to(&mut self, start: PointId, end: Point) -> Option<PointId> {
        self.mesh.add_edge_to(start, end)
    }

    /// Add a triangle between three existing points, sampling its fill
    /// from the pixels underneath. Duplicates (in any vertex order) are
    /// rejected before any palette bookkeeping happens.
    pub fn add_triangle(&mut self, p1: PointId, p2: PointId, p3: PointId) -> bool {
        if self.mesh.has_triangle(p1, p2, p3) {
            return false;
        }
        let (Some(c1), Some(c2), Some(c3)) = (
            self.mesh.position(p1),
            self.mesh.position(p2),
            self.mesh.position(p3),
        ) else {
            return false;
        };

        let fill = self.palette.triangle_color([c1, c2, c3], None);
        self.mesh.insert_triangle(p1, p2, p3, fill)
    }

    /// Remove a point, cascading to every edge and triangle that uses it.
    /// Each removed triangle's fill is released back to the palette.
    pub fn remove_point(&mut self, id: PointId) -> bool {
        if self.mesh.point(id).is_none() {
            return false;
        }

        let removed = self.mesh.remove_point(id);
        for triangle in &removed {
            if triangle.fill != PLACEHOLDER_COLOR {
                self.palette.release_color(triangle.fill);
            }
        }

        log::debug!(
            "Removed point {} along with {} triangle(s)",
            id,
            removed.len()
        );
        true
    }

    /// Move a point and re-sample the color of every triangle touching it,
    /// since the pixel region under each of those triangles changed.
    pub fn move_point(&mut self, id: PointId, position: Point) -> bool {
        if !self.mesh.move_point(id, position) {
            return false;
        }

        let affected: Vec<usize> = self
            .mesh
            .triangles()
            .iter()
            .enumerate()
            .filter(|(_, t)| t.uses(id))
            .map(|(index, _)| index)
            .collect();

        for index in affected {
            self.resample_triangle(index);
        }
        true
    }

    fn resample_triangle(&mut self, index: usize) {
        let triangle = self.mesh.triangles()[index];
        let Some(corners) = self.mesh.triangle_corners(&triangle) else {
            return;
        };

        // Placeholder fills were never counted, so they must not be
        // released either.
        let previous = (triangle.fill != PLACEHOLDER_COLOR).then_some(triangle.fill);
        let fill = self.palette.triangle_color(corners, previous);
        self.mesh.set_triangle_fill(index, fill);
    }

    /// Rebuild the palette from scratch: clear it, then re-derive every
    /// triangle's fill from the current pixels. Used after loading a
    /// document and after direct palette edits.
    pub fn refresh_fills(&mut self) {
        self.palette.set_colors(&[]);
        for index in 0..self.mesh.triangles().len() {
            let triangle = self.mesh.triangles()[index];
            let Some(corners) = self.mesh.triangle_corners(&triangle) else {
                continue;
            };
            let fill = self.palette.triangle_color(corners, None);
            self.mesh.set_triangle_fill(index, fill);
        }
    }

    /// Re-derive every triangle's fill against the current palette state
    /// without clearing it. With a locked palette this snaps every
    /// triangle onto the fixed color set.
    pub fn apply_palette(&mut self) {
        for index in 0..self.mesh.triangles().len() {
            self.resample_triangle(index);
        }
    }

    pub fn set_palette_locked(&mut self, locked: bool) {
        if locked {
            self.palette.lock();
        } else {
            self.palette.unlock();
        }
    }

    /// Collapse the selected palette colors into their average, lock the
    /// reduced palette and snap every triangle onto it. Returns the merged
    /// color, or `None` when the selection is empty.
    pub fn merge_palette_colors(&mut self, selection: &[Color]) -> Option<Color> {
        if selection.is_empty() {
            return None;
        }

        let merged = ordering::average(selection);
        let mut reduced: Vec<Color> = self
            .palette
            .colors()
            .into_iter()
            .filter(|c| !selection.iter().any(|s| s.rgb_eq(*c)))
            .collect();
        reduced.push(merged);
        let reduced = ordering::sort_colors(&reduced);

        self.palette.set_colors(&reduced);
        self.palette.lock();
        self.apply_palette();

        log::debug!(
            "Merged {} palette color(s) into {}",
            selection.len(),
            merged.hex()
        );
        Some(merged)
    }

    /// Palette colors in heuristic nearest-neighbor order for display.
    pub fn sorted_palette(&self) -> Vec<Color> {
        ordering::sort_colors(&self.palette.colors())
    }

    pub fn save_document(&mut self, path: &Path) -> Result<(), String> {
        let json = document::to_json(&self.mesh)?;
        fs::write(path, json).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;

        self.mesh.filename = Some(path.to_path_buf());
        log::info!("Saved mesh document {}", path.display());
        Ok(())
    }

    /// Replace the active mesh with a loaded document. The current mesh
    /// stays untouched unless the whole document parses and resolves; a
    /// missing source image is only a warning (fills fall back to the
    /// placeholder until one is loaded).
    pub fn load_document(&mut self, path: &Path) -> Result<(), String> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let mut mesh = document::from_json(&text)?;
        mesh.filename = Some(path.to_path_buf());

        self.mesh = mesh;
        self.palette = PaletteManager::new();

        if let Some(image_filename) = self.mesh.image_filename.clone() {
            if let Err(err) = self.load_image(Path::new(&image_filename)) {
                log::warn!("Source image unavailable after load: {}", err);
            }
        }
        self.refresh_fills();

        log::info!(
            "Loaded mesh document {} ({} points, {} edges, {} triangles)",
            path.display(),
            self.mesh.points().len(),
            self.mesh.edges().len(),
            self.mesh.triangles().len()
        );
        Ok(())
    }

    pub fn export_svg(&self, path: &Path) -> Result<(), String> {
        let svg = svg::mesh_to_svg(&self.mesh)?;
        fs::write(path, svg).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        log::info!("Exported SVG {}", path.display());
        Ok(())
    }
}
