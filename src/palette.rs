//! Deduplicated color palette with usage tracking.
//!
//! The palette is a single ordered list of entries; each entry pairs a
//! color with the number of triangles currently wearing it. Order matters:
//! locked-mode snapping breaks distance ties by first-encountered entry.
//!
//! Two modes. Unlocked (authoring): sampled colors are admitted into the
//! palette and usage follows triangle edits. Locked: the color set is
//! frozen and samples snap to the nearest existing entry by Euclidean
//! RGB distance.

use crate::color::{bgra_to_rgba, Color};
use crate::mesh::Point;
use crate::sampler::sample_triangle;

/// Alpha applied to every sampled triangle color. The sampled alpha is
/// deliberately discarded; see [`sample_triangle`].
pub const DEFAULT_TRIANGLE_ALPHA: u8 = 200;

/// Returned when no source image is loaded, or when the palette is locked
/// but empty. Never enters the palette bookkeeping.
pub const PLACEHOLDER_COLOR: Color = Color::from_argb(128, 0xff, 0xff, 0xff);

#[derive(Debug, Clone, Copy)]
pub struct PaletteEntry {
    pub color: Color,
    pub usage: u32,
}

#[derive(Debug)]
struct PixelSource {
    rgba: Vec<u8>,
    width: u32,
    height: u32,
}

#[derive(Debug)]
pub struct PaletteManager {
    triangle_alpha: u8,
    locked: bool,
    entries: Vec<PaletteEntry>,
    source: Option<PixelSource>,
}

impl Default for PaletteManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PaletteManager {
    pub fn new() -> Self {
        Self {
            triangle_alpha: DEFAULT_TRIANGLE_ALPHA,
            locked: false,
            entries: Vec::new(),
            source: None,
        }
    }

    pub fn triangle_alpha(&self) -> u8 {
        self.triangle_alpha
    }

    pub fn set_triangle_alpha(&mut self, alpha: u8) {
        self.triangle_alpha = alpha;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn source_size(&self) -> Option<(u32, u32)> {
        self.source.as_ref().map(|s| (s.width, s.height))
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn colors(&self) -> Vec<Color> {
        self.entries.iter().map(|e| e.color).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Usage count for the entry matching `color`'s quantized key.
    pub fn usage(&self, color: Color) -> u32 {
        let key = color.key();
        self.entries
            .iter()
            .find(|e| e.color.key() == key)
            .map(|e| e.usage)
            .unwrap_or(0)
    }

    /// Install an RGBA pixel source. Clears the palette and unlocks.
    pub fn set_source_rgba(&mut self, rgba: Vec<u8>, width: u32, height: u32) -> Result<(), String> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(format!(
                "RGBA buffer size mismatch: got {} bytes, expected {} for {}x{}",
                rgba.len(),
                expected,
                width,
                height
            ));
        }

        self.source = Some(PixelSource {
            rgba,
            width,
            height,
        });
        self.entries.clear();
        self.locked = false;
        Ok(())
    }

    /// Install a wire-order B,G,R,A pixel source, translating to RGBA.
    pub fn set_source_bgra(&mut self, bgra: &[u8], width: u32, height: u32) -> Result<(), String> {
        let rgba = bgra_to_rgba(bgra)?;
        self.set_source_rgba(rgba, width, height)
    }

    /// Replace the palette wholesale, zeroing usage counts. Unlocks; the
    /// caller re-locks explicitly when freezing the new set.
    pub fn set_colors(&mut self, colors: &[Color]) {
        self.entries = colors
            .iter()
            .map(|c| PaletteEntry {
                color: *c,
                usage: 0,
            })
            .collect();
        self.locked = false;
    }

    /// Color for a triangle with the given corner positions.
    ///
    /// `previous_fill` is the color the triangle currently wears (if any);
    /// in unlocked mode a changed sample releases it. The returned color is
    /// the triangle's new fill and has already been counted.
    pub fn triangle_color(&mut self, corners: [Point; 3], previous_fill: Option<Color>) -> Color {
        let Some(source) = &self.source else {
            return PLACEHOLDER_COLOR;
        };
        if self.locked && self.entries.is_empty() {
            return PLACEHOLDER_COLOR;
        }

        let sampled = sample_triangle(
            corners,
            &source.rgba,
            source.width,
            source.height,
            self.triangle_alpha,
        );

        if self.locked {
            return self.snap_to_palette(sampled);
        }

        let key = sampled.key();
        let changed = previous_fill.map_or(true, |old| !old.rgb_eq(sampled));
        let tracked = self.entries.iter().any(|e| e.color.key() == key);

        if changed || !tracked {
            match self.entries.iter_mut().find(|e| e.color.rgb_eq(sampled)) {
                Some(entry) => entry.usage += 1,
                None => self.entries.push(PaletteEntry {
                    color: sampled,
                    usage: 1,
                }),
            }

            if let Some(old) = previous_fill {
                if !old.rgb_eq(sampled) {
                    self.release_color(old);
                }
            }
        }

        sampled
    }

    /// Nearest palette entry by Euclidean RGB distance; the first entry
    /// wins ties. Increments that entry's usage, never the palette itself.
    fn snap_to_palette(&mut self, sampled: Color) -> Color {
        let mut best = 0usize;
        let mut best_distance = f64::MAX;
        for (index, entry) in self.entries.iter().enumerate() {
            let distance = entry.color.distance(sampled);
            if distance < best_distance {
                best_distance = distance;
                best = index;
            }
        }

        self.entries[best].usage += 1;
        self.entries[best].color
    }

    /// Give back one usage of `color`. The entry disappears when its last
    /// usage is released.
    ///
    /// # Panics
    ///
    /// Releasing a color that is not tracked, or whose usage is already
    /// zero, is a bookkeeping bug in the caller and panics.
    pub fn release_color(&mut self, color: Color) {
        let key = color.key();
        let index = self
            .entries
            .iter()
            .position(|e| e.color.key() == key)
            .unwrap_or_else(|| panic!("released color {} is not in the palette", color.hex()));

        let entry = &mut self.entries[index];
        assert!(
            entry.usage > 0,
            "usage underflow releasing palette color {}",
            color.hex()
        );

        if entry.usage == 1 {
            self.entries.remove(index);
        } else {
            entry.usage -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn solid_source(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let mut out = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..(width * height) {
            out.extend_from_slice(&rgba);
        }
        out
    }

    /// 20x20 source: left half red, right half blue.
    fn split_source() -> Vec<u8> {
        let mut out = Vec::new();
        for _ in 0..20 {
            for x in 0..20 {
                out.extend_from_slice(if x < 10 { &RED } else { &BLUE });
            }
        }
        out
    }

    fn left_triangle() -> [Point; 3] {
        [
            Point::new(0.0, 0.0),
            Point::new(8.0, 0.0),
            Point::new(0.0, 8.0),
        ]
    }

    fn right_triangle() -> [Point; 3] {
        [
            Point::new(12.0, 0.0),
            Point::new(19.0, 0.0),
            Point::new(12.0, 8.0),
        ]
    }

    #[test]
    fn placeholder_when_no_source_is_loaded() {
        let mut palette = PaletteManager::new();
        let color = palette.triangle_color(left_triangle(), None);
        assert_eq!(color, PLACEHOLDER_COLOR);
        assert!(palette.is_empty());
    }

    #[test]
    fn placeholder_when_locked_and_empty() {
        let mut palette = PaletteManager::new();
        palette
            .set_source_rgba(solid_source(20, 20, RED), 20, 20)
            .unwrap();
        palette.lock();

        let color = palette.triangle_color(left_triangle(), None);
        assert_eq!(color, PLACEHOLDER_COLOR);
        assert!(palette.is_empty());
    }

    #[test]
    fn unlocked_sampling_admits_and_counts_colors() {
        let mut palette = PaletteManager::new();
        palette.set_source_rgba(split_source(), 20, 20).unwrap();

        let red = palette.triangle_color(left_triangle(), None);
        assert_eq!((red.r, red.g, red.b), (255, 0, 0));
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.usage(red), 1);

        // a second triangle over the same pixels reuses the entry
        let again = palette.triangle_color(left_triangle(), None);
        assert!(again.rgb_eq(red));
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.usage(red), 2);

        let blue = palette.triangle_color(right_triangle(), None);
        assert_eq!((blue.r, blue.g, blue.b), (0, 0, 255));
        assert_eq!(palette.len(), 2);
    }

    #[test]
    fn resampling_with_unchanged_color_leaves_usage_alone() {
        let mut palette = PaletteManager::new();
        palette.set_source_rgba(split_source(), 20, 20).unwrap();

        let red = palette.triangle_color(left_triangle(), None);
        let resampled = palette.triangle_color(left_triangle(), Some(red));
        assert!(resampled.rgb_eq(red));
        assert_eq!(palette.usage(red), 1);
    }

    #[test]
    fn changed_sample_releases_the_old_color() {
        let mut palette = PaletteManager::new();
        palette.set_source_rgba(split_source(), 20, 20).unwrap();

        let red = palette.triangle_color(left_triangle(), None);
        // the triangle drifts onto blue pixels; red had a single user
        let blue = palette.triangle_color(right_triangle(), Some(red));
        assert_eq!((blue.r, blue.g, blue.b), (0, 0, 255));
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.usage(red), 0);
        assert_eq!(palette.usage(blue), 1);
    }

    #[test]
    fn release_drops_entry_only_at_zero_usage() {
        let mut palette = PaletteManager::new();
        palette.set_source_rgba(split_source(), 20, 20).unwrap();

        let red = palette.triangle_color(left_triangle(), None);
        palette.triangle_color(left_triangle(), None);
        assert_eq!(palette.usage(red), 2);

        palette.release_color(red);
        assert_eq!(palette.usage(red), 1);
        assert_eq!(palette.len(), 1);

        palette.release_color(red);
        assert_eq!(palette.usage(red), 0);
        assert!(palette.is_empty());
    }

    #[test]
    #[should_panic(expected = "not in the palette")]
    fn releasing_untracked_color_panics() {
        let mut palette = PaletteManager::new();
        palette.release_color(Color::from_argb(200, 1, 2, 3));
    }

    #[test]
    fn locked_mode_snaps_without_mutating_the_palette() {
        let mut palette = PaletteManager::new();
        palette.set_source_rgba(split_source(), 20, 20).unwrap();

        let fixed = [
            Color::from_argb(200, 250, 10, 10),
            Color::from_argb(200, 10, 10, 250),
        ];
        palette.set_colors(&fixed);
        palette.lock();

        for _ in 0..5 {
            let snapped = palette.triangle_color(left_triangle(), None);
            assert!(snapped.rgb_eq(fixed[0]));
            assert_eq!(palette.len(), 2, "locked palette must not grow");
        }
        assert_eq!(palette.usage(fixed[0]), 5);
        assert_eq!(palette.usage(fixed[1]), 0);

        let snapped = palette.triangle_color(right_triangle(), None);
        assert!(snapped.rgb_eq(fixed[1]));
        assert_eq!(palette.len(), 2);
    }

    #[test]
    fn locked_snap_ties_go_to_the_first_entry() {
        let mut palette = PaletteManager::new();
        palette
            .set_source_rgba(solid_source(20, 20, [100, 0, 0, 255]), 20, 20)
            .unwrap();

        // both entries are equidistant from the sampled (100,0,0)
        let fixed = [
            Color::from_argb(200, 90, 0, 0),
            Color::from_argb(200, 110, 0, 0),
        ];
        palette.set_colors(&fixed);
        palette.lock();

        let snapped = palette.triangle_color(left_triangle(), None);
        assert!(snapped.rgb_eq(fixed[0]));
    }

    #[test]
    fn set_colors_clears_usage_and_unlocks() {
        let mut palette = PaletteManager::new();
        palette.set_source_rgba(split_source(), 20, 20).unwrap();
        let red = palette.triangle_color(left_triangle(), None);
        palette.lock();

        palette.set_colors(&[red]);
        assert!(!palette.is_locked());
        assert_eq!(palette.usage(red), 0);
        assert_eq!(palette.len(), 1);
    }

    #[test]
    fn new_source_clears_palette_state() {
        let mut palette = PaletteManager::new();
        palette.set_source_rgba(split_source(), 20, 20).unwrap();
        palette.triangle_color(left_triangle(), None);
        palette.lock();

        palette
            .set_source_rgba(solid_source(4, 4, RED), 4, 4)
            .unwrap();
        assert!(palette.is_empty());
        assert!(!palette.is_locked());
    }

    #[test]
    fn source_size_is_validated() {
        let mut palette = PaletteManager::new();
        assert!(palette.set_source_rgba(vec![0u8; 12], 2, 2).is_err());
        assert!(palette.set_source_bgra(&[0u8; 16], 2, 2).is_ok());
        assert_eq!(palette.source_size(), Some((2, 2)));
    }
}
