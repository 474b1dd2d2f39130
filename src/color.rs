use serde::{Deserialize, Serialize};

/// 8-bit ARGB color value.
///
/// Palette identity is the R,G,B triple; alpha rides along for rendering
/// but never participates in deduplication or distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Quantized palette key: R,G,B packed into an integer, alpha excluded.
    pub fn key(&self) -> u32 {
        ((self.r as u32) << 24) + ((self.g as u32) << 16) + ((self.b as u32) << 8)
    }

    /// Exact R,G,B equality, ignoring alpha.
    pub fn rgb_eq(&self, other: Color) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }

    /// Euclidean distance in 8-bit RGB space.
    pub fn distance(&self, other: Color) -> f64 {
        let dr = self.r as f64 - other.r as f64;
        let dg = self.g as f64 - other.g as f64;
        let db = self.b as f64 - other.b as f64;
        (dr * dr + dg * dg + db * db).sqrt()
    }

    /// 6-hex-digit RGB string for vector export. Alpha is not encoded.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Translate a wire-order B,G,R,A buffer into the R,G,B,A layout the rest
/// of the crate works with. The input length must be a multiple of 4.
pub fn bgra_to_rgba(bgra: &[u8]) -> Result<Vec<u8>, String> {
    if bgra.len() % 4 != 0 {
        return Err(format!(
            "BGRA buffer length {} is not a multiple of 4",
            bgra.len()
        ));
    }

    let mut rgba = Vec::with_capacity(bgra.len());
    for pixel in bgra.chunks_exact(4) {
        rgba.push(pixel[2]);
        rgba.push(pixel[1]);
        rgba.push(pixel[0]);
        rgba.push(pixel[3]);
    }
    Ok(rgba)
}
