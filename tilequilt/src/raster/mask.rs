//! Colour-key transparency.

use image::RgbaImage;
use rayon::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Background colours of the NOAA chart panels. Pure white is the paper
/// colour outside the chart neatline.
pub const DEFAULT_COLOR_KEYS: &[ColorKey] = &[ColorKey::new(255, 255, 255)];

/// An RGB colour treated as background. Alpha is ignored when matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorKey {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorKey {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack into the low 24 bits so a pixel compares with one integer test.
    #[inline]
    const fn packed(&self) -> u32 {
        (self.r as u32) | ((self.g as u32) << 8) | ((self.b as u32) << 16)
    }
}

impl fmt::Display for ColorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for ColorKey {
    type Err = String;

    /// Parse `#rrggbb` or `rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("'{}' is not a colour of the form #rrggbb", s));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Ordered, duplicate-free list of colour keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorKeySet {
    keys: Vec<ColorKey>,
    packed: Vec<u32>,
}

impl ColorKeySet {
    /// Build a set, keeping first occurrences in order.
    pub fn new(keys: impl IntoIterator<Item = ColorKey>) -> Self {
        let mut set = Self::empty();
        for key in keys {
            if !set.keys.contains(&key) {
                set.packed.push(key.packed());
                set.keys.push(key);
            }
        }
        set
    }

    /// A set that matches nothing; masking then only clears alpha=0 pixels.
    pub fn empty() -> Self {
        Self {
            keys: Vec::new(),
            packed: Vec::new(),
        }
    }

    pub fn contains(&self, rgb: [u8; 3]) -> bool {
        self.packed
            .contains(&ColorKey::new(rgb[0], rgb[1], rgb[2]).packed())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorKey> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for ColorKeySet {
    fn default() -> Self {
        Self::new(DEFAULT_COLOR_KEYS.iter().copied())
    }
}

impl FromIterator<ColorKey> for ColorKeySet {
    fn from_iter<I: IntoIterator<Item = ColorKey>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Clear alpha on every pixel that matches a key colour.
///
/// Pixels already at alpha 0 stay there; all other pixels keep their alpha.
/// Returns `true` when at least one pixel is still visible afterwards.
/// Running it twice gives the same raster as running it once.
pub fn mask_color_keys(image: &mut RgbaImage, keys: &ColorKeySet) -> bool {
    let stride = image.width() as usize * 4;
    if stride == 0 {
        return false;
    }
    let packed = keys.packed.as_slice();
    let raw: &mut [u8] = image;

    raw.par_chunks_mut(stride)
        .map(|row| {
            let mut visible = false;
            for px in row.chunks_exact_mut(4) {
                let rgb = u32::from(px[0]) | (u32::from(px[1]) << 8) | (u32::from(px[2]) << 16);
                let keyed = packed.iter().fold(false, |hit, k| hit | (*k == rgb));
                px[3] *= u8::from(!keyed);
                visible |= px[3] != 0;
            }
            visible
        })
        .reduce(|| false, |a, b| a | b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const ORANGE: Rgba<u8> = Rgba([250, 200, 120, 255]);

    #[test]
    fn test_color_key_parse() {
        assert_eq!("#ff8000".parse::<ColorKey>().unwrap(), ColorKey::new(255, 128, 0));
        assert_eq!("0a0B0c".parse::<ColorKey>().unwrap(), ColorKey::new(10, 11, 12));
        assert!("#fff".parse::<ColorKey>().is_err());
        assert!("#gg0000".parse::<ColorKey>().is_err());
    }

    #[test]
    fn test_color_key_display() {
        assert_eq!(ColorKey::new(255, 128, 0).to_string(), "#ff8000");
    }

    #[test]
    fn test_set_dedups_in_order() {
        let set = ColorKeySet::new([
            ColorKey::new(1, 2, 3),
            ColorKey::new(4, 5, 6),
            ColorKey::new(1, 2, 3),
        ]);
        assert_eq!(set.len(), 2);
        let keys: Vec<_> = set.iter().copied().collect();
        assert_eq!(keys, vec![ColorKey::new(1, 2, 3), ColorKey::new(4, 5, 6)]);
        assert!(set.contains([4, 5, 6]));
        assert!(!set.contains([6, 5, 4]));
    }

    #[test]
    fn test_default_set_is_white() {
        let set = ColorKeySet::default();
        assert!(set.contains([255, 255, 255]));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_mask_clears_key_pixels_only() {
        let mut img = RgbaImage::from_pixel(4, 4, WHITE);
        img.put_pixel(1, 2, ORANGE);
        img.put_pixel(3, 3, Rgba([10, 20, 30, 128]));

        let visible = mask_color_keys(&mut img, &ColorKeySet::default());

        assert!(visible);
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
        assert_eq!(*img.get_pixel(1, 2), ORANGE);
        assert_eq!(*img.get_pixel(3, 3), Rgba([10, 20, 30, 128]));
    }

    #[test]
    fn test_mask_ignores_alpha_when_matching() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([255, 255, 255, 40]));
        let visible = mask_color_keys(&mut img, &ColorKeySet::default());
        assert!(!visible);
        assert!(img.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_mask_all_background_has_no_visible_data() {
        let mut img = RgbaImage::from_pixel(8, 8, WHITE);
        assert!(!mask_color_keys(&mut img, &ColorKeySet::default()));
        assert!(img.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_mask_with_empty_set_keeps_everything() {
        let mut img = RgbaImage::from_pixel(3, 3, WHITE);
        img.put_pixel(0, 0, Rgba([1, 1, 1, 0]));
        assert!(mask_color_keys(&mut img, &ColorKeySet::empty()));
        assert_eq!(*img.get_pixel(1, 1), WHITE);
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn test_mask_is_idempotent() {
        let keys = ColorKeySet::new([ColorKey::new(255, 255, 255), ColorKey::new(250, 200, 120)]);
        let mut img = RgbaImage::from_fn(16, 16, |x, y| match (x + y) % 4 {
            0 => WHITE,
            1 => ORANGE,
            2 => Rgba([x as u8 * 10, y as u8 * 10, 7, 200]),
            _ => Rgba([9, 9, 9, 0]),
        });

        let first_visible = mask_color_keys(&mut img, &keys);
        let once = img.clone();
        let second_visible = mask_color_keys(&mut img, &keys);

        assert_eq!(img, once);
        assert_eq!(first_visible, second_visible);
    }

    #[test]
    fn test_mask_non_square_tile() {
        let mut img = RgbaImage::from_pixel(5, 2, WHITE);
        img.put_pixel(4, 1, ORANGE);
        assert!(mask_color_keys(&mut img, &ColorKeySet::default()));
        assert_eq!(img.pixels().filter(|p| p.0[3] != 0).count(), 1);
    }

    #[test]
    fn test_mask_empty_image() {
        let mut img = RgbaImage::new(0, 0);
        assert!(!mask_color_keys(&mut img, &ColorKeySet::default()));
    }
}
