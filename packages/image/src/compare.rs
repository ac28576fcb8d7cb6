//! Tolerant pixel comparison and diff rendering.
//!
//! Two captures of the same page rarely match byte for byte: font and edge
//! rasterization shifts anti-aliased pixels between runs. Loose mode (the
//! default) forgives that noise with a perceptual color metric plus an
//! anti-aliasing detector; strict mode demands exact channel equality.
//!
//! The color metric is the YIQ distance of Kotsarenko and Ramos; the
//! anti-aliasing detector is the intensity-slope check used by the
//! pixelmatch family of comparators: a differing pixel is forgiven when it
//! sits on a brightness slope whose darkest or brightest neighbour has
//! enough identical siblings in both images. The constants below are
//! tunables, not a hidden contract.

use crate::raster::write_atomic;
use crate::{Image, ImageError, Result};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default perceptual tolerance for loose comparison.
pub const DEFAULT_TOLERANCE: f64 = 0.1;

/// Default highlight color for diff images.
pub const DEFAULT_DIFF_COLOR: Rgba<u8> = Rgba([255, 0, 255, 255]);

/// Largest possible YIQ color delta; `tolerance` is scaled against it.
const MAX_YIQ_DELTA: f64 = 35215.0;

/// Options for [`compare`] and [`compare_rasters`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Disable all tolerance; any non-zero channel delta counts.
    pub strict: bool,
    /// Perceptual threshold (0.0-1.0) applied to the YIQ metric in loose
    /// mode. 0.1 absorbs typical font-rendering noise.
    pub tolerance: f64,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            strict: false,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl CompareOptions {
    /// Exact comparison, no tolerance.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }
}

/// Options for [`build_diff`].
#[derive(Debug, Clone)]
pub struct DiffOptions {
    pub reference: PathBuf,
    pub current: PathBuf,
    /// Where the rendered diff is written.
    pub diff: PathBuf,
    /// Highlight color for differing pixels.
    pub diff_color: Rgba<u8>,
    /// Rule used to flag pixels; the same rule `compare` applies.
    pub compare: CompareOptions,
}

impl DiffOptions {
    pub fn new(
        reference: impl Into<PathBuf>,
        current: impl Into<PathBuf>,
        diff: impl Into<PathBuf>,
    ) -> Self {
        Self {
            reference: reference.into(),
            current: current.into(),
            diff: diff.into(),
            diff_color: DEFAULT_DIFF_COLOR,
            compare: CompareOptions::default(),
        }
    }

    pub fn with_diff_color(mut self, color: Rgba<u8>) -> Self {
        self.diff_color = color;
        self
    }

    pub fn with_compare(mut self, compare: CompareOptions) -> Self {
        self.compare = compare;
        self
    }
}

/// Compare two PNG files.
///
/// Images of different dimensions are immediately not equal; no resizing
/// is attempted. Deterministic for identical inputs, no side effects.
pub async fn compare(
    path_a: impl AsRef<Path>,
    path_b: impl AsRef<Path>,
    opts: &CompareOptions,
) -> Result<bool> {
    let a = Image::open(path_a).await?;
    let b = Image::open(path_b).await?;
    Ok(compare_rasters(&a, &b, opts))
}

/// Compare two in-memory rasters under `opts`.
pub fn compare_rasters(a: &Image, b: &Image, opts: &CompareOptions) -> bool {
    if a.size() != b.size() {
        return false;
    }
    let (pa, pb) = (a.pixels(), b.pixels());
    let (width, height) = pa.dimensions();
    for y in 0..height {
        for x in 0..width {
            if pixel_differs(pa, pb, x, y, opts) {
                return false;
            }
        }
    }
    true
}

/// Positions flagged as differing under `opts`, row-major order.
///
/// This is the shared core of [`compare`] and [`build_diff`]; runners can
/// use it to report counts alongside the boolean verdict.
pub fn differing_pixels(a: &Image, b: &Image, opts: &CompareOptions) -> Result<Vec<(u32, u32)>> {
    if a.size() != b.size() {
        return Err(ImageError::DimensionMismatch {
            reference: a.size(),
            current: b.size(),
        });
    }
    Ok(flagged(a.pixels(), b.pixels(), opts))
}

/// Render the diff artifact for a mismatched pair.
///
/// Pixels equal under the comparison rule are copied verbatim from the
/// reference; differing pixels are painted `diff_color`. The raster is
/// encoded completely before the output path is touched and then moved
/// into place, so a failed run never leaves a partially rendered diff.
/// Identical inputs produce byte-identical output.
pub async fn build_diff(opts: &DiffOptions) -> Result<()> {
    let reference = Image::open(&opts.reference).await?;
    let current = Image::open(&opts.current).await?;

    if reference.size() != current.size() {
        return Err(ImageError::DimensionMismatch {
            reference: reference.size(),
            current: current.size(),
        });
    }

    let mut raster = reference.pixels().clone();
    for (x, y) in flagged(reference.pixels(), current.pixels(), &opts.compare) {
        raster.put_pixel(x, y, opts.diff_color);
    }

    let bytes = Image::from_rgba(raster).to_png_bytes()?;
    write_atomic(&opts.diff, &bytes).await
}

/// Parse a `#rrggbb` color, as runner configurations supply, into an
/// opaque RGBA pixel.
pub fn parse_hex_color(input: &str) -> Result<Rgba<u8>> {
    let hex = input.strip_prefix('#').unwrap_or(input);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ImageError::InvalidColor(input.to_string()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| ImageError::InvalidColor(input.to_string()))
    };
    Ok(Rgba([channel(0..2)?, channel(2..4)?, channel(4..6)?, 255]))
}

fn flagged(a: &RgbaImage, b: &RgbaImage, opts: &CompareOptions) -> Vec<(u32, u32)> {
    let (width, height) = a.dimensions();
    let mut positions = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if pixel_differs(a, b, x, y, opts) {
                positions.push((x, y));
            }
        }
    }
    positions
}

fn pixel_differs(a: &RgbaImage, b: &RgbaImage, x: u32, y: u32, opts: &CompareOptions) -> bool {
    let pa = a.get_pixel(x, y);
    let pb = b.get_pixel(x, y);
    if pa == pb {
        return false;
    }
    if opts.strict {
        return true;
    }
    let delta = color_delta(pa, pb);
    if delta <= opts.tolerance * opts.tolerance * MAX_YIQ_DELTA {
        return false;
    }
    // An over-threshold pixel still passes when either raster reads it as
    // an anti-aliasing artifact.
    !(antialiased(a, b, x, y) || antialiased(b, a, x, y))
}

/// Premultiply a channel against a white background.
fn blend(channel: u8, alpha: f64) -> f64 {
    255.0 + (f64::from(channel) - 255.0) * alpha
}

fn blended(px: &Rgba<u8>) -> (f64, f64, f64) {
    let alpha = f64::from(px[3]) / 255.0;
    (blend(px[0], alpha), blend(px[1], alpha), blend(px[2], alpha))
}

fn rgb2y(r: f64, g: f64, b: f64) -> f64 {
    r * 0.298_895_31 + g * 0.586_622_47 + b * 0.114_482_23
}

fn rgb2i(r: f64, g: f64, b: f64) -> f64 {
    r * 0.595_977_99 - g * 0.274_176_10 - b * 0.321_801_89
}

fn rgb2q(r: f64, g: f64, b: f64) -> f64 {
    r * 0.211_470_17 - g * 0.522_617_11 + b * 0.311_146_94
}

/// Squared YIQ distance between two pixels, alpha-blended onto white.
fn color_delta(pa: &Rgba<u8>, pb: &Rgba<u8>) -> f64 {
    if pa == pb {
        return 0.0;
    }
    let (r1, g1, b1) = blended(pa);
    let (r2, g2, b2) = blended(pb);
    let y = rgb2y(r1, g1, b1) - rgb2y(r2, g2, b2);
    let i = rgb2i(r1, g1, b1) - rgb2i(r2, g2, b2);
    let q = rgb2q(r1, g1, b1) - rgb2q(r2, g2, b2);
    0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q
}

/// Signed brightness difference between two pixels.
fn brightness_delta(pa: &Rgba<u8>, pb: &Rgba<u8>) -> f64 {
    let (r1, g1, b1) = blended(pa);
    let (r2, g2, b2) = blended(pb);
    rgb2y(r1, g1, b1) - rgb2y(r2, g2, b2)
}

/// Whether the pixel at (x, y) of `img` looks like an anti-aliased edge
/// pixel: it must sit on a brightness slope (both darker and brighter
/// neighbours, at most two equal ones), and the slope's extremum must have
/// more than two identical siblings in both images.
fn antialiased(img: &RgbaImage, other: &RgbaImage, x: u32, y: u32) -> bool {
    let (width, height) = img.dimensions();
    let x0 = x.saturating_sub(1);
    let y0 = y.saturating_sub(1);
    let x1 = (x + 1).min(width - 1);
    let y1 = (y + 1).min(height - 1);

    // A clipped neighbourhood counts as one equal sibling.
    let mut zeroes = u32::from(x == x0 || x == x1 || y == y0 || y == y1);
    let center = img.get_pixel(x, y);

    let mut min = 0.0_f64;
    let mut max = 0.0_f64;
    let mut min_pos = (x, y);
    let mut max_pos = (x, y);

    for nx in x0..=x1 {
        for ny in y0..=y1 {
            if nx == x && ny == y {
                continue;
            }
            let delta = brightness_delta(center, img.get_pixel(nx, ny));
            if delta == 0.0 {
                zeroes += 1;
                if zeroes > 2 {
                    return false;
                }
            } else if delta < min {
                min = delta;
                min_pos = (nx, ny);
            } else if delta > max {
                max = delta;
                max_pos = (nx, ny);
            }
        }
    }

    // Not on a slope: all neighbours fall on one side of the center.
    if min == 0.0 || max == 0.0 {
        return false;
    }

    (has_many_siblings(img, min_pos.0, min_pos.1) && has_many_siblings(other, min_pos.0, min_pos.1))
        || (has_many_siblings(img, max_pos.0, max_pos.1)
            && has_many_siblings(other, max_pos.0, max_pos.1))
}

/// Whether the pixel has more than two exactly-equal neighbours.
fn has_many_siblings(img: &RgbaImage, x: u32, y: u32) -> bool {
    let (width, height) = img.dimensions();
    let x0 = x.saturating_sub(1);
    let y0 = y.saturating_sub(1);
    let x1 = (x + 1).min(width - 1);
    let y1 = (y + 1).min(height - 1);

    let mut zeroes = u32::from(x == x0 || x == x1 || y == y0 || y == y1);
    let center = img.get_pixel(x, y);

    for nx in x0..=x1 {
        for ny in y0..=y1 {
            if nx == x && ny == y {
                continue;
            }
            if img.get_pixel(nx, ny) == center {
                zeroes += 1;
                if zeroes > 2 {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> Image {
        Image::from_rgba(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    #[test]
    fn test_identical_rasters_compare_equal() {
        let img = solid(4, 4, [10, 20, 30, 255]);
        assert!(compare_rasters(&img, &img, &CompareOptions::default()));
        assert!(compare_rasters(&img, &img, &CompareOptions::strict()));
    }

    #[test]
    fn test_clear_difference_fails_both_modes() {
        let a = solid(4, 4, [255, 255, 255, 255]);
        let b = solid(4, 4, [0, 0, 0, 255]);
        assert!(!compare_rasters(&a, &b, &CompareOptions::default()));
        assert!(!compare_rasters(&a, &b, &CompareOptions::strict()));
    }

    #[test]
    fn test_sub_threshold_shift_is_loose_equal_strict_unequal() {
        let a = solid(4, 4, [100, 100, 100, 255]);
        let b = solid(4, 4, [103, 102, 101, 255]);
        assert!(compare_rasters(&a, &b, &CompareOptions::default()));
        assert!(!compare_rasters(&a, &b, &CompareOptions::strict()));
    }

    #[test]
    fn test_comparison_is_symmetric() {
        let a = solid(4, 4, [100, 100, 100, 255]);
        let b = solid(4, 4, [103, 102, 101, 255]);
        for opts in [CompareOptions::default(), CompareOptions::strict()] {
            assert_eq!(
                compare_rasters(&a, &b, &opts),
                compare_rasters(&b, &a, &opts)
            );
        }
    }

    #[test]
    fn test_dimension_mismatch_is_not_equal() {
        let a = solid(4, 4, [0, 0, 0, 255]);
        let b = solid(4, 5, [0, 0, 0, 255]);
        assert!(!compare_rasters(&a, &b, &CompareOptions::default()));
    }

    #[test]
    fn test_differing_pixels_rejects_dimension_mismatch() {
        let a = solid(4, 4, [0, 0, 0, 255]);
        let b = solid(4, 5, [0, 0, 0, 255]);
        let err = differing_pixels(&a, &b, &CompareOptions::default()).unwrap_err();
        assert!(matches!(err, ImageError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_differing_pixels_reports_positions() {
        let a = solid(4, 4, [255, 255, 255, 255]);
        let mut pixels = a.pixels().clone();
        pixels.put_pixel(2, 1, Rgba([0, 0, 0, 255]));
        let b = Image::from_rgba(pixels);

        let flagged = differing_pixels(&a, &b, &CompareOptions::strict()).unwrap();
        assert_eq!(flagged, vec![(2, 1)]);
    }

    #[test]
    fn test_tolerance_zero_still_allows_exact_match() {
        let img = solid(4, 4, [50, 50, 50, 255]);
        let opts = CompareOptions {
            strict: false,
            tolerance: 0.0,
        };
        assert!(compare_rasters(&img, &img, &opts));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#f0001c").unwrap(), Rgba([240, 0, 28, 255]));
        assert_eq!(parse_hex_color("0000ff").unwrap(), Rgba([0, 0, 255, 255]));
        assert!(parse_hex_color("#f00").is_err());
        assert!(parse_hex_color("#zzzzzz").is_err());
    }
}
