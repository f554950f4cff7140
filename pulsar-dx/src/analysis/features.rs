//! Feature extraction: raw bytes to fingerprint and pixel statistics

use super::{AnalysisError, Fingerprint};
use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use std::ops::Range;

/// Rows and columns of the texture partition
pub const GRID_ROWS: u32 = 2;
pub const GRID_COLS: u32 = 4;

/// Keeps `log2` finite for black pixels
const ENTROPY_EPSILON: f64 = 1e-7;

/// Decoded upload plus its fingerprint
#[derive(Debug, Clone)]
pub struct ImageSample {
    pub fingerprint: Fingerprint,
    pub intensities: GrayImage,
}

impl ImageSample {
    /// Decode `bytes` into a single-channel intensity matrix
    ///
    /// The fingerprint covers the bytes as received, so a re-encoded copy
    /// of the same picture is a different sample.
    pub fn decode(bytes: &[u8]) -> Result<Self, AnalysisError> {
        let fingerprint = Fingerprint::of(bytes);
        let decoded = image::load_from_memory(bytes)?;

        let (width, height) = (decoded.width(), decoded.height());
        if width == 0 || height == 0 {
            return Err(AnalysisError::EmptyImage { width, height });
        }

        Ok(Self {
            fingerprint,
            intensities: to_luminance(&to_rgb8_clipped(&decoded)),
        })
    }
}

/// 8-bit RGB view of a decoded raster
///
/// Wide grayscale and float samples are clipped to 255 instead of being
/// rescaled, so a 16-bit scan with values above 255 reads as saturated.
/// 16-bit colour keeps the high byte of each channel.
fn to_rgb8_clipped(decoded: &DynamicImage) -> RgbImage {
    let (width, height) = (decoded.width(), decoded.height());
    match decoded {
        DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA16(_) => {
            let gray = decoded.to_luma16();
            RgbImage::from_fn(width, height, |x, y| {
                let v = gray.get_pixel(x, y).0[0].min(255) as u8;
                Rgb([v, v, v])
            })
        }
        DynamicImage::ImageRgb16(_) | DynamicImage::ImageRgba16(_) => {
            let rgb = decoded.to_rgb16();
            RgbImage::from_fn(width, height, |x, y| {
                Rgb(rgb.get_pixel(x, y).0.map(|c| (c >> 8) as u8))
            })
        }
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            let rgb = decoded.to_rgb32f();
            RgbImage::from_fn(width, height, |x, y| {
                Rgb(rgb.get_pixel(x, y).0.map(|c| c.clamp(0.0, 255.0).round() as u8))
            })
        }
        _ => decoded.to_rgb8(),
    }
}

/// ITU-R 601-2 luma in fixed point, identical to the usual `L` conversion
/// of 8-bit RGB
fn to_luminance(rgb: &RgbImage) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let l = (u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471 + 0x8000) >> 16;
        image::Luma([l as u8])
    })
}

/// Pixel statistics driving every downstream decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    /// Mean intensity, 0..=255
    pub brightness: f64,
    /// Sum of the standard deviations of the 2x4 sub-regions
    pub complexity: f64,
    /// `-sum(p * log2(p + eps)) / pixel_count` with `p = intensity / 255`
    pub entropy: f64,
}

impl FeatureVector {
    pub fn extract(image: &GrayImage) -> Self {
        Self {
            brightness: brightness(image),
            complexity: complexity(image),
            entropy: entropy(image),
        }
    }
}

fn brightness(image: &GrayImage) -> f64 {
    let pixels = image.as_raw();
    if pixels.is_empty() {
        return 0.0;
    }
    let sum: u64 = pixels.iter().map(|&v| u64::from(v)).sum();
    sum as f64 / pixels.len() as f64
}

/// Bounds are `i*h/2 .. (i+1)*h/2` and `j*w/4 .. (j+1)*w/4`, so trailing
/// rows/columns are dropped when the size isn't divisible
fn complexity(image: &GrayImage) -> f64 {
    let (width, height) = image.dimensions();
    let mut total = 0.0;
    for i in 0..GRID_ROWS {
        let (y0, y1) = (i * height / GRID_ROWS, (i + 1) * height / GRID_ROWS);
        for j in 0..GRID_COLS {
            let (x0, x1) = (j * width / GRID_COLS, (j + 1) * width / GRID_COLS);
            total += region_std_dev(image, x0..x1, y0..y1);
        }
    }
    total
}

/// Population standard deviation; an empty region contributes 0
fn region_std_dev(image: &GrayImage, xs: Range<u32>, ys: Range<u32>) -> f64 {
    let count = u64::from(xs.end - xs.start) * u64::from(ys.end - ys.start);
    if count == 0 {
        return 0.0;
    }

    let mut sum = 0.0;
    for y in ys.clone() {
        for x in xs.clone() {
            sum += f64::from(image.get_pixel(x, y).0[0]);
        }
    }
    let mean = sum / count as f64;

    let mut squares = 0.0;
    for y in ys {
        for x in xs.clone() {
            let delta = f64::from(image.get_pixel(x, y).0[0]) - mean;
            squares += delta * delta;
        }
    }
    (squares / count as f64).sqrt()
}

fn entropy(image: &GrayImage) -> f64 {
    let pixels = image.as_raw();
    if pixels.is_empty() {
        return 0.0;
    }

    let mut histogram = [0u64; 256];
    for &v in pixels {
        histogram[v as usize] += 1;
    }

    let sum: f64 = histogram
        .iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .map(|(value, &count)| {
            let p = value as f64 / 255.0;
            count as f64 * p * (p + ENTROPY_EPSILON).log2()
        })
        .sum();

    -sum / pixels.len() as f64
}
