//! Pixel implementation of the CSS filter functions.
//!
//! Formulas follow Filter Effects Module Level 1. Colour functions operate
//! on straight (non-premultiplied) sRGB values normalized to 0..1; blur
//! works premultiplied. Each function's output
//! is clamped to 0..1 before the next one runs, as a chain of filter
//! primitives would be.
//!
//! Consecutive per-pixel functions are evaluated in one pass at `f32`
//! precision so a long chain does not accumulate 8-bit rounding; blur breaks
//! the run because it needs the whole neighbourhood.

use super::FilterFunction;
use crate::decode::CHANNELS;

type Matrix = [[f32; 3]; 3];

/// Apply an effect chain to an RGBA buffer in place.
///
/// # Arguments
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `width` - Buffer width in pixels
/// * `height` - Buffer height in pixels
/// * `functions` - Parsed effect chain, applied left to right
pub fn apply_effect_chain(pixels: &mut [u8], width: u32, height: u32, functions: &[FilterFunction]) {
    debug_assert_eq!(
        pixels.len(),
        width as usize * height as usize * CHANNELS,
        "Pixel buffer size mismatch"
    );

    let mut start = 0;
    while start < functions.len() {
        if let FilterFunction::Blur(radius) = functions[start] {
            apply_blur(pixels, width, height, radius);
            start += 1;
            continue;
        }

        let end = functions[start..]
            .iter()
            .position(|f| matches!(f, FilterFunction::Blur(_)))
            .map_or(functions.len(), |offset| start + offset);
        apply_color_run(pixels, &functions[start..end]);
        start = end;
    }
}

fn apply_color_run(pixels: &mut [u8], run: &[FilterFunction]) {
    if run.iter().all(FilterFunction::is_identity) {
        return;
    }

    for chunk in pixels.chunks_exact_mut(CHANNELS) {
        let mut rgb = [
            chunk[0] as f32 / 255.0,
            chunk[1] as f32 / 255.0,
            chunk[2] as f32 / 255.0,
        ];
        let mut alpha = chunk[3] as f32 / 255.0;

        for function in run {
            apply_to_pixel(function, &mut rgb, &mut alpha);
        }

        chunk[0] = to_byte(rgb[0]);
        chunk[1] = to_byte(rgb[1]);
        chunk[2] = to_byte(rgb[2]);
        chunk[3] = to_byte(alpha);
    }
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
fn apply_to_pixel(function: &FilterFunction, rgb: &mut [f32; 3], alpha: &mut f32) {
    match *function {
        FilterFunction::Brightness(slope) => {
            for c in rgb.iter_mut() {
                *c = (*c * slope).clamp(0.0, 1.0);
            }
        }
        FilterFunction::Contrast(slope) => {
            let intercept = 0.5 - 0.5 * slope;
            for c in rgb.iter_mut() {
                *c = (*c * slope + intercept).clamp(0.0, 1.0);
            }
        }
        FilterFunction::Invert(amount) => {
            let a = amount.clamp(0.0, 1.0);
            for c in rgb.iter_mut() {
                *c = a + *c * (1.0 - 2.0 * a);
            }
        }
        FilterFunction::Opacity(amount) => {
            *alpha *= amount.clamp(0.0, 1.0);
        }
        FilterFunction::Saturate(s) => *rgb = multiply(&saturate_matrix(s), rgb),
        FilterFunction::Grayscale(a) => *rgb = multiply(&grayscale_matrix(a), rgb),
        FilterFunction::Sepia(a) => *rgb = multiply(&sepia_matrix(a), rgb),
        FilterFunction::HueRotate(deg) => *rgb = multiply(&hue_rotate_matrix(deg), rgb),
        FilterFunction::Blur(_) => {}
    }
}

#[inline]
fn multiply(m: &Matrix, rgb: &[f32; 3]) -> [f32; 3] {
    let mut out = [0.0; 3];
    for (row, value) in m.iter().zip(out.iter_mut()) {
        *value = (row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2]).clamp(0.0, 1.0);
    }
    out
}

fn saturate_matrix(s: f32) -> Matrix {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn grayscale_matrix(amount: f32) -> Matrix {
    let k = 1.0 - amount.clamp(0.0, 1.0);
    [
        [0.2126 + 0.7874 * k, 0.7152 - 0.7152 * k, 0.0722 - 0.0722 * k],
        [0.2126 - 0.2126 * k, 0.7152 + 0.2848 * k, 0.0722 - 0.0722 * k],
        [0.2126 - 0.2126 * k, 0.7152 - 0.7152 * k, 0.0722 + 0.9278 * k],
    ]
}

fn sepia_matrix(amount: f32) -> Matrix {
    let k = 1.0 - amount.clamp(0.0, 1.0);
    [
        [0.393 + 0.607 * k, 0.769 - 0.769 * k, 0.189 - 0.189 * k],
        [0.349 - 0.349 * k, 0.686 + 0.314 * k, 0.168 - 0.168 * k],
        [0.272 - 0.272 * k, 0.534 - 0.534 * k, 0.131 + 0.869 * k],
    ]
}

fn hue_rotate_matrix(degrees: f32) -> Matrix {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

/// Gaussian blur with standard deviation equal to the radius in pixels.
///
/// Runs on premultiplied values over a transparent border wide enough for the
/// kernel, so colour does not bleed toward black next to transparent pixels
/// and the image edges fade out instead of being clamped.
fn apply_blur(pixels: &mut [u8], width: u32, height: u32, radius: f32) {
    if radius <= 0.0 || width == 0 || height == 0 {
        return;
    }
    let margin = (radius * 3.0).ceil() as u32 + 1;

    let mut padded = image::Rgba32FImage::new(width + 2 * margin, height + 2 * margin);
    for (i, chunk) in pixels.chunks_exact(CHANNELS).enumerate() {
        let (x, y) = (i as u32 % width, i as u32 / width);
        let alpha = chunk[3] as f32 / 255.0;
        padded.put_pixel(
            x + margin,
            y + margin,
            image::Rgba([
                chunk[0] as f32 / 255.0 * alpha,
                chunk[1] as f32 / 255.0 * alpha,
                chunk[2] as f32 / 255.0 * alpha,
                alpha,
            ]),
        );
    }

    let blurred = image::imageops::blur(&padded, radius);

    for (i, chunk) in pixels.chunks_exact_mut(CHANNELS).enumerate() {
        let (x, y) = (i as u32 % width, i as u32 / width);
        let [r, g, b, alpha] = blurred.get_pixel(x + margin, y + margin).0;
        let alpha_byte = to_byte(alpha);
        if alpha_byte == 0 {
            chunk.copy_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        chunk[0] = to_byte(r / alpha);
        chunk[1] = to_byte(g / alpha);
        chunk[2] = to_byte(b / alpha);
        chunk[3] = alpha_byte;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(rgba: [u8; 4], functions: &[FilterFunction]) -> [u8; 4] {
        let mut pixels = rgba.to_vec();
        apply_effect_chain(&mut pixels, 1, 1, functions);
        [pixels[0], pixels[1], pixels[2], pixels[3]]
    }

    #[test]
    fn test_empty_chain_is_noop() {
        assert_eq!(single([12, 34, 56, 78], &[]), [12, 34, 56, 78]);
    }

    #[test]
    fn test_identity_chain_is_exact() {
        let chain = [
            FilterFunction::Brightness(1.0),
            FilterFunction::Contrast(1.0),
            FilterFunction::Saturate(1.0),
            FilterFunction::HueRotate(0.0),
        ];
        assert_eq!(single([200, 100, 50, 255], &chain), [200, 100, 50, 255]);
    }

    #[test]
    fn test_brightness_scales_channels() {
        assert_eq!(
            single([100, 50, 200, 255], &[FilterFunction::Brightness(1.2)]),
            [120, 60, 240, 255]
        );
        // Clamped at white
        assert_eq!(
            single([250, 250, 250, 255], &[FilterFunction::Brightness(2.0)]),
            [255, 255, 255, 255]
        );
    }

    #[test]
    fn test_contrast_pivots_on_midpoint() {
        // contrast(0) collapses to mid grey
        assert_eq!(
            single([0, 255, 30, 255], &[FilterFunction::Contrast(0.0)]),
            [128, 128, 128, 255]
        );
        let out = single([255, 0, 128, 255], &[FilterFunction::Contrast(0.8)]);
        assert!((out[0] as i32 - 230).abs() <= 1, "{:?}", out); // 0.9
        assert!((out[1] as i32 - 26).abs() <= 1, "{:?}", out); // 0.1
    }

    #[test]
    fn test_invert() {
        assert_eq!(
            single([0, 255, 55, 255], &[FilterFunction::Invert(1.0)]),
            [255, 0, 200, 255]
        );
        assert_eq!(
            single([0, 255, 55, 255], &[FilterFunction::Invert(0.0)]),
            [0, 255, 55, 255]
        );
    }

    #[test]
    fn test_full_grayscale_equalizes_channels() {
        let out = single([255, 0, 0, 255], &[FilterFunction::Grayscale(1.0)]);
        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);
        assert_eq!(out[0], 54); // 0.2126 * 255
    }

    #[test]
    fn test_saturate_zero_is_greyscale() {
        let out = single([10, 200, 90, 255], &[FilterFunction::Saturate(0.0)]);
        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);
    }

    #[test]
    fn test_sepia_full() {
        let out = single([255, 255, 255, 255], &[FilterFunction::Sepia(1.0)]);
        // Row sums above 1 clamp; blue row sums to 0.937
        assert_eq!(out[0], 255);
        assert_eq!(out[1], 255);
        assert_eq!(out[2], 239);
    }

    #[test]
    fn test_hue_rotate_full_turn_is_identity() {
        let out = single([200, 40, 90, 255], &[FilterFunction::HueRotate(360.0)]);
        for (a, b) in out.iter().zip([200u8, 40, 90, 255].iter()) {
            assert!((*a as i32 - *b as i32).abs() <= 1);
        }
    }

    #[test]
    fn test_hue_rotate_moves_red() {
        let out = single([255, 0, 0, 255], &[FilterFunction::HueRotate(120.0)]);
        assert!(out[1] > out[0], "red should shift toward green: {:?}", out);
    }

    #[test]
    fn test_opacity_only_touches_alpha() {
        assert_eq!(
            single([10, 20, 30, 200], &[FilterFunction::Opacity(0.5)]),
            [10, 20, 30, 100]
        );
    }

    #[test]
    fn test_order_matters() {
        let a = single(
            [100, 100, 100, 255],
            &[FilterFunction::Brightness(3.0), FilterFunction::Contrast(0.5)],
        );
        let b = single(
            [100, 100, 100, 255],
            &[FilterFunction::Contrast(0.5), FilterFunction::Brightness(3.0)],
        );
        assert_ne!(a, b);
    }

    #[test]
    fn test_blur_spreads_energy() {
        let (w, h) = (9u32, 9u32);
        let mut pixels = vec![0u8; (w * h) as usize * CHANNELS];
        for chunk in pixels.chunks_exact_mut(CHANNELS) {
            chunk[3] = 255;
        }
        let center = ((4 * w + 4) as usize) * CHANNELS;
        pixels[center] = 255;

        apply_effect_chain(&mut pixels, w, h, &[FilterFunction::Blur(1.5)]);

        assert!(pixels[center] < 255, "peak should be spread out");
        let neighbour = ((4 * w + 5) as usize) * CHANNELS;
        assert!(pixels[neighbour] > 0, "neighbour should receive energy");
    }

    #[test]
    fn test_blur_zero_is_noop() {
        let mut pixels = vec![7u8; 4 * 4 * CHANNELS];
        let original = pixels.clone();
        apply_effect_chain(&mut pixels, 4, 4, &[FilterFunction::Blur(0.0)]);
        assert_eq!(pixels, original);
    }

    #[test]
    fn test_color_runs_around_blur() {
        // invert, blur (uniform image: no change), invert again
        let mut pixels = vec![40u8; 3 * 3 * CHANNELS];
        for chunk in pixels.chunks_exact_mut(CHANNELS) {
            chunk[3] = 255;
        }
        apply_effect_chain(
            &mut pixels,
            3,
            3,
            &[
                FilterFunction::Invert(1.0),
                FilterFunction::Blur(1.0),
                FilterFunction::Invert(1.0),
            ],
        );
        assert!(pixels
            .chunks_exact(CHANNELS)
            .all(|p| (p[0] as i32 - 40).abs() <= 1));
    }

    #[test]
    fn test_blur_keeps_hue_next_to_transparency() {
        let red = [255u8, 0, 0, 255];
        let clear = [0u8, 0, 0, 0];
        let mut pixels: Vec<u8> = [red, red, red, clear, clear, clear].concat();

        apply_effect_chain(&mut pixels, 6, 1, &[FilterFunction::Blur(1.0)]);

        let alphas: Vec<u8> = pixels.chunks_exact(CHANNELS).map(|p| p[3]).collect();
        assert!(alphas[3] > 0, "alpha should spread right: {:?}", alphas);
        assert!(alphas[2] < 255, "alpha should fall off at the boundary: {:?}", alphas);
        for p in pixels.chunks_exact(CHANNELS).filter(|p| p[3] > 0) {
            assert_eq!(&p[..3], &[255, 0, 0], "{:?}", pixels);
        }
    }

    #[test]
    fn test_blur_fades_image_edges() {
        let mut pixels = vec![255u8; 5 * 5 * CHANNELS];

        apply_effect_chain(&mut pixels, 5, 5, &[FilterFunction::Blur(2.0)]);

        let corner = &pixels[..CHANNELS];
        assert!(corner[3] < 255, "corner should become translucent: {:?}", corner);
        assert_eq!(&corner[..3], &[255, 255, 255]);
        let center = &pixels[12 * CHANNELS..13 * CHANNELS];
        assert!(center[3] > corner[3]);
    }
}
