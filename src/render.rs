//! EAN-13 symbol rasterization, zoom and PNG export.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{GrayImage, ImageFormat, Luma};
use rusttype::Font;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{
    BAR_HEIGHT, EAN13_MODULES, MARGIN, MAX_BAR_HEIGHT, MAX_MARGIN, MAX_MODULE_WIDTH, MAX_TEXT_PX,
    MAX_ZOOM_WIDTH, MODULE_WIDTH, TEXT_PX,
};
use crate::ean13::Ean13;
use crate::error::RenderError;
use crate::graphics::{overlay_black, render_digits_1bit, render_line_tight_1bit};

// L-set patterns, 7 modules each, MSB first. R = !L, G = reverse(R).
const L_CODES: [u8; 10] = [
    0b0001101, 0b0011001, 0b0010011, 0b0111101, 0b0100011,
    0b0110001, 0b0101111, 0b0111011, 0b0110111, 0b0001011,
];

// First digit → parity of the six left digits (true = G set)
const PARITY: [[bool; 6]; 10] = [
    [false, false, false, false, false, false],
    [false, false, true, false, true, true],
    [false, false, true, true, false, true],
    [false, false, true, true, true, false],
    [false, true, false, false, true, true],
    [false, true, true, false, false, true],
    [false, true, true, true, false, false],
    [false, true, false, true, false, true],
    [false, true, false, true, true, false],
    [false, true, true, false, true, false],
];

const START_GUARD: [bool; 3] = [true, false, true];
const CENTER_GUARD: [bool; 5] = [false, true, false, true, false];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Pixels per module
    pub module_width: u32,
    pub bar_height: u32,
    pub margin: u32,
    pub font_size: f32,
    /// Draw the digits under the bars
    pub show_text: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            module_width: MODULE_WIDTH,
            bar_height: BAR_HEIGHT,
            margin: MARGIN,
            font_size: TEXT_PX,
            show_text: true,
        }
    }
}

/// The 95 bar/space modules of `code`, `true` = bar.
pub fn encode_modules(code: &Ean13) -> [bool; EAN13_MODULES as usize] {
    let digits = code.digits();
    let parity = PARITY[digits[0] as usize];

    let mut out = [false; EAN13_MODULES as usize];
    let mut pos = 0;
    let mut put = |bits: &[bool]| {
        out[pos..pos + bits.len()].copy_from_slice(bits);
        pos += bits.len();
    };

    put(&START_GUARD);
    for (i, &d) in digits[1..7].iter().enumerate() {
        let pattern = if parity[i] { g_code(d) } else { L_CODES[d as usize] };
        put(&pattern_bits(pattern));
    }
    put(&CENTER_GUARD);
    for &d in &digits[7..] {
        put(&pattern_bits(r_code(d)));
    }
    put(&START_GUARD);
    out
}

/// Guard bars run longer than data bars.
pub fn is_guard_module(index: usize) -> bool {
    index < 3 || (45..50).contains(&index) || index >= 92
}

/// Draw `code` as a 1-bit image.
/// With `show_text`, the digits go under the bars in `font`, or in the built-in
/// 5x7 digit glyphs when no font is given. Geometry is clamped to the `MAX_*` bounds.
pub fn render_barcode(code: &Ean13, opts: &RenderOptions, font: Option<&Font<'_>>) -> GrayImage {
    let mw = opts.module_width.clamp(1, MAX_MODULE_WIDTH);
    let bar_height = opts.bar_height.min(MAX_BAR_HEIGHT);
    let margin = opts.margin.min(MAX_MARGIN);
    let font_size = opts.font_size.clamp(1.0, MAX_TEXT_PX);

    let text = match font {
        _ if !opts.show_text => None,
        Some(f) => Some(render_line_tight_1bit(code.as_str(), f, font_size, 0, false)),
        None => {
            debug!("no font for the digit line, using built-in glyphs");
            Some(render_digits_1bit(code.as_str(), (font_size / 9.0).round().max(1.0) as u32))
        }
    };
    let text_h = text.as_ref().map_or(0, |t| t.height());
    let guard_extra = text_h / 2;

    let width = EAN13_MODULES * mw + margin * 2;
    let height = bar_height + text_h + margin * 2;
    let mut img = GrayImage::from_pixel(width, height, Luma([255]));

    for (i, &bar) in encode_modules(code).iter().enumerate() {
        if !bar {
            continue;
        }
        let h = if is_guard_module(i) { bar_height + guard_extra } else { bar_height };
        let x0 = margin + i as u32 * mw;
        for x in x0..x0 + mw {
            for y in margin..margin + h {
                img.put_pixel(x, y, Luma([0]));
            }
        }
    }

    if let Some(t) = text {
        let x = width.saturating_sub(t.width()) / 2;
        overlay_black(&mut img, &t, x, margin + bar_height);
    }
    img
}

/// Nearest-neighbour scale to `width`, keeping the aspect ratio.
pub fn zoom(img: &GrayImage, width: u32) -> GrayImage {
    let width = width.clamp(1, MAX_ZOOM_WIDTH);
    let height = ((img.height() as u64 * width as u64) / img.width().max(1) as u64).max(1) as u32;
    imageops::resize(img, width, height, FilterType::Nearest)
}

/// `"Apple 1kg"` → `"Apple_1kg_barcode.png"`.
/// Path separators and characters not allowed in file names also become `_`,
/// so the result is always a single path component.
pub fn download_file_name(product: &str) -> String {
    let stem: String = product
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{stem}_barcode.png")
}

pub fn save_png(img: &GrayImage, path: &Path) -> Result<(), RenderError> {
    img.save_with_format(path, ImageFormat::Png)?;
    debug!(path = %path.display(), width = img.width(), height = img.height(), "png written");
    Ok(())
}

fn g_code(d: u8) -> u8 {
    r_code(d).reverse_bits() >> 1
}

fn r_code(d: u8) -> u8 {
    !L_CODES[d as usize] & 0x7f
}

fn pattern_bits(pattern: u8) -> [bool; 7] {
    let mut bits = [false; 7];
    for (i, bit) in bits.iter_mut().enumerate() {
        *bit = pattern & (1 << (6 - i)) != 0;
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    fn code(s: &str) -> Ean13 {
        Ean13::parse(s).unwrap()
    }

    #[test]
    fn symbol_sets_match_gs1_tables() {
        assert_eq!(r_code(0), 0b1110010);
        assert_eq!(r_code(9), 0b1110100);
        assert_eq!(g_code(0), 0b0100111);
        assert_eq!(g_code(6), 0b0000101);
    }

    #[test]
    fn guards_are_in_place() {
        let m = encode_modules(&code("5901234123457"));
        assert_eq!(&m[..3], &bits("101")[..]);
        assert_eq!(&m[45..50], &bits("01010")[..]);
        assert_eq!(&m[92..], &bits("101")[..]);
    }

    #[test]
    fn left_half_follows_parity_of_first_digit() {
        // first digit 5 → L G G L L G; second digit 9 in L set
        let m = encode_modules(&code("5901234123457"));
        assert_eq!(&m[3..10], &bits("0001011")[..]);
        // third digit 0 in G set
        assert_eq!(&m[10..17], &bits("0100111")[..]);
    }

    #[test]
    fn right_half_uses_r_set() {
        let m = encode_modules(&code("5901234123457"));
        // last digit 7
        assert_eq!(&m[85..92], &bits("1000100")[..]);
    }

    #[test]
    fn every_digit_pattern_has_two_bars() {
        for d in 0..10u8 {
            let runs = |p: u8| {
                let b = pattern_bits(p);
                b.windows(2).filter(|w| w[0] != w[1]).count()
            };
            // L starts with space and ends with bar: 2 bars → 3 transitions
            assert_eq!(runs(L_CODES[d as usize]), 3, "L{d}");
            assert_eq!(runs(g_code(d)), 3, "G{d}");
            assert_eq!(runs(r_code(d)), 3, "R{d}");
        }
    }

    #[test]
    fn rendered_size_without_text() {
        let opts = RenderOptions { show_text: false, ..RenderOptions::default() };
        let img = render_barcode(&code("4006381333931"), &opts, None);
        assert_eq!(img.width(), 95 * 2 + 20);
        assert_eq!(img.height(), 60 + 20);
    }

    #[test]
    fn digits_are_drawn_without_a_font() {
        let opts = RenderOptions::default();
        let img = render_barcode(&code("4006381333931"), &opts, None);
        // font_size 18 → 2x glyphs, 9 rows each
        assert_eq!(img.height(), 60 + 20 + 18);

        // below the guard extension only the digit line can be black
        let text_top = opts.margin + opts.bar_height + 9;
        let inked = (text_top..img.height())
            .flat_map(|y| (0..img.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| img.get_pixel(x, y).0[0] == 0)
            .count();
        assert!(inked > 0);
    }

    #[test]
    fn oversized_geometry_is_clamped() {
        let opts = RenderOptions {
            module_width: u32::MAX,
            bar_height: 1,
            margin: 0,
            show_text: false,
            ..RenderOptions::default()
        };
        let img = render_barcode(&code("4006381333931"), &opts, None);
        assert_eq!(img.width(), 95 * MAX_MODULE_WIDTH);
        assert_eq!(img.height(), 1);
    }

    #[test]
    fn first_guard_bar_is_black() {
        let opts = RenderOptions::default();
        let img = render_barcode(&code("4006381333931"), &opts, None);
        assert_eq!(img.get_pixel(opts.margin, opts.margin).0[0], 0);
        assert_eq!(img.get_pixel(opts.margin + 1, opts.margin).0[0], 0);
        // second module is a space
        assert_eq!(img.get_pixel(opts.margin + 2, opts.margin).0[0], 255);
        // margins stay white
        assert_eq!(img.get_pixel(0, 0).0[0], 255);
    }

    #[test]
    fn zoom_keeps_aspect() {
        let img = GrayImage::from_pixel(200, 100, Luma([255]));
        let z = zoom(&img, 400);
        assert_eq!((z.width(), z.height()), (400, 200));
    }

    #[test]
    fn download_name_replaces_whitespace() {
        assert_eq!(download_file_name("Apple 1kg"), "Apple_1kg_barcode.png");
        assert_eq!(download_file_name("Big  red\tapple"), "Big_red_apple_barcode.png");
    }

    #[test]
    fn download_name_is_a_single_component() {
        assert_eq!(download_file_name("Apple 1/2kg"), "Apple_1_2kg_barcode.png");
        assert_eq!(download_file_name("../escaped"), ".._escaped_barcode.png");
        assert_eq!(download_file_name("a\\b:c*d?"), "a_b_c_d__barcode.png");
        for name in ["Apple 1/2kg", "../escaped", "..", "/etc/passwd"] {
            let file = download_file_name(name);
            assert_eq!(Path::new(&file).components().count(), 1, "{file}");
        }
    }

    #[test]
    fn png_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.png");
        let img = render_barcode(&code("4006381333931"), &RenderOptions::default(), None);
        save_png(&img, &path).unwrap();
        let back = image::open(&path).unwrap().to_luma8();
        assert_eq!(back.dimensions(), img.dimensions());
    }
}
