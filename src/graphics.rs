use std::path::Path;

use image::{GrayImage, ImageBuffer, Luma};
use rusttype::{Font, Scale, point};
use ar_reshaper::{ArabicReshaper, ReshaperConfig};
use unicode_bidi::BidiInfo;

use crate::error::RenderError;

/// Parse a TTF/OTF font file.
pub fn load_font(path: &Path) -> Result<Font<'static>, RenderError> {
    let bytes = std::fs::read(path)
        .map_err(|source| RenderError::FontFile { path: path.to_path_buf(), source })?;
    Font::try_from_vec(bytes).ok_or(RenderError::Font)
}

/// Return visually ordered string with Arabic runs reshaped, LTR runs unchanged.
/// This keeps numbers LTR and Arabic RTL, then we can render visually left→right.
pub fn bidi_then_shape(text: &str, reshaper: &ArabicReshaper) -> String {
    let info = BidiInfo::new(text, None);
    let Some(para) = info.paragraphs.first() else {
        return String::new();
    };

    // unicode-bidi 0.3 returns (levels, ranges)
    let (levels, ranges) = info.visual_runs(para, para.range.clone());

    let mut out = String::new();
    for (level, range) in levels.into_iter().zip(ranges.into_iter()) {
        let slice = &text[range];
        if level.is_rtl() {
            let shaped = reshaper.reshape(slice);
            // Arabic letters come out in logical order; digits/punctuation stay put
            if slice.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c)) {
                out.extend(shaped.chars().rev());
            } else {
                out.push_str(&shaped);
            }
        } else {
            out.push_str(slice);
        }
    }
    out
}

/// Render one line as a tight 1-bit image (0 = black, 255 = white).
/// - `pad_lr` extra pixels around glyphs
/// - `bold` draws twice with a 1-px offset
pub fn render_line_tight_1bit(
    text: &str,
    font: &Font<'_>,
    font_px: f32,
    pad_lr: u32,
    bold: bool,
) -> GrayImage {
    let reshaper = ArabicReshaper::new(ReshaperConfig::default());
    let visual = bidi_then_shape(text, &reshaper);

    let scale = Scale { x: font_px, y: font_px };
    let vm = font.v_metrics(scale);
    let ascent = vm.ascent.ceil();
    let descent = vm.descent.floor();
    let line_h = (ascent - descent).ceil().max(1.0) as u32;

    // Measure tight width
    let text_w = font
        .layout(&visual, scale, point(0.0, ascent))
        .filter_map(|g| g.pixel_bounding_box().map(|bb| bb.max.x))
        .max()
        .unwrap_or(0)
        .max(0) as u32;

    let w = (text_w + pad_lr * 2 + u32::from(bold)).max(2);
    let mut img = ImageBuffer::from_pixel(w, line_h, Luma([255u8]));

    let passes: &[(i32, i32)] = if bold { &[(0, 0), (1, 0)] } else { &[(0, 0)] };
    for &(dx, dy) in passes {
        for g in font.layout(&visual, scale, point(pad_lr as f32 + dx as f32, ascent + dy as f32)) {
            if let Some(bb) = g.pixel_bounding_box() {
                g.draw(|x, y, v| {
                    // hard threshold, no gray
                    if v > 0.5 {
                        let px = x as i32 + bb.min.x;
                        let py = y as i32 + bb.min.y;
                        if px >= 0 && py >= 0 && (px as u32) < w && (py as u32) < line_h {
                            img.put_pixel(px as u32, py as u32, Luma([0]));
                        }
                    }
                });
            }
        }
    }

    img
}

// 5x7 digit glyphs, one row per byte, low five bits, MSB = leftmost column
const DIGITS_5X7: [[u8; 7]; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
];

/// Render the ASCII digits of `text` with the built-in 5x7 glyphs, each dot `scale` px.
/// Image is 9 dots tall: 2 dots of top padding, then the glyph row. Other characters are skipped.
pub fn render_digits_1bit(text: &str, scale: u32) -> GrayImage {
    let scale = scale.max(1);
    let digits: Vec<u8> = text.bytes().filter(u8::is_ascii_digit).map(|b| b - b'0').collect();
    let advance = 6 * scale;
    let w = (digits.len() as u32 * advance).saturating_sub(scale).max(1);
    let h = 9 * scale;
    let mut img = ImageBuffer::from_pixel(w, h, Luma([255u8]));

    for (i, &d) in digits.iter().enumerate() {
        let x0 = i as u32 * advance;
        for (row, bits) in DIGITS_5X7[d as usize].iter().enumerate() {
            for col in 0..5u32 {
                if bits & (1 << (4 - col)) == 0 {
                    continue;
                }
                let (px, py) = (x0 + col * scale, (2 + row as u32) * scale);
                for dy in 0..scale {
                    for dx in 0..scale {
                        img.put_pixel(px + dx, py + dy, Luma([0]));
                    }
                }
            }
        }
    }
    img
}

/// Copy black pixels of `src` onto `dst` at (x, y), clipping at the edges.
pub fn overlay_black(dst: &mut GrayImage, src: &GrayImage, x: u32, y: u32) {
    for (sx, sy, px) in src.enumerate_pixels() {
        if px.0[0] < 128 {
            let (dx, dy) = (x + sx, y + sy);
            if dx < dst.width() && dy < dst.height() {
                dst.put_pixel(dx, dy, Luma([0]));
            }
        }
    }
}
