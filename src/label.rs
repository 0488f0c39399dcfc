use std::path::PathBuf;

use rusttype::Font;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::ProductName;
use crate::consts::{
    DARKNESS, EAN13_MODULES, FONT_PX, HEIGHT, INVERT_BITS, LABEL_H, LABEL_W, NARROW, PAD_RIGHT,
    SPEED,
};
use crate::ean13::Ean13;
use crate::epl::{epl_line, gw_bytes, image_to_row_bytes};
use crate::graphics::render_line_tight_1bit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelOptions {
    /// Label size in dots (203 dpi)
    pub width: u32,
    pub height: u32,
    pub pad_right: u32,
    pub font_px: f32,
    /// D0..D15
    pub darkness: u8,
    /// S1..S6
    pub speed: u8,
    pub narrow: u32,
    pub bar_height: u32,
    pub invert_bits: bool,
    /// Font for the product name line; no name line without it
    pub font_path: Option<PathBuf>,
    /// Windows printer name for raw jobs
    pub printer: Option<String>,
}

impl Default for LabelOptions {
    fn default() -> Self {
        LabelOptions {
            width: LABEL_W,
            height: LABEL_H,
            pad_right: PAD_RIGHT,
            font_px: FONT_PX,
            darkness: DARKNESS,
            speed: SPEED,
            narrow: NARROW,
            bar_height: HEIGHT,
            invert_bits: INVERT_BITS,
            font_path: None,
            printer: None,
        }
    }
}

fn center_x_for_ean13(label_w: u32, narrow: u32) -> u32 {
    label_w.saturating_sub(EAN13_MODULES * narrow) / 2
}

/// Single-product EPL2 job: name line (right-aligned) over a centred EAN-13.
/// Returns raw bytes ready to send to the printer.
pub fn build_product_label(
    name: &ProductName,
    code: &Ean13,
    opts: &LabelOptions,
    font: Option<&Font<'_>>,
) -> Vec<u8> {
    let mut buf = Vec::new();
    epl_line(&mut buf, "N");
    epl_line(&mut buf, &format!("q{}", opts.width));
    epl_line(&mut buf, &format!("Q{},24", opts.height));
    epl_line(&mut buf, &format!("D{}", opts.darkness));
    epl_line(&mut buf, &format!("S{}", opts.speed));

    let text_y = 8;
    let mut bc_y = text_y;
    if let Some(font) = font {
        // tight image so the head doesn't heat a wide empty area
        let im = render_line_tight_1bit(name.as_str(), font, opts.font_px, 3, true);
        let (w, h, rows) = image_to_row_bytes(&im, opts.invert_bits);
        let x = opts.width.saturating_sub(opts.pad_right + w);
        gw_bytes(&mut buf, x, text_y, w, h, &rows);
        bc_y = text_y + h + 16;
    }

    // E30 = EAN-13, printer appends the check digit; B = print HRI
    let bx = center_x_for_ean13(opts.width, opts.narrow);
    epl_line(&mut buf, &format!("B{},{},0,E30,{},{},{},B,\"{}\"",
        bx, bc_y, opts.narrow, opts.narrow + 1, opts.bar_height, code.data_digits()));

    epl_line(&mut buf, "P1");
    debug!(product = %name, code = %code, bytes = buf.len(), "label job built");
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ean13::generate_code;

    #[test]
    fn job_without_font_has_barcode_only() {
        let name = ProductName::new("Apple 1kg").unwrap();
        let code = generate_code(&name);
        let job = build_product_label(&name, &code, &LabelOptions::default(), None);
        let text = String::from_utf8(job).unwrap();
        let lines: Vec<_> = text.split("\r\n").collect();

        assert_eq!(&lines[..5], ["N", "q440", "Q320,24", "D5", "S3"]);
        assert_eq!(
            lines[5],
            format!("B125,8,0,E30,2,3,50,B,\"{}\"", code.data_digits())
        );
        assert_eq!(lines[6], "P1");
        assert!(!text.contains("GW"));
    }

    #[test]
    fn barcode_is_centred_on_custom_width() {
        assert_eq!(center_x_for_ean13(400, 3), (400 - 285) / 2);
        assert_eq!(center_x_for_ean13(100, 3), 0);
    }
}
