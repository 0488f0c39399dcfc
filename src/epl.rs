use image::GrayImage;

/// Helper to append an EPL ASCII command line terminated with CRLF
pub fn epl_line(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(s.as_bytes());
    buf.extend_from_slice(b"\r\n");
}

/// Packed 1-bit rows of an image (Luma < 128 = black), MSB first.
/// Returns (width, height, rows). `invert` flips every bit for GW polarity.
pub fn image_to_row_bytes(img: &GrayImage, invert: bool) -> (u32, u32, Vec<u8>) {
    let w = img.width();
    let h = img.height();
    let bpr = w.div_ceil(8) as usize;
    let mut out = vec![0u8; bpr * h as usize];

    for (x, y, px) in img.enumerate_pixels() {
        if px.0[0] < 128 {
            let idx = y as usize * bpr + (x as usize / 8);
            out[idx] |= 1 << (7 - (x as usize % 8));
        }
    }
    if invert {
        for b in &mut out { *b = !*b; }
    }
    (w, h, out)
}

/// Append GW header + raw binary rows + CRLF
pub fn gw_bytes(buf: &mut Vec<u8>, x: u32, y: u32, w: u32, h: u32, rows: &[u8]) {
    let bpr = w.div_ceil(8);
    epl_line(buf, &format!("GW{},{},{},{}", x, y, bpr, h));
    buf.extend_from_slice(rows);
    buf.extend_from_slice(b"\r\n");
}
