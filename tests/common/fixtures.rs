use card_detector::{Capability, Detector, DetectorConfig};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

pub const BOUNDARY: &str = "card-detector-test-boundary";

/// Card rectangles (x, y, width, height) used by the scenario tests.
/// Discovery order is top to bottom, so the rightmost card is found first.
pub const THREE_CARDS: [(u32, u32, u32, u32); 3] = [
    (40, 170, 60, 90),
    (170, 100, 60, 90),
    (300, 30, 60, 90),
];

/// White canvas with solid black rectangles, encoded as PNG
pub fn table_png(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let inside = rects
            .iter()
            .any(|&(rx, ry, rw, rh)| x >= rx && x < rx + rw && y >= ry && y < ry + rh);
        if inside {
            Rgb([0u8, 0u8, 0u8])
        } else {
            Rgb([255u8, 255u8, 255u8])
        }
    });
    encode_png(DynamicImage::ImageRgb8(img))
}

pub fn three_cards_png() -> Vec<u8> {
    table_png(400, 300, &THREE_CARDS)
}

pub fn blank_png() -> Vec<u8> {
    table_png(400, 300, &[])
}

pub fn encode_png(img: DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("Failed to encode test image");
    buf
}

/// Bytes that no decoder recognizes
pub fn garbage_bytes() -> Vec<u8> {
    b"definitely not an image, just some text".to_vec()
}

pub fn detector(capability: Capability) -> Detector {
    Detector::new(capability, DetectorConfig::default())
}

/// Single-field multipart/form-data body
pub fn multipart_body(field: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"upload.png\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}
