use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    RgbImage::from_pixel(width, height, Rgb([111, 111, 111]))
        .write_to(&mut out, format)
        .expect("encode fixture image");
    out.into_inner()
}
