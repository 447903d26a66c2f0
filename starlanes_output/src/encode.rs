// Byte encodings for the cost-map artifacts.
//
// `costmap.bin` is the raw row-major buffer, one byte per cell.
// `costmap.png` is the same buffer as an 8-bit single-channel image, one
// pixel per cell, row 0 at the top.

use crate::error::OutputError;
use image::{GrayImage, ImageFormat};
use starlanes_gen::cost_map::CostMap;
use std::io::Cursor;

/// Raw cost buffer, `width * height` bytes.
pub fn cost_map_bin(map: &CostMap) -> Vec<u8> {
    map.data().to_vec()
}

/// PNG-encoded grayscale image of the cost grid.
pub fn cost_map_png(map: &CostMap) -> Result<Vec<u8>, OutputError> {
    let (width, height) = (map.width(), map.height());
    let image = GrayImage::from_raw(width, height, map.data().to_vec())
        .ok_or(OutputError::ImageShape { width, height })?;
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
