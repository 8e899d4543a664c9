//! Test patterns for exercising the wiring without a real content source.

use std::f64::consts::PI;

use crate::RawFrame;

/// Colours cycled by [`write_sine`], indexed by `row % 4`.
pub const SINE_PALETTE: [[u8; 3]; 4] = [[0, 0, 0], [0x7f, 0, 0], [0, 0x7f, 0], [0, 0, 0x7f]];

/// Encodes each pixel's own coordinate: red = row, green = column, blue = 0.
///
/// Values wrap at 256. Handy for checking strip order by eye or by decoding
/// captured packets, since every pixel names where it came from.
pub fn write_coordinate_pattern(frame: &mut RawFrame) {
    for y in 0..frame.height() {
        for x in 0..frame.width() {
            frame.set_pixel(x, y, [y as u8, x as u8, 0]);
        }
    }
}

/// Draws one lit pixel per row tracing a sine wave across the grid.
///
/// `phase` advances the wave; callers typically bump it once per frame.
pub fn write_sine(frame: &mut RawFrame, phase: u32) {
    frame.fill([0, 0, 0]);
    let width = frame.width() as i64;
    let height = frame.height();
    if width == 0 || height == 0 {
        return;
    }

    for y in 0..height {
        let angle = f64::from(phase / 2) + 2.0 * PI * y as f64 / height as f64;
        let swing = (angle.sin() * width as f64 + 0.5) as i64;
        let x = ((swing + width) / 2).clamp(0, width - 1) as usize;
        frame.set_pixel(x, y, SINE_PALETTE[y % SINE_PALETTE.len()]);
    }
}

/// Paints the whole frame one colour.
pub fn write_solid(frame: &mut RawFrame, rgb: [u8; 3]) {
    frame.fill(rgb);
}
