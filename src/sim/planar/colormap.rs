//! Diverging blue-white-red color map for fields in `[-1, 1]`.

use crate::sim::planar::field::Field2D;

/// One RGB frame indexed `[i][j]`, `nx` rows of `ny` pixels.
pub type RgbFrame = Vec<Vec<[u8; 3]>>;

/// Maps `u` to RGB: `-1` is blue, `0` white, `+1` red. Channels truncate.
pub fn diverging_rgb(u: f64) -> [u8; 3] {
    let t = u.abs().min(1.0);
    let fade = (255.0 * (1.0 - t)) as u8;
    if u < 0.0 {
        [fade, fade, 255]
    } else {
        [255, fade, fade]
    }
}

/// Renders every cell of the field.
pub fn render_frame(field: &Field2D) -> RgbFrame {
    field
        .values()
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|&u| diverging_rgb(u)).collect())
        .collect()
}
