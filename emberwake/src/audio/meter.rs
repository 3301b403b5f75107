//! Textual loudness meter for debug output
//!
//! Renders a debug-overlay style readout: a proportional
//! bar plus percentage and dB. Hosts with a real UI ignore this and consume
//! the raw numbers instead.

use crate::math::clamp01;

/// Render a one-line meter, e.g. `|####------| 42% (-31.5 dB)`.
pub fn meter_line(level01: f32, current_db: f32, width: usize) -> String {
    let level = clamp01(level01);
    let filled = (level * width as f32).round() as usize;
    let mut line = String::with_capacity(width + 24);
    line.push('|');
    for i in 0..width {
        line.push(if i < filled { '#' } else { '-' });
    }
    line.push('|');
    line.push_str(&format!(
        " {:3.0}% ({:.1} dB)",
        level * 100.0,
        current_db
    ));
    line
}
