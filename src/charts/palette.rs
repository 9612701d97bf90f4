//! Colors shared by the interactive and static chart backends (RGB).

/// Bar at or below the highlight threshold.
pub const HIGHLIGHT: [u8; 3] = [0xFF, 0x4B, 0x4B];
/// Bar above the highlight threshold.
pub const MUTED: [u8; 3] = [0xA9, 0xA9, 0xA9];
/// Value labels.
pub const LABEL: [u8; 3] = [0x31, 0x33, 0x3F];
/// Dumbbell point for the selected filter value.
pub const SELECTED: [u8; 3] = [52, 152, 219];
/// Dumbbell point for everything else.
pub const OTHER: [u8; 3] = [243, 156, 18];
/// Dumbbell connector.
pub const CONNECTOR: [u8; 3] = [200, 200, 200];

/// Bars under the threshold are the ones to draw attention to.
pub fn bar_color(percent: f64, threshold: f64) -> [u8; 3] {
    if percent > threshold {
        MUTED
    } else {
        HIGHLIGHT
    }
}
