//! Terminal styling shared by the runner and the CLI

use colored::Color;

/// Label colors for target names; log-level colors (red, yellow) are left out
const TARGET_PALETTE: [(u8, u8, u8); 6] = [
    (147, 112, 219),
    (64, 224, 208),
    (255, 140, 0),
    (199, 21, 133),
    (100, 149, 237),
    (60, 179, 113),
];

/// Get a consistent color for a target name
pub fn get_target_color(target_name: &str) -> Color {
    let hash = target_name
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));

    let (r, g, b) = TARGET_PALETTE[(hash % TARGET_PALETTE.len() as u64) as usize];
    Color::TrueColor { r, g, b }
}
