//! Fallback color tokens for status columns.
//!
//! Categories fetched without a color get one picked from a fixed palette by
//! hashing the display name, so a column keeps its color across sessions.

/// Column header palette (6-char hex without `#`).
const PALETTE: &[&str] = &[
    "64748b", // slate
    "2563eb", // blue
    "0891b2", // cyan
    "059669", // emerald
    "65a30d", // lime
    "ca8a04", // amber
    "ea580c", // orange
    "dc2626", // red
    "db2777", // pink
    "9333ea", // purple
    "4f46e5", // indigo
    "0d9488", // teal
];

/// Deterministic color for a category display name.
///
/// Case and surrounding whitespace do not change the result.
pub fn auto_color(name: &str) -> &'static str {
    let key = name.trim().to_lowercase();
    PALETTE[(fnv1a(&key) as usize) % PALETTE.len()]
}

fn fnv1a(s: &str) -> u32 {
    s.bytes().fold(0x811c_9dc5_u32, |hash, byte| {
        (hash ^ byte as u32).wrapping_mul(0x0100_0193)
    })
}
