//! Label color palettes

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{GalleryError, Result};

/// Seed for sampling from the large palette.
pub const PALETTE_SEED: u64 = 10000;

/// Color for a label with no assigned color.
pub const DEFAULT_COLOR: &str = "#ddd";

pub const PRESET12: [&str; 12] = [
    "#7aecec", "#bfeeb7", "#feca74", "#ff9561", "#aa9cfc", "#c887fb", "#9cc9cc", "#ffeb80",
    "#ff8197", "#e4e7d2", "#bfe1d9", "#f0a3ff",
];

pub const PRESETS30: [&str; 30] = [
    "#7aecec", "#bfeeb7", "#feca74", "#ff9561", "#aa9cfc", "#c887fb", "#9cc9cc", "#ffeb80",
    "#ff8197", "#e4e7d2", "#bfe1d9", "#f0a3ff", "#0075dc", "#993f00", "#4c005c", "#2bce48",
    "#ffcc99", "#808080", "#94ffb5", "#8f7c00", "#9dcc00", "#c20088", "#ffa405", "#ffa8bb",
    "#426600", "#ff0010", "#5ef1f2", "#00998f", "#e0ff66", "#ffff80",
];

/// Colors for `k` labels.
///
/// Up to twelve labels take the leading entries of `PRESET12`. Larger label
/// sets draw `k` distinct colors from `PRESETS30` with a fixed seed, so the
/// assignment is the same on every call.
pub fn get_colors(k: usize) -> Result<Vec<&'static str>> {
    if k <= PRESET12.len() {
        return Ok(PRESET12[..k].to_vec());
    }
    if k > PRESETS30.len() {
        return Err(GalleryError::PaletteExhausted {
            requested: k,
            available: PRESETS30.len(),
        });
    }

    let mut rng = StdRng::seed_from_u64(PALETTE_SEED);
    Ok(rand::seq::index::sample(&mut rng, PRESETS30.len(), k)
        .into_iter()
        .map(|i| PRESETS30[i])
        .collect())
}
