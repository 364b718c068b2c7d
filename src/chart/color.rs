use serde::{Deserialize, Serialize};

/// Visual style handed to the rendering surface alongside a new series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub stroke: String,
    pub fill: Option<String>,
    pub width: f32,
}

/// Pure ordinal -> style mapping.
/// Implementations must return the same style for the same ordinal.
pub trait Palette: Send + Sync {
    fn at(&self, ordinal: usize) -> Style;
}

const WHEEL: [&str; 10] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f",
    "#edc948", "#b07aa1", "#ff9da7", "#9c755f", "#bab0ac",
];

/// Default palette. Wraps around after the last color.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorWheel;

impl Palette for ColorWheel {
    fn at(&self, ordinal: usize) -> Style {
        Style {
            stroke: WHEEL[ordinal % WHEEL.len()].to_string(),
            fill: None,
            width: 1.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_wraps_and_is_stable() {
        let wheel = ColorWheel;
        assert_eq!(wheel.at(0), wheel.at(WHEEL.len()));
        assert_ne!(wheel.at(0), wheel.at(1));
        assert_eq!(wheel.at(3), ColorWheel.at(3));
    }
}
