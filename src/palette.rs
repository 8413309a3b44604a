//! Colour selection for light and dark dashboards.
//!
//! The mode is always passed in by the caller; nothing here reads ambient
//! state. Colours never influence data values or truncation.

use plotters::style::RGBColor;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

/// Resolved colours for one render
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPalette {
    pub background: RGBColor,
    pub grid: RGBColor,
    pub text: RGBColor,
    /// First series (bars, lines, area, radar A)
    pub primary: RGBColor,
    /// Second series (combo bars, radar B)
    pub secondary: RGBColor,
    /// Segment colours for pie, donut and treemap, cycled
    pub categorical: Vec<RGBColor>,
}

const PRIMARY: RGBColor = RGBColor(0x00, 0xB2, 0xB2);
const SECONDARY: RGBColor = RGBColor(0x00, 0x7A, 0x8C);

const LIGHT_SEGMENTS: [RGBColor; 6] = [
    RGBColor(0x00, 0xB2, 0xB2),
    RGBColor(0x00, 0x7A, 0x8C),
    RGBColor(0x00, 0xD9, 0xD9),
    RGBColor(0x6B, 0x72, 0x80),
    RGBColor(0xF5, 0x9E, 0x0B),
    RGBColor(0xEF, 0x44, 0x44),
];

const DARK_SEGMENTS: [RGBColor; 6] = [
    RGBColor(0x00, 0xD9, 0xD9),
    RGBColor(0x00, 0xB2, 0xB2),
    RGBColor(0x00, 0x7A, 0x8C),
    RGBColor(0x94, 0xA3, 0xB8),
    RGBColor(0xFB, 0xBF, 0x24),
    RGBColor(0xF8, 0x71, 0x71),
];

impl ChartPalette {
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self {
                background: RGBColor(0xFF, 0xFF, 0xFF),
                grid: RGBColor(0xE5, 0xE7, 0xEB),
                text: RGBColor(0x6B, 0x72, 0x80),
                primary: PRIMARY,
                secondary: SECONDARY,
                categorical: LIGHT_SEGMENTS.to_vec(),
            },
            ThemeMode::Dark => Self {
                background: RGBColor(0x1E, 0x29, 0x3B),
                grid: RGBColor(0x33, 0x41, 0x55),
                text: RGBColor(0x94, 0xA3, 0xB8),
                primary: PRIMARY,
                secondary: SECONDARY,
                categorical: DARK_SEGMENTS.to_vec(),
            },
        }
    }

    /// Segment colour for the i-th slice, cycling through the palette
    pub fn segment(&self, index: usize) -> RGBColor {
        self.categorical[index % self.categorical.len()]
    }
}
