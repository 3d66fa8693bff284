//! Shared chart styling: figure sizes, fonts and palettes.

use plotters::style::RGBColor;

pub const TEAL: RGBColor = RGBColor(0, 128, 128);
pub const CORAL: RGBColor = RGBColor(255, 127, 80);
pub const EDGE: RGBColor = RGBColor(64, 64, 64);

/// YlGnBu colormap endpoints, used for present/missing cells.
pub const YLGNBU_LOW: RGBColor = RGBColor(255, 255, 217);
pub const YLGNBU_HIGH: RGBColor = RGBColor(8, 29, 88);

/// Qualitative Set3 palette.
pub const SET3: [RGBColor; 12] = [
    RGBColor(141, 211, 199),
    RGBColor(255, 255, 179),
    RGBColor(190, 186, 218),
    RGBColor(251, 128, 114),
    RGBColor(128, 177, 211),
    RGBColor(253, 180, 98),
    RGBColor(179, 222, 105),
    RGBColor(252, 205, 229),
    RGBColor(217, 217, 217),
    RGBColor(188, 128, 189),
    RGBColor(204, 235, 197),
    RGBColor(255, 237, 111),
];

// Viridis stops at 0, 0.25, 0.5, 0.75, 1
const VIRIDIS_STOPS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

/// Sample `n` evenly spaced viridis colors, skipping both extremes.
pub fn viridis(index: usize, n: usize) -> RGBColor {
    let t = (index + 1) as f64 / (n + 1) as f64;
    let scaled = t.clamp(0.0, 1.0) * (VIRIDIS_STOPS.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(VIRIDIS_STOPS.len() - 2);
    let frac = scaled - lower as f64;

    let (r0, g0, b0) = VIRIDIS_STOPS[lower];
    let (r1, g1, b1) = VIRIDIS_STOPS[lower + 1];
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

pub fn set3(index: usize) -> RGBColor {
    SET3[index % SET3.len()]
}

/// Figure size in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureSize {
    pub width: f64,
    pub height: f64,
}

impl FigureSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn pixels(&self, dpi: u32) -> (u32, u32) {
        (
            (self.width * dpi as f64).round().max(1.0) as u32,
            (self.height * dpi as f64).round().max(1.0) as u32,
        )
    }
}

/// Styling applied to every chart. Built once at start-up.
#[derive(Debug, Clone)]
pub struct ChartTheme {
    pub default_size: FigureSize,
    pub dpi: u32,
    pub font_family: &'static str,
    pub title_size: u32,
    pub label_size: u32,
    pub background: RGBColor,
    pub grid: RGBColor,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self::whitegrid(100)
    }
}

impl ChartTheme {
    /// White background with a light grid, 10x6 in default figures.
    pub fn whitegrid(dpi: u32) -> Self {
        Self {
            default_size: FigureSize::new(10.0, 6.0),
            dpi: dpi.max(1),
            font_family: "sans-serif",
            title_size: 22,
            label_size: 15,
            background: RGBColor(255, 255, 255),
            grid: RGBColor(204, 204, 204),
        }
    }
}
