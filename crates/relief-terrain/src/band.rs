//! Elevation bands: four fixed colors split at quarters of the height range.

/// One of four color classes assigned by position within `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElevationBand {
    /// `[min, min + Δ/4)`
    Water,
    /// `[min + Δ/4, min + Δ/2)`
    Vegetation,
    /// `[min + Δ/2, min + 3Δ/4)`
    Earth,
    /// `[min + 3Δ/4, max]`, and every vertex of a flat grid.
    Snow,
}

impl ElevationBand {
    /// All bands, lowest first.
    pub const ALL: [ElevationBand; 4] = [
        ElevationBand::Water,
        ElevationBand::Vegetation,
        ElevationBand::Earth,
        ElevationBand::Snow,
    ];

    /// Classify `height` against the grid's range with a strict `<` chain.
    ///
    /// A height sitting exactly on a threshold goes to the upper band. When
    /// `min == max` every threshold equals `min`, no test passes, and the result
    /// is [`ElevationBand::Snow`].
    pub fn classify(height: f32, min: f32, max: f32) -> Self {
        let range = max - min;
        if height < min + range / 4.0 {
            ElevationBand::Water
        } else if height < min + range * 2.0 / 4.0 {
            ElevationBand::Vegetation
        } else if height < min + range * 3.0 / 4.0 {
            ElevationBand::Earth
        } else {
            ElevationBand::Snow
        }
    }

    /// Zero-based band number, lowest first.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Packed RGBA8 vertex color.
    pub fn color(self) -> [u8; 4] {
        match self {
            ElevationBand::Water => [0, 0, 255, 255],
            ElevationBand::Vegetation => [0, 128, 0, 255],
            ElevationBand::Earth => [165, 42, 42, 255],
            ElevationBand::Snow => [255, 255, 255, 255],
        }
    }
}
