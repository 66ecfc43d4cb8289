/// Which lattice points react to the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WarpMode {
    /// Only the four corners of the hovered item are pushed, away from the item's centre.
    #[default]
    Rollover,

    /// Every lattice point is pushed away from the pointer position.
    PointerMove,
}

/// Tuning of the pointer repulsion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    /// Strength of the push applied every step.
    pub speed: f64,
    /// Extra factor applied on top of `speed`.
    pub speed_multiplier: f64,
    /// Reach of the pointer as a fraction of the element width.
    pub range_factor: f64,
    /// Which points react to the pointer.
    pub mode: WarpMode,
}

impl GridConfig {
    /// Reach of the pointer in pixels for elements of the given width.
    pub fn range(&self, element_width: f64) -> f64 {
        element_width * self.range_factor
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            speed: 50.0,
            speed_multiplier: 1.0,
            range_factor: 0.5,
            mode: WarpMode::Rollover,
        }
    }
}
