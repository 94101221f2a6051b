//! Plot-area scaling for SVG rendering.

/// Maps data coordinates into a padded SVG viewport. Degenerate ranges
/// (single point, flat series) are widened so scaling never divides by
/// zero.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Frame {
    pub fn new(width: f64, height: f64, padding: f64, x: (f64, f64), y: (f64, f64)) -> Self {
        let (x_min, x_max) = widen(x);
        let (y_min, y_max) = widen(y);
        Frame {
            width,
            height,
            padding,
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn plot_width(&self) -> f64 {
        self.width - 2.0 * self.padding
    }

    pub fn plot_height(&self) -> f64 {
        self.height - 2.0 * self.padding
    }

    /// Data x to SVG x.
    pub fn x(&self, v: f64) -> f64 {
        self.padding + (v - self.x_min) / (self.x_max - self.x_min) * self.plot_width()
    }

    /// Data y to SVG y (inverted axis).
    pub fn y(&self, v: f64) -> f64 {
        self.height - self.padding - (v - self.y_min) / (self.y_max - self.y_min) * self.plot_height()
    }

    pub fn x_range(&self) -> (f64, f64) {
        (self.x_min, self.x_max)
    }

    pub fn y_range(&self) -> (f64, f64) {
        (self.y_min, self.y_max)
    }

    /// Evenly spaced tick positions in data coordinates, endpoints included.
    pub fn x_ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.x_min, self.x_max, count)
    }

    pub fn y_ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.y_min, self.y_max, count)
    }
}

fn widen((min, max): (f64, f64)) -> (f64, f64) {
    if max > min {
        (min, max)
    } else {
        (min - 0.5, min + 0.5)
    }
}

fn ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    let count = count.max(2);
    let step = (max - min) / (count - 1) as f64;
    (0..count).map(|i| min + i as f64 * step).collect()
}

/// Min/max over a value sequence, `None` when empty.
pub fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut seen = false;
    for v in values {
        seen = true;
        min = min.min(v);
        max = max.max(v);
    }
    seen.then_some((min, max))
}
