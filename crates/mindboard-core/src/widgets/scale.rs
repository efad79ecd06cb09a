//! Band and linear placement helpers

/// Evenly spaced bands over `[start, end]` with inner padding as a fraction of the step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    count: usize,
    start: f64,
    end: f64,
    padding: f64,
}

impl BandScale {
    pub fn new(count: usize, start: f64, end: f64) -> Self {
        Self {
            count,
            start,
            end,
            padding: 0.0,
        }
    }

    pub fn padding(mut self, padding: f64) -> Self {
        self.padding = padding.clamp(0.0, 0.95);
        self
    }

    pub fn step(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.end - self.start) / self.count as f64
        }
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    /// Start offset of band `index`
    pub fn position(&self, index: usize) -> f64 {
        self.start + self.step() * index as f64 + self.step() * self.padding / 2.0
    }

    pub fn center(&self, index: usize) -> f64 {
        self.position(index) + self.bandwidth() / 2.0
    }
}

/// Linear map from a value domain onto a visual range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Map `value`; a degenerate domain maps everything to the range end
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if (d1 - d0).abs() < f64::EPSILON {
            return r1;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_positions() {
        let scale = BandScale::new(4, 0.0, 100.0).padding(0.2);
        assert_eq!(scale.step(), 25.0);
        assert_eq!(scale.bandwidth(), 20.0);
        assert_eq!(scale.position(0), 2.5);
        assert_eq!(scale.center(1), 37.5);
    }

    #[test]
    fn test_empty_band_scale() {
        let scale = BandScale::new(0, 0.0, 100.0);
        assert_eq!(scale.step(), 0.0);
        assert_eq!(scale.position(3), 0.0);
    }

    #[test]
    fn test_linear_inverted_range() {
        let y = LinearScale::new((0.0, 10.0), (100.0, 0.0));
        assert_eq!(y.map(0.0), 100.0);
        assert_eq!(y.map(10.0), 0.0);
        assert_eq!(y.map(2.5), 75.0);
    }

    #[test]
    fn test_linear_degenerate_domain() {
        let r = LinearScale::new((4.0, 4.0), (2.0, 12.0));
        assert_eq!(r.map(4.0), 12.0);
        assert!(r.map(4.0).is_finite());
    }
}
