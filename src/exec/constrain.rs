//! Mapping one timeline ratio onto consecutive segments

use crate::types::{NumericError, Ratio, finite};

/// Splits `[0, 1]` at sorted breakpoints so a single progress ratio can
/// drive "finish segment i before starting segment i + 1".
///
/// ```
/// use construkt::{BoundaryConstrainer, Ratio};
///
/// let c = BoundaryConstrainer::try_new(vec![0.0, 0.3, 0.7, 1.0]).unwrap();
/// let (segment, local) = c.constrain(Ratio::clamped(0.5));
/// assert_eq!(segment, 1);
/// assert!((local.raw() - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryConstrainer {
    breakpoints: Vec<f64>,
}

impl BoundaryConstrainer {
    /// Breakpoints must be finite, ascending, within `[0, 1]`, and at
    /// least two.
    pub fn try_new(breakpoints: Vec<f64>) -> Result<Self, NumericError> {
        if breakpoints.len() < 2 {
            return Err(NumericError::Empty);
        }
        for &b in &breakpoints {
            finite(b)?;
            if !(0.0..=1.0).contains(&b) {
                return Err(NumericError::OutOfRange);
            }
        }
        if breakpoints.windows(2).any(|w| w[1] < w[0]) {
            return Err(NumericError::Unsorted);
        }
        Ok(Self { breakpoints })
    }

    /// `n` equal segments (at least one).
    pub fn uniform(n: usize) -> Self {
        let n = n.max(1);
        Self {
            breakpoints: (0..=n).map(|i| i as f64 / n as f64).collect(),
        }
    }

    /// Segments proportional to `lengths`. Falls back to equal segments
    /// when the total is zero.
    pub fn from_lengths(lengths: &[f64]) -> Self {
        let total: f64 = lengths.iter().map(|l| l.max(0.0)).sum();
        if lengths.is_empty() || total <= 0.0 || !total.is_finite() {
            return Self::uniform(lengths.len());
        }
        let mut acc = 0.0;
        let mut breakpoints = Vec::with_capacity(lengths.len() + 1);
        breakpoints.push(0.0);
        for l in lengths {
            acc += l.max(0.0);
            breakpoints.push((acc / total).min(1.0));
        }
        if let Some(last) = breakpoints.last_mut() {
            *last = 1.0;
        }
        Self { breakpoints }
    }

    pub fn segments(&self) -> usize {
        self.breakpoints.len() - 1
    }

    /// The segment `ratio` falls in and how far through it it is.
    /// Empty segments are skipped; ratio 1 is the end of the last segment.
    pub fn constrain(&self, ratio: Ratio) -> (usize, Ratio) {
        let r = ratio.raw();
        let b = &self.breakpoints;
        if r <= b[0] {
            return (0, Ratio::ZERO);
        }
        for i in 0..self.segments() {
            if r < b[i + 1] {
                let width = b[i + 1] - b[i];
                return (i, Ratio::clamped((r - b[i]) / width));
            }
        }
        (self.segments() - 1, Ratio::ONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(c: &BoundaryConstrainer, r: f64) -> (usize, f64) {
        let (i, local) = c.constrain(Ratio::clamped(r));
        (i, local.raw())
    }

    #[test]
    fn middle_of_the_second_segment() {
        let c = BoundaryConstrainer::try_new(vec![0.0, 0.3, 0.7, 1.0]).unwrap();
        let (i, local) = at(&c, 0.5);
        assert_eq!(i, 1);
        assert!((local - 0.5).abs() < 1e-12);
    }

    #[test]
    fn ends_and_boundaries() {
        let c = BoundaryConstrainer::try_new(vec![0.0, 0.3, 0.7, 1.0]).unwrap();
        assert_eq!(at(&c, 0.0), (0, 0.0));
        assert_eq!(at(&c, 0.3), (1, 0.0));
        assert_eq!(at(&c, 1.0), (2, 1.0));
    }

    #[test]
    fn empty_segments_are_skipped() {
        let c = BoundaryConstrainer::try_new(vec![0.0, 0.5, 0.5, 1.0]).unwrap();
        assert_eq!(at(&c, 0.5).0, 2);
    }

    #[test]
    fn rejects_bad_breakpoints() {
        assert_eq!(BoundaryConstrainer::try_new(vec![0.0]), Err(NumericError::Empty));
        assert_eq!(BoundaryConstrainer::try_new(vec![0.0, 0.6, 0.4, 1.0]), Err(NumericError::Unsorted));
        assert_eq!(BoundaryConstrainer::try_new(vec![0.0, 1.5]), Err(NumericError::OutOfRange));
    }

    #[test]
    fn lengths_become_fractions() {
        let c = BoundaryConstrainer::from_lengths(&[1.0, 3.0]);
        assert_eq!(c, BoundaryConstrainer::try_new(vec![0.0, 0.25, 1.0]).unwrap());
        assert_eq!(BoundaryConstrainer::from_lengths(&[0.0, 0.0]).segments(), 2);
        assert_eq!(BoundaryConstrainer::uniform(0).segments(), 1);
    }
}
