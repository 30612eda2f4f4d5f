use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use crate::core::convert::{resolve, Construct, ConversionHook, Domain};
use crate::utils::error::{Result, TsError};

/// Half-open range `[start, stop)` in a comparison domain, with an
/// optional stride over the matching elements.
///
/// Built from ordinary Rust ranges: `Slice::from(1.0..1.3)`,
/// `Slice::from(ts..)`, `Slice::from(..)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice<D> {
    pub start: Option<D>,
    pub stop: Option<D>,
    pub step: Option<i64>,
}

impl<D> Slice<D> {
    pub fn new(start: Option<D>, stop: Option<D>) -> Self {
        Self {
            start,
            stop,
            step: None,
        }
    }

    pub fn full() -> Self {
        Self::new(None, None)
    }

    pub fn with_step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }

    /// Stride as a usize; anything below one is rejected.
    pub fn stride(&self) -> Result<usize> {
        match self.step {
            None => Ok(1),
            Some(step) if step > 0 => {
                usize::try_from(step).map_err(|_| TsError::InvalidStep { step })
            }
            Some(step) => Err(TsError::InvalidStep { step }),
        }
    }
}

impl<D: PartialOrd> Slice<D> {
    pub fn contains(&self, value: &D) -> bool {
        self.start.as_ref().map_or(true, |start| start <= value)
            && self.stop.as_ref().map_or(true, |stop| value < stop)
    }

    /// Positions of `items` whose converted value lies in the range,
    /// thinned out by the stride.
    pub fn matching_positions<'a, X, I>(&self, items: I) -> Result<Vec<usize>>
    where
        D: Domain + Construct<X>,
        X: ConversionHook<D> + ?Sized + 'a,
        I: IntoIterator<Item = &'a X>,
    {
        let stride = self.stride()?;
        let positions = matching(items, |value| self.contains(value), stride)?;
        tracing::debug!(
            domain = D::NAME,
            start = ?self.start,
            stop = ?self.stop,
            stride,
            selected = positions.len(),
            "range filter applied"
        );
        Ok(positions)
    }
}

/// Positions of `items` whose converted value equals `target`.
pub fn exact_positions<'a, D, X, I>(items: I, target: &D) -> Result<Vec<usize>>
where
    D: Domain + Construct<X>,
    X: ConversionHook<D> + ?Sized + 'a,
    I: IntoIterator<Item = &'a X>,
{
    let positions = matching(items, |value| value == target, 1)?;
    tracing::debug!(domain = D::NAME, target = ?target, selected = positions.len(), "exact lookup applied");
    Ok(positions)
}

// Every element is converted, so a bad element fails the whole call
// even when it would not have matched.
fn matching<'a, D, X, I>(items: I, keep: impl Fn(&D) -> bool, stride: usize) -> Result<Vec<usize>>
where
    D: Domain + Construct<X>,
    X: ConversionHook<D> + ?Sized + 'a,
    I: IntoIterator<Item = &'a X>,
{
    let mut positions = Vec::new();
    for (position, item) in items.into_iter().enumerate() {
        let value = resolve::<D, X>(item)?;
        tracing::trace!(position, value = ?value, "converted element");
        if keep(&value) {
            positions.push(position);
        }
    }
    Ok(positions.into_iter().step_by(stride).collect())
}

impl<D> From<Range<D>> for Slice<D> {
    fn from(range: Range<D>) -> Self {
        Self::new(Some(range.start), Some(range.end))
    }
}

impl<D> From<RangeFrom<D>> for Slice<D> {
    fn from(range: RangeFrom<D>) -> Self {
        Self::new(Some(range.start), None)
    }
}

impl<D> From<RangeTo<D>> for Slice<D> {
    fn from(range: RangeTo<D>) -> Self {
        Self::new(None, Some(range.end))
    }
}

impl<D> From<RangeFull> for Slice<D> {
    fn from(_: RangeFull) -> Self {
        Self::full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_half_open() {
        let slice = Slice::from(1.0..2.0);
        assert!(slice.contains(&1.0));
        assert!(slice.contains(&1.999));
        assert!(!slice.contains(&2.0));
        assert!(!slice.contains(&0.5));
        assert!(Slice::<f64>::full().contains(&f64::MAX));
    }

    #[test]
    fn test_inverted_bounds_match_nothing() {
        let values = [1.0, 2.0, 3.0];
        let positions = Slice::from(3.0..1.0).matching_positions(values.iter()).unwrap();
        assert!(positions.is_empty());
    }

    #[test]
    fn test_stride_over_matches() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let positions = Slice::from(1.0..6.0)
            .with_step(2)
            .matching_positions(values.iter())
            .unwrap();
        assert_eq!(positions, vec![1, 3, 5]);
    }

    #[test]
    fn test_non_positive_step_rejected() {
        let values = [1.0];
        for step in [0, -1] {
            let err = Slice::from(..2.0)
                .with_step(step)
                .matching_positions(values.iter())
                .unwrap_err();
            assert!(matches!(err, TsError::InvalidStep { step: s } if s == step));
        }
    }

    #[test]
    fn test_step_checked_before_conversion() {
        let values = ["not a number"];
        let err = Slice::from(0.0..1.0)
            .with_step(0)
            .matching_positions(values.iter())
            .unwrap_err();
        assert!(matches!(err, TsError::InvalidStep { .. }));
    }

    #[test]
    fn test_exact_positions() {
        let values = [1.1, 1.2, 1.1];
        assert_eq!(exact_positions(values.iter(), &1.1).unwrap(), vec![0, 2]);
        assert!(exact_positions(values.iter(), &9.9).unwrap().is_empty());
    }
}
