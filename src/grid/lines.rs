use super::*;

/// A run of whole pixels covered by a stroke along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StrokeSpan {
    pub start: u32,
    pub length: u32,
}

impl StrokeSpan {
    /// Snaps a stroke of `width` centred on `center` to whole pixels inside `0..limit`.
    ///
    /// Each edge is rounded half-up and the span is at least one pixel long, so
    /// boundary lines at `0` and `limit` still leave a visible pixel.
    ///
    /// # Example
    /// ```
    /// use addgrid::grid::StrokeSpan;
    ///
    /// let span = StrokeSpan::snap(100.0, 1.5, 600);
    /// assert_eq!((span.start, span.length), (99, 2));
    ///
    /// let edge = StrokeSpan::snap(600.0, 1.5, 600);
    /// assert_eq!((edge.start, edge.length), (599, 1));
    /// ```
    pub fn snap(center: f32, width: f32, limit: u32) -> Self {
        let half = width / 2.0;
        let low = (center - half + 0.5).floor() as i64;
        let high = ((center + half + 0.5).floor() as i64).max(low + 1);

        let last = i64::from(limit.max(1)) - 1;
        let start = low.clamp(0, last);
        let end = high.clamp(start + 1, last + 1);

        Self {
            start: start as u32,
            length: (end - start) as u32,
        }
    }
}

/// Returns the `count + 1` evenly spaced boundaries of `0..=extent`, both ends included.
pub fn boundaries(count: u32, extent: u32) -> SmallVecLine<f32> {
    trace!("Computing {} boundaries over extent {}", count + 1, extent);
    (0..=count)
        .map(|i| extent as f32 * i as f32 / count as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_boundaries_include_both_edges() {
        let lines = boundaries(6, 600);
        assert_eq!(
            lines.to_vec(),
            vec![0.0, 100.0, 200.0, 300.0, 400.0, 500.0, 600.0]
        );
    }

    #[test]
    fn test_boundaries_are_fractional() {
        let lines = boundaries(3, 100);
        assert_eq!(lines.len(), 4);
        assert!((lines[1] - 33.333_332).abs() < 1e-4);
        assert_eq!(lines[3], 100.0);
    }

    #[test]
    fn test_snap_hairline() {
        assert_eq!(StrokeSpan::snap(0.0, 1.0, 10), StrokeSpan { start: 0, length: 1 });
        assert_eq!(StrokeSpan::snap(5.0, 1.0, 10), StrokeSpan { start: 5, length: 1 });
        assert_eq!(StrokeSpan::snap(10.0, 1.0, 10), StrokeSpan { start: 9, length: 1 });
    }

    #[test]
    fn test_snap_wide_stroke() {
        assert_eq!(StrokeSpan::snap(50.0, 4.0, 100), StrokeSpan { start: 48, length: 4 });
        assert_eq!(StrokeSpan::snap(0.0, 4.0, 100), StrokeSpan { start: 0, length: 2 });
    }

    proptest! {
        #[test]
        fn test_snap_stays_inside(center in -10.0f32..2000.0, width in 1.0f32..40.0, limit in 1..1000u32) {
            let span = StrokeSpan::snap(center, width, limit);
            prop_assert!(span.length >= 1);
            prop_assert!(span.start + span.length <= limit);
        }
    }
}
