//! Range Operations.
//!
//! - [`slop()`]: symmetrically expand a range, clamped to the sequence bounds.

use crate::{traits::AdjustableGenericRange, Position};

/// Expands the coordinates of a range by `distance` on both sides, ensuring
/// the new range stays within `[0, length]`.
///
/// Returns `None` if the range has zero width after clamping, which can only
/// happen when the input range lies entirely past the end of the sequence.
pub fn slop<R: AdjustableGenericRange>(
    mut range: R,
    distance: Position,
    length: Position,
) -> Option<R> {
    let new_start = range.start().saturating_sub(distance).min(length);
    let new_end = range.end().saturating_add(distance).min(length);

    if new_end <= new_start {
        return None;
    }
    range.set_start(new_start);
    range.set_end(new_end);
    Some(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranges::RangeFields;

    #[test]
    fn test_normal_slop() {
        let range = RangeFields::new(50, 100);
        let sloped = slop(range, 10, 1000).unwrap();
        assert_eq!(sloped, RangeFields::new(40, 110));
    }

    #[test]
    fn test_slop_clamped_at_end() {
        let range = RangeFields::new(900, 950);
        let sloped = slop(range, 100, 1000).unwrap();
        assert_eq!(sloped, RangeFields::new(800, 1000));
    }

    #[test]
    fn test_slop_clamped_at_start() {
        let range = RangeFields::new(5, 10);
        let sloped = slop(range, 100, 1000).unwrap();
        assert_eq!(sloped, RangeFields::new(0, 110));
    }

    #[test]
    fn test_slop_touching_boundaries() {
        // A range spanning the whole sequence cannot grow.
        let range = RangeFields::new(0, 1000);
        assert_eq!(slop(range, 100, 1000).unwrap(), RangeFields::new(0, 1000));

        // Touching the start boundary only moves the end.
        let range = RangeFields::new(0, 10);
        assert_eq!(slop(range, 5, 1000).unwrap(), RangeFields::new(0, 15));

        // Touching the end boundary only moves the start.
        let range = RangeFields::new(990, 1000);
        assert_eq!(slop(range, 5, 1000).unwrap(), RangeFields::new(985, 1000));
    }

    #[test]
    fn test_slop_zero_distance() {
        let range = RangeFields::with_fields(5, 10, vec!["name".to_string()]);
        let sloped = slop(range.clone(), 0, 1000).unwrap();
        assert_eq!(sloped, range);
    }

    #[test]
    fn test_slop_past_sequence_end() {
        let range = RangeFields::new(1200, 1300);
        assert!(slop(range, 100, 1000).is_none());
    }

    #[test]
    fn test_slop_no_overflow() {
        let range = RangeFields::new(10, Position::MAX - 1);
        let sloped = slop(range, 100, Position::MAX).unwrap();
        assert_eq!(sloped, RangeFields::new(0, Position::MAX));
    }
}
