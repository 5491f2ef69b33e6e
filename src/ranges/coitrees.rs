use coitrees::{BasicCOITree, IntervalNode, IntervalTree};

use crate::{error::SafeHarborError, Position};

use super::vec::VecRanges;

/// Convert a [`Position`] to the `i32` coordinates used by [`coitrees`].
fn to_i32(position: Position) -> Result<i32, SafeHarborError> {
    i32::try_from(position).map_err(|_| SafeHarborError::PositionOverflow(position))
}

/// A [`coitrees::BasicCOITree`] interval tree for a single sequence's ranges.
///
/// The node metadata is the index of the range in the [`VecRanges`] it was
/// built from.
pub struct COITrees {
    pub(crate) ranges: BasicCOITree<usize, usize>,
    /// The length of the sequence the ranges are on.
    pub length: Position,
}

impl std::fmt::Debug for COITrees {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("COITrees")
            .field("number of ranges:", &self.ranges.len())
            .field("length", &self.length)
            .finish()
    }
}

impl COITrees {
    /// Build an interval tree over the ranges in a [`VecRanges`].
    pub fn from_vec_ranges(value: &VecRanges) -> Result<Self, SafeHarborError> {
        let nodes = value
            .ranges
            .iter()
            .enumerate()
            .map(|(index, range)| {
                // internally coitrees uses 0-indexed, right-inclusive "last"
                Ok(IntervalNode::<usize, usize>::new(
                    to_i32(range.start)?,
                    to_i32(range.end)? - 1,
                    index,
                ))
            })
            .collect::<Result<Vec<IntervalNode<usize, usize>>, SafeHarborError>>()?;
        Ok(Self {
            ranges: BasicCOITree::new(&nodes),
            length: value.length,
        })
    }

    /// Count the ranges overlapping `[start, end)`.
    pub fn count_overlaps(&self, start: Position, end: Position) -> Result<usize, SafeHarborError> {
        if start >= end {
            return Ok(0);
        }
        let first = to_i32(start)?;
        let last = to_i32(end)? - 1;
        Ok(self.ranges.query_count(first, last))
    }

    /// Whether any range overlaps `[start, end)`.
    pub fn has_overlaps(&self, start: Position, end: Position) -> Result<bool, SafeHarborError> {
        Ok(self.count_overlaps(start, end)? > 0)
    }

    /// Return the number of ranges in this [`COITrees`] container.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Return whether the [`COITrees`] object is empty (contains no ranges).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranges::RangeFields;

    #[test]
    fn test_count_overlaps() {
        let mut vr = VecRanges::new(100);
        vr.push_range(RangeFields::new(0, 5));
        vr.push_range(RangeFields::new(4, 7));
        vr.push_range(RangeFields::new(10, 17));
        let trees = COITrees::from_vec_ranges(&vr).unwrap();
        assert_eq!(trees.len(), 3);
        assert_eq!(trees.count_overlaps(4, 5).unwrap(), 2);
        assert_eq!(trees.count_overlaps(0, 100).unwrap(), 3);
        // right-exclusive: [7, 10) touches but does not overlap
        assert_eq!(trees.count_overlaps(7, 10).unwrap(), 0);
        assert!(trees.has_overlaps(16, 20).unwrap());
        assert!(!trees.has_overlaps(17, 20).unwrap());
    }

    #[test]
    fn test_position_overflow() {
        let mut vr = VecRanges::new(Position::MAX);
        vr.push_range(RangeFields::new(0, Position::MAX));
        assert!(matches!(
            COITrees::from_vec_ranges(&vr),
            Err(SafeHarborError::PositionOverflow(_))
        ));
    }
}
