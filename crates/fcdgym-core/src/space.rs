//! Observation and action space descriptors.

use std::fmt;

use smallvec::SmallVec;

/// Element type of a box space.
///
/// Only 32-bit floats are exchanged with the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dtype {
    /// 32-bit float.
    F32,
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F32 => write!(f, "float"),
        }
    }
}

/// A bounded n-dimensional numeric box: every element lies in
/// `[low, high]`.
///
/// # Examples
///
/// ```
/// use fcdgym_core::BoxSpace;
///
/// let space = BoxSpace::vector(0.0, 10.0, 4);
/// assert_eq!(space.element_count(), 4);
/// assert!(space.contains(&[0.0, 1.0, 9.5, 10.0]));
/// assert!(!space.contains(&[0.0, 1.0, 11.0, 10.0]));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BoxSpace {
    /// Lower bound shared by every element.
    pub low: f32,
    /// Upper bound shared by every element.
    pub high: f32,
    /// Tensor shape.
    pub shape: SmallVec<[usize; 4]>,
    /// Element type.
    pub dtype: Dtype,
}

impl BoxSpace {
    /// A one-dimensional f32 box of `len` elements.
    pub fn vector(low: f32, high: f32, len: usize) -> Self {
        Self {
            low,
            high,
            shape: smallvec::smallvec![len],
            dtype: Dtype::F32,
        }
    }

    /// Total number of elements (product of the shape).
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Whether `values` has the right length and every element is within
    /// bounds. NaN is never contained.
    pub fn contains(&self, values: &[f32]) -> bool {
        values.len() == self.element_count()
            && values.iter().all(|&v| v >= self.low && v <= self.high)
    }
}

impl fmt::Display for BoxSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoxSpace low={} high={} shape=(", self.low, self.high)?;
        for (i, dim) in self.shape.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{dim}")?;
        }
        if self.shape.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ") dtype={}", self.dtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_rejects_wrong_length() {
        let space = BoxSpace::vector(-1.0, 1.0, 3);
        assert!(!space.contains(&[0.0, 0.0]));
    }

    #[test]
    fn contains_rejects_nan() {
        let space = BoxSpace::vector(-1.0, 1.0, 1);
        assert!(!space.contains(&[f32::NAN]));
    }

    #[test]
    fn display_formats_vector_shape() {
        let space = BoxSpace::vector(0.0, 10.0, 4);
        assert_eq!(
            format!("{space}"),
            "BoxSpace low=0 high=10 shape=(4,) dtype=float"
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn in_bounds_vectors_are_contained(values in prop::collection::vec(0.0f32..=10.0, 0..16)) {
                let space = BoxSpace::vector(0.0, 10.0, values.len());
                prop_assert!(space.contains(&values));
            }
        }
    }
}
