/*!
Dilution-series observations.

A [`DilutionDataset`] is built once from three parallel vectors (positive
wells, total wells, dilution fractions) and is read-only afterwards. Cloning
is cheap: every clone shares the same observations, so chains running on
different threads all read one copy.

# Examples

```rust
use bayes_qld::dataset::DilutionDataset;

let data = DilutionDataset::new(&[3.0, 1.0, 0.0], &[6.0, 6.0, 6.0], &[1.0, 0.1, 0.01])?;
assert_eq!(data.len(), 3);
assert_eq!(data[1].positive_wells, 1.0);
# Ok::<(), bayes_qld::error::ValidationError>(())
```
*/

use std::ops::Index;
use std::sync::Arc;

use crate::error::ValidationError;

/// Outcome of one dilution level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DilutionObservation {
    /// Number of wells testing positive.
    pub positive_wells: f64,
    /// Number of wells tested.
    pub total_wells: f64,
    /// Proportion of the original material present at this dilution.
    pub dilution_fraction: f64,
}

impl DilutionObservation {
    fn check(&self, index: usize) -> Result<(), ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidObservation { index, reason };
        if !(self.positive_wells.is_finite() && self.positive_wells >= 0.0) {
            return Err(invalid(format!(
                "positive well count must be a non-negative number, got {}",
                self.positive_wells
            )));
        }
        if !(self.total_wells.is_finite() && self.total_wells >= 0.0) {
            return Err(invalid(format!(
                "total well count must be a non-negative number, got {}",
                self.total_wells
            )));
        }
        if self.positive_wells > self.total_wells {
            return Err(invalid(format!(
                "{} positive wells exceed {} total wells",
                self.positive_wells, self.total_wells
            )));
        }
        if !(self.dilution_fraction.is_finite() && self.dilution_fraction > 0.0) {
            return Err(invalid(format!(
                "dilution fraction must be positive, got {}",
                self.dilution_fraction
            )));
        }
        Ok(())
    }
}

/// Immutable, shareable collection of [`DilutionObservation`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct DilutionDataset {
    observations: Arc<[DilutionObservation]>,
}

impl DilutionDataset {
    /**
    Builds a dataset from parallel slices.

    # Errors

    Returns [`ValidationError::LengthMismatch`] if the slices differ in length,
    [`ValidationError::EmptyDataset`] if they are empty, and
    [`ValidationError::InvalidObservation`] if a dilution has negative counts,
    more positive than total wells, or a non-positive dilution fraction.
    */
    pub fn new(
        positive_wells: &[f64],
        total_wells: &[f64],
        dilution_fraction: &[f64],
    ) -> Result<Self, ValidationError> {
        if positive_wells.len() != total_wells.len() || total_wells.len() != dilution_fraction.len()
        {
            return Err(ValidationError::LengthMismatch {
                positive: positive_wells.len(),
                total: total_wells.len(),
                dilution: dilution_fraction.len(),
            });
        }
        let observations: Vec<DilutionObservation> = positive_wells
            .iter()
            .zip(total_wells)
            .zip(dilution_fraction)
            .map(|((&positive_wells, &total_wells), &dilution_fraction)| DilutionObservation {
                positive_wells,
                total_wells,
                dilution_fraction,
            })
            .collect();
        Self::from_observations(observations)
    }

    /// Builds a dataset from already-paired observations.
    pub fn from_observations(
        observations: Vec<DilutionObservation>,
    ) -> Result<Self, ValidationError> {
        if observations.is_empty() {
            return Err(ValidationError::EmptyDataset);
        }
        for (i, obs) in observations.iter().enumerate() {
            obs.check(i)?;
        }
        Ok(Self {
            observations: observations.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always `false`; an empty dataset cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DilutionObservation> {
        self.observations.iter()
    }

    /// `true` if some dilution has at least one positive well.
    pub fn has_positive_wells(&self) -> bool {
        self.iter().any(|obs| obs.positive_wells > 0.0)
    }
}

impl Index<usize> for DilutionDataset {
    type Output = DilutionObservation;

    fn index(&self, index: usize) -> &Self::Output {
        &self.observations[index]
    }
}

impl<'a> IntoIterator for &'a DilutionDataset {
    type Item = &'a DilutionObservation;
    type IntoIter = std::slice::Iter<'a, DilutionObservation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_parallel_vectors() {
        let data = DilutionDataset::new(&[2.0, 0.0], &[4.0, 4.0], &[0.5, 0.05]).unwrap();
        assert_eq!(data.len(), 2);
        assert!(!data.is_empty());
        assert_eq!(
            data[0],
            DilutionObservation {
                positive_wells: 2.0,
                total_wells: 4.0,
                dilution_fraction: 0.5,
            }
        );
        assert!(data.has_positive_wells());
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = DilutionDataset::new(&[1.0, 2.0], &[3.0, 3.0, 3.0], &[0.1, 0.2, 0.3]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::LengthMismatch {
                positive: 2,
                total: 3,
                dilution: 3,
            }
        );
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = DilutionDataset::new(&[], &[], &[]).unwrap_err();
        assert_eq!(err, ValidationError::EmptyDataset);
    }

    #[test]
    fn more_positive_than_total_is_rejected() {
        let err = DilutionDataset::new(&[1.0, 7.0], &[6.0, 6.0], &[1.0, 0.1]).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidObservation { index: 1, .. }
        ));
    }

    #[test]
    fn non_positive_dilution_is_rejected() {
        for bad in [0.0, -0.5, f64::NAN] {
            let err = DilutionDataset::new(&[0.0], &[3.0], &[bad]).unwrap_err();
            assert!(matches!(
                err,
                ValidationError::InvalidObservation { index: 0, .. }
            ));
        }
    }

    #[test]
    fn negative_counts_are_rejected() {
        assert!(DilutionDataset::new(&[-1.0], &[3.0], &[0.5]).is_err());
        assert!(DilutionDataset::new(&[0.0], &[-3.0], &[0.5]).is_err());
    }

    #[test]
    fn clones_share_observations() {
        let data = DilutionDataset::new(&[0.0], &[5.0], &[0.5]).unwrap();
        let other = data.clone();
        assert!(Arc::ptr_eq(&data.observations, &other.observations));
    }
}
