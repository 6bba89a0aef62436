use ndarray::Array2;
use num_complex::Complex64;

/// Reductions restricted to the pixels selected by a boolean mask.
pub struct StatsHelper;

impl StatsHelper {
    pub fn masked_sum(values: &Array2<f64>, mask: &Array2<bool>) -> f64 {
        values
            .iter()
            .zip(mask.iter())
            .filter(|(_, keep)| **keep)
            .map(|(&value, _)| value)
            .sum()
    }

    pub fn masked_sum_complex(values: &Array2<Complex64>, mask: &Array2<bool>) -> Complex64 {
        values
            .iter()
            .zip(mask.iter())
            .filter(|(_, keep)| **keep)
            .map(|(&value, _)| value)
            .sum()
    }

    pub fn masked_count(mask: &Array2<bool>) -> usize {
        mask.iter().filter(|&&keep| keep).count()
    }

    /// First masked pixel whose value is exactly zero, as `(row, col)`.
    pub fn first_masked_zero(values: &Array2<f64>, mask: &Array2<bool>) -> Option<(usize, usize)> {
        values
            .indexed_iter()
            .zip(mask.iter())
            .find(|((_, value), keep)| **keep && **value == 0.0)
            .map(|((index, _), _)| index)
    }
}
