use serde::{Deserialize, Serialize};

/// Dense `[sensor × target × time]` array of visibility values.
///
/// Each sensor-target series is contiguous in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityTensor {
    values: Vec<f64>,
    n_sensors: usize,
    n_targets: usize,
    n_times: usize,
}

impl VisibilityTensor {
    /// Assemble from per-pair series given in sensor-major order.
    pub(crate) fn from_pair_series<I>(
        n_sensors: usize,
        n_targets: usize,
        n_times: usize,
        series: I,
    ) -> Self
    where
        I: IntoIterator<Item = Vec<f64>>,
    {
        let mut values = Vec::with_capacity(n_sensors * n_targets * n_times);
        for s in series {
            values.extend(s);
        }
        VisibilityTensor {
            values,
            n_sensors,
            n_targets,
            n_times,
        }
    }

    /// `(sensors, targets, times)`
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.n_sensors, self.n_targets, self.n_times)
    }

    #[inline]
    fn offset(&self, i_sensor: usize, i_target: usize) -> Option<usize> {
        (i_sensor < self.n_sensors && i_target < self.n_targets)
            .then(|| (i_sensor * self.n_targets + i_target) * self.n_times)
    }

    pub fn get(&self, i_sensor: usize, i_target: usize, i_time: usize) -> Option<f64> {
        if i_time >= self.n_times {
            return None;
        }
        let offset = self.offset(i_sensor, i_target)?;
        self.values.get(offset + i_time).copied()
    }

    /// Visibility series of one sensor-target pair.
    pub fn series(&self, i_sensor: usize, i_target: usize) -> Option<&[f64]> {
        let offset = self.offset(i_sensor, i_target)?;
        self.values.get(offset..offset + self.n_times)
    }
}

#[cfg(test)]
mod vis_tensor_test {
    use super::*;

    #[test]
    fn test_layout() {
        let series = (0..6).map(|pair| {
            if pair == 5 {
                vec![1.0, 2.0, 3.0, 4.0]
            } else {
                vec![0.0; 4]
            }
        });
        let tensor = VisibilityTensor::from_pair_series(2, 3, 4, series);
        assert_eq!(tensor.dims(), (2, 3, 4));

        assert_eq!(tensor.get(1, 2, 3), Some(4.0));
        assert_eq!(tensor.get(1, 1, 3), Some(0.0));
        assert_eq!(tensor.series(1, 2), Some(&[1.0, 2.0, 3.0, 4.0][..]));
        assert_eq!(tensor.get(2, 0, 0), None);
        assert_eq!(tensor.get(0, 3, 0), None);
        assert_eq!(tensor.get(0, 0, 4), None);
        assert_eq!(tensor.series(0, 3), None);
    }
}
