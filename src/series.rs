//! Rolling window of boosted risk points backing the chart.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::prelude::Result;
use crate::Error;

/// One chart point: wall-clock label and boosted probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedPoint {
    pub label: String,
    pub value: f64,
}

impl BoostedPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Fixed-capacity FIFO of [`BoostedPoint`]s.
///
/// Push and eviction happen in one call, so the length never exceeds the
/// capacity and the labels/values columns cannot drift apart.
#[derive(Debug, Clone)]
pub struct RollingSeries {
    points: VecDeque<BoostedPoint>,
    capacity: usize,
}

impl RollingSeries {
    /// Create an empty series. A zero capacity is rejected.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }
        Ok(Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Append a point, evicting the oldest one if the window is full.
    ///
    /// Returns the evicted point, if any.
    pub fn push(&mut self, point: BoostedPoint) -> Option<BoostedPoint> {
        let evicted = if self.points.len() >= self.capacity {
            self.points.pop_front()
        } else {
            None
        };
        self.points.push_back(point);
        evicted
    }

    /// Points oldest to newest.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &BoostedPoint> + '_ {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<&BoostedPoint> {
        self.points.back()
    }

    /// Label column, in chart order.
    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|p| p.label.clone()).collect()
    }

    /// Value column, in chart order.
    pub fn data(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn to_vec(&self) -> Vec<BoostedPoint> {
        self.points.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.points.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(i: usize) -> BoostedPoint {
        BoostedPoint::new(format!("t{i}"), i as f64 / 100.0)
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            RollingSeries::new(0),
            Err(Error::InvalidCapacity(0))
        ));
    }

    #[test]
    fn test_push_below_capacity() {
        let mut series = RollingSeries::new(10).unwrap();
        assert!(series.is_empty());

        for i in 0..4 {
            assert!(series.push(point(i)).is_none());
        }

        assert_eq!(series.len(), 4);
        assert!(!series.is_full());
        assert_eq!(series.labels(), vec!["t0", "t1", "t2", "t3"]);
    }

    #[test]
    fn test_keeps_last_n_in_push_order() {
        for n in [0usize, 1, 9, 10, 11, 25] {
            let mut series = RollingSeries::new(10).unwrap();
            for i in 0..n {
                series.push(point(i));
            }

            let kept = n.min(10);
            assert_eq!(series.len(), kept);
            let expected: Vec<BoostedPoint> = (n - kept..n).map(point).collect();
            assert_eq!(series.to_vec(), expected);
        }
    }

    #[test]
    fn test_eviction_returns_oldest() {
        let mut series = RollingSeries::new(3).unwrap();
        series.push(point(1));
        series.push(point(2));
        series.push(point(3));

        let evicted = series.push(point(4));
        assert_eq!(evicted, Some(point(1)));
        assert!(series.is_full());
        assert_eq!(series.latest(), Some(&point(4)));
    }

    #[test]
    fn test_duplicate_labels_allowed() {
        let mut series = RollingSeries::new(10).unwrap();
        series.push(BoostedPoint::new("12:00:01", 0.2));
        series.push(BoostedPoint::new("12:00:01", 0.3));

        assert_eq!(series.len(), 2);
        assert_eq!(series.data(), vec![0.2, 0.3]);
    }

    #[test]
    fn test_columns_in_lockstep() {
        let mut series = RollingSeries::new(4).unwrap();
        for i in 0..7 {
            series.push(point(i));
            assert_eq!(series.labels().len(), series.data().len());
        }
        assert_eq!(series.values().len(), 4);
    }
}
