//! Rolling Metric Window

use std::collections::VecDeque;

/// Default window size (12 samples = half a day of hourly data)
pub const DEFAULT_WINDOW_SIZE: usize = 12;

/// Bounded window over the most recent values of one metric.
///
/// Oldest values are evicted once the window is at capacity; the mean over
/// the retained values is the rolling baseline.
#[derive(Debug, Clone)]
pub struct MetricWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl MetricWindow {
    /// Create a window retaining at most `capacity` values
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Push a value, evicting the oldest if at capacity
    pub fn push(&mut self, value: f64) {
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Mean of the retained values, `None` when empty
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    /// Number of retained values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if window is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the window capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent value
    pub fn back(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Clear the window
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl Default for MetricWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_mean() {
        let mut window = MetricWindow::new(10);
        assert!(window.mean().is_none());

        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            window.push(v);
        }

        assert_eq!(window.len(), 5);
        assert!((window.mean().unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_evicts_oldest() {
        let mut window = MetricWindow::new(3);

        for v in [10.0, 20.0, 30.0, 40.0] {
            window.push(v);
        }

        // 10.0 evicted, mean over [20, 30, 40]
        assert_eq!(window.len(), 3);
        assert!((window.mean().unwrap() - 30.0).abs() < 1e-9);
        assert_eq!(window.back(), Some(40.0));
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut window = MetricWindow::new(0);
        window.push(5.0);
        assert_eq!(window.len(), 1);
        assert_eq!(window.capacity(), 1);
    }
}
