//! Fixed-capacity rolling average used to smooth throughput and ETA.

/// Default number of samples kept by [`RollingAverage::default`].
pub const DEFAULT_CAPACITY: usize = 25;

/// Circular buffer of samples with mean-on-demand.
///
/// Early in a run the buffer is not yet full; `mean` divides by the number of
/// samples actually stored, not by the capacity.
#[derive(Debug, Clone)]
pub struct RollingAverage {
    samples: Vec<f64>,
    next: usize,
    capacity: usize,
}

impl Default for RollingAverage {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl RollingAverage {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity),
            next: 0,
            capacity,
        }
    }

    /// Add a sample, overwriting the oldest one once the buffer is full.
    pub fn add(&mut self, value: f64) {
        if self.samples.len() < self.capacity {
            self.samples.push(value);
        } else {
            self.samples[self.next] = value;
        }
        self.next = (self.next + 1) % self.capacity;
    }

    /// Mean of the stored samples; 0.0 when empty.
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
