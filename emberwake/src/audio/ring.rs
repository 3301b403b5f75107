//! Fixed-capacity sample ring shared between the capture callback and the
//! per-tick sensor read
//!
//! Single writer (the capture subsystem), single reader (the sensor). The
//! ring never grows after construction; the callback must not allocate.

/// Circular buffer of amplitude samples with a monotonically increasing
/// write position.
pub struct SampleRing {
    buffer: Box<[f32]>,
    cursor: usize,
    written: u64,
}

impl SampleRing {
    /// Create a ring holding `capacity` samples. Capacity is clamped to at
    /// least one sample.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: vec![0.0; capacity].into_boxed_slice(),
            cursor: 0,
            written: 0,
        }
    }

    /// Number of samples the ring can hold.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Total samples ever written. Zero means the capture device has not
    /// produced anything yet.
    pub fn position(&self) -> u64 {
        self.written
    }

    /// Append samples, wrapping and overwriting the oldest data.
    #[inline]
    pub fn write(&mut self, samples: &[f32]) {
        for &s in samples {
            self.buffer[self.cursor] = s;
            self.cursor = (self.cursor + 1) % self.buffer.len();
        }
        self.written += samples.len() as u64;
    }

    /// Copy the most recent `out.len()` samples, ending at the write cursor,
    /// into `out`. Returns how many samples were actually valid; until the
    /// ring has seen that much audio the tail of `out` is left untouched.
    pub fn read_latest(&self, out: &mut [f32]) -> usize {
        let capacity = self.buffer.len();
        let available = (self.written as usize).min(capacity);
        let count = out.len().min(available);
        if count == 0 {
            return 0;
        }
        let start = (self.cursor + capacity - count) % capacity;
        for (i, slot) in out[..count].iter_mut().enumerate() {
            *slot = self.buffer[(start + i) % capacity];
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ring_reads_nothing() {
        let ring = SampleRing::new(8);
        let mut out = [9.0; 4];
        assert_eq!(ring.read_latest(&mut out), 0);
        assert_eq!(ring.position(), 0);
        // untouched
        assert_eq!(out, [9.0; 4]);
    }

    #[test]
    fn test_partial_fill_returns_available() {
        let mut ring = SampleRing::new(8);
        ring.write(&[1.0, 2.0, 3.0]);
        let mut out = [0.0; 5];
        let n = ring.read_latest(&mut out);
        assert_eq!(n, 3);
        assert_eq!(&out[..3], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_wrap_around_keeps_most_recent() {
        let mut ring = SampleRing::new(4);
        ring.write(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(ring.position(), 6);
        let mut out = [0.0; 4];
        assert_eq!(ring.read_latest(&mut out), 4);
        assert_eq!(out, [3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_window_smaller_than_capacity() {
        let mut ring = SampleRing::new(8);
        ring.write(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut out = [0.0; 2];
        assert_eq!(ring.read_latest(&mut out), 2);
        assert_eq!(out, [4.0, 5.0]);
    }

    #[test]
    fn test_zero_capacity_clamps_to_one() {
        let mut ring = SampleRing::new(0);
        assert_eq!(ring.capacity(), 1);
        ring.write(&[0.5]);
        let mut out = [0.0; 1];
        assert_eq!(ring.read_latest(&mut out), 1);
        assert_eq!(out[0], 0.5);
    }
}
