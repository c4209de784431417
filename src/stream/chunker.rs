//! Fixed-size frame chunker over a decoded PCM buffer.
//!
//! Slices the buffer into frames of exactly `frame_samples` samples. The
//! trailing partial frame, if any, is dropped rather than sent: the wire
//! protocol expects every binary payload to cover the same duration.

/// Cursor over a PCM buffer that yields fixed-size frames in order.
pub struct Chunker {
    samples: Vec<i16>,
    position: usize,
    frame_samples: usize,
}

impl Chunker {
    /// Creates a chunker over a fully materialized sample buffer.
    ///
    /// `frame_samples` must be non-zero; config validation enforces this
    /// before a chunker is ever constructed.
    pub fn new(samples: Vec<i16>, frame_samples: usize) -> Self {
        debug_assert!(frame_samples > 0);
        Self {
            samples,
            position: 0,
            frame_samples,
        }
    }

    /// Returns the next full frame, advancing the cursor.
    ///
    /// Returns `None` at end-of-stream, i.e. when fewer than
    /// `frame_samples` samples remain.
    pub fn next_frame(&mut self) -> Option<&[i16]> {
        if self.position + self.frame_samples > self.samples.len() {
            return None;
        }
        let frame = &self.samples[self.position..self.position + self.frame_samples];
        self.position += self.frame_samples;
        Some(frame)
    }

    /// Total number of full frames this buffer yields.
    pub fn total_frames(&self) -> usize {
        self.samples.len() / self.frame_samples
    }

    /// Index of the next frame to be emitted.
    pub fn frame_index(&self) -> usize {
        self.position / self.frame_samples
    }

    /// Total buffer duration in milliseconds at the given sample rate.
    pub fn duration_ms(&self, sample_rate: u32) -> u64 {
        (self.samples.len() as u64 * 1000) / sample_rate as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_multiple_yields_all_frames() {
        let mut chunker = Chunker::new(vec![1i16; 4800], 1600);
        assert_eq!(chunker.total_frames(), 3);

        let mut count = 0;
        while let Some(frame) = chunker.next_frame() {
            assert_eq!(frame.len(), 1600);
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn test_partial_tail_is_dropped() {
        // 2.5 frames worth of samples: the half frame must not be emitted
        let mut chunker = Chunker::new(vec![0i16; 4000], 1600);
        assert_eq!(chunker.total_frames(), 2);

        assert_eq!(chunker.next_frame().map(<[i16]>::len), Some(1600));
        assert_eq!(chunker.next_frame().map(<[i16]>::len), Some(1600));
        assert!(chunker.next_frame().is_none());
    }

    #[test]
    fn test_buffer_smaller_than_frame_yields_nothing() {
        let mut chunker = Chunker::new(vec![0i16; 100], 1600);
        assert_eq!(chunker.total_frames(), 0);
        assert!(chunker.next_frame().is_none());
    }

    #[test]
    fn test_empty_buffer() {
        let mut chunker = Chunker::new(Vec::new(), 1600);
        assert!(chunker.next_frame().is_none());
    }

    #[test]
    fn test_frames_are_contiguous_and_ordered() {
        let samples: Vec<i16> = (0..32).collect();
        let mut chunker = Chunker::new(samples, 8);

        let first: Vec<i16> = chunker.next_frame().unwrap().to_vec();
        let second: Vec<i16> = chunker.next_frame().unwrap().to_vec();
        assert_eq!(first, (0..8).collect::<Vec<i16>>());
        assert_eq!(second, (8..16).collect::<Vec<i16>>());
    }

    #[test]
    fn test_frame_index_advances() {
        let mut chunker = Chunker::new(vec![0i16; 4800], 1600);
        assert_eq!(chunker.frame_index(), 0);
        chunker.next_frame();
        assert_eq!(chunker.frame_index(), 1);
        chunker.next_frame();
        assert_eq!(chunker.frame_index(), 2);
    }

    #[test]
    fn test_end_of_stream_is_stable() {
        let mut chunker = Chunker::new(vec![0i16; 1600], 1600);
        assert!(chunker.next_frame().is_some());
        assert!(chunker.next_frame().is_none());
        assert!(chunker.next_frame().is_none());
    }

    #[test]
    fn test_duration_ms() {
        let chunker = Chunker::new(vec![0i16; 16000], 1600);
        assert_eq!(chunker.duration_ms(16000), 1000);
    }
}
