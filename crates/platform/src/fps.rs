/// Averages frame rate over roughly one-second windows.
#[derive(Debug, Default)]
pub struct FpsCounter {
    elapsed: f32,
    frames: u32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame of `dt` seconds; yields the average once a second has
    /// accumulated, then starts a new window.
    pub fn tick(&mut self, dt: f32) -> Option<f32> {
        self.elapsed += dt.max(0.0);
        self.frames += 1;
        if self.elapsed < 1.0 {
            return None;
        }
        let fps = self.frames as f32 / self.elapsed;
        self.elapsed = 0.0;
        self.frames = 0;
        Some(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_second() {
        let mut fps = FpsCounter::new();
        for _ in 0..59 {
            assert_eq!(fps.tick(1.0 / 60.0), None);
        }
        let rate = fps.tick(1.0 / 60.0 + 1e-4).unwrap();
        assert!((rate - 60.0).abs() < 0.1, "rate = {rate}");
        assert_eq!(fps.tick(0.5), None);
    }

    #[test]
    fn long_frame_reports_immediately() {
        let mut fps = FpsCounter::new();
        let rate = fps.tick(2.0).unwrap();
        assert!((rate - 0.5).abs() < 1e-6);
    }
}
