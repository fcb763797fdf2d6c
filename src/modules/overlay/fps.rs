use opencv::core::{get_tick_count, get_tick_frequency};

use anyhow::Result;

/// Frame rate averaged over windows of at least one second.
#[derive(Debug, Clone)]
pub struct FpsCounter {
	window_start: f64,
	frames: u32,
	fps: f64,
}

fn now() -> Result<f64> {
	Ok(get_tick_count()? as f64 / get_tick_frequency()?)
}

impl FpsCounter {
	pub fn new() -> Result<Self> {
		Ok(Self::starting_at(now()?))
	}

	pub fn starting_at(seconds: f64) -> Self {
		Self {
			window_start: seconds,
			frames: 0,
			fps: 0.0,
		}
	}

	/// Counts one frame and returns the rate of the last completed window.
	pub fn tick(&mut self) -> Result<f64> {
		Ok(self.tick_at(now()?))
	}

	pub fn tick_at(&mut self, seconds: f64) -> f64 {
		self.frames += 1;
		let elapsed = seconds - self.window_start;
		if elapsed >= 1.0 {
			self.fps = self.frames as f64 / elapsed;
			self.frames = 0;
			self.window_start = seconds;
		}
		self.fps
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zero_until_first_full_second() {
		let mut fps = FpsCounter::starting_at(10.0);
		assert_eq!(fps.tick_at(10.2), 0.0);
		assert_eq!(fps.tick_at(10.9), 0.0);
	}

	#[test]
	fn rate_holds_between_windows() {
		let mut fps = FpsCounter::starting_at(0.0);
		for i in 1..20 {
			fps.tick_at(i as f64 * 0.05);
		}
		// 20th frame closes the window at exactly one second.
		assert!((fps.tick_at(1.0) - 20.0).abs() < 1e-9);
		assert!((fps.tick_at(1.5) - 20.0).abs() < 1e-9);

		// One more frame closes the next window at 2.5s: two frames in 1.5s.
		assert!((fps.tick_at(2.5) - 2.0 / 1.5).abs() < 1e-9);
	}

	#[test]
	fn live_clock_starts_at_zero() {
		let mut fps = FpsCounter::new().unwrap();
		assert_eq!(fps.tick().unwrap(), 0.0);
	}
}
