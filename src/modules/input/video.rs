use crate::modules::InputModule;
use crate::settings::InputSettings;

use opencv::core::*;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};

use anyhow::{bail, Context, Result};

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureSource {
	Camera(i32),
	File(PathBuf),
}

impl CaptureSource {
	pub fn from_settings(settings: &InputSettings) -> Self {
		match &settings.video {
			Some(path) => CaptureSource::File(path.clone()),
			None => CaptureSource::Camera(settings.camera),
		}
	}
}

pub struct VideoInput {
	cap: VideoCapture,
}

impl VideoInput {
	pub fn open(source: &CaptureSource, settings: &InputSettings) -> Result<Self> {
		let mut cap = match source {
			CaptureSource::Camera(index) => VideoCapture::new(*index, videoio::CAP_ANY)
				.with_context(|| format!("could not open camera {}", index))?,
			CaptureSource::File(path) => {
				let path = path.to_str().context("video path is not valid utf8")?;
				VideoCapture::from_file(path, videoio::CAP_ANY)
					.with_context(|| format!("could not open video file {}", path))?
			}
		};
		if !cap.is_opened()? {
			bail!("could not open video source {:?}", source);
		}

		// Files carry their own geometry; only cameras take capture properties.
		if let CaptureSource::Camera(_) = source {
			if let Some(width) = settings.width {
				cap.set(videoio::CAP_PROP_FRAME_WIDTH, width as f64)?;
			}
			if let Some(height) = settings.height {
				cap.set(videoio::CAP_PROP_FRAME_HEIGHT, height as f64)?;
			}
			if let Some(fps) = settings.fps {
				cap.set(videoio::CAP_PROP_FPS, fps as f64)?;
			}
		}

		log::info!(
			"opened {:?} at {}x{}",
			source,
			cap.get(videoio::CAP_PROP_FRAME_WIDTH)?,
			cap.get(videoio::CAP_PROP_FRAME_HEIGHT)?
		);
		Ok(Self { cap })
	}
}

impl InputModule for VideoInput {
	fn run(&mut self) -> Result<Option<Mat>> {
		let mut frame = Mat::default();
		if !self.cap.read(&mut frame)? || frame.empty() {
			return Ok(None);
		}
		Ok(Some(frame))
	}
}

impl Drop for VideoInput {
	fn drop(&mut self) {
		if let Err(e) = self.cap.release() {
			log::warn!("failed to release capture: {}", e);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn video_path_wins_over_camera() {
		let mut settings = InputSettings::default();
		settings.camera = 3;
		assert_eq!(CaptureSource::from_settings(&settings), CaptureSource::Camera(3));

		settings.video = Some(PathBuf::from("clip.mp4"));
		assert_eq!(CaptureSource::from_settings(&settings), CaptureSource::File(PathBuf::from("clip.mp4")));
	}

	#[test]
	fn missing_video_file_fails_to_open() {
		let source = CaptureSource::File(PathBuf::from("definitely/not/here/clip.mp4"));
		let err = VideoInput::open(&source, &InputSettings::default()).err().unwrap();
		assert!(format!("{:#}", err).contains("could not open video"));
	}
}
