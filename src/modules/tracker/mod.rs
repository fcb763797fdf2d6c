mod cv;

pub use cv::{available_trackers, create_tracker};

use crate::modules::{BoundingBox, TrackerModule};

use opencv::core::Mat;
use opencv::prelude::*;

use itertools::Itertools;
use serde::Deserialize;
use thiserror::Error;

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum TrackerKind {
	Csrt,
	Kcf,
	Boosting,
	Mosse,
}

pub const DEFAULT_PRIORITY: [TrackerKind; 4] = [TrackerKind::Csrt, TrackerKind::Kcf, TrackerKind::Boosting, TrackerKind::Mosse];

impl TrackerKind {
	pub fn name(&self) -> &'static str {
		match self {
			TrackerKind::Csrt => "CSRT",
			TrackerKind::Kcf => "KCF",
			TrackerKind::Boosting => "BOOSTING",
			TrackerKind::Mosse => "MOSSE",
		}
	}
}

impl fmt::Display for TrackerKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for TrackerKind {
	type Err = TrackError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		DEFAULT_PRIORITY
			.iter()
			.copied()
			.find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| TrackError::UnknownTracker(s.to_string()))
	}
}

impl TryFrom<String> for TrackerKind {
	type Error = TrackError;

	fn try_from(s: String) -> Result<Self, Self::Error> {
		s.parse()
	}
}

#[derive(Debug, Error)]
pub enum TrackError {
	#[error("bounding box {bbox} is out of frame bounds {width}x{height}")]
	OutOfBounds { bbox: BoundingBox, width: i32, height: i32 },
	#[error("bounding box {0} has no area")]
	EmptyBox(BoundingBox),
	#[error("no tracker could be initialized")]
	NoTracker,
	#[error("unknown tracker type {0:?}")]
	UnknownTracker(String),
	#[error(transparent)]
	Cv(#[from] opencv::Error),
}

/// Preferred kind first, then the rest of `priority` in order, without repeats.
pub fn fallback_order(preferred: TrackerKind, priority: &[TrackerKind]) -> Vec<TrackerKind> {
	std::iter::once(preferred).chain(priority.iter().copied()).unique().collect()
}

pub fn check_bounds(bbox: BoundingBox, width: i32, height: i32) -> Result<(), TrackError> {
	if !bbox.fits_within(width, height) {
		return Err(TrackError::OutOfBounds { bbox, width, height });
	}
	if bbox.is_empty() {
		return Err(TrackError::EmptyBox(bbox));
	}
	Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerInfo {
	pub kind: TrackerKind,
	pub bbox: BoundingBox,
	pub initialized: bool,
}

/// A tracker that has accepted its initial box. Only `initialize_tracker` builds one.
pub struct TrackerState {
	tracker: Box<dyn TrackerModule>,
	bbox: BoundingBox,
}

/// Validates `bbox` against `frame` and initializes the first tracker in
/// fallback order that accepts it.
pub fn initialize_tracker<F>(
	frame: &Mat,
	bbox: BoundingBox,
	preferred: TrackerKind,
	priority: &[TrackerKind],
	mut factory: F,
) -> Result<TrackerState, TrackError>
where
	F: FnMut(TrackerKind) -> Option<Box<dyn TrackerModule>>,
{
	let size = frame.size()?;
	check_bounds(bbox, size.width, size.height)?;

	for kind in fallback_order(preferred, priority) {
		let mut tracker = match factory(kind) {
			Some(tracker) => tracker,
			None => {
				log::debug!("{} tracker is not available", kind);
				continue;
			}
		};
		match tracker.init(frame, bbox) {
			Ok(true) => {
				if kind != preferred {
					log::info!("Fallback to {} tracker.", kind);
				}
				return Ok(TrackerState { tracker, bbox });
			}
			Ok(false) => log::warn!("{} tracker rejected {}", kind, bbox),
			Err(e) => log::warn!("{} tracker failed to initialize: {:#}", kind, e),
		}
	}

	Err(TrackError::NoTracker)
}

impl TrackerState {
	pub fn kind(&self) -> TrackerKind {
		self.tracker.kind()
	}

	pub fn bbox(&self) -> BoundingBox {
		self.bbox
	}

	/// Returns the success flag and, on success, the refreshed box.
	pub fn update(&mut self, frame: &Mat) -> anyhow::Result<(bool, Option<BoundingBox>)> {
		match self.tracker.update(frame)? {
			Some(bbox) => {
				self.bbox = bbox;
				Ok((true, Some(bbox)))
			}
			None => Ok((false, None)),
		}
	}

	/// Reinitializes on a new box, trying the active algorithm first.
	/// The current tracker is kept if reinitialization fails.
	pub fn reset<F>(&mut self, frame: &Mat, bbox: BoundingBox, priority: &[TrackerKind], factory: F) -> Result<(), TrackError>
	where
		F: FnMut(TrackerKind) -> Option<Box<dyn TrackerModule>>,
	{
		*self = initialize_tracker(frame, bbox, self.kind(), priority, factory)?;
		Ok(())
	}

	pub fn info(&self) -> TrackerInfo {
		TrackerInfo {
			kind: self.kind(),
			bbox: self.bbox,
			initialized: true,
		}
	}
}
