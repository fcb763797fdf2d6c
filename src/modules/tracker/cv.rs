use super::TrackerKind;
use crate::modules::{BoundingBox, TrackerModule};

use opencv::core::*;
use opencv::prelude::*;
use opencv::tracking::{
	legacy_TrackerBoosting, legacy_TrackerBoosting_Params, legacy_TrackerMOSSE, legacy_TrackerTrait, TrackerCSRT,
	TrackerCSRT_Params, TrackerKCF, TrackerKCF_Params,
};
use opencv::video::TrackerTrait;

use anyhow::Result;
use itertools::Itertools;

/// Trackers from the main tracking API, which take integer boxes.
struct CvTracker<T> {
	kind: TrackerKind,
	inner: T,
}

impl<T: TrackerTrait> TrackerModule for CvTracker<T> {
	fn kind(&self) -> TrackerKind {
		self.kind
	}

	fn init(&mut self, frame: &Mat, bbox: BoundingBox) -> Result<bool> {
		self.inner.init(frame, bbox.into())?;
		Ok(true)
	}

	fn update(&mut self, frame: &Mat) -> Result<Option<BoundingBox>> {
		let mut rect = Rect::default();
		let ok = self.inner.update(frame, &mut rect)?;
		Ok(if ok { Some(rect.into()) } else { None })
	}
}

/// Trackers only shipped under `cv::legacy`, which take `Rect2d`.
struct LegacyTracker<T> {
	kind: TrackerKind,
	inner: T,
}

impl<T: legacy_TrackerTrait> TrackerModule for LegacyTracker<T> {
	fn kind(&self) -> TrackerKind {
		self.kind
	}

	fn init(&mut self, frame: &Mat, bbox: BoundingBox) -> Result<bool> {
		Ok(self.inner.init(frame, bbox.into())?)
	}

	fn update(&mut self, frame: &Mat) -> Result<Option<BoundingBox>> {
		let mut rect = Rect2d::default();
		let ok = self.inner.update(frame, &mut rect)?;
		Ok(if ok { Some(rect.into()) } else { None })
	}
}

fn construct(kind: TrackerKind) -> opencv::Result<Box<dyn TrackerModule>> {
	Ok(match kind {
		TrackerKind::Csrt => {
			let params = TrackerCSRT_Params::default()?;
			Box::new(CvTracker {
				kind,
				inner: TrackerCSRT::create(&params)?,
			})
		}
		TrackerKind::Kcf => {
			let params = TrackerKCF_Params::default()?;
			Box::new(CvTracker {
				kind,
				inner: TrackerKCF::create(params)?,
			})
		}
		TrackerKind::Boosting => {
			let params = legacy_TrackerBoosting_Params::default()?;
			Box::new(LegacyTracker {
				kind,
				inner: legacy_TrackerBoosting::create(&params)?,
			})
		}
		TrackerKind::Mosse => Box::new(LegacyTracker {
			kind,
			inner: legacy_TrackerMOSSE::create()?,
		}),
	})
}

/// Builds the OpenCV implementation of `kind`, or `None` when this OpenCV build can't.
pub fn create_tracker(kind: TrackerKind) -> Option<Box<dyn TrackerModule>> {
	match construct(kind) {
		Ok(tracker) => Some(tracker),
		Err(e) => {
			log::debug!("cannot create {} tracker: {}", kind, e);
			None
		}
	}
}

pub fn available_trackers(priority: &[TrackerKind]) -> Vec<TrackerKind> {
	priority
		.iter()
		.copied()
		.unique()
		.filter(|kind| create_tracker(*kind).is_some())
		.collect()
}
