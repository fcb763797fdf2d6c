pub mod input;
pub mod overlay;
pub mod select;
pub mod tracker;

use opencv::core::*;

use anyhow::Result;

use std::fmt;

/// Axis-aligned box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
	pub x: i32,
	pub y: i32,
	pub width: i32,
	pub height: i32,
}

impl BoundingBox {
	pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
		Self { x, y, width, height }
	}

	/// Normalises two opposite corners, in any order, into a box.
	pub fn from_corners(a: (i32, i32), b: (i32, i32)) -> Self {
		Self {
			x: a.0.min(b.0),
			y: a.1.min(b.1),
			width: (b.0 - a.0).abs(),
			height: (b.1 - a.1).abs(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.width <= 0 || self.height <= 0
	}

	pub fn fits_within(&self, frame_width: i32, frame_height: i32) -> bool {
		let right = self.x as i64 + self.width as i64;
		let bottom = self.y as i64 + self.height as i64;
		self.x >= 0 && self.y >= 0 && right <= frame_width as i64 && bottom <= frame_height as i64
	}
}

impl fmt::Display for BoundingBox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}, {}, {}, {})", self.x, self.y, self.width, self.height)
	}
}

impl From<Rect> for BoundingBox {
	fn from(r: Rect) -> Self {
		Self::new(r.x, r.y, r.width, r.height)
	}
}

impl From<BoundingBox> for Rect {
	fn from(b: BoundingBox) -> Self {
		Rect::new(b.x, b.y, b.width, b.height)
	}
}

// Legacy trackers report sub-pixel boxes; they are truncated like every other box.
impl From<Rect2d> for BoundingBox {
	fn from(r: Rect2d) -> Self {
		Self::new(r.x as i32, r.y as i32, r.width as i32, r.height as i32)
	}
}

impl From<BoundingBox> for Rect2d {
	fn from(b: BoundingBox) -> Self {
		Rect2d::new(b.x as f64, b.y as f64, b.width as f64, b.height as f64)
	}
}

pub trait InputModule {
	/// Next frame, or `None` once the stream has ended.
	fn run(&mut self) -> Result<Option<Mat>>;
}

pub trait TrackerModule {
	fn kind(&self) -> tracker::TrackerKind;
	fn init(&mut self, frame: &Mat, bbox: BoundingBox) -> Result<bool>;
	fn update(&mut self, frame: &Mat) -> Result<Option<BoundingBox>>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn corners_in_any_order_normalise() {
		let expected = BoundingBox::new(10, 20, 30, 40);
		assert_eq!(BoundingBox::from_corners((10, 20), (40, 60)), expected);
		assert_eq!(BoundingBox::from_corners((40, 60), (10, 20)), expected);
		assert_eq!(BoundingBox::from_corners((40, 20), (10, 60)), expected);
	}

	#[test]
	fn fits_within_touches_edges() {
		assert!(BoundingBox::new(0, 0, 640, 480).fits_within(640, 480));
		assert!(!BoundingBox::new(1, 0, 640, 480).fits_within(640, 480));
		assert!(!BoundingBox::new(-1, 5, 10, 10).fits_within(640, 480));
		assert!(!BoundingBox::new(5, 475, 10, 10).fits_within(640, 480));
	}

	#[test]
	fn extreme_boxes_do_not_overflow() {
		assert!(!BoundingBox::new(i32::MAX, 0, i32::MAX, 10).fits_within(640, 480));
		assert!(!BoundingBox::new(0, 1, 10, i32::MAX).fits_within(i32::MAX, i32::MAX));
		assert!(BoundingBox::new(0, 0, i32::MAX, 1).fits_within(i32::MAX, 1));
	}

	#[test]
	fn rect2d_truncates() {
		let b: BoundingBox = Rect2d::new(10.9, 20.2, 30.7, 40.5).into();
		assert_eq!(b, BoundingBox::new(10, 20, 30, 40));
	}

	#[test]
	fn empty_boxes() {
		assert!(BoundingBox::new(0, 0, 0, 10).is_empty());
		assert!(BoundingBox::new(0, 0, 10, -1).is_empty());
		assert!(!BoundingBox::new(0, 0, 1, 1).is_empty());
	}
}
