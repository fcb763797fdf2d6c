mod window;

pub use window::draw_box;

use crate::modules::BoundingBox;

use opencv::highgui;

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
	Selected(BoundingBox),
	Cancelled,
	TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseOutcome {
	Ignored,
	Dragging,
	Accepted(BoundingBox),
	TooSmall,
}

/// Mouse-drag box selection.
#[derive(Debug, Clone)]
pub struct Selector {
	min_size: i32,
	anchor: Option<(i32, i32)>,
	cursor: (i32, i32),
	selection: Option<BoundingBox>,
}

impl Selector {
	pub fn new(min_size: i32) -> Self {
		Self {
			min_size,
			anchor: None,
			cursor: (0, 0),
			selection: None,
		}
	}

	pub fn on_mouse(&mut self, event: i32, x: i32, y: i32) -> MouseOutcome {
		match event {
			highgui::EVENT_LBUTTONDOWN => self.press(x, y),
			highgui::EVENT_MOUSEMOVE => self.drag(x, y),
			highgui::EVENT_LBUTTONUP => self.release(x, y),
			_ => MouseOutcome::Ignored,
		}
	}

	pub fn press(&mut self, x: i32, y: i32) -> MouseOutcome {
		self.anchor = Some((x, y));
		self.cursor = (x, y);
		self.selection = None;
		MouseOutcome::Dragging
	}

	pub fn drag(&mut self, x: i32, y: i32) -> MouseOutcome {
		if self.anchor.is_none() {
			return MouseOutcome::Ignored;
		}
		self.cursor = (x, y);
		MouseOutcome::Dragging
	}

	pub fn release(&mut self, x: i32, y: i32) -> MouseOutcome {
		let anchor = match self.anchor.take() {
			Some(anchor) => anchor,
			None => return MouseOutcome::Ignored,
		};
		let bbox = BoundingBox::from_corners(anchor, (x, y));
		if bbox.width > self.min_size && bbox.height > self.min_size {
			self.selection = Some(bbox);
			MouseOutcome::Accepted(bbox)
		} else {
			self.selection = None;
			MouseOutcome::TooSmall
		}
	}

	pub fn reset(&mut self) {
		self.anchor = None;
		self.selection = None;
	}

	pub fn selection(&self) -> Option<BoundingBox> {
		self.selection
	}

	/// The rectangle to draw: the live drag if one is in progress, else the accepted box.
	pub fn preview(&self) -> Option<BoundingBox> {
		match self.anchor {
			Some(anchor) => Some(BoundingBox::from_corners(anchor, self.cursor)),
			None => self.selection,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
	None,
	Cancel,
	Reset,
	Confirm,
}

impl KeyAction {
	pub fn from_key(key: i32) -> Self {
		if key < 0 {
			return KeyAction::None;
		}
		match (key & 0xFF) as u8 {
			27 => KeyAction::Cancel,
			b'r' => KeyAction::Reset,
			b' ' => KeyAction::Confirm,
			_ => KeyAction::None,
		}
	}
}

/// Whole seconds left, truncated toward zero; `<= 0` means the countdown has run out.
pub fn remaining_secs(timeout: Duration, elapsed: Duration) -> i64 {
	(timeout.as_secs_f64() - elapsed.as_secs_f64()) as i64
}
