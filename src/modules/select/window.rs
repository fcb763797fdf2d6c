use super::{remaining_secs, KeyAction, MouseOutcome, SelectOutcome, Selector};
use crate::modules::overlay;
use crate::settings::SelectSettings;

use opencv::core::*;
use opencv::highgui;
use opencv::imgproc;
use opencv::prelude::*;

use anyhow::{anyhow, Result};

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub static SELECT_WINDOW: &str = "Select Object (SPACE: Confirm, R: Reset, ESC: Cancel)";

/// Lets the user drag a box over `frame` and blocks until they confirm or give up.
pub fn draw_box(frame: &Mat, settings: &SelectSettings) -> Result<SelectOutcome> {
	let selector = Arc::new(Mutex::new(Selector::new(settings.min_size)));

	highgui::named_window(SELECT_WINDOW, highgui::WINDOW_AUTOSIZE)?;
	let callback_selector = Arc::clone(&selector);
	highgui::set_mouse_callback(
		SELECT_WINDOW,
		Some(Box::new(move |event: i32, x: i32, y: i32, _flags: i32| {
			if let Ok(mut selector) = callback_selector.lock() {
				if selector.on_mouse(event, x, y) == MouseOutcome::TooSmall {
					println!("Selection too small. Please try again.");
				}
			}
		})),
	)?;

	println!("\nInstructions:\n 1. Click and drag to draw box\n 2. SPACE to confirm\n 3. R to reset\n 4. ESC to cancel");

	let outcome = run(frame, settings, &selector);
	highgui::set_mouse_callback(SELECT_WINDOW, None)?;
	highgui::destroy_window(SELECT_WINDOW)?;
	outcome
}

fn run(frame: &Mat, settings: &SelectSettings, selector: &Mutex<Selector>) -> Result<SelectOutcome> {
	let timeout = Duration::from_secs(settings.timeout_sec);
	let mut start = Instant::now();

	loop {
		let remaining = remaining_secs(timeout, start.elapsed());
		if remaining <= 0 {
			println!("Timeout: No selection made in {} seconds.", settings.timeout_sec);
			return Ok(SelectOutcome::TimedOut);
		}

		let preview = lock(selector)?.preview();
		let mut display = frame.try_clone()?;
		if let Some(bbox) = preview {
			overlay::draw_bounding_box(&mut display, bbox, Scalar::new(0., 255., 0., 0.), 2)?;
		}
		imgproc::put_text(
			&mut display,
			&format!("Time left: {}s", remaining),
			Point::new(10, 25),
			imgproc::FONT_HERSHEY_SIMPLEX,
			0.7,
			Scalar::new(0., 0., 255., 0.),
			2,
			imgproc::LINE_8,
			false,
		)?;
		highgui::imshow(SELECT_WINDOW, &display)?;

		match KeyAction::from_key(highgui::wait_key(1)?) {
			KeyAction::Cancel => {
				println!("Selection cancelled.");
				return Ok(SelectOutcome::Cancelled);
			}
			KeyAction::Reset => {
				lock(selector)?.reset();
				println!("Selection reset.");
				start = Instant::now();
			}
			KeyAction::Confirm => match lock(selector)?.selection() {
				Some(bbox) => {
					println!("Object selected: {}", bbox);
					return Ok(SelectOutcome::Selected(bbox));
				}
				None => println!("No valid selection yet."),
			},
			KeyAction::None => {}
		}
	}
}

fn lock(selector: &Mutex<Selector>) -> Result<std::sync::MutexGuard<'_, Selector>> {
	selector.lock().map_err(|_| anyhow!("selection state poisoned"))
}
