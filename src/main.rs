use opencv::core::*;
use opencv::highgui;
use opencv::imgproc;
use opencv::prelude::*;

use anyhow::{bail, Context, Result};
use clap::Parser;
use itertools::Itertools;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

mod modules;
mod settings;

use crate::modules::input::{CaptureSource, VideoInput};
use crate::modules::overlay::{self, FpsCounter};
use crate::modules::select::{draw_box, SelectOutcome};
use crate::modules::tracker::{self, TrackerKind, TrackerState};
use crate::modules::{BoundingBox, InputModule, TrackerModule};
use crate::settings::{VisionSettings, SETTINGS_FILE};

static TRACK_WINDOW: &str = "Tracking - Press 'q' to quit";

#[derive(Parser, Debug)]
#[command(name = "ferrotrack", about = "Interactive single-object tracker")]
struct Args {
	/// Vision settings file; defaults are used when it does not exist
	#[arg(long, default_value = SETTINGS_FILE)]
	config: PathBuf,
	#[arg(long, value_name = "INDEX", conflicts_with = "video")]
	camera: Option<i32>,
	#[arg(long, value_name = "PATH")]
	video: Option<PathBuf>,
	/// Preferred tracker (CSRT, KCF, BOOSTING, MOSSE); skips the prompt
	#[arg(long)]
	tracker: Option<TrackerKind>,
}

// Main
fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let args = Args::parse();

	let mut vset = VisionSettings::load(&args.config)?;
	if let Some(camera) = args.camera {
		vset.input.camera = camera;
		vset.input.video = None;
	}
	if let Some(video) = args.video {
		vset.input.video = Some(video);
	}

	let preferred = choose_tracker(args.tracker.or(vset.tracker.preferred), &vset.tracker.priority)?;
	log::info!("Using tracker: {}", preferred);

	let mut input = VideoInput::open(&CaptureSource::from_settings(&vset.input), &vset.input)?;
	let first_frame = input.run()?.context("could not read from video source")?;
	let first_frame = overlay::resize_frame(first_frame, vset.display.max_width, vset.display.max_height)?;

	let bbox = match pick_box(&first_frame, &vset)? {
		Some(bbox) => bbox,
		None => {
			println!("No bounding box selected. Exiting.");
			return Ok(());
		}
	};
	let mut state = tracker::initialize_tracker(&first_frame, bbox, preferred, &vset.tracker.priority, tracker::create_tracker)?;
	log::info!("initialized {:?}", state.info());

	highgui::named_window(TRACK_WINDOW, highgui::WINDOW_NORMAL)?;
	let result = track(&mut input, &mut state, &vset);
	highgui::destroy_all_windows()?;
	result
}

/// Picks the preferred tracker, prompting on stdin unless `requested` is available.
fn choose_tracker(requested: Option<TrackerKind>, priority: &[TrackerKind]) -> Result<TrackerKind> {
	let available = tracker::available_trackers(priority);
	if available.is_empty() {
		bail!("No trackers available in this OpenCV build.");
	}
	log::debug!("available trackers: {}", available.iter().join(", "));

	if let Some(kind) = requested {
		if available.contains(&kind) {
			return Ok(kind);
		}
		log::warn!("{} tracker is not available in this OpenCV build", kind);
	}

	println!("Available trackers:");
	for (i, kind) in available.iter().enumerate() {
		println!("  {}. {}", i + 1, kind);
	}
	print!("Select tracker [1-{}]: ", available.len());
	io::stdout().flush()?;

	let mut line = String::new();
	io::stdin().lock().read_line(&mut line)?;
	match parse_choice(&line, available.len()) {
		Some(idx) => Ok(available[idx]),
		None => bail!("Invalid selection {:?}.", line.trim()),
	}
}

/// 1-based menu choice to a 0-based index.
fn parse_choice(line: &str, count: usize) -> Option<usize> {
	let choice: usize = line.trim().parse().ok()?;
	if choice >= 1 && choice <= count {
		Some(choice - 1)
	} else {
		None
	}
}

/// Runs the selector until it yields a box that fits `frame`, or the user gives up.
fn pick_box(frame: &Mat, vset: &VisionSettings) -> Result<Option<BoundingBox>> {
	let size = frame.size()?;
	loop {
		let bbox = match draw_box(frame, &vset.select)? {
			SelectOutcome::Selected(bbox) => bbox,
			SelectOutcome::Cancelled | SelectOutcome::TimedOut => return Ok(None),
		};
		match tracker::check_bounds(bbox, size.width, size.height) {
			Ok(()) => return Ok(Some(bbox)),
			Err(e) => {
				log::error!("{}", e);
				show_selection_error(frame, vset.display.error_pause_ms)?;
			}
		}
	}
}

fn show_selection_error(frame: &Mat, pause_ms: i32) -> Result<()> {
	let mut error_frame = frame.try_clone()?;
	imgproc::put_text(
		&mut error_frame,
		"Box out of frame. Please draw the box again.",
		Point::new(20, 200),
		imgproc::FONT_HERSHEY_SIMPLEX,
		0.8,
		Scalar::new(255., 255., 255., 0.),
		2,
		imgproc::LINE_8,
		false,
	)?;
	highgui::imshow(TRACK_WINDOW, &error_frame)?;
	highgui::wait_key(pause_ms)?;
	highgui::destroy_window(TRACK_WINDOW)?;
	Ok(())
}

fn track(input: &mut dyn InputModule, state: &mut TrackerState, vset: &VisionSettings) -> Result<()> {
	let mut fps = FpsCounter::new()?;
	let mut last_success = None;

	//Main Tracking Loop
	while let Some(frame) = input.run()? {
		let frame = overlay::resize_frame(frame, vset.display.max_width, vset.display.max_height)?;
		let mut shown = frame.try_clone()?;

		let (success, bbox) = state.update(&frame)?;
		if let Some(bbox) = bbox {
			overlay::draw_bounding_box(&mut shown, bbox, Scalar::new(255., 0., 0., 0.), 2)?;
		}
		if last_success != Some(success) {
			if success {
				log::info!("{} tracking at {}", state.kind(), state.bbox());
			} else {
				log::info!("{} lost the object, last seen at {}", state.kind(), state.bbox());
			}
			last_success = Some(success);
		}

		let rate = fps.tick()?;
		overlay::draw_status(&mut shown, success, rate, Point::new(10, 30), 30)?;

		highgui::imshow(TRACK_WINDOW, &shown)?;
		let key = highgui::wait_key(1)?;
		if key < 0 {
			continue;
		}
		match (key & 0xFF) as u8 {
			b'q' => break,
			b'r' => {
				if let Some(bbox) = pick_box(&frame, vset)? {
					if reset(state, &frame, bbox, &vset.tracker.priority, tracker::create_tracker) {
						last_success = None;
					}
				}
				highgui::named_window(TRACK_WINDOW, highgui::WINDOW_NORMAL)?;
			}
			_ => {}
		}
	}

	Ok(())
}

/// Moves tracking onto a reselected box. On failure `state` keeps tracking the old box.
fn reset<F>(state: &mut TrackerState, frame: &Mat, bbox: BoundingBox, priority: &[TrackerKind], factory: F) -> bool
where
	F: FnMut(TrackerKind) -> Option<Box<dyn TrackerModule>>,
{
	match state.reset(frame, bbox, priority, factory) {
		Ok(()) => {
			log::info!("reinitialized {:?}", state.info());
			true
		}
		Err(e) => {
			log::error!("{}; still tracking with {} at {}", e, state.kind(), state.bbox());
			false
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct StillTracker(TrackerKind);

	impl TrackerModule for StillTracker {
		fn kind(&self) -> TrackerKind {
			self.0
		}

		fn init(&mut self, _frame: &Mat, _bbox: BoundingBox) -> Result<bool> {
			Ok(true)
		}

		fn update(&mut self, _frame: &Mat) -> Result<Option<BoundingBox>> {
			Ok(None)
		}
	}

	fn only(kind: TrackerKind) -> impl FnMut(TrackerKind) -> Option<Box<dyn TrackerModule>> {
		move |k| -> Option<Box<dyn TrackerModule>> {
			if k == kind {
				Some(Box::new(StillTracker(k)))
			} else {
				None
			}
		}
	}

	fn frame() -> Mat {
		Mat::new_rows_cols_with_default(480, 640, CV_8UC3, Scalar::all(0.)).unwrap()
	}

	#[test]
	fn failed_reselect_keeps_tracking() {
		let first = BoundingBox::new(10, 10, 50, 50);
		let mut state =
			tracker::initialize_tracker(&frame(), first, TrackerKind::Kcf, &tracker::DEFAULT_PRIORITY, only(TrackerKind::Kcf)).unwrap();

		let none = |_: TrackerKind| -> Option<Box<dyn TrackerModule>> { None };
		assert!(!reset(&mut state, &frame(), BoundingBox::new(100, 100, 40, 40), &tracker::DEFAULT_PRIORITY, none));
		assert_eq!(state.kind(), TrackerKind::Kcf);
		assert_eq!(state.bbox(), first);

		assert!(!reset(&mut state, &frame(), BoundingBox::new(630, 100, 40, 40), &tracker::DEFAULT_PRIORITY, only(TrackerKind::Kcf)));
		assert_eq!(state.bbox(), first);
	}

	#[test]
	fn reselect_moves_to_new_box() {
		let mut state = tracker::initialize_tracker(
			&frame(),
			BoundingBox::new(10, 10, 50, 50),
			TrackerKind::Csrt,
			&tracker::DEFAULT_PRIORITY,
			only(TrackerKind::Csrt),
		)
		.unwrap();

		let next = BoundingBox::new(100, 100, 40, 40);
		assert!(reset(&mut state, &frame(), next, &tracker::DEFAULT_PRIORITY, only(TrackerKind::Csrt)));
		assert_eq!(state.bbox(), next);
	}

	#[test]
	fn menu_choices_are_one_based() {
		assert_eq!(parse_choice("1\n", 4), Some(0));
		assert_eq!(parse_choice(" 4 ", 4), Some(3));
		assert_eq!(parse_choice("0", 4), None);
		assert_eq!(parse_choice("5", 4), None);
		assert_eq!(parse_choice("csrt", 4), None);
		assert_eq!(parse_choice("", 4), None);
	}

	#[test]
	fn cli_accepts_tracker_names() {
		let args = Args::try_parse_from(["ferrotrack", "--tracker", "kcf", "--camera", "1"]).unwrap();
		assert_eq!(args.tracker, Some(TrackerKind::Kcf));
		assert_eq!(args.camera, Some(1));
		assert_eq!(args.config, PathBuf::from(SETTINGS_FILE));

		assert!(Args::try_parse_from(["ferrotrack", "--tracker", "goturn"]).is_err());
		assert!(Args::try_parse_from(["ferrotrack", "--camera", "0", "--video", "a.mp4"]).is_err());
	}
}
