mod fps;

pub use fps::FpsCounter;

use crate::modules::BoundingBox;

use opencv::core::*;
use opencv::imgproc;
use opencv::prelude::*;

use anyhow::Result;

const WHITE: (f64, f64, f64) = (255., 255., 255.);
const BLACK: (f64, f64, f64) = (0., 0., 0.);

fn bgr(c: (f64, f64, f64)) -> Scalar {
	Scalar::new(c.0, c.1, c.2, 0.)
}

/// Outlines `bbox` with corners at `(x, y)` and `(x + width, y + height)`.
pub fn draw_bounding_box(frame: &mut Mat, bbox: BoundingBox, color: Scalar, thickness: i32) -> Result<()> {
	imgproc::rectangle_points(
		frame,
		Point::new(bbox.x, bbox.y),
		Point::new(bbox.x.saturating_add(bbox.width), bbox.y.saturating_add(bbox.height)),
		color,
		thickness,
		imgproc::LINE_8,
		0,
	)?;
	Ok(())
}

/// Text on a filled background box padded by 5px.
pub fn draw_text(frame: &mut Mat, text: &str, origin: Point, font_scale: f64, color: Scalar, thickness: i32, bg_color: Scalar) -> Result<()> {
	let font = imgproc::FONT_HERSHEY_SIMPLEX;
	let mut baseline = 0;
	let size = imgproc::get_text_size(text, font, font_scale, thickness, &mut baseline)?;

	imgproc::rectangle_points(
		frame,
		Point::new(origin.x - 5, origin.y - size.height - 5),
		Point::new(origin.x + size.width + 5, origin.y + baseline + 5),
		bg_color,
		imgproc::FILLED,
		imgproc::LINE_8,
		0,
	)?;
	imgproc::put_text(frame, text, origin, font, font_scale, color, thickness, imgproc::LINE_8, false)?;
	Ok(())
}

pub fn status_lines(success: bool, fps: f64) -> [(String, Scalar); 2] {
	let status = if success {
		("Tracking: SUCCESS".to_string(), Scalar::new(0., 255., 0., 0.))
	} else {
		("Tracking: LOST".to_string(), Scalar::new(0., 0., 255., 0.))
	};
	[(format!("FPS: {:.1}", fps), bgr(WHITE)), status]
}

pub fn draw_status(frame: &mut Mat, success: bool, fps: f64, origin: Point, spacing: i32) -> Result<()> {
	for (i, (text, color)) in status_lines(success, fps).iter().enumerate() {
		let at = Point::new(origin.x, origin.y + spacing * i as i32);
		draw_text(frame, text, at, 0.5, *color, 2, bgr(BLACK))?;
	}
	Ok(())
}

/// Target size that fits `width`x`height` inside the limits, or `None` if it already fits.
pub fn fit_size(width: i32, height: i32, max_width: Option<i32>, max_height: Option<i32>) -> Option<Size> {
	let scale_w = match max_width {
		Some(max) if width > max => max as f64 / width as f64,
		_ => 1.0,
	};
	let scale_h = match max_height {
		Some(max) if height > max => max as f64 / height as f64,
		_ => 1.0,
	};
	let scale = scale_w.min(scale_h);
	if scale < 1.0 {
		Some(Size::new((width as f64 * scale) as i32, (height as f64 * scale) as i32))
	} else {
		None
	}
}

pub fn resize_frame(frame: Mat, max_width: Option<i32>, max_height: Option<i32>) -> Result<Mat> {
	match fit_size(frame.cols(), frame.rows(), max_width, max_height) {
		Some(size) => {
			let mut resized = Mat::default();
			imgproc::resize(&frame, &mut resized, size, 0., 0., imgproc::INTER_LINEAR)?;
			Ok(resized)
		}
		None => Ok(frame),
	}
}
