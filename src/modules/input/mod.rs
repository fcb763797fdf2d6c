mod video;

pub use video::{CaptureSource, VideoInput};
