mod codec;
pub mod handler;
mod preprocess;
pub mod segmentation;
mod service;
mod types;

pub use codec::{decode_image, encode_png};
pub use handler::create_removal_router;
pub use segmentation::{BackgroundRemover, U2NetRemover, apply_mask};
pub use service::{ProcessedImage, process_upload};
pub use types::{RemoveBgForm, UPLOAD_FIELD_PREFERENCE, Upload};
