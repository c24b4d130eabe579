mod services;

pub use services::{mime_from_file_name, CapturedImage, ImageError};
