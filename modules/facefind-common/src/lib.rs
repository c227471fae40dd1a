pub mod config;
pub mod image;
pub mod types;

pub use config::Config;
pub use image::{CapturedImage, ImageOrigin};
pub use types::*;
