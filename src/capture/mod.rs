//! Screen capture module
//!
//! This module consolidates:
//! - Captured frame type (image.rs)
//! - Frame source polling with timeout and cancellation (source.rs)

pub mod image;
pub mod source;

pub use self::image::CapturedFrame;
pub use source::{
    CancelHandle, CancelToken, FramePoll, FrameSource, cancel_pair, capture_frame,
    capture_with_config,
};
