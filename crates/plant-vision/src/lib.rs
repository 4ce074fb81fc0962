//! plant-vision: frame sources and the single-frame verticality pipeline
//!
//! A raw frame is cropped, turned into a silhouette mask, reduced to its
//! centroid and tested against a region of interest. The pixel work sits
//! behind [`ImageOps`]; frame acquisition behind [`FrameSource`], with a
//! scripted `mock` backend on by default and an OpenCV device backend behind
//! the `opencv` feature.

mod types;
pub use types::{BinaryMask, Centroid, Frame, PixelFormat, Point, Rect};

mod error;
pub use error::{Error, Result};

mod traits;
pub use traits::{FrameSource, ImageOps, Moments};

pub mod morphology;
pub use morphology::NativeOps;

pub mod centroid;
pub mod crop;
pub mod region;
pub mod silhouette;
pub use silhouette::SilhouetteParams;

mod detect;
pub use detect::{detect, detect_with, Detection};

pub mod io;

mod dir;
pub use dir::DirectorySource;

#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "mock")]
pub use mock::{MockCamera, SyntheticScene};

#[cfg(feature = "opencv")]
mod opencv_backend;
#[cfg(feature = "opencv")]
pub use opencv_backend::OpenCvSource;
