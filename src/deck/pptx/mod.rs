//! 最小 PPTX 写入器
//!
//! 只支持本项目用到的元素：渐变或纯色背景、预设形状、文本框、图片。

mod package;
pub mod presentation;
pub mod shape;
pub mod slide;
pub mod units;
pub mod xml;

pub use package::{image_extension, sniff_image};
pub use presentation::Presentation;
pub use shape::{Align, AutoShape, Fill, Frame, Geometry, Picture, Shadow, Shape, TextBox, TextStyle};
pub use slide::{Background, Slide};
pub use units::{EMU_PER_INCH, EMU_PER_POINT, Rgb, inches, points};
