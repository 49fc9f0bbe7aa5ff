//! 演示文稿生成：配色、版式与 PPTX 写出

pub mod builder;
pub mod decor;
pub mod dice;
pub mod palette;
pub mod pptx;
pub mod text;

pub use builder::DeckBuilder;
pub use dice::{Dice, FixedDice, ThreadDice};
pub use palette::{PALETTES, Palette, contrast_color, palette};
