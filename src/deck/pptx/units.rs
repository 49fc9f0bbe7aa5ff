//! 长度单位与颜色
//!
//! DrawingML 使用 EMU：914400 EMU = 1 英寸，12700 EMU = 1 磅

use std::fmt;

pub const EMU_PER_INCH: i64 = 914_400;
pub const EMU_PER_POINT: i64 = 12_700;

/// 英寸转 EMU
pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

/// 磅转 EMU
pub fn points(value: f64) -> i64 {
    (value * EMU_PER_POINT as f64).round() as i64
}

/// 24 位 RGB 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// 解析 `#RRGGBB` 或 `RRGGBB`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let h = hex.trim().trim_start_matches('#');
        if h.len() != 6 || !h.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&h[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// 感知亮度（0-255）
    pub fn brightness(&self) -> f64 {
        (self.0 as f64 * 299.0 + self.1 as f64 * 587.0 + self.2 as f64 * 114.0) / 1000.0
    }
}

/// 输出为 `srgbClr` 所需的大写十六进制
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}
