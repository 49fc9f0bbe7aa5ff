//! 配色方案

use super::pptx::Rgb;

/// 一套配色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    pub primary: Rgb,
    pub secondary: Rgb,
    pub accent: Rgb,
    /// 深色背景上的文字颜色
    pub text: Rgb,
    pub text_dark: Rgb,
    pub gradient_start: Rgb,
    pub gradient_end: Rgb,
}

const fn rgb(hex: u32) -> Rgb {
    Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

pub const PALETTES: [Palette; 20] = [
    Palette {
        name: "Corporate Blue",
        primary: rgb(0x1E3A8A),
        secondary: rgb(0x3B82F6),
        accent: rgb(0x60A5FA),
        text: rgb(0xFFFFFF),
        text_dark: rgb(0x1F2937),
        gradient_start: rgb(0x1E3A8A),
        gradient_end: rgb(0x3B82F6),
    },
    Palette {
        name: "Elegant Gray",
        primary: rgb(0x4B5563),
        secondary: rgb(0x6B7280),
        accent: rgb(0x9CA3AF),
        text: rgb(0xF9FAFB),
        text_dark: rgb(0x111827),
        gradient_start: rgb(0x4B5563),
        gradient_end: rgb(0x9CA3AF),
    },
    Palette {
        name: "Forest Green",
        primary: rgb(0x065F46),
        secondary: rgb(0x10B981),
        accent: rgb(0x34D399),
        text: rgb(0xECFDF5),
        text_dark: rgb(0x064E3B),
        gradient_start: rgb(0x065F46),
        gradient_end: rgb(0x10B981),
    },
    Palette {
        name: "Sunset Orange",
        primary: rgb(0xC2410C),
        secondary: rgb(0xF97316),
        accent: rgb(0xFB923C),
        text: rgb(0xFFF7ED),
        text_dark: rgb(0x7C2D12),
        gradient_start: rgb(0xC2410C),
        gradient_end: rgb(0xF97316),
    },
    Palette {
        name: "Royal Purple",
        primary: rgb(0x5B21B6),
        secondary: rgb(0x8B5CF6),
        accent: rgb(0xA78BFA),
        text: rgb(0xF3E8FF),
        text_dark: rgb(0x3B0764),
        gradient_start: rgb(0x5B21B6),
        gradient_end: rgb(0x8B5CF6),
    },
    Palette {
        name: "Ocean Teal",
        primary: rgb(0x0F766E),
        secondary: rgb(0x14B8A6),
        accent: rgb(0x2DD4BF),
        text: rgb(0xE0F2FE),
        text_dark: rgb(0x134E4A),
        gradient_start: rgb(0x0F766E),
        gradient_end: rgb(0x14B8A6),
    },
    Palette {
        name: "Warm Sand",
        primary: rgb(0x92400E),
        secondary: rgb(0xD97706),
        accent: rgb(0xF59E0B),
        text: rgb(0xFFF8E1),
        text_dark: rgb(0x78350F),
        gradient_start: rgb(0x92400E),
        gradient_end: rgb(0xD97706),
    },
    Palette {
        name: "Modern Slate",
        primary: rgb(0x1E293B),
        secondary: rgb(0x334155),
        accent: rgb(0x64748B),
        text: rgb(0xF1F5F9),
        text_dark: rgb(0x0F172A),
        gradient_start: rgb(0x1E293B),
        gradient_end: rgb(0x334155),
    },
    Palette {
        name: "Deep Crimson",
        primary: rgb(0x7F1D1D),
        secondary: rgb(0xB91C1C),
        accent: rgb(0xEF4444),
        text: rgb(0xFEF2F2),
        text_dark: rgb(0x4B0505),
        gradient_start: rgb(0x7F1D1D),
        gradient_end: rgb(0xB91C1C),
    },
    Palette {
        name: "Cool Indigo",
        primary: rgb(0x4338CA),
        secondary: rgb(0x6366F1),
        accent: rgb(0x818CF8),
        text: rgb(0xEEF2FF),
        text_dark: rgb(0x312E81),
        gradient_start: rgb(0x4338CA),
        gradient_end: rgb(0x6366F1),
    },
    Palette {
        name: "Fresh Lime",
        primary: rgb(0x365314),
        secondary: rgb(0x4ADE80),
        accent: rgb(0xA7F3D0),
        text: rgb(0xF0FDF4),
        text_dark: rgb(0x1C2F0E),
        gradient_start: rgb(0x365314),
        gradient_end: rgb(0x4ADE80),
    },
    Palette {
        name: "Midnight Black",
        primary: rgb(0x111827),
        secondary: rgb(0x374151),
        accent: rgb(0x6B7280),
        text: rgb(0xF9FAFB),
        text_dark: rgb(0x000000),
        gradient_start: rgb(0x111827),
        gradient_end: rgb(0x374151),
    },
    Palette {
        name: "Soft Coral",
        primary: rgb(0xBE123C),
        secondary: rgb(0xF43F5E),
        accent: rgb(0xFCA5A5),
        text: rgb(0xFFF1F2),
        text_dark: rgb(0x831843),
        gradient_start: rgb(0xBE123C),
        gradient_end: rgb(0xF43F5E),
    },
    Palette {
        name: "Steel Blue",
        primary: rgb(0x1E40AF),
        secondary: rgb(0x3B82F6),
        accent: rgb(0x60A5FA),
        text: rgb(0xE0E7FF),
        text_dark: rgb(0x1E3A8A),
        gradient_start: rgb(0x1E40AF),
        gradient_end: rgb(0x3B82F6),
    },
    Palette {
        name: "Bright Cyan",
        primary: rgb(0x0E7490),
        secondary: rgb(0x22D3EE),
        accent: rgb(0x67E8F9),
        text: rgb(0xECFEFF),
        text_dark: rgb(0x164E63),
        gradient_start: rgb(0x0E7490),
        gradient_end: rgb(0x22D3EE),
    },
    Palette {
        name: "Goldenrod",
        primary: rgb(0xB45309),
        secondary: rgb(0xFBBF24),
        accent: rgb(0xFCD34D),
        text: rgb(0xFFFBEB),
        text_dark: rgb(0x78350F),
        gradient_start: rgb(0xB45309),
        gradient_end: rgb(0xFBBF24),
    },
    Palette {
        name: "Classic Navy",
        primary: rgb(0x0C4A6E),
        secondary: rgb(0x2563EB),
        accent: rgb(0x60A5FA),
        text: rgb(0xEFF6FF),
        text_dark: rgb(0x1E3A8A),
        gradient_start: rgb(0x0C4A6E),
        gradient_end: rgb(0x2563EB),
    },
    Palette {
        name: "Rich Burgundy",
        primary: rgb(0x6B0218),
        secondary: rgb(0x9F1239),
        accent: rgb(0xDC2626),
        text: rgb(0xFEE2E2),
        text_dark: rgb(0x4B0109),
        gradient_start: rgb(0x6B0218),
        gradient_end: rgb(0x9F1239),
    },
    Palette {
        name: "Vibrant Orange",
        primary: rgb(0xC2410C),
        secondary: rgb(0xF97316),
        accent: rgb(0xFDBA74),
        text: rgb(0xFFF7ED),
        text_dark: rgb(0x7C2D12),
        gradient_start: rgb(0xC2410C),
        gradient_end: rgb(0xF97316),
    },
    Palette {
        name: "Dusty Rose",
        primary: rgb(0x881337),
        secondary: rgb(0xBE185D),
        accent: rgb(0xF472B6),
        text: rgb(0xFFF1F2),
        text_dark: rgb(0x4B0630),
        gradient_start: rgb(0x881337),
        gradient_end: rgb(0xBE185D),
    },
];

/// 按索引取配色，越界时取模
pub fn palette(index: usize) -> &'static Palette {
    &PALETTES[index % PALETTES.len()]
}

/// 亮度大于 128 用黑字，否则白字
pub fn contrast_color(background: Rgb) -> Rgb {
    if background.brightness() > 128.0 {
        Rgb::BLACK
    } else {
        Rgb::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_wraps_around() {
        assert_eq!(palette(0).name, "Corporate Blue");
        assert_eq!(palette(19).name, "Dusty Rose");
        assert_eq!(palette(20).name, "Corporate Blue");
        assert_eq!(palette(43).name, "Sunset Orange");
    }

    #[test]
    fn test_palette_colors_match_hex() {
        let corporate = palette(0);
        assert_eq!(Some(corporate.primary), Rgb::from_hex("#1E3A8A"));
        assert_eq!(corporate.text, Rgb::WHITE);
        assert_eq!(palette(11).text_dark, Rgb::BLACK);
    }

    #[test]
    fn test_contrast_color() {
        // 亮度 (0x60*299 + 0xA5*587 + 0xFA*114)/1000 ≈ 154
        assert_eq!(contrast_color(Rgb(0x60, 0xA5, 0xFA)), Rgb::BLACK);
        assert_eq!(contrast_color(Rgb(0x1E, 0x3A, 0x8A)), Rgb::WHITE);
        // 恰好 128 时仍为白色
        assert_eq!(contrast_color(Rgb(128, 128, 128)), Rgb::WHITE);
    }
}
