//! 演示文稿组装
//!
//! 结构固定：标题页、目录页，然后每个内容页一张。
//! 内容页编号为 `slide_number + 2`。

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, warn};

use super::decor::{
    filled, premium_content_elements, premium_title_elements, random_elements, title_decoration,
};
use super::dice::{Dice, ThreadDice};
use super::palette::{Palette, contrast_color, palette};
use super::pptx::{
    Align, Background, Frame, Geometry, Picture, Presentation, Rgb, Shape, Slide, TextBox,
    TextStyle, sniff_image,
};
use super::text::{split_lines, title_font_size};
use crate::config::Profile;
use crate::errors::Result;
use crate::planner::{ContentSlide, DeckPlan, PresentationMeta, TocSection};

const DEFAULT_TITLE: &str = "Professional Presentation";
const DEFAULT_SUBTITLE_CLASSIC: &str = "Comprehensive Analysis and Strategic Insights";
const DEFAULT_SUBTITLE: &str = "Comprehensive Analysis";
const DEFAULT_SLIDE_TITLE_CLASSIC: &str = "Slide Title";
const DEFAULT_SLIDE_TITLE: &str = "Untitled Slide";
const DEFAULT_POINT: &str = "Important content goes here";
/// 方框版式没有要点时的占位
const DEFAULT_BOX_POINT: &str = "Key content not specified";

/// 全屏版式中使用方框布局的概率
const BOXED_LAYOUT_CHANCE: f64 = 0.3;

fn text_box(frame: Frame, text: impl Into<String>, style: TextStyle) -> Shape {
    Shape::Text(TextBox {
        frame,
        text: text.into(),
        style,
    })
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() { default } else { value }
}

/// 圆点 + 文本的项目符号
fn bullet(
    dot: Frame,
    text_frame: Frame,
    text: &str,
    size_pt: f64,
    palette: &Palette,
) -> [Shape; 2] {
    [
        filled(Geometry::Ellipse, dot, palette.accent, 0.0),
        text_box(text_frame, text, TextStyle::new(size_pt, palette.text)),
    ]
}

pub struct DeckBuilder {
    profile: Profile,
}

impl DeckBuilder {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// 组装并打包为 .pptx 字节
    ///
    /// `images` 为 slide_number → 图片路径；读不到的图片退回纯文本版式
    pub fn build(
        &self,
        plan: &DeckPlan,
        images: &HashMap<u32, PathBuf>,
        palette_index: usize,
    ) -> Result<Vec<u8>> {
        self.build_with_dice(plan, images, palette_index, &mut ThreadDice)
    }

    pub fn build_with_dice(
        &self,
        plan: &DeckPlan,
        images: &HashMap<u32, PathBuf>,
        palette_index: usize,
        dice: &mut dyn Dice,
    ) -> Result<Vec<u8>> {
        let presentation = self.compose(plan, images, palette_index, dice);
        presentation.to_bytes()
    }

    /// 生成内存中的演示文稿结构
    pub fn compose(
        &self,
        plan: &DeckPlan,
        images: &HashMap<u32, PathBuf>,
        palette_index: usize,
        dice: &mut dyn Dice,
    ) -> Presentation {
        let palette = palette(palette_index);
        let (width, height) = self.profile.canvas();
        let mut presentation = Presentation::new(width, height);
        presentation.title = or_default(&plan.meta.title, DEFAULT_TITLE).to_string();
        if self.profile.decorated() {
            presentation.master_background = Some(palette.gradient_start);
        }

        debug!(
            "Composing {} content slides with palette '{}' ({} profile)",
            plan.content_slides.len(),
            palette.name,
            self.profile
        );

        presentation.add_slide(self.title_slide(&plan.meta, palette, dice));
        presentation.add_slide(self.toc_slide(&plan.table_of_contents, palette));

        for slide in &plan.content_slides {
            let image = if slide.has_image {
                images.get(&slide.number()).and_then(|path| match std::fs::read(path) {
                    Ok(data) if sniff_image(&data).is_some() => Some(data),
                    Ok(_) => {
                        warn!(
                            "Image {} is empty or not a picture, using text layout",
                            path.display()
                        );
                        None
                    }
                    Err(e) => {
                        warn!(
                            "Failed to read image {}: {}, using text layout",
                            path.display(),
                            e
                        );
                        None
                    }
                })
            } else {
                None
            };
            let number = slide.number() + 2;
            debug!("Creating slide {}: {}", number, slide.title);
            presentation.add_slide(self.content_slide(slide, image, number, palette, dice));
        }

        presentation
    }

    fn title_slide(&self, meta: &PresentationMeta, palette: &Palette, dice: &mut dyn Dice) -> Slide {
        let mut slide = Slide::with_background(Background::diagonal(
            palette.gradient_start,
            palette.gradient_end,
        ));

        if !self.profile.decorated() {
            let title = or_default(&meta.title, DEFAULT_TITLE);
            let subtitle = or_default(&meta.subtitle, DEFAULT_SUBTITLE_CLASSIC);
            slide
                .push(text_box(
                    Frame::inches(1.0, 2.5, 8.0, 2.0),
                    title,
                    TextStyle::new(48.0, palette.text).bold().align(Align::Center),
                ))
                .push(text_box(
                    Frame::inches(1.0, 4.8, 8.0, 1.2),
                    subtitle,
                    TextStyle::new(24.0, palette.text).align(Align::Center),
                ))
                .push(filled(
                    Geometry::Rect,
                    Frame::inches(3.5, 6.2, 3.0, 0.1),
                    palette.accent,
                    0.0,
                ));
            return slide;
        }

        slide.extend(premium_title_elements(palette));

        let title = or_default(&meta.title, DEFAULT_TITLE);
        slide.push(text_box(
            Frame::inches(0.5, 1.8, 9.0, 1.8),
            title,
            TextStyle::new(title_font_size(title), palette.text)
                .bold()
                .align(Align::Center),
        ));

        let lines = split_lines(or_default(&meta.subtitle, DEFAULT_SUBTITLE), 60);
        let height = lines.len().max(1) as f64 * 0.6;
        slide.push(text_box(
            Frame::inches(0.5, 4.0, 9.0, height),
            lines.join("\n"),
            TextStyle::new(20.0, palette.text).align(Align::Center),
        ));

        slide.extend(title_decoration(palette, dice));
        slide
    }

    fn toc_slide(&self, sections: &[TocSection], palette: &Palette) -> Slide {
        let mut slide = Slide::with_background(Background::vertical(
            palette.gradient_start,
            palette.gradient_end,
        ));
        slide
            .push(text_box(
                Frame::inches(1.0, 0.8, 8.0, 1.0),
                "Table of Contents",
                TextStyle::new(36.0, palette.text).bold().align(Align::Center),
            ))
            .push(filled(
                Geometry::Rect,
                Frame::inches(3.0, 1.9, 4.0, 0.05),
                palette.accent,
                0.0,
            ));

        for (i, section) in sections.iter().enumerate() {
            let y = 2.5 + i as f64 * 0.8;
            let number = section.section_number.unwrap_or(i as u32 + 1);
            let title = if section.section_title.trim().is_empty() {
                format!("Section {}", number)
            } else {
                section.section_title.clone()
            };
            let range = match section.slide_range_label() {
                label if label.is_empty() => format!("Slide {}", number),
                label => label,
            };

            slide
                .push(filled(
                    Geometry::Ellipse,
                    Frame::inches(1.5, y, 0.6, 0.6),
                    palette.accent,
                    0.0,
                ))
                .push(text_box(
                    Frame::inches(1.5, y, 0.6, 0.6),
                    number.to_string(),
                    TextStyle::new(20.0, palette.text).bold().align(Align::Center),
                ))
                .push(text_box(
                    Frame::inches(2.5, y, 5.5, 0.6),
                    title,
                    TextStyle::new(18.0, palette.text).bold(),
                ))
                .push(text_box(
                    Frame::inches(8.2, y, 1.5, 0.6),
                    range,
                    TextStyle::new(14.0, palette.text).align(Align::Right),
                ));
        }
        slide
    }

    fn content_slide(
        &self,
        data: &ContentSlide,
        image: Option<Vec<u8>>,
        number: u32,
        palette: &Palette,
        dice: &mut dyn Dice,
    ) -> Slide {
        let mut slide = Slide::with_background(Background::vertical(
            palette.gradient_start,
            palette.gradient_end,
        ));

        if self.profile.decorated() {
            slide.extend(premium_content_elements(palette));
        }

        // 页码角标
        let badge = Frame::inches(9.0, 0.2, 0.8, 0.4);
        slide.push(filled(Geometry::RoundRect, badge, palette.accent, 0.0));
        if self.profile == Profile::Enhanced {
            slide.extend(random_elements(palette, dice));
        }
        slide.push(text_box(
            badge,
            number.to_string(),
            TextStyle::new(16.0, palette.text).bold().align(Align::Center),
        ));

        match self.profile {
            Profile::Classic | Profile::Enhanced => match image {
                Some(data_bytes) => self.image_layout(&mut slide, data, data_bytes, palette),
                None => self.text_layout(&mut slide, data, palette),
            },
            Profile::Fullscreen => self.fullscreen_layout(&mut slide, data, image, palette, dice),
        }
        slide
    }

    fn text_layout(&self, slide: &mut Slide, data: &ContentSlide, palette: &Palette) {
        slide
            .push(text_box(
                Frame::inches(0.8, 1.0, 8.4, 1.2),
                or_default(&data.title, DEFAULT_SLIDE_TITLE_CLASSIC),
                TextStyle::new(32.0, palette.text).bold(),
            ))
            .push(filled(
                Geometry::Rect,
                Frame::inches(0.8, 2.3, 3.0, 0.05),
                palette.accent,
                0.0,
            ));

        for (i, point) in data.content_points.iter().take(5).enumerate() {
            let y = 3.0 + i as f64 * 0.8;
            slide.extend(bullet(
                Frame::inches(1.0, y, 0.15, 0.15),
                Frame::inches(1.4, y - 0.15, 7.4, 0.6),
                point,
                16.0,
                palette,
            ));
        }
    }

    fn image_layout(&self, slide: &mut Slide, data: &ContentSlide, image: Vec<u8>, palette: &Palette) {
        slide
            .push(Shape::Picture(Picture {
                frame: Frame::inches(5.5, 1.5, 3.8, 3.8),
                data: image,
                description: data.image_concept.clone().unwrap_or_default(),
            }))
            .push(text_box(
                Frame::inches(0.8, 0.6, 8.0, 1.0),
                or_default(&data.title, DEFAULT_SLIDE_TITLE_CLASSIC),
                TextStyle::new(28.0, palette.text).bold(),
            ));

        for (i, point) in data.content_points.iter().take(4).enumerate() {
            let y = 2.2 + i as f64 * 0.7;
            slide.extend(bullet(
                Frame::inches(1.0, y, 0.12, 0.12),
                Frame::inches(1.3, y - 0.1, 3.8, 0.5),
                point,
                14.0,
                palette,
            ));
        }
    }

    fn fullscreen_layout(
        &self,
        slide: &mut Slide,
        data: &ContentSlide,
        image: Option<Vec<u8>>,
        palette: &Palette,
        dice: &mut dyn Dice,
    ) {
        slide.push(text_box(
            Frame::inches(0.8, 0.5, 8.0, 1.0),
            or_default(&data.title, DEFAULT_SLIDE_TITLE),
            TextStyle::new(28.0, palette.text).bold(),
        ));

        let fallback = [DEFAULT_POINT.to_string()];
        let points: &[String] = if data.content_points.iter().all(|p| p.trim().is_empty()) {
            &fallback
        } else {
            &data.content_points
        };

        if let Some(image) = image {
            slide.push(Shape::Picture(Picture {
                frame: Frame::inches(5.5, 1.8, 3.5, 3.5),
                data: image,
                description: data.image_concept.clone().unwrap_or_default(),
            }));
            for (i, point) in points.iter().take(4).enumerate() {
                let y = 2.0 + i as f64 * 0.7;
                slide.extend(bullet(
                    Frame::inches(0.8, y, 0.15, 0.15),
                    Frame::inches(1.1, y - 0.08, 4.0, 0.5),
                    point,
                    14.0,
                    palette,
                ));
            }
            return;
        }

        if dice.chance(BOXED_LAYOUT_CHANCE) {
            boxed_layout(slide, &data.content_points, palette);
            return;
        }

        for (i, point) in points.iter().take(6).enumerate() {
            if point.trim().is_empty() {
                continue;
            }
            let y = 2.2 + i as f64 * 0.7;
            slide.extend(bullet(
                Frame::inches(1.0, y, 0.15, 0.15),
                Frame::inches(1.4, y - 0.1, 7.0, 0.6),
                point,
                16.0,
                palette,
            ));
            if y > 6.5 {
                break;
            }
        }
    }
}

/// 2x2 彩色方框，文字颜色按方框亮度取黑或白
fn boxed_layout(slide: &mut Slide, points: &[String], palette: &Palette) {
    let fallback = [DEFAULT_BOX_POINT.to_string()];
    let points: &[String] = if points.iter().all(|p| p.trim().is_empty()) {
        &fallback
    } else {
        points
    };
    let colors: [Rgb; 4] = [
        palette.primary,
        palette.secondary,
        palette.accent,
        palette.secondary,
    ];
    for (i, point) in points.iter().take(4).enumerate() {
        let (row, col) = (i / 2, i % 2);
        let left = 0.7 + col as f64 * 4.4;
        let top = 1.8 + row as f64 * 1.7;
        let color = colors[i % colors.len()];

        slide
            .push(filled(
                Geometry::RoundRect,
                Frame::inches(left, top, 4.2, 1.5),
                color,
                0.15,
            ))
            .push(text_box(
                Frame::inches(left + 0.2, top + 0.2, 3.8, 1.1),
                point.as_str(),
                TextStyle::new(14.0, contrast_color(color)).align(Align::Center),
            ));
    }
}
