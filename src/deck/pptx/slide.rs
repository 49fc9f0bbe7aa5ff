//! 单页幻灯片

use std::fmt::{self, Write};

use super::shape::Shape;
use super::units::Rgb;
use super::xml::{NS_A, NS_P, NS_PKG_RELS, NS_R, REL_IMAGE, REL_SLIDE_LAYOUT, XML_DECLARATION};

/// 页面背景
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Background {
    Solid(Rgb),
    /// 线性渐变，`angle` 为度数（0 水平，90 垂直）
    Gradient { start: Rgb, end: Rgb, angle: f64 },
}

impl Background {
    pub fn vertical(start: Rgb, end: Rgb) -> Self {
        Background::Gradient {
            start,
            end,
            angle: 90.0,
        }
    }

    pub fn diagonal(start: Rgb, end: Rgb) -> Self {
        Background::Gradient {
            start,
            end,
            angle: 45.0,
        }
    }

    pub(crate) fn write_xml(&self, xml: &mut String) -> fmt::Result {
        xml.push_str("<p:bg><p:bgPr>");
        match self {
            Background::Solid(color) => {
                write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color)?;
            }
            Background::Gradient { start, end, angle } => {
                write!(
                    xml,
                    r#"<a:gradFill rotWithShape="1"><a:gsLst><a:gs pos="0"><a:srgbClr val="{}"/></a:gs><a:gs pos="100000"><a:srgbClr val="{}"/></a:gs></a:gsLst><a:lin ang="{}" scaled="0"/></a:gradFill>"#,
                    start,
                    end,
                    (angle.rem_euclid(360.0) * 60_000.0).round() as i64
                )?;
            }
        }
        xml.push_str("<a:effectLst/></p:bgPr></p:bg>");
        Ok(())
    }
}

/// 一页幻灯片：背景 + 按 z 序排列的形状
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slide {
    pub background: Option<Background>,
    pub shapes: Vec<Shape>,
}

// rId1 固定指向版式，图片从 rId2 开始
const FIRST_IMAGE_REL: usize = 2;

impl Slide {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(background: Background) -> Self {
        Self {
            background: Some(background),
            shapes: Vec::new(),
        }
    }

    pub fn push(&mut self, shape: Shape) -> &mut Self {
        self.shapes.push(shape);
        self
    }

    pub fn extend<I: IntoIterator<Item = Shape>>(&mut self, shapes: I) -> &mut Self {
        self.shapes.extend(shapes);
        self
    }

    /// 按出现顺序返回图片数据
    pub fn images(&self) -> impl Iterator<Item = &[u8]> {
        self.shapes.iter().filter_map(Shape::image_data)
    }

    pub fn picture_count(&self) -> usize {
        self.images().count()
    }

    /// 生成 `ppt/slides/slideN.xml`
    pub fn to_xml(&self) -> Result<String, fmt::Error> {
        let mut xml = String::with_capacity(1024 + self.shapes.len() * 512);
        xml.push_str(XML_DECLARATION);
        write!(
            xml,
            r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld>"#,
            NS_A, NS_R, NS_P
        )?;
        if let Some(background) = &self.background {
            background.write_xml(&mut xml)?;
        }
        xml.push_str(
            r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
        );

        let mut next_image = FIRST_IMAGE_REL;
        for (index, shape) in self.shapes.iter().enumerate() {
            // id 1 属于 spTree 本身
            let id = index as u32 + 2;
            if shape.image_data().is_some() {
                let rel_id = format!("rId{}", next_image);
                next_image += 1;
                shape.write_xml(&mut xml, id, Some(&rel_id))?;
            } else {
                shape.write_xml(&mut xml, id, None)?;
            }
        }

        xml.push_str(r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#);
        Ok(xml)
    }

    /// 生成 `ppt/slides/_rels/slideN.xml.rels`
    ///
    /// `media_names` 与 [`Slide::images`] 顺序一致，例如 `image3.png`
    pub fn rels_xml(&self, media_names: &[String]) -> Result<String, fmt::Error> {
        let mut xml = String::with_capacity(512);
        xml.push_str(XML_DECLARATION);
        write!(xml, r#"<Relationships xmlns="{}">"#, NS_PKG_RELS)?;
        write!(
            xml,
            r#"<Relationship Id="rId1" Type="{}" Target="../slideLayouts/slideLayout1.xml"/>"#,
            REL_SLIDE_LAYOUT
        )?;
        for (offset, name) in media_names.iter().enumerate() {
            write!(
                xml,
                r#"<Relationship Id="rId{}" Type="{}" Target="../media/{}"/>"#,
                FIRST_IMAGE_REL + offset,
                REL_IMAGE,
                name
            )?;
        }
        xml.push_str("</Relationships>");
        Ok(xml)
    }
}
