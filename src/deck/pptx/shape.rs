//! 形状：自选图形、文本框、图片

use std::fmt::{self, Write};

use super::units::{Rgb, inches, points};
use super::xml::escape_xml;

/// 预设几何形状
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    Rect,
    RoundRect,
    Ellipse,
    Diamond,
    Chevron,
    Pentagon,
    Plaque,
}

impl Geometry {
    pub const ALL: [Geometry; 7] = [
        Geometry::Rect,
        Geometry::RoundRect,
        Geometry::Ellipse,
        Geometry::Diamond,
        Geometry::Chevron,
        Geometry::Pentagon,
        Geometry::Plaque,
    ];

    /// DrawingML `prst` 取值
    pub fn preset(&self) -> &'static str {
        match self {
            Geometry::Rect => "rect",
            Geometry::RoundRect => "roundRect",
            Geometry::Ellipse => "ellipse",
            Geometry::Diamond => "diamond",
            Geometry::Chevron => "chevron",
            // 箭头形五边形，与 PowerPoint 菜单中的 "Pentagon" 一致
            Geometry::Pentagon => "homePlate",
            Geometry::Plaque => "plaque",
        }
    }
}

/// 位置、尺寸（EMU）与旋转角度（度）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
    pub rotation: f64,
}

impl Frame {
    pub fn inches(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x: inches(x),
            y: inches(y),
            cx: inches(w).max(0),
            cy: inches(h).max(0),
            rotation: 0.0,
        }
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// 旋转角度换算为 60000 分之一度，归一化到 [0, 360)
    fn rot_attr(&self) -> Option<i64> {
        let deg = self.rotation.rem_euclid(360.0);
        let rot = (deg * 60_000.0).round() as i64;
        (rot != 0 && rot != 21_600_000).then_some(rot)
    }

    fn write_xfrm(&self, xml: &mut String) -> fmt::Result {
        match self.rot_attr() {
            Some(rot) => write!(xml, r#"<a:xfrm rot="{}">"#, rot)?,
            None => xml.push_str("<a:xfrm>"),
        }
        write!(
            xml,
            r#"<a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
            self.x, self.y, self.cx, self.cy
        )
    }
}

/// 纯色填充，`transparency` 取值 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub color: Rgb,
    pub transparency: f64,
}

impl Fill {
    pub fn solid(color: Rgb) -> Self {
        Self {
            color,
            transparency: 0.0,
        }
    }

    pub fn transparent(color: Rgb, transparency: f64) -> Self {
        Self {
            color,
            transparency: transparency.clamp(0.0, 1.0),
        }
    }

    fn write_xml(&self, xml: &mut String) -> fmt::Result {
        write_color(xml, self.color, self.transparency)
    }
}

fn write_color(xml: &mut String, color: Rgb, transparency: f64) -> fmt::Result {
    if transparency > 0.0 {
        let alpha = ((1.0 - transparency) * 100_000.0).round() as i64;
        write!(
            xml,
            r#"<a:solidFill><a:srgbClr val="{}"><a:alpha val="{}"/></a:srgbClr></a:solidFill>"#,
            color, alpha
        )
    } else {
        write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color)
    }
}

/// 外阴影
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub blur_pt: f64,
    pub offset_x_pt: f64,
    pub offset_y_pt: f64,
    pub color: Rgb,
    pub transparency: f64,
}

impl Shadow {
    /// 2pt 偏移、5pt 模糊的半透明黑色阴影
    pub fn soft() -> Self {
        Self {
            blur_pt: 5.0,
            offset_x_pt: 2.0,
            offset_y_pt: 2.0,
            color: Rgb::BLACK,
            transparency: 0.5,
        }
    }

    fn write_xml(&self, xml: &mut String) -> fmt::Result {
        let dist = self.offset_x_pt.hypot(self.offset_y_pt);
        let dir = self
            .offset_y_pt
            .atan2(self.offset_x_pt)
            .to_degrees()
            .rem_euclid(360.0);
        let alpha = ((1.0 - self.transparency) * 100_000.0).round() as i64;
        write!(
            xml,
            r#"<a:effectLst><a:outerShdw blurRad="{}" dist="{}" dir="{}" algn="tl" rotWithShape="0"><a:srgbClr val="{}"><a:alpha val="{}"/></a:srgbClr></a:outerShdw></a:effectLst>"#,
            points(self.blur_pt),
            points(dist),
            (dir * 60_000.0).round() as i64,
            self.color,
            alpha
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    fn attr(&self) -> &'static str {
        match self {
            Align::Left => "l",
            Align::Center => "ctr",
            Align::Right => "r",
        }
    }
}

/// 段落与字体样式
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font: String,
    pub size_pt: f64,
    pub bold: bool,
    pub color: Rgb,
    pub align: Align,
}

impl TextStyle {
    pub fn new(size_pt: f64, color: Rgb) -> Self {
        Self {
            font: "Calibri".to_string(),
            size_pt,
            bold: false,
            color,
            align: Align::Left,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

// 文本框内边距：左右 16pt，上下 8pt
const INSET_X_PT: f64 = 16.0;
const INSET_Y_PT: f64 = 8.0;
// 行距 130%，段后 15pt
const LINE_SPACING_PCT: i64 = 130_000;
const SPACE_AFTER_CENTIPOINTS: i64 = 1_500;

#[derive(Debug, Clone, PartialEq)]
pub struct AutoShape {
    pub frame: Frame,
    pub geometry: Geometry,
    pub fill: Option<Fill>,
    pub shadow: Option<Shadow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub frame: Frame,
    /// 每行一个段落
    pub text: String,
    pub style: TextStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub frame: Frame,
    /// PNG 数据
    pub data: Vec<u8>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Auto(AutoShape),
    Text(TextBox),
    Picture(Picture),
}

impl Shape {
    pub fn frame(&self) -> &Frame {
        match self {
            Shape::Auto(s) => &s.frame,
            Shape::Text(s) => &s.frame,
            Shape::Picture(s) => &s.frame,
        }
    }

    pub fn image_data(&self) -> Option<&[u8]> {
        match self {
            Shape::Picture(p) => Some(&p.data),
            _ => None,
        }
    }

    /// 写出形状 XML；图片需要提供关系 ID
    pub(crate) fn write_xml(&self, xml: &mut String, id: u32, rel_id: Option<&str>) -> fmt::Result {
        match self {
            Shape::Auto(shape) => write_auto_shape(xml, id, shape),
            Shape::Text(text) => write_text_box(xml, id, text),
            Shape::Picture(pic) => write_picture(xml, id, pic, rel_id.unwrap_or("rId2")),
        }
    }
}

fn write_auto_shape(xml: &mut String, id: u32, shape: &AutoShape) -> fmt::Result {
    write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Shape {}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>"#,
        id, id
    )?;
    shape.frame.write_xfrm(xml)?;
    write!(
        xml,
        r#"<a:prstGeom prst="{}"><a:avLst/></a:prstGeom>"#,
        shape.geometry.preset()
    )?;
    match &shape.fill {
        Some(fill) => fill.write_xml(xml)?,
        None => xml.push_str("<a:noFill/>"),
    }
    xml.push_str("<a:ln><a:noFill/></a:ln>");
    if let Some(shadow) = &shape.shadow {
        shadow.write_xml(xml)?;
    }
    xml.push_str("</p:spPr></p:sp>");
    Ok(())
}

fn write_text_box(xml: &mut String, id: u32, text: &TextBox) -> fmt::Result {
    write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="TextBox {}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>"#,
        id, id
    )?;
    text.frame.write_xfrm(xml)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#);

    let inset_x = points(INSET_X_PT);
    let inset_y = points(INSET_Y_PT);
    write!(
        xml,
        r#"<p:txBody><a:bodyPr wrap="square" lIns="{x}" tIns="{y}" rIns="{x}" bIns="{y}" anchor="t" rtlCol="0"><a:noAutofit/></a:bodyPr><a:lstStyle/>"#,
        x = inset_x,
        y = inset_y
    )?;

    let style = &text.style;
    let size = (style.size_pt * 100.0).round() as i64;
    for line in text.text.split('\n') {
        write!(
            xml,
            r#"<a:p><a:pPr algn="{}"><a:lnSpc><a:spcPct val="{}"/></a:lnSpc><a:spcAft><a:spcPts val="{}"/></a:spcAft></a:pPr>"#,
            style.align.attr(),
            LINE_SPACING_PCT,
            SPACE_AFTER_CENTIPOINTS
        )?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            write!(xml, r#"<a:endParaRPr lang="en-US" sz="{}" dirty="0"/></a:p>"#, size)?;
            continue;
        }
        write!(
            xml,
            r#"<a:r><a:rPr lang="en-US" sz="{}" b="{}" dirty="0">"#,
            size,
            if style.bold { 1 } else { 0 }
        )?;
        write_color(xml, style.color, 0.0)?;
        write!(
            xml,
            r#"<a:latin typeface="{f}"/><a:cs typeface="{f}"/></a:rPr><a:t>{}</a:t></a:r></a:p>"#,
            escape_xml(line),
            f = escape_xml(&style.font)
        )?;
    }
    xml.push_str("</p:txBody></p:sp>");
    Ok(())
}

fn write_picture(xml: &mut String, id: u32, pic: &Picture, rel_id: &str) -> fmt::Result {
    write!(
        xml,
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="Picture {}" descr="{}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
        id,
        id,
        escape_xml(&pic.description)
    )?;
    write!(
        xml,
        r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>"#,
        rel_id
    )?;
    pic.frame.write_xfrm(xml)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
    Ok(())
}
