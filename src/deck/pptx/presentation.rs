//! 演示文稿：页面尺寸、母版背景与页面列表

use std::fmt::{self, Write};

use super::package;
use super::slide::Slide;
use super::units::Rgb;
use super::xml::{NS_A, NS_P, NS_R, XML_DECLARATION, escape_xml};
use crate::errors::Result;

/// 母版 ID 从 2^31 开始
const SLIDE_MASTER_ID: u32 = 2_147_483_648;
/// 页面 ID 从 256 开始
const FIRST_SLIDE_ID: u32 = 256;
/// 备注页尺寸（纵向 7.5 x 10 英寸）
const NOTES_SIZE: (i64, i64) = (6_858_000, 9_144_000);

#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    /// 页面宽度（EMU）
    pub width: i64,
    /// 页面高度（EMU）
    pub height: i64,
    /// 母版纯色背景，页面未设置背景时可见
    pub master_background: Option<Rgb>,
    /// 写入 docProps/core.xml
    pub title: String,
    pub slides: Vec<Slide>,
}

impl Presentation {
    pub fn new(width: i64, height: i64) -> Self {
        Self {
            width,
            height,
            master_background: None,
            title: String::new(),
            slides: Vec::new(),
        }
    }

    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// 打包为 .pptx 字节
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        package::write_package(self)
    }

    /// `presentation.xml.rels` 中页面关系 ID：rId1 母版，rId2 主题
    pub(crate) fn slide_rel_id(index: usize) -> String {
        format!("rId{}", index + 3)
    }

    pub(crate) fn presentation_xml(&self) -> std::result::Result<String, fmt::Error> {
        let mut xml = String::with_capacity(1024 + self.slides.len() * 48);
        xml.push_str(XML_DECLARATION);
        write!(
            xml,
            r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
            NS_A, NS_R, NS_P
        )?;
        write!(
            xml,
            r#"<p:sldMasterIdLst><p:sldMasterId id="{}" r:id="rId1"/></p:sldMasterIdLst>"#,
            SLIDE_MASTER_ID
        )?;

        if !self.slides.is_empty() {
            xml.push_str("<p:sldIdLst>");
            for index in 0..self.slides.len() {
                write!(
                    xml,
                    r#"<p:sldId id="{}" r:id="{}"/>"#,
                    FIRST_SLIDE_ID + index as u32,
                    Self::slide_rel_id(index)
                )?;
            }
            xml.push_str("</p:sldIdLst>");
        }

        write!(
            xml,
            r#"<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="{}" cy="{}"/>"#,
            self.width, self.height, NOTES_SIZE.0, NOTES_SIZE.1
        )?;
        xml.push_str("</p:presentation>");
        Ok(xml)
    }

    pub(crate) fn core_props_xml(&self, created: &str) -> String {
        format!(
            concat!(
                r#"{}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
                r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
                r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
                r#"<dc:title>{}</dc:title><dc:creator>slideforge</dc:creator><cp:lastModifiedBy>slideforge</cp:lastModifiedBy><cp:revision>1</cp:revision>"#,
                r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
                r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified></cp:coreProperties>"#
            ),
            XML_DECLARATION,
            escape_xml(&self.title),
            created,
            created
        )
    }

    pub(crate) fn app_props_xml(&self) -> String {
        format!(
            concat!(
                r#"{}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
                r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
                r#"<Application>slideforge</Application><PresentationFormat>Custom</PresentationFormat>"#,
                r#"<Slides>{}</Slides><Notes>0</Notes><HiddenSlides>0</HiddenSlides><AppVersion>16.0000</AppVersion></Properties>"#
            ),
            XML_DECLARATION,
            self.slides.len()
        )
    }
}
