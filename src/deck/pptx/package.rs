//! OPC 打包：把演示文稿写成 zip
//!
//! 固定部件：一个母版、一个空白版式、一个主题。
//! 每张图片单独存为 `ppt/media/imageN.*`。

use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::presentation::Presentation;
use super::units::Rgb;
use super::xml::{
    NS_A, NS_P, NS_PKG_RELS, NS_R, REL_CORE_PROPS, REL_EXTENDED_PROPS, REL_OFFICE_DOCUMENT,
    REL_SLIDE, REL_SLIDE_LAYOUT, REL_SLIDE_MASTER, REL_THEME, XML_DECLARATION,
};
use crate::errors::Result;

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_APP: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";

const EMPTY_SP_TREE: &str = r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree>"#;

const CLR_MAP: &str = r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#;

const THEME_BODY: &str = concat!(
    r#"<a:themeElements>"#,
    r#"<a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
    r#"<a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>"#,
    r#"<a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2>"#,
    r#"<a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4>"#,
    r#"<a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6>"#,
    r#"<a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme>"#,
    r#"<a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
    r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme>"#,
    r#"<a:fmtScheme name="Office"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst>"#,
    r#"<a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst>"#,
    r#"<a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>"#,
    r#"<a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme>"#,
    r#"</a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/>"#
);

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// 按魔数识别可嵌入的图片格式，不认识的返回 None
pub fn sniff_image(data: &[u8]) -> Option<&'static str> {
    match data {
        d if d.starts_with(PNG_MAGIC) => Some("png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("jpeg"),
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some("gif"),
        _ => None,
    }
}

/// 按魔数判断图片扩展名，默认 png
pub fn image_extension(data: &[u8]) -> &'static str {
    sniff_image(data).unwrap_or("png")
}

/// 写出完整的 .pptx
pub(crate) fn write_package(pres: &Presentation) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    // 图片本身已压缩
    let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    // 先给所有图片分配全局文件名
    let mut media_names: Vec<Vec<String>> = Vec::with_capacity(pres.slides.len());
    let mut counter = 0usize;
    for slide in &pres.slides {
        let names = slide
            .images()
            .map(|data| {
                counter += 1;
                format!("image{}.{}", counter, image_extension(data))
            })
            .collect();
        media_names.push(names);
    }

    let put = |zip: &mut ZipWriter<Cursor<Vec<u8>>>, path: &str, body: &[u8]| -> Result<()> {
        zip.start_file(path, options)?;
        zip.write_all(body)?;
        Ok(())
    };

    put(&mut zip, "[Content_Types].xml", content_types_xml(pres.slides.len())?.as_bytes())?;
    put(&mut zip, "_rels/.rels", root_rels_xml()?.as_bytes())?;

    let created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    put(&mut zip, "docProps/core.xml", pres.core_props_xml(&created).as_bytes())?;
    put(&mut zip, "docProps/app.xml", pres.app_props_xml().as_bytes())?;

    put(&mut zip, "ppt/presentation.xml", pres.presentation_xml()?.as_bytes())?;
    put(
        &mut zip,
        "ppt/_rels/presentation.xml.rels",
        presentation_rels_xml(pres.slides.len())?.as_bytes(),
    )?;
    put(
        &mut zip,
        "ppt/slideMasters/slideMaster1.xml",
        slide_master_xml(pres.master_background)?.as_bytes(),
    )?;
    put(
        &mut zip,
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        master_rels_xml()?.as_bytes(),
    )?;
    put(&mut zip, "ppt/slideLayouts/slideLayout1.xml", slide_layout_xml()?.as_bytes())?;
    put(
        &mut zip,
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        layout_rels_xml()?.as_bytes(),
    )?;
    put(&mut zip, "ppt/theme/theme1.xml", theme_xml()?.as_bytes())?;

    for (index, (slide, names)) in pres.slides.iter().zip(&media_names).enumerate() {
        let n = index + 1;
        put(&mut zip, &format!("ppt/slides/slide{}.xml", n), slide.to_xml()?.as_bytes())?;
        put(
            &mut zip,
            &format!("ppt/slides/_rels/slide{}.xml.rels", n),
            slide.rels_xml(names)?.as_bytes(),
        )?;
        for (data, name) in slide.images().zip(names) {
            zip.start_file(format!("ppt/media/{}", name), stored)?;
            zip.write_all(data)?;
        }
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn content_types_xml(slide_count: usize) -> std::result::Result<String, std::fmt::Error> {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECLARATION);
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    xml.push_str(
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    );
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Default Extension="png" ContentType="image/png"/>"#);
    xml.push_str(r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#);
    xml.push_str(r#"<Default Extension="gif" ContentType="image/gif"/>"#);

    for (part, ct) in [
        ("/ppt/presentation.xml", CT_PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml", CT_SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml", CT_SLIDE_LAYOUT),
        ("/ppt/theme/theme1.xml", CT_THEME),
        ("/docProps/core.xml", CT_CORE),
        ("/docProps/app.xml", CT_APP),
    ] {
        write!(xml, r#"<Override PartName="{}" ContentType="{}"/>"#, part, ct)?;
    }
    for n in 1..=slide_count {
        write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="{}"/>"#,
            n, CT_SLIDE
        )?;
    }
    xml.push_str("</Types>");
    Ok(xml)
}

fn relationships(entries: &[(String, &str, String)]) -> std::result::Result<String, std::fmt::Error> {
    let mut xml = String::with_capacity(256 + entries.len() * 160);
    xml.push_str(XML_DECLARATION);
    write!(xml, r#"<Relationships xmlns="{}">"#, NS_PKG_RELS)?;
    for (id, rel_type, target) in entries {
        write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id, rel_type, target
        )?;
    }
    xml.push_str("</Relationships>");
    Ok(xml)
}

fn root_rels_xml() -> std::result::Result<String, std::fmt::Error> {
    relationships(&[
        ("rId1".into(), REL_OFFICE_DOCUMENT, "ppt/presentation.xml".into()),
        ("rId2".into(), REL_CORE_PROPS, "docProps/core.xml".into()),
        ("rId3".into(), REL_EXTENDED_PROPS, "docProps/app.xml".into()),
    ])
}

fn presentation_rels_xml(slide_count: usize) -> std::result::Result<String, std::fmt::Error> {
    let mut entries = vec![
        (
            "rId1".to_string(),
            REL_SLIDE_MASTER,
            "slideMasters/slideMaster1.xml".to_string(),
        ),
        ("rId2".to_string(), REL_THEME, "theme/theme1.xml".to_string()),
    ];
    for index in 0..slide_count {
        entries.push((
            Presentation::slide_rel_id(index),
            REL_SLIDE,
            format!("slides/slide{}.xml", index + 1),
        ));
    }
    relationships(&entries)
}

fn master_rels_xml() -> std::result::Result<String, std::fmt::Error> {
    relationships(&[
        (
            "rId1".into(),
            REL_SLIDE_LAYOUT,
            "../slideLayouts/slideLayout1.xml".into(),
        ),
        ("rId2".into(), REL_THEME, "../theme/theme1.xml".into()),
    ])
}

fn layout_rels_xml() -> std::result::Result<String, std::fmt::Error> {
    relationships(&[(
        "rId1".into(),
        REL_SLIDE_MASTER,
        "../slideMasters/slideMaster1.xml".into(),
    )])
}

fn slide_master_xml(background: Option<Rgb>) -> std::result::Result<String, std::fmt::Error> {
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld>"#,
        NS_A, NS_R, NS_P
    )?;
    match background {
        Some(color) => write!(
            xml,
            r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
            color
        )?,
        None => xml.push_str(r#"<p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#),
    }
    xml.push_str(EMPTY_SP_TREE);
    xml.push_str("</p:cSld>");
    xml.push_str(CLR_MAP);
    xml.push_str(
        r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#,
    );
    Ok(xml)
}

fn slide_layout_xml() -> std::result::Result<String, std::fmt::Error> {
    let mut xml = String::with_capacity(768);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="blank" preserve="1"><p:cSld name="Blank">"#,
        NS_A, NS_R, NS_P
    )?;
    xml.push_str(EMPTY_SP_TREE);
    xml.push_str(r#"</p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#);
    Ok(xml)
}

fn theme_xml() -> std::result::Result<String, std::fmt::Error> {
    let mut xml = String::with_capacity(THEME_BODY.len() + 256);
    xml.push_str(XML_DECLARATION);
    write!(xml, r#"<a:theme xmlns:a="{}" name="Office Theme">"#, NS_A)?;
    xml.push_str(THEME_BODY);
    xml.push_str("</a:theme>");
    Ok(xml)
}
