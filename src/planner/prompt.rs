//! 大纲提示词与模型输出清理

use std::fmt::Write as _;

/// 生成大纲提示词
///
/// 提示词包含：原文、精确的页数、JSON 结构、内容要求（每页 3-5 条、每条 40-120 字符）、
/// 以及每隔一页配图的约定。
pub fn build_prompt(summary: &str, slide_count: u32) -> String {
    let n = slide_count;
    let mut prompt = String::with_capacity(summary.len() + 2048);

    let _ = writeln!(
        prompt,
        "You are a presentation designer preparing a polished, corporate-grade deck.\n"
    );
    let _ = writeln!(prompt, "STRUCTURE:");
    let _ = writeln!(prompt, "- A title slide and a table of contents are added automatically.");
    let _ = writeln!(prompt, "- Produce exactly {} content slides.", n);
    let _ = writeln!(
        prompt,
        "- Every 2nd content slide (2, 4, 6, ...) carries an illustration.\n"
    );
    let _ = writeln!(prompt, "CONTENT:");
    let _ = writeln!(prompt, "- Titles are clear and descriptive (30-80 characters).");
    let _ = writeln!(
        prompt,
        "- Each slide has 3-5 bullet points of 40-120 characters each."
    );
    let _ = writeln!(prompt, "- Keep a professional tone; each slide covers a distinct topic.\n");
    let _ = writeln!(prompt, "SOURCE DOCUMENT:\n{}\n", summary.trim());
    let _ = writeln!(prompt, "Respond with JSON shaped like this:");
    let _ = writeln!(
        prompt,
        r#"{{
  "presentation_meta": {{
    "title": "Presentation title",
    "subtitle": "Subtitle describing the content",
    "total_content_slides": {n},
    "estimated_duration": "{low}-{high} minutes"
  }},
  "theme": {{"name": "Theme name", "style": "corporate", "palette_index": 0, "mood": "professional"}},
  "table_of_contents": [
    {{"section_number": 1, "section_title": "First section", "slides": [1, 2]}}
  ],
  "content_slides": [
    {{
      "slide_number": 1,
      "section": "Section name",
      "title": "Slide title",
      "content_points": ["Point one", "Point two", "Point three"],
      "slide_type": "text_heavy",
      "has_image": false,
      "image_concept": ""
    }},
    {{
      "slide_number": 2,
      "section": "Section name",
      "title": "Slide title",
      "content_points": ["Point one", "Point two", "Point three"],
      "slide_type": "image_slide",
      "has_image": true,
      "image_concept": "Clean, professional image concept supporting the slide"
    }}
  ]
}}"#,
        n = n,
        low = n * 2,
        high = n * 3
    );
    let _ = writeln!(
        prompt,
        "\nCreate exactly {} content slides. Slides 2, 4, 6, ... must have has_image: true.",
        n
    );
    let _ = write!(prompt, "Return only valid JSON.");
    prompt
}

/// 去掉模型输出两端的 Markdown 代码块标记
pub fn clean_code_fence(raw: &str) -> &str {
    let mut s = raw.trim();

    if let Some(rest) = s.strip_prefix("```") {
        // 开头的 ``` 或 ```json 独占一行
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        if let Some(body) = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")) {
            s = body;
        }
    }

    if let Some(body) = s.strip_suffix("```") {
        let trimmed = body.trim_end_matches([' ', '\t']);
        if let Some(body) = trimmed.strip_suffix('\n') {
            s = body.strip_suffix('\r').unwrap_or(body);
        }
    }

    s.trim()
}
