//! 文本排版辅助

/// 标题字号（磅）：越长越小
pub fn title_font_size(text: &str) -> f64 {
    match text.chars().count() {
        0..=30 => 44.0,
        31..=50 => 38.0,
        51..=70 => 32.0,
        _ => 28.0,
    }
}

/// 按单词贪心折行，每行不超过 `max_chars` 个字符
///
/// 单个超长单词独占一行，不会被截断
pub fn split_lines(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_font_size_thresholds() {
        assert_eq!(title_font_size(&"a".repeat(30)), 44.0);
        assert_eq!(title_font_size(&"a".repeat(31)), 38.0);
        assert_eq!(title_font_size(&"a".repeat(50)), 38.0);
        assert_eq!(title_font_size(&"a".repeat(70)), 32.0);
        assert_eq!(title_font_size(&"a".repeat(71)), 28.0);
    }

    #[test]
    fn test_split_lines_greedy() {
        let lines = split_lines("one two three four", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn test_split_lines_long_word_and_empty() {
        assert_eq!(split_lines("supercalifragilistic ok", 5), vec!["supercalifragilistic", "ok"]);
        assert!(split_lines("   ", 60).is_empty());
        assert_eq!(split_lines("Comprehensive Analysis", 60), vec!["Comprehensive Analysis"]);
    }
}
