//! 文本分割器
//!
//! 将 Markdown 文档规范化为可朗读的纯 ASCII 文本，并按段落切分为 Section：
//! 1. 字符音译（保留排版符号交给后续步骤处理）
//! 2. 破折号 → ". "，省略号 → "..."
//! 3. 弯引号归一化，删除所有双引号
//! 4. 链接只保留标签，尖括号 URL 整体删除
//! 5. 清除强调/标题/代码标记、图片、引用标记和分隔线
//! 6. 按空行分段，连续的列表段落合并为一个 Section
//! 7. 残留的非 ASCII 字符替换为空格，丢弃空段

use once_cell::sync::Lazy;
use regex::Regex;

use super::document::Section;

/// 破折号（含前导空白）
static DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]*[\u{2014}\u{2013}]").expect("valid regex"));

/// Markdown 图片 `![alt](src)`
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[.*?\]\(.*?\)").expect("valid regex"));

/// 带标签的链接 `[label](url)`
static LABELED_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("valid regex"));

/// 独立 URL `<https://...>`
static BARE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<https?://[^\s>]+>").expect("valid regex"));

/// 强调、标题、代码标记
static INLINE_MARKERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[#*_~`]").expect("valid regex"));

/// 行首引用标记
static BLOCKQUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*>[ \t]?").expect("valid regex"));

/// 分隔线（3 个及以上连字符）
static HORIZONTAL_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{3,}").expect("valid regex"));

/// 段落边界
static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").expect("valid regex"));

/// 列表项：`-`、`*` 或 `数字.` 开头
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([-*]|\d+\.)").expect("valid regex"));

static NON_ASCII: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\x00-\x7F]+").expect("valid regex"));

/// 排版符号：音译时保留，由专门的替换步骤处理
#[inline]
fn is_typographic(ch: char) -> bool {
    matches!(
        ch,
        '\u{2014}' | '\u{2013}' | '\u{2026}' | '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}'
    )
}

/// 非 ASCII 字符音译为最接近的 ASCII 表示
fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii() || is_typographic(ch) {
            out.push(ch);
        } else if let Some(ascii) = deunicode::deunicode_char(ch) {
            out.push_str(ascii);
        }
    }
    out
}

/// 清除行内标记，保留行首的 `* ` 列表符号
fn strip_inline_markers(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let indent = line.len() - line.trim_start().len();
            let bullet_end = if line[indent..].starts_with("* ") {
                indent + 2
            } else {
                0
            };
            let (bullet, rest) = line.split_at(bullet_end);
            format!("{}{}", bullet, INLINE_MARKERS.replace_all(rest, ""))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 规范化整篇文档（分段之前的全部步骤）
pub fn normalize_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = transliterate(&text);

    let text = DASH.replace_all(&text, ". ");
    let text = text.replace('\u{2026}', "...");
    let text = text
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace('"', "");

    // 图片先于链接处理，否则 `![alt](src)` 会被当作链接只剩下 `!alt`
    let text = IMAGE.replace_all(&text, "");
    let text = LABELED_LINK.replace_all(&text, "$1");
    let text = BARE_URL.replace_all(&text, "");

    let text = strip_inline_markers(&text);
    let text = BLOCKQUOTE.replace_all(&text, "");
    HORIZONTAL_RULE.replace_all(&text, "").into_owned()
}

/// 是否为列表段落
#[inline]
fn is_list_item(segment: &str) -> bool {
    LIST_ITEM.is_match(segment)
}

/// 按空行分段，并把列表段落与紧随其后的列表段落合并
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut segments = PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .peekable();

    while let Some(segment) = segments.next() {
        if !is_list_item(segment) {
            paragraphs.push(segment.to_string());
            continue;
        }

        let mut items = vec![segment];
        while let Some(next) = segments.next_if(|s| is_list_item(s)) {
            items.push(next);
        }
        paragraphs.push(items.join("\n"));
    }

    paragraphs
}

/// 对文档进行分段
///
/// 返回的 Section 编号从 1 开始连续递增，内容非空、已去除首尾空白且只含 7 位 ASCII。
/// 没有空行的文档整体作为一个 Section。
pub fn segment_document(text: &str) -> Vec<Section> {
    let normalized = normalize_text(text);

    split_paragraphs(&normalized)
        .into_iter()
        .map(|paragraph| NON_ASCII.replace_all(&paragraph, " ").trim().to_string())
        .filter(|paragraph| !paragraph.is_empty())
        .enumerate()
        .filter_map(|(offset, content)| Section::new(offset + 1, content).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(text: &str) -> Vec<String> {
        segment_document(text)
            .into_iter()
            .map(|s| s.content().to_string())
            .collect()
    }

    #[test]
    fn test_paragraphs_and_list_merge() {
        let sections = contents("Para one.\n\nPara two.\n\n- item a\n- item b");
        assert_eq!(sections, vec!["Para one.", "Para two.", "- item a\n- item b"]);
    }

    #[test]
    fn test_consecutive_list_paragraphs_collapse() {
        let text = "Intro.\n\n- first\n\n- second\n\n3. third\n\nOutro.";
        let sections = contents(text);
        assert_eq!(sections, vec!["Intro.", "- first\n- second\n3. third", "Outro."]);
    }

    #[test]
    fn test_list_at_end_of_document_merges_to_end() {
        let sections = contents("Intro.\n\n1. one\n\n2. two");
        assert_eq!(sections, vec!["Intro.", "1. one\n2. two"]);
    }

    #[test]
    fn test_star_bullets_are_list_items() {
        let sections = contents("* alpha\n\n* beta\n\nText with *emphasis*.");
        assert_eq!(sections, vec!["* alpha\n* beta", "Text with emphasis."]);
    }

    #[test]
    fn test_single_paragraph_document() {
        let sections = segment_document("Just one line.\nAnd another line.");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].index(), 1);
        assert_eq!(sections[0].content(), "Just one line.\nAnd another line.");
    }

    #[test]
    fn test_link_stripping() {
        assert_eq!(
            normalize_text("See [docs](http://example.com) for more."),
            "See docs for more."
        );
        assert_eq!(normalize_text("Go <https://example.com/a?b=c> now"), "Go  now");
    }

    #[test]
    fn test_images_removed() {
        assert_eq!(normalize_text("Look ![a cat](cat.png) here"), "Look  here");
    }

    #[test]
    fn test_dash_normalization() {
        assert_eq!(normalize_text("A \u{2014} B"), "A.  B");
        assert_eq!(normalize_text("pages 1\u{2013}2"), "pages 1. 2");
    }

    #[test]
    fn test_ellipsis_and_quotes() {
        assert_eq!(
            normalize_text("\u{201C}Wait\u{2026}\u{201D} she said, \u{2018}ok\u{2019}"),
            "Wait... she said, 'ok'"
        );
        assert_eq!(normalize_text("say \"hi\""), "say hi");
    }

    #[test]
    fn test_markdown_markers_stripped() {
        assert_eq!(normalize_text("# Title"), " Title");
        assert_eq!(normalize_text("**bold** and `code` and ~~gone~~"), "bold and code and gone");
        assert_eq!(normalize_text("> quoted line"), "quoted line");
        assert_eq!(normalize_text("above\n---\nbelow"), "above\n\nbelow");
    }

    #[test]
    fn test_transliteration() {
        assert_eq!(normalize_text("Caf\u{e9} na\u{ef}ve"), "Cafe naive");
    }

    #[test]
    fn test_output_is_ascii_only() {
        let text = "\u{4f60}\u{597d} world\n\n\u{1F600} smile\n\n\u{00a0}\u{2003}";
        for section in segment_document(text) {
            assert!(section.content().is_ascii(), "{:?}", section.content());
            assert!(!section.content().is_empty());
        }
    }

    #[test]
    fn test_numbering_is_contiguous_after_discards() {
        // 第二段只剩分隔线，清理后为空
        let sections = segment_document("First.\n\n---\n\nSecond.");
        let indices: Vec<usize> = sections.iter().map(|s| s.index()).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(sections[1].content(), "Second.");
    }

    #[test]
    fn test_crlf_paragraphs() {
        let sections = contents("One.\r\n\r\nTwo.");
        assert_eq!(sections, vec!["One.", "Two."]);
    }

    #[test]
    fn test_empty_document() {
        assert!(segment_document("").is_empty());
        assert!(segment_document("\n\n\n").is_empty());
    }
}
