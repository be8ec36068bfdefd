//! Parser for the synonym-group corpus (`resemble.txt`).
//!
//! The file is a sequence of blocks separated by blank lines. Each block has
//! a header line starting with `%` listing the member words, followed by
//! free-form content lines that explain the differences between them:
//!
//! ```text
//! %happy, glad, cheerful
//! 这些形容词均有"快乐的，高兴的"之意。
//! - happy: 普通用词 ...
//! - glad: 多指 ...
//! ```

use lazy_static::lazy_static;
use regex::Regex;

const HEADER_MARKER: char = '%';

lazy_static! {
    static ref NOT_MEMBER_CHAR: Regex = Regex::new(r"[^a-z,]").unwrap();
}

/// A parsed block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResembleGroup {
    /// Lower-cased header reduced to `[a-z,]`, e.g. `happy,glad,cheerful`.
    pub header: String,
    /// Content lines joined with `\n`.
    pub body: String,
}

impl ResembleGroup {
    /// Non-empty member words from the cleaned header.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.header.split(',').filter(|w| !w.is_empty())
    }
}

/// Reduces a raw header to lower-case letters and commas.
pub fn clean_header(raw: &str) -> String {
    NOT_MEMBER_CHAR.replace_all(&raw.to_lowercase(), "").into_owned()
}

/// Parses one block; blocks missing a header or a body yield `None`.
fn parse_block(block: &str) -> Option<ResembleGroup> {
    let mut header: Option<&str> = None;
    let mut body: Vec<&str> = Vec::new();

    for line in block.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix(HEADER_MARKER) {
            header = Some(rest.trim());
        } else if !line.is_empty() {
            body.push(line);
        }
    }

    let header = header.filter(|h| !h.is_empty())?;
    if body.is_empty() {
        return None;
    }

    Some(ResembleGroup {
        header: clean_header(header),
        body: body.join("\n"),
    })
}

/// Splits the corpus on blank lines and parses every block.
pub fn parse_resemble(text: &str) -> Vec<ResembleGroup> {
    let text = text.replace("\r\n", "\n");
    text.split("\n\n").filter_map(parse_block).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_bulleted_body() {
        let groups = parse_resemble("%happy, glad\n- content: pleased");
        assert_eq!(
            groups,
            vec![ResembleGroup {
                header: "happy,glad".to_string(),
                body: "- content: pleased".to_string(),
            }]
        );
        assert_eq!(groups[0].members().collect::<Vec<_>>(), vec!["happy", "glad"]);
    }

    #[test]
    fn multiple_blocks() {
        let text = "%big, large\n都表示大\n- big: 口语\n- large: 书面\n\n%small, little\n都表示小\n";
        let groups = parse_resemble(text);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].header, "big,large");
        assert_eq!(groups[0].body, "都表示大\n- big: 口语\n- large: 书面");
        assert_eq!(groups[1].header, "small,little");
        assert_eq!(groups[1].body, "都表示小");
    }

    #[test]
    fn header_is_cleaned() {
        assert_eq!(clean_header("Happy, Glad (adj.); Cheer-ful"), "happy,gladadjcheerful");
        assert_eq!(clean_header("  A ,, B "), "a,,b");
    }

    #[test]
    fn empty_members_are_skipped() {
        let group = ResembleGroup {
            header: "a,,b,".to_string(),
            body: String::new(),
        };
        assert_eq!(group.members().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn block_without_header_is_dropped() {
        assert!(parse_resemble("just some text\n- more").is_empty());
    }

    #[test]
    fn block_without_body_is_dropped() {
        assert!(parse_resemble("%happy, glad").is_empty());
        assert!(parse_resemble("%happy, glad\n   \n").is_empty());
    }

    #[test]
    fn bare_marker_is_dropped() {
        assert!(parse_resemble("%\nbody").is_empty());
    }

    #[test]
    fn last_header_wins() {
        let groups = parse_resemble("%first\n%second\nbody");
        assert_eq!(groups[0].header, "second");
    }

    #[test]
    fn lines_are_trimmed() {
        let groups = parse_resemble("  %cat, dog  \n   pets  \n");
        assert_eq!(groups[0].header, "cat,dog");
        assert_eq!(groups[0].body, "pets");
    }

    #[test]
    fn crlf_input() {
        let groups = parse_resemble("%a, b\r\nbody\r\n\r\n%c, d\r\nmore\r\n");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].header, "c,d");
    }
}
