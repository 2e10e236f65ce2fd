/// Main-content extraction from HTML and plain text.
///
/// Picks the container with the most non-link text (boosting `article` and
/// `main`, skipping navigation/footer/cookie-banner style containers) and splits
/// it into its outermost text blocks: headings, paragraphs, list items, table
/// cells and the like. Text inside `<script>`, `<style>`, `<noscript>` and
/// `<template>` is never returned, and `<br>` becomes a line break.
use std::collections::HashMap;
use std::sync::LazyLock;

use ego_tree::iter::Edge;
use ego_tree::NodeId;
use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};

use crate::nlp::segment::PARAGRAPH_BREAK;

static CONTAINERS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article, main, section, div").expect("valid selector"));
static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid selector"));

const BLOCK_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "blockquote", "td", "th", "dd", "dt", "pre",
];
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];
const CHROME_TAGS: &[&str] = &["nav", "header", "footer", "aside", "form"];
const BOILERPLATE_MARKERS: &[&str] = &[
    "nav",
    "menu",
    "sidebar",
    "footer",
    "header",
    "banner",
    "cookie",
    "consent",
    "advert",
    "promo",
    "subscribe",
    "newsletter",
];
/// Containers with less visible text than this are not considered.
const MIN_CONTAINER_CHARS: usize = 20;

/// A unit of extracted text and the element it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Lowercase tag name, `p` for plain-text paragraphs.
    pub tag: String,
    pub text: String,
}

impl Block {
    pub fn new(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: text.into(),
        }
    }
}

/// Readable policy text as an ordered list of blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPolicy {
    pub blocks: Vec<Block>,
}

impl ExtractedPolicy {
    /// Block texts separated by blank lines, so no sentence spans two blocks.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("no readable text found in the document")]
    NoContent,
}

/// Extract the main content of an HTML page.
///
/// Both passes walk the tree iteratively, so arbitrarily deep markup cannot
/// exhaust the stack and each node is visited a bounded number of times.
pub fn extract_html(markup: &str) -> Result<ExtractedPolicy, ExtractError> {
    let document = Html::parse_document(markup);
    let stats = text_stats(&document);

    let container = best_container(&document, &stats)
        .or_else(|| document.select(&BODY).next())
        .unwrap_or_else(|| document.root_element());

    let (mut blocks, all_text) = collect_blocks(&container);

    if blocks.is_empty() {
        let text = normalize_lines(&all_text);
        if !text.is_empty() {
            blocks.push(Block::new("p", text));
        }
    }

    if blocks.is_empty() {
        return Err(ExtractError::NoContent);
    }
    Ok(ExtractedPolicy { blocks })
}

/// Split plain text into paragraph blocks on blank lines.
pub fn extract_text(text: &str) -> Result<ExtractedPolicy, ExtractError> {
    let normalized = text.replace("\r\n", "\n");
    let blocks: Vec<Block> = PARAGRAPH_BREAK
        .split(&normalized)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| Block::new("p", p))
        .collect();

    if blocks.is_empty() {
        return Err(ExtractError::NoContent);
    }
    Ok(ExtractedPolicy { blocks })
}

/// Visible non-whitespace characters below an element, and how many of them
/// sit inside links.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct TextStats {
    text_chars: usize,
    link_chars: usize,
}

/// Per-element text counts for the whole document, accumulated bottom-up in a
/// single traversal.
fn text_stats(document: &Html) -> HashMap<NodeId, TextStats> {
    let mut stats = HashMap::new();
    let mut open: Vec<TextStats> = Vec::new();
    let mut hidden_depth = 0usize;
    let mut link_depth = 0usize;

    for edge in document.tree.root().traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Element(element) => {
                    if hidden_depth > 0 || HIDDEN_TAGS.contains(&element.name()) {
                        hidden_depth += 1;
                    }
                    if element.name() == "a" {
                        link_depth += 1;
                    }
                    open.push(TextStats::default());
                }
                Node::Text(text) if hidden_depth == 0 => {
                    let chars = text.chars().filter(|c| !c.is_whitespace()).count();
                    if let Some(frame) = open.last_mut() {
                        frame.text_chars += chars;
                        if link_depth > 0 {
                            frame.link_chars += chars;
                        }
                    }
                }
                _ => {}
            },
            Edge::Close(node) => {
                let Node::Element(element) = node.value() else {
                    continue;
                };
                hidden_depth = hidden_depth.saturating_sub(1);
                if element.name() == "a" {
                    link_depth = link_depth.saturating_sub(1);
                }
                if let Some(frame) = open.pop() {
                    if let Some(parent) = open.last_mut() {
                        parent.text_chars += frame.text_chars;
                        parent.link_chars += frame.link_chars;
                    }
                    stats.insert(node.id(), frame);
                }
            }
        }
    }

    stats
}

fn best_container<'a>(
    document: &'a Html,
    stats: &HashMap<NodeId, TextStats>,
) -> Option<ElementRef<'a>> {
    let mut best: Option<(i64, ElementRef<'a>)> = None;

    for el in document.select(&CONTAINERS) {
        if is_boilerplate(el.value()) {
            continue;
        }
        let Some(counts) = stats.get(&el.id()) else {
            continue;
        };
        if counts.text_chars < MIN_CONTAINER_CHARS {
            continue;
        }

        let mut score = counts.text_chars as i64 - 2 * counts.link_chars as i64;
        match el.value().name() {
            "article" => score += 500,
            "main" => score += 300,
            _ => {}
        }

        match best {
            Some((best_score, _)) if best_score >= score => {}
            _ => best = Some((score, el)),
        }
    }

    best.map(|(_, el)| el)
}

fn is_boilerplate(element: &Element) -> bool {
    let mut markers = String::new();
    if let Some(class) = element.attr("class") {
        markers.push_str(class);
        markers.push(' ');
    }
    if let Some(id) = element.attr("id") {
        markers.push_str(id);
    }
    let markers = markers.to_ascii_lowercase();
    BOILERPLATE_MARKERS.iter().any(|m| markers.contains(m))
}

fn is_chrome(element: &Element) -> bool {
    CHROME_TAGS.contains(&element.name()) || is_boilerplate(element)
}

/// A block element whose text is still being gathered.
struct OpenBlock<'a> {
    id: NodeId,
    tag: &'a str,
    text: String,
}

/// Outermost blocks below `container` that are not inside page chrome, plus
/// the container's whole visible text for pages without block markup.
///
/// Source line breaks become spaces; only `<br>` produces a newline.
fn collect_blocks(container: &ElementRef<'_>) -> (Vec<Block>, String) {
    let mut blocks = Vec::new();
    let mut all_text = String::new();
    let mut current: Option<OpenBlock<'_>> = None;
    let mut hidden_depth = 0usize;
    let mut chrome_depth = 0usize;

    for edge in container.traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Element(element) => {
                    let name = element.name();
                    let in_chrome = chrome_depth > 0;
                    if hidden_depth > 0 || HIDDEN_TAGS.contains(&name) {
                        hidden_depth += 1;
                    }
                    if in_chrome || (node.id() != container.id() && is_chrome(element)) {
                        chrome_depth += 1;
                    }
                    if hidden_depth > 0 {
                        continue;
                    }

                    if name == "br" {
                        all_text.push('\n');
                        if let Some(block) = current.as_mut() {
                            block.text.push('\n');
                        }
                    } else if current.is_none() && !in_chrome && BLOCK_TAGS.contains(&name) {
                        current = Some(OpenBlock {
                            id: node.id(),
                            tag: name,
                            text: String::new(),
                        });
                    }
                }
                Node::Text(text) if hidden_depth == 0 => {
                    let visible = text
                        .chars()
                        .map(|c| if c.is_whitespace() { ' ' } else { c });
                    match current.as_mut() {
                        Some(block) => {
                            let start = block.text.len();
                            block.text.extend(visible);
                            all_text.push_str(&block.text[start..]);
                        }
                        None => all_text.extend(visible),
                    }
                }
                _ => {}
            },
            Edge::Close(node) => {
                if !node.value().is_element() {
                    continue;
                }
                hidden_depth = hidden_depth.saturating_sub(1);
                chrome_depth = chrome_depth.saturating_sub(1);

                if current.as_ref().is_some_and(|block| block.id == node.id()) {
                    if let Some(block) = current.take() {
                        let text = normalize_lines(&block.text);
                        if !text.is_empty() {
                            blocks.push(Block::new(block.tag, text));
                        }
                    }
                }
            }
        }
    }

    (blocks, all_text)
}

/// Collapse whitespace within each line and drop empty lines.
fn normalize_lines(raw: &str) -> String {
    raw.split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    const POLICY_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Privacy Policy</title>
  <style>body { color: red; }</style>
</head>
<body>
  <div class="navbar">
    <a href="/">Home</a> <a href="/about">About</a> <a href="/privacy">Privacy</a>
  </div>
  <article>
    <h1>Privacy Policy</h1>
    <p>We collect your email address
       when you register.</p>
    <p>We <b>never</b> sell your data.<script>track();</script></p>
    <ul>
      <li><p>Name</p></li>
      <li>Postal address<br>Phone number</li>
    </ul>
    <footer><p>Copyright 2024 Example Inc.</p></footer>
  </article>
  <div id="cookie-consent"><p>This site uses cookies to improve your experience, accept?</p></div>
</body>
</html>"#;

    #[test]
    fn extracts_article_blocks_in_order() {
        let extracted = extract_html(POLICY_PAGE).unwrap();
        let blocks: Vec<(&str, &str)> = extracted
            .blocks
            .iter()
            .map(|b| (b.tag.as_str(), b.text.as_str()))
            .collect();
        assert_eq!(
            blocks,
            vec![
                ("h1", "Privacy Policy"),
                ("p", "We collect your email address when you register."),
                ("p", "We never sell your data."),
                ("li", "Name"),
                ("li", "Postal address\nPhone number"),
            ]
        );
    }

    #[test]
    fn text_joins_blocks_with_blank_lines() {
        let extracted = extract_html(POLICY_PAGE).unwrap();
        let text = extracted.text();
        assert!(text.starts_with("Privacy Policy\n\nWe collect your email address"));
        assert!(!text.contains("track()"));
        assert!(!text.contains("Copyright"));
    }

    #[test]
    fn container_without_blocks_becomes_one_paragraph() {
        let html = "<html><body><div>We process personal information to provide the service.</div></body></html>";
        let extracted = extract_html(html).unwrap();
        assert_eq!(
            extracted.blocks,
            vec![Block::new("p", "We process personal information to provide the service.")]
        );
    }

    #[test]
    fn page_without_text_has_no_content() {
        let html = "<html><head><script>var x = 1;</script></head><body>  </body></html>";
        assert!(matches!(extract_html(html), Err(ExtractError::NoContent)));
    }

    #[test]
    fn deeply_nested_inline_markup_is_walked_without_recursion() {
        let depth = 50_000;
        let mut html = String::from("<html><body><p>");
        html.push_str(&"<span>".repeat(depth));
        html.push_str("We collect your data.");

        let extracted = extract_html(&html).unwrap();
        assert_eq!(extracted.blocks, vec![Block::new("p", "We collect your data.")]);
    }

    #[test]
    fn deeply_nested_containers_extract_in_linear_time() {
        let depth = 3_000;
        let filler = "We may share account details with service providers who help us operate. ".repeat(3);
        let mut html = String::from("<html><body>");
        for _ in 0..depth {
            html.push_str("<div><a href=\"#\">Settings</a> ");
            html.push_str(&filler);
        }

        let started = Instant::now();
        let extracted = extract_html(&html).unwrap();
        let elapsed = started.elapsed();

        assert_eq!(extracted.blocks.len(), 1);
        assert!(
            elapsed < Duration::from_secs(3),
            "extraction of {depth} nested containers took {elapsed:?}"
        );
    }

    #[test]
    fn stats_roll_up_from_children() {
        let html = r#"<html><body><div id="outer">Alpha <a href="/">beta</a><div id="inner">Gamma</div><script>ignored()</script></div></body></html>"#;
        let document = Html::parse_document(html);
        let stats = text_stats(&document);

        let id_of = |selector: &str| {
            let selector = Selector::parse(selector).unwrap();
            document.select(&selector).next().unwrap().id()
        };
        assert_eq!(
            stats[&id_of("#outer")],
            TextStats {
                text_chars: 14,
                link_chars: 4
            }
        );
        assert_eq!(
            stats[&id_of("#inner")],
            TextStats {
                text_chars: 5,
                link_chars: 0
            }
        );
    }

    #[test]
    fn plain_text_splits_on_blank_lines() {
        let extracted = extract_text("First paragraph.\nStill first.\r\n\r\nSecond one.\n\n \n").unwrap();
        assert_eq!(
            extracted.blocks,
            vec![
                Block::new("p", "First paragraph.\nStill first."),
                Block::new("p", "Second one."),
            ]
        );
        assert!(matches!(extract_text(" \n\n "), Err(ExtractError::NoContent)));
    }
}
