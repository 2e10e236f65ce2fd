/// Annotated-markup presentation of a policy.
///
/// Every extracted block is rendered back as an element carrying its raw
/// importance score in a `data-score` attribute. Blocks are scored with the same
/// average-weight function as sentences, but scores are not scaled across blocks.
use std::fmt::Write as _;

use crate::extract::Block;
use crate::nlp::DocumentAnalyzer;
use crate::scorer::score_sentence;
use crate::weights::KeywordWeights;

/// Raw score of a block: the average weight over all of its content lemmas.
pub fn score_block(block: &Block, analyzer: &dyn DocumentAnalyzer, weights: &KeywordWeights) -> f64 {
    let lemmas: Vec<String> = analyzer
        .analyze(&block.text)
        .sentences
        .into_iter()
        .flat_map(|sentence| sentence.tokens)
        .collect();
    score_sentence(&lemmas, weights)
}

/// Render blocks as `<tag data-score="...">text</tag>` lines.
pub fn annotate_blocks(
    blocks: &[Block],
    analyzer: &dyn DocumentAnalyzer,
    weights: &KeywordWeights,
) -> String {
    let mut out = String::new();
    for block in blocks {
        let score = score_block(block, analyzer, weights);
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = write!(
            out,
            "<{tag} data-score=\"{score:.4}\">{text}</{tag}>",
            tag = block.tag,
            text = escape_text(&block.text),
        );
    }
    out
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("<br>"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::HeuristicAnalyzer;

    fn weights() -> KeywordWeights {
        KeywordWeights::from_map([("sell", 2.0), ("data", 1.0)]).unwrap()
    }

    #[test]
    fn blocks_carry_unscaled_scores() {
        let analyzer = HeuristicAnalyzer::for_weights(&weights());
        let blocks = vec![
            Block::new("h1", "Privacy Policy"),
            Block::new("p", "We sell data."),
            Block::new("li", "Data"),
        ];
        let markup = annotate_blocks(&blocks, &analyzer, &weights());
        assert_eq!(
            markup,
            "<h1 data-score=\"0.0000\">Privacy Policy</h1>\n\
             <p data-score=\"1.5000\">We sell data.</p>\n\
             <li data-score=\"1.0000\">Data</li>"
        );
    }

    #[test]
    fn block_score_spans_all_sentences() {
        let analyzer = HeuristicAnalyzer::for_weights(&weights());
        let block = Block::new("p", "We sell. Contact support.");
        // sell, contact, support
        assert!((score_block(&block, &analyzer, &weights()) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn text_is_escaped_and_line_breaks_kept() {
        let analyzer = HeuristicAnalyzer::default();
        let blocks = vec![Block::new("li", "Name <required>\nEmail & phone")];
        let markup = annotate_blocks(&blocks, &analyzer, &KeywordWeights::default());
        assert_eq!(
            markup,
            "<li data-score=\"0.0000\">Name &lt;required&gt;<br>Email &amp; phone</li>"
        );
    }

    #[test]
    fn no_blocks_render_nothing() {
        let analyzer = HeuristicAnalyzer::default();
        assert_eq!(annotate_blocks(&[], &analyzer, &weights()), "");
    }
}
