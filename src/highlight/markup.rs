// WHY: Markup is spliced in from the last span to the first
// Every edit lengthens the text only after the spans still waiting to be wrapped

use crate::sentence_detector::ByteSpan;

/// One span to wrap, in byte offsets of the source text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkupSpan {
    pub span: ByteSpan,
    pub confidence: f64,
}

/// Wrap each span of `text` in a `<mark>` element titled with its confidence
///
/// Spans must lie on char boundaries and must not overlap. The order of
/// `spans` does not matter; they are applied in descending start order.
pub fn insert_markup(text: &str, spans: &[MarkupSpan], decimals: u32) -> String {
    let mut ordered: Vec<&MarkupSpan> = spans.iter().collect();
    ordered.sort_by(|a, b| b.span.start.cmp(&a.span.start));

    let mut output = text.to_string();
    for mark in ordered {
        let phrase = &text[mark.span.start..mark.span.end];
        let wrapped = format!(
            "<mark title=\"Confidence: {:.prec$}\">{}</mark>",
            mark.confidence,
            phrase,
            prec = decimals as usize
        );
        output.replace_range(mark.span.start..mark.span.end, &wrapped);
    }
    output
}
