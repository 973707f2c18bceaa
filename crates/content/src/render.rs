use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::node::{Block, Document, Inline, TableNode};
use crate::postprocess::TABLE_WRAPPER_CLASS;

/// Serializes a content tree to HTML.
///
/// Every text and attribute value is escaped here; `TrustedMarkup` is the
/// only node emitted verbatim.
pub fn render_html(document: &Document) -> String {
    let mut out = String::new();

    for block in &document.blocks {
        match block {
            Block::Paragraph(inlines) => {
                out.push_str("<p>");
                for inline in inlines {
                    render_inline(inline, &mut out);
                }
                out.push_str("</p>");
            }
            Block::Code {
                language,
                code,
                expandable,
            } => {
                out.push_str("<pre><code");
                if let Some(language) = language {
                    let _ = write!(
                        out,
                        " class=\"language-{}\"",
                        encode_double_quoted_attribute(language)
                    );
                }
                if *expandable {
                    out.push_str(" data-expandable=\"true\"");
                }
                let _ = write!(out, ">{}</code></pre>", encode_text(code));
            }
            Block::Table(table) => render_table(table, &mut out),
            Block::ScrollRegion(table) => {
                let _ = write!(out, "<div class=\"{TABLE_WRAPPER_CLASS}\">");
                render_table(table, &mut out);
                out.push_str("</div>");
            }
            Block::TrustedMarkup(markup) => out.push_str(markup),
        }
    }

    out
}

fn render_inline(inline: &Inline, out: &mut String) {
    match inline {
        Inline::Text(text) => {
            let _ = write!(out, "{}", encode_text(text));
        }
        Inline::Link { href, label } => {
            // Links always open in a new browsing context.
            let _ = write!(
                out,
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
                encode_double_quoted_attribute(href),
                encode_text(label)
            );
        }
        Inline::Break => out.push_str("<br>"),
    }
}

fn render_table(table: &TableNode, out: &mut String) {
    out.push_str("<table>");

    if !table.headers.is_empty() {
        out.push_str("<thead><tr>");
        for header in &table.headers {
            let _ = write!(out, "<th>{}</th>", encode_text(header));
        }
        out.push_str("</tr></thead>");
    }

    out.push_str("<tbody>");
    for row in &table.rows {
        if table.row_hover {
            out.push_str("<tr class=\"hoverable\">");
        } else {
            out.push_str("<tr>");
        }
        for cell in row {
            if table.cell_copy {
                let _ = write!(out, "<td data-copy=\"true\">{}</td>", encode_text(cell));
            } else {
                let _ = write!(out, "<td>{}</td>", encode_text(cell));
            }
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{MessageBody, Role, enhance};
    use crate::postprocess::post_process_tables;

    #[test]
    fn plain_text_is_escaped() {
        let document = Document::plain_text("a < b && c > d");
        let html = render_html(&document);

        assert_eq!(html, "<p>a &lt; b &amp;&amp; c &gt; d</p>");
    }

    #[test]
    fn links_open_in_a_new_context() {
        let document = enhance(
            &MessageBody::plain("https://example.com"),
            Role::Assistant,
        );
        let html = render_html(&document);

        assert!(html.contains("target=\"_blank\""));
        assert!(html.contains("rel=\"noopener noreferrer\""));
    }

    #[test]
    fn trusted_markup_passes_through_verbatim() {
        let document = Document::trusted_markup("<em>kept</em>");
        assert_eq!(render_html(&document), "<em>kept</em>");
    }

    #[test]
    fn processed_tables_render_wrapper_and_interactions() {
        let mut document = Document::new().with_block(Block::Table(TableNode::new(
            vec!["k".into()],
            vec![vec!["v".into()]],
        )));
        post_process_tables(&mut document);
        let html = render_html(&document);

        assert!(html.starts_with("<div class=\"table-wrapper\"><table>"));
        assert!(html.contains("<tr class=\"hoverable\">"));
        assert!(html.contains("<td data-copy=\"true\">v</td>"));
    }
}
