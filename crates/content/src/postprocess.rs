use crate::node::{Block, Document, TableNode};

pub const TABLE_WRAPPER_CLASS: &str = "table-wrapper";

/// Wraps tabular content in a scrollable region exactly once and turns on
/// row-hover and cell-copy interactions.
///
/// Idempotent: already-wrapped tables are left untouched, so re-running the
/// pass after a pane refresh never nests wrappers.
pub fn post_process_tables(document: &mut Document) {
    for block in &mut document.blocks {
        match block {
            Block::Table(table) => {
                let mut table = table.clone();
                table.row_hover = true;
                table.cell_copy = true;
                *block = Block::ScrollRegion(table);
            }
            Block::ScrollRegion(table) => {
                table.row_hover = true;
                table.cell_copy = true;
            }
            Block::TrustedMarkup(markup) => {
                *markup = wrap_markup_tables(markup);
            }
            Block::Paragraph(_) | Block::Code { .. } => {}
        }
    }
}

/// Wraps `<table>` elements inside pre-formatted markup.
///
/// A table whose opening tag is directly preceded by the wrapper div is
/// skipped, which keeps the string-level pass idempotent too.
fn wrap_markup_tables(markup: &str) -> String {
    let wrapper_open = format!("<div class=\"{TABLE_WRAPPER_CLASS}\">");
    let mut output = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(start) = rest.find("<table") {
        let Some(end_tag) = rest[start..].find("</table>") else {
            break;
        };
        let end = start + end_tag + "</table>".len();

        let already_wrapped = rest[..start].trim_end().ends_with(wrapper_open.as_str());
        output.push_str(&rest[..start]);
        if already_wrapped {
            output.push_str(&rest[start..end]);
        } else {
            output.push_str(&wrapper_open);
            output.push_str(&rest[start..end]);
            output.push_str("</div>");
        }
        rest = &rest[end..];
    }

    output.push_str(rest);
    output
}

/// Marks block-level code as expandable into the isolated full view.
pub fn post_process_code_blocks(document: &mut Document) {
    for block in &mut document.blocks {
        if let Block::Code { expandable, .. } = block {
            *expandable = true;
        }
    }
}

/// Interaction event against one rendered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEvent {
    RowHover(usize),
    HoverCleared,
    CellDoubleClick { row: usize, column: usize },
}

/// Text the host should place on the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    pub text: String,
}

/// Tracks hover highlight and the transient copy confirmation for one table.
#[derive(Debug, Clone, Default)]
pub struct TableInteraction {
    hovered_row: Option<usize>,
    confirmed_cell: Option<(usize, usize)>,
}

impl TableInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered_row(&self) -> Option<usize> {
        self.hovered_row
    }

    /// Cell currently showing the "copied" confirmation, if any.
    pub fn confirmed_cell(&self) -> Option<(usize, usize)> {
        self.confirmed_cell
    }

    /// Applies one event, returning a copy request when a cell was
    /// double-clicked. Events only take effect once the table's interaction
    /// flags are on.
    pub fn apply(&mut self, table: &TableNode, event: TableEvent) -> Option<CopyRequest> {
        match event {
            TableEvent::RowHover(row) => {
                if table.row_hover && row < table.rows.len() {
                    self.hovered_row = Some(row);
                }
                None
            }
            TableEvent::HoverCleared => {
                self.hovered_row = None;
                None
            }
            TableEvent::CellDoubleClick { row, column } => {
                if !table.cell_copy {
                    return None;
                }
                let text = table.cell(row, column)?.to_string();
                self.confirmed_cell = Some((row, column));
                Some(CopyRequest { text })
            }
        }
    }

    /// Clears the transient confirmation after its display window elapses.
    pub fn expire_confirmation(&mut self) {
        self.confirmed_cell = None;
    }
}

/// Dismissal paths out of the full-view code presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DismissPath {
    OverlayClick,
    CloseButton,
    EscapeKey,
}

#[derive(Debug)]
struct OpenView {
    code: String,
    language: Option<String>,
    listeners: Vec<DismissPath>,
}

/// Isolated full-view presentation for one code block.
///
/// Each open registers one listener per dismissal path; every dismissal path
/// deregisters all of them so no handler outlives the view.
#[derive(Debug, Default)]
pub struct CodeViewer {
    active: Option<OpenView>,
}

impl CodeViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn open_code(&self) -> Option<&str> {
        self.active.as_ref().map(|view| view.code.as_str())
    }

    pub fn open_language(&self) -> Option<&str> {
        self.active
            .as_ref()
            .and_then(|view| view.language.as_deref())
    }

    pub fn listener_count(&self) -> usize {
        self.active
            .as_ref()
            .map(|view| view.listeners.len())
            .unwrap_or(0)
    }

    /// Opens the full view for one code block, replacing any prior view.
    pub fn open(&mut self, code: impl Into<String>, language: Option<String>) {
        self.active = Some(OpenView {
            code: code.into(),
            language,
            listeners: vec![
                DismissPath::OverlayClick,
                DismissPath::CloseButton,
                DismissPath::EscapeKey,
            ],
        });
    }

    /// Dismisses via the given path. Returns false when nothing was open or
    /// the path's listener was not registered.
    pub fn dismiss(&mut self, path: DismissPath) -> bool {
        let Some(view) = self.active.as_ref() else {
            return false;
        };
        if !view.listeners.contains(&path) {
            return false;
        }
        self.active = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Inline;

    fn sample_table() -> TableNode {
        TableNode::new(
            vec!["name".into(), "value".into()],
            vec![
                vec!["alpha".into(), "1".into()],
                vec!["beta".into(), "2".into()],
            ],
        )
    }

    #[test]
    fn tables_are_wrapped_exactly_once() {
        let mut document = Document::new().with_block(Block::Table(sample_table()));

        post_process_tables(&mut document);
        post_process_tables(&mut document);

        assert_eq!(document.blocks.len(), 1);
        let Block::ScrollRegion(table) = &document.blocks[0] else {
            panic!("expected scroll region");
        };
        assert!(table.row_hover);
        assert!(table.cell_copy);
    }

    #[test]
    fn markup_tables_are_wrapped_exactly_once() {
        let mut document =
            Document::trusted_markup("<p>before</p><table><tr><td>x</td></tr></table>");

        post_process_tables(&mut document);
        post_process_tables(&mut document);

        let Block::TrustedMarkup(markup) = &document.blocks[0] else {
            panic!("expected trusted markup");
        };
        assert_eq!(markup.matches(TABLE_WRAPPER_CLASS).count(), 1);
        assert!(markup.contains("<div class=\"table-wrapper\"><table>"));
    }

    #[test]
    fn non_table_blocks_are_untouched() {
        let mut document =
            Document::new().with_block(Block::Paragraph(vec![Inline::Text("hi".into())]));
        let before = document.clone();

        post_process_tables(&mut document);

        assert_eq!(document, before);
    }

    #[test]
    fn double_click_copies_cell_text_with_confirmation() {
        let mut document = Document::new().with_block(Block::Table(sample_table()));
        post_process_tables(&mut document);
        let Block::ScrollRegion(table) = &document.blocks[0] else {
            panic!("expected scroll region");
        };

        let mut interaction = TableInteraction::new();
        let copy = interaction.apply(table, TableEvent::CellDoubleClick { row: 1, column: 0 });

        assert_eq!(copy, Some(CopyRequest { text: "beta".into() }));
        assert_eq!(interaction.confirmed_cell(), Some((1, 0)));

        interaction.expire_confirmation();
        assert_eq!(interaction.confirmed_cell(), None);
    }

    #[test]
    fn copy_is_inert_before_post_processing() {
        let table = sample_table();
        let mut interaction = TableInteraction::new();

        let copy = interaction.apply(&table, TableEvent::CellDoubleClick { row: 0, column: 0 });

        assert_eq!(copy, None);
    }

    #[test]
    fn every_dismiss_path_clears_all_listeners() {
        for path in [
            DismissPath::OverlayClick,
            DismissPath::CloseButton,
            DismissPath::EscapeKey,
        ] {
            let mut viewer = CodeViewer::new();
            viewer.open("fn main() {}", Some("rust".into()));
            assert_eq!(viewer.listener_count(), 3);

            assert!(viewer.dismiss(path));
            assert!(!viewer.is_open());
            assert_eq!(viewer.listener_count(), 0);
            assert!(!viewer.dismiss(path));
        }
    }

    #[test]
    fn code_blocks_become_expandable() {
        let mut document = Document::new().with_block(Block::Code {
            language: Some("rust".into()),
            code: "let x = 1;".into(),
            expandable: false,
        });

        post_process_code_blocks(&mut document);

        assert!(matches!(
            document.blocks[0],
            Block::Code {
                expandable: true,
                ..
            }
        ));
    }
}
