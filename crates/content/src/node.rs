/// Inline-level content inside a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Link { href: String, label: String },
    Break,
}

/// Tabular content with renderer-consumed interaction flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNode {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows highlight on hover once post-processing runs.
    pub row_hover: bool,
    /// Cells copy their text on double-click once post-processing runs.
    pub cell_copy: bool,
}

impl TableNode {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows,
            row_hover: false,
            cell_copy: false,
        }
    }

    /// Returns cell text by zero-based row/column, if present.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
    }
}

/// Block-level content node.
///
/// `TrustedMarkup` carries pre-formatted backend output verbatim. It is the
/// single node kind the renderer emits unescaped, so the trust boundary has
/// exactly one audited crossing point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Vec<Inline>),
    Code {
        language: Option<String>,
        code: String,
        /// Opens in the isolated full-view presentation when true.
        expandable: bool,
    },
    Table(TableNode),
    /// A table already wrapped in its scrollable region.
    ScrollRegion(TableNode),
    TrustedMarkup(String),
}

/// Root of one message's renderable content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Convenience constructor for a single paragraph of plain text.
    pub fn plain_text(text: impl Into<String>) -> Self {
        Self::new().with_block(Block::Paragraph(vec![Inline::Text(text.into())]))
    }

    /// Convenience constructor for pass-through markup.
    pub fn trusted_markup(markup: impl Into<String>) -> Self {
        Self::new().with_block(Block::TrustedMarkup(markup.into()))
    }
}
