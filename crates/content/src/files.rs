/// Broad attachment taxonomy used for icons and processing hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Document,
    Spreadsheet,
    Presentation,
    Pdf,
    Image,
    Code { language: &'static str },
    Text,
    Markdown,
    Csv,
    Generic,
}

/// Classification result for one attachment name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileClass {
    pub kind: FileKind,
    pub icon: &'static str,
    pub processing_hint: &'static str,
}

impl FileClass {
    const fn new(kind: FileKind, icon: &'static str, processing_hint: &'static str) -> Self {
        Self {
            kind,
            icon,
            processing_hint,
        }
    }
}

/// Hard cap on attachment payloads, mirroring the backend's upload limit.
pub const MAX_ATTACHMENT_BYTES: usize = 16 * 1024 * 1024;

/// Maps a file name to its taxonomy entry by extension, case-insensitively.
///
/// Unknown or missing extensions resolve to the generic class; this lookup
/// never fails.
pub fn classify_file(name: &str) -> FileClass {
    let extension = name
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "doc" | "docx" | "odt" | "rtf" => {
            FileClass::new(FileKind::Document, "📄", "extract document text")
        }
        "xls" | "xlsx" | "ods" => {
            FileClass::new(FileKind::Spreadsheet, "📊", "tabular preview")
        }
        "ppt" | "pptx" | "odp" => {
            FileClass::new(FileKind::Presentation, "📽️", "slide text summary")
        }
        "pdf" => FileClass::new(FileKind::Pdf, "📕", "extract page text"),
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" => {
            FileClass::new(FileKind::Image, "🖼️", "describe via vision model")
        }
        "py" => code_class("python"),
        "js" => code_class("javascript"),
        "ts" => code_class("typescript"),
        "rs" => code_class("rust"),
        "go" => code_class("go"),
        "java" => code_class("java"),
        "c" | "h" => code_class("c"),
        "cpp" | "cc" | "hpp" => code_class("cpp"),
        "rb" => code_class("ruby"),
        "php" => code_class("php"),
        "sh" => code_class("shell"),
        "html" => code_class("html"),
        "css" => code_class("css"),
        "json" => code_class("json"),
        "xml" => code_class("xml"),
        "sql" => code_class("sql"),
        "txt" | "log" => FileClass::new(FileKind::Text, "📝", "inline as plain text"),
        "md" | "markdown" => FileClass::new(FileKind::Markdown, "🧾", "inline as markdown"),
        "csv" => FileClass::new(FileKind::Csv, "📊", "tabular preview"),
        _ => FileClass::new(FileKind::Generic, "📎", "attach without extraction"),
    }
}

const fn code_class(language: &'static str) -> FileClass {
    FileClass::new(
        FileKind::Code { language },
        "💻",
        "inline as fenced code",
    )
}
