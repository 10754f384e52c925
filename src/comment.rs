use std::path::Path;

pub const LINE_MARKER: &str = "//";
pub const BLOCK_OPEN: &str = "/*";
pub const BLOCK_CLOSE: &str = "*/";
pub const CONTINUATION: &str = "*";
pub const PATH_KEEP: &str = "<!-- path:";

pub const SEPARATOR_MIN_RUN: usize = 4;

#[derive(Debug, Clone)]
pub struct Markers {
    pub line: String,
    pub block_open: String,
    pub block_close: String,
    pub continuation: String,
    pub path_keep: String,
    pub separator_min_run: usize,
}

impl Default for Markers {
    fn default() -> Self {
        Markers {
            line: LINE_MARKER.into(),
            block_open: BLOCK_OPEN.into(),
            block_close: BLOCK_CLOSE.into(),
            continuation: CONTINUATION.into(),
            path_keep: PATH_KEEP.into(),
            separator_min_run: SEPARATOR_MIN_RUN,
        }
    }
}

impl Markers {
    pub fn is_section_separator(&self, trimmed: &str) -> bool {
        let rest = match trimmed.strip_prefix(self.line.as_str()) {
            Some(r) => r,
            None => return false,
        };
        let rest = rest.strip_prefix(' ').unwrap_or(rest);
        let run = rest.chars().take_while(|&c| c == '=').count();
        run >= self.separator_min_run
    }

    pub fn is_whitelisted(&self, trimmed: &str) -> bool {
        trimmed.starts_with(self.path_keep.as_str()) || self.is_section_separator(trimmed)
    }

    pub fn is_comment_prefix(&self, trimmed: &str) -> bool {
        trimmed.starts_with(self.line.as_str())
            || trimmed.starts_with(self.block_open.as_str())
            || trimmed.starts_with(self.continuation.as_str())
    }
}

pub fn supported_extension(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();
    let ext = format!(".{ext}");

    // Slash-commented sources only; the '*' continuation rule would eat
    // markdown list items.
    let slash_exts = [
        ".c", ".h", ".cpp", ".hpp", ".cc", ".java", ".js", ".jsx", ".mjs", ".cjs", ".ts",
        ".tsx", ".cs", ".swift", ".go", ".kt", ".kts", ".scala", ".dart", ".php", ".rs",
    ];
    slash_exts.contains(&ext.as_str())
}
