/// Format file size in human-readable form
pub fn format_size(bytes: u64) -> String {
    use humansize::{FormatSize, BINARY};
    bytes.format_size(BINARY)
}

/// One line of `list` output: the fixed-width size column first, then the name.
pub fn format_entry(size: u64, name: &str) -> String {
    format!("Size={:<10}\tName={}", size, name)
}
