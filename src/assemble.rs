//! Document assembly
//!
//! Joins fetched files into the single text document sent to the generation
//! service. Each file becomes one block:
//!
//! ```text
//! // File: src/main.rs
//! ================================================================================
//!
//! <content>
//!
//! ================================================================================
//! ```
//!
//! Blocks are separated by one blank line. Content is copied verbatim, with
//! no escaping.

use crate::aggregate::FetchedFile;

/// Prefix of the header line naming each file
pub const HEADER_PREFIX: &str = "// File: ";

/// Width of the separator lines around each file
pub const SEPARATOR_WIDTH: usize = 80;

/// Character the separator lines are drawn with
pub const SEPARATOR_CHAR: char = '=';

fn separator() -> String {
    SEPARATOR_CHAR.to_string().repeat(SEPARATOR_WIDTH)
}

/// Format one file as a delimited block
pub fn file_block(file: &FetchedFile) -> String {
    let separator = separator();
    format!(
        "{HEADER_PREFIX}{path}\n{separator}\n\n{content}\n\n{separator}",
        path = file.path,
        content = file.content,
    )
}

/// Concatenate files into one document, preserving their order
pub fn assemble(files: &[FetchedFile]) -> String {
    files
        .iter()
        .map(file_block)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_file_document_is_exact() {
        let document = assemble(&[FetchedFile::new("a.txt", "x")]);
        let separator = "=".repeat(80);
        assert_eq!(
            document,
            format!("// File: a.txt\n{separator}\n\nx\n\n{separator}")
        );
    }

    #[test]
    fn test_blocks_are_in_input_order_with_one_blank_line_between() {
        let files = vec![
            FetchedFile::new("b.rs", "second"),
            FetchedFile::new("a.rs", "first"),
        ];
        let document = assemble(&files);

        let b_at = document.find("// File: b.rs").unwrap();
        let a_at = document.find("// File: a.rs").unwrap();
        assert!(b_at < a_at);
        assert!(document.contains(&format!("{}\n\n// File: a.rs", "=".repeat(80))));
    }

    #[test]
    fn test_each_path_appears_once_and_content_is_verbatim() {
        let files = vec![
            FetchedFile::new("src/lib.rs", "pub mod a;\n"),
            FetchedFile::new("src/a.rs", "// File: not/a/header\n====\n"),
            FetchedFile::new("empty.txt", ""),
        ];
        let document = assemble(&files);

        for file in &files {
            let header = format!("\n{HEADER_PREFIX}{}\n", file.path);
            let occurrences = format!("\n{document}").matches(&header).count();
            assert_eq!(occurrences, 1, "header for {}", file.path);
            assert!(document.contains(&file_block(file)));
        }
        assert_eq!(document.matches(&"=".repeat(80)).count(), 6);
    }

    #[test]
    fn test_no_files_yields_empty_document() {
        assert_eq!(assemble(&[]), "");
    }
}
