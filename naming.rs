//! File naming helpers shared by batch mode and the upload endpoints.
//!
//! Relative paths come from browsers (`webkitRelativePath`), so both `/` and
//! `\` are accepted as separators regardless of the host OS.

use std::path::{Path, PathBuf};

/// Case-insensitive check for a `.pdf` file name
pub fn is_pdf_name(name: &str) -> bool {
    name.to_lowercase().ends_with(".pdf")
}

/// Replace the final extension of `name` with `.txt`
pub fn txt_file_name(name: &str) -> String {
    let stem = match name.rfind('.') {
        // A leading dot is a hidden file, not an extension
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    };
    format!("{}.txt", stem)
}

/// Split a relative upload path into its meaningful components.
///
/// Empty, `.` and `..` components are dropped so the result can never climb
/// out of the directory it is joined onto.
pub fn split_relative(rel: &str) -> Vec<&str> {
    rel.split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != "." && *part != "..")
        .collect()
}

/// Top-level folder of a relative path with more than one component
pub fn top_folder(rel: &str) -> Option<&str> {
    let parts = split_relative(rel);
    if parts.len() > 1 {
        Some(parts[0])
    } else {
        None
    }
}

/// Output path for an uploaded file inside `root`.
///
/// The top folder of `rel` is stripped (it is already part of `root`) and the
/// extension becomes `.txt`. Without a usable `rel`, `fallback_name` is used.
pub fn mirrored_output_path(root: &Path, rel: Option<&str>, fallback_name: &str) -> PathBuf {
    let parts = rel.map(split_relative).unwrap_or_default();

    let (dirs, file_name) = match parts.split_last() {
        Some((last, rest)) => {
            let dirs = if rest.is_empty() { rest } else { &rest[1..] };
            (dirs.to_vec(), *last)
        }
        None => (Vec::new(), base_name(fallback_name)),
    };

    let mut path = root.to_path_buf();
    for dir in dirs {
        path.push(dir);
    }
    path.push(txt_file_name(file_name));
    path
}

/// Last component of a client supplied file name
pub fn base_name(name: &str) -> &str {
    split_relative(name).last().copied().unwrap_or("untitled")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_detection_is_case_insensitive() {
        assert!(is_pdf_name("report.pdf"));
        assert!(is_pdf_name("REPORT.PDF"));
        assert!(is_pdf_name("dir/Scan.Pdf"));
        assert!(!is_pdf_name("notes.txt"));
        assert!(!is_pdf_name("pdf"));
    }

    #[test]
    fn test_txt_file_name() {
        assert_eq!(txt_file_name("report.pdf"), "report.txt");
        assert_eq!(txt_file_name("report.PDF"), "report.txt");
        assert_eq!(txt_file_name("a.b.pdf"), "a.b.txt");
        assert_eq!(txt_file_name("noext"), "noext.txt");
        assert_eq!(txt_file_name(".hidden"), ".hidden.txt");
    }

    #[test]
    fn test_top_folder() {
        assert_eq!(top_folder("docs/a.pdf"), Some("docs"));
        assert_eq!(top_folder("docs\\sub\\a.pdf"), Some("docs"));
        assert_eq!(top_folder("a.pdf"), None);
        assert_eq!(top_folder(""), None);
    }

    #[test]
    fn test_mirrored_output_path_strips_top_folder() {
        let root = Path::new("/out/docs");
        assert_eq!(
            mirrored_output_path(root, Some("docs/2024/q1/report.pdf"), "report.pdf"),
            PathBuf::from("/out/docs/2024/q1/report.txt")
        );
        assert_eq!(
            mirrored_output_path(root, Some("docs/report.pdf"), "report.pdf"),
            PathBuf::from("/out/docs/report.txt")
        );
    }

    #[test]
    fn test_mirrored_output_path_single_component() {
        let root = Path::new("/out");
        assert_eq!(
            mirrored_output_path(root, Some("report.pdf"), "ignored.pdf"),
            PathBuf::from("/out/report.txt")
        );
    }

    #[test]
    fn test_mirrored_output_path_falls_back_to_file_name() {
        let root = Path::new("/out");
        assert_eq!(
            mirrored_output_path(root, None, "scan.PDF"),
            PathBuf::from("/out/scan.txt")
        );
        assert_eq!(
            mirrored_output_path(root, Some(""), "scan.pdf"),
            PathBuf::from("/out/scan.txt")
        );
    }

    #[test]
    fn test_parent_components_cannot_escape_root() {
        let root = Path::new("/out");
        let path = mirrored_output_path(root, Some("docs/../../../etc/passwd.pdf"), "x.pdf");
        assert_eq!(path, PathBuf::from("/out/etc/passwd.txt"));
        assert!(path.starts_with(root));
    }
}
