//! File chooser collaborators. The desktop host provides real dialogs; the
//! command-line front end answers them from its arguments.

use crate::loader::SUPPORTED_EXTENSIONS;
use crate::types::{FileFilter, OpenFileOptions, PickedFile, SaveFileOptions};
use std::path::{Path, PathBuf};

pub trait FileDialog {
    /// Empty on cancel; never fails.
    fn choose_files(&self, options: &OpenFileOptions) -> Vec<PickedFile>;
}

pub trait SaveDialog {
    /// `None` when the user cancels.
    fn choose_save_path(&self, options: &SaveFileOptions) -> Option<PathBuf>;
}

/// Options for picking invoices: every supported extension, multi-select.
pub fn invoice_open_options() -> OpenFileOptions {
    OpenFileOptions {
        title: Some("选择发票".to_string()),
        filters: vec![FileFilter {
            name: "发票文件".to_string(),
            extensions: SUPPORTED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }],
        multi_selection: true,
    }
}

/// "Picks" a fixed list of paths, applying the extension filters like a
/// native dialog would.
pub struct PathListDialog {
    paths: Vec<PathBuf>,
}

impl PathListDialog {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

fn matches_filters(path: &Path, filters: &[FileFilter]) -> bool {
    if filters.is_empty() {
        return true;
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    filters
        .iter()
        .flat_map(|f| f.extensions.iter())
        .any(|allowed| allowed == "*" || allowed.eq_ignore_ascii_case(&ext))
}

impl FileDialog for PathListDialog {
    fn choose_files(&self, options: &OpenFileOptions) -> Vec<PickedFile> {
        let mut picked = Vec::new();
        for path in &self.paths {
            if !matches_filters(path, &options.filters) {
                log::warn!("[dialog] Skipping {} (file type not accepted)", path.display());
                continue;
            }
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("")
                .to_string();
            picked.push(PickedFile {
                name,
                path: path.clone(),
            });
            if !options.multi_selection {
                break;
            }
        }
        picked
    }
}

/// Answers the save prompt with a preset decision.
pub enum FixedSaveDialog {
    /// Save to this path.
    Path(PathBuf),
    /// Accept whatever default the caller proposes.
    AcceptDefault,
    /// Behave as if the user pressed cancel.
    Cancel,
}

impl SaveDialog for FixedSaveDialog {
    fn choose_save_path(&self, options: &SaveFileOptions) -> Option<PathBuf> {
        match self {
            FixedSaveDialog::Path(p) => Some(p.clone()),
            FixedSaveDialog::AcceptDefault => options.default_path.clone(),
            FixedSaveDialog::Cancel => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_list_honours_extension_filter() {
        let dialog = PathListDialog::new(vec![
            PathBuf::from("/tmp/a.PDF"),
            PathBuf::from("/tmp/b.docx"),
            PathBuf::from("/tmp/c.jpeg"),
        ]);
        let picked = dialog.choose_files(&invoice_open_options());
        let names: Vec<_> = picked.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a.PDF", "c.jpeg"]);
    }

    #[test]
    fn single_selection_returns_first_match() {
        let dialog = PathListDialog::new(vec![PathBuf::from("x.png"), PathBuf::from("y.png")]);
        let options = OpenFileOptions {
            multi_selection: false,
            ..OpenFileOptions::default()
        };
        assert_eq!(dialog.choose_files(&options).len(), 1);
    }

    #[test]
    fn nothing_to_pick_is_empty_not_error() {
        let dialog = PathListDialog::new(vec![]);
        assert!(dialog.choose_files(&invoice_open_options()).is_empty());
    }

    #[test]
    fn fixed_save_dialog_variants() {
        let options = SaveFileOptions {
            default_path: Some(PathBuf::from("/downloads/out.xlsx")),
            ..SaveFileOptions::default()
        };
        assert_eq!(
            FixedSaveDialog::AcceptDefault.choose_save_path(&options),
            Some(PathBuf::from("/downloads/out.xlsx"))
        );
        assert_eq!(FixedSaveDialog::Cancel.choose_save_path(&options), None);
        assert_eq!(
            FixedSaveDialog::Path("/x.xlsx".into()).choose_save_path(&options),
            Some(PathBuf::from("/x.xlsx"))
        );
    }
}
