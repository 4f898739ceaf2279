//! Recognise many files, a few at a time, without letting one failure stop the rest.

use crate::ocr::Recognizer;
use crate::store::CredentialStore;
use crate::transport::OcrTransport;
use crate::types::{FileItem, FileStatus, NormalizedRecord};
use serde::Serialize;
use std::sync::Arc;

/// Files in flight at once.
pub const CONCURRENCY: usize = 5;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Run recognition over every item that is not already `Success`, updating
/// each item's status in place. Records get `source_file` set to the item name.
pub async fn scan_items<T, S>(
    recognizer: Arc<Recognizer<T, S>>,
    items: &mut [FileItem],
    template_sign: Option<String>,
) -> BatchSummary
where
    T: OcrTransport + 'static,
    S: CredentialStore + 'static,
{
    let mut summary = BatchSummary::default();

    let pending: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.status != FileStatus::Success)
        .map(|(i, _)| i)
        .collect();

    for chunk in pending.chunks(CONCURRENCY) {
        let handles: Vec<_> = chunk
            .iter()
            .map(|&idx| {
                let item = &mut items[idx];
                item.start();
                let source = item.source.clone();
                let recognizer = recognizer.clone();
                let template = template_sign.clone();
                tokio::task::spawn_blocking(move || {
                    recognizer.recognize(&source, None, template.as_deref())
                })
            })
            .collect();

        for (&idx, handle) in chunk.iter().zip(handles) {
            let item = &mut items[idx];
            match handle.await {
                Ok(Ok(record)) => {
                    let record = NormalizedRecord {
                        source_file: Some(item.source.name.clone()),
                        ..record
                    };
                    item.succeed(record);
                    summary.succeeded += 1;
                }
                Ok(Err(e)) => {
                    item.fail(e.to_string());
                    summary.failed += 1;
                }
                Err(e) => {
                    item.fail(format!("Task join error: {}", e));
                    summary.failed += 1;
                }
            }
        }
    }

    log::info!(
        "[batch] {} succeeded, {} failed",
        summary.succeeded,
        summary.failed
    );
    summary
}

/// Records of successful items, in item order.
pub fn collected_records(items: &[FileItem]) -> Vec<NormalizedRecord> {
    items
        .iter()
        .filter(|item| item.status == FileStatus::Success)
        .filter_map(|item| item.record.clone())
        .collect()
}
