//! CLI output formatting for batch runs.
//!
//! Rendered lines keep the original tool's log vocabulary:
//!
//! ```text
//! 이미지 처리 시작: 3개
//! 1. ⮕ ✅ 원본 복사: holiday.jpg
//! 2. ⮕ [용량 우선] quality=72, size=287KB: beach.jpg
//! 3. ⮕ ❌ 오류: broken.jpg - Decode failed: ...
//! 3개의 이미지 처리 완료
//! ```
//!
//! A canceled run ends with `🚫 처리 중지됨` instead of the completion line.
//!
//! # Architecture
//!
//! [`format_batch_event`] returns `Vec<String>` (pure, no I/O) for
//! testability, and [`print_batch_event`] writes to stdout. Log lines show
//! basenames; the full path stays on the event for callers that need it.

use crate::batch::{BatchEvent, BatchSummary, LogKind, LogLine};
use std::path::Path;

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn format_log_line(line: &LogLine) -> String {
    let name = basename(&line.path);
    match &line.kind {
        LogKind::Copied => format!("{}. ⮕ ✅ 원본 복사: {name}", line.index),
        LogKind::Encoded { detail } => format!("{}. ⮕ {detail}: {name}", line.index),
        LogKind::NoFit { last_attempted } => format!(
            "{}. ⮕ ⚠️ 압축 실패 (마지막 시도: quality={last_attempted}): {name}",
            line.index
        ),
        LogKind::Failed { reason } => {
            format!("{}. ⮕ ❌ 오류: {name} - {reason}", line.index)
        }
    }
}

fn format_summary(summary: &BatchSummary) -> String {
    if summary.canceled {
        "🚫 처리 중지됨".to_string()
    } else {
        format!("{}개의 이미지 처리 완료", summary.produced)
    }
}

/// Format a batch event as output lines. Progress events render nothing —
/// the per-item log lines already advance one per item.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { total } => vec![format!("이미지 처리 시작: {total}개")],
        BatchEvent::Log(line) => vec![format_log_line(line)],
        BatchEvent::Progress { .. } => vec![],
        BatchEvent::Finished(summary) => vec![format_summary(summary)],
    }
}

/// Print a batch event to stdout.
pub fn print_batch_event(event: &BatchEvent) {
    for line in format_batch_event(event) {
        println!("{}", line);
    }
}
