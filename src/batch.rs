//! Batch driver: the per-run loop over the resolved file set.
//!
//! For each file the driver tries the copy fast-path first (same format
//! family, width and size already under the caps), and otherwise runs
//! decode → resize → quality search → write. Per-item failures are logged
//! and the run continues; the only failure that prevents a run is an empty
//! input set.
//!
//! Progress and per-item outcomes go out as [`BatchEvent`]s over an optional
//! channel. The driver never touches stdout; rendering lives in
//! [`crate::output`]. Send failures (receiver gone) are ignored — a run
//! without a listener is still a run.
//!
//! Cancellation is cooperative: the token is polled at the top of the
//! per-item loop, and the search engine polls it before every probe encode.
//! The driver resets the token on entry so a stop requested after one run
//! cannot leak into the next.

use crate::cancel::CancelToken;
use crate::format::{self, FormatFamily};
use crate::imaging::codec::{Codec, CodecError};
use crate::imaging::resize::resize_keep_ratio;
use crate::imaging::search::{SearchOutcome, find_encoding};
use crate::policy::EncodingPolicy;
use filetime::FileTime;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("no input images to process")]
    NoInputs,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What happened to one item.
#[derive(Debug, Clone, PartialEq)]
pub enum LogKind {
    /// Original already satisfied the policy; copied byte-for-byte.
    Copied,
    /// Re-encoded; `detail` is the search engine's policy description.
    Encoded { detail: String },
    /// Size-priority search found no quality under the ceiling.
    NoFit { last_attempted: u32 },
    /// Decode, encode, or filesystem failure; the run continued.
    Failed { reason: String },
}

/// One rendered-log-line worth of outcome. `index` is the 1-based position
/// in the run; the full source path stays on the event, rendering shows the
/// basename.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub index: usize,
    pub path: PathBuf,
    pub kind: LogKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    /// Items the loop reached.
    pub attempted: usize,
    /// Items that yielded a tangible output (copy or encode).
    pub produced: usize,
    pub canceled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started { total: usize },
    Log(LogLine),
    Progress { completed: usize },
    Finished(BatchSummary),
}

fn send(events: &Option<Sender<BatchEvent>>, event: BatchEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}

/// Expand the operator's inputs into the concrete file list.
///
/// Files pass through as given; directories are expanded exactly one level
/// deep, filtered to recognized image extensions and sorted for a stable run
/// order.
pub fn resolve_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .min_depth(1)
                .max_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| format::is_recognized(p))
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    files
}

/// Delete the regular files directly inside `dir` (non-recursive). Returns
/// the number removed. Invoked by the CLI before a run, never by the driver.
pub fn clear_destination(dir: &Path) -> Result<usize, BatchError> {
    let mut removed = 0;
    if !dir.is_dir() {
        return Ok(0);
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            std::fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

enum ItemOutcome {
    Copied,
    Encoded { detail: String },
    NoFit { last_attempted: u32 },
    Canceled,
}

/// Copy fast-path check plus the full decode → resize → search → write path.
fn process_one(
    codec: &dyn Codec,
    source: &Path,
    dest_dir: &Path,
    policy: &EncodingPolicy,
    cancel: &CancelToken,
) -> Result<ItemOutcome, CodecError> {
    let source_family = FormatFamily::from_path(source)
        .ok_or_else(|| CodecError::Decode("unrecognized image format".to_string()))?;
    let resolved = policy.output_format.resolve_family(source_family);
    let dest = format::destination_path(source, dest_dir, resolved);

    // Fast path: declared width and on-disk size, no pixel decode.
    let info = codec.probe(source)?;
    if source_family == resolved
        && info.width <= policy.max_width
        && info.file_bytes <= policy.max_size_bytes()
    {
        let mtime = FileTime::from_last_modification_time(&std::fs::metadata(source)?);
        std::fs::copy(source, &dest)?;
        filetime::set_file_mtime(&dest, mtime)?;
        return Ok(ItemOutcome::Copied);
    }

    let img = resize_keep_ratio(codec.decode(source)?, policy.max_width);
    match find_encoding(codec, &img, resolved, policy, cancel)? {
        SearchOutcome::Found(result) => {
            std::fs::write(&dest, &result.bytes)?;
            Ok(ItemOutcome::Encoded {
                detail: result.detail,
            })
        }
        SearchOutcome::NoFit { last_attempted } => Ok(ItemOutcome::NoFit { last_attempted }),
        SearchOutcome::Canceled => Ok(ItemOutcome::Canceled),
    }
}

/// Run one batch.
///
/// Returns the summary that is also sent as the final event. `Err` only for
/// an empty resolved input set or a destination that cannot be created.
pub fn run_batch(
    codec: &dyn Codec,
    inputs: &[PathBuf],
    dest_dir: &Path,
    policy: &EncodingPolicy,
    cancel: &CancelToken,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    cancel.reset();

    let files = resolve_inputs(inputs);
    if files.is_empty() {
        return Err(BatchError::NoInputs);
    }
    std::fs::create_dir_all(dest_dir)?;

    send(&events, BatchEvent::Started { total: files.len() });

    let mut summary = BatchSummary::default();
    for (i, source) in files.iter().enumerate() {
        if cancel.is_requested() {
            summary.canceled = true;
            break;
        }
        summary.attempted += 1;
        let index = i + 1;

        let kind = match process_one(codec, source, dest_dir, policy, cancel) {
            Ok(ItemOutcome::Copied) => {
                summary.produced += 1;
                LogKind::Copied
            }
            Ok(ItemOutcome::Encoded { detail }) => {
                summary.produced += 1;
                LogKind::Encoded { detail }
            }
            Ok(ItemOutcome::NoFit { last_attempted }) => LogKind::NoFit { last_attempted },
            Ok(ItemOutcome::Canceled) => {
                // A canceled search logs nothing; the run simply stops.
                summary.canceled = true;
                break;
            }
            Err(e) => LogKind::Failed {
                reason: e.to_string(),
            },
        };

        send(
            &events,
            BatchEvent::Log(LogLine {
                index,
                path: source.clone(),
                kind,
            }),
        );
        send(&events, BatchEvent::Progress { completed: index });
    }

    send(&events, BatchEvent::Finished(summary));
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::OutputFormat;
    use crate::imaging::codec::SourceInfo;
    use crate::imaging::codec::tests::MockCodec;
    use crate::policy::PolicyMode;
    use image::DynamicImage;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn small_probe() -> SourceInfo {
        SourceInfo {
            width: 800,
            height: 600,
            file_bytes: 100 * 1024,
        }
    }

    fn large_probe() -> SourceInfo {
        SourceInfo {
            width: 4000,
            height: 3000,
            file_bytes: 5000 * 1024,
        }
    }

    fn write_fake_jpeg(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"fake jpeg bytes").unwrap();
        path
    }

    #[test]
    fn empty_inputs_is_the_only_run_preventing_failure() {
        let tmp = TempDir::new().unwrap();
        let codec = MockCodec::new();
        let err = run_batch(
            &codec,
            &[],
            tmp.path(),
            &EncodingPolicy::default(),
            &CancelToken::new(),
            None,
        );
        assert!(matches!(err, Err(BatchError::NoInputs)));
    }

    #[test]
    fn directory_expansion_is_one_level_and_filtered() {
        let tmp = TempDir::new().unwrap();
        write_fake_jpeg(tmp.path(), "b.jpg");
        write_fake_jpeg(tmp.path(), "a.png");
        std::fs::write(tmp.path().join("notes.txt"), b"skip me").unwrap();
        let nested = tmp.path().join("deeper");
        std::fs::create_dir(&nested).unwrap();
        write_fake_jpeg(&nested, "nested.jpg");

        let files = resolve_inputs(&[tmp.path().to_path_buf()]);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.jpg"]);
    }

    #[test]
    fn explicit_files_pass_through_unexpanded() {
        let tmp = TempDir::new().unwrap();
        let f = write_fake_jpeg(tmp.path(), "one.jpg");
        assert_eq!(resolve_inputs(&[f.clone()]), vec![f]);
    }

    #[test]
    fn shortcut_copies_and_preserves_mtime() {
        let tmp = TempDir::new().unwrap();
        let src_dir = tmp.path().join("in");
        let dest_dir = tmp.path().join("out");
        std::fs::create_dir_all(&src_dir).unwrap();
        let source = write_fake_jpeg(&src_dir, "keep.jpg");
        let old = FileTime::from_unix_time(1_500_000_000, 0);
        filetime::set_file_mtime(&source, old).unwrap();

        let codec = MockCodec::with_probes(vec![small_probe()]);
        let summary = run_batch(
            &codec,
            &[source.clone()],
            &dest_dir,
            &EncodingPolicy::default(),
            &CancelToken::new(),
            None,
        )
        .unwrap();

        assert_eq!(summary.produced, 1);
        let dest = dest_dir.join("keep.jpg");
        assert_eq!(std::fs::read(&dest).unwrap(), b"fake jpeg bytes");
        let copied_mtime =
            FileTime::from_last_modification_time(&std::fs::metadata(&dest).unwrap());
        assert_eq!(copied_mtime, old);
        // Probe only — the fast path never decodes.
        assert!(
            !codec
                .get_operations()
                .iter()
                .any(|op| matches!(op, crate::imaging::codec::tests::RecordedOp::Decode(_)))
        );
    }

    #[test]
    fn family_mismatch_skips_the_shortcut() {
        let tmp = TempDir::new().unwrap();
        let dest_dir = tmp.path().join("out");
        let source = write_fake_jpeg(tmp.path(), "photo.png");

        let policy = EncodingPolicy {
            output_format: OutputFormat::Jpeg,
            ..Default::default()
        };
        // Small in every respect, but PNG -> JPEG must re-encode.
        let codec = MockCodec::with_probes(vec![small_probe()]);
        let summary = run_batch(
            &codec,
            &[source],
            &dest_dir,
            &policy,
            &CancelToken::new(),
            None,
        )
        .unwrap();

        assert_eq!(summary.produced, 1);
        let dest = dest_dir.join("photo.jpg");
        // Quality priority at the default floor: 85 KB of mock output.
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), 85 * 1024);
    }

    #[test]
    fn oversized_file_is_resized_and_searched() {
        let tmp = TempDir::new().unwrap();
        let dest_dir = tmp.path().join("out");
        let source = write_fake_jpeg(tmp.path(), "big.jpg");

        let policy = EncodingPolicy {
            mode: PolicyMode::SizePriority,
            max_size_kb: 60,
            ..Default::default()
        };
        let codec = MockCodec::with_probes(vec![large_probe()]);
        let (tx, rx) = mpsc::channel();
        let summary = run_batch(
            &codec,
            &[source.clone()],
            &dest_dir,
            &policy,
            &CancelToken::new(),
            Some(tx),
        )
        .unwrap();

        assert_eq!(summary.produced, 1);
        assert_eq!(
            std::fs::metadata(dest_dir.join("big.jpg")).unwrap().len(),
            60 * 1024
        );

        let events: Vec<_> = rx.iter().collect();
        assert_eq!(events[0], BatchEvent::Started { total: 1 });
        assert!(matches!(
            &events[1],
            BatchEvent::Log(LogLine {
                index: 1,
                kind: LogKind::Encoded { detail },
                ..
            }) if detail == "[용량 우선] quality=60, size=60KB"
        ));
        assert_eq!(events[2], BatchEvent::Progress { completed: 1 });
        assert_eq!(events[3], BatchEvent::Finished(summary));
    }

    #[test]
    fn per_item_failure_logs_and_continues() {
        let tmp = TempDir::new().unwrap();
        let dest_dir = tmp.path().join("out");
        // Explicit files pass through resolution unfiltered, so a file with
        // an unrecognized extension reaches the per-item loop and fails there.
        let bad = write_fake_jpeg(tmp.path(), "bad.dat");
        let good = write_fake_jpeg(tmp.path(), "good.jpg");

        let codec = MockCodec::with_probes(vec![small_probe()]);
        let (tx, rx) = mpsc::channel();
        let summary = run_batch(
            &codec,
            &[bad.clone(), good.clone()],
            &dest_dir,
            &EncodingPolicy::default(),
            &CancelToken::new(),
            Some(tx),
        )
        .unwrap();

        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.produced, 1);
        assert!(!summary.canceled);

        let logs: Vec<_> = rx
            .iter()
            .filter_map(|e| match e {
                BatchEvent::Log(line) => Some(line),
                _ => None,
            })
            .collect();
        let LogKind::Failed { reason } = &logs[0].kind else {
            panic!("expected Failed, got {:?}", logs[0].kind);
        };
        // The rendered line shows the base name; the reason must not smuggle
        // the full path back in.
        assert!(!reason.contains(tmp.path().to_str().unwrap()));
        assert_eq!(logs[0].path, bad);
        assert_eq!(logs[1].kind, LogKind::Copied);
    }

    #[test]
    fn no_fit_is_logged_but_produces_nothing() {
        let tmp = TempDir::new().unwrap();
        let dest_dir = tmp.path().join("out");
        let source = write_fake_jpeg(tmp.path(), "dense.jpg");

        let policy = EncodingPolicy {
            mode: PolicyMode::SizePriority,
            max_size_kb: 5, // below the 10 KB the mock emits at quality 10
            ..Default::default()
        };
        let codec = MockCodec::with_probes(vec![large_probe()]);
        let (tx, rx) = mpsc::channel();
        let summary = run_batch(
            &codec,
            &[source],
            &dest_dir,
            &policy,
            &CancelToken::new(),
            Some(tx),
        )
        .unwrap();

        assert_eq!(summary.attempted, 1);
        assert_eq!(summary.produced, 0);
        let logs: Vec<_> = rx
            .iter()
            .filter_map(|e| match e {
                BatchEvent::Log(line) => Some(line),
                _ => None,
            })
            .collect();
        assert_eq!(logs[0].kind, LogKind::NoFit { last_attempted: 10 });
        assert!(!dest_dir.join("dense.jpg").exists());
    }

    #[test]
    fn stale_cancel_request_is_cleared_on_entry() {
        let tmp = TempDir::new().unwrap();
        let dest_dir = tmp.path().join("out");
        let source = write_fake_jpeg(tmp.path(), "one.jpg");

        let cancel = CancelToken::new();
        cancel.request(); // left over from a previous run

        let codec = MockCodec::with_probes(vec![small_probe()]);
        let summary = run_batch(
            &codec,
            &[source],
            &dest_dir,
            &EncodingPolicy::default(),
            &cancel,
            None,
        )
        .unwrap();

        assert!(!summary.canceled);
        assert_eq!(summary.produced, 1);
    }

    /// Wraps the mock codec and requests cancellation during a chosen
    /// decode, simulating a stop button pressed mid-run.
    struct CancelingCodec {
        inner: MockCodec,
        cancel: CancelToken,
        cancel_on_decode_of: PathBuf,
    }

    impl Codec for CancelingCodec {
        fn probe(&self, path: &Path) -> Result<SourceInfo, CodecError> {
            self.inner.probe(path)
        }

        fn decode(&self, path: &Path) -> Result<DynamicImage, CodecError> {
            if path == self.cancel_on_decode_of {
                self.cancel.request();
            }
            self.inner.decode(path)
        }

        fn encode(
            &self,
            img: &DynamicImage,
            family: FormatFamily,
            quality: u32,
        ) -> Result<Vec<u8>, CodecError> {
            self.inner.encode(img, family, quality)
        }
    }

    #[test]
    fn cancel_mid_run_stops_before_the_next_probe() {
        let tmp = TempDir::new().unwrap();
        let dest_dir = tmp.path().join("out");
        let first = write_fake_jpeg(tmp.path(), "first.jpg");
        let second = write_fake_jpeg(tmp.path(), "second.jpg");

        let cancel = CancelToken::new();
        let codec = CancelingCodec {
            inner: MockCodec::with_probes(vec![large_probe(), large_probe()]),
            cancel: cancel.clone(),
            cancel_on_decode_of: second.clone(),
        };

        let policy = EncodingPolicy {
            mode: PolicyMode::SizePriority,
            max_size_kb: 60,
            ..Default::default()
        };
        let (tx, rx) = mpsc::channel();
        let summary = run_batch(
            &codec,
            &[first, second],
            &dest_dir,
            &policy,
            &cancel,
            Some(tx),
        )
        .unwrap();

        assert!(summary.canceled);
        assert_eq!(summary.produced, 1);
        // The first item completed; the second's canceled search logs nothing.
        let log_count = rx
            .iter()
            .filter(|e| matches!(e, BatchEvent::Log(_)))
            .count();
        assert_eq!(log_count, 1);
    }

    #[test]
    fn clear_destination_removes_only_top_level_files() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("old1.jpg"), b"x").unwrap();
        std::fs::write(tmp.path().join("old2.png"), b"x").unwrap();
        let sub = tmp.path().join("keep");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("inner.jpg"), b"x").unwrap();

        let removed = clear_destination(tmp.path()).unwrap();
        assert_eq!(removed, 2);
        assert!(sub.join("inner.jpg").exists());
    }

    #[test]
    fn clear_destination_on_missing_dir_is_a_noop() {
        assert_eq!(
            clear_destination(Path::new("/nonexistent/surely")).unwrap(),
            0
        );
    }
}
