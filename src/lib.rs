//! # picbatch
//!
//! Batch image converter: downscale to a width bound, then re-encode under
//! either a quality floor or a file-size ceiling, with mid-run cancellation
//! and undoable edits to the pending work list.
//!
//! # Architecture: Policy → Driver → Search
//!
//! One run flows through three layers:
//!
//! ```text
//! 1. Policy   config + flags  →  EncodingPolicy   (validated once, immutable)
//! 2. Driver   file list       →  per-item outcomes (copy / encode / error)
//! 3. Search   decoded image   →  quality parameter (single encode or binary search)
//! ```
//!
//! The driver tries the copy fast-path first — a file whose format family,
//! width, and size already satisfy the policy is copied byte-for-byte using
//! only container metadata, never a decode. Everything else goes through
//! decode → resize → quality search → write.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`batch`] | Batch driver — input resolution, copy fast-path, per-item loop, progress events |
//! | [`imaging`] | Codec trait + pure-Rust implementation, AVIF decode, resize, quality search |
//! | [`policy`] | `EncodingPolicy` — what one run enforces, validated before it starts |
//! | [`format`] | Format families, extension canonicalization, destination naming |
//! | [`roster`] | The pending-file list with undoable delete (single, selection, all) |
//! | [`ledger`] | Generic LIFO ledger of reversible deletion frames, shared by roster and viewer |
//! | [`viewer`] | Viewer-local delete/restore with its own independent ledger |
//! | [`cancel`] | `CancelToken` — cooperative stop flag polled at defined boundaries |
//! | [`config`] | `picbatch.toml` loading and validation |
//! | [`output`] | CLI rendering of batch events |
//!
//! # Design Decisions
//!
//! ## In-Memory Probes
//!
//! Size-priority search encodes probes to memory and the accepted probe's
//! bytes *are* the final output — the driver writes them verbatim. The
//! reported size is therefore byte-exact and no redundant final encode runs.
//!
//! ## Pure-Rust Imaging (No ImageMagick, No FFmpeg)
//!
//! The [`imaging`] module uses the `image` crate for decoding and encoding,
//! `rav1d` for AVIF decode, the `webp` crate for lossy WebP (the `image`
//! crate only encodes lossless WebP), and `kamadak-exif` for orientation —
//! all pure Rust, statically linked. No system dependencies.
//!
//! ## Two Independent Ledgers
//!
//! The pending list and the preview viewer each keep their own
//! [`ledger::Ledger`]. Deleting in one never consumes or corrupts the
//! other's frames; the viewer syncs the list through callbacks instead of
//! shared state.
//!
//! ## Events Over Callbacks
//!
//! The driver reports progress as values over an optional `mpsc` channel.
//! The core has no dependency on any presentation layer; the CLI's printer
//! thread is just one possible listener, and a run without a listener is
//! still a run.

pub mod batch;
pub mod cancel;
pub mod config;
pub mod format;
pub mod imaging;
pub mod ledger;
pub mod output;
pub mod policy;
pub mod roster;
pub mod viewer;
