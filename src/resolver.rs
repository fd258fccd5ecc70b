use crate::classifier::{FacilityClassifier, FrameClassifier};
use crate::enricher::{EnrichError, Enricher, ALL_LEVELS};
use crate::fields;
use crate::frame::{FrameSource, StackFrames};
use crate::record::LogRecord;
use std::fmt;
use std::sync::Arc;
use tracing::Level;

/// Trailing path segments kept in a call-site locator by default.
pub const DEFAULT_PATH_LEN: usize = 3;

/// Frames examined before giving up on finding the application's call site.
pub const DEFAULT_MAX_SCAN_DEPTH: usize = 64;

/// First frame examined: skips the stack capture and the resolver itself.
const SCAN_START: usize = 2;

/// Unwinder frames above the capture point, dropped after the walk.
const CAPTURE_SLACK: usize = 16;

/// Enricher writing `"<path>:<line>"` of the application code that issued
/// the log call into [`fields::CALL_SITE`].
///
/// The walk starts at the resolver, steps over every frame the classifier
/// reports as internal, then moves a further `depth offset` frames outward so
/// that wrappers built on top of the logger attribute to their own callers.
/// The offset is read per record from [`fields::DEPTH_OFFSET`].
#[derive(Clone)]
pub struct CallSiteResolver {
    classifier: Arc<dyn FrameClassifier>,
    path_len: usize,
    max_scan_depth: usize,
}

impl CallSiteResolver {
    pub fn new(path_len: usize) -> Self {
        Self {
            classifier: Arc::new(FacilityClassifier),
            path_len,
            max_scan_depth: DEFAULT_MAX_SCAN_DEPTH,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn FrameClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_max_scan_depth(mut self, max_scan_depth: usize) -> Self {
        self.max_scan_depth = max_scan_depth;
        self
    }

    pub fn path_len(&self) -> usize {
        self.path_len
    }

    /// Locate the call site in `stack`, `depth_offset` frames past the first
    /// frame outside the facility.
    pub fn locate(&self, stack: &dyn FrameSource, depth_offset: usize) -> Result<String, EnrichError> {
        for skip in SCAN_START..self.max_scan_depth {
            let Some(frame) = stack.frame(skip) else {
                return Err(EnrichError::Unresolved { scanned: skip - SCAN_START });
            };
            if self.classifier.is_internal(frame) {
                continue;
            }
            let target = skip
                .checked_add(depth_offset)
                .and_then(|at| stack.frame(at))
                .ok_or(EnrichError::Unresolved {
                    scanned: skip + 1 - SCAN_START,
                })?;
            return Ok(format!("{}:{}", shorten_path(&target.file, self.path_len), target.line));
        }
        Err(EnrichError::Unresolved {
            scanned: self.max_scan_depth.saturating_sub(SCAN_START),
        })
    }
}

impl Default for CallSiteResolver {
    fn default() -> Self {
        Self::new(DEFAULT_PATH_LEN)
    }
}

impl fmt::Debug for CallSiteResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallSiteResolver")
            .field("path_len", &self.path_len)
            .field("max_scan_depth", &self.max_scan_depth)
            .finish_non_exhaustive()
    }
}

impl Enricher for CallSiteResolver {
    fn levels(&self) -> &[Level] {
        &ALL_LEVELS
    }

    fn enrich(&self, record: &mut LogRecord) -> Result<(), EnrichError> {
        let depth_offset = fields::depth_offset(record);
        let limit = self
            .max_scan_depth
            .saturating_add(depth_offset)
            .saturating_add(CAPTURE_SLACK);
        let stack = StackFrames::capture(limit);
        match self.locate(&stack, depth_offset) {
            Ok(call_site) => {
                record.fields.insert(fields::CALL_SITE.to_string(), call_site.into());
                Ok(())
            }
            Err(e) => {
                record
                    .fields
                    .insert(fields::CALL_SITE.to_string(), fields::UNKNOWN_CALL_SITE.into());
                Err(e)
            }
        }
    }
}

/// Keep the last `n` separator-delimited segments of `path`.
///
/// Both `/` and `\` count as separators and the kept part is returned as it
/// appears in `path`. Paths with `n` or fewer segments, and `n == 0`, are
/// returned unchanged.
pub fn shorten_path(path: &str, n: usize) -> &str {
    if n == 0 {
        return path;
    }
    let mut end = path.len();
    for _ in 0..n {
        match path[..end].rfind(['/', '\\']) {
            Some(idx) => end = idx,
            None => return path,
        }
    }
    &path[end + 1..]
}
