use crate::prefix::PrefixAnnotator;
use crate::record::LogRecord;
use crate::resolver::CallSiteResolver;
use tracing::Level;

/// Every severity, most verbose first.
pub static ALL_LEVELS: [Level; 5] = [Level::TRACE, Level::DEBUG, Level::INFO, Level::WARN, Level::ERROR];

/// Non-fatal failure reported by an [`Enricher`].
///
/// The pipeline swallows these: the record is still emitted.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EnrichError {
    #[error("no call site found after scanning {scanned} frames")]
    Unresolved { scanned: usize },
}

/// A unit that derives fields for a [`LogRecord`].
///
/// Implementations hold configuration fixed at construction time and no
/// per-call state, so one instance can serve every thread.
pub trait Enricher: Send + Sync {
    /// Severities this enricher applies to.
    fn levels(&self) -> &[Level];

    /// Add or rewrite fields of `record`.
    fn enrich(&self, record: &mut LogRecord) -> Result<(), EnrichError>;
}

/// The enrichers a pipeline can hold.
#[derive(Debug, Clone)]
pub enum Hook {
    Prefix(PrefixAnnotator),
    CallSite(CallSiteResolver),
}

impl Hook {
    pub fn name(&self) -> &'static str {
        match self {
            Hook::Prefix(_) => "prefix",
            Hook::CallSite(_) => "call-site",
        }
    }

    pub fn applies_to(&self, level: Level) -> bool {
        self.levels().contains(&level)
    }
}

impl Enricher for Hook {
    fn levels(&self) -> &[Level] {
        match self {
            Hook::Prefix(h) => h.levels(),
            Hook::CallSite(h) => h.levels(),
        }
    }

    fn enrich(&self, record: &mut LogRecord) -> Result<(), EnrichError> {
        match self {
            Hook::Prefix(h) => h.enrich(record),
            Hook::CallSite(h) => h.enrich(record),
        }
    }
}

impl From<PrefixAnnotator> for Hook {
    fn from(hook: PrefixAnnotator) -> Self {
        Hook::Prefix(hook)
    }
}

impl From<CallSiteResolver> for Hook {
    fn from(hook: CallSiteResolver) -> Self {
        Hook::CallSite(hook)
    }
}
