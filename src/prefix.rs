use crate::enricher::{EnrichError, Enricher, ALL_LEVELS};
use crate::fields;
use crate::record::LogRecord;
use tracing::Level;

/// Copies the `prefix` field into `@prefix` when colour output is off.
///
/// Plain-text formatters drop the prefix when they are not colouring, so the
/// alias keeps it visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixAnnotator {
    disable_colors: bool,
}

impl PrefixAnnotator {
    pub fn new(disable_colors: bool) -> Self {
        Self { disable_colors }
    }
}

impl Enricher for PrefixAnnotator {
    fn levels(&self) -> &[Level] {
        &ALL_LEVELS
    }

    fn enrich(&self, record: &mut LogRecord) -> Result<(), EnrichError> {
        if !self.disable_colors {
            return Ok(());
        }
        if let Some(prefix) = record.fields.get(fields::PREFIX).cloned() {
            record.fields.insert(fields::PREFIX_ALIAS.to_string(), prefix);
        }
        Ok(())
    }
}
