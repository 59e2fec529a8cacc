//! Header filtering for the `columns` selector.

use tabet_model::{ColumnSelector, PatternSelector};
use tracing::debug;

/// Compiled form of an optional [`ColumnSelector`], applied to each header.
pub(crate) enum ColumnFilter<'a> {
    All,
    Names(&'a [String]),
    Pattern(&'a PatternSelector),
}

impl<'a> ColumnFilter<'a> {
    pub(crate) fn new(selector: Option<&'a ColumnSelector>) -> Self {
        match selector {
            None => Self::All,
            Some(ColumnSelector::Names(names)) => Self::Names(names),
            Some(ColumnSelector::Pattern(pattern)) => Self::Pattern(pattern),
        }
    }

    /// True when the header survives the selector. Rejections are advisory
    /// diagnostics only.
    pub(crate) fn keep(&self, header: &str) -> bool {
        match self {
            Self::All => true,
            Self::Names(names) => {
                let kept = names.iter().any(|name| name == header);
                if !kept {
                    debug!(column = header, "dropped by column list");
                }
                kept
            }
            Self::Pattern(pattern) => {
                let kept = pattern.matches_start(header);
                if !kept {
                    debug!(column = header, "dropped by column pattern");
                }
                kept
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_selector_keeps_everything() {
        let filter = ColumnFilter::new(None);
        assert!(filter.keep("anything"));
    }

    #[test]
    fn name_list_is_exact() {
        let selector = ColumnSelector::Names(vec!["id".into(), "name".into()]);
        let filter = ColumnFilter::new(Some(&selector));
        assert!(filter.keep("id"));
        assert!(!filter.keep("Id"));
        assert!(!filter.keep("extra"));
    }

    #[test]
    fn pattern_matches_header_start() {
        let selector = ColumnSelector::Pattern(PatternSelector::new(r"val_\d").unwrap());
        let filter = ColumnFilter::new(Some(&selector));
        assert!(filter.keep("val_1"));
        assert!(filter.keep("val_10_extra"));
        assert!(!filter.keep("total_val_1"));
    }
}
