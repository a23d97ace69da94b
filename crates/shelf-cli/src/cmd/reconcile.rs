//! `shelf reconcile`: where the page lands after removing one add-on.

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use shelf_core::filters::{self, Filters, SortKey};
use shelf_core::paging::{self, Reconciliation};
use std::io::Write;

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Current page token.
    #[arg(long, default_value = filters::DEFAULT_PAGE)]
    pub page: String,

    /// Add-ons in the collection before the removal.
    #[arg(long)]
    pub count: u64,

    /// Add-ons per page.
    #[arg(long, default_value_t = 25)]
    pub page_size: u64,

    /// Current sort (wire value, e.g. "-added").
    #[arg(long, default_value = "-added", allow_hyphen_values = true)]
    pub sort: SortKey,
}

#[derive(Debug, Serialize)]
pub struct ReconcileReport {
    pub step_back: bool,
    /// Filters the page should be on after the removal.
    pub filters: Filters,
    pub query: String,
}

impl ReconcileReport {
    #[must_use]
    pub fn build(args: &ReconcileArgs) -> Self {
        let current = Filters::new(args.page.clone(), args.sort);
        let outcome = paging::reconcile_removal(&current, args.count, args.page_size);
        let step_back = matches!(outcome, Reconciliation::StepBack { .. });
        let filters = outcome.filters_or(&current).clone();
        let query = filters::encode(&filters);
        Self {
            step_back,
            filters,
            query,
        }
    }
}

/// # Errors
///
/// Returns an error if writing the report fails.
pub fn run_reconcile(args: &ReconcileArgs, output: OutputMode) -> Result<()> {
    let report = ReconcileReport::build(args);
    render_mode(
        output,
        &report,
        |r, w| {
            writeln!(w, "step_back={}", r.step_back)?;
            writeln!(w, "query={}", r.query)
        },
        |r, w| {
            pretty_section(w, "Removal outcome")?;
            pretty_kv(w, "Action", if r.step_back { "step back" } else { "stay" })?;
            pretty_kv(w, "Page", &r.filters.page)?;
            pretty_kv(w, "Sort", r.filters.collection_sort.as_str())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(page: &str, count: u64, page_size: u64) -> ReconcileArgs {
        ReconcileArgs {
            page: page.into(),
            count,
            page_size,
            sort: SortKey::default(),
        }
    }

    #[test]
    fn last_item_steps_back() {
        let report = ReconcileReport::build(&args("2", 2, 1));
        assert!(report.step_back);
        assert_eq!(report.query, "page=1&collection_sort=-added");
    }

    #[test]
    fn full_page_stays() {
        let report = ReconcileReport::build(&args("2", 10, 5));
        assert!(!report.step_back);
        assert_eq!(report.filters.page, "2");
    }
}
