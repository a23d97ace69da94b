//! `shelf decode`: show how the page reads a location.

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use shelf_core::ShelfConfig;
use shelf_core::fetch::FetchDecisionEngine;
use shelf_core::filters::{self, Filters};
use shelf_core::route::{PageMode, Route};
use std::io::Write;

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Absolute location, e.g. "/en-US/firefox/collections/123/slug/?page=2".
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct DecodeReport {
    pub route: Route,
    /// Canonical filters; absent on the create page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_handler_id: Option<String>,
}

impl DecodeReport {
    pub fn build(location: &str, config: &ShelfConfig) -> Result<Self> {
        let route =
            Route::parse(location).with_context(|| format!("Failed to decode {location}"))?;
        let engine = FetchDecisionEngine::new(config.errors.namespace.clone());

        let (filters, error_handler_id) = match route.as_collection() {
            Some(collection) => (
                Some(collection.params.filters()),
                Some(engine.error_handler_id(&collection.params).to_string()),
            ),
            None => (None, None),
        };
        let query = filters.as_ref().map(filters::encode);

        Ok(Self {
            route,
            filters,
            query,
            error_handler_id,
        })
    }
}

pub fn run_decode(args: &DecodeArgs, output: OutputMode, config: &ShelfConfig) -> Result<()> {
    let report = DecodeReport::build(&args.location, config)?;
    render_mode(output, &report, render_text, render_pretty)
}

fn render_text(report: &DecodeReport, w: &mut dyn Write) -> std::io::Result<()> {
    match &report.route {
        Route::Collection(route) => {
            writeln!(w, "kind=collection")?;
            writeln!(w, "user_id={}", route.params.user_id)?;
            writeln!(w, "slug={}", route.params.slug)?;
            writeln!(w, "mode={}", mode_name(route.mode))?;
        }
        Route::Create(route) => {
            writeln!(w, "kind=create")?;
            if let Some(id) = &route.include_addon_id {
                writeln!(w, "include_addon_id={id}")?;
            }
        }
    }
    if let Some(filters) = &report.filters {
        writeln!(w, "page={}", filters.page)?;
        writeln!(w, "collection_sort={}", filters.collection_sort)?;
    }
    if let Some(query) = &report.query {
        writeln!(w, "query={query}")?;
    }
    if let Some(id) = &report.error_handler_id {
        writeln!(w, "error_handler_id={id}")?;
    }
    Ok(())
}

fn render_pretty(report: &DecodeReport, w: &mut dyn Write) -> std::io::Result<()> {
    match &report.route {
        Route::Collection(route) => {
            pretty_section(w, &format!("Collection {}", route.pathname()))?;
            pretty_kv(w, "Lang", &route.lang)?;
            pretty_kv(w, "App", &route.client_app)?;
            pretty_kv(w, "User", &route.params.user_id)?;
            pretty_kv(w, "Slug", &route.params.slug)?;
            pretty_kv(w, "Mode", mode_name(route.mode))?;
        }
        Route::Create(route) => {
            pretty_section(w, "Create collection")?;
            pretty_kv(w, "Lang", &route.lang)?;
            pretty_kv(w, "App", &route.client_app)?;
            pretty_kv(
                w,
                "Include add-on",
                route.include_addon_id.as_deref().unwrap_or("(none)"),
            )?;
        }
    }
    if let Some(filters) = &report.filters {
        pretty_kv(w, "Page", &filters.page)?;
        pretty_kv(w, "Sort", filters.collection_sort.as_str())?;
    }
    if let Some(query) = &report.query {
        pretty_kv(w, "Query", query)?;
    }
    if let Some(id) = &report.error_handler_id {
        pretty_kv(w, "Error handler", id)?;
    }
    Ok(())
}

const fn mode_name(mode: PageMode) -> &'static str {
    match mode {
        PageMode::View => "view",
        PageMode::Edit => "edit",
    }
}
