//! `shelf replay`: run a scripted sequence of page events.
//!
//! A script is a JSON array of events, e.g.
//!
//! ```json
//! [
//!   {"event": "navigate", "location": "/en-US/firefox/collections/123/slug/"},
//!   {"event": "collection_loaded", "summary": {"authorId": 123, "slug": "slug",
//!    "itemCount": 2, "pageSize": 25}}
//! ]
//! ```
//!
//! Rejected events are reported in their step and the replay continues.

use crate::output::{CliError, OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use shelf_core::collection::Viewer;
use shelf_core::command::Command;
use shelf_core::controller::{CollectionPage, PageEvent, PageSettings};
use shelf_core::error::ErrorCode;
use shelf_core::fetch::LoadState;
use shelf_core::view::PageView;
use shelf_core::ShelfConfig;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Path to the event script, or "-" for stdin.
    pub script: PathBuf,

    /// Start signed in as this user id.
    #[arg(long)]
    pub viewer: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ReplayStep {
    pub index: usize,
    pub event: &'static str,
    pub commands: Vec<Command>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CliError>,
}

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<ReplayStep>,
    pub load_state: LoadState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<PageView>,
}

pub fn read_script(path: &Path) -> Result<Vec<PageEvent>> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read script from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
        .context(ErrorCode::ScriptParseError)
}

/// Feed `events` through a fresh page.
pub fn replay(
    events: Vec<PageEvent>,
    settings: PageSettings,
    viewer: Option<u64>,
) -> ReplayReport {
    let viewer = viewer.map_or(Viewer::Anonymous, |user_id| Viewer::SignedIn { user_id });
    let mut page = CollectionPage::new(settings).with_viewer(viewer);

    let steps = events
        .into_iter()
        .enumerate()
        .map(|(index, event)| {
            let kind = event.kind();
            debug!(index, event = kind, "replaying event");
            match page.handle(event) {
                Ok(commands) => ReplayStep {
                    index,
                    event: kind,
                    commands,
                    error: None,
                },
                Err(err) => ReplayStep {
                    index,
                    event: kind,
                    commands: Vec::new(),
                    error: Some(CliError::from(&err)),
                },
            }
        })
        .collect();

    ReplayReport {
        steps,
        load_state: page.load_state(),
        view: page.view(),
    }
}

pub fn run_replay(args: &ReplayArgs, output: OutputMode, config: &ShelfConfig) -> Result<()> {
    let events = read_script(&args.script)?;
    let report = replay(events, PageSettings::from(config), args.viewer);
    render_mode(output, &report, render_text, render_pretty)
}

fn render_text(report: &ReplayReport, w: &mut dyn Write) -> std::io::Result<()> {
    for step in &report.steps {
        if let Some(err) = &step.error {
            writeln!(
                w,
                "{} {} error {} {}",
                step.index,
                step.event,
                err.error_code.as_deref().unwrap_or("-"),
                err.message
            )?;
        }
        for command in &step.commands {
            writeln!(w, "{} {} {command}", step.index, step.event)?;
        }
    }
    writeln!(w, "load_state={}", report.load_state.as_str())?;
    if let Some(view) = &report.view {
        let view = serde_json::to_string(view).map_err(std::io::Error::other)?;
        writeln!(w, "view={view}")?;
    }
    Ok(())
}

fn render_pretty(report: &ReplayReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Replay ({} events)", report.steps.len()))?;
    for step in &report.steps {
        writeln!(w, "#{:<3} {}", step.index, step.event)?;
        if let Some(err) = &step.error {
            writeln!(w, "     ! {}", err.message)?;
        }
        for command in &step.commands {
            writeln!(w, "     -> {command}")?;
        }
    }
    pretty_rule(w)?;
    pretty_kv(w, "Load state", report.load_state.as_str())?;
    if let Some(view) = &report.view {
        let view = serde_json::to_string(view).map_err(std::io::Error::other)?;
        pretty_kv(w, "View", view)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(json: &str) -> Vec<PageEvent> {
        serde_json::from_str(json).expect("script")
    }

    #[test]
    fn replay_records_commands_per_step() {
        let script = events(
            r#"[
                {"event": "navigate", "location": "/en-US/firefox/collections/john/default-slug/"},
                {"event": "collection_loaded", "summary": {
                    "authorId": 19, "authorUsername": "john", "slug": "default-slug",
                    "itemCount": 1, "pageSize": 25, "pageResults": 1}}
            ]"#,
        );
        let report = replay(script, PageSettings::default(), None);

        assert_eq!(report.steps.len(), 2);
        assert!(matches!(
            report.steps[0].commands.as_slice(),
            [Command::FetchCollection(_)]
        ));
        let [Command::Redirect(redirect)] = report.steps[1].commands.as_slice() else {
            panic!("expected redirect, got {:?}", report.steps[1].commands);
        };
        assert!(redirect.url.contains("/19/"));
        assert_eq!(report.load_state, LoadState::Loaded);
    }

    #[test]
    fn rejected_event_is_reported_and_replay_continues() {
        let script = events(
            r#"[
                {"event": "navigate", "location": "/en-US/firefox/collections/123/slug/"},
                {"event": "delete_collection"},
                {"event": "fetch_failed", "status": 404, "message": "Not found"}
            ]"#,
        );
        let report = replay(script, PageSettings::default(), Some(123));

        let error = report.steps[1].error.as_ref().expect("rejected");
        assert_eq!(error.error_code.as_deref(), Some("E3001"));
        assert_eq!(report.load_state, LoadState::Errored);
        assert_eq!(report.view, Some(PageView::NotFound));
    }

    #[test]
    fn malformed_script_is_coded() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("script.json");
        std::fs::write(&path, r#"[{"event": "teleport"}]"#).expect("write");

        let err = read_script(&path).expect_err("unknown event");
        assert_eq!(
            err.downcast_ref::<ErrorCode>(),
            Some(&ErrorCode::ScriptParseError)
        );
    }
}
