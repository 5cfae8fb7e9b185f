//! Implementation of the `treehouse list` command

use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;
use tracing::debug;
use treehouse_core::{
    CheckState, Config, LiveStatus, OriginType, ScanOptions, SystemRunner, WorktreeRecord,
    WorktreeStatus, apply_order, filter_records, scan,
};

use crate::colors::COLORS;
use crate::interaction;
use crate::output::{JsonIssue, JsonResponse, ListData};

/// Arguments of `treehouse list`
#[derive(Debug, Clone, Default)]
pub struct ListArgs {
    pub dir: Option<String>,
    pub filter: Option<String>,
    pub status: Option<WorktreeStatus>,
    pub no_github: bool,
    pub watch: bool,
    pub interval: Option<u64>,
}

/// Run the list command
pub async fn run_list(
    args: ListArgs,
    config: &Config,
    json_output: bool,
    quiet: bool,
) -> Result<i32, String> {
    let mut options = ScanOptions::from_config(config);
    if let Some(dir) = &args.dir {
        options = options.with_directory(dir);
    }
    if args.no_github {
        options = options.with_github(false);
    }

    let mut lister = Lister {
        runner: super::runner(config),
        options,
        args: &args,
        json_output,
        quiet,
        order: Vec::new(),
    };

    if !args.watch {
        return lister.pass().await;
    }

    let secs = args.interval.unwrap_or(config.scan.refresh_interval_secs).max(1);
    let mut ticker = tokio::time::interval(Duration::from_secs(secs));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut code = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }
        tokio::select! {
            _ = &mut shutdown => break,
            result = lister.pass() => code = result?,
        }
        if !json_output && !quiet {
            println!(
                "{}",
                format!(
                    "Refreshed at {}, next scan in {}s (Ctrl-C to stop)",
                    Local::now().format("%H:%M:%S"),
                    secs
                )
                .style(COLORS.muted)
            );
        }
    }

    debug!("Watch mode stopped");
    Ok(code)
}

/// State carried across scans in watch mode
struct Lister<'a> {
    runner: SystemRunner,
    options: ScanOptions,
    args: &'a ListArgs,
    json_output: bool,
    quiet: bool,
    /// Display order of ids; known ids keep their slot across rescans
    order: Vec<String>,
}

impl Lister<'_> {
    /// One scan plus output
    async fn pass(&mut self) -> Result<i32, String> {
        let scan_dir = self.options.directory.display().to_string();

        let spinner = (!self.json_output && !self.quiet)
            .then(|| interaction::spinner(&format!("Scanning {}", scan_dir)));
        let result = scan(&self.runner, &self.options).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let records = match result {
            Ok(records) => records,
            Err(e) => {
                if self.json_output {
                    let response = JsonResponse::error(
                        "list",
                        ListData {
                            scan_dir,
                            github: self.options.github,
                            worktrees: vec![],
                        },
                        vec![JsonIssue::from(&e)],
                    );
                    response.print()?;
                } else {
                    eprintln!("error: {}", e);
                }
                return Ok(e.exit_code());
            }
        };

        let records = apply_order(records, &self.order);
        self.order = records.iter().map(|r| r.id.clone()).collect();

        let records = filter_records(
            records,
            self.args.filter.as_deref().unwrap_or(""),
            self.args.status,
        );

        if self.json_output {
            let response = JsonResponse::ok(
                "list",
                ListData {
                    scan_dir,
                    github: self.options.github,
                    worktrees: records,
                },
            );
            response.print()?;
        } else if !self.quiet {
            print_table(&records, &scan_dir);
        }

        Ok(0)
    }
}

fn print_table(records: &[WorktreeRecord], scan_dir: &str) {
    if records.is_empty() {
        println!("No worktrees found in {}", scan_dir);
        return;
    }

    let id_width = records.iter().map(|r| r.id.len()).max().unwrap_or(0).max(2);
    let branch_width = records
        .iter()
        .map(|r| r.branch_name.len())
        .max()
        .unwrap_or(0)
        .max(6);

    println!(
        "{}",
        format!(
            "{:<8}  {:<id_width$}  {:<branch_width$}  {:<8}  {:<24}  {}",
            "STATUS", "ID", "BRANCH", "MODIFIED", "PR", "AGENT"
        )
        .style(COLORS.active)
    );

    let now = Utc::now();
    for record in records {
        let status = format!("{:<8}", record.status.as_str());
        println!(
            "{}  {:<id_width$}  {:<branch_width$}  {:<8}  {:<24}  {}",
            status.style(COLORS.status(record.status)),
            record.id,
            record.branch_name,
            relative_age(record.last_modified, now),
            pr_cell(record),
            agent_cell(record),
        );
    }

    println!();
    println!("{} worktree(s) in {}", records.len(), scan_dir);
}

/// `#42 draft, checks running` or `-`
fn pr_cell(record: &WorktreeRecord) -> String {
    let Some(pr) = &record.pr_status else {
        return "-".to_string();
    };

    let mut cell = format!("#{}", pr.number);
    if pr.is_draft {
        cell.push_str(" draft");
    }
    match pr.check_state() {
        Some(CheckState::Success) => cell.push_str(" ✓"),
        Some(CheckState::Failure) => cell.push_str(" ✗"),
        Some(CheckState::Pending) => cell.push_str(" …"),
        None => {}
    }
    cell
}

fn agent_cell(record: &WorktreeRecord) -> String {
    let origin = match record.origin_type {
        OriginType::Automated => "auto",
        OriginType::Manual => "",
    };
    let live = match record.live_status {
        LiveStatus::Active => format!("{}", "● active".style(COLORS.success)),
        LiveStatus::Idle => "idle".to_string(),
        LiveStatus::Unknown => String::new(),
    };
    format!("{} {}", origin, live).trim().to_string()
}

/// Compact age such as `5m`, `3h` or `12d`
fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    match secs {
        0..60 => "now".to_string(),
        60..3_600 => format!("{}m", secs / 60),
        3_600..86_400 => format!("{}h", secs / 3_600),
        _ => format!("{}d", secs / 86_400),
    }
}
