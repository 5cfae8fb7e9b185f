//! Implementation of the `treehouse delete` command

use owo_colors::OwoColorize;
use treehouse_core::delete::resolve_target;
use treehouse_core::git::Git;
use treehouse_core::{
    Config, DeleteReport, DeleteRequest, StepOutcome, TreehouseError, delete_worktree, expand_home,
};

use crate::colors::COLORS;
use crate::interaction;
use crate::output::{DeleteData, JsonIssue, JsonResponse, STEP_FAILED};

/// Arguments of `treehouse delete`
#[derive(Debug, Clone, Default)]
pub struct DeleteArgs {
    pub id: String,
    pub branch: Option<String>,
    pub delete_branch: bool,
    pub dir: Option<String>,
    pub yes: bool,
}

/// Run the delete command
pub async fn run_delete(
    args: DeleteArgs,
    config: &Config,
    json_output: bool,
    quiet: bool,
) -> Result<i32, String> {
    let scan_dir = args
        .dir
        .as_deref()
        .map(expand_home)
        .unwrap_or_else(|| config.scan.scan_dir());

    let target = match resolve_target(&args.id, &scan_dir) {
        Ok(target) if target.is_dir() => target,
        Ok(target) => {
            let err = TreehouseError::NotAWorktree {
                path: target.display().to_string(),
            };
            return report_error(&args.id, &err, json_output);
        }
        Err(e) => return report_error(&args.id, &e, json_output),
    };

    let runner = super::runner(config);

    let branch = match args.branch.clone() {
        Some(branch) => branch,
        None => Git::new(&runner, &target)
            .current_branch()
            .await
            .ok()
            .flatten()
            .unwrap_or_default(),
    };
    if args.delete_branch && branch.is_empty() && !quiet {
        eprintln!(
            "{}",
            "warning: could not determine the branch; it will be kept".style(COLORS.warning)
        );
    }

    if !args.yes && !json_output && interaction::is_interactive() {
        let branch_note = if args.delete_branch && !branch.is_empty() {
            format!(" and branch '{}'", branch)
        } else {
            String::new()
        };
        let prompt = format!(
            "Delete worktree {}{}? This cannot be undone",
            target.display(),
            branch_note
        );
        if !interaction::confirm(&prompt)? {
            if !quiet {
                println!("Cancelled");
            }
            return Ok(0);
        }
    }

    let request = DeleteRequest::new(args.id.clone(), scan_dir).with_branch(branch, args.delete_branch);
    let report = match delete_worktree(&runner, &request).await {
        Ok(report) => report,
        Err(e) => return report_error(&args.id, &e, json_output),
    };

    let code = if report.is_success() { 0 } else { 1 };

    if json_output {
        let issues = step_issues(&report);
        let response = JsonResponse::ok_with_issues(
            "delete",
            DeleteData {
                id: args.id.clone(),
                report: Some(report),
            },
            issues,
        );
        response.print()?;
    } else {
        print_report(&report, quiet);
    }

    Ok(code)
}

fn report_error(id: &str, err: &TreehouseError, json_output: bool) -> Result<i32, String> {
    if json_output {
        let response = JsonResponse::error(
            "delete",
            DeleteData {
                id: id.to_string(),
                report: None,
            },
            vec![JsonIssue::from(err)],
        );
        response.print()?;
    } else {
        eprintln!("error: {}", err);
    }
    Ok(err.exit_code())
}

/// One warning per failed step
fn step_issues(report: &DeleteReport) -> Vec<JsonIssue> {
    report
        .steps
        .iter()
        .filter_map(|s| match &s.outcome {
            StepOutcome::Failed(reason) => Some(
                JsonIssue::warning(STEP_FAILED, format!("{} failed: {}", s.step, reason))
                    .with_worktree(&report.id),
            ),
            _ => None,
        })
        .collect()
}

fn print_report(report: &DeleteReport, quiet: bool) {
    for step in &report.steps {
        match &step.outcome {
            StepOutcome::Failed(reason) => {
                eprintln!("{} {}: {}", "✗".style(COLORS.fail), step.step, reason);
            }
            _ if quiet => {}
            StepOutcome::Done => println!("{} {}", "✓".style(COLORS.success), step.step),
            StepOutcome::FellBack => println!(
                "{} {} (fallback)",
                "↺".style(COLORS.warning),
                step.step
            ),
            StepOutcome::Skipped => {
                println!("{}", format!("- {} (skipped)", step.step).style(COLORS.muted))
            }
        }
    }

    if report.is_success() {
        if !quiet {
            println!("Deleted {}", report.path.display());
        }
    } else {
        eprintln!(
            "{}",
            format!(
                "warning: {} was only partially cleaned up; nothing was rolled back",
                report.id
            )
            .style(COLORS.warning)
        );
    }
}
