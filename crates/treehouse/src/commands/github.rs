//! Implementation of the `treehouse github` command

use owo_colors::OwoColorize;
use treehouse_core::{AuthState, Config, GhProbe, GitHub};

use crate::colors::COLORS;
use crate::output::{GithubData, JsonResponse};

fn auth_label(auth: AuthState) -> &'static str {
    match auth {
        AuthState::Authenticated => "authenticated",
        AuthState::NotAuthenticated => "not-authenticated",
        AuthState::Unknown => "unknown",
    }
}

fn github_data(probe: &GhProbe, enabled: bool) -> GithubData {
    GithubData {
        installed: probe.installed,
        version: probe.version.clone(),
        auth: auth_label(probe.auth).to_string(),
        available: enabled && probe.is_available(),
    }
}

/// Run the github command
pub async fn run_github(config: &Config, json_output: bool, quiet: bool) -> Result<i32, String> {
    let runner = super::runner(config);
    let probe = GitHub::new(&runner).probe().await;
    let data = github_data(&probe, config.github.enabled);

    if json_output {
        JsonResponse::ok("github", data).print()?;
        return Ok(0);
    }
    if quiet {
        return Ok(0);
    }

    match &probe.version {
        Some(version) => println!("{} gh installed: {}", "✓".style(COLORS.success), version),
        None => println!(
            "{} gh not found (install from https://cli.github.com)",
            "✗".style(COLORS.fail)
        ),
    }
    match probe.auth {
        AuthState::Authenticated => println!("{} authenticated", "✓".style(COLORS.success)),
        AuthState::NotAuthenticated => println!(
            "{} not authenticated (run `gh auth login`)",
            "✗".style(COLORS.fail)
        ),
        AuthState::Unknown => {}
    }

    let lookups = if data.available {
        "enabled".style(COLORS.success).to_string()
    } else if !config.github.enabled {
        "disabled in config".style(COLORS.muted).to_string()
    } else {
        "unavailable".style(COLORS.warning).to_string()
    };
    println!("PR lookups: {}", lookups);

    Ok(0)
}
