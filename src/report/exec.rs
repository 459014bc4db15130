use super::{build_report, output_console, output_json, write_csv_file};
use crate::classify::Classifier;
use crate::cli::{CommonArgs, ReportArgs};
use crate::config::Config;
use crate::git::{clone_or_pull, clone_url, local_path, GitRepo};
use crate::remote::{contains_slug, list_repositories};
use crate::util::WeekWindow;
use anyhow::{bail, Context};
use std::io::{BufRead, Write};
use std::path::PathBuf;

pub fn exec(common: CommonArgs, args: ReportArgs) -> anyhow::Result<()> {
    let config = Config::load(common.config.as_deref()).context("Failed to load configuration")?;
    let window = WeekWindow::current();

    let repo_path = match args.path {
        Some(path) => path,
        None => {
            let name = match args.repo {
                Some(name) => name,
                None => {
                    let stdin = std::io::stdin();
                    prompt_repo_name(&mut stdin.lock(), &mut std::io::stdout())?
                }
            };
            sync_repository(&config, &common, &name, args.skip_listing)?
        }
    };

    let repo = GitRepo::open(Some(&repo_path)).context("Failed to open git repository")?;
    let commits = repo
        .collect_commits(&window.range())
        .context("Failed to collect commits from repository")?;

    let classifier = Classifier::new(config.analysis.merge_detection.rule());
    let ledger = classifier.classify(&commits, &window);
    let report = build_report(&ledger, &config.wages, &window).context("Failed to build weekly report")?;

    let output = args.output.unwrap_or_else(|| config.storage.output.clone());
    write_csv_file(&report, &output).with_context(|| format!("Failed to write {}", output.display()))?;

    if args.json {
        output_json(&report)?;
    } else {
        output_console(&report)?;
    }
    Ok(())
}

/// Ask for the repository name on `input`, echoing it back like the prompt did historically.
pub fn prompt_repo_name<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> anyhow::Result<String> {
    write!(out, "Enter your git repo: ")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read repository name")?;
    let name = line.trim().to_string();
    if name.is_empty() {
        bail!("No repository name given");
    }
    writeln!(out, "{name}")?;
    Ok(name)
}

fn sync_repository(config: &Config, common: &CommonArgs, name: &str, skip_listing: bool) -> anyhow::Result<PathBuf> {
    let bitbucket = &config.bitbucket;
    let workspace = bitbucket.require_workspace()?;

    if !skip_listing {
        let repos = list_repositories(bitbucket).context("Failed to list workspace repositories")?;
        if !contains_slug(&repos, name) {
            log::warn!("'{name}' is not among the {} repositories of {workspace}", repos.len());
        }
    }

    let repos_dir = common.repos_dir.clone().unwrap_or_else(|| config.storage.repos_dir.clone());
    let dest = local_path(&repos_dir, workspace, name);
    let url = clone_url(bitbucket, name)?;
    clone_or_pull(&url, &dest)
        .with_context(|| format!("Failed to sync {workspace}/{name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn prompt_reads_and_echoes_name() {
        let mut input = "ios-app\n".as_bytes();
        let mut out = Vec::new();
        let name = prompt_repo_name(&mut input, &mut out).unwrap();
        assert_eq!(name, "ios-app");
        assert_eq!(String::from_utf8(out).unwrap(), "Enter your git repo: ios-app\n");
    }

    #[test]
    fn prompt_rejects_empty_input() {
        let mut input = "\n".as_bytes();
        let mut out = Vec::new();
        assert!(prompt_repo_name(&mut input, &mut out).is_err());
    }
}
