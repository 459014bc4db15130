use crate::cli::CommonArgs;
use crate::config::Config;
use crate::model::RemoteRepository;
use crate::remote::list_repositories;
use anyhow::Context;
use console::style;

pub fn exec(common: CommonArgs, json: bool) -> anyhow::Result<()> {
    let config = Config::load(common.config.as_deref()).context("Failed to load configuration")?;
    let mut repos = list_repositories(&config.bitbucket).context("Failed to list workspace repositories")?;
    repos.sort_by(|a, b| a.slug.cmp(&b.slug));

    if json {
        println!("{}", serde_json::to_string_pretty(&repos)?);
    } else {
        output_table(&repos);
    }
    Ok(())
}

fn output_table(repos: &[RemoteRepository]) {
    println!(
        "{:<40} {:<8} {:<20}",
        style("Slug").bold(),
        style("Private").bold(),
        style("Updated").bold()
    );
    println!("{}", "─".repeat(70));
    for r in repos {
        println!(
            "{:<40} {:<8} {:<20}",
            r.slug,
            if r.is_private { "yes" } else { "no" },
            r.updated_on
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default()
        );
    }
}
