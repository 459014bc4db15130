use crate::config::BitbucketConfig;
use crate::error::{Result, TeamweekError};
use crate::model::{RemoteRepository, RepositoryPage};

pub fn repositories_url(bitbucket: &BitbucketConfig) -> String {
    format!(
        "{}/repositories/{}",
        bitbucket.api_base.trim_end_matches('/'),
        bitbucket.workspace
    )
}

/// Every repository of the configured workspace, following `next` links.
pub fn list_repositories(bitbucket: &BitbucketConfig) -> Result<Vec<RemoteRepository>> {
    bitbucket.require_workspace()?;
    let client = reqwest::blocking::Client::new();
    let mut url = Some(repositories_url(bitbucket));
    let mut repos = Vec::new();

    while let Some(current) = url.take() {
        log::debug!("GET {current}");
        let resp = client
            .get(&current)
            .basic_auth(&bitbucket.username, bitbucket.app_password.as_deref())
            .send()?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            return Err(TeamweekError::Api(format!(
                "repository listing failed ({status}): {}",
                body.trim()
            )));
        }

        let page: RepositoryPage = resp.json()?;
        repos.extend(page.values);
        url = page.next;
    }

    log::info!("Workspace {} has {} repositories", bitbucket.workspace, repos.len());
    Ok(repos)
}

pub fn contains_slug(repos: &[RemoteRepository], slug: &str) -> bool {
    repos
        .iter()
        .any(|r| r.slug.eq_ignore_ascii_case(slug) || r.name.eq_ignore_ascii_case(slug))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn url_joins_api_base_and_workspace() {
        let bitbucket = BitbucketConfig {
            workspace: "rudoapps".to_string(),
            api_base: "https://api.bitbucket.org/2.0/".to_string(),
            ..BitbucketConfig::default()
        };
        assert_eq!(
            repositories_url(&bitbucket),
            "https://api.bitbucket.org/2.0/repositories/rudoapps"
        );
    }

    #[test]
    fn page_parses_bitbucket_payload() {
        let body = r#"{
            "pagelen": 10,
            "values": [
                {"slug": "ios-app", "name": "iOS App", "full_name": "rudoapps/ios-app",
                 "is_private": true, "updated_on": "2026-10-12T09:15:00.123456+00:00",
                 "links": {"html": {"href": "https://bitbucket.org/rudoapps/ios-app"}}},
                {"slug": "web", "name": "web"}
            ],
            "next": "https://api.bitbucket.org/2.0/repositories/rudoapps?page=2"
        }"#;
        let page: RepositoryPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.values.len(), 2);
        assert!(page.values[0].is_private);
        assert!(page.values[0].updated_on.is_some());
        assert_eq!(page.values[1].full_name, "");
        assert!(page.next.is_some());

        assert!(contains_slug(&page.values, "ios-app"));
        assert!(contains_slug(&page.values, "IOS APP"));
        assert!(!contains_slug(&page.values, "android"));
    }

    #[test]
    fn listing_requires_workspace() {
        let err = list_repositories(&BitbucketConfig::default()).unwrap_err();
        assert!(matches!(err, TeamweekError::Config(_)));
    }
}
