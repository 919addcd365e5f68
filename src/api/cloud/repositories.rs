//
//  tf-collect
//  api/cloud/repositories.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Bitbucket Cloud repository payloads and the workspace repository listing.
//!
//! ```text
//! GET /2.0/repositories/{workspace}?pagelen=100
//! ```
//!
//! Each page carries a `next` URL until the last one. It is followed as given
//! as long as it stays on the API root's origin.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::api::client::BitbucketClient;
use crate::api::common::{ssh_href, ApiError, Link, PaginatedResponse, PAGE_SIZE};

/// A repository in Bitbucket Cloud.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    /// Display name, matched against `repo_pattern`.
    pub name: String,

    #[serde(default)]
    pub links: RepositoryLinks,
}

impl Repository {
    /// The `ssh` clone URL, e.g. `git@bitbucket.org:platform/vpc-terraform.git`.
    pub fn ssh_clone_url(&self) -> Option<&str> {
        ssh_href(&self.links.clone)
    }
}

/// Links block of a Cloud repository.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryLinks {
    /// Clone URLs (`https` and `ssh`).
    #[serde(default)]
    pub clone: Vec<Link>,
}

impl BitbucketClient {
    /// Lists every repository in a workspace by following `next` links.
    ///
    /// # Parameters
    ///
    /// * `workspace` - The workspace slug
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from a page request, including
    /// [`ApiError::ForeignLink`] for a `next` link on another origin.
    pub async fn list_workspace_repositories(
        &self,
        workspace: &str,
    ) -> Result<Vec<Repository>, ApiError> {
        let mut page: PaginatedResponse<Repository> = self
            .get(
                &["repositories", workspace],
                &[("pagelen", PAGE_SIZE.to_string())],
            )
            .await?;
        let mut repositories = Vec::new();

        loop {
            debug!(
                workspace,
                page = ?page.page,
                count = page.values.len(),
                "fetched repository page"
            );

            let next = page.next.take();
            repositories.extend(page.values);

            let Some(url) = next else {
                break;
            };

            let following: PaginatedResponse<Repository> = self.get_url(&url).await?;
            if following.next.as_deref() == Some(url.as_str()) {
                warn!(workspace, url, "next link points at itself, stopping");
                repositories.extend(following.values);
                break;
            }
            page = following;
        }

        Ok(repositories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_follows_next_links() {
        let mut server = mockito::Server::new_async().await;
        let next = format!("{}/2.0/repositories/platform?pagelen=100&page=2", server.url());

        let first = server
            .mock("GET", "/2.0/repositories/platform")
            .match_query(Matcher::UrlEncoded("pagelen".into(), "100".into()))
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"page": 1, "pagelen": 100, "next": "{next}", "values": [
                    {{"slug": "vpc-terraform", "name": "vpc-terraform", "links": {{"clone": [
                        {{"name": "https", "href": "https://bitbucket.org/platform/vpc-terraform.git"}},
                        {{"name": "ssh", "href": "git@bitbucket.org:platform/vpc-terraform.git"}}
                    ]}}}}
                ]}}"#
            ))
            .create_async()
            .await;
        let second = server
            .mock("GET", "/2.0/repositories/platform")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("pagelen".into(), "100".into()),
                Matcher::UrlEncoded("page".into(), "2".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(r#"{"page": 2, "pagelen": 100, "values": [{"slug": "docs", "name": "docs"}]}"#)
            .create_async()
            .await;

        let client = BitbucketClient::cloud(&format!("{}/2.0", server.url())).unwrap();
        let repos = client.list_workspace_repositories("platform").await.unwrap();

        assert_eq!(repos.len(), 2);
        assert_eq!(
            repos[0].ssh_clone_url(),
            Some("git@bitbucket.org:platform/vpc-terraform.git")
        );
        assert_eq!(repos[1].ssh_clone_url(), None);
        second.assert_async().await;
        first.assert_async().await;
    }

    #[tokio::test]
    async fn test_next_link_to_another_host_is_refused() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/2.0/repositories/platform")
            .match_query(Matcher::Any)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"page": 1, "next": "https://elsewhere.example.com/2.0/repositories/platform?page=2", "values": []}"#,
            )
            .create_async()
            .await;

        let client = BitbucketClient::cloud(&format!("{}/2.0", server.url())).unwrap();
        let err = client.list_workspace_repositories("platform").await.unwrap_err();
        assert!(matches!(err, ApiError::ForeignLink(ref url) if url.contains("elsewhere.example.com")));
    }

    #[tokio::test]
    async fn test_not_found_workspace() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/2.0/repositories/missing")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"type": "error", "error": {"message": "No workspace with identifier 'missing'."}}"#)
            .create_async()
            .await;

        let client = BitbucketClient::cloud(&format!("{}/2.0", server.url())).unwrap();
        let err = client.list_workspace_repositories("missing").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
