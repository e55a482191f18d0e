//! # Issue Label Synchronization
//!
//! Keeps the issue labels of every organization repository in line with the
//! shared `labels.yml`:
//!
//! 1. list the organization's repositories with one paginated GraphQL query,
//! 2. drop archived repositories and those tagged with the `paper` topic,
//! 3. run `github-label-sync` for each remaining repository in turn.
//!
//! The loop has no retry and does not aggregate failures: a repository that
//! fails is logged and the loop moves on, leaving the details to the external
//! tool's own output.

use std::env;
use std::fs;
use std::path::Path;

use glob::Pattern;
use log::{info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::github;
use crate::tool::ToolRunner;

/// Environment variable holding the GitHub token for label sync.
pub const TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Topic marking repositories that accompany a paper and are left alone.
pub const EXCLUDED_TOPIC: &str = "paper";

/// One entry of the label specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Label {
    pub name: String,
    /// Six hex digits, without a leading `#`
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Former names that should be renamed to this label
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

/// Parse and validate a label specification.
pub fn parse_labels(content: &str) -> Result<Vec<Label>> {
    let labels: Vec<Label> = serde_yaml::from_str(content)?;
    validate_labels(&labels)?;
    Ok(labels)
}

/// Load and validate a label specification file.
pub fn load_labels(path: &Path) -> Result<Vec<Label>> {
    if !path.is_file() {
        return Err(Error::LabelSpec {
            message: format!("{} does not exist", path.display()),
        });
    }
    parse_labels(&fs::read_to_string(path)?)
}

fn validate_labels(labels: &[Label]) -> Result<()> {
    let color = Regex::new(r"^[0-9a-fA-F]{6}$")?;
    let mut seen = std::collections::HashSet::new();

    for label in labels {
        if label.name.trim().is_empty() {
            return Err(Error::LabelSpec {
                message: "label with an empty name".to_string(),
            });
        }
        if !seen.insert(label.name.to_lowercase()) {
            return Err(Error::LabelSpec {
                message: format!("duplicate label '{}'", label.name),
            });
        }
        if !color.is_match(&label.color) {
            return Err(Error::LabelSpec {
                message: format!(
                    "label '{}' has invalid color '{}' (expected six hex digits)",
                    label.name, label.color
                ),
            });
        }
    }
    Ok(())
}

/// Repository metadata returned by the organization query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgRepository {
    pub name_with_owner: String,
    pub is_archived: bool,
    pub topics: Vec<String>,
}

#[derive(Deserialize)]
struct Page {
    data: PageData,
}

#[derive(Deserialize)]
struct PageData {
    organization: Organization,
}

#[derive(Deserialize)]
struct Organization {
    repositories: Connection<RepoNode>,
}

#[derive(Deserialize)]
struct Connection<T> {
    nodes: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepoNode {
    name_with_owner: String,
    is_archived: bool,
    repository_topics: Connection<TopicNode>,
}

#[derive(Deserialize)]
struct TopicNode {
    topic: Topic,
}

#[derive(Deserialize)]
struct Topic {
    name: String,
}

/// Parse one or more concatenated GraphQL result pages.
pub fn parse_repository_pages(raw: &str) -> Result<Vec<OrgRepository>> {
    let mut repos = Vec::new();
    for page in serde_json::Deserializer::from_str(raw).into_iter::<Page>() {
        let page = page?;
        repos.extend(
            page.data
                .organization
                .repositories
                .nodes
                .into_iter()
                .map(|node| OrgRepository {
                    name_with_owner: node.name_with_owner,
                    is_archived: node.is_archived,
                    topics: node
                        .repository_topics
                        .nodes
                        .into_iter()
                        .map(|t| t.topic.name)
                        .collect(),
                }),
        );
    }
    Ok(repos)
}

/// Names of the repositories whose labels are managed.
///
/// `<org>/.github` always comes first since the query does not return it.
/// Archived repositories and those tagged [`EXCLUDED_TOPIC`] are dropped;
/// order is otherwise preserved and duplicates removed.
pub fn filter_repositories(org: &str, repos: &[OrgRepository]) -> Vec<String> {
    let mut names = vec![format!("{}/.github", org)];
    for repo in repos {
        if repo.is_archived || repo.topics.iter().any(|t| t == EXCLUDED_TOPIC) {
            continue;
        }
        if !names.contains(&repo.name_with_owner) {
            names.push(repo.name_with_owner.clone());
        }
    }
    names
}

/// Give every bare repository name in `names` the `org` owner.
pub fn qualify_names(org: &str, names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .map(|name| github::full_name(org, &name))
        .collect()
}

/// Narrow `names` to those matching a glob over `owner/name`.
pub fn apply_repo_filter(names: Vec<String>, filter: Option<&str>) -> Result<Vec<String>> {
    let Some(filter) = filter else {
        return Ok(names);
    };
    let pattern = Pattern::new(filter)?;
    Ok(names.into_iter().filter(|n| pattern.matches(n)).collect())
}

/// Write a repository list, one name per line.
pub fn write_repo_list(path: &Path, names: &[String]) -> Result<()> {
    let mut content = names.join("\n");
    content.push('\n');
    fs::write(path, content)?;
    Ok(())
}

/// Read the GitHub token, failing when it is unset or empty.
pub fn require_token() -> Result<String> {
    match env::var(TOKEN_VAR) {
        Ok(token) if !token.is_empty() => Ok(token),
        _ => Err(Error::MissingEnv {
            name: TOKEN_VAR.to_string(),
        }),
    }
}

/// Fetch the organization's repositories and return the managed ones.
pub fn list_managed_repositories(
    runner: &dyn ToolRunner,
    cwd: &Path,
    org: &str,
) -> Result<Vec<String>> {
    let raw = github::fetch_org_repositories(runner, cwd, org)?;
    let repos = parse_repository_pages(&raw)?;
    info!("Organization {} has {} repositories", org, repos.len());
    Ok(filter_repositories(org, &repos))
}

/// Run `github-label-sync` for each repository, one at a time.
///
/// Without `apply` every run is a dry run. Returns how many repositories the
/// tool was invoked for.
pub fn sync_labels(
    runner: &dyn ToolRunner,
    cwd: &Path,
    repos: &[String],
    labels: &Path,
    token: &str,
    apply: bool,
) -> usize {
    let mut attempted = 0;
    for repo in repos {
        println!("Syncing labels for {}", repo);
        attempted += 1;
        match github::run_label_sync(runner, cwd, repo, labels, token, !apply) {
            Ok(output) => {
                output.echo();
                if !output.success() {
                    warn!("github-label-sync exited with {} for {}", output.code, repo);
                }
            }
            Err(e) => warn!("{}: {}", repo, e),
        }
    }
    attempted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolOutput;
    use serial_test::serial;
    use std::cell::RefCell;
    use tempfile::TempDir;

    const PAGE_ONE: &str = r#"{"data":{"organization":{"repositories":{
        "pageInfo":{"hasNextPage":true,"endCursor":"abc"},
        "nodes":[
          {"nameWithOwner":"scritical/adflow","isArchived":false,
           "repositoryTopics":{"nodes":[{"topic":{"name":"cfd"}}]}},
          {"nameWithOwner":"scritical/old","isArchived":true,
           "repositoryTopics":{"nodes":[]}}
        ]}}}}"#;

    const PAGE_TWO: &str = r#"{"data":{"organization":{"repositories":{
        "pageInfo":{"hasNextPage":false,"endCursor":null},
        "nodes":[
          {"nameWithOwner":"scritical/paper-code","isArchived":false,
           "repositoryTopics":{"nodes":[{"topic":{"name":"paper"}}]}},
          {"nameWithOwner":"scritical/.github","isArchived":false,
           "repositoryTopics":{"nodes":[]}},
          {"nameWithOwner":"scritical/idwarp","isArchived":false,
           "repositoryTopics":{"nodes":[]}}
        ]}}}}"#;

    #[test]
    fn test_parse_labels() {
        let labels = parse_labels(
            "- name: bug\n  color: d73a4a\n  description: Something is broken\n\
             - name: enhancement\n  color: A2EEEF\n  aliases: [feature]\n",
        )
        .unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[1].aliases, vec!["feature"]);
        assert_eq!(labels[0].description.as_deref(), Some("Something is broken"));
    }

    #[test]
    fn test_parse_labels_rejects_bad_color() {
        let err = parse_labels("- name: bug\n  color: '#d73a4a'\n").unwrap_err();
        assert!(err.to_string().contains("invalid color"));
    }

    #[test]
    fn test_parse_labels_rejects_duplicates() {
        let err = parse_labels("- name: bug\n  color: d73a4a\n- name: Bug\n  color: d73a4a\n")
            .unwrap_err();
        assert!(err.to_string().contains("duplicate label"));
    }

    #[test]
    fn test_load_labels_missing_file() {
        let err = load_labels(Path::new("/nonexistent/labels.yml")).unwrap_err();
        assert!(matches!(err, Error::LabelSpec { .. }));
    }

    #[test]
    fn test_parse_concatenated_pages() {
        let raw = format!("{}\n{}", PAGE_ONE, PAGE_TWO);
        let repos = parse_repository_pages(&raw).unwrap();
        assert_eq!(repos.len(), 5);
        assert!(repos[1].is_archived);
        assert_eq!(repos[2].topics, vec!["paper"]);
    }

    #[test]
    fn test_filter_repositories() {
        let raw = format!("{}{}", PAGE_ONE, PAGE_TWO);
        let repos = parse_repository_pages(&raw).unwrap();
        let names = filter_repositories("scritical", &repos);
        assert_eq!(
            names,
            vec!["scritical/.github", "scritical/adflow", "scritical/idwarp"]
        );
    }

    #[test]
    fn test_apply_repo_filter() {
        let names = vec!["o/adflow".to_string(), "o/idwarp".to_string()];
        assert_eq!(
            apply_repo_filter(names.clone(), Some("o/ad*")).unwrap(),
            vec!["o/adflow"]
        );
        assert_eq!(apply_repo_filter(names.clone(), None).unwrap(), names);
        assert!(apply_repo_filter(names, Some("[")).is_err());
    }

    #[test]
    fn test_write_repo_list() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("repos.txt");
        write_repo_list(&path, &["o/a".to_string(), "o/b".to_string()]).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "o/a\no/b\n");
    }

    #[test]
    #[serial]
    fn test_require_token() {
        env::remove_var(TOKEN_VAR);
        assert!(matches!(require_token(), Err(Error::MissingEnv { .. })));
        env::set_var(TOKEN_VAR, "");
        assert!(require_token().is_err());
        env::set_var(TOKEN_VAR, "secret");
        assert_eq!(require_token().unwrap(), "secret");
        env::remove_var(TOKEN_VAR);
    }

    /// Label sync tool that fails for selected repositories.
    struct FlakyLabelSync {
        failing: &'static str,
        repos: RefCell<Vec<String>>,
    }

    impl ToolRunner for FlakyLabelSync {
        fn run_with_env(
            &self,
            _program: &str,
            args: &[String],
            _cwd: &Path,
            _env: &[(&str, &str)],
        ) -> Result<ToolOutput> {
            let repo = args.last().cloned().unwrap_or_default();
            self.repos.borrow_mut().push(repo.clone());
            if repo == self.failing {
                return Err(Error::ToolSpawn {
                    tool: "github-label-sync".to_string(),
                    message: "not found".to_string(),
                });
            }
            Ok(ToolOutput::default())
        }
    }

    #[test]
    fn test_qualify_names_keeps_explicit_owners() {
        let names = vec!["adflow".to_string(), "mdolab/pygeo".to_string()];
        assert_eq!(
            qualify_names("scritical", names),
            vec!["scritical/adflow", "mdolab/pygeo"]
        );
    }

    #[test]
    fn test_sync_continues_after_failure() {
        let runner = FlakyLabelSync {
            failing: "o/b",
            repos: RefCell::new(Vec::new()),
        };
        let repos = vec!["o/a".to_string(), "o/b".to_string(), "o/c".to_string()];

        let labels = Path::new("labels.yml");
        let attempted = sync_labels(&runner, Path::new("."), &repos, labels, "t", false);

        assert_eq!(attempted, 3);
        assert_eq!(*runner.repos.borrow(), repos);
    }
}
