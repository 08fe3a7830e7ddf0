//! Repository tree builder.
//!
//! Walks the contents API one directory at a time and mirrors the remote
//! layout as nested maps: directories map to subtrees, files map to their
//! repository-relative path. File contents are never downloaded here.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::client::{contents_route, sanitize_github_name, GithubClient};
use crate::error::ToolError;

/// One directory level, keyed by child name in listing order.
pub type DirectoryTree = IndexMap<String, TreeEntry>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TreeEntry {
    Directory(DirectoryTree),
    File(String),
}

/// Entry of a contents API listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ContentEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == "dir"
    }
}

/// The contents API answers with an array for directories and a single
/// object when the path names a file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Listing(Vec<ContentEntry>),
    Single(ContentEntry),
}

impl From<ContentsResponse> for Vec<ContentEntry> {
    fn from(response: ContentsResponse) -> Self {
        match response {
            ContentsResponse::Listing(entries) => entries,
            ContentsResponse::Single(entry) => vec![entry],
        }
    }
}

impl GithubClient {
    /// List the entries directly under `path`.
    pub async fn list_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Vec<ContentEntry>, ToolError> {
        let response: ContentsResponse = self
            .get_json(&contents_route(owner, repo, path))
            .await?;
        Ok(response.into())
    }

    /// Build the full tree below `path` (empty for the repository root).
    ///
    /// Directories are expanded depth-first from an explicit stack, one
    /// listing request at a time. Any failed listing aborts the whole build.
    pub async fn build_tree(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<DirectoryTree, ToolError> {
        sanitize_github_name(owner, "owner")?;
        sanitize_github_name(repo, "repo")?;
        if path.contains(['?', '#', '\0', '\n', '\r']) {
            return Err(ToolError::Validation(
                "path contains invalid character".to_string(),
            ));
        }

        let mut root = DirectoryTree::new();
        // (remote path, names leading from the root to the directory)
        let mut pending: Vec<(String, Vec<String>)> = vec![(path.to_string(), Vec::new())];
        let mut listings = 0usize;

        while let Some((dir_path, location)) = pending.pop() {
            let entries = self.list_contents(owner, repo, &dir_path).await?;
            listings += 1;
            tracing::debug!(owner, repo, path = %dir_path, entries = entries.len(), "Listed directory");

            let node = subtree_mut(&mut root, &location)?;
            for entry in entries {
                if entry.is_dir() {
                    node.insert(entry.name.clone(), TreeEntry::Directory(DirectoryTree::new()));
                    let mut child = location.clone();
                    child.push(entry.name);
                    pending.push((entry.path, child));
                } else {
                    node.insert(entry.name, TreeEntry::File(entry.path));
                }
            }
        }

        tracing::info!(owner, repo, path, listings, "Built repository tree");
        Ok(root)
    }
}

fn subtree_mut<'a>(
    root: &'a mut DirectoryTree,
    location: &[String],
) -> Result<&'a mut DirectoryTree, ToolError> {
    let mut node = root;
    for name in location {
        node = match node.get_mut(name) {
            Some(TreeEntry::Directory(child)) => child,
            _ => {
                return Err(ToolError::Unavailable(format!(
                    "directory '{}' changed while listing",
                    name
                )))
            }
        };
    }
    Ok(node)
}

/// Depth of nested directories below the root (0 for a flat tree).
pub fn tree_depth(tree: &DirectoryTree) -> usize {
    tree.values()
        .map(|entry| match entry {
            TreeEntry::Directory(child) => 1 + tree_depth(child),
            TreeEntry::File(_) => 0,
        })
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{client_for, github_error};
    use httpmock::prelude::*;

    fn file(name: &str, path: &str) -> serde_json::Value {
        serde_json::json!({"name": name, "path": path, "type": "file", "sha": "abc", "size": 1})
    }

    fn dir(name: &str, path: &str) -> serde_json::Value {
        serde_json::json!({"name": name, "path": path, "type": "dir", "sha": "def", "size": 0})
    }

    #[test]
    fn test_tree_depth() {
        let mut inner = DirectoryTree::new();
        inner.insert("a.rs".into(), TreeEntry::File("src/a.rs".into()));
        let mut tree = DirectoryTree::new();
        tree.insert("src".into(), TreeEntry::Directory(inner));
        tree.insert("README.md".into(), TreeEntry::File("README.md".into()));
        assert_eq!(tree_depth(&tree), 1);
        assert_eq!(tree_depth(&DirectoryTree::new()), 0);
    }

    #[test]
    fn test_tree_serializes_as_nested_map() {
        let mut inner = DirectoryTree::new();
        inner.insert("lib.rs".into(), TreeEntry::File("src/lib.rs".into()));
        let mut tree = DirectoryTree::new();
        tree.insert("src".into(), TreeEntry::Directory(inner));
        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            serde_json::json!({"src": {"lib.rs": "src/lib.rs"}})
        );
    }

    #[test]
    fn test_contents_response_single_file() {
        let response: ContentsResponse =
            serde_json::from_value(file("README.md", "README.md")).unwrap();
        let entries: Vec<ContentEntry> = response.into();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_dir());
    }

    #[tokio::test]
    async fn test_flat_directory() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/flat/contents/docs");
            then.status(200).json_body(serde_json::json!([
                file("intro.md", "docs/intro.md"),
                file("usage.md", "docs/usage.md"),
            ]));
        });

        let client = client_for(&server.base_url());
        let tree = client.build_tree("octo", "flat", "docs").await.unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree["intro.md"], TreeEntry::File("docs/intro.md".into()));
        assert_eq!(tree["usage.md"], TreeEntry::File("docs/usage.md".into()));
        assert_eq!(tree_depth(&tree), 0);
    }

    #[tokio::test]
    async fn test_children_keep_listing_order() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/r/contents");
            then.status(200).json_body(serde_json::json!([
                file("zeta.md", "zeta.md"),
                dir("lib", "lib"),
                file("alpha.md", "alpha.md"),
            ]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/r/contents/lib");
            then.status(200).json_body(serde_json::json!([
                file("b.rs", "lib/b.rs"),
                file("a.rs", "lib/a.rs"),
            ]));
        });

        let client = client_for(&server.base_url());
        let tree = client.build_tree("octo", "r", "").await.unwrap();

        let top: Vec<&str> = tree.keys().map(String::as_str).collect();
        assert_eq!(top, vec!["zeta.md", "lib", "alpha.md"]);
        match &tree["lib"] {
            TreeEntry::Directory(lib) => {
                let names: Vec<&str> = lib.keys().map(String::as_str).collect();
                assert_eq!(names, vec!["b.rs", "a.rs"]);
            }
            other => panic!("expected directory, got {:?}", other),
        }
        assert!(serde_json::to_string(&tree)
            .unwrap()
            .starts_with(r#"{"zeta.md":"zeta.md","lib":{"b.rs""#));
    }

    #[tokio::test]
    async fn test_nested_directories_from_root() {
        let server = MockServer::start();
        let root = server.mock(|when, then| {
            when.method(GET).path("/repos/octo/nested/contents");
            then.status(200).json_body(serde_json::json!([
                file("Cargo.toml", "Cargo.toml"),
                dir("src", "src"),
            ]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/nested/contents/src");
            then.status(200).json_body(serde_json::json!([
                file("lib.rs", "src/lib.rs"),
                dir("bin", "src/bin"),
            ]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/nested/contents/src/bin");
            then.status(200)
                .json_body(serde_json::json!([file("cli.rs", "src/bin/cli.rs")]));
        });

        let client = client_for(&server.base_url());
        let tree = client.build_tree("octo", "nested", "").await.unwrap();

        root.assert_hits(1);
        assert_eq!(tree_depth(&tree), 2);
        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            serde_json::json!({
                "Cargo.toml": "Cargo.toml",
                "src": {
                    "lib.rs": "src/lib.rs",
                    "bin": {"cli.rs": "src/bin/cli.rs"}
                }
            })
        );
    }

    #[tokio::test]
    async fn test_empty_directory_is_empty_map() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/r/contents");
            then.status(200).json_body(serde_json::json!([dir("empty", "empty")]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/r/contents/empty");
            then.status(200).json_body(serde_json::json!([]));
        });

        let client = client_for(&server.base_url());
        let tree = client.build_tree("octo", "r", "").await.unwrap();
        assert_eq!(tree["empty"], TreeEntry::Directory(DirectoryTree::new()));
    }

    #[tokio::test]
    async fn test_non_directory_types_are_leaves() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/r/contents");
            then.status(200).json_body(serde_json::json!([
                {"name": "vendor", "path": "vendor", "type": "submodule"},
                {"name": "latest", "path": "latest", "type": "symlink"},
            ]));
        });

        let client = client_for(&server.base_url());
        let tree = client.build_tree("octo", "r", "").await.unwrap();
        assert_eq!(tree["vendor"], TreeEntry::File("vendor".into()));
        assert_eq!(tree["latest"], TreeEntry::File("latest".into()));
    }

    #[tokio::test]
    async fn test_unknown_repo_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/missing/contents");
            then.status(404).json_body(github_error("Not Found"));
        });

        let client = client_for(&server.base_url());
        let result = client.build_tree("octo", "missing", "").await;
        assert!(matches!(result, Err(ToolError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_failure_in_subdirectory_propagates() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/r/contents");
            then.status(200).json_body(serde_json::json!([dir("private", "private")]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/r/contents/private");
            then.status(403).json_body(github_error("Resource not accessible"));
        });

        let client = client_for(&server.base_url());
        let result = client.build_tree("octo", "r", "").await;
        assert!(matches!(result, Err(ToolError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_invalid_owner_rejected_without_request() {
        let server = MockServer::start();
        let any = server.mock(|when, then| {
            when.method(GET);
            then.status(200).json_body(serde_json::json!([]));
        });

        let client = client_for(&server.base_url());
        let result = client.build_tree("bad/owner", "r", "").await;
        assert!(matches!(result, Err(ToolError::Validation(_))));
        any.assert_hits(0);
    }
}
