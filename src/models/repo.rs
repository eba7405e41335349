use serde::{Deserialize, Serialize};

pub const UNAVAILABLE: &str = "Unavailable";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub private: bool,
    pub html_url: String,
    pub stargazers_count: u32,
    pub forks_count: u32,
    #[serde(default)]
    pub watchers_count: u32,
    pub description: Option<String>,
    pub owner: RepositoryOwner,
    #[serde(default)]
    pub commits_url: Option<String>,
    pub languages_url: String,

    // Derived fields, absent in the raw list response.
    #[serde(default = "unavailable")]
    pub last_commit: String,
    #[serde(default = "unavailable")]
    pub commit_message: String,
    #[serde(default)]
    pub languages: Vec<LanguageShare>,
}

fn unavailable() -> String {
    UNAVAILABLE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageShare {
    pub language: String,
    pub percentage: f64,
}

impl Repository {
    // commits_url arrives as a URI template ending in "{/sha}"; strip the
    // template suffix before fetching.
    pub fn commit_history_url(&self) -> Option<String> {
        self.commits_url.as_ref().map(|url| url.replace("{/sha}", ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_stub_decodes_with_sentinels() {
        let stub: Repository = serde_json::from_value(json!({
            "id": 1,
            "name": "widget",
            "private": false,
            "html_url": "https://github.com/octocat/widget",
            "stargazers_count": 3,
            "forks_count": 1,
            "watchers_count": 2,
            "description": null,
            "owner": { "login": "octocat" },
            "commits_url": "https://api.github.com/repos/octocat/widget/commits{/sha}",
            "languages_url": "https://api.github.com/repos/octocat/widget/languages"
        }))
        .unwrap();

        assert_eq!(stub.last_commit, UNAVAILABLE);
        assert_eq!(stub.commit_message, UNAVAILABLE);
        assert!(stub.languages.is_empty());
        assert_eq!(
            stub.commit_history_url().unwrap(),
            "https://api.github.com/repos/octocat/widget/commits"
        );
    }
}
