use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

use gitdash::models::{FollowerEntry, Repository};
use gitdash::{DashboardService, Error, GitHubClient, QueryState, SessionContext};

fn repo_json(base: &str, owner: &str, name: &str, private: bool) -> serde_json::Value {
    json!({
        "id": 42,
        "name": name,
        "private": private,
        "html_url": format!("https://github.com/{owner}/{name}"),
        "stargazers_count": 0,
        "forks_count": 0,
        "watchers_count": 0,
        "description": "a test repository",
        "owner": { "login": owner },
        "commits_url": null,
        "languages_url": format!("{base}/repos/{owner}/{name}/languages"),
    })
}

fn service_for(server: &ServerGuard) -> DashboardService {
    let ctx = SessionContext::new("octocat", "test-token").unwrap();
    let client = GitHubClient::new(ctx.token(), server.url()).unwrap();
    DashboardService::new(client, ctx, 4)
}

fn prime_repositories(service: &DashboardService, repos: Vec<Repository>) {
    let generation = service.cache().repositories.begin();
    service
        .cache()
        .repositories
        .resolve(generation, QueryState::Ready(repos));
}

#[tokio::test]
async fn delete_is_refused_for_non_owner() {
    let mut server = Server::new_async().await;
    let base = server.url();

    server
        .mock("GET", "/user")
        .with_body(json!({ "login": "octocat" }).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/repos/octocat/widget")
        .with_body(repo_json(&base, "someone-else", "widget", false).to_string())
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/repos/octocat/widget")
        .expect(0)
        .create_async()
        .await;

    let service = service_for(&server);
    let err = service.delete_repository("widget").await.unwrap_err();

    assert!(matches!(err, Error::Authorization(_)));
    delete.assert_async().await;
}

#[tokio::test]
async fn delete_of_missing_repo_is_not_found() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/user")
        .with_body(json!({ "login": "octocat" }).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/repos/octocat/widget")
        .with_status(404)
        .with_body(json!({ "message": "Not Found" }).to_string())
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/repos/octocat/widget")
        .expect(0)
        .create_async()
        .await;

    let service = service_for(&server);
    let err = service.delete_repository("widget").await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    delete.assert_async().await;
}

#[tokio::test]
async fn successful_delete_refetches_list_once_and_leaves_siblings() {
    let mut server = Server::new_async().await;
    let base = server.url();

    server
        .mock("GET", "/user")
        .with_body(json!({ "login": "octocat" }).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/repos/octocat/widget")
        .with_body(repo_json(&base, "octocat", "widget", false).to_string())
        .create_async()
        .await;
    server
        .mock("DELETE", "/repos/octocat/widget")
        .with_status(204)
        .create_async()
        .await;
    let list = server
        .mock("GET", "/users/octocat/repos")
        .match_query(Matcher::Any)
        .with_body(json!([]).to_string())
        .expect(1)
        .create_async()
        .await;

    let service = service_for(&server);
    let generation = service.cache().followers.begin();
    service.cache().followers.resolve(
        generation,
        QueryState::Ready(vec![FollowerEntry {
            id: 7,
            login: "hubber".to_string(),
            avatar_url: "https://example.com/h.png".to_string(),
        }]),
    );

    service.delete_repository("widget").await.unwrap();

    list.assert_async().await;
    match service.cache().followers.get() {
        QueryState::Ready(followers) => assert_eq!(followers.len(), 1),
        state => panic!("followers cache was touched: {:?}", state),
    }
    assert!(matches!(
        service.cache().repositories.get(),
        QueryState::Ready(_)
    ));
}

#[tokio::test]
async fn delete_surfaces_upstream_error_payload() {
    let mut server = Server::new_async().await;
    let base = server.url();

    server
        .mock("GET", "/user")
        .with_body(json!({ "login": "octocat" }).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/repos/octocat/widget")
        .with_body(repo_json(&base, "octocat", "widget", false).to_string())
        .create_async()
        .await;
    server
        .mock("DELETE", "/repos/octocat/widget")
        .with_status(403)
        .with_body(json!({ "message": "Must have admin rights" }).to_string())
        .create_async()
        .await;
    let list = server
        .mock("GET", "/users/octocat/repos")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let service = service_for(&server);
    let err = service.delete_repository("widget").await.unwrap_err();

    assert!(matches!(err, Error::Upstream { status: 403, .. }));
    assert!(err.to_string().contains("Must have admin rights"));
    list.assert_async().await;
}

#[tokio::test]
async fn create_requires_name_and_description() {
    let mut server = Server::new_async().await;
    let any_request = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let service = service_for(&server);

    assert!(matches!(
        service.create_repository("", "desc", false).await,
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        service.create_repository("widget", "  ", false).await,
        Err(Error::InvalidInput(_))
    ));
    any_request.assert_async().await;
}

#[tokio::test]
async fn create_success_refetches_list_once() {
    let mut server = Server::new_async().await;
    let base = server.url();

    server
        .mock("POST", "/user/repos")
        .match_body(Matcher::PartialJson(json!({
            "name": "new-repo",
            "private": true,
        })))
        .with_status(201)
        .with_body(repo_json(&base, "octocat", "new-repo", true).to_string())
        .create_async()
        .await;
    let list = server
        .mock("GET", "/users/octocat/repos")
        .match_query(Matcher::Any)
        .with_body(json!([repo_json(&base, "octocat", "new-repo", true)]).to_string())
        .expect(1)
        .create_async()
        .await;

    let service = service_for(&server);
    let created = service
        .create_repository("new-repo", "my new project", true)
        .await
        .unwrap();

    assert_eq!(created.name, "new-repo");
    assert!(created.private);
    list.assert_async().await;
    match service.cache().repositories.get() {
        QueryState::Ready(repos) => assert_eq!(repos.len(), 1),
        state => panic!("repository list was not refreshed: {:?}", state),
    }
}

#[tokio::test]
async fn create_failure_leaves_state_untouched() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/user/repos")
        .with_status(422)
        .with_body(json!({ "message": "name already exists on this account" }).to_string())
        .create_async()
        .await;
    let list = server
        .mock("GET", "/users/octocat/repos")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let service = service_for(&server);
    let err = service
        .create_repository("widget", "duplicate", false)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Upstream { status: 422, .. }));
    list.assert_async().await;
}

#[tokio::test]
async fn visibility_toggle_flips_cached_flag_without_refetch() {
    let mut server = Server::new_async().await;
    let base = server.url();

    server
        .mock("PATCH", "/repos/octocat/widget")
        .match_body(Matcher::PartialJson(json!({ "private": true })))
        .with_body(repo_json(&base, "octocat", "widget", true).to_string())
        .create_async()
        .await;
    let list = server
        .mock("GET", "/users/octocat/repos")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let service = service_for(&server);
    let widget: Repository =
        serde_json::from_value(repo_json(&base, "octocat", "widget", false)).unwrap();
    prime_repositories(&service, vec![widget]);

    let updated = service
        .set_repository_visibility("widget", true)
        .await
        .unwrap();

    assert!(updated.private);
    match service.cache().repositories.get() {
        QueryState::Ready(repos) => assert!(repos[0].private),
        state => panic!("repository cache lost: {:?}", state),
    }
    list.assert_async().await;
}

#[tokio::test]
async fn visibility_toggle_failure_leaves_flag_unchanged() {
    let mut server = Server::new_async().await;
    let base = server.url();

    server
        .mock("PATCH", "/repos/octocat/widget")
        .with_status(403)
        .with_body(json!({ "message": "Forbidden" }).to_string())
        .create_async()
        .await;

    let service = service_for(&server);
    let widget: Repository =
        serde_json::from_value(repo_json(&base, "octocat", "widget", false)).unwrap();
    prime_repositories(&service, vec![widget]);

    let err = service
        .set_repository_visibility("widget", true)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Upstream { status: 403, .. }));
    match service.cache().repositories.get() {
        QueryState::Ready(repos) => assert!(!repos[0].private),
        state => panic!("repository cache lost: {:?}", state),
    }
}
