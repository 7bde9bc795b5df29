use super::*;
use wiremock::matchers::{body_string_contains, header, headers, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Sign-in page fixture with a hidden authenticity token
const SIGN_IN_PAGE: &str = r#"<html><body>
<form action="/users/sign_in" method="post">
  <input type="hidden" name="authenticity_token" value="form-token-123" />
</form>
</body></html>"#;

fn client_for(server: &MockServer) -> KataClient {
    let config = Config {
        base_url: server.uri(),
        ..Default::default()
    };
    KataClient::new(&config).unwrap()
}

// -------------------------------------------------------------------------
// login
// -------------------------------------------------------------------------

#[tokio::test]
async fn login_stores_cookie_csrf_and_authorization() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/sign_in"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SIGN_IN_PAGE))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/users/sign_in"))
        .and(body_string_contains("authenticity_token=form-token-123"))
        .and(body_string_contains("user%5Bemail%5D=user%40example.com"))
        .and(body_string_contains("user%5Bpassword%5D=hunter2"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", "_session_id=s1d2; path=/; HttpOnly")
                .append_header("set-cookie", "CSRF-TOKEN=csrf%3D%3D; path=/")
                .append_header("set-cookie", "authorization=Bearer%20usertok; path=/"),
        )
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    assert!(client.login("user@example.com", "hunter2").await);

    let session = client.session();
    assert_eq!(
        session.cookie(),
        Some("_session_id=s1d2; CSRF-TOKEN=csrf%3D%3D; authorization=Bearer%20usertok")
    );
    // Cookie keys are matched case-insensitively and values percent-decoded
    assert_eq!(session.csrf_token(), Some("csrf=="));
    assert_eq!(session.bearer_token(), Some("Bearer usertok"));
}

#[tokio::test]
async fn login_without_authenticity_token_fails_before_posting() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/sign_in"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>no form here</html>"))
        .mount(&server)
        .await;

    // The credential POST must never be issued without the token
    Mock::given(method("POST"))
        .and(path("/users/sign_in"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    assert!(!client.login("user@example.com", "hunter2").await);
    assert_eq!(client.session().cookie(), None);
}

#[tokio::test]
async fn login_rejected_credentials_returns_false() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/sign_in"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SIGN_IN_PAGE))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/users/sign_in"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    assert!(!client.login("user@example.com", "wrong").await);
    assert_eq!(client.session().csrf_token(), None);
}

#[tokio::test]
async fn login_succeeds_with_partial_cookies() {
    // Only a session cookie comes back — csrf/authorization stay unset
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/sign_in"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SIGN_IN_PAGE))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/users/sign_in"))
        .respond_with(
            ResponseTemplate::new(200).append_header("set-cookie", "_session_id=only; path=/"),
        )
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    assert!(client.login("user@example.com", "hunter2").await);
    assert_eq!(client.session().cookie(), Some("_session_id=only"));
    assert_eq!(client.session().csrf_token(), None);
    assert_eq!(client.session().bearer_token(), None);
}

// -------------------------------------------------------------------------
// search_candidate_ids
// -------------------------------------------------------------------------

#[tokio::test]
async fn search_collects_result_ids_in_document_order() {
    let server = MockServer::start().await;

    let results = r#"<html><body>
      <div class="list-item-kata" id="k1"><a href="/kata/k1">One</a></div>
      <div class="list-item-kata" id="k2"><a href="/kata/k2">Two</a></div>
      <div class="list-item-kata" id="k3"><a href="/kata/k3">Three</a></div>
      <div class="list-item-kata">no id, skipped</div>
    </body></html>"#;

    Mock::given(method("GET"))
        .and(path("/kata/search/javascript"))
        .and(query_param("xids", "completed"))
        .and(query_param("beta", "false"))
        .and(query_param("order_by", "sort_date desc"))
        .and(query_param("sample", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let ids = client.search_candidate_ids("javascript").await;

    assert_eq!(ids, vec!["k1", "k2", "k3"]);
}

#[tokio::test]
async fn search_failure_yields_empty_not_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/kata/search/python"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.search_candidate_ids("python").await.is_empty());
}

#[tokio::test]
async fn search_on_unparseable_body_yields_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/kata/search/python"))
        .respond_with(ResponseTemplate::new(200).set_body_string("no result items at all"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.search_candidate_ids("python").await.is_empty());
}

// -------------------------------------------------------------------------
// fetch_metadata
// -------------------------------------------------------------------------

#[tokio::test]
async fn fetch_metadata_deserializes_exercise() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/code-challenges/kata42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "kata42",
            "name": "Sum Pairs",
            "url": "https://example.com/kata/kata42",
            "description": "Find pairs that sum.",
            "rank": { "id": -6, "name": "6 kyu", "color": "yellow" },
            "tags": ["Algorithms"]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let exercise = client.fetch_metadata("kata42").await.unwrap();

    assert_eq!(exercise.id, "kata42");
    assert_eq!(exercise.name, "Sum Pairs");
    assert_eq!(exercise.description, "Find pairs that sum.");
    assert_eq!(exercise.rank.unwrap().name.as_deref(), Some("6 kyu"));
}

#[tokio::test]
async fn fetch_metadata_failure_returns_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/code-challenges/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.fetch_metadata("missing").await.is_none());
}

// -------------------------------------------------------------------------
// fetch_project_link
// -------------------------------------------------------------------------

#[tokio::test]
async fn fetch_project_link_extracts_both_values() {
    let server = MockServer::start().await;

    let page = r#"<html><body>
      <a href="/kata/projects/abc123/javascript/session">start</a>
      <script>App.boot(JSON.parse("{\"jwt\":\"tkn\"}"));</script>
    </body></html>"#;

    Mock::given(method("GET"))
        .and(path("/kata/kata42/train/javascript"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let link = client.fetch_project_link("kata42", "javascript").await;

    assert_eq!(link.project_id.as_deref(), Some("abc123"));
    assert_eq!(link.session_user.unwrap().jwt.as_deref(), Some("tkn"));
}

#[tokio::test]
async fn fetch_project_link_partial_success_is_representable() {
    let server = MockServer::start().await;

    // Project id present, embedded session payload missing
    let page = r#"<a href="/kata/projects/deadbeef/python/session">start</a>"#;

    Mock::given(method("GET"))
        .and(path("/kata/kata42/train/python"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let link = client.fetch_project_link("kata42", "python").await;

    assert_eq!(link.project_id.as_deref(), Some("deadbeef"));
    assert!(link.session_user.is_none());
}

#[tokio::test]
async fn fetch_project_link_page_failure_leaves_both_absent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/kata/kata42/train/python"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let link = client.fetch_project_link("kata42", "python").await;

    assert!(link.project_id.is_none());
    assert!(link.session_user.is_none());
}

// -------------------------------------------------------------------------
// fetch_solution_payload
// -------------------------------------------------------------------------

#[tokio::test]
async fn fetch_solution_payload_sends_session_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/kata/projects/abc123/javascript/session"))
        // Comma-separated header values arrive as a multi-valued header
        .and(headers("accept", vec!["application/json", "text/plain", "*/*"]))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .and(header("authorization", "tkn"))
        .and(header("cookie", "_session_id=s1d2"))
        .and(header("x-csrf-token", "csrf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "setup": "function sumPairs(a){}",
            "exampleFixture": "describe(\"sumPairs\", ...)"
        })))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.set_cookies("_session_id=s1d2");
    client.set_csrf_token("csrf");
    client.set_bearer_token("tkn");

    let payload = client
        .fetch_solution_payload("abc123", "javascript")
        .await
        .unwrap();

    assert_eq!(payload.setup, "function sumPairs(a){}");
    assert_eq!(payload.example_fixture, "describe(\"sumPairs\", ...)");
}

#[tokio::test]
async fn fetch_solution_payload_failure_returns_none() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/kata/projects/abc123/javascript/session"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(
        client
            .fetch_solution_payload("abc123", "javascript")
            .await
            .is_none()
    );
}
