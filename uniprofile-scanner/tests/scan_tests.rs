// End-to-end scans against local mock servers

use std::sync::Arc;
use std::time::Duration;
use uniprofile_scanner::probe::{
    ApiProbe, DEFAULT_USER_AGENT, GenericProbe, ProbeTable, build_client,
};
use uniprofile_scanner::{
    ScanError, ScanResult, Scanner, ScannerConfig, SiteDescriptor, SiteRegistry, StrategyId,
    Verdict,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{any, method, path},
};

fn fast_config() -> ScannerConfig {
    ScannerConfig {
        concurrency: 4,
        timeout: Duration::from_millis(300),
        delay: Duration::ZERO,
        ..ScannerConfig::default()
    }
}

fn site(name: &str, server: &MockServer, prefix: &str, reliable: bool) -> SiteDescriptor {
    SiteDescriptor::new(name, &format!("{}/{}/{{}}", server.uri(), prefix), reliable)
}

async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

fn verdicts(results: &[ScanResult]) -> Vec<Verdict> {
    results.iter().map(|r| r.verdict).collect()
}

#[tokio::test]
async fn test_github_api_confirms_existing_user() {
    let server = MockServer::start().await;
    mount_status(&server, "/users/octocat", 200).await;

    let registry = SiteRegistry::new(vec![
        SiteDescriptor::new("GitHub", "https://github.com/{}", true)
            .with_strategy(StrategyId::GithubApi),
    ])
    .unwrap();

    let client = build_client(DEFAULT_USER_AGENT, Duration::from_millis(300)).unwrap();
    let probes = ProbeTable::new(Arc::new(GenericProbe::new(client.clone()))).with_strategy(
        StrategyId::GithubApi,
        Arc::new(ApiProbe::new(client, format!("{}/users/{{}}", server.uri()))),
    );

    let scanner = Scanner::with_config(registry, fast_config())
        .unwrap()
        .with_probe_table(probes);
    let results = scanner.scan("octocat").await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].verdict, Verdict::Confirmed);
    assert_eq!(results[0].status_code(), 200);
    // Display URL stays the profile page, not the API endpoint
    assert_eq!(results[0].url, "https://github.com/octocat");
}

#[tokio::test]
async fn test_missing_user_is_not_found() {
    let server = MockServer::start().await;
    mount_status(&server, "/gh/doesnotexist404xyz", 404).await;

    let registry = SiteRegistry::new(vec![site("GitHub", &server, "gh", true)]).unwrap();
    let scanner = Scanner::with_config(registry, fast_config()).unwrap();

    let results = scanner.scan("doesnotexist404xyz").await.unwrap();
    assert_eq!(verdicts(&results), vec![Verdict::NotFound]);
}

#[tokio::test]
async fn test_unreliable_site_success_is_ambiguous() {
    let server = MockServer::start().await;
    mount_status(&server, "/ig/octocat", 200).await;

    let registry = SiteRegistry::new(vec![site("Instagram", &server, "ig", false)]).unwrap();
    let scanner = Scanner::with_config(registry, fast_config()).unwrap();

    let results = scanner.scan("octocat").await.unwrap();
    assert_eq!(verdicts(&results), vec![Verdict::Ambiguous]);
    assert!(results[0].is_found());
}

#[tokio::test]
async fn test_timeout_is_isolated_to_one_site() {
    let server = MockServer::start().await;
    mount_status(&server, "/a/octocat", 200).await;
    Mock::given(any())
        .and(path("/slow/octocat"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    mount_status(&server, "/c/octocat", 404).await;
    mount_status(&server, "/d/octocat", 429).await;

    let registry = SiteRegistry::new(vec![
        site("A", &server, "a", true),
        site("Slow", &server, "slow", true),
        site("C", &server, "c", true),
        site("D", &server, "d", true),
    ])
    .unwrap();
    let scanner = Scanner::with_config(registry, fast_config()).unwrap();

    let results = scanner.scan("octocat").await.unwrap();

    assert_eq!(results.len(), 4);
    assert_eq!(
        verdicts(&results),
        vec![
            Verdict::Confirmed,
            Verdict::TransportError,
            Verdict::NotFound,
            Verdict::Blocked
        ]
    );
    assert_eq!(results[1].status_code(), 0);
    assert!(results[1].outcome.transport_error);
}

#[tokio::test]
async fn test_output_order_independent_of_completion_order() {
    let server = MockServer::start().await;
    for (route, delay_ms) in [("/a/octocat", 200), ("/b/octocat", 0), ("/c/octocat", 100)] {
        Mock::given(method("HEAD"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(delay_ms)))
            .mount(&server)
            .await;
    }

    let registry = SiteRegistry::new(vec![
        site("A", &server, "a", true),
        site("B", &server, "b", true),
        site("C", &server, "c", true),
    ])
    .unwrap();
    let config = ScannerConfig {
        timeout: Duration::from_secs(2),
        ..fast_config()
    };
    let scanner = Scanner::with_config(registry, config).unwrap();

    let results = scanner.scan("octocat").await.unwrap();
    let names: Vec<&str> = results.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_result_count_matches_registry_when_everything_fails() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let registry = SiteRegistry::new(
        (0..5)
            .map(|i| {
                SiteDescriptor::new(
                    &format!("Dead{}", i),
                    &format!("http://127.0.0.1:{}/{}/{{}}", port, i),
                    true,
                )
            })
            .collect(),
    )
    .unwrap();
    let scanner = Scanner::with_config(registry, fast_config()).unwrap();

    let results = scanner.scan("octocat").await.unwrap();
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r.verdict == Verdict::TransportError));
}

#[tokio::test]
async fn test_repeated_scans_are_identical() {
    let server = MockServer::start().await;
    mount_status(&server, "/a/octocat", 200).await;
    mount_status(&server, "/b/octocat", 404).await;
    mount_status(&server, "/c/octocat", 403).await;
    mount_status(&server, "/d/octocat", 301).await;

    let registry = SiteRegistry::new(vec![
        site("A", &server, "a", true),
        site("B", &server, "b", true),
        site("C", &server, "c", false),
        site("D", &server, "d", false),
    ])
    .unwrap();
    let scanner = Scanner::with_config(registry, fast_config()).unwrap();

    let first = scanner.scan("octocat").await.unwrap();
    let second = scanner.scan("octocat").await.unwrap();

    assert_eq!(verdicts(&first), verdicts(&second));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_rejected_username_issues_no_requests() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let registry = SiteRegistry::new(vec![site("A", &server, "a", true)]).unwrap();
    let scanner = Scanner::with_config(registry, fast_config()).unwrap();

    let result = scanner.scan("bad name!").await;
    assert!(matches!(result, Err(ScanError::InvalidUsername(_))));

    let result = scanner.scan("").await;
    assert!(matches!(result, Err(ScanError::EmptyUsername)));
}

#[tokio::test]
async fn test_user_agent_is_browser_like() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/a/octocat"))
        .and(wiremock::matchers::header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let registry = SiteRegistry::new(vec![site("A", &server, "a", true)]).unwrap();
    let scanner = Scanner::with_config(registry, fast_config()).unwrap();

    let results = scanner.scan("octocat").await.unwrap();
    assert_eq!(results[0].verdict, Verdict::Confirmed);
}
