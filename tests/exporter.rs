use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use maxctrl_exporter::collector::{CollectionResult, Collector};
use maxctrl_exporter::config::Config;
use maxctrl_exporter::encoding::text::encode;
use maxctrl_exporter::exporter::Exporter;

// admin:mariadb
const BASIC_AUTH: &str = "Basic YWRtaW46bWFyaWFkYg==";

const SERVERS: &str = r#"{
    "links": {"self": "http://127.0.0.1:8989/v1/servers/"},
    "data": [{
        "id": "s1",
        "type": "servers",
        "attributes": {
            "parameters": {"address": "10.0.0.1", "port": 3306},
            "state": "Master, Running",
            "statistics": {"connections": 5}
        }
    }]
}"#;

const DOWN_SERVERS: &str = r#"{
    "data": [{
        "id": "s2",
        "type": "servers",
        "attributes": {
            "parameters": {"address": "10.0.0.2"},
            "state": "Down",
            "statistics": {"connections": 0}
        }
    }]
}"#;

const SERVICES: &str = r#"{
    "data": [{
        "id": "rw-service",
        "type": "services",
        "attributes": {"router": "readwritesplit", "connections": 3, "parameters": {}}
    }]
}"#;

const MAXSCALE: &str = r#"{
    "data": {
        "id": "maxscale",
        "type": "maxscale",
        "attributes": {"uptime": 120, "parameters": {"threads": 2, "passive": false}}
    }
}"#;

const THREADS: &str = r#"{
    "data": [
        {"id": "0", "type": "threads", "attributes": {"stats": {"reads": 10, "load": {"last_second": 2}}}},
        {"id": "1", "type": "threads", "attributes": {"stats": {"reads": 20, "load": {"last_second": 4}}}}
    ]
}"#;

const MONITORS: &str = r#"{
    "data": [{
        "id": "cluster-monitor",
        "type": "monitors",
        "attributes": {
            "parameters": {"auto_failover": true, "auto_rejoin": true, "cooperative_monitoring_locks": "none"},
            "monitor_diagnostics": {"primary": "s1"}
        }
    }]
}"#;

type Route = (&'static str, StatusCode, &'static str);

fn healthy() -> Vec<Route> {
    vec![
        ("/v1/servers", StatusCode::OK, SERVERS),
        ("/v1/services", StatusCode::OK, SERVICES),
        ("/v1/maxscale", StatusCode::OK, MAXSCALE),
        ("/v1/maxscale/threads", StatusCode::OK, THREADS),
    ]
}

/// Serves canned MaxScale API responses on an ephemeral port and returns the
/// base URL. Requests without the default credentials are rejected.
async fn mock_maxscale(routes: Vec<Route>) -> String {
    let mut router = Router::new();
    for (path, status, body) in routes {
        router = router.route(
            path,
            get(move |headers: HeaderMap| async move {
                let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
                if authorization != Some(BASIC_AUTH) {
                    return (StatusCode::UNAUTHORIZED, String::new());
                }
                (status, body.to_string())
            }),
        );
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{address}")
}

fn exporter(url: String) -> Exporter {
    Exporter::new(&Config {
        url,
        ..Config::default()
    })
    .unwrap()
}

fn encoded(result: &CollectionResult) -> String {
    let mut buffer = String::new();
    encode(&mut buffer, result.samples()).unwrap();
    buffer
}

fn has_family(result: &CollectionResult, prefix: &str) -> bool {
    result
        .samples()
        .iter()
        .any(|s| s.descriptor().name().starts_with(prefix))
}

#[test_log::test(tokio::test)]
async fn healthy_cycle() {
    let exporter = exporter(mock_maxscale(healthy()).await);
    let result = exporter.collect().await;

    assert_eq!(1, result.up());
    assert_eq!(1, result.total_scrapes());
    assert_eq!(1, exporter.up());

    let text = encoded(&result);
    assert!(text.contains("maxctrl_server_connections{server=\"s1\",address=\"10.0.0.1\"} 5\n"));
    assert!(text.contains(
        "maxctrl_server_up{server=\"s1\",address=\"10.0.0.1\",status=\",Master,Running,\"} 1\n"
    ));
    assert!(text.contains(
        "maxctrl_service_current_sessions{name=\"rw-service\",router=\"readwritesplit\"} 3\n"
    ));
    assert!(text.contains("# TYPE maxctrl_service_total_sessions counter\n"));
    assert!(text.contains("maxctrl_status_uptime 120\n"));
    assert!(text.contains("maxctrl_status_threads 2\n"));
    assert!(text.contains("maxctrl_up 1\n"));
    assert!(text.contains("maxctrl_exporter_total_scrapes 1\n"));
    // No limit is configured anywhere.
    assert!(!text.contains("maxctrl_service_max_connections"));
}

#[test_log::test(tokio::test)]
async fn down_server() {
    let mut routes = healthy();
    routes[0] = ("/v1/servers", StatusCode::OK, DOWN_SERVERS);
    let exporter = exporter(mock_maxscale(routes).await);

    let result = exporter.collect().await;
    let up: Vec<_> = result.samples_named("maxctrl_server_up").collect();
    assert_eq!(1, up.len());
    assert_eq!(0.0, up[0].value());
    assert_eq!(Some(",Down,"), up[0].label("status"));
    // The server being down is not a collection failure.
    assert_eq!(1, result.up());
}

#[test_log::test(tokio::test)]
async fn failing_resource_marks_cycle_down() {
    let mut routes = healthy();
    routes[2] = ("/v1/maxscale", StatusCode::SERVICE_UNAVAILABLE, "");
    let exporter = exporter(mock_maxscale(routes).await);

    let result = exporter.collect().await;
    assert_eq!(0, result.up());
    assert_eq!(1, result.total_scrapes());
    assert_eq!(0, exporter.up());
    assert_eq!(1, exporter.total_scrapes());
    assert!(!has_family(&result, "maxctrl_status_uptime"));
    assert!(has_family(&result, "maxctrl_server_"));
    assert!(has_family(&result, "maxctrl_service_"));
    assert!(has_family(&result, "maxctrl_status_read_events"));
    assert!(encoded(&result).contains("maxctrl_up 0\n"));
}

#[test_log::test(tokio::test)]
async fn undecodable_resource_marks_cycle_down() {
    let mut routes = healthy();
    routes[0] = ("/v1/servers", StatusCode::OK, "<html>not json</html>");
    let exporter = exporter(mock_maxscale(routes).await);

    let result = exporter.collect().await;
    assert_eq!(0, result.up());
    assert!(!has_family(&result, "maxctrl_server_"));
    assert!(has_family(&result, "maxctrl_status_uptime"));
}

#[test_log::test(tokio::test)]
async fn missing_resource_marks_cycle_down() {
    let mut routes = healthy();
    routes.remove(3);
    let exporter = exporter(mock_maxscale(routes).await);

    let result = exporter.collect().await;
    assert_eq!(0, result.up());
    assert!(!has_family(&result, "maxctrl_status_read_events"));
    assert!(has_family(&result, "maxctrl_status_uptime"));
}

#[test_log::test(tokio::test)]
async fn rejected_credentials() {
    let url = mock_maxscale(healthy()).await;
    let exporter = Exporter::new(&Config {
        url,
        password: "wrong".to_string(),
        ..Config::default()
    })
    .unwrap();

    let result = exporter.collect().await;
    assert_eq!(0, result.up());
    assert_eq!(2, result.samples().len());
}

#[test_log::test(tokio::test)]
async fn unreachable_api() {
    // Nothing listens on the discard port.
    let exporter = exporter("http://127.0.0.1:9".to_string());

    for expected in 1..=3 {
        let result = exporter.collect().await;
        assert_eq!(0, result.up());
        assert_eq!(expected, result.total_scrapes());

        let names: Vec<_> = result
            .samples()
            .iter()
            .map(|s| s.descriptor().name())
            .collect();
        assert_eq!(vec!["maxctrl_up", "maxctrl_exporter_total_scrapes"], names);
    }
}

#[test_log::test(tokio::test)]
async fn worker_samples() {
    let exporter = exporter(mock_maxscale(healthy()).await);
    let result = exporter.collect().await;

    let workers: Vec<_> = result
        .samples()
        .iter()
        .filter(|s| s.label("id").is_some())
        .collect();
    assert_eq!(38, workers.len());
    for id in ["0", "1"] {
        assert_eq!(
            19,
            workers.iter().filter(|s| s.label("id") == Some(id)).count()
        );
    }

    let text = encoded(&result);
    assert!(text.contains("maxctrl_status_read_events{id=\"0\"} 10\n"));
    assert!(text.contains("maxctrl_status_load_last_second{id=\"1\"} 4\n"));
}

#[test_log::test(tokio::test)]
async fn monitors_and_max_connections() {
    let mut routes = healthy();
    routes.push(("/v1/monitors", StatusCode::OK, MONITORS));
    let exporter = Exporter::new(&Config {
        url: mock_maxscale(routes).await,
        monitors: true,
        max_connections: Some(100.0),
        ..Config::default()
    })
    .unwrap();

    let result = exporter.collect().await;
    assert_eq!(1, result.up());

    let text = encoded(&result);
    assert!(text.contains(
        "maxctrl_monitor_primary{name=\"cluster-monitor\",cooperative_monitoring_locks=\"none\"} 1\n"
    ));
    assert!(text.contains("# TYPE maxctrl_monitor_auto_failover counter\n"));
    assert!(text.contains(
        "maxctrl_service_max_connections{name=\"rw-service\",router=\"readwritesplit\"} 100\n"
    ));
}

#[test_log::test(tokio::test)]
async fn monitors_failure_only_when_enabled() {
    let url = mock_maxscale(healthy()).await;

    let disabled = exporter(url.clone());
    assert_eq!(1, disabled.collect().await.up());

    let enabled = Exporter::new(&Config {
        url,
        monitors: true,
        ..Config::default()
    })
    .unwrap();
    assert_eq!(0, enabled.collect().await.up());
}

#[test_log::test(tokio::test)]
async fn concurrent_cycles_share_scrape_counter() {
    let exporter = exporter(mock_maxscale(healthy()).await);

    let (first, second) = tokio::join!(exporter.collect(), exporter.collect());
    let mut scrapes = vec![first.total_scrapes(), second.total_scrapes()];
    scrapes.sort_unstable();
    assert_eq!(vec![1, 2], scrapes);

    assert_eq!(1, first.up());
    assert_eq!(1, second.up());
    assert_eq!(2, exporter.total_scrapes());
    assert_eq!(1, exporter.up());
}
