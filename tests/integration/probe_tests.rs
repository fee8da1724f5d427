use crate::common::{deflate, gzip, record_for, run_probe, run_probe_json, test_config};
use std::time::Duration;
use sumi_probe::prober::MAX_BODY_SIZE;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_blank_and_malformed_lines_are_skipped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("hello world", "text/plain"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let input = format!("{}\n\nnot a url\n", mock_server.uri());
    let (summary, lines) = run_probe(&test_config(), &input).await;

    assert_eq!(summary.submitted, 1);
    assert_eq!(summary.malformed, 1);
    assert_eq!(summary.emitted, 1);
    assert_eq!(lines.len(), 1);
    assert_eq!(
        lines[0],
        format!("[200-text/plain] {}/ 11 2 1 []", mock_server.uri())
    );
}

#[tokio::test]
async fn test_size_counts_decoded_characters() {
    let mock_server = MockServer::start().await;
    let body = "naïve café\nüber ✓ 日本語";

    Mock::given(method("GET"))
        .and(path("/unicode"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/plain"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/unicode", mock_server.uri());
    let (summary, records) = run_probe_json(&test_config(), &url).await;

    assert_eq!(summary.emitted, 1);
    let record = record_for(&records, &url);
    assert_ne!(body.len(), body.chars().count());
    assert_eq!(record["size"], body.chars().count());
    assert_eq!(record["word_count"], 5);
    assert_eq!(record["line_count"], 2);
    assert_eq!(record["status_code"], 200);
    assert_eq!(record["ip_address"], "127.0.0.1");
    assert!(record.get("filename").is_none());
}

#[tokio::test]
async fn test_unknown_encoding_is_passed_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/br"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "br")
                .set_body_raw("abc", "application/octet-stream"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/br", mock_server.uri());
    let (summary, records) = run_probe_json(&test_config(), &url).await;

    assert_eq!(summary.emitted, 1);
    assert_eq!(record_for(&records, &url)["size"], 3);
}

#[tokio::test]
async fn test_metrics_use_decoded_gzip_and_deflate_bodies() {
    let mock_server = MockServer::start().await;
    let gzip_text = "héllo wörld\nline two";
    let deflate_text = "naïve café ✓\nzweite Zeile\n";

    Mock::given(method("GET"))
        .and(path("/gzip"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "gzip")
                .set_body_raw(gzip(gzip_text.as_bytes()), "text/plain; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/deflate"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "deflate")
                .set_body_raw(deflate(deflate_text.as_bytes()), "text/plain; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let base = mock_server.uri();
    let input = format!("{base}/gzip\n{base}/deflate\n");
    let (summary, records) = run_probe_json(&test_config(), &input).await;

    assert_eq!(summary.emitted, 2);
    assert_eq!(summary.failed, 0);

    let record = record_for(&records, &format!("{base}/gzip"));
    assert_eq!(record["size"], 20);
    assert_eq!(record["word_count"], 4);
    assert_eq!(record["line_count"], 2);

    let record = record_for(&records, &format!("{base}/deflate"));
    assert_eq!(record["size"], 26);
    assert_eq!(record["word_count"], 5);
    assert_eq!(record["line_count"], 3);
}

#[tokio::test]
async fn test_corrupt_gzip_body_fails_task() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/corrupt"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "gzip")
                .set_body_raw("definitely not gzip data", "text/plain"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/corrupt", mock_server.uri());
    let (summary, lines) = run_probe(&test_config(), &url).await;

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.emitted, 0);
    assert!(lines.is_empty());
}

#[tokio::test]
async fn test_fixed_and_custom_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/secure"))
        .and(header("x-api-key", "secret"))
        .and(header("accept", "*/*"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("ok", "text/plain"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/secure"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let mut config = test_config();
    config
        .headers
        .insert("X-Api-Key".to_string(), "secret".to_string());

    let url = format!("{}/secure", mock_server.uri());
    let (_, records) = run_probe_json(&config, &url).await;

    assert_eq!(record_for(&records, &url)["status_code"], 200);
}

#[tokio::test]
async fn test_custom_header_overrides_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("user-agent", "custom-agent"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = test_config();
    config
        .headers
        .insert("User-Agent".to_string(), "custom-agent".to_string());

    let (summary, _) = run_probe(&config, &mock_server.uri()).await;
    assert_eq!(summary.emitted, 1);
}

#[tokio::test]
async fn test_html_noise_is_dropped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_raw("<html>gone</html>", "text/html"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429).set_body_raw("<html>slow</html>", "text/html"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(404).set_body_raw("{}", "application/json"))
        .mount(&mock_server)
        .await;

    let base = mock_server.uri();
    let input = format!("{base}/missing\n{base}/busy\n{base}/api\n");

    let (summary, records) = run_probe_json(&test_config(), &input).await;
    assert_eq!(summary.discarded, 2);
    assert_eq!(summary.emitted, 1);
    assert_eq!(record_for(&records, &format!("{base}/api"))["status_code"], 404);

    let mut config = test_config();
    config.probe.ignore_noise = false;
    let (summary, records) = run_probe_json(&config, &input).await;
    assert_eq!(summary.discarded, 0);
    assert_eq!(summary.emitted, 3);
    assert_eq!(record_for(&records, &format!("{base}/missing"))["status_code"], 404);
}

#[tokio::test]
async fn test_oversized_body_produces_no_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/huge"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'a'; MAX_BODY_SIZE + 1]))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/exact"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'a'; MAX_BODY_SIZE]))
        .mount(&mock_server)
        .await;

    let base = mock_server.uri();
    let input = format!("{base}/huge\n{base}/exact\n");
    let (summary, records) = run_probe_json(&test_config(), &input).await;

    assert_eq!(summary.discarded, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(records.len(), 1);
    assert_eq!(record_for(&records, &format!("{base}/exact"))["size"], MAX_BODY_SIZE);
}

#[tokio::test]
async fn test_timeout_fails_task_without_output() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let mut config = test_config();
    config.probe.timeout_secs = 1;

    let base = mock_server.uri();
    let input = format!("{base}/slow\n{base}/fast\n");
    let (summary, lines) = run_probe(&config, &input).await;

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.emitted, 1);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("/fast"));
}

#[tokio::test]
async fn test_unreachable_host_does_not_stop_others() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Port 9 on localhost is not listening in test environments
    let input = format!("http://127.0.0.1:9/\n{}/ok\n", mock_server.uri());
    let (summary, lines) = run_probe(&test_config(), &input).await;

    assert_eq!(summary.submitted, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(lines.len(), 1);
}

#[tokio::test]
async fn test_many_urls_through_small_pool() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("x", "text/plain")
                .set_delay(Duration::from_millis(10)),
        )
        .expect(60)
        .mount(&mock_server)
        .await;

    let mut config = test_config();
    config.probe.workers = 3;

    let input: String = (0..60)
        .map(|n| format!("{}/page/{}\n", mock_server.uri(), n))
        .collect();
    let (summary, lines) = run_probe(&config, &input).await;

    assert_eq!(summary.submitted, 60);
    assert_eq!(summary.emitted, 60);
    assert_eq!(lines.len(), 60);
}
