// ABOUTME: Integration tests for the gleaner CLI binary.
// ABOUTME: Covers HTML file extraction, batch scraping with CSV/summary output, reload and validation.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn gleaner_cmd() -> Command {
    Command::cargo_bin("gleaner").unwrap()
}

#[test]
fn extract_from_html_file() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = temp_dir.path().join("page.html");
    fs::write(
        &html_path,
        r#"<html><head><title>Test Page</title></head>
<body><article><p>Hi there</p></article></body></html>"#,
    )
    .unwrap();

    gleaner_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--url")
        .arg("https://example.com/post")
        .assert()
        .success()
        .stdout(predicate::str::contains("Test Page"))
        .stdout(predicate::str::contains("Hi there"));
}

#[test]
fn html_without_url_fails() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = temp_dir.path().join("page.html");
    fs::write(&html_path, "<html></html>").unwrap();

    gleaner_cmd()
        .arg("--html")
        .arg(&html_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--url is required"));
}

#[test]
fn no_input_fails() {
    gleaner_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one URL is required"));
}

#[test]
fn out_of_range_delay_is_rejected() {
    for delay in ["1e20", "-1", "NaN"] {
        gleaner_cmd()
            .arg("https://x.test/a")
            .arg(format!("--delay={delay}"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("--delay must be"));
    }
}

#[test]
fn html_json_output_has_host_title_fallback() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = temp_dir.path().join("bare.html");
    fs::write(&html_path, "<html><body><span>x</span></body></html>").unwrap();

    let output = gleaner_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--url")
        .arg("https://news.example.org/a")
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let records = parsed.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["title"], "news.example.org");
    assert_eq!(records[0]["content"], "");
}

#[test]
fn batch_writes_csv_and_summary() {
    let server = MockServer::start();
    let page1 = server.mock(|when, then| {
        when.method(GET).path("/page1");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body("<html><body><h1>One</h1><article>First body</article></body></html>");
    });
    let page2 = server.mock(|when, then| {
        when.method(GET).path("/page2");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body("<html><body><h1>Two</h1><article>Second body</article></body></html>");
    });

    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("out.csv");
    let summary_path = temp_dir.path().join("summary.csv");

    gleaner_cmd()
        .arg(server.url("/page1"))
        .arg(server.url("/page2"))
        .arg("--delay")
        .arg("0")
        .arg("--csv")
        .arg(&csv_path)
        .arg("--summary")
        .arg(&summary_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("2 succeeded, 0 failed"));

    page1.assert();
    page2.assert();

    let csv = fs::read_to_string(&csv_path).unwrap();
    assert!(csv.contains("url,title,content,date,images,timestamp"));
    assert!(csv.contains("First body"));
    assert!(csv.contains("Second body"));

    let summary = fs::read_to_string(&summary_path).unwrap();
    assert!(summary.contains("Total URLs,2"));
    assert!(summary.contains("Sample title,One"));
}

#[test]
fn failed_url_gives_nonzero_exit_but_keeps_others() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/missing");
        then.status(404);
    });
    server.mock(|when, then| {
        when.method(GET).path("/ok");
        then.status(200)
            .header("content-type", "text/html")
            .body("<html><head><title>Fine</title></head></html>");
    });

    gleaner_cmd()
        .arg(server.url("/missing"))
        .arg(server.url("/ok"))
        .arg("--delay")
        .arg("0")
        .arg("--retries")
        .arg("0")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Fine"))
        .stderr(predicate::str::contains("1 succeeded, 1 failed"));
}

#[test]
fn url_file_skips_comments_and_duplicates() {
    let server = MockServer::start();
    let page = server.mock(|when, then| {
        when.method(GET).path("/only");
        then.status(200)
            .header("content-type", "text/html")
            .body("<html><head><title>Only</title></head></html>");
    });

    let temp_dir = TempDir::new().unwrap();
    let list = temp_dir.path().join("urls.txt");
    let url = server.url("/only");
    fs::write(&list, format!("# pages\n{url}\n\n{url}\n")).unwrap();

    gleaner_cmd()
        .arg("--url-file")
        .arg(&list)
        .arg("--delay")
        .arg("0")
        .assert()
        .success()
        .stderr(predicate::str::contains("1 total"));

    page.assert_calls(1);
}

#[test]
fn load_and_validate_reports_missing_content() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("saved.csv");
    fs::write(
        &csv_path,
        "\u{feff}url,title,content,date,images,timestamp\n\
         https://x.test/a,A,Body,,,2024-06-15 09:05:03\n\
         https://x.test/b,B,,,,2024-06-15 09:05:04\n",
    )
    .unwrap();

    gleaner_cmd()
        .arg("--load")
        .arg(&csv_path)
        .arg("--validate")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("https://x.test/b"))
        .stderr(predicate::str::contains("row 2: missing content"));
}
