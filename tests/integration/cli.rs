//! Integration tests for the command-line binary

use crate::fixtures::symbol_page;
use assert_cmd::Command;
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bin() -> Command {
    Command::cargo_bin("energy-symbol-crawler").unwrap()
}

#[test]
fn test_plan_lists_identifiers_in_crawl_order() {
    let output = bin()
        .args([
            "plan",
            "--start-date",
            "1399/12/29",
            "--end-date",
            "1400/01/01",
            "--load-type",
            "Base=B",
            "--load-type",
            "Peak=P",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "1,Base,DAP00PFBEXD991229,1399/12/29");
    assert_eq!(lines[1], "2,Base,DAP00PFBEXD991230,1399/12/30");
    assert_eq!(lines[3], "4,Peak,DAP00PFPEXD991229,1399/12/29");
}

#[test]
fn test_plan_json_output() {
    let output = bin()
        .args([
            "plan",
            "--output-format",
            "json",
            "--start-date",
            "1400/01/01",
            "--end-date",
            "1400/01/01",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let planned: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let planned = planned.as_array().unwrap();
    assert_eq!(planned.len(), 4);
    assert_eq!(planned[0]["identifier"], "DAP00PFBEXD000101");
    assert_eq!(planned[3]["load_type"], "Peak");
}

#[test]
fn test_reversed_dates_fail() {
    bin()
        .args(["plan", "--start-date", "1400/02/01", "--end-date", "1400/01/01"])
        .assert()
        .failure();
}

#[test]
fn test_validate_identifier() {
    let output = bin()
        .args(["validate", "identifier", "DAP00PFMEXD991230"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Load type: M"));
    assert!(stdout.contains("Delivery date: 1399/12/30"));

    bin()
        .args(["validate", "identifier", "NOT-AN-ID"])
        .assert()
        .failure();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_crawl_writes_json_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(symbol_page("77", &[("1400/01/01", "5")])),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("result.json");
    let uri = server.uri();
    let out_arg = out.clone();

    let status = tokio::task::spawn_blocking(move || {
        bin()
            .args([
                "crawl",
                "--base-url",
                &uri,
                "--start-date",
                "1400/01/01",
                "--end-date",
                "1400/01/02",
                "--load-type",
                "Base=B",
                "--output-format",
                "json",
                "--output",
                out_arg.to_str().unwrap(),
            ])
            .output()
            .unwrap()
            .status
    })
    .await
    .unwrap();
    assert!(status.success());

    let result: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(result["attempted"], 2);
    assert_eq!(result["entries"].as_array().unwrap().len(), 2);
    assert_eq!(result["entries"][1]["identifier"], "DAP00PFBEXD000102");
    assert_eq!(result["entries"][0]["record"]["ins_code"], "77");
}

#[test]
fn test_csv_requires_output_file() {
    bin()
        .args([
            "crawl",
            "--base-url",
            "http://127.0.0.1:9",
            "--start-date",
            "1400/01/01",
            "--end-date",
            "1400/01/01",
            "--format",
            "csv",
        ])
        .assert()
        .failure();
}
