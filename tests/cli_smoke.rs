use anyhow::Result;
use assert_cmd::Command;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn help_lists_the_screen_commands() -> Result<()> {
    let output = Command::cargo_bin("sitedesk")?.arg("--help").output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["stock", "expenses", "progress", "receipts"] {
        assert!(stdout.contains(command), "help is missing `{command}`");
    }
    Ok(())
}

#[test]
fn missing_base_url_exits_nonzero() -> Result<()> {
    let output = Command::cargo_bin("sitedesk")?
        .env_remove("SITEDESK_BASE_URL")
        .arg("progress")
        .output()?;
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("base-url") || stderr.contains("SITEDESK_BASE_URL"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn expenses_json_reports_the_breakdown() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/expenses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "expenses": [
                {"id": "e1", "category": "Labour", "amount": 1000},
                {"id": "e2", "category": "Materials", "amount": 2000}
            ],
            "pagination": {"page": 1, "limit": 100, "total": 2, "totalPages": 1}
        })))
        .mount(&server)
        .await;

    let output = Command::cargo_bin("sitedesk")?
        .args(["--base-url", &server.uri(), "expenses", "--json"])
        .output()?;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let summary: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(
        summary.get("grandTotal").and_then(Value::as_f64),
        Some(3000.0)
    );
    let slices = summary
        .get("slices")
        .and_then(Value::as_array)
        .expect("slices present");
    let labour = slices
        .iter()
        .find(|s| s.get("category").and_then(Value::as_str) == Some("Labour"))
        .expect("labour slice");
    assert_eq!(labour.get("percent").and_then(Value::as_f64), Some(33.3));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn receipts_json_scopes_to_the_material() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/material-receipts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "receipts": [
                {"id": "r1", "materialId": "M1", "quantity": 5, "amount": 50, "purchaseId": "p1"},
                {"id": "r2", "materialId": "M2", "quantity": 7, "amount": 70}
            ]
        })))
        .mount(&server)
        .await;

    let output = Command::cargo_bin("sitedesk")?
        .args(["--base-url", &server.uri(), "receipts", "M1", "--json"])
        .output()?;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let history: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(
        history.get("materialId").and_then(Value::as_str),
        Some("M1")
    );
    let receipts = history
        .get("receipts")
        .and_then(Value::as_array)
        .expect("receipts present");
    assert_eq!(receipts.len(), 1);
    assert_eq!(
        history
            .get("linkCounts")
            .and_then(|c| c.get("linked"))
            .and_then(Value::as_u64),
        Some(1)
    );
    Ok(())
}
