//! Integration tests for the bx CLI
//!
//! These tests require a running S3-compatible server and credentials in
//! the environment.
//!
//! Run with:
//! ```bash
//! docker run -d --name minio -p 9000:9000 \
//!     -e MINIO_ROOT_USER=accesskey -e MINIO_ROOT_PASSWORD=secretkey \
//!     minio/minio server /data
//!
//! export AWS_ACCESS_KEY_ID=accesskey AWS_SECRET_ACCESS_KEY=secretkey
//! export BX_ENDPOINT_URL=http://localhost:9000
//! cargo test --features integration
//! ```

#![cfg(feature = "integration")]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use aws_sdk_s3::primitives::ByteStream;
use bx_s3::{ClientOptions, S3Client};
use tempfile::TempDir;

const REGION: &str = "us-east-1";

fn bx_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_bx"))
}

fn endpoint() -> Option<String> {
    std::env::var("BX_ENDPOINT_URL").ok()
}

/// Run bx with an isolated config directory
fn run_bx(args: &[&str], config_dir: &Path) -> Output {
    Command::new(bx_binary())
        .args(args)
        .args(["--region", REGION])
        .env("BX_CONFIG_DIR", config_dir)
        .output()
        .expect("Failed to execute bx command")
}

fn json_output(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "bx failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn unique_bucket(name: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("bx-{name}-{}", nanos % 1_000_000_000)
}

/// Create a bucket and upload `keys`, each holding its own key as content
async fn seed(bucket: &str, keys: &[String]) -> Option<()> {
    let client = S3Client::connect(ClientOptions {
        profile: None,
        region: Some(REGION.to_string()),
        endpoint: Some(endpoint()?),
    })
    .await
    .ok()?;

    client.inner().create_bucket().bucket(bucket).send().await.ok()?;
    for key in keys {
        client
            .inner()
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("text/plain")
            .body(ByteStream::from(key.clone().into_bytes()))
            .send()
            .await
            .ok()?;
    }
    Some(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ls_pages_a_large_folder() {
    let bucket = unique_bucket("ls");
    let keys: Vec<String> = (0..250).map(|i| format!("many/obj-{i:04}.txt")).collect();
    if seed(&bucket, &keys).await.is_none() {
        eprintln!("Skipping: S3 test server not configured");
        return;
    }
    let config_dir = TempDir::new().unwrap();
    let location = format!("{bucket}/many/");

    let first = json_output(&run_bx(&["ls", &location, "--json"], config_dir.path()));
    assert_eq!(first["total_loaded"], 250);
    assert_eq!(first["total_pages"], 3);
    assert_eq!(first["entries"].as_array().unwrap().len(), 100);
    assert_eq!(first["entries"][0]["content_type"], "text/plain");

    let last = json_output(&run_bx(
        &["ls", &location, "--json", "--page", "3"],
        config_dir.path(),
    ));
    assert_eq!(last["entries"].as_array().unwrap().len(), 50);

    let out_of_range = run_bx(&["ls", &location, "--page", "4"], config_dir.path());
    assert_eq!(out_of_range.status.code(), Some(2));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ls_filter_and_sort() {
    let bucket = unique_bucket("sort");
    let keys = vec![
        "a.txt".to_string(),
        "b-large.log".to_string(),
        "photos/cat.jpg".to_string(),
    ];
    if seed(&bucket, &keys).await.is_none() {
        eprintln!("Skipping: S3 test server not configured");
        return;
    }
    let config_dir = TempDir::new().unwrap();

    let listing = json_output(&run_bx(
        &["ls", &bucket, "--json", "--sort", "name", "--desc"],
        config_dir.path(),
    ));
    let keys: Vec<&str> = listing["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["photos/", "b-large.log", "a.txt"]);

    let filtered = json_output(&run_bx(
        &["ls", &bucket, "--json", "--filter", ".LOG"],
        config_dir.path(),
    ));
    assert_eq!(filtered["total_matching"], 1);
    assert_eq!(filtered["entries"][0]["key"], "b-large.log");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_folder_preserves_structure() {
    let bucket = unique_bucket("get");
    let keys = vec![
        "docs/a.txt".to_string(),
        "docs/sub/b.txt".to_string(),
        "other.txt".to_string(),
    ];
    if seed(&bucket, &keys).await.is_none() {
        eprintln!("Skipping: S3 test server not configured");
        return;
    }
    let config_dir = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let dest_str = dest.path().to_string_lossy().to_string();

    let output = run_bx(&["get", &format!("{bucket}/docs/"), &dest_str], config_dir.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let root = dest.path().join("docs");
    assert_eq!(std::fs::read_to_string(root.join("a.txt")).unwrap(), "docs/a.txt");
    assert_eq!(std::fs::read_to_string(root.join("sub/b.txt")).unwrap(), "docs/sub/b.txt");
    assert!(!dest.path().join("other.txt").exists());

    let output = run_bx(&["get", &format!("{bucket}/other.txt"), &dest_str], config_dir.path());
    assert!(output.status.success());
    assert_eq!(
        std::fs::read_to_string(dest.path().join("other.txt")).unwrap(),
        "other.txt"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_share_and_bucket_search() {
    let bucket = unique_bucket("share");
    if seed(&bucket, &["report.csv".to_string()]).await.is_none() {
        eprintln!("Skipping: S3 test server not configured");
        return;
    }
    let config_dir = TempDir::new().unwrap();

    let share = json_output(&run_bx(
        &["share", &format!("{bucket}/report.csv"), "--expires", "60", "--json"],
        config_dir.path(),
    ));
    let url = share["url"].as_str().unwrap();
    assert!(url.contains("report.csv"));
    assert!(url.contains("X-Amz-Expires=60"));

    let buckets = json_output(&run_bx(
        &["buckets", "--filter", &bucket.to_uppercase(), "--json"],
        config_dir.path(),
    ));
    assert_eq!(buckets["total_matching"], 1);
    assert_eq!(buckets["buckets"][0]["name"], bucket.as_str());
}

#[test]
fn test_unknown_profile_is_not_found() {
    let config_dir = TempDir::new().unwrap();
    let output = run_bx(
        &["buckets", "--profile", "bx-no-such-profile-xyz"],
        config_dir.path(),
    );
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_config_round_trip() {
    let config_dir = TempDir::new().unwrap();

    let output = run_bx(&["config", "set-profile", "staging"], config_dir.path());
    assert!(output.status.success());

    let shown = json_output(&run_bx(&["config", "show", "--json"], config_dir.path()));
    assert_eq!(shown["defaults"]["profile"], "staging");
    assert!(config_dir.path().join("config.toml").exists());
}
