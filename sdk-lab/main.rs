//! Feature Flags Rust SDK Lab
//!
//! Verification script for SDK functionality against a local mock backend.
//! Run with: cargo run --example sdk-lab
//! Set RUST_LOG=featureflags=debug to see cache and transport logs.

use featureflags::{ClientState, ErrorCode, FeatureFlagClient};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const PASS: &str = "\x1b[32m[PASS]\x1b[0m";
const FAIL: &str = "\x1b[31m[FAIL]\x1b[0m";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("=== Feature Flags Rust SDK Lab ===\n");

    let mut passed = 0;
    let mut failed = 0;

    macro_rules! pass {
        ($test:expr) => {{
            println!("{} {}", PASS, $test);
            passed += 1;
        }};
    }

    macro_rules! fail {
        ($test:expr) => {{
            println!("{} {}", FAIL, $test);
            failed += 1;
        }};
    }

    let mut server = mockito::Server::new_async().await;

    let bool_mock = server
        .mock("GET", "/evaluate/lab-bool")
        .match_query(mockito::Matcher::UrlEncoded("user".into(), "lab-user".into()))
        .with_status(200)
        .with_body(r#"{"flagKey":"lab-bool","value":true,"type":"BOOLEAN","isDefault":false,"variantId":"v-on"}"#)
        .expect(1)
        .create_async()
        .await;

    server
        .mock("GET", "/evaluate/lab-string")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"{"flagKey":"lab-string","value":"Hello Lab","type":"STRING","isDefault":true}"#)
        .create_async()
        .await;

    server
        .mock("GET", "/evaluate/lab-number")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"{"flagKey":"lab-number","value":42.5,"type":"NUMBER","isDefault":true}"#)
        .create_async()
        .await;

    server
        .mock("GET", "/evaluate/lab-missing")
        .match_query(mockito::Matcher::Any)
        .with_status(404)
        .with_body(r#"{"error":"not_found","message":"Flag not found"}"#)
        .create_async()
        .await;

    server
        .mock("GET", "/evaluate")
        .match_query(mockito::Matcher::UrlEncoded("user".into(), "bulk-user".into()))
        .with_status(200)
        .with_body(
            r#"{"flags":{
                "lab-bulk-a":{"flagKey":"lab-bulk-a","value":true,"type":"BOOLEAN","isDefault":false},
                "lab-bulk-b":{"flagKey":"lab-bulk-b","value":"b","type":"STRING","isDefault":true}
            }}"#,
        )
        .create_async()
        .await;

    // Test 1: Initialization
    println!("Testing initialization...");
    let client = match FeatureFlagClient::builder("ff_lab_test_key_123456")
        .base_url(server.url())
        .cache_ttl(Duration::from_secs(30))
        .request_timeout(Duration::from_secs(2))
        .build_client()
    {
        Ok(c) => c,
        Err(e) => {
            fail!(format!("Initialization - {}", e));
            print_summary(passed, failed);
            std::process::exit(1);
        }
    };
    pass!("Initialization");

    match FeatureFlagClient::builder("sdk_wrong_prefix").build_client() {
        Err(e) if e.code == ErrorCode::InvalidApiKey => pass!("Invalid API key rejected"),
        Err(e) => fail!(format!("Invalid API key - unexpected error {}", e)),
        Ok(_) => fail!("Invalid API key - client was created"),
    }

    // Test 2: Typed evaluation
    println!("\nTesting flag evaluation...");
    match client.get_boolean_flag("lab-bool", Some("lab-user"), false).await {
        Ok(true) => pass!("Boolean flag evaluation"),
        other => fail!(format!("Boolean flag - expected Ok(true), got {:?}", other)),
    }

    match client.get_string_flag("lab-string", None, "").await {
        Ok(value) if value == "Hello Lab" => pass!("String flag evaluation"),
        other => fail!(format!("String flag - expected 'Hello Lab', got {:?}", other)),
    }

    match client.get_number_flag("lab-number", None, 0.0).await {
        Ok(value) if (value - 42.5).abs() < f64::EPSILON => pass!("Number flag evaluation"),
        other => fail!(format!("Number flag - expected 42.5, got {:?}", other)),
    }

    match client.get_int_flag("lab-number", None, 0).await {
        Ok(42) => pass!("Integer flag evaluation"),
        other => fail!(format!("Integer flag - expected 42, got {:?}", other)),
    }

    // Test 3: Defaults
    println!("\nTesting defaults...");
    match client.get_string_flag("lab-missing", None, "fallback").await {
        Ok(value) if value == "fallback" => pass!("Missing flag returns default"),
        other => fail!(format!("Missing flag - expected 'fallback', got {:?}", other)),
    }

    match client.get_boolean_flag("lab-string", None, true).await {
        Ok(true) => pass!("Type mismatch returns default"),
        other => fail!(format!("Type mismatch - expected Ok(true), got {:?}", other)),
    }

    // Test 4: Cache
    println!("\nTesting cache...");
    let _ = client.get_boolean_flag("lab-bool", Some("lab-user"), false).await;
    if bool_mock.matched_async().await {
        pass!("Second lookup served from cache");
    } else {
        fail!("Cache - backend hit count mismatch");
    }

    client.invalidate_cache("lab-bool", Some("lab-user"));
    let before = client.cached_len();
    client.clear_cache();
    if client.cached_len() == 0 && before > 0 {
        pass!("Cache invalidation and clear");
    } else {
        fail!(format!("Cache clear - {} entries before, {} after", before, client.cached_len()));
    }

    // Test 5: Bulk evaluation
    println!("\nTesting bulk evaluation...");
    match client.get_all_flags(Some("bulk-user")).await {
        Ok(flags) if flags.len() == 2 => pass!("Bulk evaluation"),
        other => fail!(format!("Bulk evaluation - expected 2 flags, got {:?}", other)),
    }

    match client.get_boolean_flag("lab-bulk-a", Some("bulk-user"), false).await {
        Ok(true) => pass!("Bulk results served from cache"),
        other => fail!(format!("Bulk cache - expected Ok(true), got {:?}", other)),
    }

    // Test 6: Close
    println!("\nTesting close...");
    client.close();
    let after_close = client.get_boolean_flag("lab-bool", Some("lab-user"), false).await;
    if client.state() == ClientState::Closed && matches!(after_close, Ok(false)) {
        pass!("Close");
    } else {
        fail!(format!("Close - state {:?}, lookup {:?}", client.state(), after_close));
    }

    print_summary(passed, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

fn print_summary(passed: i32, failed: i32) {
    println!("\n{}", "=".repeat(40));
    println!("Results: {} passed, {} failed", passed, failed);
    println!("{}", "=".repeat(40));

    if failed == 0 {
        println!("\n\x1b[32mAll verifications passed!\x1b[0m");
    } else {
        println!("\n\x1b[31mSome verifications failed.\x1b[0m");
    }
}
