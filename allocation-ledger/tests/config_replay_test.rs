//! Integration tests for configuration loading and replay scripts

use allocation_ledger::config::Config;
use allocation_ledger::replay::{self, Operation, ReplayScript};
use allocation_ledger::{AllocationError, Principal, QuotaLedger};
use std::io::Write;
use tempfile::NamedTempFile;

const CONFIG: &str = r#"
[ledger]
owner = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM"

[logging]
level = "debug"
format = "compact"

[[quotas]]
period = 2023
region = "Colorado River Basin"
total_capacity = 10000

[[quotas]]
period = 2023
region = "Mississippi River Basin"
total_capacity = 20000
"#;

const SCRIPT: &str = r#"
[[steps]]
op = "commit"
period = 2023
region = "Colorado River Basin"
amount = 3000
caller = "ST3NBRSFKX28FQ2ZJ1MAKX58HKHSDGNV5N7R21XCP"

[[steps]]
op = "commit"
period = 2023
region = "Colorado River Basin"
amount = 4000
caller = "ST3NBRSFKX28FQ2ZJ1MAKX58HKHSDGNV5N7R21XCP"

[[steps]]
op = "check"
period = 2023
region = "Colorado River Basin"
amount = 3000

[[steps]]
op = "release"
period = 2023
region = "Colorado River Basin"
amount = 2000
caller = "ST3NBRSFKX28FQ2ZJ1MAKX58HKHSDGNV5N7R21XCP"

[[steps]]
op = "define"
period = 2024
region = "Colorado River Basin"
amount = 9500
caller = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG"

[[steps]]
op = "get"
period = 2023
region = "Colorado River Basin"
"#;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_ledger_from_config_file() {
    let file = write_temp(CONFIG);
    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.logging.format, "compact");

    let ledger = QuotaLedger::from_config(&config).await.unwrap();
    assert_eq!(ledger.quota_count().await, 2);
    assert_eq!(
        ledger.owner(),
        &Principal::new("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM")
    );

    let record = ledger.get_quota(2023, "Mississippi River Basin").await.unwrap();
    assert_eq!(record.total_capacity, 20000);
    assert_eq!(record.committed_amount, 0);
}

#[test]
fn test_missing_config_file() {
    let result = Config::from_file("/nonexistent/ledger.toml");
    assert!(matches!(result, Err(AllocationError::Config(_))));
}

#[tokio::test]
async fn test_invalid_config_is_rejected_by_ledger() {
    let mut config = Config::from_toml(CONFIG).unwrap();
    config.validation.max_total_capacity = Some(15000);

    let result = QuotaLedger::from_config(&config).await;
    assert!(matches!(result, Err(AllocationError::Config(_))));
}

#[tokio::test]
async fn test_replay_script_file() {
    let config = Config::from_toml(CONFIG).unwrap();
    let ledger = QuotaLedger::from_config(&config).await.unwrap();

    let file = write_temp(SCRIPT);
    let script = ReplayScript::from_file(file.path()).unwrap();
    let outcomes = script.run(&ledger).await;

    assert_eq!(outcomes.len(), 6);
    assert!(outcomes[0].ok && outcomes[1].ok);
    assert_eq!(outcomes[2].available, Some(true));
    assert!(outcomes[3].ok);

    // Non-owner definition fails but the script keeps going
    assert_eq!(outcomes[4].op, Operation::Define);
    assert!(!outcomes[4].ok);
    assert!(outcomes[4].error.as_deref().unwrap().starts_with("Not authorized"));

    let record = outcomes[5].record.unwrap();
    assert_eq!(record.total_capacity, 10000);
    assert_eq!(record.committed_amount, 5000);

    assert!(replay::has_failures(&outcomes));
    assert!(ledger.get_quota(2024, "Colorado River Basin").await.is_none());
}

#[test]
fn test_replay_outcomes_serialize() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let outcomes = runtime.block_on(async {
        let ledger = QuotaLedger::from_config(&Config::from_toml(CONFIG).unwrap())
            .await
            .unwrap();
        ReplayScript::from_toml(SCRIPT).unwrap().run(&ledger).await
    });

    let json = serde_json::to_value(&outcomes).unwrap();
    assert_eq!(json[2]["op"], "check");
    assert_eq!(json[2]["available"], true);
    assert!(json[0].get("error").is_none());
    assert_eq!(json[5]["record"]["committed_amount"], 5000);
    assert_eq!(json[5]["key"]["region"], "Colorado River Basin");
}

#[test]
fn test_missing_script_file() {
    let result = ReplayScript::from_file("/nonexistent/ops.toml");
    assert!(matches!(result, Err(AllocationError::Io(_))));
}
