//! Integration tests: validate on-disk datasets against the repository's
//! real `schemas/` directory.

use std::path::{Path, PathBuf};

use scanmeta_check::{pipeline, FsSource, ValidationPlan, Validator};
use scanmeta_core::{RecordType, Report};
use scanmeta_schema::SchemaRegistry;
use serde_json::{json, Value};

const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
const TRANSFER: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn registry() -> SchemaRegistry {
    SchemaRegistry::load(repo_root().join("schemas")).expect("repository schemas must load")
}

/// A dataset under a temporary directory.
struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, rel: &str, contents: &str) -> &Self {
        let path = self.root().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
        self
    }

    fn json(&self, rel: &str, value: Value) -> &Self {
        self.write(rel, &serde_json::to_string_pretty(&value).unwrap())
    }

    fn run(&self) -> Report {
        let source = FsSource::new(self.root());
        pipeline::run(&source, &registry(), &ValidationPlan::all())
    }

    fn validate(&self, record_type: RecordType) -> Report {
        let source = FsSource::new(self.root());
        let registry = registry();
        Validator::new(&source, &registry).validate_all(record_type)
    }
}

fn token(address: &str, chain_id: u64) -> Value {
    json!({
        "address": address,
        "chainId": chain_id,
        "name": "USD Coin",
        "symbol": "USDC",
        "decimals": 6
    })
}

fn errors_at<'r>(report: &'r Report, location: &str) -> Vec<&'r str> {
    report
        .entries()
        .iter()
        .filter(|r| r.location.to_string() == location)
        .flat_map(|r| r.errors.iter().map(String::as_str))
        .collect()
}

#[test]
fn valid_dataset_passes_every_pass() {
    let fx = Fixture::new();
    fx.json(&format!("data/tokens/1/{USDC}.json"), token(USDC, 1))
        .write("assets/apps/uniswap.svg", "<svg/>")
        .json(
            "data/apps/uniswap.json",
            json!({"id": "uniswap", "name": "Uniswap", "type": "dapp", "logo": "assets/apps/uniswap.svg"}),
        )
        .json(
            "data/networks.json",
            json!({"networks": [{
                "chainId": 1,
                "name": "Ethereum Mainnet",
                "nativeCurrency": {"name": "Ether", "symbol": "ETH", "decimals": 18}
            }]}),
        )
        .json(
            "data/organizations.json",
            json!({"organizations": [{"id": "ethereum-foundation", "name": "Ethereum Foundation", "type": "foundation"}]}),
        )
        .json(
            "data/events/1/erc20.json",
            json!({ TRANSFER: {"event": "Transfer(address,address,uint256)"} }),
        )
        .json(
            "data/addresses/1/0xdead.json",
            json!({"address": USDC, "chainId": 1, "label": "USDC token"}),
        );

    let report = fx.run();
    let failures: Vec<_> = report.invalid().collect();
    assert!(failures.is_empty(), "unexpected failures: {failures:#?}");
    assert_eq!(report.summary().total, 6);
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn missing_required_field_is_named() {
    let fx = Fixture::new();
    fx.json("data/apps/nameless.json", json!({"id": "nameless", "type": "tool"}));

    let report = fx.validate(RecordType::App);
    let errors = errors_at(&report, "data/apps/nameless.json");
    assert!(
        errors.iter().any(|e| e.contains("\"name\"") && e.contains("required")),
        "got {errors:?}"
    );
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn token_in_wrong_chain_directory() {
    let fx = Fixture::new();
    let address = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
    let rel = format!("data/tokens/10/{address}.json");
    fx.json(&rel, token(address, 1));

    let report = fx.validate(RecordType::Token);
    assert_eq!(
        errors_at(&report, &rel),
        vec!["chainId mismatch: file is in 10/ but chainId is 1"]
    );
}

#[test]
fn case_variant_addresses_are_one_duplicate() {
    let fx = Fixture::new();
    let upper = "0xABCDABCDABCDABCDABCDABCDABCDABCDABCDABCD";
    let lower = "0xabcdabcdabcdabcdabcdabcdabcdabcdabcdabcd";
    fx.json("data/tokens/1/a.json", token(upper, 1))
        .json("data/tokens/1/b.json", token(lower, 1));

    let report = fx.run();
    let duplicates: Vec<_> = report
        .invalid()
        .flat_map(|r| r.errors.iter().map(move |e| (r.location.to_string(), e)))
        .filter(|(_, e)| e.starts_with("Duplicate"))
        .collect();
    assert_eq!(duplicates.len(), 1, "{duplicates:?}");
    let (location, message) = &duplicates[0];
    assert_eq!(location, "data/tokens/1/b.json");
    assert!(message.contains("data/tokens/1/a.json"));
}

#[test]
fn nft_with_decimals_is_rejected() {
    let fx = Fixture::new();
    let mut nft = token(USDC, 1);
    nft["type"] = json!("ERC721");
    nft["decimals"] = json!(18);
    fx.json("data/tokens/1/nft.json", nft);

    let report = fx.validate(RecordType::Token);
    assert_eq!(
        errors_at(&report, "data/tokens/1/nft.json"),
        vec!["NFT tokens (ERC721) should have decimals = 0, got 18"]
    );
}

#[test]
fn whole_number_floats_satisfy_chain_and_nft_rules() {
    let fx = Fixture::new();
    fx.json(
        "data/tokens/10/nft.json",
        json!({
            "address": USDC,
            "chainId": 10.0,
            "name": "N",
            "symbol": "N",
            "decimals": 0.0,
            "type": "ERC721"
        }),
    );

    let report = fx.validate(RecordType::Token);
    assert_eq!(report.len(), 1);
    assert!(report.entries()[0].valid, "{:?}", report.entries()[0].errors);
}

#[test]
fn event_keys_must_be_topic_hashes() {
    let fx = Fixture::new();
    fx.json(
        "data/events/1/bad.json",
        json!({"not-a-hash": {"event": "Transfer(address,address,uint256)"}}),
    )
    .json(
        "data/events/1/good.json",
        json!({ TRANSFER: {"event": "Transfer(address,address,uint256)"} }),
    );

    let report = fx.validate(RecordType::EventMap);
    assert_eq!(
        errors_at(&report, "data/events/1/bad.json"),
        vec!["Invalid topic0 hash format: not-a-hash"]
    );
    assert!(errors_at(&report, "data/events/1/good.json").is_empty());
}

#[test]
fn referenced_logo_must_exist() {
    let fx = Fixture::new();
    let mut doc = token(USDC, 1);
    doc["logo"] = json!("assets/missing.svg");
    fx.json("data/tokens/1/usdc.json", doc);

    let report = fx.validate(RecordType::Token);
    assert_eq!(
        errors_at(&report, "data/tokens/1/usdc.json"),
        vec!["Referenced logo not found: assets/missing.svg"]
    );

    fx.write("assets/missing.svg", "<svg/>");
    let report = fx.validate(RecordType::Token);
    assert!(report.is_success(), "{:?}", report.entries());
}

#[test]
fn malformed_json_is_one_parse_error() {
    let fx = Fixture::new();
    fx.write("data/apps/broken.json", "{\"id\": ");

    let report = fx.run();
    let errors = errors_at(&report, "data/apps/broken.json");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Failed to parse JSON: "));
}

#[test]
fn aggregate_elements_report_labelled_locations() {
    let fx = Fixture::new();
    fx.json(
        "data/organizations.json",
        json!({"organizations": [
            {"id": "acme", "name": "Acme", "type": "venture"},
            {"id": "Bad Id", "name": "Bad", "type": "venture"}
        ]}),
    );

    let report = fx.validate(RecordType::Organization);
    assert!(report.entries()[0].valid);
    let bad = &report.entries()[1];
    assert_eq!(bad.location.to_string(), "data/organizations.json[1] (id: Bad Id)");
    assert!(bad.errors.iter().any(|e| e.starts_with("/id ")), "{:?}", bad.errors);
}

#[test]
fn repeated_runs_produce_identical_reports() {
    let fx = Fixture::new();
    fx.json("data/tokens/1/a.json", token(USDC, 1))
        .json("data/tokens/1/b.json", token(USDC, 1))
        .json("data/tokens/5/c.json", token(USDC, 1))
        .write("data/apps/broken.json", "nope");

    let first = serde_json::to_string(&fx.run()).unwrap();
    let second = serde_json::to_string(&fx.run()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn empty_dataset_is_success() {
    let fx = Fixture::new();
    let report = fx.run();
    assert!(report.is_empty());
    assert_eq!(report.exit_code(), 0);
}
