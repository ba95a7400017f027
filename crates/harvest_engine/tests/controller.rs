use std::fs;
use std::path::PathBuf;

use harvest_core::RelevantNumber;
use harvest_engine::{
    DeviceClient, DeviceSettings, DirectoryArtifactWriter, HarvestController, HarvestError,
    JsonFileLedger, PinAuthenticator, RunReport,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A mock device plus a scratch data directory.
struct Workbench {
    server: MockServer,
    data: TempDir,
}

impl Workbench {
    async fn new() -> Self {
        Self {
            server: MockServer::start().await,
            data: TempDir::new().unwrap(),
        }
    }

    fn controller(
        &self,
    ) -> HarvestController<PinAuthenticator, DeviceClient, JsonFileLedger, DirectoryArtifactWriter>
    {
        let settings = DeviceSettings::new(self.server.uri());
        HarvestController::new(
            PinAuthenticator::new(settings.clone()),
            DeviceClient::new(settings),
            JsonFileLedger::open(self.ledger_path()),
            DirectoryArtifactWriter::new(self.invoices_dir(), self.credit_notes_dir()),
            "0000",
        )
    }

    fn ledger_path(&self) -> PathBuf {
        self.data.path().join("processedNumbers.json")
    }

    fn invoices_dir(&self) -> PathBuf {
        self.data.path().join("invoices")
    }

    fn credit_notes_dir(&self) -> PathBuf {
        self.data.path().join("credit-notes")
    }

    fn ledger_contents(&self) -> Vec<String> {
        match fs::read_to_string(self.ledger_path()) {
            Ok(content) => serde_json::from_str(&content).expect("ledger json"),
            Err(_) => Vec::new(),
        }
    }

    fn read_document(&self, dir: PathBuf, number: &str) -> serde_json::Value {
        let content = fs::read_to_string(dir.join(format!("{number}.json"))).expect("document");
        serde_json::from_str(&content).expect("document json")
    }

    async fn mount_pin(&self, reply: &str) {
        Mock::given(method("POST"))
            .and(path("/api/v3/pin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply))
            .mount(&self.server)
            .await;
    }

    fn transaction_mock(number: &str, body: serde_json::Value) -> Mock {
        Mock::given(method("GET"))
            .and(path(format!("/api/v3/transactions/{number}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
    }
}

fn numbers(list: &[&str]) -> Vec<RelevantNumber> {
    list.iter().copied().map(RelevantNumber::from).collect()
}

fn success_body(amounts: &[f64]) -> serde_json::Value {
    let items: Vec<serde_json::Value> = amounts
        .iter()
        .map(|amount| serde_json::json!({ "totalAmount": amount }))
        .collect();
    serde_json::json!({ "messages": "Success", "items": items })
}

#[tokio::test]
async fn harvests_a_list_and_derives_credit_notes() {
    let bench = Workbench::new().await;
    bench.mount_pin("0100").await;
    Workbench::transaction_mock("A1", success_body(&[10.0, 5.0]))
        .mount(&bench.server)
        .await;
    Workbench::transaction_mock("A2", serde_json::json!({ "messages": "NoJournalsFound" }))
        .mount(&bench.server)
        .await;

    let report = bench.controller().run(&numbers(&["A1", "A2"])).await.unwrap();

    assert_eq!(
        report,
        RunReport {
            fetched: 2,
            skipped: 0,
            succeeded: 1,
            empty: 1,
            reauths: 0,
        }
    );
    assert_eq!(bench.ledger_contents(), vec!["A1".to_string(), "A2".to_string()]);

    // Invoice is the device payload, verbatim.
    let invoice = bench.read_document(bench.invoices_dir(), "A1");
    assert_eq!(invoice, success_body(&[10.0, 5.0]));

    // Credit note mirrors the items and pays back the grand total in cash.
    let note = bench.read_document(bench.credit_notes_dir(), "A1");
    assert_eq!(note["invoiceType"], 0);
    assert_eq!(note["transactionType"], 1);
    assert_eq!(note["cashier"], "ADMIN");
    assert_eq!(note["relevantNumber"], "A1");
    assert_eq!(note["items"], invoice["items"]);
    assert_eq!(note["payment"][0]["amount"], 15.0);
    assert_eq!(note["payment"][0]["paymentType"], "Cash");

    // The empty number still gets placeholder documents.
    assert_eq!(
        bench.read_document(bench.invoices_dir(), "A2"),
        serde_json::json!({})
    );
    assert_eq!(
        bench.read_document(bench.credit_notes_dir(), "A2"),
        serde_json::json!({})
    );
}

#[tokio::test]
async fn second_run_fetches_nothing() {
    let bench = Workbench::new().await;
    bench.mount_pin("0100").await;
    // Each transaction may be fetched exactly once across both runs.
    Workbench::transaction_mock("A1", success_body(&[10.0]))
        .expect(1)
        .mount(&bench.server)
        .await;
    Workbench::transaction_mock("A2", serde_json::json!({ "messages": "NoJournalsFound" }))
        .expect(1)
        .mount(&bench.server)
        .await;

    let candidates = numbers(&["A1", "A2"]);
    bench.controller().run(&candidates).await.unwrap();
    let second = bench.controller().run(&candidates).await.unwrap();

    assert_eq!(
        second,
        RunReport {
            fetched: 0,
            skipped: 2,
            succeeded: 0,
            empty: 0,
            reauths: 0,
        }
    );
    assert_eq!(bench.ledger_contents(), vec!["A1".to_string(), "A2".to_string()]);
}

#[tokio::test]
async fn session_expiry_reauthenticates_and_retries_the_same_number() {
    let bench = Workbench::new().await;
    bench.mount_pin("0100").await;
    // First fetch hits the expired session; the retry succeeds.
    Workbench::transaction_mock("B1", serde_json::json!({ "messages": "1500" }))
        .up_to_n_times(1)
        .mount(&bench.server)
        .await;
    Workbench::transaction_mock("B1", success_body(&[20.0]))
        .expect(1)
        .mount(&bench.server)
        .await;

    let report = bench.controller().run(&numbers(&["B1"])).await.unwrap();

    assert_eq!(
        report,
        RunReport {
            fetched: 2,
            skipped: 0,
            succeeded: 1,
            empty: 0,
            reauths: 1,
        }
    );
    assert_eq!(bench.ledger_contents(), vec!["B1".to_string()]);

    let note = bench.read_document(bench.credit_notes_dir(), "B1");
    assert_eq!(note["payment"][0]["amount"], 20.0);
}

#[tokio::test]
async fn missing_candidate_document_fails_before_any_device_call() {
    let bench = Workbench::new().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/pin"))
        .respond_with(ResponseTemplate::new(200).set_body_json("0100"))
        .expect(0)
        .mount(&bench.server)
        .await;

    let err = bench
        .controller()
        .run_from_document(&bench.data.path().join("relevantNumbers.json"))
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::Candidates(_)), "got {err:?}");
    assert!(bench.ledger_contents().is_empty());
}

#[tokio::test]
async fn rejected_pin_aborts_before_any_fetch() {
    let bench = Workbench::new().await;
    bench.mount_pin("1106").await;
    Workbench::transaction_mock("A1", success_body(&[10.0]))
        .expect(0)
        .mount(&bench.server)
        .await;

    let err = bench.controller().run(&numbers(&["A1"])).await.unwrap_err();

    match err {
        HarvestError::PinRejected { reply } => assert_eq!(reply, "1106"),
        other => panic!("expected pin rejection, got {other:?}"),
    }
    assert!(bench.ledger_contents().is_empty());
    assert!(!bench.invoices_dir().exists());
}

#[tokio::test]
async fn rejected_reverification_aborts_the_run() {
    let bench = Workbench::new().await;
    // Initial verification passes, the re-verification does not.
    Mock::given(method("POST"))
        .and(path("/api/v3/pin"))
        .respond_with(ResponseTemplate::new(200).set_body_json("0100"))
        .up_to_n_times(1)
        .mount(&bench.server)
        .await;
    bench.mount_pin("1106").await;
    Workbench::transaction_mock("B1", serde_json::json!({ "messages": "1500" }))
        .mount(&bench.server)
        .await;

    let err = bench.controller().run(&numbers(&["B1"])).await.unwrap_err();

    assert!(matches!(err, HarvestError::PinRejected { .. }), "got {err:?}");
    assert!(bench.ledger_contents().is_empty());
}

#[tokio::test]
async fn persistent_reauth_demands_exhaust_the_retry_budget() {
    let bench = Workbench::new().await;
    // The device accepts every pin verification but keeps expiring.
    Mock::given(method("POST"))
        .and(path("/api/v3/pin"))
        .respond_with(ResponseTemplate::new(200).set_body_json("0100"))
        .expect(4) // initial + three re-verifications
        .mount(&bench.server)
        .await;
    Workbench::transaction_mock("C1", serde_json::json!({ "messages": "1500" }))
        .expect(4)
        .mount(&bench.server)
        .await;

    let err = bench.controller().run(&numbers(&["C1"])).await.unwrap_err();

    match err {
        HarvestError::ReauthLoop { number } => assert_eq!(number, RelevantNumber::from("C1")),
        other => panic!("expected reauth loop, got {other:?}"),
    }
    assert!(bench.ledger_contents().is_empty());
}

#[tokio::test]
async fn transport_failure_aborts_the_rest_of_the_list() {
    let bench = Workbench::new().await;
    bench.mount_pin("0100").await;
    Workbench::transaction_mock("D1", success_body(&[7.5]))
        .mount(&bench.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/transactions/D2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&bench.server)
        .await;

    let err = bench
        .controller()
        .run(&numbers(&["D1", "D2", "D3"]))
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::Transport(_)), "got {err:?}");
    // D1 stays committed; D2 and D3 are still pending for the next run.
    assert_eq!(bench.ledger_contents(), vec!["D1".to_string()]);
    assert!(!bench.invoices_dir().join("D2.json").exists());
}

#[tokio::test]
async fn empty_replies_are_marked_processed_and_never_refetched() {
    let bench = Workbench::new().await;
    bench.mount_pin("0100").await;
    // Empty on the first run; the device would have data afterwards.
    Workbench::transaction_mock("E1", serde_json::json!({ "messages": "NoJournalsFound" }))
        .up_to_n_times(1)
        .mount(&bench.server)
        .await;
    Workbench::transaction_mock("E1", success_body(&[9.0]))
        .expect(0)
        .mount(&bench.server)
        .await;

    let candidates = numbers(&["E1"]);
    bench.controller().run(&candidates).await.unwrap();
    let second = bench.controller().run(&candidates).await.unwrap();

    // Deliberate: a confirmed-empty number is permanently excluded, even if
    // the device later has data for it. Pruning the empty artifacts is the
    // operator's path to reopen it.
    assert_eq!(second.skipped, 1);
    assert_eq!(second.fetched, 0);
    assert_eq!(bench.ledger_contents(), vec!["E1".to_string()]);
}
