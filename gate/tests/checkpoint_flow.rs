//! Guard checkpoint and `gate-scan` commands over a real ledger.

mod support;

use std::io::{Cursor, empty};
use std::sync::Arc;

use camino::Utf8PathBuf;
use chrono::TimeDelta;
use gate::domain::{
    EntryChecklist, EntryReview, ErrorCode, GateCheckpoint, GateMovement, QrScanService,
};
use gate::inbound::cli::{CliContext, CliError, Command, ScanArgs};
use gate::outbound::persistence::{FileKeyValueStore, InMemoryKeyValueStore};
use rstest::{fixture, rstest};
use serde_json::json;
use support::{MutableClock, fixture_timestamp};
use tempfile::TempDir;

const PASS: &str = "VISITA\nCasa: 12\nVisitante: Ana López\nVehículo: Sedán gris\nPersonas: 2\n";

fn authorized_with_photos() -> EntryReview {
    EntryReview {
        checklist: EntryChecklist {
            name_match: true,
            people_match: true,
            vehicle_match: true,
            authorized: true,
        },
        observations: None,
        trunk_photo: Some("file:///photos/trunk.jpg".to_owned()),
        plate_photo: Some("file:///photos/plate.jpg".to_owned()),
    }
}

#[rstest]
#[tokio::test]
async fn pass_is_entered_then_exited() {
    let clock = Arc::new(MutableClock::new(fixture_timestamp()));
    let service = Arc::new(QrScanService::new(
        Arc::new(InMemoryKeyValueStore::new()),
        clock.clone(),
    ));
    let checkpoint = GateCheckpoint::new(service, clock.clone());

    let entry = checkpoint.process_scan(PASS).await.expect("entry scan");
    let entry_record = checkpoint
        .confirm(&entry, authorized_with_photos())
        .expect("entry confirmed");
    clock.advance_days(1);
    let exit = checkpoint.process_scan(PASS).await.expect("exit scan");
    let exit_record = checkpoint
        .confirm(&exit, authorized_with_photos())
        .expect("exit confirmed");
    let repeat = checkpoint.process_scan(PASS).await.expect("repeat scan");

    assert_eq!(entry_record.movement, GateMovement::Entry);
    assert_eq!(exit_record.movement, GateMovement::Exit);
    assert_eq!(exit_record.processed_at, fixture_timestamp() + TimeDelta::days(1));
    assert!(repeat.registration.is_already_completed());
    let err = checkpoint
        .confirm(&repeat, authorized_with_photos())
        .expect_err("completed visit");
    assert_eq!(err.code(), ErrorCode::ConfirmationIncomplete);
}

struct CliLedger {
    _dir: TempDir,
    context: CliContext<QrScanService<FileKeyValueStore>>,
}

#[fixture]
fn cli_ledger() -> CliLedger {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().join("gate")).expect("utf-8 path");
    let store = FileKeyValueStore::open(&root).expect("open store");
    let clock = Arc::new(MutableClock::new(fixture_timestamp()));
    let service = QrScanService::new(Arc::new(store), clock.clone());
    let context = CliContext::new(Arc::new(service), clock, TimeDelta::days(30));
    CliLedger { _dir: dir, context }
}

fn scan_command(payload: Option<&str>) -> Command {
    Command::Scan(ScanArgs {
        payload: payload.map(str::to_owned),
        ..ScanArgs::default()
    })
}

#[rstest]
#[tokio::test]
async fn scan_reads_stdin_when_no_payload_is_given(cli_ledger: CliLedger) {
    let mut input = Cursor::new(PASS);

    let output = cli_ledger
        .context
        .run(scan_command(None), &mut input)
        .await
        .expect("scan command");

    assert_eq!(output["movement"], "entry");
    assert_eq!(output["visit"]["qrCode"], "12-ana-lópez");
    assert_eq!(
        output["registration"],
        json!({ "outcome": "recorded", "status": "in_progress", "scanCount": 1 })
    );
    assert!(output.get("record").is_none());
}

#[rstest]
#[tokio::test]
async fn confirmed_scan_includes_the_gate_record(cli_ledger: CliLedger) {
    let command = Command::Scan(ScanArgs {
        payload: Some(PASS.to_owned()),
        confirm: true,
        authorized: true,
        trunk_photo: Some("trunk.jpg".to_owned()),
        plate_photo: Some("plate.jpg".to_owned()),
        ..ScanArgs::default()
    });

    let output = cli_ledger
        .context
        .run(command, &mut empty())
        .await
        .expect("scan command");

    assert_eq!(output["record"]["movement"], "entry");
    assert_eq!(output["record"]["platePhoto"], "plate.jpg");
}

#[rstest]
#[tokio::test]
async fn unconfirmable_scan_is_still_recorded(cli_ledger: CliLedger) {
    let command = Command::Scan(ScanArgs {
        payload: Some(PASS.to_owned()),
        confirm: true,
        authorized: true,
        ..ScanArgs::default()
    });

    let err = cli_ledger
        .context
        .run(command, &mut empty())
        .await
        .expect_err("photos missing");
    let status = cli_ledger
        .context
        .run(
            Command::Status {
                qr_code: "12-ana-lópez".to_owned(),
            },
            &mut empty(),
        )
        .await
        .expect("status command");

    assert!(matches!(
        err,
        CliError::Domain(ref domain) if domain.code() == ErrorCode::ConfirmationIncomplete
    ));
    assert_eq!(status["scanCount"], 1);
}

#[rstest]
#[tokio::test]
async fn status_list_clear_and_prune(cli_ledger: CliLedger) {
    let context = &cli_ledger.context;
    let unknown = context
        .run(
            Command::Status {
                qr_code: "99-nadie".to_owned(),
            },
            &mut empty(),
        )
        .await
        .expect("status command");
    assert!(unknown.is_null());

    context
        .run(scan_command(Some(PASS)), &mut empty())
        .await
        .expect("scan");
    let listing = context
        .run(Command::List, &mut empty())
        .await
        .expect("list command");
    assert_eq!(listing["12-ana-lópez"]["status"], "in_progress");

    let pruned = context
        .run(
            Command::Prune {
                older_than_days: Some(1),
            },
            &mut empty(),
        )
        .await
        .expect("prune command");
    assert_eq!(pruned["removed"], 0);

    let cleared = context
        .run(Command::Clear, &mut empty())
        .await
        .expect("clear command");
    assert_eq!(cleared, json!({ "cleared": true }));
    let listing = context
        .run(Command::List, &mut empty())
        .await
        .expect("list command");
    assert_eq!(listing, json!({}));
}

#[rstest]
#[tokio::test]
async fn annotate_reads_a_visit_file(cli_ledger: CliLedger) {
    let context = &cli_ledger.context;
    context
        .run(scan_command(Some(PASS)), &mut empty())
        .await
        .expect("scan");
    let visits_dir = tempfile::tempdir().expect("temp dir");
    let file = visits_dir.path().join("visits.json");
    std::fs::write(
        &file,
        json!([{ "id": 5, "qrCode": "12-ana-lópez", "status": "pending" }]).to_string(),
    )
    .expect("write visits");

    let output = context
        .run(Command::Annotate { file }, &mut empty())
        .await
        .expect("annotate command");

    assert_eq!(
        output,
        json!([{ "id": 5, "qrCode": "12-ana-lópez", "status": "in_progress", "scanCount": 1 }])
    );
}

#[rstest]
#[tokio::test]
async fn blank_status_key_is_rejected(cli_ledger: CliLedger) {
    let err = cli_ledger
        .context
        .run(
            Command::Status {
                qr_code: "   ".to_owned(),
            },
            &mut empty(),
        )
        .await
        .expect_err("blank key");

    assert!(matches!(err, CliError::InvalidQrCode { .. }));
}

#[rstest]
#[case(Some(u32::MAX), TimeDelta::days(30))]
#[case(None, TimeDelta::days(i64::from(u32::MAX)))]
#[tokio::test]
async fn prune_window_past_the_calendar_is_rejected(
    #[case] older_than_days: Option<u32>,
    #[case] retention: TimeDelta,
) {
    let clock = Arc::new(MutableClock::new(fixture_timestamp()));
    let service = Arc::new(QrScanService::new(
        Arc::new(InMemoryKeyValueStore::new()),
        clock.clone(),
    ));
    let context = CliContext::new(service, clock, retention);
    context
        .run(scan_command(Some(PASS)), &mut empty())
        .await
        .expect("scan");

    let err = context
        .run(Command::Prune { older_than_days }, &mut empty())
        .await
        .expect_err("window out of range");

    assert!(matches!(
        err,
        CliError::RetentionOutOfRange { days } if days == i64::from(u32::MAX)
    ));
    let listing = context
        .run(Command::List, &mut empty())
        .await
        .expect("list command");
    assert_eq!(listing["12-ana-lópez"]["scanCount"], 1);
}
