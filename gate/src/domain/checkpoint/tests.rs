//! Tests for the guard checkpoint.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};
use serde_json::json;
use tokio::sync::Notify;

use super::*;
use crate::domain::ports::MockQrScanCommand;
use crate::domain::{ErrorCode, QrCode, ScanProgress, ScanStatus};

const PASS: &str = "Casa: 12\nVisitante: Ana López\nVehículo: no\nPersonas: 2\n";
const VEHICLE_PASS: &str = "Casa: 12\nVisitante: Ana López\nVehículo: Sedán gris\n";

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 17, 30, 0)
            .single()
            .expect("valid fixture timestamp")
    }
}

fn recorded(status: ScanStatus, scan_count: u8) -> ScanRegistration {
    ScanRegistration::Recorded(ScanProgress { status, scan_count })
}

fn checkpoint_with(command: MockQrScanCommand) -> GateCheckpoint<MockQrScanCommand> {
    GateCheckpoint::new(Arc::new(command), Arc::new(FixtureClock))
}

#[fixture]
fn authorized() -> EntryReview {
    EntryReview {
        checklist: EntryChecklist {
            name_match: true,
            people_match: true,
            vehicle_match: true,
            authorized: true,
        },
        observations: Some("Trae paquete".to_owned()),
        ..EntryReview::default()
    }
}

#[tokio::test]
async fn first_presentation_is_an_entry() {
    let mut command = MockQrScanCommand::new();
    command
        .expect_register_qr_scan()
        .withf(|code: &QrCode| code.as_str() == "12-ana-lópez")
        .times(1)
        .return_once(|_| Ok(recorded(ScanStatus::InProgress, 1)));
    let checkpoint = checkpoint_with(command);

    let scan = checkpoint.process_scan(PASS).await.expect("scan processed");

    assert_eq!(scan.visit.house_id, "12");
    assert_eq!(scan.movement(), Some(GateMovement::Entry));
    assert!(!checkpoint.is_scanning());
}

#[tokio::test]
async fn second_presentation_is_an_exit() {
    let mut command = MockQrScanCommand::new();
    command
        .expect_register_qr_scan()
        .return_once(|_| Ok(recorded(ScanStatus::Completed, 2)));

    let scan = checkpoint_with(command)
        .process_scan(PASS)
        .await
        .expect("scan processed");

    assert_eq!(scan.movement(), Some(GateMovement::Exit));
}

#[tokio::test]
async fn completed_visit_has_no_movement() {
    let mut command = MockQrScanCommand::new();
    command.expect_register_qr_scan().return_once(|_| {
        Ok(ScanRegistration::AlreadyCompleted(ScanProgress {
            status: ScanStatus::Completed,
            scan_count: 2,
        }))
    });

    let scan = checkpoint_with(command)
        .process_scan(PASS)
        .await
        .expect("scan processed");

    assert_eq!(scan.movement(), None);
}

#[rstest]
#[case("Casa: 12\n")]
#[case("not a pass")]
#[tokio::test]
async fn incomplete_pass_is_not_recorded(#[case] raw: &str) {
    let mut command = MockQrScanCommand::new();
    command.expect_register_qr_scan().times(0);
    let checkpoint = checkpoint_with(command);

    let err = checkpoint.process_scan(raw).await.expect_err("invalid pass");

    assert_eq!(err.code(), ErrorCode::InvalidPayload);
    assert!(!checkpoint.is_scanning());
}

#[tokio::test]
async fn storage_failure_is_surfaced_and_releases_the_checkpoint() {
    let mut command = MockQrScanCommand::new();
    command
        .expect_register_qr_scan()
        .return_once(|_| Err(Error::storage_failure("quota exceeded")));
    let checkpoint = checkpoint_with(command);

    let err = checkpoint.process_scan(PASS).await.expect_err("not saved");

    assert_eq!(err.code(), ErrorCode::StorageFailure);
    assert!(!checkpoint.is_scanning());
}

/// Command double that parks inside `register_qr_scan` until released.
#[derive(Default)]
struct ParkedCommand {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl QrScanCommand for ParkedCommand {
    async fn register_qr_scan(&self, _qr_code: &QrCode) -> Result<ScanRegistration, Error> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(recorded(ScanStatus::InProgress, 1))
    }

    async fn clear_all_qr_scans(&self) -> Result<(), Error> {
        Ok(())
    }

    async fn prune_qr_scans(&self, _older_than: DateTime<Utc>) -> Result<usize, Error> {
        Ok(0)
    }
}

#[tokio::test]
async fn second_scan_while_first_is_in_flight_is_rejected() {
    let command = Arc::new(ParkedCommand::default());
    let checkpoint = Arc::new(GateCheckpoint::new(
        Arc::clone(&command),
        Arc::new(FixtureClock),
    ));
    let first = tokio::spawn({
        let checkpoint = Arc::clone(&checkpoint);
        async move { checkpoint.process_scan(PASS).await }
    });
    command.entered.notified().await;

    let err = checkpoint
        .process_scan(PASS)
        .await
        .expect_err("second scan rejected");
    assert_eq!(err.code(), ErrorCode::ScanInFlight);
    assert!(checkpoint.is_scanning());

    command.release.notify_one();
    let scan = first.await.expect("task joins").expect("first scan processed");
    assert_eq!(scan.movement(), Some(GateMovement::Entry));
    assert!(!checkpoint.is_scanning());
}

fn scanned(raw: &str, registration: ScanRegistration) -> CheckpointScan {
    CheckpointScan {
        visit: parse(raw).into_descriptor().expect("complete pass"),
        registration,
    }
}

#[rstest]
fn confirm_builds_a_stamped_record(authorized: EntryReview) {
    let checkpoint = checkpoint_with(MockQrScanCommand::new());
    let scan = scanned(PASS, recorded(ScanStatus::InProgress, 1));

    let record = checkpoint.confirm(&scan, authorized).expect("confirmed");

    assert_eq!(record.movement, GateMovement::Entry);
    assert_eq!(record.status, ScanStatus::InProgress);
    assert_eq!(record.processed_at, FixtureClock.utc());
    assert_eq!(record.observations.as_deref(), Some("Trae paquete"));
}

#[rstest]
fn confirm_requires_authorization(mut authorized: EntryReview) {
    authorized.checklist.authorized = false;
    let checkpoint = checkpoint_with(MockQrScanCommand::new());
    let scan = scanned(PASS, recorded(ScanStatus::InProgress, 1));

    let err = checkpoint
        .confirm(&scan, authorized)
        .expect_err("not authorized");

    assert_eq!(err.code(), ErrorCode::ConfirmationIncomplete);
    assert_eq!(err.details(), Some(&json!({ "missing": ["authorization"] })));
}

#[rstest]
fn vehicle_visit_needs_both_photos(mut authorized: EntryReview) {
    let checkpoint = checkpoint_with(MockQrScanCommand::new());
    let scan = scanned(VEHICLE_PASS, recorded(ScanStatus::InProgress, 1));
    authorized.trunk_photo = Some("file:///photos/trunk.jpg".to_owned());

    let err = checkpoint
        .confirm(&scan, authorized.clone())
        .expect_err("plate photo missing");
    assert_eq!(err.details(), Some(&json!({ "missing": ["platePhoto"] })));

    authorized.plate_photo = Some("file:///photos/plate.jpg".to_owned());
    let record = checkpoint.confirm(&scan, authorized).expect("confirmed");
    assert_eq!(record.plate_photo.as_deref(), Some("file:///photos/plate.jpg"));
}

#[rstest]
fn already_completed_visit_cannot_be_confirmed(authorized: EntryReview) {
    let checkpoint = checkpoint_with(MockQrScanCommand::new());
    let scan = scanned(
        PASS,
        ScanRegistration::AlreadyCompleted(ScanProgress {
            status: ScanStatus::Completed,
            scan_count: 2,
        }),
    );

    let err = checkpoint
        .confirm(&scan, authorized)
        .expect_err("already completed");

    assert_eq!(err.code(), ErrorCode::ConfirmationIncomplete);
}

#[rstest]
#[case(None, None, vec![ReviewRequirement::TrunkPhoto, ReviewRequirement::PlatePhoto])]
#[case(Some("  "), Some("plate.jpg"), vec![ReviewRequirement::TrunkPhoto])]
#[case(Some("trunk.jpg"), Some("plate.jpg"), vec![])]
fn photo_requirements(
    #[case] trunk: Option<&str>,
    #[case] plate: Option<&str>,
    #[case] expected: Vec<ReviewRequirement>,
    authorized: EntryReview,
) {
    let visit = parse(VEHICLE_PASS).into_descriptor().expect("complete pass");
    let review = EntryReview {
        trunk_photo: trunk.map(str::to_owned),
        plate_photo: plate.map(str::to_owned),
        ..authorized
    };

    assert_eq!(review.missing_requirements(&visit), expected);
}

#[test]
fn walk_in_visit_needs_no_photos() {
    let visit = parse(PASS).into_descriptor().expect("complete pass");
    let review = EntryReview {
        checklist: EntryChecklist {
            authorized: true,
            ..EntryChecklist::default()
        },
        ..EntryReview::default()
    };

    assert!(review.can_confirm(&visit));
}
