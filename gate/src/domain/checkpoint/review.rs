//! Guard review of a scanned visit and the confirmed gate record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ScanRegistration, ScanStatus, VisitDescriptor};

/// Direction of travel a recorded scan represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMovement {
    /// First scan: the visitor enters.
    Entry,
    /// Second scan: the visitor leaves.
    Exit,
}

impl GateMovement {
    /// Movement implied by a registration, or `None` when the visit had
    /// already completed and the scan changed nothing.
    pub fn from_registration(registration: &ScanRegistration) -> Option<Self> {
        if registration.is_already_completed() {
            return None;
        }
        match registration.status() {
            ScanStatus::InProgress => Some(Self::Entry),
            ScanStatus::Completed => Some(Self::Exit),
            ScanStatus::Pending => None,
        }
    }
}

/// Checks the guard ticks while comparing the pass with the visitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryChecklist {
    /// The visitor's identification matches the pass.
    pub name_match: bool,
    /// The number of people matches the pass.
    pub people_match: bool,
    /// The vehicle matches the pass.
    pub vehicle_match: bool,
    /// The guard authorizes the movement.
    pub authorized: bool,
}

/// Something a review still lacks before it can be confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewRequirement {
    /// The `authorized` box is unchecked.
    Authorization,
    /// A vehicle visit has no trunk photo.
    TrunkPhoto,
    /// A vehicle visit has no plate photo.
    PlatePhoto,
}

impl ReviewRequirement {
    /// Wire name of the requirement.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorization => "authorization",
            Self::TrunkPhoto => "trunkPhoto",
            Self::PlatePhoto => "platePhoto",
        }
    }
}

impl fmt::Display for ReviewRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The guard's review of one presentation.
///
/// Photo fields hold references to images captured on the device; the
/// images themselves are never handled here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryReview {
    /// Ticked checks.
    #[serde(default)]
    pub checklist: EntryChecklist,
    /// Free-text notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    /// Reference to the trunk photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trunk_photo: Option<String>,
    /// Reference to the licence plate photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plate_photo: Option<String>,
}

impl EntryReview {
    /// Requirements this review does not meet for `descriptor`.
    pub fn missing_requirements(&self, descriptor: &VisitDescriptor) -> Vec<ReviewRequirement> {
        let mut missing = Vec::new();
        if !self.checklist.authorized {
            missing.push(ReviewRequirement::Authorization);
        }
        if descriptor.declares_vehicle() {
            if is_blank(self.trunk_photo.as_deref()) {
                missing.push(ReviewRequirement::TrunkPhoto);
            }
            if is_blank(self.plate_photo.as_deref()) {
                missing.push(ReviewRequirement::PlatePhoto);
            }
        }
        missing
    }

    /// Whether the review can be confirmed: authorized, and both photos
    /// present when the visit declares a vehicle.
    ///
    /// # Example
    ///
    /// ```
    /// use gate::domain::{EntryReview, parse};
    ///
    /// let descriptor = parse("Casa: 12\nVisitante: Ana\nVehículo: Sedán gris")
    ///     .into_descriptor()
    ///     .expect("complete pass");
    /// let mut review = EntryReview::default();
    /// review.checklist.authorized = true;
    /// assert!(!review.can_confirm(&descriptor));
    ///
    /// review.trunk_photo = Some("file:///photos/trunk.jpg".to_owned());
    /// review.plate_photo = Some("file:///photos/plate.jpg".to_owned());
    /// assert!(review.can_confirm(&descriptor));
    /// ```
    pub fn can_confirm(&self, descriptor: &VisitDescriptor) -> bool {
        self.missing_requirements(descriptor).is_empty()
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|text| text.trim().is_empty())
}

/// Confirmed outcome of one checkpoint presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateRecord {
    /// The visit as read from the pass.
    pub visit: VisitDescriptor,
    /// Ledger status after the scan.
    pub status: ScanStatus,
    /// Ledger scan count after the scan.
    pub scan_count: u8,
    /// Entry or exit.
    pub movement: GateMovement,
    /// The checks the guard ticked.
    pub checklist: EntryChecklist,
    /// Free-text notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    /// Reference to the trunk photo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trunk_photo: Option<String>,
    /// Reference to the licence plate photo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate_photo: Option<String>,
    /// When the guard confirmed.
    pub processed_at: DateTime<Utc>,
}
