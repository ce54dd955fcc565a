//! Visit data decoded from a scanned code.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::QrCode;
use super::qr_code::is_pass_whitespace;

/// Which encoding a scanned payload used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadEncoding {
    /// A JSON object carrying the visit fields.
    Structured,
    /// Newline-separated `Label: value` lines.
    Labeled,
}

/// Number of people declared for a visit.
///
/// Labeled payloads are free text, so an unreadable headcount is kept as the
/// raw text rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Headcount {
    /// A readable, non-negative count.
    Count(u32),
    /// Text that does not start with a number.
    Unreadable(String),
}

impl Headcount {
    /// Read a headcount leniently.
    ///
    /// Leading whitespace and an optional sign are skipped, then the leading
    /// run of ASCII digits is used (`"3 personas"` reads as 3). Text without
    /// leading digits, negative counts and counts that overflow `u32` are
    /// kept as [`Headcount::Unreadable`].
    ///
    /// # Example
    ///
    /// ```
    /// use gate::domain::Headcount;
    ///
    /// assert_eq!(Headcount::parse_lenient(" 4 adultos"), Headcount::Count(4));
    /// assert_eq!(
    ///     Headcount::parse_lenient("varios"),
    ///     Headcount::Unreadable("varios".to_owned())
    /// );
    /// ```
    pub fn parse_lenient(text: &str) -> Self {
        let trimmed = text.trim_start_matches(is_pass_whitespace);
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let digits: String = unsigned.chars().take_while(char::is_ascii_digit).collect();
        match digits.parse::<u32>() {
            Ok(0) => Self::Count(0),
            Ok(count) if !negative => Self::Count(count),
            _ => Self::Unreadable(text.to_owned()),
        }
    }

    /// The count when it was readable.
    pub fn count(&self) -> Option<u32> {
        match self {
            Self::Count(count) => Some(*count),
            Self::Unreadable(_) => None,
        }
    }
}

/// A field a visit descriptor cannot do without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequiredField {
    /// The community unit identifier.
    #[serde(rename = "houseId")]
    HouseId,
    /// The visitor's name.
    #[serde(rename = "visitorName")]
    VisitorName,
}

impl RequiredField {
    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HouseId => "houseId",
            Self::VisitorName => "visitorName",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a payload yielded, before the completeness check.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitFields {
    /// Encoding the payload used.
    pub encoding: PayloadEncoding,
    /// Community unit identifier.
    pub house_id: Option<String>,
    /// Visitor name.
    pub visitor_name: Option<String>,
    /// Visit date and time as printed.
    pub visit_date: Option<String>,
    /// Vehicle description.
    pub vehicle: Option<String>,
    /// Access key printed on the pass.
    pub access_key: Option<String>,
    /// Declared number of people.
    pub people_count: Option<Headcount>,
    /// Free-form description.
    pub description: Option<String>,
    /// Identifier supplied by a structured payload.
    pub qr_code: Option<QrCode>,
    /// Unrecognized structured fields, kept verbatim.
    pub extra: Map<String, Value>,
}

impl VisitFields {
    /// An empty field set for the given encoding.
    pub fn empty(encoding: PayloadEncoding) -> Self {
        Self {
            encoding,
            house_id: None,
            visitor_name: None,
            visit_date: None,
            vehicle: None,
            access_key: None,
            people_count: None,
            description: None,
            qr_code: None,
            extra: Map::new(),
        }
    }

    /// Required fields that are absent or blank.
    pub fn missing_required(&self) -> Vec<RequiredField> {
        let mut missing = Vec::new();
        if is_blank(self.house_id.as_deref()) {
            missing.push(RequiredField::HouseId);
        }
        if is_blank(self.visitor_name.as_deref()) {
            missing.push(RequiredField::VisitorName);
        }
        missing
    }

    /// Promote the fields to a descriptor when both required fields are set.
    ///
    /// The identifier supplied by the payload wins; otherwise it is derived
    /// from the house and visitor name.
    ///
    /// # Errors
    ///
    /// Returns the fields unchanged together with the missing required fields.
    pub fn into_descriptor(self) -> Result<VisitDescriptor, (Self, Vec<RequiredField>)> {
        let missing = self.missing_required();
        match (self.house_id.clone(), self.visitor_name.clone()) {
            (Some(house_id), Some(visitor_name)) if missing.is_empty() => {
                let qr_code = self
                    .qr_code
                    .unwrap_or_else(|| QrCode::derive(&house_id, &visitor_name));
                Ok(VisitDescriptor {
                    house_id,
                    visitor_name,
                    visit_date: self.visit_date,
                    vehicle: self.vehicle,
                    access_key: self.access_key,
                    people_count: self.people_count,
                    description: self.description,
                    qr_code,
                    encoding: self.encoding,
                    extra: self.extra,
                })
            }
            _ => Err((self, missing)),
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|text| text.trim().is_empty())
}

/// A complete visit descriptor produced by the parser.
///
/// ## Invariants
/// - `house_id` and `visitor_name` are non-blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitDescriptor {
    /// Community unit identifier.
    pub house_id: String,
    /// Visitor name.
    pub visitor_name: String,
    /// Visit date and time as printed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_date: Option<String>,
    /// Vehicle description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<String>,
    /// Access key printed on the pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    /// Declared number of people.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people_count: Option<Headcount>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ledger key for this visit.
    pub qr_code: QrCode,
    /// Encoding the payload used.
    pub encoding: PayloadEncoding,
    /// Unrecognized structured fields, kept verbatim.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl VisitDescriptor {
    /// Whether the visit declares a vehicle.
    ///
    /// Passes print `no` or `ninguno` when the visitor arrives on foot.
    pub fn declares_vehicle(&self) -> bool {
        self.vehicle.as_deref().is_some_and(|vehicle| {
            let vehicle = vehicle.trim().to_lowercase();
            !vehicle.is_empty() && vehicle != "no" && vehicle != "ninguno"
        })
    }
}
