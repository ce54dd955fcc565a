//! Decoding of scanned visit codes.
//!
//! Two encodings are accepted. A JSON object is trusted verbatim. Anything
//! else is read as the labeled text printed on resident-issued passes:
//!
//! ```text
//! VISITA REGISTRADA
//! Casa: 12
//! Visitante: Ana López
//! Fecha y Hora: 18/10/2026 17:30
//! Vehículo: Sedán gris
//! Clave de acceso: 4821
//! Personas: 2
//! Descripción: Entrega de muebles
//! ```

use serde_json::{Map, Value};

use crate::domain::Error;

use super::qr_code::is_pass_whitespace;
use super::{Headcount, PayloadEncoding, QrCode, RequiredField, VisitDescriptor, VisitFields};

#[derive(Debug, Clone, Copy)]
enum LabeledField {
    HouseId,
    VisitorName,
    VisitDate,
    Vehicle,
    AccessKey,
    PeopleCount,
    Description,
}

/// Labels in the order a line is tested against them.
const LABELS: [(&str, LabeledField); 7] = [
    ("Casa:", LabeledField::HouseId),
    ("Visitante:", LabeledField::VisitorName),
    ("Fecha y Hora:", LabeledField::VisitDate),
    ("Vehículo:", LabeledField::Vehicle),
    ("Clave de acceso:", LabeledField::AccessKey),
    ("Personas:", LabeledField::PeopleCount),
    ("Descripción:", LabeledField::Description),
];

/// Outcome of decoding a scanned payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedPayload {
    /// Both required fields were present.
    Complete(VisitDescriptor),
    /// The payload was recognized but lacks required fields.
    Partial {
        /// Everything the payload did yield.
        fields: Box<VisitFields>,
        /// Required fields that were absent or blank.
        missing: Vec<RequiredField>,
    },
    /// Neither a JSON object nor text with any recognized label.
    Undecodable,
}

impl ParsedPayload {
    /// Whether the payload produced a complete descriptor.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    /// Apply the completeness check and return the descriptor.
    ///
    /// # Errors
    ///
    /// Returns an [`crate::domain::ErrorCode::InvalidPayload`] error naming
    /// the missing fields, or stating that the code was not recognized.
    pub fn into_descriptor(self) -> Result<VisitDescriptor, Error> {
        match self {
            Self::Complete(descriptor) => Ok(descriptor),
            Self::Partial { missing, .. } => {
                let names: Vec<&str> = missing.iter().map(RequiredField::as_str).collect();
                Err(Error::invalid_payload(format!(
                    "scanned code is missing required visit fields: {}",
                    names.join(", ")
                ))
                .with_details(serde_json::json!({ "missing": names })))
            }
            Self::Undecodable => Err(Error::invalid_payload(
                "scanned code does not contain visit data",
            )),
        }
    }
}

/// Decode the raw text of a scanned code.
///
/// # Example
///
/// ```
/// use gate::domain::parse;
///
/// let descriptor = parse("Casa: 12\nVisitante: Ana López\n")
///     .into_descriptor()
///     .expect("complete payload");
/// assert_eq!(descriptor.qr_code.as_ref(), "12-ana-lópez");
/// ```
pub fn parse(raw_text: &str) -> ParsedPayload {
    let fields = match serde_json::from_str::<Value>(raw_text) {
        Ok(Value::Object(object)) => decode_structured(object),
        _ => match decode_labeled(raw_text) {
            Some(fields) => fields,
            None => return ParsedPayload::Undecodable,
        },
    };

    match fields.into_descriptor() {
        Ok(descriptor) => ParsedPayload::Complete(descriptor),
        Err((fields, missing)) => ParsedPayload::Partial {
            fields: Box::new(fields),
            missing,
        },
    }
}

fn decode_structured(mut object: Map<String, Value>) -> VisitFields {
    let mut fields = VisitFields::empty(PayloadEncoding::Structured);
    fields.house_id = take_text(&mut object, "houseId");
    fields.visitor_name = take_text(&mut object, "visitorName");
    fields.visit_date = take_text(&mut object, "visitDate");
    fields.vehicle = take_text(&mut object, "vehicle");
    fields.access_key = take_text(&mut object, "accessKey");
    fields.description = take_text(&mut object, "description");
    fields.people_count = take_headcount(&mut object, "peopleCount");
    fields.qr_code = take_text(&mut object, "qrCode").and_then(|raw| QrCode::new(raw).ok());
    fields.extra = object;
    fields
}

/// Remove `key` and render it as text. Non-text values stay in the map.
fn take_text(object: &mut Map<String, Value>, key: &str) -> Option<String> {
    let text = match object.get(key)? {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    object.remove(key);
    Some(text)
}

fn take_headcount(object: &mut Map<String, Value>, key: &str) -> Option<Headcount> {
    let headcount = match object.get(key)? {
        Value::Number(number) => number
            .as_u64()
            .and_then(|count| u32::try_from(count).ok())
            .map_or_else(|| Headcount::Unreadable(number.to_string()), Headcount::Count),
        Value::String(text) => Headcount::parse_lenient(text),
        _ => return None,
    };
    object.remove(key);
    Some(headcount)
}

fn decode_labeled(raw_text: &str) -> Option<VisitFields> {
    let mut fields = VisitFields::empty(PayloadEncoding::Labeled);
    let mut recognized = false;

    for line in raw_text.split('\n') {
        let Some((label, field)) = LABELS.iter().find(|(label, _)| line.contains(label)) else {
            continue;
        };
        let Some(value) = line
            .split(label)
            .nth(1)
            .map(|value| value.trim_matches(is_pass_whitespace))
        else {
            continue;
        };
        recognized = true;
        let value = value.to_owned();
        match field {
            LabeledField::HouseId => fields.house_id = Some(value),
            LabeledField::VisitorName => fields.visitor_name = Some(value),
            LabeledField::VisitDate => fields.visit_date = Some(value),
            LabeledField::Vehicle => fields.vehicle = Some(value),
            LabeledField::AccessKey => fields.access_key = Some(value),
            LabeledField::PeopleCount => {
                fields.people_count = Some(Headcount::parse_lenient(&value));
            }
            LabeledField::Description => fields.description = Some(value),
        }
    }

    recognized.then_some(fields)
}
