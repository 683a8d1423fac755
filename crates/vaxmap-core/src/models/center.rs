//! Domain model for a vaccination center.
//!
//! Centers are created from API records, persisted to the local store and
//! read back for display. They are never mutated in place; a refresh deletes
//! every row and inserts fresh ones.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::remote::RemoteCenterRecord;

/// Category label the API uses for central and regional hub centers.
pub const CATEGORY_CENTRAL_REGIONAL: &str = "중앙/권역";

/// Category label the API uses for local centers.
pub const CATEGORY_REGIONAL: &str = "지역";

/// Separator used when a position is stored as a single string column.
const POSITION_SEPARATOR: char = ';';

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("Invalid {field} value: {value:?}")]
    InvalidCoordinate { field: &'static str, value: String },

    #[error("Invalid stored position: {0:?}")]
    InvalidPosition(String),
}

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Parse the string coordinates carried by API records.
    pub fn parse(lat: &str, lng: &str) -> Result<Self, TransformError> {
        let lat = parse_coordinate("latitude", lat)?;
        let lng = parse_coordinate("longitude", lng)?;
        Ok(Self { lat, lng })
    }

    /// Encode as `"<lat>;<lng>"` for storage.
    pub fn encode(&self) -> String {
        format!("{}{}{}", self.lat, POSITION_SEPARATOR, self.lng)
    }

    /// Decode a position previously written by [`Position::encode`].
    pub fn decode(value: &str) -> Result<Self, TransformError> {
        let (lat, lng) = value
            .split_once(POSITION_SEPARATOR)
            .ok_or_else(|| TransformError::InvalidPosition(value.to_string()))?;
        Self::parse(lat, lng).map_err(|_| TransformError::InvalidPosition(value.to_string()))
    }
}

fn parse_coordinate(field: &'static str, value: &str) -> Result<f64, TransformError> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(TransformError::InvalidCoordinate {
            field,
            value: value.to_string(),
        }),
    }
}

/// Tint applied to a center's map marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerColor {
    Transparent,
    Blue,
    Magenta,
}

impl MarkerColor {
    pub fn name(&self) -> &'static str {
        match self {
            MarkerColor::Transparent => "transparent",
            MarkerColor::Blue => "blue",
            MarkerColor::Magenta => "magenta",
        }
    }
}

impl fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Center category as reported by the API.
///
/// Labels outside the two known ones are kept verbatim in `Other` so that a
/// new category shows up in the data instead of disappearing into a default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CenterCategory {
    CentralRegional,
    Regional,
    Other(String),
}

impl CenterCategory {
    pub fn from_label(label: &str) -> Self {
        Self::from(label.to_string())
    }

    pub fn label(&self) -> &str {
        match self {
            CenterCategory::CentralRegional => CATEGORY_CENTRAL_REGIONAL,
            CenterCategory::Regional => CATEGORY_REGIONAL,
            CenterCategory::Other(label) => label,
        }
    }

    pub fn marker_color(&self) -> MarkerColor {
        match self {
            CenterCategory::CentralRegional => MarkerColor::Transparent,
            CenterCategory::Regional => MarkerColor::Blue,
            CenterCategory::Other(_) => MarkerColor::Magenta,
        }
    }
}

impl From<String> for CenterCategory {
    fn from(label: String) -> Self {
        match label.as_str() {
            CATEGORY_CENTRAL_REGIONAL => CenterCategory::CentralRegional,
            CATEGORY_REGIONAL => CenterCategory::Regional,
            _ => CenterCategory::Other(label),
        }
    }
}

impl From<CenterCategory> for String {
    fn from(category: CenterCategory) -> Self {
        match category {
            CenterCategory::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaccinationCenter {
    pub id: i64,
    pub position: Position,
    pub address: String,
    pub center_name: String,
    pub facility_name: String,
    pub phone_number: String,
    pub updated_at: String,
    pub category: CenterCategory,
}

impl VaccinationCenter {
    pub fn marker_color(&self) -> MarkerColor {
        self.category.marker_color()
    }
}

impl TryFrom<RemoteCenterRecord> for VaccinationCenter {
    type Error = TransformError;

    fn try_from(record: RemoteCenterRecord) -> Result<Self, Self::Error> {
        let position = Position::parse(&record.lat, &record.lng)?;
        Ok(Self {
            id: record.id,
            position,
            address: record.address,
            center_name: record.center_name,
            facility_name: record.facility_name,
            phone_number: record.phone_number,
            updated_at: record.updated_at,
            category: CenterCategory::from(record.center_type),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(center_type: &str, lat: &str, lng: &str) -> RemoteCenterRecord {
        RemoteCenterRecord {
            id: 7,
            center_name: "코로나19 서울 예방접종센터".to_string(),
            sido: "서울특별시".to_string(),
            sigungu: "중구".to_string(),
            facility_name: "국립중앙의료원 D동".to_string(),
            zip_code: "04562".to_string(),
            address: "서울특별시 중구 을지로 39길 29".to_string(),
            lat: lat.to_string(),
            lng: lng.to_string(),
            created_at: "2021-03-03 08:00:00".to_string(),
            updated_at: "2021-07-16 04:55:08".to_string(),
            center_type: center_type.to_string(),
            org: "국립중앙의료원".to_string(),
            phone_number: "02-2260-7114".to_string(),
        }
    }

    #[test]
    fn test_transform_copies_fields() {
        let center = VaccinationCenter::try_from(record("지역", "37.567817", "127.004501"))
            .expect("valid record");
        assert_eq!(center.id, 7);
        assert_eq!(center.position, Position::new(37.567817, 127.004501));
        assert_eq!(center.facility_name, "국립중앙의료원 D동");
        assert_eq!(center.phone_number, "02-2260-7114");
        assert_eq!(center.updated_at, "2021-07-16 04:55:08");
        assert_eq!(center.category, CenterCategory::Regional);
    }

    #[test]
    fn test_category_marker_colors() {
        let central = VaccinationCenter::try_from(record("중앙/권역", "37.5", "127.0")).unwrap();
        let regional = VaccinationCenter::try_from(record("지역", "37.5", "127.0")).unwrap();
        let other = VaccinationCenter::try_from(record("임시", "37.5", "127.0")).unwrap();

        assert_eq!(central.marker_color(), MarkerColor::Transparent);
        assert_eq!(regional.marker_color(), MarkerColor::Blue);
        assert_eq!(other.marker_color(), MarkerColor::Magenta);
        assert_eq!(other.category, CenterCategory::Other("임시".to_string()));
    }

    #[test]
    fn test_category_label_round_trip() {
        for label in ["중앙/권역", "지역", "", "mobile"] {
            let category = CenterCategory::from_label(label);
            assert_eq!(category, CenterCategory::from(label.to_string()));
            assert_eq!(category.label(), label);
            assert_eq!(String::from(category), label);
        }
    }

    #[test]
    fn test_malformed_coordinate_is_rejected() {
        let err = VaccinationCenter::try_from(record("지역", "north", "127.0")).unwrap_err();
        assert_eq!(
            err,
            TransformError::InvalidCoordinate {
                field: "latitude",
                value: "north".to_string()
            }
        );

        let err = VaccinationCenter::try_from(record("지역", "37.5", "")).unwrap_err();
        assert!(matches!(err, TransformError::InvalidCoordinate { field: "longitude", .. }));
    }

    #[test]
    fn test_position_encode_decode() {
        let pos = Position::new(37.532, 127.024612);
        assert_eq!(pos.encode(), "37.532;127.024612");
        assert_eq!(Position::decode("37.532;127.024612").unwrap(), pos);
        assert_eq!(Position::decode("-33.5;151").unwrap(), Position::new(-33.5, 151.0));
    }

    #[test]
    fn test_position_decode_rejects_garbage() {
        assert!(Position::decode("37.5").is_err());
        assert!(Position::decode("37.5;").is_err());
        assert!(Position::decode("a;b").is_err());
    }
}
