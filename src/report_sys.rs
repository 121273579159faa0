use std::path::PathBuf;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value as JsonValue};
use log::info;

use crate::error::ReportError;
use crate::photo;
use crate::store::{Document, DocumentStore, OrderBy};


pub const REPORT_COLLECTION: &'static str = "reportes";
pub const DEFAULT_REPORT_TYPE: &'static str = "general";
const ORDER_FIELD: &'static str = "created_at";


/// A report submission as posted by clients.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSubmission {
    #[serde(rename = "latitud", deserialize_with = "deserialize_coordinate")]
    pub latitude: f64,
    #[serde(rename = "longitud", deserialize_with = "deserialize_coordinate")]
    pub longitude: f64,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "foto_base64", default)]
    pub photo: Option<String>,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "tipo_reporte", default)]
    pub report_type: Option<String>,
}


/// Accepts a coordinate as a JSON number or a numeric string.
fn deserialize_coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error> where
    D: Deserializer<'de> {

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Coordinate {
        Number(f64),
        Text(String),
    }

    let value = match Coordinate::deserialize(deserializer)? {
        Coordinate::Number(n) => Some(n),
        Coordinate::Text(s) => s.trim().parse::<f64>().ok(),
    };

    value.filter(|n| n.is_finite())
        .ok_or_else(|| de::Error::custom("coordinate must be a finite number"))
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    #[serde(rename = "latitud")]
    pub latitude: f64,
    #[serde(rename = "longitud")]
    pub longitude: f64,
    pub timestamp: String,
    #[serde(rename = "foto_base64")]
    pub photo_path: String,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "tipo_reporte")]
    pub report_type: String,
    #[serde(skip)]
    pub created_at: String,
}

impl Report {
    fn from_document(doc: Document) -> Self {
        let fields = &doc.fields;

        let string_field = |name: &str| fields.get(name)
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_owned();

        let description = match fields.get("descripcion") {
            None => Some(String::new()),
            Some(JsonValue::String(s)) => Some(s.clone()),
            Some(_) => None,
        };

        Report {
            latitude: fields.get("latitud").and_then(JsonValue::as_f64).unwrap_or(0.0),
            longitude: fields.get("longitud").and_then(JsonValue::as_f64).unwrap_or(0.0),
            timestamp: string_field("timestamp"),
            photo_path: string_field("foto_base64"),
            description,
            report_type: fields.get("tipo_reporte")
                .and_then(JsonValue::as_str)
                .unwrap_or(DEFAULT_REPORT_TYPE)
                .to_owned(),
            created_at: string_field(ORDER_FIELD),
            id: doc.id,
        }
    }

    fn to_fields(&self) -> Map<String, JsonValue> {
        let doc = json!({
            "latitud": self.latitude,
            "longitud": self.longitude,
            "timestamp": self.timestamp,
            "foto_base64": self.photo_path,
            "descripcion": self.description,
            "tipo_reporte": self.report_type,
            "created_at": self.created_at,
        });

        match doc {
            JsonValue::Object(fields) => fields,
            _ => Map::new(),
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportStats {
    pub total_reportes: usize,
    pub ultimo_reporte: Option<String>,
}


/// Parses a client timestamp in any of the ISO-8601 forms clients send.
/// Date-times without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }

    let zoned = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"];
    if let Some(dt) = zoned.iter().find_map(|f| DateTime::parse_from_str(raw, f).ok()) {
        return Some(dt);
    }

    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];
    naive.iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|dt| dt.and_utc().fixed_offset())
}

pub fn format_timestamp(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Write time in a fixed-width form so that string order is time order.
fn write_time() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}


/// Report ingestion and queries over a document store.
pub struct ReportSys {
    store: Box<dyn DocumentStore>,
    image_dir: PathBuf,
}

impl ReportSys {
    pub fn new(store: Box<dyn DocumentStore>, image_dir: PathBuf) -> Self {
        ReportSys {
            store,
            image_dir,
        }
    }

    pub async fn create_report(&self, submission: ReportSubmission) -> Result<Report, ReportError> {
        let time = submission.timestamp.as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_else(|| Utc::now().fixed_offset());

        let photo_path = match submission.photo {
            Some(photo) if !photo.is_empty() => {
                photo::save_photo(photo, &self.image_dir, time.timestamp()).await?
            },
            _ => String::new(),
        };

        let report_type = submission.report_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_REPORT_TYPE.into());

        let mut report = Report {
            id: String::new(),
            latitude: submission.latitude,
            longitude: submission.longitude,
            timestamp: format_timestamp(&time),
            photo_path,
            description: submission.description,
            report_type,
            created_at: write_time(),
        };

        report.id = self.store.create(REPORT_COLLECTION, report.to_fields()).await?;

        info!("Report {} created at ({}, {})", report.id, report.latitude, report.longitude);

        Ok(report)
    }

    /// All reports, newest first.
    pub async fn list_reports(&self) -> Result<Vec<Report>, ReportError> {
        let docs = self.store
            .query(REPORT_COLLECTION, Some(&OrderBy::desc(ORDER_FIELD)), None)
            .await?;

        Ok(docs.into_iter().map(Report::from_document).collect())
    }

    pub async fn stats(&self) -> Result<ReportStats, ReportError> {
        let total = self.store.query(REPORT_COLLECTION, None, None).await?.len();

        let latest = self.store
            .query(REPORT_COLLECTION, Some(&OrderBy::desc(ORDER_FIELD)), Some(1))
            .await?;

        Ok(ReportStats {
            total_reportes: total,
            ultimo_reporte: latest.first()
                .and_then(|d| d.fields.get("timestamp"))
                .and_then(JsonValue::as_str)
                .map(str::to_owned),
        })
    }
}
