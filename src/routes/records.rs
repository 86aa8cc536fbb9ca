use axum::{
    extract::{Query, State},
    http::{
        header::{self, HeaderMap, HeaderValue},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OwnedSemaphorePermit;
use tokio_stream::wrappers::ReceiverStream;
use utoipa::{IntoParams, ToSchema};

use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::weather::{CompositeRecord, Quantity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Ndjson,
}

impl ExportFormat {
    fn parse(s: &str) -> AppResult<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "ndjson" => Ok(Self::Ndjson),
            other => Err(AppError::BadRequest(format!(
                "unsupported format '{other}' (expected json, csv or ndjson)"
            ))),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecordsResponse {
    /// Earliest record instant (null if no data)
    pub start: Option<DateTime<Utc>>,
    /// Latest record instant (null if no data)
    pub end: Option<DateTime<Utc>>,
    pub count: usize,
    /// Records in chronological order
    pub records: Vec<CompositeRecord>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RecordsQuery {
    /// Response format: json (default), ndjson, csv
    pub format: Option<String>,
}

/// Pick the format from the query parameter, then the `Accept` header.
pub fn determine_format(query_format: Option<&str>, headers: &HeaderMap) -> AppResult<ExportFormat> {
    if let Some(format) = query_format {
        return ExportFormat::parse(format);
    }

    if let Some(accept) = headers.get(header::ACCEPT)
        && let Ok(accept_str) = accept.to_str()
    {
        if accept_str.contains("application/x-ndjson") {
            return Ok(ExportFormat::Ndjson);
        }
        if accept_str.contains("text/csv") {
            return Ok(ExportFormat::Csv);
        }
    }

    Ok(ExportFormat::Json)
}

/// CSV header: `timestamp` then one column per quantity key.
#[must_use]
pub fn csv_header() -> Vec<&'static str> {
    std::iter::once("timestamp")
        .chain(Quantity::ALL.into_iter().map(Quantity::key))
        .collect()
}

/// Encode one CSV line (with trailing newline).
///
/// # Errors
///
/// Returns `AppError::Internal` if the CSV writer fails.
pub fn csv_row<I, S>(fields: I) -> AppResult<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(fields)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(e.to_string()))
}

/// CSV cells for `record`; unknown values are empty.
#[must_use]
pub fn record_fields(record: &CompositeRecord) -> Vec<String> {
    std::iter::once(record.timestamp.clone())
        .chain(
            Quantity::ALL
                .into_iter()
                .map(|q| record.get(q).map(|v| v.to_string()).unwrap_or_default()),
        )
        .collect()
}

fn build_csv_response(
    records: Arc<Vec<CompositeRecord>>,
    permit: OwnedSemaphorePermit,
) -> AppResult<Response> {
    let header_line = csv_header();
    let (tx, rx) = tokio::sync::mpsc::channel::<Result<String, std::io::Error>>(100);

    tokio::spawn(async move {
        let _permit = permit;

        match csv_row(header_line) {
            Ok(line) => {
                let _ = tx.send(Ok(line)).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to write CSV header");
                return;
            }
        }

        for record in records.iter() {
            let line = match csv_row(record_fields(record)) {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!(error = %e, timestamp = %record.timestamp, "Failed to write CSV row");
                    break;
                }
            };
            if tx.send(Ok(line)).await.is_err() {
                break;
            }
        }
    });

    let stream = ReceiverStream::new(rx);
    let body = axum::body::Body::from_stream(stream);

    Response::builder()
        .header(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"))
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}

fn build_ndjson_response(
    records: Arc<Vec<CompositeRecord>>,
    permit: OwnedSemaphorePermit,
) -> AppResult<Response> {
    let (tx, rx) = tokio::sync::mpsc::channel::<Result<String, std::io::Error>>(100);

    tokio::spawn(async move {
        let _permit = permit;

        for record in records.iter() {
            let line = match serde_json::to_string(record) {
                Ok(json) => format!("{json}\n"),
                Err(e) => {
                    tracing::error!(error = %e, timestamp = %record.timestamp, "Failed to serialize record");
                    break;
                }
            };
            if tx.send(Ok(line)).await.is_err() {
                break;
            }
        }
    });

    let stream = ReceiverStream::new(rx);
    let body = axum::body::Body::from_stream(stream);

    Response::builder()
        .header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-ndjson"),
        )
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Get the composite records of the current snapshot
///
/// One record per timestamp, in chronological order. Supports JSON, CSV and
/// NDJSON formats.
#[utoipa::path(
    get,
    path = "/api/records",
    params(RecordsQuery),
    responses(
        (status = 200, description = "Records retrieved successfully", body = RecordsResponse),
        (status = 400, description = "Unsupported format"),
        (status = 503, description = "Too many concurrent exports"),
    ),
    tag = "records"
)]
pub async fn get_records(
    State(state): State<AppState>,
    Query(query): Query<RecordsQuery>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let format = determine_format(query.format.as_deref(), &headers)?;
    let records = Arc::clone(&state.dashboard.snapshot().records);

    if format == ExportFormat::Json {
        let response = RecordsResponse {
            start: records.first().and_then(|r| r.time),
            end: records.iter().rev().find_map(|r| r.time),
            count: records.len(),
            records: records.to_vec(),
        };
        return Ok(Json(response).into_response());
    }

    let Ok(permit) = Arc::clone(&state.export_permits).try_acquire_owned() else {
        tracing::warn!(
            format = ?format,
            status = StatusCode::SERVICE_UNAVAILABLE.as_u16(),
            "export_request_rejected"
        );
        return Err(AppError::ServiceUnavailable(
            "Too many concurrent exports. Please try again later.".to_string(),
        ));
    };

    match format {
        ExportFormat::Csv => build_csv_response(records, permit),
        ExportFormat::Ndjson | ExportFormat::Json => build_ndjson_response(records, permit),
    }
}
