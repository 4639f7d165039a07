//! Report payloads and their delivery to the score callback.

use crate::score::{format_metric, format_score, ScoreReport};
use crate::Result;
use serde::Serialize;
use std::time::Duration;

/// Status of an accepted evaluation.
pub const STATUS_SUCCESS: i32 = 0;

/// Status of a rejected or failed evaluation.
pub const STATUS_ERROR: i32 = -1;

/// Report sent when a submission fails validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    #[serde(rename = "Score")]
    pub score: i32,
    #[serde(rename = "MOTA")]
    pub mota: i32,
    #[serde(rename = "MOTP")]
    pub motp: i32,
    pub status: i32,
    pub message: String,
    #[serde(rename = "unionKey")]
    pub union_key: String,
}

impl ErrorPayload {
    pub fn new(message: impl Into<String>, union_key: impl Into<String>) -> Self {
        Self {
            score: -1,
            mota: -1,
            motp: -1,
            status: STATUS_ERROR,
            message: message.into(),
            union_key: union_key.into(),
        }
    }
}

/// Report sent after a successful evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorePayload {
    #[serde(rename = "unionKey")]
    pub union_key: String,
    #[serde(rename = "Score")]
    pub score: String,
    #[serde(rename = "MOTA")]
    pub mota: String,
    #[serde(rename = "MOTP")]
    pub motp: String,
    pub status: i32,
    pub message: String,
}

impl ScorePayload {
    /// Build the payload for a score with status 0.
    pub fn new(report: &ScoreReport, union_key: impl Into<String>) -> Self {
        Self::with_status(report, union_key, STATUS_SUCCESS)
    }

    /// Build the payload with an explicit status.
    ///
    /// A result whose Score, MOTA and MOTP all render as `0.0` is reported as
    /// an error.
    pub fn with_status(report: &ScoreReport, union_key: impl Into<String>, status: i32) -> Self {
        let message = if status == STATUS_SUCCESS {
            "Success"
        } else {
            "Wrong user results directory."
        };

        let mut payload = Self {
            union_key: union_key.into(),
            score: format_score(report.score),
            mota: format_metric(report.detail.mota),
            motp: format_metric(report.detail.motp),
            status,
            message: message.to_string(),
        };

        if payload.score == "0.0" && payload.mota == "0.0" && payload.motp == "0.0" {
            payload.status = STATUS_ERROR;
            payload.message = "Error!".to_string();
        }
        payload
    }
}

/// Either report shape, serialized as a flat JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportPayload {
    Error(ErrorPayload),
    Score(ScorePayload),
}

impl ReportPayload {
    pub fn status(&self) -> i32 {
        match self {
            ReportPayload::Error(p) => p.status,
            ReportPayload::Score(p) => p.status,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ReportPayload::Error(p) => &p.message,
            ReportPayload::Score(p) => &p.message,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<ErrorPayload> for ReportPayload {
    fn from(payload: ErrorPayload) -> Self {
        ReportPayload::Error(payload)
    }
}

impl From<ScorePayload> for ReportPayload {
    fn from(payload: ScorePayload) -> Self {
        ReportPayload::Score(payload)
    }
}

/// Destination of evaluation reports.
pub trait ReportSink {
    /// Deliver one report. Delivery is attempted once.
    fn deliver(&self, payload: &ReportPayload) -> Result<()>;
}

impl<T: ReportSink + ?Sized> ReportSink for &T {
    fn deliver(&self, payload: &ReportPayload) -> Result<()> {
        (**self).deliver(payload)
    }
}

/// POSTs reports as JSON to the score callback URL.
#[derive(Debug, Clone)]
pub struct HttpReporter {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpReporter {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl ReportSink for HttpReporter {
    fn deliver(&self, payload: &ReportPayload) -> Result<()> {
        let response = self.client.post(&self.url).json(payload).send()?;
        tracing::info!(
            status = response.status().as_u16(),
            "Report delivered to {}",
            self.url
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::ScoreDetail;
    use serde_json::{json, Value};
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn report(score: f64, mota: f64, motp: f64) -> ScoreReport {
        ScoreReport {
            score,
            detail: ScoreDetail {
                mota,
                motp,
                idf1: 0.5,
                mostly_tracked: 1.0,
                mostly_lost: 0.0,
                false_positives: 0.0,
                misses: 0.0,
                switches: 0.0,
                fragmentations: 0.0,
            },
        }
    }

    #[test]
    fn test_error_payload_shape() {
        let payload = ReportPayload::from(ErrorPayload::new("Cannot find results.zip file!", "key-1"));
        let value: Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "Score": -1,
                "MOTA": -1,
                "MOTP": -1,
                "status": -1,
                "message": "Cannot find results.zip file!",
                "unionKey": "key-1",
            })
        );
    }

    #[test]
    fn test_score_payload_shape() {
        let payload = ScorePayload::new(&report(2.0 * 0.8 * 0.7 / 1.5, 0.8, 0.7), "key-2");
        let value = serde_json::to_value(ReportPayload::from(payload)).unwrap();

        assert_eq!(
            value,
            json!({
                "unionKey": "key-2",
                "Score": "0.74667",
                "MOTA": "0.8",
                "MOTP": "0.7",
                "status": 0,
                "message": "Success",
            })
        );
    }

    #[test]
    fn test_json_error_variant() {
        let err = serde_json::from_str::<Value>("{").unwrap_err();
        assert!(matches!(crate::Error::from(err), crate::Error::SerializationError(_)));
    }

    #[test]
    fn test_score_payload_all_zero_is_error() {
        let payload = ScorePayload::new(&report(f64::NAN, -0.2, f64::NAN), "k");
        assert_eq!(payload.score, "0.0");
        assert_eq!(payload.mota, "0.0");
        assert_eq!(payload.motp, "0.0");
        assert_eq!(payload.status, STATUS_ERROR);
        assert_eq!(payload.message, "Error!");
    }

    #[test]
    fn test_score_payload_status_override() {
        let payload = ScorePayload::with_status(&report(0.5, 0.5, 0.5), "k", 1);
        assert_eq!(payload.status, 1);
        assert_eq!(payload.message, "Wrong user results directory.");
    }

    #[test]
    fn test_http_reporter_posts_json() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/score", listener.local_addr().unwrap());

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut headers = Vec::new();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" {
                    break;
                }
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
                headers.push(line);
            }
            let mut body = vec![0; content_length];
            reader.read_exact(&mut body).unwrap();
            reader
                .get_mut()
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .unwrap();
            (headers, String::from_utf8(body).unwrap())
        });

        let reporter = HttpReporter::new(&url, Duration::from_secs(5)).unwrap();
        let payload = ReportPayload::from(ErrorPayload::new("boom", "k"));
        reporter.deliver(&payload).unwrap();

        let (headers, body) = server.join().unwrap();
        assert!(headers[0].starts_with("POST /score"));
        assert!(headers
            .iter()
            .any(|h| h.to_ascii_lowercase().starts_with("content-type: application/json")));
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["message"], "boom");
        assert_eq!(value["status"], -1);
    }

    #[test]
    fn test_http_reporter_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/score", listener.local_addr().unwrap());
        drop(listener);

        let reporter = HttpReporter::new(url, Duration::from_secs(1)).unwrap();
        let payload = ReportPayload::from(ErrorPayload::new("boom", "k"));
        assert!(reporter.deliver(&payload).is_err());
    }
}
