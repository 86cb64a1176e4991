use std::io::{BufRead, BufReader, Lines};
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::call::{EpiDataCall, FormatType};
use crate::config::load_config;
use crate::decode::{EpiDataValue, Row};
use crate::error::{Error, Result};
use crate::table::EpiDataTable;
use crate::util::retriable_status;

/// The classic flat response envelope.
#[derive(Debug, Clone)]
pub struct ClassicResponse {
    pub result: i64,
    pub message: String,
    pub epidata: Vec<Row>,
}

#[derive(Debug, Deserialize)]
struct ClassicEnvelope {
    result: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    epidata: Vec<Value>,
}

/// Executes [`EpiDataCall`]s against the Epidata API.
///
/// Holds the base URL, the optional API key, and a blocking HTTP client.
/// All request building and row decoding is delegated to the call itself;
/// this type only adds transport: a single retry on transient failures and
/// a POST fallback when the GET URL is rejected as too long.
#[derive(Debug, Clone)]
pub struct EpiDataContext {
    base_url: String,
    api_key: Option<String>,
    http: HttpClient,
}

impl EpiDataContext {
    /// Creates a context using environment variables and/or `.epidatarc`.
    ///
    /// This is equivalent to `EpiDataContext::new(None, None)`.
    pub fn from_env() -> Result<Self> {
        Self::new(None, None)
    }

    /// Creates a context using (in order of precedence):
    /// - explicit `base_url`/`api_key` arguments
    /// - environment variables `DELPHI_EPIDATA_URL` / `DELPHI_EPIDATA_KEY`
    /// - config file from `DELPHI_EPIDATA_RC` or `.epidatarc`
    pub fn new(base_url: Option<String>, api_key: Option<String>) -> Result<Self> {
        let cfg = load_config(base_url, api_key);

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("epidata-rs/{}", env!("CARGO_PKG_VERSION")))
                .unwrap_or(HeaderValue::from_static("epidata-rs")),
        );

        let http = HttpClient::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            base_url: cfg.base_url,
            api_key: cfg.api_key,
            http,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for a call, for logging or manual use.
    pub fn request_url(&self, call: &EpiDataCall, format: FormatType) -> String {
        call.request_url(&self.base_url, format)
    }

    /// Fetches and decodes a call in the classic message format.
    pub fn classic(&self, call: &EpiDataCall) -> Result<ClassicResponse> {
        let resp = self.execute(call, FormatType::Classic)?.error_for_status()?;
        decode_classic(call, &resp.text()?)
    }

    /// Fetches and decodes a call as a JSON row list.
    pub fn json(&self, call: &EpiDataCall) -> Result<Vec<Row>> {
        self.reject_classic_only(call)?;
        let resp = self.execute(call, FormatType::Json)?.error_for_status()?;
        let rows: Vec<serde_json::Map<String, Value>> = serde_json::from_str(&resp.text()?)?;
        Ok(rows.iter().map(|m| call.parse_row(m)).collect())
    }

    /// Fetches a call as CSV text, undecoded.
    pub fn csv(&self, call: &EpiDataCall) -> Result<String> {
        self.reject_classic_only(call)?;
        let resp = self.execute(call, FormatType::Csv)?.error_for_status()?;
        Ok(resp.text()?)
    }

    /// Streams a call's rows, decoding each line-delimited JSON row as it
    /// arrives, in arrival order.
    pub fn rows(&self, call: &EpiDataCall) -> Result<RowStream> {
        self.reject_classic_only(call)?;
        let resp = self.execute(call, FormatType::Jsonl)?.error_for_status()?;
        Ok(RowStream {
            lines: BufReader::new(resp).lines(),
            call: call.clone(),
        })
    }

    /// Fetches a call and builds a column-typed table from its rows.
    pub fn table(&self, call: &EpiDataCall) -> Result<EpiDataTable> {
        let rows = self.json(call)?;
        Ok(EpiDataTable::from_rows(
            &rows,
            call.meta(),
            call.field_filter().as_ref(),
        ))
    }

    fn reject_classic_only(&self, call: &EpiDataCall) -> Result<()> {
        if call.only_supports_classic() {
            return Err(Error::OnlySupportsClassicFormat(call.endpoint().to_string()));
        }
        Ok(())
    }

    fn execute(&self, call: &EpiDataCall, format: FormatType) -> Result<Response> {
        let (url, params) = call.request_arguments(&self.base_url, format);
        debug!(endpoint = call.endpoint(), url = %url, "sending API request");
        self.request_with_retry(&url, &params)
    }

    /// One retry on connect errors and transient statuses, matching the
    /// upstream client's retry-once policy.
    fn request_with_retry(&self, url: &str, params: &[(String, String)]) -> Result<Response> {
        match self.send(url, params) {
            Ok(resp) if !retriable_status(resp.status().as_u16()) => Ok(resp),
            Ok(resp) => {
                debug!(status = %resp.status(), "retrying transient API status");
                Ok(self.send(url, params)?)
            }
            Err(err) => {
                debug!(error = %err, "retrying failed API request");
                Ok(self.send(url, params)?)
            }
        }
    }

    fn send(&self, url: &str, params: &[(String, String)]) -> reqwest::Result<Response> {
        let resp = self
            .apply_auth(self.http.get(url).query(params))
            .send()?;
        if resp.status() == StatusCode::URI_TOO_LONG {
            // The server caps URL length; re-issue with the parameters in a
            // form body instead.
            debug!("request URL too long, falling back to POST");
            return self.apply_auth(self.http.post(url).form(params)).send();
        }
        Ok(resp)
    }

    fn apply_auth(&self, req: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.api_key {
            Some(key) => req.basic_auth("epidata", Some(key.trim())),
            None => req,
        }
    }
}

fn decode_classic(call: &EpiDataCall, body: &str) -> Result<ClassicResponse> {
    let envelope: ClassicEnvelope = serde_json::from_str(body)?;
    let epidata = envelope
        .epidata
        .into_iter()
        .map(|v| match v {
            Value::Object(m) => call.parse_row(&m),
            other => Row::from_pairs(vec![("value".to_string(), EpiDataValue::from_json(&other))]),
        })
        .collect();
    Ok(ClassicResponse {
        result: envelope.result,
        message: envelope.message,
        epidata,
    })
}

/// Streaming row iterator over a line-delimited JSON response.
///
/// Each row is decoded independently as soon as its line arrives; dropping
/// the iterator simply stops consumption.
pub struct RowStream {
    lines: Lines<BufReader<Response>>,
    call: EpiDataCall,
}

impl Iterator for RowStream {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(
                serde_json::from_str::<serde_json::Map<String, Value>>(&line)
                    .map(|m| self.call.parse_row(&m))
                    .map_err(Into::into),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{EpidataFieldInfo, EpidataFieldType};

    fn fluview_call() -> EpiDataCall {
        EpiDataCall::new(
            "fluview/",
            vec![("regions", Some("nat".into()))],
            vec![
                EpidataFieldInfo::new("region", EpidataFieldType::Text),
                EpidataFieldInfo::new("epiweek", EpidataFieldType::Epiweek),
                EpidataFieldInfo::new("wili", EpidataFieldType::Float),
            ],
        )
    }

    #[test]
    fn classic_only_calls_reject_typed_formats() {
        let ctx = EpiDataContext::new(
            Some("https://example.test/epidata/".to_string()),
            Some("key".to_string()),
        )
        .unwrap();
        let call = EpiDataCall::new("meta/", vec![], vec![]).classic_only();
        assert!(matches!(
            ctx.json(&call),
            Err(Error::OnlySupportsClassicFormat(e)) if e == "meta/"
        ));
        assert!(matches!(
            ctx.csv(&call),
            Err(Error::OnlySupportsClassicFormat(_))
        ));
        assert!(matches!(
            ctx.rows(&call),
            Err(Error::OnlySupportsClassicFormat(_))
        ));
    }

    #[test]
    fn classic_envelope_decodes_rows() {
        let body = r#"{
            "result": 1,
            "message": "success",
            "epidata": [{"region": "nat", "epiweek": 201540, "wili": 1.2}]
        }"#;
        let resp = decode_classic(&fluview_call(), body).unwrap();
        assert_eq!(resp.result, 1);
        assert_eq!(resp.message, "success");
        assert_eq!(resp.epidata.len(), 1);
        assert_eq!(
            resp.epidata[0].get("epiweek"),
            Some(&EpiDataValue::Week(
                crate::temporal::EpiWeek::new(2015, 40).unwrap()
            ))
        );
    }

    #[test]
    fn classic_envelope_tolerates_missing_epidata() {
        let body = r#"{"result": -2, "message": "no results"}"#;
        let resp = decode_classic(&fluview_call(), body).unwrap();
        assert_eq!(resp.result, -2);
        assert!(resp.epidata.is_empty());
    }
}
