use std::fmt;

use crate::decode::{Row, decode_row};
use crate::meta::{EpidataFieldInfo, FieldFilter, FieldRegistry};
use crate::params::{EpiRangeParam, format_list};
use crate::util::{add_endpoint_to_url, build_query};

/// Response encoding requested from the API. Classic is the default flat
/// envelope and adds no `format` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    Classic,
    Json,
    Csv,
    Jsonl,
}

impl FormatType {
    fn as_param(&self) -> Option<&'static str> {
        match self {
            FormatType::Classic => None,
            FormatType::Json => Some("json"),
            FormatType::Csv => Some("csv"),
            FormatType::Jsonl => Some("jsonl"),
        }
    }
}

/// One fully-specified, not-yet-executed request against an endpoint.
///
/// A pure value: building, formatting, and row decoding never touch the
/// network. Execution belongs to [`EpiDataContext`](crate::EpiDataContext).
#[derive(Debug, Clone)]
pub struct EpiDataCall {
    endpoint: String,
    params: Vec<(String, Option<EpiRangeParam>)>,
    meta: FieldRegistry,
    only_supports_classic: bool,
    fields: Option<Vec<String>>,
    disable_date_parsing: bool,
}

impl EpiDataCall {
    pub(crate) fn new(
        endpoint: &str,
        params: Vec<(&str, Option<EpiRangeParam>)>,
        meta: Vec<EpidataFieldInfo>,
    ) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            params: params
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            meta: FieldRegistry::new(meta),
            only_supports_classic: false,
            fields: None,
            disable_date_parsing: false,
        }
    }

    pub(crate) fn classic_only(mut self) -> Self {
        self.only_supports_classic = true;
        self
    }

    /// Restricts the result to the named fields. A bare name includes, a
    /// `-` prefix excludes; the list is also transmitted as the `fields`
    /// request parameter.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Leaves date, epiweek, and date-or-epiweek fields in their raw wire
    /// form instead of parsing them.
    pub fn with_raw_dates(mut self) -> Self {
        self.disable_date_parsing = true;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn meta(&self) -> &FieldRegistry {
        &self.meta
    }

    pub fn only_supports_classic(&self) -> bool {
        self.only_supports_classic
    }

    pub(crate) fn field_filter(&self) -> Option<FieldFilter> {
        self.fields.as_ref().map(FieldFilter::new)
    }

    /// Formats the stored parameters for the wire: `None` values are
    /// dropped entirely, everything else goes through the comma/dash
    /// grammar, then the optional `fields` list and `format` are appended.
    pub fn request_params(&self, format: FormatType) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = self
            .params
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), format_list(v))))
            .collect();
        if let Some(fields) = &self.fields {
            out.push(("fields".to_string(), fields.join(",")));
        }
        if let Some(f) = format.as_param() {
            out.push(("format".to_string(), f.to_string()));
        }
        out
    }

    /// The `(url, ordered params)` pair ready for the transport layer.
    pub fn request_arguments(
        &self,
        base_url: &str,
        format: FormatType,
    ) -> (String, Vec<(String, String)>) {
        let url = add_endpoint_to_url(base_url, &self.endpoint);
        (url, self.request_params(format))
    }

    /// Full request URL with an encoded query string.
    pub fn request_url(&self, base_url: &str, format: FormatType) -> String {
        let (url, params) = self.request_arguments(base_url, format);
        let query = build_query(&params);
        if query.is_empty() {
            url
        } else {
            format!("{url}?{query}")
        }
    }

    /// Decodes one raw row against this call's field registry.
    pub fn parse_row(&self, raw: &serde_json::Map<String, serde_json::Value>) -> Row {
        decode_row(raw, &self.meta, self.disable_date_parsing)
    }
}

impl fmt::Display for EpiDataCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EpiDataCall(endpoint={}", self.endpoint)?;
        for (k, v) in self.request_params(FormatType::Classic) {
            write!(f, ", {k}={v}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::EpidataFieldType;
    use crate::params::EpiRangeParam;
    use crate::range::EpiRange;

    fn call() -> EpiDataCall {
        EpiDataCall::new(
            "fluview/",
            vec![
                ("regions", Some(EpiRangeParam::list(["nat", "hhs1"]))),
                (
                    "epiweeks",
                    Some(EpiRange::new("201501", "201510").unwrap().into()),
                ),
                ("issues", None),
                ("lag", None),
            ],
            vec![EpidataFieldInfo::new("region", EpidataFieldType::Text)],
        )
    }

    #[test]
    fn none_params_are_dropped() {
        let params = call().request_params(FormatType::Classic);
        let keys: Vec<_> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["regions", "epiweeks"]);
    }

    #[test]
    fn request_url_joins_with_single_slash() {
        let url = call().request_url("https://api.delphi.cmu.edu/epidata", FormatType::Classic);
        assert_eq!(
            url,
            "https://api.delphi.cmu.edu/epidata/fluview/?regions=nat%2Chhs1&epiweeks=201501-201510"
        );
        // A trailing slash on the base must not double up.
        let url = call().request_url("https://api.delphi.cmu.edu/epidata/", FormatType::Classic);
        assert!(url.starts_with("https://api.delphi.cmu.edu/epidata/fluview/?"));
    }

    #[test]
    fn format_and_fields_params_are_appended() {
        let params = call()
            .with_fields(["region", "-lag"])
            .request_params(FormatType::Json);
        assert_eq!(
            params.last(),
            Some(&("format".to_string(), "json".to_string()))
        );
        assert!(
            params
                .iter()
                .any(|(k, v)| k == "fields" && v == "region,-lag")
        );
    }

    #[test]
    fn classic_adds_no_format_param() {
        let params = call().request_params(FormatType::Classic);
        assert!(!params.iter().any(|(k, _)| k == "format"));
    }
}
