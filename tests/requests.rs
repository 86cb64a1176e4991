//! End-to-end request building and decoding against the public API. No
//! network access: calls are built and inspected, rows are decoded from
//! inline JSON.

use epidata::{
    ColumnValues, EpiDataContext, EpiDataValue, EpiRange, EpiWeek, EpidataFieldInfo,
    EpidataFieldType, Error, FieldRegistry, FormatType, GeoType, Row, TimeType, decode_row,
};

fn ctx() -> EpiDataContext {
    EpiDataContext::new(
        Some("https://example.test/epidata/".to_string()),
        Some("secret".to_string()),
    )
    .unwrap()
}

#[test]
fn fluview_request_url() {
    let ctx = ctx();
    let call = ctx
        .pub_fluview("nat", EpiRange::new("201540", "201620").unwrap(), None, None, None)
        .unwrap();
    assert_eq!(
        ctx.request_url(&call, FormatType::Classic),
        "https://example.test/epidata/fluview/?regions=nat&epiweeks=201540-201620"
    );
    assert_eq!(
        ctx.request_url(&call, FormatType::Json),
        "https://example.test/epidata/fluview/?regions=nat&epiweeks=201540-201620&format=json"
    );
}

#[test]
fn fluview_wildcard_expands_to_week_span() {
    let ctx = ctx();
    let wildcard = ctx.pub_fluview("nat", "*", None, None, None).unwrap();
    let explicit = ctx
        .pub_fluview("nat", EpiRange::new(100001, 300001).unwrap(), None, None, None)
        .unwrap();
    assert_eq!(
        ctx.request_url(&wildcard, FormatType::Classic),
        ctx.request_url(&explicit, FormatType::Classic)
    );
}

#[test]
fn range_construction_is_order_independent() {
    let a = EpiRange::new(20000101, 20000102).unwrap();
    let b = EpiRange::new(20000102, 20000101).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_string(), "20000101-20000102");
}

#[test]
fn range_rejects_malformed_input() {
    assert!(matches!(
        EpiRange::new("2020/04/05", 20200410),
        Err(Error::ParseDateOrWeek(v)) if v == "2020/04/05"
    ));
}

#[test]
fn fields_filter_is_sent_and_applied() {
    let ctx = ctx();
    let call = ctx
        .pub_fluview("nat", "*", None, None, None)
        .unwrap()
        .with_fields(["region", "epiweek", "wili"]);
    let url = ctx.request_url(&call, FormatType::Json);
    assert!(url.contains("fields=region%2Cepiweek%2Cwili"));
}

#[test]
fn classic_only_endpoint_rejects_typed_fetches() {
    let ctx = ctx();
    let call = ctx.pub_meta().unwrap();
    assert!(matches!(
        ctx.json(&call),
        Err(Error::OnlySupportsClassicFormat(endpoint)) if endpoint == "meta/"
    ));
}

#[test]
fn covidcast_rows_decode_with_registry_types() {
    let ctx = ctx();
    let call = ctx
        .pub_covidcast(
            "fb-survey",
            "smoothed_cli",
            GeoType::State,
            TimeType::Day,
            "pa",
            "*",
            None,
            None,
            None,
        )
        .unwrap();

    let raw = serde_json::json!({
        "geo_value": "pa",
        "time_value": 20200405,
        "issue": 20200410,
        "lag": 5,
        "value": 1.25,
        "stderr": null,
        "time_type": "day"
    });
    let row = call.parse_row(raw.as_object().unwrap());

    assert_eq!(
        row.get("time_value"),
        Some(&EpiDataValue::Date(
            chrono::NaiveDate::from_ymd_opt(2020, 4, 5).unwrap()
        ))
    );
    assert_eq!(row.get("lag"), Some(&EpiDataValue::Int(5)));
    assert_eq!(row.get("stderr"), Some(&EpiDataValue::Null));
    assert_eq!(row.get("value"), Some(&EpiDataValue::Float(1.25)));
}

#[test]
fn week_valued_time_fields_decode_as_weeks() {
    let registry = FieldRegistry::new(vec![EpidataFieldInfo::new(
        "time_value",
        EpidataFieldType::DateOrEpiweek,
    )]);
    let raw = serde_json::json!({"time_value": "202015"});
    let row = decode_row(raw.as_object().unwrap(), &registry, false);
    let week = EpiWeek::new(2020, 15).unwrap();
    assert_eq!(row.get("time_value"), Some(&EpiDataValue::Week(week)));
    assert_eq!(
        week.start_date(),
        chrono::NaiveDate::from_ymd_opt(2020, 4, 5).unwrap()
    );
}

#[test]
fn table_from_decoded_rows() {
    let registry = FieldRegistry::new(vec![
        EpidataFieldInfo::new("region", EpidataFieldType::Text),
        EpidataFieldInfo::new("epiweek", EpidataFieldType::Epiweek),
        EpidataFieldInfo::new("num_ili", EpidataFieldType::Int),
        EpidataFieldInfo::new("wili", EpidataFieldType::Float),
    ]);
    let rows: Vec<Row> = [
        serde_json::json!({"region": "nat", "epiweek": 201540, "num_ili": 13655, "wili": 1.1}),
        serde_json::json!({"region": "nat", "epiweek": 201541, "num_ili": null, "wili": 1.2}),
    ]
    .iter()
    .map(|v| decode_row(v.as_object().unwrap(), &registry, false))
    .collect();

    let table = epidata::EpiDataTable::from_rows(&rows, &registry, None);
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.column("num_ili").unwrap().values,
        ColumnValues::Int(vec![Some(13655), None])
    );
    assert_eq!(
        table.column("epiweek").unwrap().values,
        ColumnValues::Week(vec![
            Some(EpiWeek::new(2015, 40).unwrap()),
            Some(EpiWeek::new(2015, 41).unwrap()),
        ])
    );
}

#[test]
fn raw_dates_mode_keeps_wire_values() {
    let ctx = ctx();
    let call = ctx
        .pub_fluview("nat", "*", None, None, None)
        .unwrap()
        .with_raw_dates();
    let raw = serde_json::json!({"epiweek": 201540, "release_date": "20151016"});
    let row = call.parse_row(raw.as_object().unwrap());
    assert_eq!(row.get("epiweek"), Some(&EpiDataValue::Int(201540)));
    assert_eq!(
        row.get("release_date"),
        Some(&EpiDataValue::Text("20151016".to_string()))
    );
}
