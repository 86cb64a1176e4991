use std::fmt;

use tracing::warn;

use crate::call::EpiDataCall;
use crate::client::EpiDataContext;
use crate::error::{Error, Result};
use crate::meta::{EpidataFieldInfo, EpidataFieldType};
use crate::params::{EpiDateLike, EpiRangeLike, EpiRangeParam, IntParam, StringParam};
use crate::range::{EpiRange, wildcard_equivalent_dates};
use crate::temporal::{EpiTimeValue, TimeType};

/// Geographic resolution of a covidcast signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoType {
    Nation,
    Msa,
    Hrr,
    Hhs,
    State,
    County,
}

impl GeoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeoType::Nation => "nation",
            GeoType::Msa => "msa",
            GeoType::Hrr => "hrr",
            GeoType::Hhs => "hhs",
            GeoType::State => "state",
            GeoType::County => "county",
        }
    }
}

impl fmt::Display for GeoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<GeoType> for EpiRangeParam {
    fn from(v: GeoType) -> Self {
        EpiRangeParam::from(v.as_str())
    }
}

impl From<TimeType> for EpiRangeParam {
    fn from(v: TimeType) -> Self {
        EpiRangeParam::from(v.as_str())
    }
}

fn fields_of(names: &[&str], field_type: EpidataFieldType) -> Vec<EpidataFieldInfo> {
    names
        .iter()
        .map(|n| EpidataFieldInfo::new(n, field_type))
        .collect()
}

fn f(name: &str, field_type: EpidataFieldType) -> EpidataFieldInfo {
    EpidataFieldInfo::new(name, field_type)
}

/// Result schema of the covidcast endpoint, shared by `pub_covidcast`.
fn define_covidcast_fields() -> Vec<EpidataFieldInfo> {
    use EpidataFieldType::*;
    vec![
        f("source", Text),
        f("signal", Text),
        EpidataFieldInfo::categorical(
            "geo_type",
            &["nation", "msa", "hrr", "hhs", "state", "county"],
        ),
        f("geo_value", Text),
        EpidataFieldInfo::categorical("time_type", &["week", "day"]),
        f("time_value", DateOrEpiweek),
        f("issue", DateOrEpiweek),
        f("lag", Int),
        f("value", Float),
        f("stderr", Float),
        f("sample_size", Float),
        f("direction", Float),
        f("missing_value", Int),
        f("missing_stderr", Int),
        f("missing_sample_size", Int),
    ]
}

/// Endpoint catalog. Each method builds a pure [`EpiDataCall`]: wildcard
/// time parameters are expanded, mutually exclusive arguments are rejected,
/// and the endpoint's field registry is attached. Nothing here touches the
/// network.
impl EpiDataContext {
    /// Fetch CDC page hits.
    pub fn pvt_cdc(
        &self,
        auth: &str,
        locations: impl Into<StringParam>,
        epiweeks: impl Into<EpiRangeParam>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        let epiweeks = wildcard_equivalent_dates(epiweeks.into(), TimeType::Day);

        Ok(EpiDataCall::new(
            "cdc/",
            vec![
                ("auth", Some(auth.into())),
                ("epiweeks", Some(epiweeks)),
                ("locations", Some(locations.into().into())),
            ],
            [
                vec![f("location", Text), f("epiweek", Epiweek)],
                fields_of(
                    &["num1", "num2", "num3", "num4", "num5", "num6", "num7", "num8", "total"],
                    Int,
                ),
                vec![f("value", Float)],
            ]
            .concat(),
        ))
    }

    /// Lookup COVID hospitalization facility identifiers.
    pub fn pub_covid_hosp_facility_lookup(
        &self,
        state: Option<&str>,
        ccn: Option<&str>,
        city: Option<&str>,
        zip: Option<&str>,
        fips_code: Option<&str>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        if [state, ccn, city, zip, fips_code].iter().all(Option::is_none) {
            return Err(Error::InvalidArgument(
                "one of `state`, `ccn`, `city`, `zip`, or `fips_code` is required".to_string(),
            ));
        }

        let text = |v: Option<&str>| v.map(EpiRangeParam::from);
        Ok(EpiDataCall::new(
            "covid_hosp_facility_lookup/",
            vec![
                ("state", text(state)),
                ("ccn", text(ccn)),
                ("city", text(city)),
                ("zip", text(zip)),
                ("fips_code", text(fips_code)),
            ],
            [
                fields_of(
                    &[
                        "hospital_pk",
                        "state",
                        "ccn",
                        "hospital_name",
                        "address",
                        "city",
                        "zip",
                        "hospital_subtype",
                        "fips_code",
                    ],
                    Text,
                ),
                vec![f("is_metro_micro", Int)],
            ]
            .concat(),
        ))
    }

    /// Fetch COVID hospitalization data for specific facilities.
    pub fn pub_covid_hosp_facility(
        &self,
        hospital_pks: impl Into<StringParam>,
        collection_weeks: impl Into<EpiRangeParam>,
        publication_dates: Option<EpiRangeParam>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        let collection_weeks = wildcard_equivalent_dates(collection_weeks.into(), TimeType::Day);

        // The endpoint expects `collection_weeks` in day format even though
        // the values correspond to epiweeks. Week-format input is accepted
        // and converted to the week's start date.
        let collection_weeks = convert_collection_weeks_to_days(collection_weeks)?;

        let fields_string = [
            "hospital_pk",
            "state",
            "ccn",
            "hospital_name",
            "address",
            "city",
            "zip",
            "hospital_subtype",
            "fips_code",
        ];
        let fields_int = [
            "total_beds_7_day_sum",
            "all_adult_hospital_beds_7_day_sum",
            "all_adult_hospital_inpatient_beds_7_day_sum",
            "inpatient_beds_used_7_day_sum",
            "all_adult_hospital_inpatient_bed_occupied_7_day_sum",
            "total_adult_patients_hosp_confirmed_suspected_covid_7d_sum",
            "total_adult_patients_hospitalized_confirmed_covid_7_day_sum",
            "total_pediatric_patients_hosp_confirmed_suspected_covid_7d_sum",
            "total_pediatric_patients_hospitalized_confirmed_covid_7_day_sum",
            "inpatient_beds_7_day_sum",
            "total_icu_beds_7_day_sum",
            "total_staffed_adult_icu_beds_7_day_sum",
            "icu_beds_used_7_day_sum",
            "staffed_adult_icu_bed_occupancy_7_day_sum",
            "staffed_icu_adult_patients_confirmed_suspected_covid_7d_sum",
            "staffed_icu_adult_patients_confirmed_covid_7_day_sum",
            "total_patients_hospitalized_confirmed_influenza_7_day_sum",
            "icu_patients_confirmed_influenza_7_day_sum",
            "total_patients_hosp_confirmed_influenza_and_covid_7d_sum",
            "total_beds_7_day_coverage",
            "all_adult_hospital_beds_7_day_coverage",
            "all_adult_hospital_inpatient_beds_7_day_coverage",
            "inpatient_beds_used_7_day_coverage",
            "all_adult_hospital_inpatient_bed_occupied_7_day_coverage",
            "total_adult_patients_hosp_confirmed_suspected_covid_7d_cov",
            "total_adult_patients_hospitalized_confirmed_covid_7_day_coverage",
            "total_pediatric_patients_hosp_confirmed_suspected_covid_7d_cov",
            "total_pediatric_patients_hosp_confirmed_covid_7d_cov",
            "inpatient_beds_7_day_coverage",
            "total_icu_beds_7_day_coverage",
            "total_staffed_adult_icu_beds_7_day_coverage",
            "icu_beds_used_7_day_coverage",
            "staffed_adult_icu_bed_occupancy_7_day_coverage",
            "staffed_icu_adult_patients_confirmed_suspected_covid_7d_cov",
            "staffed_icu_adult_patients_confirmed_covid_7_day_coverage",
            "total_patients_hospitalized_confirmed_influenza_7_day_coverage",
            "icu_patients_confirmed_influenza_7_day_coverage",
            "total_patients_hosp_confirmed_influenza_and_covid_7d_cov",
            "previous_day_admission_adult_covid_confirmed_7_day_sum",
            "previous_day_admission_adult_covid_confirmed_18_19_7_day_sum",
            "previous_day_admission_adult_covid_confirmed_20_29_7_day_sum",
            "previous_day_admission_adult_covid_confirmed_30_39_7_day_sum",
            "previous_day_admission_adult_covid_confirmed_40_49_7_day_sum",
            "previous_day_admission_adult_covid_confirmed_50_59_7_day_sum",
            "previous_day_admission_adult_covid_confirmed_60_69_7_day_sum",
            "previous_day_admission_adult_covid_confirmed_70_79_7_day_sum",
            "previous_day_admission_adult_covid_confirmed_80plus_7_day_sum",
            "previous_day_admission_adult_covid_confirmed_unknown_7_day_sum",
            "previous_day_admission_pediatric_covid_confirmed_7_day_sum",
            "previous_day_covid_ed_visits_7_day_sum",
            "previous_day_admission_adult_covid_suspected_7_day_sum",
            "previous_day_admission_adult_covid_suspected_18_19_7_day_sum",
            "previous_day_admission_adult_covid_suspected_20_29_7_day_sum",
            "previous_day_admission_adult_covid_suspected_30_39_7_day_sum",
            "previous_day_admission_adult_covid_suspected_40_49_7_day_sum",
            "previous_day_admission_adult_covid_suspected_50_59_7_day_sum",
            "previous_day_admission_adult_covid_suspected_60_69_7_day_sum",
            "previous_day_admission_adult_covid_suspected_70_79_7_day_sum",
            "previous_day_admission_adult_covid_suspected_80plus_7_day_sum",
            "previous_day_admission_adult_covid_suspected_unknown_7_day_sum",
            "previous_day_admission_pediatric_covid_suspected_7_day_sum",
            "previous_day_total_ed_visits_7_day_sum",
            "previous_day_admission_influenza_confirmed_7_day_sum",
        ];
        let fields_float = [
            "total_beds_7_day_avg",
            "all_adult_hospital_beds_7_day_avg",
            "all_adult_hospital_inpatient_beds_7_day_avg",
            "inpatient_beds_used_7_day_avg",
            "all_adult_hospital_inpatient_bed_occupied_7_day_avg",
            "total_adult_patients_hosp_confirmed_suspected_covid_7d_avg",
            "total_adult_patients_hospitalized_confirmed_covid_7_day_avg",
            "total_pediatric_patients_hosp_confirmed_suspected_covid_7d_avg",
            "total_pediatric_patients_hospitalized_confirmed_covid_7_day_avg",
            "inpatient_beds_7_day_avg",
            "total_icu_beds_7_day_avg",
            "total_staffed_adult_icu_beds_7_day_avg",
            "icu_beds_used_7_day_avg",
            "staffed_adult_icu_bed_occupancy_7_day_avg",
            "staffed_icu_adult_patients_confirmed_suspected_covid_7d_avg",
            "staffed_icu_adult_patients_confirmed_covid_7_day_avg",
            "total_patients_hospitalized_confirmed_influenza_7_day_avg",
            "icu_patients_confirmed_influenza_7_day_avg",
            "total_patients_hosp_confirmed_influenza_and_covid_7d_avg",
        ];

        Ok(EpiDataCall::new(
            "covid_hosp_facility/",
            vec![
                ("hospital_pks", Some(hospital_pks.into().into())),
                ("collection_weeks", Some(collection_weeks)),
                ("publication_dates", publication_dates),
            ],
            [
                fields_of(&fields_string, Text),
                vec![
                    f("publication_date", Date),
                    f("collection_week", Date),
                    f("is_metro_micro", Bool),
                ],
                fields_of(&fields_int, Int),
                fields_of(&fields_float, Float),
            ]
            .concat(),
        ))
    }

    /// Fetch COVID hospitalization data.
    pub fn pub_covid_hosp_state_timeseries(
        &self,
        states: impl Into<StringParam>,
        dates: impl Into<EpiRangeParam>,
        issues: Option<EpiRangeParam>,
        as_of: Option<EpiDateLike>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        if issues.is_some() && as_of.is_some() {
            return Err(Error::InvalidArgument(
                "`issues` and `as_of` are mutually exclusive".to_string(),
            ));
        }

        let dates = wildcard_equivalent_dates(dates.into(), TimeType::Day);

        let fields_int = [
            "hospital_onset_covid",
            "hospital_onset_covid_coverage",
            "inpatient_beds",
            "inpatient_beds_coverage",
            "inpatient_beds_used",
            "inpatient_beds_used_coverage",
            "inpatient_beds_used_covid",
            "inpatient_beds_used_covid_coverage",
            "previous_day_admission_adult_covid_confirmed",
            "previous_day_admission_adult_covid_confirmed_coverage",
            "previous_day_admission_adult_covid_suspected",
            "previous_day_admission_adult_covid_suspected_coverage",
            "previous_day_admission_pediatric_covid_confirmed",
            "previous_day_admission_pediatric_covid_confirmed_coverage",
            "previous_day_admission_pediatric_covid_suspected",
            "previous_day_admission_pediatric_covid_suspected_coverage",
            "staffed_adult_icu_bed_occupancy",
            "staffed_adult_icu_bed_occupancy_coverage",
            "staffed_icu_adult_patients_confirmed_suspected_covid",
            "staffed_icu_adult_patients_confirmed_suspected_covid_coverage",
            "staffed_icu_adult_patients_confirmed_covid",
            "staffed_icu_adult_patients_confirmed_covid_coverage",
            "total_adult_patients_hosp_confirmed_suspected_covid",
            "total_adult_patients_hosp_confirmed_suspected_covid_coverage",
            "total_adult_patients_hosp_confirmed_covid",
            "total_adult_patients_hosp_confirmed_covid_coverage",
            "total_pediatric_patients_hosp_confirmed_suspected_covid",
            "total_pediatric_patients_hosp_confirmed_suspected_covid_coverage",
            "total_pediatric_patients_hosp_confirmed_covid",
            "total_pediatric_patients_hosp_confirmed_covid_coverage",
            "total_staffed_adult_icu_beds",
            "total_staffed_adult_icu_beds_coverage",
            "inpatient_beds_utilization_coverage",
            "inpatient_beds_utilization_numerator",
            "inpatient_beds_utilization_denominator",
            "percent_of_inpatients_with_covid_coverage",
            "percent_of_inpatients_with_covid_numerator",
            "percent_of_inpatients_with_covid_denominator",
            "inpatient_bed_covid_utilization_coverage",
            "inpatient_bed_covid_utilization_numerator",
            "inpatient_bed_covid_utilization_denominator",
            "adult_icu_bed_covid_utilization_coverage",
            "adult_icu_bed_covid_utilization_numerator",
            "adult_icu_bed_covid_utilization_denominator",
            "adult_icu_bed_utilization_coverage",
            "adult_icu_bed_utilization_numerator",
            "adult_icu_bed_utilization_denominator",
        ];
        let fields_float = [
            "inpatient_beds_utilization",
            "percent_of_inpatients_with_covid",
            "inpatient_bed_covid_utilization",
            "adult_icu_bed_covid_utilization",
            "adult_icu_bed_utilization",
        ];
        let fields_bool = [
            "critical_staffing_shortage_today_yes",
            "critical_staffing_shortage_today_no",
            "critical_staffing_shortage_today_not_reported",
            "critical_staffing_shortage_anticipated_within_week_yes",
            "critical_staffing_shortage_anticipated_within_week_no",
            "critical_staffing_shortage_anticipated_within_week_not_reported",
        ];

        Ok(EpiDataCall::new(
            "covid_hosp_state_timeseries/",
            vec![
                ("states", Some(states.into().into())),
                ("dates", Some(dates)),
                ("issues", issues),
                ("as_of", as_of.map(|v| EpiRangeParam::One(EpiRangeLike::Value(v)))),
            ],
            [
                vec![f("state", Text), f("issue", Date), f("date", Date)],
                fields_of(&fields_bool, Bool),
                fields_of(&fields_int, Int),
                fields_of(&fields_float, Float),
            ]
            .concat(),
        ))
    }

    /// Fetch COVIDcast surveillance stream metadata.
    pub fn pub_covidcast_meta(&self) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        Ok(EpiDataCall::new(
            "covidcast_meta/",
            vec![],
            vec![
                f("data_source", Text),
                f("signal", Text),
                EpidataFieldInfo::categorical("time_type", &["week", "day"]),
                f("min_time", DateOrEpiweek),
                f("max_time", DateOrEpiweek),
                f("num_locations", Int),
                f("min_value", Float),
                f("max_value", Float),
                f("mean_value", Float),
                f("stdev_value", Float),
                f("last_update", Int),
                f("max_issue", Date),
                f("min_lag", Int),
                f("max_lag", Int),
            ],
        ))
    }

    /// Fetch Delphi's COVID-19 surveillance streams.
    #[allow(clippy::too_many_arguments)]
    pub fn pub_covidcast(
        &self,
        data_source: &str,
        signals: impl Into<StringParam>,
        geo_type: GeoType,
        time_type: TimeType,
        geo_values: impl Into<StringParam>,
        time_values: impl Into<EpiRangeParam>,
        as_of: Option<EpiDateLike>,
        issues: Option<EpiRangeParam>,
        lag: Option<i64>,
    ) -> Result<EpiDataCall> {
        if [issues.is_some(), lag.is_some(), as_of.is_some()]
            .iter()
            .filter(|v| **v)
            .count()
            > 1
        {
            return Err(Error::InvalidArgument(
                "`issues`, `lag`, and `as_of` are mutually exclusive".to_string(),
            ));
        }
        if data_source == "nchs-mortality" && time_type != TimeType::Week {
            return Err(Error::InvalidArgument(
                "nchs-mortality data source only supports the week time type".to_string(),
            ));
        }

        let time_values = wildcard_equivalent_dates(time_values.into(), time_type);

        Ok(EpiDataCall::new(
            "covidcast/",
            vec![
                ("data_source", Some(data_source.into())),
                ("signals", Some(signals.into().into())),
                ("geo_type", Some(geo_type.into())),
                ("time_type", Some(time_type.into())),
                ("geo_values", Some(geo_values.into().into())),
                ("time_values", Some(time_values)),
                ("as_of", as_of.map(|v| EpiRangeParam::One(EpiRangeLike::Value(v)))),
                ("issues", issues),
                ("lag", lag.map(EpiRangeParam::from)),
            ],
            define_covidcast_fields(),
        ))
    }

    /// Fetch Delphi's forecast.
    pub fn pub_delphi(&self, system: &str, epiweek: impl Into<EpiRangeParam>) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        Ok(EpiDataCall::new(
            "delphi/",
            vec![
                ("system", Some(system.into())),
                ("epiweek", Some(epiweek.into())),
            ],
            vec![f("system", Text), f("epiweek", Epiweek), f("json", Text)],
        )
        .classic_only())
    }

    /// Fetch Delphi's dengue nowcast.
    pub fn pub_dengue_nowcast(
        &self,
        locations: impl Into<StringParam>,
        epiweeks: impl Into<EpiRangeParam>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        let epiweeks = wildcard_equivalent_dates(epiweeks.into(), TimeType::Week);

        Ok(EpiDataCall::new(
            "dengue_nowcast/",
            vec![
                ("locations", Some(locations.into().into())),
                ("epiweeks", Some(epiweeks)),
            ],
            vec![
                f("location", Text),
                f("epiweek", Epiweek),
                f("value", Float),
                f("std", Float),
            ],
        ))
    }

    /// Fetch Delphi's digital surveillance sensors for dengue.
    pub fn pvt_dengue_sensors(
        &self,
        auth: &str,
        names: impl Into<StringParam>,
        locations: impl Into<StringParam>,
        epiweeks: impl Into<EpiRangeParam>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        let epiweeks = wildcard_equivalent_dates(epiweeks.into(), TimeType::Week);

        Ok(EpiDataCall::new(
            "dengue_sensors/",
            vec![
                ("auth", Some(auth.into())),
                ("names", Some(names.into().into())),
                ("locations", Some(locations.into().into())),
                ("epiweeks", Some(epiweeks)),
            ],
            vec![
                f("name", Text),
                f("location", Text),
                f("epiweek", Epiweek),
                f("value", Float),
            ],
        ))
    }

    /// Fetch ECDC ILI data.
    pub fn pub_ecdc_ili(
        &self,
        regions: impl Into<StringParam>,
        epiweeks: impl Into<EpiRangeParam>,
        issues: Option<EpiRangeParam>,
        lag: Option<i64>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        let epiweeks = wildcard_equivalent_dates(epiweeks.into(), TimeType::Week);
        issues_lag_exclusive(&issues, lag)?;

        Ok(EpiDataCall::new(
            "ecdc_ili/",
            vec![
                ("regions", Some(regions.into().into())),
                ("epiweeks", Some(epiweeks)),
                ("issues", issues),
                ("lag", lag.map(EpiRangeParam::from)),
            ],
            vec![
                f("region", Text),
                f("release_date", Date),
                f("issue", Epiweek),
                f("epiweek", Epiweek),
                f("lag", Int),
                f("incidence_rate", Float),
            ],
        ))
    }

    /// Fetch FluSurv data.
    pub fn pub_flusurv(
        &self,
        locations: impl Into<StringParam>,
        epiweeks: impl Into<EpiRangeParam>,
        issues: Option<EpiRangeParam>,
        lag: Option<i64>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        let epiweeks = wildcard_equivalent_dates(epiweeks.into(), TimeType::Week);
        issues_lag_exclusive(&issues, lag)?;

        Ok(EpiDataCall::new(
            "flusurv/",
            vec![
                ("locations", Some(locations.into().into())),
                ("epiweeks", Some(epiweeks)),
                ("issues", issues),
                ("lag", lag.map(EpiRangeParam::from)),
            ],
            [
                vec![
                    f("release_date", Text),
                    f("location", Text),
                    f("issue", DateOrEpiweek),
                    f("epiweek", Epiweek),
                    f("lag", Int),
                ],
                fields_of(
                    &[
                        "rate_age_0",
                        "rate_age_1",
                        "rate_age_2",
                        "rate_age_3",
                        "rate_age_4",
                        "rate_overall",
                    ],
                    Float,
                ),
            ]
            .concat(),
        ))
    }

    /// Fetch FluView clinical data.
    pub fn pub_fluview_clinical(
        &self,
        regions: impl Into<StringParam>,
        epiweeks: impl Into<EpiRangeParam>,
        issues: Option<EpiRangeParam>,
        lag: Option<i64>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        let epiweeks = wildcard_equivalent_dates(epiweeks.into(), TimeType::Week);
        issues_lag_exclusive(&issues, lag)?;

        Ok(EpiDataCall::new(
            "fluview_clinical/",
            vec![
                ("regions", Some(regions.into().into())),
                ("epiweeks", Some(epiweeks)),
                ("issues", issues),
                ("lag", lag.map(EpiRangeParam::from)),
            ],
            [
                vec![
                    f("release_date", Date),
                    f("region", Text),
                    f("issue", Epiweek),
                    f("epiweek", Epiweek),
                    f("lag", Int),
                ],
                fields_of(&["total_specimens", "total_a", "total_b"], Int),
                fields_of(&["percent_positive", "percent_a", "percent_b"], Float),
            ]
            .concat(),
        ))
    }

    /// Fetch FluView metadata.
    pub fn pub_fluview_meta(&self) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        Ok(EpiDataCall::new(
            "fluview_meta",
            vec![],
            vec![
                f("latest_update", Date),
                f("latest_issue", Date),
                f("table_rows", Int),
            ],
        ))
    }

    /// Fetch FluView ILINet data.
    pub fn pub_fluview(
        &self,
        regions: impl Into<StringParam>,
        epiweeks: impl Into<EpiRangeParam>,
        issues: Option<EpiRangeParam>,
        lag: Option<i64>,
        auth: Option<&str>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        let epiweeks = wildcard_equivalent_dates(epiweeks.into(), TimeType::Week);
        issues_lag_exclusive(&issues, lag)?;

        Ok(EpiDataCall::new(
            "fluview/",
            vec![
                ("regions", Some(regions.into().into())),
                ("epiweeks", Some(epiweeks)),
                ("issues", issues),
                ("lag", lag.map(EpiRangeParam::from)),
                ("auth", auth.map(EpiRangeParam::from)),
            ],
            [
                vec![
                    f("release_date", Date),
                    f("region", Text),
                    f("issue", Epiweek),
                    f("epiweek", Epiweek),
                    f("lag", Int),
                ],
                fields_of(
                    &[
                        "num_ili",
                        "num_patients",
                        "num_age_0",
                        "num_age_1",
                        "num_age_2",
                        "num_age_3",
                        "num_age_4",
                        "num_age_5",
                    ],
                    Int,
                ),
                vec![f("wili", Float), f("ili", Float)],
            ]
            .concat(),
        ))
    }

    /// Fetch Google Flu Trends data.
    pub fn pub_gft(
        &self,
        locations: impl Into<StringParam>,
        epiweeks: impl Into<EpiRangeParam>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        let epiweeks = wildcard_equivalent_dates(epiweeks.into(), TimeType::Week);

        Ok(EpiDataCall::new(
            "gft/",
            vec![
                ("locations", Some(locations.into().into())),
                ("epiweeks", Some(epiweeks)),
            ],
            vec![f("location", Text), f("epiweek", Epiweek), f("num", Int)],
        ))
    }

    /// Fetch Google Health Trends data.
    pub fn pvt_ght(
        &self,
        auth: &str,
        locations: impl Into<StringParam>,
        epiweeks: impl Into<EpiRangeParam>,
        query: &str,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        if auth.is_empty() || query.is_empty() {
            return Err(Error::InvalidArgument(
                "`auth`, `locations`, `epiweeks`, and `query` are all required".to_string(),
            ));
        }

        Ok(EpiDataCall::new(
            "ght/",
            vec![
                ("auth", Some(auth.into())),
                ("locations", Some(locations.into().into())),
                ("epiweeks", Some(epiweeks.into())),
                ("query", Some(query.into())),
            ],
            vec![f("location", Text), f("epiweek", Epiweek), f("value", Float)],
        ))
    }

    /// Fetch KCDC ILI data.
    pub fn pub_kcdc_ili(
        &self,
        regions: impl Into<StringParam>,
        epiweeks: impl Into<EpiRangeParam>,
        issues: Option<EpiRangeParam>,
        lag: Option<i64>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        let epiweeks = wildcard_equivalent_dates(epiweeks.into(), TimeType::Week);
        issues_lag_exclusive(&issues, lag)?;

        Ok(EpiDataCall::new(
            "kcdc_ili/",
            vec![
                ("regions", Some(regions.into().into())),
                ("epiweeks", Some(epiweeks)),
                ("issues", issues),
                ("lag", lag.map(EpiRangeParam::from)),
            ],
            vec![
                f("release_date", Date),
                f("region", Text),
                f("issue", Epiweek),
                f("epiweek", Epiweek),
                f("lag", Int),
                f("ili", Float),
            ],
        ))
    }

    /// Fetch NoroSTAT metadata.
    pub fn pvt_meta_norostat(&self, auth: &str) -> Result<EpiDataCall> {
        Ok(
            EpiDataCall::new("meta_norostat/", vec![("auth", Some(auth.into()))], vec![])
                .classic_only(),
        )
    }

    /// Fetch API metadata.
    pub fn pub_meta(&self) -> Result<EpiDataCall> {
        Ok(EpiDataCall::new("meta/", vec![], vec![]).classic_only())
    }

    /// Fetch NIDSS dengue data.
    pub fn pub_nidss_dengue(
        &self,
        locations: impl Into<StringParam>,
        epiweeks: impl Into<EpiRangeParam>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        let epiweeks = wildcard_equivalent_dates(epiweeks.into(), TimeType::Week);

        Ok(EpiDataCall::new(
            "nidss_dengue/",
            vec![
                ("locations", Some(locations.into().into())),
                ("epiweeks", Some(epiweeks)),
            ],
            vec![f("location", Text), f("epiweek", Epiweek), f("count", Int)],
        ))
    }

    /// Fetch NIDSS flu data.
    pub fn pub_nidss_flu(
        &self,
        regions: impl Into<StringParam>,
        epiweeks: impl Into<EpiRangeParam>,
        issues: Option<EpiRangeParam>,
        lag: Option<i64>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        let epiweeks = wildcard_equivalent_dates(epiweeks.into(), TimeType::Week);
        issues_lag_exclusive(&issues, lag)?;

        Ok(EpiDataCall::new(
            "nidss_flu/",
            vec![
                ("regions", Some(regions.into().into())),
                ("epiweeks", Some(epiweeks)),
                ("issues", issues),
                ("lag", lag.map(EpiRangeParam::from)),
            ],
            vec![
                f("release_date", Date),
                f("region", Text),
                f("epiweek", Epiweek),
                f("issue", Epiweek),
                f("lag", Int),
                f("visits", Int),
                f("ili", Float),
            ],
        ))
    }

    /// Fetch NoroSTAT data (point data, no min/max).
    pub fn pvt_norostat(
        &self,
        auth: &str,
        location: &str,
        epiweeks: impl Into<EpiRangeParam>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        let epiweeks = wildcard_equivalent_dates(epiweeks.into(), TimeType::Week);

        Ok(EpiDataCall::new(
            "norostat/",
            vec![
                ("auth", Some(auth.into())),
                ("epiweeks", Some(epiweeks)),
                ("location", Some(location.into())),
            ],
            vec![f("release_date", Date), f("epiweek", Epiweek), f("value", Int)],
        ))
    }

    /// Fetch Delphi's wILI nowcast.
    pub fn pub_nowcast(
        &self,
        locations: impl Into<StringParam>,
        epiweeks: impl Into<EpiRangeParam>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        let epiweeks = wildcard_equivalent_dates(epiweeks.into(), TimeType::Week);

        Ok(EpiDataCall::new(
            "nowcast/",
            vec![
                ("locations", Some(locations.into().into())),
                ("epiweeks", Some(epiweeks)),
            ],
            vec![
                f("location", Text),
                f("epiweek", Epiweek),
                f("value", Float),
                f("std", Float),
            ],
        ))
    }

    /// Fetch PAHO dengue data.
    pub fn pub_paho_dengue(
        &self,
        regions: impl Into<StringParam>,
        epiweeks: impl Into<EpiRangeParam>,
        issues: Option<EpiRangeParam>,
        lag: Option<i64>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        let epiweeks = wildcard_equivalent_dates(epiweeks.into(), TimeType::Week);
        issues_lag_exclusive(&issues, lag)?;

        Ok(EpiDataCall::new(
            "paho_dengue/",
            vec![
                ("regions", Some(regions.into().into())),
                ("epiweeks", Some(epiweeks)),
                ("issues", issues),
                ("lag", lag.map(EpiRangeParam::from)),
            ],
            [
                vec![
                    f("release_date", Date),
                    f("region", Text),
                    f("serotype", Text),
                    f("epiweek", Epiweek),
                    f("issue", Epiweek),
                    f("lag", Int),
                ],
                fields_of(&["total_pop", "num_dengue", "num_severe", "num_deaths"], Int),
                vec![f("incidence_rate", Float)],
            ]
            .concat(),
        ))
    }

    /// Fetch Quidel data.
    pub fn pvt_quidel(
        &self,
        auth: &str,
        locations: impl Into<StringParam>,
        epiweeks: impl Into<EpiRangeParam>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        let epiweeks = wildcard_equivalent_dates(epiweeks.into(), TimeType::Week);

        Ok(EpiDataCall::new(
            "quidel/",
            vec![
                ("auth", Some(auth.into())),
                ("epiweeks", Some(epiweeks)),
                ("locations", Some(locations.into().into())),
            ],
            vec![f("location", Text), f("epiweek", Epiweek), f("value", Float)],
        ))
    }

    /// Fetch Delphi's digital surveillance sensors.
    pub fn pvt_sensors(
        &self,
        auth: &str,
        names: impl Into<StringParam>,
        locations: impl Into<StringParam>,
        epiweeks: impl Into<EpiRangeParam>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        let epiweeks = wildcard_equivalent_dates(epiweeks.into(), TimeType::Week);

        Ok(EpiDataCall::new(
            "sensors/",
            vec![
                ("auth", Some(auth.into())),
                ("names", Some(names.into().into())),
                ("locations", Some(locations.into().into())),
                ("epiweeks", Some(epiweeks)),
            ],
            vec![
                f("name", Text),
                f("location", Text),
                f("epiweek", Epiweek),
                f("value", Float),
            ],
        ))
    }

    /// Fetch HealthTweets data.
    pub fn pvt_twitter(
        &self,
        auth: &str,
        locations: impl Into<StringParam>,
        time_type: TimeType,
        time_values: impl Into<EpiRangeParam>,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        let (dates, epiweeks, time_field) = route_time_values(time_values.into(), time_type);

        Ok(EpiDataCall::new(
            "twitter/",
            vec![
                ("auth", Some(auth.into())),
                ("locations", Some(locations.into().into())),
                ("epiweeks", epiweeks),
                ("dates", dates),
            ],
            vec![
                f("location", Text),
                time_field,
                f("num", Int),
                f("total", Int),
                f("percent", Float),
            ],
        ))
    }

    /// Fetch Wikipedia access data.
    pub fn pub_wiki(
        &self,
        articles: impl Into<StringParam>,
        time_type: TimeType,
        time_values: impl Into<EpiRangeParam>,
        hours: Option<IntParam>,
        language: &str,
    ) -> Result<EpiDataCall> {
        use EpidataFieldType::*;
        let (dates, epiweeks, time_field) = route_time_values(time_values.into(), time_type);

        Ok(EpiDataCall::new(
            "wiki/",
            vec![
                ("articles", Some(articles.into().into())),
                ("dates", dates),
                ("epiweeks", epiweeks),
                ("hours", hours.map(EpiRangeParam::from)),
                ("language", Some(language.into())),
            ],
            vec![
                f("article", Text),
                time_field,
                f("count", Int),
                f("total", Int),
                f("hour", Int),
                f("value", Float),
            ],
        ))
    }
}

fn issues_lag_exclusive(issues: &Option<EpiRangeParam>, lag: Option<i64>) -> Result<()> {
    if issues.is_some() && lag.is_some() {
        return Err(Error::InvalidArgument(
            "`issues` and `lag` are mutually exclusive".to_string(),
        ));
    }
    Ok(())
}

/// Splits a `time_values` parameter into the `dates`/`epiweeks` pair the
/// wire protocol expects, and picks the matching time field descriptor.
fn route_time_values(
    time_values: EpiRangeParam,
    time_type: TimeType,
) -> (
    Option<EpiRangeParam>,
    Option<EpiRangeParam>,
    EpidataFieldInfo,
) {
    match time_type {
        TimeType::Day => (
            Some(wildcard_equivalent_dates(time_values, TimeType::Day)),
            None,
            EpidataFieldInfo::new("date", EpidataFieldType::Date),
        ),
        TimeType::Week => (
            None,
            Some(wildcard_equivalent_dates(time_values, TimeType::Week)),
            EpidataFieldInfo::new("epiweek", EpidataFieldType::Epiweek),
        ),
    }
}

/// Converts week-format `collection_weeks` input (epiweek ranges or 6-digit
/// scalars) to the day format the endpoint expects.
fn convert_collection_weeks_to_days(value: EpiRangeParam) -> Result<EpiRangeParam> {
    let week_warning = || {
        warn!(
            "`collection_weeks` is in week format but `pub_covid_hosp_facility` expects day \
             format; dates will be converted to day format but may not correspond exactly to \
             the desired time range"
        );
    };

    match value {
        EpiRangeParam::One(EpiRangeLike::Range(r))
            if matches!(r.start, EpiTimeValue::Week(_)) =>
        {
            week_warning();
            Ok(EpiRangeParam::from(EpiRange {
                start: EpiTimeValue::Day(r.start.to_date()),
                end: EpiTimeValue::Day(r.end.to_date()),
            }))
        }
        EpiRangeParam::One(EpiRangeLike::Value(v)) if is_week_shaped(&v) => {
            week_warning();
            let day = v.parse(Some(TimeType::Week))?.to_date();
            Ok(EpiRangeParam::from(EpiDateLike::Date(day)))
        }
        other => Ok(other),
    }
}

fn is_week_shaped(value: &EpiDateLike) -> bool {
    match value {
        EpiDateLike::Int(i) => i.to_string().len() == 6,
        EpiDateLike::Text(s) => s.len() == 6,
        _ => false,
    }
}
