use chrono::NaiveDate;

use crate::decode::{EpiDataValue, Row};
use crate::meta::{EpidataFieldType, FieldFilter, FieldRegistry};
use crate::temporal::EpiWeek;

/// Typed column storage. Every variant is nullable: a missing or
/// undecodable cell is `None`, never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Bool(Vec<Option<bool>>),
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
    Date(Vec<Option<NaiveDate>>),
    Week(Vec<Option<EpiWeek>>),
    /// Ordered categorical: `codes` index into `categories`, whose order is
    /// the declared order, not sorted. Values outside the declared set are
    /// missing.
    Categorical {
        categories: Vec<String>,
        codes: Vec<Option<usize>>,
    },
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Bool(v) => v.len(),
            ColumnValues::Int(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
            ColumnValues::Date(v) => v.len(),
            ColumnValues::Week(v) => v.len(),
            ColumnValues::Categorical { codes, .. } => codes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

/// A column-typed view over a set of decoded rows.
///
/// Every registry column passing the field filter is present, even when no
/// row carries it; columns unknown to the registry follow in arrival order.
#[derive(Debug, Clone, Default)]
pub struct EpiDataTable {
    columns: Vec<Column>,
    num_rows: usize,
}

impl EpiDataTable {
    pub fn from_rows(rows: &[Row], registry: &FieldRegistry, filter: Option<&FieldFilter>) -> Self {
        let allows = |name: &str| filter.map(|f| f.allows(name)).unwrap_or(true);

        let mut names: Vec<String> = Vec::new();
        for info in registry.iter() {
            if allows(&info.name) {
                names.push(info.name.clone());
            }
        }
        for row in rows {
            for (name, _) in row.iter() {
                if allows(name) && !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }

        let columns = names
            .into_iter()
            .map(|name| {
                let cells: Vec<Option<&EpiDataValue>> =
                    rows.iter().map(|r| r.get(&name)).collect();
                let values = match registry.by_name(&name) {
                    Some(info) => typed_column(&cells, info.field_type, &info.categories),
                    None => inferred_column(&cells),
                };
                Column { name, values }
            })
            .collect();

        Self {
            columns,
            num_rows: rows.len(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.num_rows
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }
}

fn typed_column(
    cells: &[Option<&EpiDataValue>],
    field_type: EpidataFieldType,
    categories: &[String],
) -> ColumnValues {
    match field_type {
        EpidataFieldType::Bool => ColumnValues::Bool(
            cells
                .iter()
                .map(|c| match c {
                    Some(EpiDataValue::Bool(b)) => Some(*b),
                    _ => None,
                })
                .collect(),
        ),
        EpidataFieldType::Int => ColumnValues::Int(
            cells
                .iter()
                .map(|c| match c {
                    Some(EpiDataValue::Int(i)) => Some(*i),
                    _ => None,
                })
                .collect(),
        ),
        EpidataFieldType::Float => ColumnValues::Float(
            cells
                .iter()
                .map(|c| match c {
                    Some(EpiDataValue::Float(f)) => Some(*f),
                    Some(EpiDataValue::Int(i)) => Some(*i as f64),
                    _ => None,
                })
                .collect(),
        ),
        EpidataFieldType::Date | EpidataFieldType::DateOrEpiweek => ColumnValues::Date(
            cells
                .iter()
                .map(|c| match c {
                    Some(EpiDataValue::Date(d)) => Some(*d),
                    // Ambiguous fields unify on the week's start date.
                    Some(EpiDataValue::Week(w)) => Some(w.start_date()),
                    _ => None,
                })
                .collect(),
        ),
        EpidataFieldType::Epiweek => ColumnValues::Week(
            cells
                .iter()
                .map(|c| match c {
                    Some(EpiDataValue::Week(w)) => Some(*w),
                    _ => None,
                })
                .collect(),
        ),
        EpidataFieldType::Categorical => ColumnValues::Categorical {
            categories: categories.to_vec(),
            codes: cells
                .iter()
                .map(|c| match c {
                    Some(EpiDataValue::Text(s)) => categories.iter().position(|c| c == s),
                    _ => None,
                })
                .collect(),
        },
        EpidataFieldType::Text => text_column(cells),
    }
}

/// Column typing for fields unknown to the registry: numeric if every
/// non-null cell is numeric (promoting to float on any fraction), boolean
/// if all boolean, text otherwise.
fn inferred_column(cells: &[Option<&EpiDataValue>]) -> ColumnValues {
    let non_null = || {
        cells
            .iter()
            .filter_map(|c| c.filter(|v| !v.is_null()))
    };

    if non_null().all(|v| matches!(v, EpiDataValue::Int(_))) {
        return ColumnValues::Int(
            cells
                .iter()
                .map(|c| match c {
                    Some(EpiDataValue::Int(i)) => Some(*i),
                    _ => None,
                })
                .collect(),
        );
    }
    if non_null().all(|v| matches!(v, EpiDataValue::Int(_) | EpiDataValue::Float(_))) {
        return ColumnValues::Float(
            cells
                .iter()
                .map(|c| match c {
                    Some(EpiDataValue::Float(f)) => Some(*f),
                    Some(EpiDataValue::Int(i)) => Some(*i as f64),
                    _ => None,
                })
                .collect(),
        );
    }
    if non_null().all(|v| matches!(v, EpiDataValue::Bool(_))) {
        return ColumnValues::Bool(
            cells
                .iter()
                .map(|c| match c {
                    Some(EpiDataValue::Bool(b)) => Some(*b),
                    _ => None,
                })
                .collect(),
        );
    }
    text_column(cells)
}

fn text_column(cells: &[Option<&EpiDataValue>]) -> ColumnValues {
    ColumnValues::Text(
        cells
            .iter()
            .map(|c| match c {
                Some(EpiDataValue::Text(s)) => Some(s.clone()),
                Some(EpiDataValue::Int(i)) => Some(i.to_string()),
                Some(EpiDataValue::Float(f)) => Some(f.to_string()),
                Some(EpiDataValue::Bool(b)) => Some(b.to_string()),
                Some(EpiDataValue::Date(d)) => Some(d.format("%Y%m%d").to_string()),
                Some(EpiDataValue::Week(w)) => Some(w.cdc_format()),
                Some(EpiDataValue::Raw(v)) => Some(v.to_string()),
                Some(EpiDataValue::Null) | None => None,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_row;
    use crate::meta::EpidataFieldInfo;
    use serde_json::json;

    fn rows(registry: &FieldRegistry, raw: &[serde_json::Value]) -> Vec<Row> {
        raw.iter()
            .map(|v| decode_row(v.as_object().unwrap(), registry, false))
            .collect()
    }

    fn registry() -> FieldRegistry {
        FieldRegistry::new(vec![
            EpidataFieldInfo::new("region", EpidataFieldType::Text),
            EpidataFieldInfo::categorical("time_type", &["week", "day"]),
            EpidataFieldInfo::new("count", EpidataFieldType::Int),
            EpidataFieldInfo::new("rate", EpidataFieldType::Float),
        ])
    }

    #[test]
    fn nullable_int_column_tolerates_missing_values() {
        let reg = registry();
        let rows = rows(
            &reg,
            &[
                json!({"region": "pa", "count": 3}),
                json!({"region": "ny", "count": null}),
                json!({"region": "tx"}),
            ],
        );
        let table = EpiDataTable::from_rows(&rows, &reg, None);
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.column("count").unwrap().values,
            ColumnValues::Int(vec![Some(3), None, None])
        );
    }

    #[test]
    fn categorical_codes_follow_declared_order() {
        let reg = registry();
        let rows = rows(
            &reg,
            &[
                json!({"time_type": "day"}),
                json!({"time_type": "week"}),
                json!({"time_type": "month"}),
            ],
        );
        let table = EpiDataTable::from_rows(&rows, &reg, None);
        // "week" is declared first even though "day" arrives first; unknown
        // "month" is missing.
        assert_eq!(
            table.column("time_type").unwrap().values,
            ColumnValues::Categorical {
                categories: vec!["week".to_string(), "day".to_string()],
                codes: vec![Some(1), Some(0), None],
            }
        );
    }

    #[test]
    fn column_order_is_registry_then_arrival() {
        let reg = registry();
        let rows = rows(
            &reg,
            &[json!({"extra": 1, "rate": 0.5, "region": "pa"})],
        );
        let table = EpiDataTable::from_rows(&rows, &reg, None);
        let names: Vec<_> = table.columns().iter().map(|c| c.name.as_str()).collect();
        // Registry columns appear even when absent from every row.
        assert_eq!(names, ["region", "time_type", "count", "rate", "extra"]);
        assert_eq!(
            table.column("count").unwrap().values,
            ColumnValues::Int(vec![None])
        );
    }

    #[test]
    fn field_filter_selects_columns() {
        let reg = registry();
        let rows = rows(&reg, &[json!({"region": "pa", "count": 3, "rate": 0.5})]);
        let filter = FieldFilter::new(["region", "rate"]);
        let table = EpiDataTable::from_rows(&rows, &reg, Some(&filter));
        let names: Vec<_> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["region", "rate"]);

        let filter = FieldFilter::new(["-count"]);
        let table = EpiDataTable::from_rows(&rows, &reg, Some(&filter));
        let names: Vec<_> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["region", "time_type", "rate"]);
    }

    #[test]
    fn mixed_int_float_promotes_to_float() {
        let reg = FieldRegistry::empty();
        let rows = rows(&reg, &[json!({"x": 1}), json!({"x": 1.5})]);
        let table = EpiDataTable::from_rows(&rows, &reg, None);
        assert_eq!(
            table.column("x").unwrap().values,
            ColumnValues::Float(vec![Some(1.0), Some(1.5)])
        );
    }
}
