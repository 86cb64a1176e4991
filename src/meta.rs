use std::collections::HashSet;

/// Semantic type of a result field, driving response decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpidataFieldType {
    Text,
    Int,
    Float,
    Date,
    Epiweek,
    Categorical,
    Bool,
    /// Ambiguous temporal field: 6-digit values are epi weeks, 8-digit
    /// values are calendar dates. Both occur on the same field.
    DateOrEpiweek,
}

/// Metadata about one result field.
#[derive(Debug, Clone, PartialEq)]
pub struct EpidataFieldInfo {
    pub name: String,
    pub field_type: EpidataFieldType,
    pub description: String,
    /// Declared category order for [`EpidataFieldType::Categorical`] fields.
    pub categories: Vec<String>,
}

impl EpidataFieldInfo {
    pub fn new(name: &str, field_type: EpidataFieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            description: String::new(),
            categories: Vec::new(),
        }
    }

    pub fn categorical(name: &str, categories: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            field_type: EpidataFieldType::Categorical,
            description: String::new(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Ordered, per-endpoint list of field descriptors.
///
/// Descriptor order defines the default column order of decoded tables. An
/// empty registry means the endpoint's schema is dynamic and rows are passed
/// through without typed decoding.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: Vec<EpidataFieldInfo>,
}

impl FieldRegistry {
    pub fn new(fields: Vec<EpidataFieldInfo>) -> Self {
        Self { fields }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn by_name(&self, name: &str) -> Option<&EpidataFieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EpidataFieldInfo> {
        self.fields.iter()
    }
}

/// Result field filter: a bare name includes, a `-` prefix excludes. Any
/// include switches the filter to allow-list mode; excludes always apply.
#[derive(Debug, Clone, Default)]
pub struct FieldFilter {
    include: HashSet<String>,
    exclude: HashSet<String>,
}

impl FieldFilter {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::default();
        for f in fields {
            let f = f.as_ref();
            match f.strip_prefix('-') {
                Some(name) => filter.exclude.insert(name.to_string()),
                None => filter.include.insert(f.to_string()),
            };
        }
        filter
    }

    pub fn allows(&self, name: &str) -> bool {
        !self.exclude.contains(name) && (self.include.is_empty() || self.include.contains(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lookup_and_order() {
        let reg = FieldRegistry::new(vec![
            EpidataFieldInfo::new("region", EpidataFieldType::Text),
            EpidataFieldInfo::new("epiweek", EpidataFieldType::Epiweek),
        ]);
        assert_eq!(
            reg.by_name("epiweek").map(|f| f.field_type),
            Some(EpidataFieldType::Epiweek)
        );
        assert!(reg.by_name("missing").is_none());
        let names: Vec<_> = reg.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["region", "epiweek"]);
    }

    #[test]
    fn empty_filter_allows_everything() {
        let filter = FieldFilter::new(Vec::<String>::new());
        assert!(filter.allows("anything"));
    }

    #[test]
    fn includes_switch_to_allow_list() {
        let filter = FieldFilter::new(["a", "b"]);
        assert!(filter.allows("a"));
        assert!(filter.allows("b"));
        assert!(!filter.allows("c"));
    }

    #[test]
    fn excludes_always_apply() {
        let filter = FieldFilter::new(["-b"]);
        assert!(filter.allows("a"));
        assert!(!filter.allows("b"));

        // Exclusion beats inclusion of the same name.
        let filter = FieldFilter::new(["a", "-a"]);
        assert!(!filter.allows("a"));
    }
}
