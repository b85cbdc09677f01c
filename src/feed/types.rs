use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// Name of the item field used for date filtering.
pub const DATE_FIELD: &str = "pubDate";

/// The item fields a caller asked for, plus the implicit date field.
///
/// `requested` keeps the caller's order with duplicates removed and is what
/// records are projected onto. `effective` is `requested` with [`DATE_FIELD`]
/// appended when missing, and is what the extractor walks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet {
    requested: Vec<String>,
    effective: Vec<String>,
}

impl FieldSet {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut requested: Vec<String> = Vec::new();
        for field in fields {
            let field = field.into();
            let trimmed = field.trim();
            if trimmed.is_empty() || requested.iter().any(|f| f == trimmed) {
                continue;
            }
            requested.push(trimmed.to_owned());
        }

        let mut effective = requested.clone();
        if !effective.iter().any(|f| f == DATE_FIELD) {
            effective.push(DATE_FIELD.to_owned());
        }

        Self {
            requested,
            effective,
        }
    }

    /// Fields that appear in each output record, in caller order.
    pub fn requested(&self) -> &[String] {
        &self.requested
    }

    /// Fields extracted from the feed; always contains [`DATE_FIELD`].
    pub fn effective(&self) -> &[String] {
        &self.effective
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.effective.iter().position(|f| f == field)
    }
}

/// Column-oriented extraction result: one value per `<item>` for every field.
///
/// All columns have the same length. A `None` entry means the item had no
/// such element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemColumns {
    columns: HashMap<String, Vec<Option<String>>>,
    item_count: usize,
}

impl ItemColumns {
    /// Creates empty columns for every field in `fields`.
    pub fn new(fields: &FieldSet) -> Self {
        Self {
            columns: fields
                .effective()
                .iter()
                .map(|f| (f.clone(), Vec::new()))
                .collect(),
            item_count: 0,
        }
    }

    /// Appends one item. `values` is indexed like [`FieldSet::effective`].
    pub(crate) fn push_item(&mut self, fields: &FieldSet, values: Vec<Option<String>>) {
        debug_assert_eq!(values.len(), fields.effective().len());
        for (field, value) in fields.effective().iter().zip(values) {
            self.columns.entry(field.clone()).or_default().push(value);
        }
        self.item_count += 1;
    }

    pub fn column(&self, field: &str) -> Option<&[Option<String>]> {
        self.columns.get(field).map(Vec::as_slice)
    }

    /// Value of `field` for the item at `index`, if the item has it.
    pub fn value(&self, field: &str, index: usize) -> Option<&str> {
        self.columns
            .get(field)
            .and_then(|col| col.get(index))
            .and_then(|v| v.as_deref())
    }

    pub fn len(&self) -> usize {
        self.item_count
    }

    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }
}

/// One feed item projected onto the requested fields.
///
/// Field order follows the caller's request. Serializes as a JSON object;
/// fields the item lacked serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    values: Vec<(String, Option<String>)>,
}

impl Record {
    pub(crate) fn new(values: Vec<(String, Option<String>)>) -> Self {
        Self { values }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.values.iter().any(|(name, _)| name == field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_set_appends_date_field() {
        let fields = FieldSet::new(["link", "title"]);
        assert_eq!(fields.requested(), &["link", "title"]);
        assert_eq!(fields.effective(), &["link", "title", "pubDate"]);
    }

    #[test]
    fn test_field_set_does_not_duplicate_date_field() {
        let fields = FieldSet::new(["pubDate", "title", "pubDate"]);
        assert_eq!(fields.requested(), &["pubDate", "title"]);
        assert_eq!(fields.effective(), &["pubDate", "title"]);
    }

    #[test]
    fn test_field_set_drops_blank_names() {
        let fields = FieldSet::new(["", "  ", "title"]);
        assert_eq!(fields.requested(), &["title"]);
    }

    #[test]
    fn test_empty_field_set_still_has_date() {
        let fields = FieldSet::new(Vec::<String>::new());
        assert!(fields.requested().is_empty());
        assert_eq!(fields.effective(), &["pubDate"]);
    }

    #[test]
    fn test_columns_stay_aligned() {
        let fields = FieldSet::new(["title"]);
        let mut columns = ItemColumns::new(&fields);
        columns.push_item(&fields, vec![Some("A".into()), None]);
        columns.push_item(&fields, vec![None, Some("2012-11-30".into())]);

        assert_eq!(columns.len(), 2);
        assert_eq!(columns.column("title").unwrap().len(), 2);
        assert_eq!(columns.column("pubDate").unwrap().len(), 2);
        assert_eq!(columns.value("title", 0), Some("A"));
        assert_eq!(columns.value("title", 1), None);
        assert_eq!(columns.value("pubDate", 1), Some("2012-11-30"));
    }

    #[test]
    fn test_record_serializes_in_field_order() {
        let record = Record::new(vec![
            ("title".into(), Some("Hello".into())),
            ("link".into(), None),
        ]);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"title":"Hello","link":null}"#);
    }
}
