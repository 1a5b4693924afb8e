use serde::Serialize;

/// One normalized search result row: named string fields in insertion order.
///
/// Field order is preserved all the way to display, and no field name appears
/// twice - setting an existing name replaces its value in place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Builder-style field append; replaces the value if the name is taken.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.set(name, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::Record;

    #[test]
    fn fields_iterate_in_insertion_order() {
        let record = Record::new()
            .with("Type", "A")
            .with("TTL", "300")
            .with("Value", "1.2.3.4");

        let fields: Vec<_> = record.fields().collect();
        assert_eq!(fields, vec![("Type", "A"), ("TTL", "300"), ("Value", "1.2.3.4")]);
    }

    #[test]
    fn round_trip_from_pairs_preserves_order_and_values() {
        let pairs = vec![("Name", "web-1"), ("Type", "t3.small"), ("VPC", "vpc-1"), ("Region", "us-east-1")];
        let record: Record = pairs.clone().into_iter().collect();
        let observed: Vec<_> = record.fields().map(|(n, v)| (n.to_owned(), v.to_owned())).collect();
        let expected: Vec<_> =
            pairs.into_iter().map(|(n, v)| (n.to_owned(), v.to_owned())).collect();
        assert_eq!(observed, expected);
    }

    #[test]
    fn setting_an_existing_name_replaces_in_place() {
        let record = Record::new().with("Name", "old").with("Region", "ams3").with("Name", "new");
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("Name"), Some("new"));
        let first = record.fields().next();
        assert_eq!(first, Some(("Name", "new")));
    }

    #[test]
    fn equality_is_structural_and_order_sensitive() {
        let a = Record::new().with("Name", "x").with("Region", "y");
        let b = Record::new().with("Name", "x").with("Region", "y");
        let c = Record::new().with("Region", "y").with("Name", "x");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
