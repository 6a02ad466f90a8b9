//! Ordered header storage.
//!
//! Headers are kept as a flat list of `(name, value)` pairs in arrival order,
//! with the original name casing preserved. Lookup is case-insensitive, and
//! duplicates stay visible so validation can reject e.g. a repeated `Host`
//! header instead of silently merging it.

/// An ordered collection of header fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    fields: Vec<FieldLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldLine {
    name: String,
    value: String,
}

impl HeaderFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of header fields, duplicates included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Appends a field, keeping any existing fields with the same name.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(FieldLine { name: name.into(), value: value.into() });
    }

    /// Replaces all fields named `name` with a single field carrying `value`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.fields.retain(|field| !field.name.eq_ignore_ascii_case(&name));
        self.fields.push(FieldLine { name, value: value.into() });
    }

    /// Returns the value of the first field named `name`, compared
    /// case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|field| field.name.eq_ignore_ascii_case(name)).map(|field| field.value.as_str())
    }

    /// Returns the values of every field named `name`, in arrival order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.fields.iter().filter(move |field| field.name.eq_ignore_ascii_case(name)).map(|field| field.value.as_str())
    }

    /// Number of fields named `name`.
    pub fn count(&self, name: &str) -> usize {
        self.fields.iter().filter(|field| field.name.eq_ignore_ascii_case(name)).count()
    }

    /// Iterates over `(name, value)` pairs in arrival order with original
    /// name casing.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|field| (field.name.as_str(), field.value.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_and_case_preserving() {
        let mut fields = HeaderFields::new();
        fields.push("Host", "localhost:8080");
        fields.push("X-Custom", "1");

        assert_eq!(fields.get("host"), Some("localhost:8080"));
        assert_eq!(fields.get("HOST"), Some("localhost:8080"));
        assert_eq!(fields.get("x-custom"), Some("1"));

        let names: Vec<&str> = fields.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Host", "X-Custom"]);
    }

    #[test]
    fn order_and_duplicates_are_preserved() {
        let mut fields = HeaderFields::new();
        fields.push("Accept", "text/html");
        fields.push("Host", "a");
        fields.push("host", "b");

        assert_eq!(fields.len(), 3);
        assert_eq!(fields.count("Host"), 2);
        assert_eq!(fields.get("Host"), Some("a"));
        assert_eq!(fields.get_all("Host").collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn set_collapses_duplicates() {
        let mut fields = HeaderFields::new();
        fields.push("Connection", "keep-alive");
        fields.push("connection", "keep-alive");
        fields.set("Connection", "close");

        assert_eq!(fields.count("connection"), 1);
        assert_eq!(fields.get("Connection"), Some("close"));
    }
}
