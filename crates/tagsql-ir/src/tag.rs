use std::collections::BTreeMap;

///
/// Tag
///
/// Raw annotation options of one field, keyed by option name (`rel`, `sql`).
/// Values are kept verbatim; each consumer applies its own grammar.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tag(BTreeMap<String, String>);

impl Tag {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn sql(&self) -> Option<&str> {
        self.get("sql").map(str::trim)
    }

    #[must_use]
    pub fn rel(&self) -> Option<&str> {
        self.get("rel").map(str::trim)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

///
/// FieldOptions
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[expect(clippy::struct_excessive_bools)]
pub struct FieldOptions {
    /// Value travels as JSON.
    pub json: bool,
    /// Value travels as XML.
    pub xml: bool,
    /// Allow assignment through a database cast.
    pub cast: bool,
    pub read_only: bool,
    pub write_only: bool,
}

///
/// ColumnTag
///
/// Parsed `sql:"<column>[,opt...]"` value of a record field.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnTag {
    pub column: String,
    pub options: FieldOptions,
}

impl ColumnTag {
    /// Parse a record field tag; unknown options are returned as the error.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut parts = raw.split(',').map(str::trim);
        let column = parts.next().unwrap_or_default().to_string();

        let mut options = FieldOptions::default();
        for opt in parts {
            match opt {
                "json" => options.json = true,
                "xml" => options.xml = true,
                "cast" => options.cast = true,
                "ro" => options.read_only = true,
                "wo" => options.write_only = true,
                "" => {}
                other => return Err(format!("unknown option '{other}'")),
            }
        }
        if options.read_only && options.write_only {
            return Err("options 'ro' and 'wo' are exclusive".to_string());
        }

        Ok(Self { column, options })
    }

    #[must_use]
    pub fn is_skip(&self) -> bool {
        self.column == "-"
    }

    /// `>prefix` marks a nested record flattened under a column prefix.
    #[must_use]
    pub fn nested_prefix(&self) -> Option<&str> {
        self.column.strip_prefix('>')
    }
}

/// Split on `sep` outside single quotes and parentheses, trimming each part.
#[must_use]
pub fn split_top_level(raw: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start = 0;

    for (idx, ch) in raw.char_indices() {
        match ch {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth = depth.saturating_sub(1),
            c if c == sep && !quoted && depth == 0 => {
                parts.push(raw[start..idx].trim());
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(raw[start..].trim());

    parts
}
