use super::connection::ConnectionError;

///
/// Cell
///
/// One decoded column value. Introspection queries only produce these shapes.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Oid(u32),
    Text(String),
    IntArray(Vec<i64>),
}

impl Cell {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Oid(_) => "oid",
            Self::Text(_) => "text",
            Self::IntArray(_) => "int[]",
        }
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Self::Oid(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<i64>> for Cell {
    fn from(value: Vec<i64>) -> Self {
        Self::IntArray(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

///
/// Row
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Row(pub Vec<Cell>);

impl Row {
    #[must_use]
    pub const fn new(cells: Vec<Cell>) -> Self {
        Self(cells)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn cell(&self, index: usize) -> Result<&Cell, ConnectionError> {
        self.0.get(index).ok_or(ConnectionError::Decode {
            index,
            expected: "value",
            found: "nothing",
        })
    }

    fn mismatch(index: usize, expected: &'static str, cell: &Cell) -> ConnectionError {
        ConnectionError::Decode {
            index,
            expected,
            found: cell.kind(),
        }
    }

    pub fn bool(&self, index: usize) -> Result<bool, ConnectionError> {
        match self.cell(index)? {
            Cell::Bool(value) => Ok(*value),
            other => Err(Self::mismatch(index, "bool", other)),
        }
    }

    pub fn int(&self, index: usize) -> Result<i64, ConnectionError> {
        match self.cell(index)? {
            Cell::Int(value) => Ok(*value),
            Cell::Oid(value) => Ok(i64::from(*value)),
            other => Err(Self::mismatch(index, "int", other)),
        }
    }

    pub fn oid(&self, index: usize) -> Result<u32, ConnectionError> {
        match self.cell(index)? {
            Cell::Oid(value) => Ok(*value),
            cell @ Cell::Int(value) => {
                u32::try_from(*value).map_err(|_| Self::mismatch(index, "oid", cell))
            }
            other => Err(Self::mismatch(index, "oid", other)),
        }
    }

    pub fn text(&self, index: usize) -> Result<&str, ConnectionError> {
        match self.cell(index)? {
            Cell::Text(value) => Ok(value),
            other => Err(Self::mismatch(index, "text", other)),
        }
    }

    /// Single-character text column (`"char"` cast to text).
    pub fn char(&self, index: usize) -> Result<char, ConnectionError> {
        let cell = self.cell(index)?;
        let text = self.text(index)?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Self::mismatch(index, "char", cell)),
        }
    }

    /// Integer array; SQL NULL decodes as empty.
    pub fn int_array(&self, index: usize) -> Result<Vec<i64>, ConnectionError> {
        match self.cell(index)? {
            Cell::IntArray(values) => Ok(values.clone()),
            Cell::Null => Ok(Vec::new()),
            other => Err(Self::mismatch(index, "int[]", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_decode_matching_cells() {
        let row = Row::new(vec![
            Cell::Bool(true),
            Cell::Int(42),
            Cell::Oid(25),
            Cell::from("b"),
            Cell::from(Some(vec![1, 3])),
            Cell::from(None::<Vec<i64>>),
        ]);

        assert!(row.bool(0).unwrap());
        assert_eq!(row.int(1).unwrap(), 42);
        assert_eq!(row.oid(2).unwrap(), 25);
        assert_eq!(row.oid(1).unwrap(), 42);
        assert_eq!(row.char(3).unwrap(), 'b');
        assert_eq!(row.int_array(4).unwrap(), vec![1, 3]);
        assert!(row.int_array(5).unwrap().is_empty());
    }

    #[test]
    fn accessors_report_mismatches() {
        let row = Row::new(vec![Cell::from("text"), Cell::Int(-1)]);

        assert!(matches!(
            row.bool(0).unwrap_err(),
            ConnectionError::Decode { index: 0, expected: "bool", found: "text" }
        ));
        assert!(row.oid(1).is_err());
        assert!(row.char(0).is_err());
        assert!(row.text(7).is_err());
    }
}
