//! Lowered SQL fragments and the mapping from Rust values onto SQLite
//! storage classes.

use rusqlite::types::{FromSql, Value};

/// SQL text plus the values bound to its `?` placeholders.
///
/// Binds are always kept in the textual order of their placeholders, since
/// the driver binds parameters positionally.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sql {
    pub text: String,
    pub binds: Vec<Value>,
}

impl Sql {
    /// A fragment without any bound values.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            binds: Vec::new(),
        }
    }

    pub fn with_binds(text: impl Into<String>, binds: Vec<Value>) -> Self {
        Self {
            text: text.into(),
            binds,
        }
    }

    /// A single placeholder bound to `value`.
    pub fn bind(value: Value) -> Self {
        Self {
            text: "?".to_string(),
            binds: vec![value],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Append another fragment, text and binds both.
    pub fn append(&mut self, other: Sql) {
        self.text.push_str(&other.text);
        self.binds.extend(other.binds);
    }

    /// Join fragments with `sep`, skipping the ones with empty text.
    pub fn join(sep: &str, parts: impl IntoIterator<Item = Sql>) -> Sql {
        let mut joined = Sql::default();
        for part in parts {
            if part.is_empty() {
                continue;
            }
            if !joined.is_empty() {
                joined.text.push_str(sep);
            }
            joined.append(part);
        }
        joined
    }

    pub fn parenthesize(self) -> Sql {
        Sql {
            text: format!("({})", self.text),
            binds: self.binds,
        }
    }
}

/// Type-level tags for the value kind of an expression.
///
/// Comparisons require both operands to share a kind; boolean combinators
/// require [`Bool`](kind::Bool) operands.
pub mod kind {
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Integer;

    #[derive(Debug, Clone, Copy, Default)]
    pub struct Real;

    #[derive(Debug, Clone, Copy, Default)]
    pub struct Text;

    #[derive(Debug, Clone, Copy, Default)]
    pub struct Blob;

    #[derive(Debug, Clone, Copy, Default)]
    pub struct Bool;
}

/// A Rust type that can be stored in a column.
///
/// Nullability lives in the type: `Option<T>` is the nullable form of `T`,
/// everything else is emitted as `NOT NULL`.
pub trait SqlType: FromSql + Clone + 'static {
    type Kind;

    /// Column type used in `CREATE TABLE`.
    const SQL_NAME: &'static str;

    const NULLABLE: bool = false;

    fn to_value(&self) -> Value;
}

impl SqlType for i64 {
    type Kind = kind::Integer;
    const SQL_NAME: &'static str = "INTEGER";

    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }
}

impl SqlType for f64 {
    type Kind = kind::Real;
    const SQL_NAME: &'static str = "REAL";

    fn to_value(&self) -> Value {
        Value::Real(*self)
    }
}

impl SqlType for bool {
    type Kind = kind::Bool;
    const SQL_NAME: &'static str = "BOOLEAN";

    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl SqlType for String {
    type Kind = kind::Text;
    const SQL_NAME: &'static str = "TEXT";

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl SqlType for Vec<u8> {
    type Kind = kind::Blob;
    const SQL_NAME: &'static str = "BLOB";

    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }
}

impl<T: SqlType> SqlType for Option<T> {
    type Kind = T::Kind;
    const SQL_NAME: &'static str = T::SQL_NAME;
    const NULLABLE: bool = true;

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

/// Value types whose column may hold `NULL`.
///
/// Only such columns can be added to a table that already has rows, since
/// existing rows get `NULL` in the new column.
pub trait Nullable: SqlType {}

impl<T: SqlType> Nullable for Option<T> {}
