/// Declare a table.
///
/// Expands to a module holding the table marker `table`, the row struct
/// `Row`, and one zero-sized marker per column. An `id: Option<i64>` column
/// declared `INTEGER PRIMARY KEY` is always added as the first column.
///
/// ```
/// midoku_orm::table! {
///     pub mod author => "Author" {
///         name: String,
///         email: Option<String> [unique],
///     }
/// }
///
/// midoku_orm::table! {
///     pub mod book => "Book" {
///         title: String,
///         author_id: Option<i64>,
///     }
///     constraints {
///         foreign_key(author_id) references author(id);
///         unique(title, author_id);
///     }
/// }
///
/// fn main() {
///     use midoku_orm::Table;
///
///     assert_eq!(
///         book::table::schema().create_table(false).text,
///         "CREATE TABLE Book (id INTEGER PRIMARY KEY, title TEXT NOT NULL, author_id INTEGER, \
///          FOREIGN KEY (author_id) REFERENCES Author (id), UNIQUE (title, author_id));"
///     );
/// }
/// ```
///
/// Column names must be unique, and constraints may only name declared
/// columns; a foreign key must reference as many columns, of the same kinds,
/// as it lists. Violations fail to compile.
#[macro_export]
macro_rules! table {
    (
        $(#[$meta:meta])*
        $vis:vis mod $module:ident => $name:literal {
            $(
                $(#[$col_meta:meta])*
                $col:ident : $ty:ty $([$($cons:ident),* $(,)?])?
            ),+ $(,)?
        }
        $(
            constraints {
                $(
                    $kind:ident ($($c:ident),+ $(,)?)
                    $(references $ref_table:ident ($($r:ident),+ $(,)?))?
                );* $(;)?
            }
        )?
    ) => {
        $(#[$meta])*
        $vis mod $module {
            #![allow(non_camel_case_types, dead_code)]
            use super::*;

            /// Table marker.
            #[derive(Debug, Clone, Copy, Default)]
            pub struct table;

            #[derive(Debug, Clone, PartialEq)]
            pub struct Row {
                pub id: Option<i64>,
                $(pub $col: $ty,)+
            }

            #[repr(usize)]
            enum __Index {
                id,
                $($col,)+
            }

            /// Primary key, assigned by SQLite on first save.
            #[derive(Debug, Clone, Copy, Default)]
            pub struct id;

            $(
                $(#[$col_meta])*
                #[derive(Debug, Clone, Copy, Default)]
                pub struct $col;
            )+

            impl $crate::schema::Table for table {
                type Row = Row;

                const NAME: &'static str = $name;

                const COLUMNS: &'static [$crate::schema::ColumnInfo] = &[
                    $crate::schema::ColumnInfo::new::<Option<i64>>(
                        "id",
                        &[$crate::schema::ColumnConstraint::PrimaryKey],
                    ),
                    $(
                        $crate::schema::ColumnInfo::new::<$ty>(
                            stringify!($col),
                            &[$($($crate::__column_constraint!($cons)),*)?],
                        ),
                    )+
                ];

                fn constraints() -> Vec<$crate::schema::TableConstraint> {
                    vec![$($(
                        $crate::__table_constraint!(
                            $kind ($($c),+) $(references $ref_table ($($r),+))?
                        )
                    ),*)?]
                }
            }

            impl $crate::schema::KeyedTable for table {
                type PrimaryKey = id;
            }

            impl $crate::row::TableRow for Row {
                fn from_row(__row: &$crate::rusqlite::Row<'_>) -> $crate::rusqlite::Result<Self> {
                    Ok(Row {
                        id: __row.get(__Index::id as usize)?,
                        $($col: __row.get(__Index::$col as usize)?,)+
                    })
                }

                fn values(&self) -> Vec<$crate::rusqlite::types::Value> {
                    vec![
                        $crate::sql::SqlType::to_value(&self.id),
                        $($crate::sql::SqlType::to_value(&self.$col),)+
                    ]
                }
            }

            $crate::__column!(id: Option<i64>);
            $($crate::__column!($col: $ty);)+
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __column {
    ($col:ident : $ty:ty) => {
        impl $crate::schema::Column for $col {
            type Table = table;
            type Value = $ty;

            const INDEX: usize = __Index::$col as usize;

            fn value(__row: &Row) -> &$ty {
                &__row.$col
            }

            fn value_mut(__row: &mut Row) -> &mut $ty {
                &mut __row.$col
            }
        }

        impl $crate::expr::Expression for $col {
            type Kind = <$ty as $crate::sql::SqlType>::Kind;

            fn to_sql(&self, _: u8) -> $crate::sql::Sql {
                $crate::sql::Sql::new(stringify!($col))
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __column_constraint {
    (unique) => {
        $crate::schema::ColumnConstraint::Unique
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __table_constraint {
    (unique ($($c:ident),+)) => {
        $crate::schema::TableConstraint::unique::<($($c,)+)>()
    };
    (primary_key ($($c:ident),+)) => {
        $crate::schema::TableConstraint::primary_key::<($($c,)+)>()
    };
    (foreign_key ($($c:ident),+) references $table:ident ($($r:ident),+)) => {
        $crate::schema::TableConstraint::foreign_key::<($($c,)+), ($($table::$r,)+)>()
    };
}
