//! `SELECT` statement builder.
//!
//! A [`Select`] has at most one `WHERE`, one `ORDER BY` and one `LIMIT`.
//! Each builder method is only available while its slot is still empty, so
//! a second `filter` is a compile error rather than invalid SQL. The clauses
//! are always emitted in `WHERE`, `ORDER BY`, `LIMIT` order.

use rusqlite::types::Value;

use crate::expr::{Expression, ExpressionList, precedence};
use crate::schema::Table;
use crate::sql::Sql;
use crate::sql::kind::Bool;

/// Something to select from.
pub trait Source {
    fn table_name(&self) -> &'static str;

    fn columns_sql(&self) -> Sql;
}

/// A table selects all its declared columns, in declaration order.
impl<T: Table> Source for T {
    fn table_name(&self) -> &'static str {
        T::NAME
    }

    fn columns_sql(&self) -> Sql {
        Sql::new(
            T::COLUMNS
                .iter()
                .map(|c| c.name)
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

/// Explicit expressions selected from a table, e.g. aggregates.
#[derive(Debug, Clone)]
pub struct Projection<T, L> {
    pub table: T,
    pub columns: L,
}

pub fn project<T: Table, L: ExpressionList>(table: T, columns: L) -> Projection<T, L> {
    Projection { table, columns }
}

impl<T: Table, L: ExpressionList> Source for Projection<T, L> {
    fn table_name(&self) -> &'static str {
        T::NAME
    }

    fn columns_sql(&self) -> Sql {
        Sql::join(", ", self.columns.to_sql_list())
    }
}

/// A clause of a select statement. `()` stands for an absent clause.
pub trait Constraint {
    fn to_sql(&self) -> Sql;
}

impl Constraint for () {
    fn to_sql(&self) -> Sql {
        Sql::default()
    }
}

#[derive(Debug, Clone)]
pub struct Where<E>(pub E);

impl<E: Expression<Kind = Bool>> Constraint for Where<E> {
    fn to_sql(&self) -> Sql {
        let mut sql = Sql::new("WHERE ");
        sql.append(self.0.to_sql(precedence::TOP));
        sql
    }
}

#[derive(Debug, Clone)]
pub struct OrderBy<E> {
    pub expr: E,
    pub descending: bool,
}

impl<E: Expression> Constraint for OrderBy<E> {
    fn to_sql(&self) -> Sql {
        let mut sql = Sql::new("ORDER BY ");
        sql.append(self.expr.to_sql(precedence::ATOM));
        if self.descending {
            sql.push_str(" DESC");
        }
        sql
    }
}

/// Row limit, bound as a parameter.
#[derive(Debug, Clone, Copy)]
pub struct Limit(pub u32);

impl Constraint for Limit {
    fn to_sql(&self) -> Sql {
        Sql::with_binds("LIMIT ?", vec![Value::Integer(i64::from(self.0))])
    }
}

/// A select statement under construction.
#[derive(Debug, Clone)]
pub struct Select<S, W = (), O = (), L = ()> {
    pub source: S,
    pub filter: W,
    pub order: O,
    pub limit: L,
}

pub fn select<S: Source>(source: S) -> Select<S> {
    Select {
        source,
        filter: (),
        order: (),
        limit: (),
    }
}

impl<S, O, L> Select<S, (), O, L> {
    pub fn filter<E: Expression<Kind = Bool>>(self, expr: E) -> Select<S, Where<E>, O, L> {
        Select {
            source: self.source,
            filter: Where(expr),
            order: self.order,
            limit: self.limit,
        }
    }
}

impl<S, W, L> Select<S, W, (), L> {
    pub fn order_by<E: Expression>(self, expr: E) -> Select<S, W, OrderBy<E>, L> {
        self.ordered(expr, false)
    }

    pub fn order_by_desc<E: Expression>(self, expr: E) -> Select<S, W, OrderBy<E>, L> {
        self.ordered(expr, true)
    }

    fn ordered<E: Expression>(self, expr: E, descending: bool) -> Select<S, W, OrderBy<E>, L> {
        Select {
            source: self.source,
            filter: self.filter,
            order: OrderBy { expr, descending },
            limit: self.limit,
        }
    }
}

impl<S, W, O> Select<S, W, O, ()> {
    pub fn limit(self, rows: u32) -> Select<S, W, O, Limit> {
        Select {
            source: self.source,
            filter: self.filter,
            order: self.order,
            limit: Limit(rows),
        }
    }
}

impl<S, W, O, L> Select<S, W, O, L>
where
    S: Source,
    W: Constraint,
    O: Constraint,
    L: Constraint,
{
    fn body(&self) -> Sql {
        let mut sql = Sql::new("SELECT ");
        sql.append(self.source.columns_sql());
        sql.push_str(" FROM ");
        sql.push_str(self.source.table_name());
        let constraints = Sql::join(
            " ",
            [self.filter.to_sql(), self.order.to_sql(), self.limit.to_sql()],
        );
        if !constraints.is_empty() {
            sql.push_str(" ");
            sql.append(constraints);
        }
        sql
    }

    /// The complete statement: `SELECT cols FROM table [constraints];`
    pub fn sql_query(&self) -> Sql {
        let mut sql = self.body();
        sql.push_str(";");
        sql
    }

    /// The same select as a parenthesized sub-select.
    pub fn sql_expression(&self) -> Sql {
        self.body().parenthesize()
    }
}

/// A select of exactly one expression is a scalar sub-select of that
/// expression's kind.
impl<T, E, W, O, L> Expression for Select<Projection<T, (E,)>, W, O, L>
where
    T: Table,
    E: Expression,
    W: Constraint,
    O: Constraint,
    L: Constraint,
{
    type Kind = E::Kind;

    fn to_sql(&self, _: u8) -> Sql {
        self.sql_expression()
    }
}
