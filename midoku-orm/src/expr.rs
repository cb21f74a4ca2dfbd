//! Typed SQL expression trees.
//!
//! Expressions are plain values built bottom-up. They only turn into SQL when
//! lowered with [`Expression::to_sql`], which takes the precedence of the
//! enclosing context and returns the text plus its binds in placeholder
//! order.

use std::marker::PhantomData;

use crate::sql::kind::{Blob, Bool, Integer, Real, Text};
use crate::sql::{Sql, SqlType};

/// Operator precedences. A higher number binds looser.
pub mod precedence {
    /// Context of a complete expression, e.g. a `WHERE` clause.
    pub const TOP: u8 = 100;
    pub const OR: u8 = 80;
    pub const AND: u8 = 70;
    pub const EQ: u8 = 60;
    pub const COMPARE: u8 = 50;
    /// Context that forces every binary operand into parentheses.
    pub const ATOM: u8 = 0;
}

pub trait Expression {
    /// Value kind this expression evaluates to (see [`crate::sql::kind`]).
    type Kind;

    /// Lower into SQL for a context of the given precedence.
    fn to_sql(&self, precedence: u8) -> Sql;
}

/// A literal, always passed as a bound parameter.
#[derive(Debug, Clone)]
pub struct Value<T>(pub T);

impl<T: SqlType> Expression for Value<T> {
    type Kind = T::Kind;

    fn to_sql(&self, _: u8) -> Sql {
        Sql::bind(self.0.to_value())
    }
}

/// Boolean negation.
#[derive(Debug, Clone)]
pub struct Not<E> {
    pub expr: E,
}

impl<E: Expression<Kind = Bool>> Expression for Not<E> {
    type Kind = Bool;

    fn to_sql(&self, _: u8) -> Sql {
        let mut sql = Sql::new("NOT ");
        sql.append(self.expr.to_sql(precedence::ATOM));
        sql
    }
}

fn lower_binary<L: Expression, R: Expression>(
    lhs: &L,
    rhs: &R,
    op: &str,
    own: u8,
    context: u8,
) -> Sql {
    let mut sql = lhs.to_sql(own);
    sql.push_str(" ");
    sql.push_str(op);
    sql.push_str(" ");
    sql.append(rhs.to_sql(own));
    if context < own { sql.parenthesize() } else { sql }
}

macro_rules! binary_expression {
    ($(#[$meta:meta])* $name:ident, $op:literal, $prec:expr, bool) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name<L, R> {
            pub lhs: L,
            pub rhs: R,
        }

        impl<L, R> $name<L, R> {
            pub fn new(lhs: L, rhs: R) -> Self {
                Self { lhs, rhs }
            }
        }

        impl<L, R> Expression for $name<L, R>
        where
            L: Expression<Kind = Bool>,
            R: Expression<Kind = Bool>,
        {
            type Kind = Bool;

            fn to_sql(&self, precedence: u8) -> Sql {
                lower_binary(&self.lhs, &self.rhs, $op, $prec, precedence)
            }
        }
    };
    ($(#[$meta:meta])* $name:ident, $op:literal, $prec:expr, compare) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name<L, R> {
            pub lhs: L,
            pub rhs: R,
        }

        impl<L, R> $name<L, R> {
            pub fn new(lhs: L, rhs: R) -> Self {
                Self { lhs, rhs }
            }
        }

        impl<L, R> Expression for $name<L, R>
        where
            L: Expression,
            R: Expression<Kind = L::Kind>,
        {
            type Kind = Bool;

            fn to_sql(&self, precedence: u8) -> Sql {
                lower_binary(&self.lhs, &self.rhs, $op, $prec, precedence)
            }
        }
    };
}

binary_expression!(
    /// Boolean conjunction.
    And, "AND", precedence::AND, bool
);
binary_expression!(
    /// Boolean disjunction.
    Or, "OR", precedence::OR, bool
);
binary_expression!(Eq, "=", precedence::EQ, compare);
binary_expression!(Less, "<", precedence::COMPARE, compare);
binary_expression!(Greater, ">", precedence::COMPARE, compare);

/// A list of expressions, written as a tuple. Used for function arguments
/// and projections.
pub trait ExpressionList {
    fn to_sql_list(&self) -> Vec<Sql>;
}

impl ExpressionList for () {
    fn to_sql_list(&self) -> Vec<Sql> {
        Vec::new()
    }
}

macro_rules! impl_expression_list {
    ($($name:ident . $idx:tt),+) => {
        impl<$($name: Expression),+> ExpressionList for ($($name,)+) {
            fn to_sql_list(&self) -> Vec<Sql> {
                vec![$(self.$idx.to_sql(precedence::TOP)),+]
            }
        }
    };
}

impl_expression_list!(A.0);
impl_expression_list!(A.0, B.1);
impl_expression_list!(A.0, B.1, C.2);
impl_expression_list!(A.0, B.1, C.2, D.3);
impl_expression_list!(A.0, B.1, C.2, D.3, E.4);
impl_expression_list!(A.0, B.1, C.2, D.3, E.4, F.5);

/// SQL function call `name(args...)` evaluating to kind `K`.
#[derive(Debug, Clone)]
pub struct Function<K, A> {
    pub name: &'static str,
    pub args: A,
    kind: PhantomData<K>,
}

impl<K, A: ExpressionList> Function<K, A> {
    pub fn new(name: &'static str, args: A) -> Self {
        Self {
            name,
            args,
            kind: PhantomData,
        }
    }
}

impl<K, A: ExpressionList> Expression for Function<K, A> {
    type Kind = K;

    fn to_sql(&self, _: u8) -> Sql {
        let mut sql = Sql::new(format!("{}(", self.name));
        sql.append(Sql::join(", ", self.args.to_sql_list()));
        sql.push_str(")");
        sql
    }
}

pub fn sum<E: Expression>(expr: E) -> Function<E::Kind, (E,)> {
    Function::new("sum", (expr,))
}

pub fn min<E: Expression>(expr: E) -> Function<E::Kind, (E,)> {
    Function::new("min", (expr,))
}

pub fn max<E: Expression>(expr: E) -> Function<E::Kind, (E,)> {
    Function::new("max", (expr,))
}

pub fn count() -> Function<Integer, ()> {
    Function::new("count", ())
}

/// SQLite `datetime()`, normalizing an ISO-8601 timestamp for ordering.
pub fn datetime<E: Expression<Kind = Text>>(expr: E) -> Function<Text, (E,)> {
    Function::new("datetime", (expr,))
}

/// Conversion into an expression of kind `K`. Expressions convert to
/// themselves; plain Rust values become bound [`Value`]s.
pub trait AsExpression<K> {
    type Expression: Expression<Kind = K>;

    fn as_expression(self) -> Self::Expression;
}

impl<E: Expression> AsExpression<E::Kind> for E {
    type Expression = E;

    fn as_expression(self) -> E {
        self
    }
}

macro_rules! value_as_expression {
    ($kind:ty, $ty:ty => $stored:ty, |$v:ident| $convert:expr) => {
        impl AsExpression<$kind> for $ty {
            type Expression = Value<$stored>;

            fn as_expression(self) -> Value<$stored> {
                let $v = self;
                Value($convert)
            }
        }
    };
}

value_as_expression!(Integer, i64 => i64, |v| v);
value_as_expression!(Integer, i32 => i64, |v| i64::from(v));
value_as_expression!(Real, f64 => f64, |v| v);
value_as_expression!(Bool, bool => bool, |v| v);
value_as_expression!(Text, String => String, |v| v);
value_as_expression!(Text, &str => String, |v| v.to_string());
value_as_expression!(Blob, Vec<u8> => Vec<u8>, |v| v);
value_as_expression!(Blob, &[u8] => Vec<u8>, |v| v.to_vec());

/// Comparison operators on any expression.
pub trait ExpressionMethods: Expression + Sized {
    fn eq<R: AsExpression<Self::Kind>>(self, rhs: R) -> Eq<Self, R::Expression> {
        Eq::new(self, rhs.as_expression())
    }

    fn lt<R: AsExpression<Self::Kind>>(self, rhs: R) -> Less<Self, R::Expression> {
        Less::new(self, rhs.as_expression())
    }

    fn gt<R: AsExpression<Self::Kind>>(self, rhs: R) -> Greater<Self, R::Expression> {
        Greater::new(self, rhs.as_expression())
    }
}

impl<E: Expression> ExpressionMethods for E {}

/// Boolean combinators. Always pairwise; chains associate to the left.
pub trait BoolExpressionMethods: Expression<Kind = Bool> + Sized {
    fn and<R: Expression<Kind = Bool>>(self, rhs: R) -> And<Self, R> {
        And::new(self, rhs)
    }

    fn or<R: Expression<Kind = Bool>>(self, rhs: R) -> Or<Self, R> {
        Or::new(self, rhs)
    }

    fn not(self) -> Not<Self> {
        Not { expr: self }
    }
}

impl<E: Expression<Kind = Bool>> BoolExpressionMethods for E {}
