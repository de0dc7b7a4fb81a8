//! Condition trees and their SQL compilation.
//!
//! A [`Cond`] is a structured WHERE clause. A [`ConditionCompiler`] turns it
//! into a SQL fragment with `?` placeholders plus the positional arguments.

use rowcast_common::constants::PLACEHOLDER;
use rowcast_common::error::RowcastResult;
use rowcast_common::types::ScalarValue;

/// A condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Cond {
    /// `col = ?`
    Eq(String, ScalarValue),
    /// `col <> ?`
    Neq(String, ScalarValue),
    /// `col < ?`
    Lt(String, ScalarValue),
    /// `col <= ?`
    Lte(String, ScalarValue),
    /// `col > ?`
    Gt(String, ScalarValue),
    /// `col >= ?`
    Gte(String, ScalarValue),
    /// `col LIKE ?`, the pattern wrapped in `%`.
    Like(String, String),
    /// `col IN (?, ...)`
    In(String, Vec<ScalarValue>),
    /// `col NOT IN (?, ...)`
    NotIn(String, Vec<ScalarValue>),
    /// `col IS NULL`
    IsNull(String),
    /// `col IS NOT NULL`
    NotNull(String),
    /// Raw SQL with its own placeholders.
    Expr(String, Vec<ScalarValue>),
    /// Conjunction.
    And(Vec<Cond>),
    /// Disjunction.
    Or(Vec<Cond>),
    /// Negation.
    Not(Box<Cond>),
}

impl Default for Cond {
    fn default() -> Self {
        Cond::And(Vec::new())
    }
}

impl Cond {
    /// `col = value`
    pub fn eq(col: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Cond::Eq(col.into(), value.into())
    }

    /// `col <> value`
    pub fn neq(col: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Cond::Neq(col.into(), value.into())
    }

    /// `col < value`
    pub fn lt(col: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Cond::Lt(col.into(), value.into())
    }

    /// `col <= value`
    pub fn lte(col: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Cond::Lte(col.into(), value.into())
    }

    /// `col > value`
    pub fn gt(col: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Cond::Gt(col.into(), value.into())
    }

    /// `col >= value`
    pub fn gte(col: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Cond::Gte(col.into(), value.into())
    }

    /// `col LIKE %pattern%`
    pub fn like(col: impl Into<String>, pattern: impl Into<String>) -> Self {
        Cond::Like(col.into(), pattern.into())
    }

    /// `col IN (values)`
    pub fn in_list<I, V>(col: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ScalarValue>,
    {
        Cond::In(col.into(), values.into_iter().map(Into::into).collect())
    }

    /// `col NOT IN (values)`
    pub fn not_in<I, V>(col: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ScalarValue>,
    {
        Cond::NotIn(col.into(), values.into_iter().map(Into::into).collect())
    }

    /// `col IS NULL`
    pub fn is_null(col: impl Into<String>) -> Self {
        Cond::IsNull(col.into())
    }

    /// `col IS NOT NULL`
    pub fn not_null(col: impl Into<String>) -> Self {
        Cond::NotNull(col.into())
    }

    /// Raw SQL fragment with arguments.
    pub fn expr(sql: impl Into<String>, args: Vec<ScalarValue>) -> Self {
        Cond::Expr(sql.into(), args)
    }

    /// Returns true if this condition renders to nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Cond::And(children) | Cond::Or(children) => children.iter().all(Cond::is_empty),
            Cond::Not(inner) => inner.is_empty(),
            Cond::Expr(sql, _) => sql.trim().is_empty(),
            _ => false,
        }
    }

    /// Combines with `other` using AND, flattening nested conjunctions.
    #[must_use]
    pub fn and(self, other: Cond) -> Cond {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        match (self, other) {
            (Cond::And(mut left), Cond::And(right)) => {
                left.extend(right);
                Cond::And(left)
            }
            (Cond::And(mut left), right) => {
                left.push(right);
                Cond::And(left)
            }
            (left, right) => Cond::And(vec![left, right]),
        }
    }

    /// Combines with `other` using OR, flattening nested disjunctions.
    #[must_use]
    pub fn or(self, other: Cond) -> Cond {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        match (self, other) {
            (Cond::Or(mut left), Cond::Or(right)) => {
                left.extend(right);
                Cond::Or(left)
            }
            (Cond::Or(mut left), right) => {
                left.push(right);
                Cond::Or(left)
            }
            (left, right) => Cond::Or(vec![left, right]),
        }
    }

    /// Negates this condition.
    #[must_use]
    pub fn negate(self) -> Cond {
        Cond::Not(Box::new(self))
    }
}

/// Compiles a condition tree into a SQL fragment and arguments.
///
/// Implementations report trees they cannot render as
/// [`RowcastError::ConditionCompile`](rowcast_common::error::RowcastError::ConditionCompile).
pub trait ConditionCompiler {
    /// Returns the fragment (empty for an empty tree) and its arguments.
    fn compile(&self, cond: &Cond) -> RowcastResult<(String, Vec<ScalarValue>)>;
}

/// Renders conditions as ANSI SQL with `?` placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlCondCompiler;

impl SqlCondCompiler {
    /// Creates a compiler.
    pub fn new() -> Self {
        Self
    }

    fn write(&self, cond: &Cond, sql: &mut String, args: &mut Vec<ScalarValue>) -> RowcastResult<()> {
        match cond {
            Cond::Eq(col, v) => compare(col, "=", v, sql, args),
            Cond::Neq(col, v) => compare(col, "<>", v, sql, args),
            Cond::Lt(col, v) => compare(col, "<", v, sql, args),
            Cond::Lte(col, v) => compare(col, "<=", v, sql, args),
            Cond::Gt(col, v) => compare(col, ">", v, sql, args),
            Cond::Gte(col, v) => compare(col, ">=", v, sql, args),
            Cond::Like(col, pattern) => {
                sql.push_str(col);
                sql.push_str(" LIKE ?");
                args.push(ScalarValue::Text(format!("%{pattern}%")));
            }
            Cond::In(col, values) => membership(col, "IN", "0=1", values, sql, args),
            Cond::NotIn(col, values) => membership(col, "NOT IN", "0=0", values, sql, args),
            Cond::IsNull(col) => {
                sql.push_str(col);
                sql.push_str(" IS NULL");
            }
            Cond::NotNull(col) => {
                sql.push_str(col);
                sql.push_str(" IS NOT NULL");
            }
            Cond::Expr(expr, expr_args) => {
                // Passed through verbatim; `?` may be a literal or an operator.
                sql.push_str(expr);
                args.extend(expr_args.iter().cloned());
            }
            Cond::And(children) => self.write_joined(children, " AND ", true, sql, args)?,
            Cond::Or(children) => self.write_joined(children, " OR ", false, sql, args)?,
            Cond::Not(inner) => {
                let mut fragment = String::new();
                self.write(inner, &mut fragment, args)?;
                if !fragment.is_empty() {
                    sql.push_str("NOT (");
                    sql.push_str(&fragment);
                    sql.push(')');
                }
            }
        }
        Ok(())
    }

    fn write_joined(
        &self,
        children: &[Cond],
        separator: &str,
        conjunction: bool,
        sql: &mut String,
        args: &mut Vec<ScalarValue>,
    ) -> RowcastResult<()> {
        let live: Vec<&Cond> = children.iter().filter(|c| !c.is_empty()).collect();
        for (i, child) in live.iter().enumerate() {
            if i > 0 {
                sql.push_str(separator);
            }
            let wrap = live.len() > 1
                && match child {
                    Cond::Expr(..) => true,
                    Cond::Or(_) => conjunction,
                    Cond::And(_) => !conjunction,
                    _ => false,
                };
            if wrap {
                sql.push('(');
            }
            self.write(child, sql, args)?;
            if wrap {
                sql.push(')');
            }
        }
        Ok(())
    }
}

fn compare(col: &str, op: &str, value: &ScalarValue, sql: &mut String, args: &mut Vec<ScalarValue>) {
    sql.push_str(col);
    sql.push_str(op);
    sql.push(PLACEHOLDER);
    args.push(value.clone());
}

fn membership(
    col: &str,
    op: &str,
    when_empty: &str,
    values: &[ScalarValue],
    sql: &mut String,
    args: &mut Vec<ScalarValue>,
) {
    if values.is_empty() {
        sql.push_str(when_empty);
        return;
    }
    let markers = vec!["?"; values.len()].join(",");
    sql.push_str(&format!("{col} {op} ({markers})"));
    args.extend(values.iter().cloned());
}

impl ConditionCompiler for SqlCondCompiler {
    fn compile(&self, cond: &Cond) -> RowcastResult<(String, Vec<ScalarValue>)> {
        let mut sql = String::new();
        let mut args = Vec::new();
        self.write(cond, &mut sql, &mut args)?;
        Ok((sql, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(cond: &Cond) -> (String, Vec<ScalarValue>) {
        SqlCondCompiler::new().compile(cond).unwrap()
    }

    #[test]
    fn test_empty() {
        let (sql, args) = compile(&Cond::default());
        assert!(sql.is_empty());
        assert!(args.is_empty());
        assert!(Cond::default().and(Cond::default()).is_empty());
    }

    #[test]
    fn test_comparisons() {
        let (sql, args) = compile(&Cond::eq("id", 1i64).and(Cond::gte("age", 18i32)));
        assert_eq!(sql, "id=? AND age>=?");
        assert_eq!(args, vec![ScalarValue::Int64(1), ScalarValue::Int32(18)]);

        let (sql, _) = compile(&Cond::neq("a", 1i32));
        assert_eq!(sql, "a<>?");
    }

    #[test]
    fn test_like_wraps_pattern() {
        let (sql, args) = compile(&Cond::like("name", "bo"));
        assert_eq!(sql, "name LIKE ?");
        assert_eq!(args, vec![ScalarValue::text("%bo%")]);
    }

    #[test]
    fn test_in_lists() {
        let (sql, args) = compile(&Cond::in_list("id", [1i64, 2, 3]));
        assert_eq!(sql, "id IN (?,?,?)");
        assert_eq!(args.len(), 3);

        let (sql, _) = compile(&Cond::in_list("id", Vec::<i64>::new()));
        assert_eq!(sql, "0=1");
        let (sql, _) = compile(&Cond::not_in("id", Vec::<i64>::new()));
        assert_eq!(sql, "0=0");
    }

    #[test]
    fn test_nesting_parenthesized() {
        let cond = Cond::eq("a", 1i32).and(Cond::eq("b", 2i32).or(Cond::eq("c", 3i32)));
        let (sql, args) = compile(&cond);
        assert_eq!(sql, "a=? AND (b=? OR c=?)");
        assert_eq!(args.len(), 3);

        let cond = Cond::eq("a", 1i32)
            .and(Cond::is_null("d"))
            .or(Cond::expr("x > y", Vec::new()));
        let (sql, _) = compile(&cond);
        assert_eq!(sql, "(a=? AND d IS NULL) OR (x > y)");
    }

    #[test]
    fn test_not() {
        let (sql, _) = compile(&Cond::not_null("email").negate());
        assert_eq!(sql, "NOT (email IS NOT NULL)");
    }

    #[test]
    fn test_expr_question_mark_literals() {
        let (sql, args) = compile(&Cond::expr("note <> '?'", vec![]));
        assert_eq!(sql, "note <> '?'");
        assert!(args.is_empty());

        let (sql, args) = compile(&Cond::expr("tags ? 'x'", vec![]));
        assert_eq!(sql, "tags ? 'x'");
        assert!(args.is_empty());
    }

    #[test]
    fn test_expr_args_pass_through() {
        let (sql, args) = compile(
            &Cond::expr("a = ? AND b = ?", vec![ScalarValue::Int32(1), ScalarValue::Int32(2)])
                .and(Cond::eq("c", 3i32)),
        );
        assert_eq!(sql, "(a = ? AND b = ?) AND c=?");
        assert_eq!(args.len(), 3);
    }
}
