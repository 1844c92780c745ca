//! Composable WHERE/HAVING condition chains
//!
//! A condition is an ordered list of (connector, fragment) pairs with a
//! parallel parameter list. Fragments render with `?` placeholders only;
//! values never appear in the SQL text.

use crate::param::{Param, Record};
use crate::error::SqlResult;
use crate::stmt::Select;
use crate::value::{ToValue, Value};

/// A comparison operator applied to one column
#[derive(Debug, Clone)]
pub enum Op {
    Eq(Param),
    Ne(Param),
    Gt(Param),
    Gte(Param),
    Lt(Param),
    Lte(Param),
    Like(Param),
    /// `LIKE value%`
    LikeStarts(Param),
    /// `LIKE %value`
    LikeEnds(Param),
    /// `LIKE %value%`
    LikeContains(Param),
    IsNull,
    IsNotNull,
    In { values: Vec<Value>, reverse: bool },
    NotIn { values: Vec<Value>, reverse: bool },
    InSelect(Box<Select>),
    NotInSelect(Box<Select>),
    Between(Param, Param),
}

/// `=`
pub fn eq(value: impl Into<Param>) -> Op {
    Op::Eq(value.into())
}

/// `<>`
pub fn ne(value: impl Into<Param>) -> Op {
    Op::Ne(value.into())
}

/// `>`
pub fn gt(value: impl Into<Param>) -> Op {
    Op::Gt(value.into())
}

/// `>=`
pub fn gte(value: impl Into<Param>) -> Op {
    Op::Gte(value.into())
}

/// `<`
pub fn lt(value: impl Into<Param>) -> Op {
    Op::Lt(value.into())
}

/// `<=`
pub fn lte(value: impl Into<Param>) -> Op {
    Op::Lte(value.into())
}

/// `LIKE` with the pattern passed through verbatim
pub fn like(value: impl Into<Param>) -> Op {
    Op::Like(value.into())
}

/// `LIKE value%`
pub fn like_starts(value: impl Into<Param>) -> Op {
    Op::LikeStarts(value.into())
}

/// `LIKE %value`
pub fn like_ends(value: impl Into<Param>) -> Op {
    Op::LikeEnds(value.into())
}

/// `LIKE %value%`
pub fn like_contains(value: impl Into<Param>) -> Op {
    Op::LikeContains(value.into())
}

pub fn is_null() -> Op {
    Op::IsNull
}

pub fn is_not_null() -> Op {
    Op::IsNotNull
}

/// `IN (?,...)` over a literal list
pub fn in_list<T: ToValue>(values: impl IntoIterator<Item = T>) -> Op {
    Op::In {
        values: values.into_iter().map(|v| v.to_value()).collect(),
        reverse: false,
    }
}

/// `NOT IN (?,...)` over a literal list
pub fn not_in<T: ToValue>(values: impl IntoIterator<Item = T>) -> Op {
    Op::NotIn {
        values: values.into_iter().map(|v| v.to_value()).collect(),
        reverse: false,
    }
}

/// `IN (subselect)`
pub fn in_select(sub: Select) -> Op {
    Op::InSelect(Box::new(sub))
}

/// `NOT IN (subselect)`
pub fn not_in_select(sub: Select) -> Op {
    Op::NotInSelect(Box::new(sub))
}

/// `BETWEEN ? AND ?`
pub fn between(low: impl Into<Param>, high: impl Into<Param>) -> Op {
    Op::Between(low.into(), high.into())
}

impl Op {
    /// Flip an IN/NOT IN between inclusion and exclusion at render time.
    /// Other operators are unaffected.
    pub fn reversed(self, reverse: bool) -> Self {
        match self {
            Op::In { values, .. } => Op::In { values, reverse },
            Op::NotIn { values, .. } => Op::NotIn { values, reverse },
            other => other,
        }
    }

    /// Blank operators are skipped by the `_ex` condition variants
    fn is_blank(&self) -> bool {
        match self {
            Op::Eq(p) | Op::Ne(p) | Op::Gt(p) | Op::Gte(p) | Op::Lt(p) | Op::Lte(p)
            | Op::Like(p) | Op::LikeStarts(p) | Op::LikeEnds(p) | Op::LikeContains(p) => {
                p.is_blank()
            }
            Op::IsNull | Op::IsNotNull => true,
            Op::In { values, .. } | Op::NotIn { values, .. } => values.is_empty(),
            Op::InSelect(_) | Op::NotInSelect(_) => false,
            Op::Between(low, high) => low.is_blank() && high.is_blank(),
        }
    }

    /// Render the fragment text and its parameters for one column
    fn render(&self, column: &str) -> (String, Vec<Param>) {
        match self {
            Op::Eq(p) => (format!("{column}=?"), vec![p.clone()]),
            Op::Ne(p) => (format!("{column}<>?"), vec![p.clone()]),
            Op::Gt(p) => (format!("{column}>?"), vec![p.clone()]),
            Op::Gte(p) => (format!("{column}>=?"), vec![p.clone()]),
            Op::Lt(p) => (format!("{column}<?"), vec![p.clone()]),
            Op::Lte(p) => (format!("{column}<=?"), vec![p.clone()]),
            Op::Like(p) => (format!("{column} LIKE ?"), vec![p.clone()]),
            Op::LikeStarts(p) => (format!("{column} LIKE ?"), vec![affix(p, "", "%")]),
            Op::LikeEnds(p) => (format!("{column} LIKE ?"), vec![affix(p, "%", "")]),
            Op::LikeContains(p) => (format!("{column} LIKE ?"), vec![affix(p, "%", "%")]),
            Op::IsNull => (format!("{column} IS NULL"), Vec::new()),
            Op::IsNotNull => (format!("{column} IS NOT NULL"), Vec::new()),
            Op::In { values, reverse } => render_in(column, values, *reverse),
            Op::NotIn { values, reverse } => render_in(column, values, !*reverse),
            Op::InSelect(sub) => (
                format!("{column} IN ({})", sub.to_sql()),
                sub.collect_params(),
            ),
            Op::NotInSelect(sub) => (
                format!("{column} NOT IN ({})", sub.to_sql()),
                sub.collect_params(),
            ),
            Op::Between(low, high) => (
                format!("{column} BETWEEN ? AND ?"),
                vec![low.clone(), high.clone()],
            ),
        }
    }
}

/// Apply LIKE affixes to a literal's text rendering. Null literals and field
/// references pass through untouched.
fn affix(param: &Param, prefix: &str, suffix: &str) -> Param {
    match param {
        Param::Literal(Value::Null) => Param::Literal(Value::Null),
        Param::Literal(value) => {
            let text = crate::convert::to_text(value).unwrap_or_default();
            Param::Literal(Value::Text(format!("{prefix}{text}{suffix}")))
        }
        other => other.clone(),
    }
}

fn render_in(column: &str, values: &[Value], exclude: bool) -> (String, Vec<Param>) {
    if values.is_empty() {
        // An empty inclusion list matches nothing; an empty exclusion
        // list matches everything.
        let frag = if exclude { "1=1" } else { "1=0" };
        return (frag.to_owned(), Vec::new());
    }
    let placeholders = vec!["?"; values.len()].join(",");
    let keyword = if exclude { "NOT IN" } else { "IN" };
    let params = values.iter().cloned().map(Param::Literal).collect();
    (format!("{column} {keyword} ({placeholders})"), params)
}

/// An ordered chain of condition fragments
#[derive(Debug, Clone, Default)]
pub struct Cond {
    frags: Vec<(&'static str, String)>,
    params: Vec<Param>,
}

impl Cond {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment joined with `AND`
    pub fn and(&mut self, column: &str, op: Op) -> &mut Self {
        let (frag, params) = op.render(column);
        self.push(" AND ", frag, params)
    }

    /// Append a parenthesized fragment joined with `OR`
    pub fn or(&mut self, column: &str, op: Op) -> &mut Self {
        let (frag, params) = op.render(column);
        self.push(" OR ", format!("({frag})"), params)
    }

    /// Like [`and`](Self::and), but skipped entirely when the operator's
    /// parameter is blank (null, whitespace-only text, empty list)
    pub fn and_ex(&mut self, column: &str, op: Op) -> &mut Self {
        if op.is_blank() {
            return self;
        }
        self.and(column, op)
    }

    /// Like [`or`](Self::or), but skipped when the parameter is blank
    pub fn or_ex(&mut self, column: &str, op: Op) -> &mut Self {
        if op.is_blank() {
            return self;
        }
        self.or(column, op)
    }

    /// Splice another condition in parentheses, joined with `AND`.
    /// An empty condition is a no-op.
    pub fn and_cond(&mut self, other: Cond) -> &mut Self {
        self.splice(" AND ", other)
    }

    /// Splice another condition in parentheses, joined with `OR`.
    /// An empty condition is a no-op.
    pub fn or_cond(&mut self, other: Cond) -> &mut Self {
        self.splice(" OR ", other)
    }

    /// `EXISTS (subselect)`, joined with `AND`
    pub fn exists(&mut self, sub: &Select) -> &mut Self {
        let params = sub.collect_params();
        self.push(" AND ", format!("EXISTS ({})", sub.to_sql()), params)
    }

    /// `NOT EXISTS (subselect)`, joined with `AND`
    pub fn not_exists(&mut self, sub: &Select) -> &mut Self {
        let params = sub.collect_params();
        self.push(" AND ", format!("NOT EXISTS ({})", sub.to_sql()), params)
    }

    pub fn is_empty(&self) -> bool {
        self.frags.is_empty()
    }

    /// Render the chain; the first fragment never carries a connector
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        for (i, (connector, frag)) in self.frags.iter().enumerate() {
            if i > 0 {
                out.push_str(connector);
            }
            out.push_str(frag);
        }
        out
    }

    pub(crate) fn params(&self) -> &[Param] {
        &self.params
    }

    /// Materialize parameters, resolving field references against `record`
    pub(crate) fn resolve_params(&self, record: Option<&Record>) -> SqlResult<Vec<Value>> {
        self.params.iter().map(|p| p.resolve(record)).collect()
    }

    fn push(&mut self, connector: &'static str, frag: String, params: Vec<Param>) -> &mut Self {
        self.frags.push((connector, frag));
        self.params.extend(params);
        self
    }

    fn splice(&mut self, connector: &'static str, other: Cond) -> &mut Self {
        if other.is_empty() {
            return self;
        }
        let frag = format!("({})", other.to_sql());
        self.push(connector, frag, other.params)
    }
}
