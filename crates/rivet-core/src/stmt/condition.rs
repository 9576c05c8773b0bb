use super::Value;

/// Separator between the segments of a filter expression.
pub const EXPR_SEP: &str = "__";

/// A composable filter predicate.
///
/// A condition is an ordered list of terms. Each term after the first is
/// joined to what precedes it with `AND` or `OR`, and may be negated. A term
/// is either a field lookup or a nested condition, which is parenthesized
/// when compiled. An empty condition compiles to no `WHERE` clause at all.
///
/// ```
/// # use rivet_core::stmt::Condition;
/// let cond = Condition::new()
///     .and("profile__isnull", false)
///     .and_not("status__in", vec![1, 2])
///     .or("profile__age__gt", 20);
/// assert_eq!(cond.terms().len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    terms: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    /// How the term joins the terms before it. Ignored for the first term.
    pub conjunction: Conjunction,
    pub negated: bool,
    pub expr: TermExpr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TermExpr {
    Lookup(Lookup),
    Nested(Condition),
}

/// A single `path__operator` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    /// `__`-separated segments, operator suffix included
    pub path: Vec<String>,

    /// The argument. Lists are flattened into one parameter per element.
    pub arg: Value,
}

impl Condition {
    pub fn new() -> Condition {
        Condition::default()
    }

    pub fn and(self, expr: &str, arg: impl Into<Value>) -> Condition {
        self.lookup(Conjunction::And, false, expr, arg.into())
    }

    pub fn and_not(self, expr: &str, arg: impl Into<Value>) -> Condition {
        self.lookup(Conjunction::And, true, expr, arg.into())
    }

    pub fn or(self, expr: &str, arg: impl Into<Value>) -> Condition {
        self.lookup(Conjunction::Or, false, expr, arg.into())
    }

    pub fn or_not(self, expr: &str, arg: impl Into<Value>) -> Condition {
        self.lookup(Conjunction::Or, true, expr, arg.into())
    }

    pub fn and_cond(self, cond: Condition) -> Condition {
        self.nested(Conjunction::And, false, cond)
    }

    pub fn and_not_cond(self, cond: Condition) -> Condition {
        self.nested(Conjunction::And, true, cond)
    }

    pub fn or_cond(self, cond: Condition) -> Condition {
        self.nested(Conjunction::Or, false, cond)
    }

    pub fn or_not_cond(self, cond: Condition) -> Condition {
        self.nested(Conjunction::Or, true, cond)
    }

    /// Returns `true` if the condition has no terms, or only empty nested
    /// conditions.
    pub fn is_empty(&self) -> bool {
        self.terms.iter().all(|term| match &term.expr {
            TermExpr::Lookup(_) => false,
            TermExpr::Nested(cond) => cond.is_empty(),
        })
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Every lookup in the condition, nested conditions included, in order.
    pub fn lookups(&self) -> Vec<&Lookup> {
        let mut out = vec![];
        self.collect_lookups(&mut out);
        out
    }

    fn collect_lookups<'a>(&'a self, out: &mut Vec<&'a Lookup>) {
        for term in &self.terms {
            match &term.expr {
                TermExpr::Lookup(lookup) => out.push(lookup),
                TermExpr::Nested(cond) => cond.collect_lookups(out),
            }
        }
    }

    fn lookup(mut self, conjunction: Conjunction, negated: bool, expr: &str, arg: Value) -> Self {
        let path = if expr.is_empty() {
            vec![]
        } else {
            expr.split(EXPR_SEP).map(str::to_string).collect()
        };

        self.terms.push(Term {
            conjunction,
            negated,
            expr: TermExpr::Lookup(Lookup { path, arg }),
        });
        self
    }

    fn nested(mut self, conjunction: Conjunction, negated: bool, cond: Condition) -> Self {
        self.terms.push(Term {
            conjunction,
            negated,
            expr: TermExpr::Nested(cond),
        });
        self
    }
}

impl Lookup {
    /// The expression as written, for error messages.
    pub fn expr(&self) -> String {
        self.path.join(EXPR_SEP)
    }
}
