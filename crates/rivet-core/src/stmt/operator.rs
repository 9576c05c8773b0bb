/// Comparison operator of a filter lookup.
///
/// The operator is written as the last `__`-separated segment of a filter
/// expression (`age__gt`). Expressions without a recognized suffix compare
/// with [`Operator::Exact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Exact,
    IExact,
    Contains,
    IContains,
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Ne,
    StartsWith,
    EndsWith,
    IStartsWith,
    IEndsWith,
    In,
    Between,
    IsNull,
}

impl Operator {
    /// Parses an operator keyword. `nq` is accepted as a synonym of `ne`.
    pub fn parse(keyword: &str) -> Option<Operator> {
        use Operator::*;

        Some(match keyword {
            "exact" => Exact,
            "iexact" => IExact,
            "contains" => Contains,
            "icontains" => IContains,
            "gt" => Gt,
            "gte" => Gte,
            "lt" => Lt,
            "lte" => Lte,
            "eq" => Eq,
            "nq" | "ne" => Ne,
            "startswith" => StartsWith,
            "endswith" => EndsWith,
            "istartswith" => IStartsWith,
            "iendswith" => IEndsWith,
            "in" => In,
            "between" => Between,
            "isnull" => IsNull,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        use Operator::*;

        match self {
            Exact => "exact",
            IExact => "iexact",
            Contains => "contains",
            IContains => "icontains",
            Gt => "gt",
            Gte => "gte",
            Lt => "lt",
            Lte => "lte",
            Eq => "eq",
            Ne => "ne",
            StartsWith => "startswith",
            EndsWith => "endswith",
            IStartsWith => "istartswith",
            IEndsWith => "iendswith",
            In => "in",
            Between => "between",
            IsNull => "isnull",
        }
    }

    /// True for the `LIKE`-based operators whose argument gets wildcards.
    pub fn is_pattern(self) -> bool {
        use Operator::*;

        matches!(
            self,
            IExact | Contains | IContains | StartsWith | EndsWith | IStartsWith | IEndsWith
        )
    }

    /// True for the case-insensitive variants.
    pub fn is_case_insensitive(self) -> bool {
        use Operator::*;

        matches!(self, IExact | IContains | IStartsWith | IEndsWith)
    }
}

#[cfg(test)]
mod tests {
    use super::Operator;

    #[test]
    fn parse_keywords() {
        assert_eq!(Operator::parse("gt"), Some(Operator::Gt));
        assert_eq!(Operator::parse("nq"), Some(Operator::Ne));
        assert_eq!(Operator::parse("isnull"), Some(Operator::IsNull));
        assert_eq!(Operator::parse("age"), None);
        assert_eq!(Operator::parse("GT"), None);
    }

    #[test]
    fn keyword_round_trips() {
        for kw in ["exact", "iexact", "in", "between", "istartswith"] {
            assert_eq!(Operator::parse(kw).unwrap().keyword(), kw);
        }
    }
}
