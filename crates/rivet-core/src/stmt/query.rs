use super::{Condition, EXPR_SEP};
use crate::schema::ModelId;

/// A query over a single model: filter, grouping, ordering and paging.
#[derive(Debug, Clone)]
pub struct Query {
    pub model: ModelId,
    pub cond: Condition,
    pub group_by: Vec<Vec<String>>,
    pub order_by: Vec<Order>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub distinct: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub path: Vec<String>,
    pub descending: bool,
}

impl Query {
    pub fn new(model: ModelId) -> Query {
        Query {
            model,
            cond: Condition::new(),
            group_by: vec![],
            order_by: vec![],
            limit: None,
            offset: None,
            distinct: false,
        }
    }

    pub fn group_by(&mut self, expr: &str) {
        self.group_by.push(split(expr));
    }

    /// Adds an ordering. A leading `-` sorts descending.
    pub fn order_by(&mut self, expr: &str) {
        let (expr, descending) = match expr.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (expr, false),
        };
        self.order_by.push(Order {
            path: split(expr),
            descending,
        });
    }
}

fn split(expr: &str) -> Vec<String> {
    expr.split(EXPR_SEP).map(str::to_string).collect()
}
