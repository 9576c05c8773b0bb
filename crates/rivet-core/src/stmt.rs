mod condition;
pub use condition::{Condition, Conjunction, Lookup, Term, TermExpr, EXPR_SEP};

mod operator;
pub use operator::Operator;

mod query;
pub use query::{Order, Query};

mod record;
pub use record::{Record, ValueRecord};

mod value;
pub use value::{FromValue, ModelValue, Value};

mod value_jiff;
