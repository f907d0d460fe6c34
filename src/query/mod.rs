//! # Query Planner & Filter Evaluator
//!
//! Parses filter trees, plans which conditions the row store can narrow,
//! and executes searches with in-memory re-checks of the full filter.

mod executor;
mod explain;
mod filter;
mod operators;
mod page_state;
mod pattern;
mod planner;

pub use executor::{MatchPage, QueryExecutor, SearchPage};
pub use explain::{ExplainCondition, ExplainPlan};
pub use filter::{Condition, Filter};
pub use operators::{Operator, Scalar};
pub use page_state::{decode_page_state, encode_page_state};
pub use pattern::{PathPattern, PatternSegment, WILDCARD};
pub use planner::{ConditionPlan, QueryPlanner, SearchPlan, Strategy};
