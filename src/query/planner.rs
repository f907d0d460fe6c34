//! Search planning
//!
//! Chooses, per condition, whether the row store can narrow the candidate
//! documents and builds the native select for it.
//!
//! Strategy per condition (strict order):
//! 1. Pushdown: no wildcard and a pushdown operator
//! 2. Superset: wildcard and a pushdown operator
//! 3. InMemory: nothing the store can evaluate
//!
//! The first pushdown operator in operator-name order is the one pushed.

use super::explain::ExplainPlan;
use super::filter::{Condition, Filter};
use super::pattern::PatternSegment;
use crate::store::{Select, SegmentCondition, ValuePredicate};

/// How one condition contributes to candidate selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Pushdown,
    Superset,
    InMemory,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Pushdown => "PUSHDOWN",
            Strategy::Superset => "SUPERSET",
            Strategy::InMemory => "IN_MEMORY",
        }
    }
}

/// Plan for one condition
#[derive(Debug, Clone)]
pub struct ConditionPlan {
    pub condition: Condition,
    pub strategy: Strategy,
    /// Operator evaluated by the store, if any
    pub pushed: Option<ValuePredicate>,
    /// Candidate query returning matching document ids
    pub select: Option<Select>,
}

/// Immutable plan for a search
#[derive(Debug, Clone)]
pub struct SearchPlan {
    pub conditions: Vec<ConditionPlan>,
}

impl SearchPlan {
    /// True when no condition narrows the candidates
    pub fn is_full_scan(&self) -> bool {
        self.conditions.iter().all(|c| c.select.is_none())
    }

    pub fn candidate_selects(&self) -> impl Iterator<Item = &Select> {
        self.conditions.iter().filter_map(|c| c.select.as_ref())
    }
}

/// Query planner that produces deterministic plans
#[derive(Debug, Clone, Copy)]
pub struct QueryPlanner {
    max_depth: usize,
}

impl QueryPlanner {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn plan(&self, filter: &Filter) -> SearchPlan {
        SearchPlan {
            conditions: filter
                .conditions()
                .iter()
                .map(|c| self.plan_condition(c))
                .collect(),
        }
    }

    pub fn explain(&self, filter: &Filter) -> ExplainPlan {
        ExplainPlan::from_plan(&self.plan(filter))
    }

    fn plan_condition(&self, condition: &Condition) -> ConditionPlan {
        let pushed = condition.operators.iter().find_map(|op| op.pushdown());
        let Some(predicate) = pushed else {
            return ConditionPlan {
                condition: condition.clone(),
                strategy: Strategy::InMemory,
                pushed: None,
                select: None,
            };
        };

        let strategy = if condition.pattern.has_wildcard() {
            Strategy::Superset
        } else {
            Strategy::Pushdown
        };
        let select = self.candidate_select(condition, predicate.clone());
        ConditionPlan {
            condition: condition.clone(),
            strategy,
            pushed: Some(predicate),
            select: Some(select),
        }
    }

    /// Ids of documents with a leaf at the pattern satisfying `predicate`
    fn candidate_select(&self, condition: &Condition, predicate: ValuePredicate) -> Select {
        let pattern = &condition.pattern;
        let mut select = Select::scan().key_and_leaf();

        for (position, segment) in pattern.segments().iter().enumerate() {
            let constraint = match segment {
                PatternSegment::Exact(s) => SegmentCondition::Eq(s.encode().into_owned()),
                PatternSegment::Wildcard => SegmentCondition::Gt(String::new()),
            };
            select = select.with_segment(position, constraint);
        }
        for position in pattern.len()..self.max_depth {
            select = select.with_segment(position, SegmentCondition::Eq(String::new()));
        }
        if let Some(PatternSegment::Exact(last)) = pattern.last() {
            select = select.with_leaf(last.encode().into_owned());
        }
        select.with_value(predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ColumnLiteral, CompareOp};

    fn plan(raw: &str) -> SearchPlan {
        QueryPlanner::new(4).plan(&Filter::parse(raw, 4).unwrap())
    }

    #[test]
    fn test_exact_path_is_pushed_down() {
        let plan = plan(r#"{"a.b": {"$gt": 5}}"#);
        let condition = &plan.conditions[0];
        assert_eq!(condition.strategy, Strategy::Pushdown);

        let select = condition.select.as_ref().unwrap();
        assert!(select.allow_filtering);
        assert_eq!(select.leaf.as_deref(), Some("b"));
        assert_eq!(
            select.value,
            Some(ValuePredicate::new(CompareOp::Gt, ColumnLiteral::Double(5.0)))
        );
        let conditions: Vec<(usize, SegmentCondition)> = select
            .segments
            .iter()
            .map(|p| (p.position, p.condition.clone()))
            .collect();
        assert_eq!(
            conditions,
            vec![
                (0, SegmentCondition::Eq("a".into())),
                (1, SegmentCondition::Eq("b".into())),
                (2, SegmentCondition::Eq(String::new())),
                (3, SegmentCondition::Eq(String::new())),
            ]
        );
        assert!(!plan.is_full_scan());
    }

    #[test]
    fn test_wildcard_becomes_superset() {
        let plan = plan(r#"{"a.*.c": {"$gt": 1, "$ne": 10}}"#);
        let condition = &plan.conditions[0];
        assert_eq!(condition.strategy, Strategy::Superset);
        let select = condition.select.as_ref().unwrap();
        assert_eq!(select.segments[1].condition, SegmentCondition::Gt(String::new()));
    }

    #[test]
    fn test_in_memory_only_means_full_scan() {
        let plan = plan(r#"{"a": {"$ne": 1}, "b": {"$in": [1, 2]}, "c": {"$eq": null}}"#);
        assert!(plan
            .conditions
            .iter()
            .all(|c| c.strategy == Strategy::InMemory));
        assert!(plan.is_full_scan());
        assert!(QueryPlanner::new(4).plan(&Filter::default()).is_full_scan());
    }

    #[test]
    fn test_first_pushdown_operator_in_name_order() {
        let plan = plan(r#"{"a": {"$lt": 9, "$gte": 2}}"#);
        assert_eq!(
            plan.conditions[0].pushed,
            Some(ValuePredicate::new(CompareOp::Gte, ColumnLiteral::Double(2.0)))
        );
    }

    #[test]
    fn test_mixed_conditions_keep_candidate_queries() {
        let plan = plan(r#"{"a": {"$ne": 1}, "b": {"$eq": "x"}}"#);
        assert!(!plan.is_full_scan());
        assert_eq!(plan.candidate_selects().count(), 1);
    }
}
