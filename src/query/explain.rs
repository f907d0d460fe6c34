//! Explain plan output
//!
//! Produces deterministic, human-readable explain output.

use std::fmt;

use serde::Serialize;

use super::planner::SearchPlan;

/// Explain output for one condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplainCondition {
    /// Normalized path pattern
    pub path: String,
    /// Strategy name
    pub strategy: String,
    /// Operators as written
    pub operators: Vec<String>,
    /// Predicate evaluated by the store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pushed: Option<String>,
}

/// Explain plan output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplainPlan {
    /// `FULL_SCAN` or `CANDIDATE_QUERIES`
    pub scan_type: String,
    /// Number of native candidate queries
    pub candidate_queries: usize,
    pub conditions: Vec<ExplainCondition>,
}

impl ExplainPlan {
    pub fn from_plan(plan: &SearchPlan) -> Self {
        let conditions = plan
            .conditions
            .iter()
            .map(|c| ExplainCondition {
                path: c.condition.pattern.to_string(),
                strategy: c.strategy.as_str().to_string(),
                operators: c.condition.operators.iter().map(|o| o.to_string()).collect(),
                pushed: c.pushed.as_ref().map(|p| p.to_string()),
            })
            .collect();

        Self {
            scan_type: if plan.is_full_scan() {
                "FULL_SCAN".to_string()
            } else {
                "CANDIDATE_QUERIES".to_string()
            },
            candidate_queries: plan.candidate_selects().count(),
            conditions,
        }
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;
        writeln!(f, "Scan Type: {}", self.scan_type)?;
        writeln!(f, "Candidate Queries: {}", self.candidate_queries)?;
        if !self.conditions.is_empty() {
            writeln!(f, "Conditions:")?;
            for condition in &self.conditions {
                writeln!(
                    f,
                    "  - {} [{}] {}",
                    condition.path,
                    condition.strategy,
                    condition.operators.join(", ")
                )?;
                if let Some(pushed) = &condition.pushed {
                    writeln!(f, "      pushed: {}", pushed)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Filter, QueryPlanner};

    fn explain(raw: &str) -> ExplainPlan {
        QueryPlanner::new(8).explain(&Filter::parse(raw, 8).unwrap())
    }

    #[test]
    fn test_explain_candidate_plan() {
        let plan = explain(r#"{"a.*.c": {"$gt": 1}, "b": {"$ne": "x"}}"#);
        assert_eq!(plan.scan_type, "CANDIDATE_QUERIES");
        assert_eq!(plan.candidate_queries, 1);
        assert_eq!(plan.conditions[0].strategy, "SUPERSET");
        assert_eq!(plan.conditions[0].pushed.as_deref(), Some("dbl_value > 1"));
        assert_eq!(plan.conditions[1].strategy, "IN_MEMORY");

        let output = plan.to_string();
        assert!(output.contains("CANDIDATE_QUERIES"));
        assert!(output.contains("a.*.c [SUPERSET] $gt 1"));
    }

    #[test]
    fn test_explain_full_scan() {
        let plan = explain(r#"{"a": {"$in": [1, 2]}}"#);
        assert_eq!(plan.scan_type, "FULL_SCAN");
        assert_eq!(plan.candidate_queries, 0);
    }

    #[test]
    fn test_explain_deterministic() {
        let raw = r#"{"b": {"$eq": true}, "a": {"$lte": "m"}}"#;
        assert_eq!(explain(raw).to_string(), explain(raw).to_string());
        assert_eq!(explain(raw).conditions[0].path, "a");
    }
}
