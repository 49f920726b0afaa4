//! Calculator session: expression buffer, last result, history and graph.
//!
//! A `Session` is a plain value owned by the front end. Every user action is
//! a method call; nothing here blocks or touches global state.

use crate::calc_engine::{contains_variable, evaluate, EvaluationResult};
use crate::sampler::{sample_points, PlotPoint, DEFAULT_DOMAIN, DEFAULT_STEPS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Result text shown after an expression has been graphed.
pub const GRAPH_SENTINEL: &str = "Function Graphed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMode {
    Idle,
    Editing,
    ScalarResult,
    GraphResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub expression: String,
    pub result: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    expression: String,
    result: String,
    history: Vec<HistoryEntry>,
    graph_points: Vec<PlotPoint>,
    mode: SessionMode,
    history_limit: usize,
    domain: (f64, f64),
    steps: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            expression: String::new(),
            result: String::new(),
            history: Vec::new(),
            graph_points: Vec::new(),
            mode: SessionMode::Idle,
            history_limit: DEFAULT_HISTORY_LIMIT,
            domain: DEFAULT_DOMAIN,
            steps: DEFAULT_STEPS,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self.history.truncate(limit);
        self
    }

    pub fn with_plot_range(mut self, domain: (f64, f64), steps: usize) -> Self {
        self.domain = domain;
        self.steps = steps;
        self
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    /// Newest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn graph_points(&self) -> &[PlotPoint] {
        &self.graph_points
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn is_graphing(&self) -> bool {
        self.mode == SessionMode::GraphResult
    }

    pub fn append(&mut self, token: &str) {
        self.expression.push_str(token);
        self.mode = SessionMode::Editing;
    }

    /// Removes the last grapheme, so `π` goes in one keystroke.
    pub fn delete_last(&mut self) {
        if let Some((idx, _)) = self.expression.grapheme_indices(true).next_back() {
            self.expression.truncate(idx);
        }
        self.mode = if self.expression.is_empty() {
            SessionMode::Idle
        } else {
            SessionMode::Editing
        };
    }

    /// Resets the buffer, result and graph. History is kept.
    pub fn clear(&mut self) {
        self.expression.clear();
        self.result.clear();
        self.graph_points.clear();
        self.mode = SessionMode::Idle;
    }

    pub fn evaluate(&mut self) {
        if self.expression.is_empty() {
            return;
        }

        if contains_variable(&self.expression) {
            self.graph_points = sample_points(&self.expression, self.domain, self.steps);
            self.result = GRAPH_SENTINEL.to_string();
            self.mode = SessionMode::GraphResult;
            info!(
                "graphed {:?} with {} points",
                self.expression,
                self.graph_points.len()
            );
            return;
        }

        let outcome = evaluate(&self.expression);
        self.result = outcome.to_string();
        self.mode = SessionMode::ScalarResult;

        if let EvaluationResult::Number(value) = outcome {
            self.push_history(HistoryEntry {
                id: Uuid::new_v4().to_string(),
                expression: self.expression.clone(),
                result: value,
                timestamp: Utc::now(),
            });
        }
    }

    /// Restores a past calculation into the display without re-running it.
    /// Returns `false` if no entry has that id.
    pub fn select_history(&mut self, id: &str) -> bool {
        let Some(entry) = self.history.iter().find(|e| e.id == id) else {
            return false;
        };
        self.expression = entry.expression.clone();
        self.result = entry.result.clone();
        self.mode = SessionMode::ScalarResult;
        true
    }

    fn push_history(&mut self, entry: HistoryEntry) {
        debug!("history += {} = {}", entry.expression, entry.result);
        self.history.insert(0, entry);
        self.history.truncate(self.history_limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(expr: &str) -> Session {
        let mut session = Session::new();
        session.append(expr);
        session
    }

    #[test]
    fn starts_idle() {
        let session = Session::new();
        assert_eq!(session.mode(), SessionMode::Idle);
        assert_eq!(session.expression(), "");
        assert!(session.history().is_empty());
    }

    #[test]
    fn append_enters_editing_from_any_state() {
        let mut session = session_with("1+1");
        assert_eq!(session.mode(), SessionMode::Editing);
        session.evaluate();
        assert_eq!(session.mode(), SessionMode::ScalarResult);
        session.append("+1");
        assert_eq!(session.mode(), SessionMode::Editing);
        assert_eq!(session.expression(), "1+1+1");
        // the stale result stays until the next evaluate
        assert_eq!(session.result(), "2");
    }

    #[test]
    fn delete_to_empty_returns_to_idle() {
        let mut session = session_with("2π");
        session.delete_last();
        assert_eq!(session.expression(), "2");
        assert_eq!(session.mode(), SessionMode::Editing);
        session.delete_last();
        assert_eq!(session.mode(), SessionMode::Idle);
        session.delete_last();
        assert_eq!(session.mode(), SessionMode::Idle);
    }

    #[test]
    fn scalar_evaluation_records_history() {
        let mut session = session_with("2^10");
        session.evaluate();
        assert_eq!(session.result(), "1024");
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].expression, "2^10");
        assert_eq!(session.history()[0].result, "1024");
    }

    #[test]
    fn error_is_a_display_state_without_history() {
        let mut session = session_with("sqrt(-1)");
        session.evaluate();
        assert_eq!(session.mode(), SessionMode::ScalarResult);
        assert_eq!(session.result(), "Error");
        assert!(session.history().is_empty());
    }

    #[test]
    fn graph_evaluation_sets_points_and_sentinel() {
        let mut session = session_with("x^2");
        session.evaluate();
        assert!(session.is_graphing());
        assert_eq!(session.result(), GRAPH_SENTINEL);
        assert_eq!(session.graph_points().len(), DEFAULT_STEPS + 1);
        assert!(session.history().is_empty());
    }

    #[test]
    fn reversed_plot_range_graphs_ascending() {
        let mut session = Session::new().with_plot_range((3.0, -3.0), 6);
        session.append("x^3");
        session.evaluate();
        let points = session.graph_points();
        assert_eq!(points.len(), 7);
        assert!(points.windows(2).all(|w| w[0].x < w[1].x));
    }

    #[test]
    fn new_evaluation_replaces_points_wholesale() {
        let mut session = Session::new().with_plot_range((-1.0, 1.0), 2);
        session.append("x");
        session.evaluate();
        assert_eq!(session.graph_points().len(), 3);
        session.clear();
        session.append("1/x");
        session.evaluate();
        assert_eq!(session.graph_points().len(), 2);
    }

    #[test]
    fn empty_evaluate_is_a_no_op() {
        let mut session = Session::new();
        session.evaluate();
        assert_eq!(session.mode(), SessionMode::Idle);
        assert_eq!(session.result(), "");
    }

    #[test]
    fn clear_resets_everything_but_history() {
        let mut session = session_with("1+2");
        session.evaluate();
        session.clear();
        session.append("x");
        session.evaluate();
        session.clear();
        assert_eq!(session.mode(), SessionMode::Idle);
        assert_eq!(session.expression(), "");
        assert_eq!(session.result(), "");
        assert!(session.graph_points().is_empty());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn history_keeps_ten_newest_first() {
        let mut session = Session::new();
        for i in 1..=11 {
            session.clear();
            session.append(&format!("{}+0", i));
            session.evaluate();
        }
        let history = session.history();
        assert_eq!(history.len(), 10);
        assert_eq!(history[0].expression, "11+0");
        assert_eq!(history[9].expression, "2+0");
        assert!(history.iter().all(|e| e.expression != "1+0"));
    }

    #[test]
    fn history_ids_are_unique() {
        let mut session = Session::new();
        for _ in 0..3 {
            session.clear();
            session.append("1+1");
            session.evaluate();
        }
        let ids: std::collections::HashSet<_> =
            session.history().iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn select_history_restores_without_reevaluating() {
        let mut session = session_with("6×7");
        session.evaluate();
        let id = session.history()[0].id.clone();

        session.clear();
        session.append("x");
        session.evaluate();
        let points = session.graph_points().len();

        assert!(session.select_history(&id));
        assert_eq!(session.expression(), "6×7");
        assert_eq!(session.result(), "42");
        assert_eq!(session.mode(), SessionMode::ScalarResult);
        assert_eq!(session.graph_points().len(), points);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn select_unknown_history_is_rejected() {
        let mut session = session_with("1");
        assert!(!session.select_history("missing"));
        assert_eq!(session.expression(), "1");
    }

    #[test]
    fn custom_history_limit() {
        let mut session = Session::new().with_history_limit(2);
        for expr in ["1", "2", "3"] {
            session.clear();
            session.append(expr);
            session.evaluate();
        }
        let kept: Vec<_> = session.history().iter().map(|e| e.result.as_str()).collect();
        assert_eq!(kept, vec!["3", "2"]);
    }

    #[test]
    fn session_round_trips_through_json() {
        let mut session = session_with("1/4");
        session.evaluate();
        let json = serde_json::to_string(&session).unwrap();
        let restored: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.result(), "0.25");
        assert_eq!(restored.history(), session.history());
    }
}
