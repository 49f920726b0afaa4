use super::worker::AiWorker;
use sci_calc::ai::{AiAnalysis, AnalysisKind};
use sci_calc::session::Session;
use tracing::warn;

/// Status of the most recent AI request. The last good analysis is kept
/// separately in [`App::analysis`] and stays on screen across failures.
pub enum AiPanel {
    Idle,
    Loading(AnalysisKind),
    Ready,
    Failed(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    Expression,
    WordProblem,
}

pub struct App {
    pub session: Session,
    pub target: InputTarget,
    pub problem_text: String,
    pub ai_panel: AiPanel,
    pub analysis: Option<AiAnalysis>,
    pub ai_worker: Option<AiWorker>,
    pub cursor_history: Option<usize>,
    pub should_quit: bool,
    pub show_help: bool,
    pub help_scroll: usize,
    pub terminal_too_small: bool,
}

impl App {
    pub fn new(session: Session, ai_worker: Option<AiWorker>) -> Self {
        App {
            session,
            target: InputTarget::Expression,
            problem_text: String::new(),
            ai_panel: AiPanel::Idle,
            analysis: None,
            ai_worker,
            cursor_history: None,
            should_quit: false,
            show_help: false,
            help_scroll: 0,
            terminal_too_small: false,
        }
    }

    /// Keyboard characters as keypad tokens: `*` and `/` become `×` and `÷`.
    pub fn type_char(&mut self, c: char) {
        match self.target {
            InputTarget::WordProblem => self.problem_text.push(c),
            InputTarget::Expression => match c {
                '=' => self.evaluate(),
                '*' => self.session.append("×"),
                '/' => self.session.append("÷"),
                c => self.session.append(c.encode_utf8(&mut [0; 4])),
            },
        }
    }

    pub fn append_token(&mut self, token: &str) {
        if self.target == InputTarget::Expression {
            self.session.append(token);
        }
    }

    /// Ctrl+P: the keyboard has no `π` key.
    pub fn insert_pi(&mut self) {
        match self.target {
            InputTarget::WordProblem => self.problem_text.push('π'),
            InputTarget::Expression => self.session.append("π"),
        }
    }

    pub fn backspace(&mut self) {
        match self.target {
            InputTarget::WordProblem => {
                self.problem_text.pop();
            }
            InputTarget::Expression => self.session.delete_last(),
        }
    }

    pub fn clear(&mut self) {
        match self.target {
            InputTarget::WordProblem => self.problem_text.clear(),
            InputTarget::Expression => {
                self.session.clear();
                self.cursor_history = None;
            }
        }
    }

    pub fn submit(&mut self) {
        match self.target {
            InputTarget::WordProblem => self.solve_problem(),
            InputTarget::Expression => self.evaluate(),
        }
    }

    pub fn evaluate(&mut self) {
        self.session.evaluate();
        self.cursor_history = None;
    }

    pub fn toggle_problem_input(&mut self) {
        self.target = match self.target {
            InputTarget::Expression => InputTarget::WordProblem,
            InputTarget::WordProblem => InputTarget::Expression,
        };
    }

    pub fn analyze_expression(&mut self) {
        let expression = self.session.expression().to_string();
        if expression.is_empty() {
            return;
        }
        self.request_ai(AnalysisKind::Expression, &expression);
    }

    fn solve_problem(&mut self) {
        let problem = self.problem_text.trim().to_string();
        if problem.is_empty() {
            return;
        }
        self.request_ai(AnalysisKind::WordProblem, &problem);
    }

    fn request_ai(&mut self, kind: AnalysisKind, text: &str) {
        if matches!(self.ai_panel, AiPanel::Loading(_)) {
            return;
        }
        let sent = self
            .ai_worker
            .as_ref()
            .map(|worker| worker.submit(kind, text))
            .unwrap_or(false);
        self.ai_panel = if sent {
            AiPanel::Loading(kind)
        } else {
            AiPanel::Failed(kind.offline_message())
        };
    }

    /// Picks up a finished AI request, if any.
    pub fn poll_ai(&mut self) {
        let Some(reply) = self.ai_worker.as_ref().and_then(|w| w.try_recv()) else {
            return;
        };
        self.ai_panel = match reply.result {
            Ok(analysis) => {
                self.analysis = Some(analysis);
                AiPanel::Ready
            }
            Err(e) => {
                warn!("AI request failed: {}", e);
                AiPanel::Failed(reply.kind.offline_message())
            }
        };
    }

    /// Moves the history selection (`-1` newer, `1` older) and restores the
    /// selected entry into the display.
    pub fn navigate_history(&mut self, direction: i32) {
        let len = self.session.history().len();
        if len == 0 {
            return;
        }

        let next = match (self.cursor_history, direction) {
            (None, d) if d > 0 => 0,
            (None, _) => return,
            (Some(i), d) if d < 0 => {
                if i == 0 {
                    return;
                }
                i - 1
            }
            (Some(i), _) => (i + 1).min(len - 1),
        };

        let id = self.session.history()[next].id.clone();
        if self.session.select_history(&id) {
            self.cursor_history = Some(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sci_calc::ai::{AiError, AiResult, AnalysisService, OfflineService, SOLVER_OFFLINE};
    use std::time::{Duration, Instant};
    use sci_calc::session::SessionMode;

    fn app() -> App {
        App::new(Session::new(), None)
    }

    #[test]
    fn keyboard_operators_become_glyphs() {
        let mut app = app();
        for c in "6*7/2".chars() {
            app.type_char(c);
        }
        assert_eq!(app.session.expression(), "6×7÷2");
        app.type_char('=');
        assert_eq!(app.session.result(), "21");
    }

    #[test]
    fn ctrl_p_inserts_pi_glyph() {
        let mut app = app();
        app.type_char('2');
        app.insert_pi();
        assert_eq!(app.session.expression(), "2π");
        app.type_char('=');
        assert_eq!(app.session.result(), "6.2831853072");

        app.toggle_problem_input();
        app.insert_pi();
        assert_eq!(app.problem_text, "π");
    }

    #[test]
    fn problem_input_does_not_touch_expression() {
        let mut app = app();
        app.toggle_problem_input();
        app.type_char('a');
        app.append_token("sin(");
        assert_eq!(app.problem_text, "a");
        assert_eq!(app.session.expression(), "");
        app.backspace();
        assert!(app.problem_text.is_empty());
    }

    #[test]
    fn history_navigation_selects_entries() {
        let mut app = app();
        for expr in ["1+1", "2+2"] {
            app.clear();
            app.append_token(expr);
            app.evaluate();
        }
        app.clear();

        app.navigate_history(1);
        assert_eq!(app.session.expression(), "2+2");
        assert_eq!(app.session.mode(), SessionMode::ScalarResult);
        app.navigate_history(1);
        assert_eq!(app.session.expression(), "1+1");
        app.navigate_history(1);
        assert_eq!(app.cursor_history, Some(1));
        app.navigate_history(-1);
        assert_eq!(app.session.result(), "4");
    }

    #[test]
    fn ai_without_worker_reports_offline() {
        let mut app = app();
        app.analyze_expression();
        assert!(matches!(app.ai_panel, AiPanel::Idle));

        app.append_token("2+2");
        app.analyze_expression();
        assert!(matches!(app.ai_panel, AiPanel::Failed(msg) if msg == AnalysisKind::Expression.offline_message()));
    }

    struct FlakyService;

    #[async_trait::async_trait]
    impl AnalysisService for FlakyService {
        async fn analyze_expression(&self, expression: &str) -> AiResult<AiAnalysis> {
            Ok(AiAnalysis {
                explanation: format!("about {}", expression),
                steps: vec![],
                suggested_formulas: vec![],
                plot_data: None,
            })
        }

        async fn solve_word_problem(&self, _problem: &str) -> AiResult<AiAnalysis> {
            Err(AiError::Api("quota".to_string()))
        }
    }

    fn settle(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while matches!(app.ai_panel, AiPanel::Loading(_)) {
            assert!(Instant::now() < deadline, "AI request never finished");
            app.poll_ai();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn failure_keeps_previous_analysis() {
        let worker = AiWorker::spawn(Box::new(FlakyService)).unwrap();
        let mut app = App::new(Session::new(), Some(worker));
        app.append_token("2+2");
        app.analyze_expression();
        settle(&mut app);
        assert!(matches!(app.ai_panel, AiPanel::Ready));

        app.toggle_problem_input();
        for c in "two trains".chars() {
            app.type_char(c);
        }
        app.submit();
        settle(&mut app);
        assert!(matches!(app.ai_panel, AiPanel::Failed(msg) if msg == SOLVER_OFFLINE));
        assert_eq!(
            app.analysis.as_ref().map(|a| a.explanation.as_str()),
            Some("about 2+2")
        );
    }

    #[test]
    fn calculator_stays_usable_while_ai_is_loading() {
        let worker = AiWorker::spawn(Box::new(OfflineService)).unwrap();
        let mut app = App::new(Session::new(), Some(worker));
        app.append_token("3×3");
        app.analyze_expression();
        assert!(matches!(app.ai_panel, AiPanel::Loading(AnalysisKind::Expression)));
        app.evaluate();
        assert_eq!(app.session.result(), "9");
    }
}
