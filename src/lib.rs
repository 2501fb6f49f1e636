//! Deterministic headless runtime for the client-side behaviors of a
//! storefront/messaging page.
//!
//! A [`Page`] owns an in-memory DOM parsed from markup, a listener store,
//! and a virtual clock. Each page behavior (search filter, category pills,
//! cart counter, alert auto-dismiss, ...) is installed through an explicit
//! registration function and driven by synthetic user actions
//! ([`Page::click`], [`Page::type_text`], [`Page::submit`]) plus explicit
//! time control ([`Page::advance_time`], [`Page::flush`]). The blocking
//! confirm dialog and the mark-message-read service are mock seams
//! configured per test.

use std::collections::{HashMap, HashSet, VecDeque};
use std::error::Error as StdError;
use std::fmt;

mod behaviors;
mod dom;
mod html;
mod money;
mod selector;

pub use behaviors::product_visible;
pub use money::{format_lek, parse_count, parse_price};

use behaviors::BehaviorAction;
use dom::*;
use html::parse_html;
use money::*;
use selector::*;

#[cfg(test)]
mod tests;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    PageRuntime(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::PageRuntime(msg) => write!(f, "page runtime error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}

#[derive(Debug, Clone)]
pub(crate) struct EventState {
    pub(crate) event_type: String,
    pub(crate) target: NodeId,
    pub(crate) default_prevented: bool,
}

impl EventState {
    fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            default_prevented: false,
        }
    }

    pub(crate) fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

#[derive(Debug, Clone)]
struct Listener {
    event_type: String,
    action: BehaviorAction,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum TimerAction {
    FadeOutAlert(NodeId),
    RemoveAlert(NodeId),
    SettleCartBounce(NodeId),
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    id: i64,
    due_at: i64,
    order: i64,
    action: TimerAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
}

/// A recorded smooth-scroll request, the headless stand-in for animating the
/// viewport to an anchor target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRequest {
    pub target_id: String,
    pub behavior: String,
    pub block: String,
}

pub struct Page {
    dom: Dom,
    listeners: HashMap<NodeId, Vec<Listener>>,
    installed: HashSet<&'static str>,
    task_queue: Vec<ScheduledTask>,
    now_ms: i64,
    timer_step_limit: usize,
    next_timer_id: i64,
    next_task_order: i64,
    search_term: String,
    active_category: Option<String>,
    confirm_prompts: Vec<String>,
    confirm_responses: VecDeque<bool>,
    default_confirm_response: bool,
    mark_read_calls: Vec<String>,
    mark_read_responses: VecDeque<bool>,
    default_mark_read_response: bool,
    navigations: Vec<String>,
    form_submissions: Vec<String>,
    scroll_requests: Vec<ScrollRequest>,
    trace: bool,
    trace_events: bool,
    trace_timers: bool,
    trace_logs: Vec<String>,
    trace_log_limit: usize,
    trace_to_stderr: bool,
}

impl Page {
    /// Parses markup without installing any behavior. Useful for exercising
    /// a single registration function in isolation.
    pub fn from_html(html: &str) -> Result<Self> {
        let dom = parse_html(html)?;
        Ok(Self {
            dom,
            listeners: HashMap::new(),
            installed: HashSet::new(),
            task_queue: Vec::new(),
            now_ms: 0,
            timer_step_limit: 10_000,
            next_timer_id: 1,
            next_task_order: 0,
            search_term: String::new(),
            active_category: None,
            confirm_prompts: Vec::new(),
            confirm_responses: VecDeque::new(),
            default_confirm_response: false,
            mark_read_calls: Vec::new(),
            mark_read_responses: VecDeque::new(),
            default_mark_read_response: true,
            navigations: Vec::new(),
            form_submissions: Vec::new(),
            scroll_requests: Vec::new(),
            trace: false,
            trace_events: true,
            trace_timers: true,
            trace_logs: Vec::new(),
            trace_log_limit: 10_000,
            trace_to_stderr: true,
        })
    }

    /// Parses markup and installs every behavior, the analog of the page's
    /// "content fully parsed" hook.
    pub fn open(html: &str) -> Result<Self> {
        let mut page = Self::from_html(html)?;
        page.install_all()?;
        Ok(page)
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace_timers = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace_logs)
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::PageRuntime(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_log_limit = max_entries;
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
        Ok(())
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::PageRuntime(
                "set_timer_step_limit requires at least 1 step".into(),
            ));
        }
        self.timer_step_limit = max_steps;
        Ok(())
    }

    // ---- confirm dialog seam -------------------------------------------

    /// Queues the answer the next blocking confirm prompt will receive.
    pub fn push_confirm_response(&mut self, accept: bool) {
        self.confirm_responses.push_back(accept);
    }

    pub fn set_default_confirm_response(&mut self, accept: bool) {
        self.default_confirm_response = accept;
    }

    /// Prompt texts presented so far, in order.
    pub fn confirm_prompts(&self) -> &[String] {
        &self.confirm_prompts
    }

    // ---- mark-read service seam ----------------------------------------

    /// Queues the outcome of the next mark-message-read service call.
    pub fn push_mark_read_response(&mut self, ok: bool) {
        self.mark_read_responses.push_back(ok);
    }

    pub fn set_default_mark_read_response(&mut self, ok: bool) {
        self.default_mark_read_response = ok;
    }

    /// Message keys sent to the mark-read service, in call order.
    pub fn mark_read_calls(&self) -> &[String] {
        &self.mark_read_calls
    }

    // ---- recorded default actions --------------------------------------

    /// Hrefs of navigations that went through (anchor clicks whose default
    /// was not prevented).
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    /// `action` attributes of forms whose submission was not blocked.
    pub fn form_submissions(&self) -> &[String] {
        &self.form_submissions
    }

    pub fn scroll_requests(&self) -> &[ScrollRequest] {
        &self.scroll_requests
    }

    // ---- filter state --------------------------------------------------

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn active_category(&self) -> Option<&str> {
        self.active_category.as_deref()
    }

    // ---- user actions --------------------------------------------------

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }

        let outcome = self.dispatch_event(target, "click")?;
        if outcome.default_prevented {
            return Ok(());
        }

        if self
            .dom
            .tag_name(target)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("a"))
        {
            if let Some(href) = self.dom.attr(target, "href") {
                self.navigations.push(href);
            }
        }

        if self.is_submit_control(target) {
            if let Some(form) = self.enclosing_form(target) {
                self.submit_form(form)?;
            }
        }

        Ok(())
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        if self
            .dom
            .element(target)
            .is_some_and(|element| element.readonly)
        {
            return Ok(());
        }

        let tag = self
            .dom
            .tag_name(target)
            .ok_or_else(|| Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: "non-element".into(),
            })?
            .to_ascii_lowercase();

        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }

        self.dom.set_value(target, text)?;
        self.dispatch_event(target, "input")?;
        Ok(())
    }

    pub fn submit(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;

        let form = if self
            .dom
            .tag_name(target)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("form"))
        {
            Some(target)
        } else {
            self.enclosing_form(target)
        };

        if let Some(form) = form {
            self.submit_form(form)?;
        }
        Ok(())
    }

    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(target, event)?;
        Ok(())
    }

    fn submit_form(&mut self, form: NodeId) -> Result<()> {
        let outcome = self.dispatch_event(form, "submit")?;
        if !outcome.default_prevented {
            let action = self.dom.attr(form, "action").unwrap_or_default();
            self.form_submissions.push(action);
        }
        Ok(())
    }

    fn is_submit_control(&self, node_id: NodeId) -> bool {
        let Some(tag) = self.dom.tag_name(node_id) else {
            return false;
        };
        let kind = self
            .dom
            .attr(node_id, "type")
            .unwrap_or_default()
            .to_ascii_lowercase();
        if tag.eq_ignore_ascii_case("button") {
            return kind.is_empty() || kind == "submit";
        }
        tag.eq_ignore_ascii_case("input") && (kind == "submit" || kind == "image")
    }

    fn enclosing_form(&self, node_id: NodeId) -> Option<NodeId> {
        let mut cursor = self.dom.parent(node_id);
        while let Some(current) = cursor {
            if self
                .dom
                .tag_name(current)
                .is_some_and(|tag| tag.eq_ignore_ascii_case("form"))
            {
                return Some(current);
            }
            cursor = self.dom.parent(current);
        }
        None
    }

    pub(crate) fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    pub(crate) fn attach_listener(
        &mut self,
        target: NodeId,
        event_type: &str,
        action: BehaviorAction,
    ) {
        self.listeners.entry(target).or_default().push(Listener {
            event_type: event_type.to_string(),
            action,
        });
    }

    pub(crate) fn dispatch_event(&mut self, target: NodeId, event_type: &str) -> Result<EventState> {
        let actions = self
            .listeners
            .get(&target)
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|listener| listener.event_type == event_type)
                    .map(|listener| listener.action)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let mut event = EventState::new(event_type, target);
        for action in actions {
            self.run_action(action, &mut event)?;
        }

        if self.trace && self.trace_events {
            let label = self
                .dom
                .tag_name(target)
                .map(ToOwned::to_owned)
                .unwrap_or_else(|| "non-element".into());
            self.trace_line(format!(
                "[event] {} target={} default_prevented={}",
                event.event_type, label, event.default_prevented
            ));
        }

        Ok(event)
    }

    // ---- virtual clock -------------------------------------------------

    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub(crate) fn schedule_task(&mut self, delay_ms: i64, action: TimerAction) -> i64 {
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        let order = self.next_task_order;
        self.next_task_order += 1;
        self.task_queue.push(ScheduledTask {
            id,
            due_at: self.now_ms.saturating_add(delay_ms.max(0)),
            order,
            action,
        });
        id
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub fn clear_timer(&mut self, timer_id: i64) -> bool {
        let before = self.task_queue.len();
        self.task_queue.retain(|task| task.id != timer_id);
        before != self.task_queue.len()
    }

    pub fn clear_all_timers(&mut self) -> usize {
        let cleared = self.task_queue.len();
        self.task_queue.clear();
        if self.trace && self.trace_timers {
            self.trace_line(format!("[timer] clear_all cleared={cleared}"));
        }
        cleared
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::PageRuntime(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.now_ms;
        self.now_ms = self.now_ms.saturating_add(delta_ms);
        let ran = self.run_due_timers_internal()?;
        if self.trace && self.trace_timers {
            self.trace_line(format!(
                "[timer] advance delta_ms={} from={} to={} ran_due={}",
                delta_ms, from, self.now_ms, ran
            ));
        }
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.now_ms {
            return Err(Error::PageRuntime(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.now_ms
            )));
        }
        let from = self.now_ms;
        self.now_ms = target_ms;
        let ran = self.run_due_timers_internal()?;
        if self.trace && self.trace_timers {
            self.trace_line(format!(
                "[timer] advance_to from={} to={} ran_due={}",
                from, self.now_ms, ran
            ));
        }
        Ok(())
    }

    /// Runs every pending task, advancing the clock to each task's due time.
    pub fn flush(&mut self) -> Result<()> {
        let from = self.now_ms;
        let ran = self.run_timer_queue(None, true)?;
        if self.trace && self.trace_timers {
            self.trace_line(format!(
                "[timer] flush from={} to={} ran={}",
                from, self.now_ms, ran
            ));
        }
        Ok(())
    }

    pub fn run_next_timer(&mut self) -> Result<bool> {
        let Some(next_idx) = self.next_task_index(None) else {
            return Ok(false);
        };

        let task = self.task_queue.remove(next_idx);
        if task.due_at > self.now_ms {
            self.now_ms = task.due_at;
        }
        self.execute_timer_task(task)?;
        Ok(true)
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        let ran = self.run_due_timers_internal()?;
        if self.trace && self.trace_timers {
            self.trace_line(format!("[timer] run_due now_ms={} ran={}", self.now_ms, ran));
        }
        Ok(ran)
    }

    fn run_due_timers_internal(&mut self) -> Result<usize> {
        self.run_timer_queue(Some(self.now_ms), false)
    }

    fn run_timer_queue(&mut self, due_limit: Option<i64>, advance_clock: bool) -> Result<usize> {
        let mut steps = 0usize;
        while let Some(next_idx) = self.next_task_index(due_limit) {
            steps += 1;
            if steps > self.timer_step_limit {
                return Err(Error::PageRuntime(format!(
                    "timer queue exceeded max task steps: limit={}, steps={steps}, now_ms={}",
                    self.timer_step_limit, self.now_ms
                )));
            }
            let task = self.task_queue.remove(next_idx);
            if advance_clock && task.due_at > self.now_ms {
                self.now_ms = task.due_at;
            }
            self.execute_timer_task(task)?;
        }
        Ok(steps)
    }

    fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.is_none_or(|limit| task.due_at <= limit))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }

    fn execute_timer_task(&mut self, task: ScheduledTask) -> Result<()> {
        if self.trace && self.trace_timers {
            self.trace_line(format!(
                "[timer] run id={} due_at={} now_ms={}",
                task.id, task.due_at, self.now_ms
            ));
        }
        match task.action {
            TimerAction::FadeOutAlert(alert) => {
                if self.dom.is_attached(alert) {
                    self.dom.set_style_property(alert, "opacity", "0")?;
                    self.schedule_task(500, TimerAction::RemoveAlert(alert));
                }
            }
            TimerAction::RemoveAlert(alert) => {
                self.dom.detach(alert);
            }
            TimerAction::SettleCartBounce(counter) => {
                self.dom.class_remove(counter, "bounce")?;
            }
        }
        Ok(())
    }

    fn trace_line(&mut self, line: String) {
        if self.trace_to_stderr {
            eprintln!("{line}");
        }
        self.trace_logs.push(line);
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
    }

    // ---- assertions ----------------------------------------------------

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        self.select_one(selector)?;
        Ok(())
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target).trim().to_string();
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.dom.outer_snippet(target, 160),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target).unwrap_or_default();
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.dom.outer_snippet(target, 160),
            });
        }
        Ok(())
    }

    pub fn assert_has_class(&self, selector: &str, class_name: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if !self.dom.class_contains(target, class_name)? {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("class {class_name}"),
                actual: self.dom.attr(target, "class").unwrap_or_default(),
                dom_snippet: self.dom.outer_snippet(target, 160),
            });
        }
        Ok(())
    }

    pub fn assert_lacks_class(&self, selector: &str, class_name: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.class_contains(target, class_name)? {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("no class {class_name}"),
                actual: self.dom.attr(target, "class").unwrap_or_default(),
                dom_snippet: self.dom.outer_snippet(target, 160),
            });
        }
        Ok(())
    }

    pub fn assert_visible(&self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if !self.dom.is_visible(target) {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: "visible".into(),
                actual: "hidden".into(),
                dom_snippet: self.dom.outer_snippet(target, 160),
            });
        }
        Ok(())
    }

    pub fn assert_hidden(&self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.is_visible(target) {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: "hidden".into(),
                actual: "visible".into(),
                dom_snippet: self.dom.outer_snippet(target, 160),
            });
        }
        Ok(())
    }

    pub fn assert_count(&self, selector: &str, expected: usize) -> Result<()> {
        let actual = self.dom.query_selector_all(selector)?.len();
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: String::new(),
            });
        }
        Ok(())
    }
}
