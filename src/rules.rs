//! Convert-value rules: conditional styling matched against an element's
//! current value.
//!
//! A rule list is an immutable ordered sequence and list order is
//! priority: the first rule whose predicate holds wins. Reordering produces
//! a new sequence.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::log;
use crate::model::{Element, ElementId, ElementKind, coerce_number, lenient, value_to_text};
use crate::render::defaults;

/// Comparison applied between the element value and the rule value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=", alias = "==")]
    Eq,
    #[serde(rename = "!=", alias = "<>")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "is_even")]
    IsEven,
    #[serde(rename = "is_odd")]
    IsOdd,
}

/// One conditional style rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub blink: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blink_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blink_bg_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
}

impl Rule {
    pub fn new(operator: Operator, value: impl Into<Value>) -> Self {
        Rule {
            operator,
            value: value.into(),
            color: None,
            bg_color: None,
            blink: false,
            blink_color: None,
            blink_bg_color: None,
            display_text: None,
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn with_bg_color(mut self, color: &str) -> Self {
        self.bg_color = Some(color.to_string());
        self
    }

    pub fn with_blink(mut self, blink_color: Option<&str>, blink_bg_color: Option<&str>) -> Self {
        self.blink = true;
        self.blink_color = blink_color.map(str::to_string);
        self.blink_bg_color = blink_bg_color.map(str::to_string);
        self
    }

    pub fn with_display_text(mut self, text: &str) -> Self {
        self.display_text = Some(text.to_string());
        self
    }

    /// Does this rule's predicate hold for `value`?
    ///
    /// Relational and parity operators fail closed when either side does
    /// not coerce to a number.
    pub fn matches(&self, value: &Value) -> bool {
        match self.operator {
            Operator::Eq => loose_eq(value, &self.value),
            Operator::Ne => !loose_eq(value, &self.value),
            Operator::Gt => self.compare(value, |a, b| a > b),
            Operator::Lt => self.compare(value, |a, b| a < b),
            Operator::Ge => self.compare(value, |a, b| a >= b),
            Operator::Le => self.compare(value, |a, b| a <= b),
            Operator::IsEven => coerce_number(value).is_some_and(|n| n % 2.0 == 0.0),
            Operator::IsOdd => coerce_number(value).is_some_and(|n| (n % 2.0).abs() == 1.0),
        }
    }

    fn compare(&self, value: &Value, op: impl Fn(f64, f64) -> bool) -> bool {
        match (coerce_number(value), coerce_number(&self.value)) {
            (Some(a), Some(b)) => op(a, b),
            _ => false,
        }
    }
}

/// Loose equality over raw values: `50 == "50"`, `"on" == "on"`,
/// `true == 1`. Null only equals null.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(_) | Value::Bool(_), _) | (_, Value::Number(_) | Value::Bool(_)) => {
            match (coerce_number(a), coerce_number(b)) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        _ => a == b,
    }
}

/// First rule in `rules` matching `value`.
pub fn evaluate<'a>(value: &Value, rules: &'a [Rule]) -> Option<&'a Rule> {
    rules.iter().find(|rule| rule.matches(value))
}

/// Immutable, ordered rule list. Cloning is cheap and edits return a new
/// list, so readers never observe a reorder in progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet(Arc<[Rule]>);

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        RuleSet(rules.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.0
    }

    /// First matching rule together with its position.
    pub fn first_match(&self, value: &Value) -> Option<(usize, &Rule)> {
        self.0.iter().enumerate().find(|(_, rule)| rule.matches(value))
    }

    pub fn with_rule(&self, rule: Rule) -> RuleSet {
        let mut rules = self.0.to_vec();
        rules.push(rule);
        RuleSet::new(rules)
    }

    pub fn without(&self, index: usize) -> RuleSet {
        let mut rules = self.0.to_vec();
        if index < rules.len() {
            rules.remove(index);
        }
        RuleSet::new(rules)
    }

    /// Raise the priority of the rule at `index` by one place.
    pub fn moved_up(&self, index: usize) -> RuleSet {
        let mut rules = self.0.to_vec();
        if index > 0 && index < rules.len() {
            rules.swap(index - 1, index);
        }
        RuleSet::new(rules)
    }

    /// Lower the priority of the rule at `index` by one place.
    pub fn moved_down(&self, index: usize) -> RuleSet {
        let mut rules = self.0.to_vec();
        if index + 1 < rules.len() {
            rules.swap(index, index + 1);
        }
        RuleSet::new(rules)
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        RuleSet::new(rules)
    }
}

impl Serialize for RuleSet {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.rules().serialize(s)
    }
}

// ============================================================================
// Style resolution
// ============================================================================

/// Two-state blink machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlinkPhase {
    #[default]
    Visible,
    Hidden,
}

/// Colours an element is drawn with after rules are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    /// Primary colour: shape fill, line stroke, text colour, gauge marker.
    pub color: String,
    /// Background colour for elements that draw one.
    pub bg_color: Option<String>,
    /// Rule `display_text`, if the matched rule carries one.
    pub display_text: Option<String>,
}

/// Apply the colour precedence: matched rule, then the element's own
/// `color`/`bg_color` property, then the type default. In the Hidden
/// blink phase the rule's blink colours are used instead.
pub fn resolve_style(element: &Element, matched: Option<&Rule>, phase: BlinkPhase) -> ResolvedStyle {
    let props = element.props();
    let base_color = props
        .color("color")
        .unwrap_or_else(|| defaults::primary_color(&element.kind))
        .to_string();
    let base_bg = props
        .color("bg_color")
        .or_else(|| defaults::background_color(&element.kind))
        .map(str::to_string);

    let Some(rule) = matched else {
        return ResolvedStyle {
            color: base_color,
            bg_color: base_bg,
            display_text: None,
        };
    };

    let (color, bg_color) = match phase {
        BlinkPhase::Hidden if rule.blink => (
            rule.blink_color.clone().unwrap_or_else(|| defaults::NONE.to_string()),
            Some(rule.blink_bg_color.clone().unwrap_or_else(|| defaults::NONE.to_string())),
        ),
        _ => (
            rule.color.clone().unwrap_or(base_color),
            rule.bg_color.clone().or(base_bg),
        ),
    };
    ResolvedStyle {
        color,
        bg_color,
        display_text: rule.display_text.clone(),
    }
}

/// Text shown by a text-like element.
///
/// Rule display text wins; otherwise a bound element shows its live value
/// or a `[Bound: <source>]` placeholder, and an unbound one its `text`.
pub fn bound_text(element: &Element, value: Option<&Value>, matched: Option<&Rule>) -> String {
    if let Some(text) = matched.and_then(|r| r.display_text.as_ref()) {
        return text.clone();
    }
    match (&element.data_binding_source, value) {
        (Some(_), Some(v)) => value_to_text(v),
        (Some(source), None) => format!("[Bound: {source}]"),
        (None, _) => element.props().text("text").unwrap_or_default(),
    }
}

/// Does this element type show text that a binding can replace?
pub fn is_text_kind(kind: &ElementKind) -> bool {
    matches!(kind, ElementKind::Text | ElementKind::Button)
}

// ============================================================================
// Blink scheduling
// ============================================================================

#[derive(Debug, Clone)]
struct BlinkTask {
    rule_index: usize,
    rule: Rule,
    started: Duration,
}

/// Per-element blink tasks.
///
/// A task exists exactly while an element's active rule has `blink`
/// enabled. Time is a host-supplied monotonic timestamp; the phase is a
/// pure function of the time elapsed since the task started, so it
/// toggles once per period and never drifts across re-renders.
#[derive(Debug, Clone)]
pub struct BlinkScheduler {
    period: Duration,
    tasks: HashMap<ElementId, BlinkTask>,
}

impl BlinkScheduler {
    pub fn new(period: Duration) -> Self {
        let period = if period.is_zero() { Duration::from_millis(1) } else { period };
        Self {
            period,
            tasks: HashMap::new(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Reconcile the task for `id` with its currently matched rule.
    ///
    /// Starts a task (phase Visible) when a blinking rule becomes active,
    /// keeps it while the same rule stays active, and cancels it the moment
    /// the match changes or clears.
    pub fn sync(&mut self, id: &ElementId, matched: Option<(usize, &Rule)>, now: Duration) -> BlinkPhase {
        match matched {
            Some((index, rule)) if rule.blink => {
                let same = self
                    .tasks
                    .get(id)
                    .is_some_and(|t| t.rule_index == index && &t.rule == rule);
                if !same {
                    log::debug!(element = %id, "blink task started");
                    self.tasks.insert(
                        id.clone(),
                        BlinkTask {
                            rule_index: index,
                            rule: rule.clone(),
                            started: now,
                        },
                    );
                }
                self.phase(id, now)
            }
            _ => {
                self.cancel(id);
                BlinkPhase::Visible
            }
        }
    }

    /// Current phase; elements without a task are Visible.
    pub fn phase(&self, id: &ElementId, now: Duration) -> BlinkPhase {
        let Some(task) = self.tasks.get(id) else {
            return BlinkPhase::Visible;
        };
        let elapsed = now.saturating_sub(task.started);
        let toggles = elapsed.as_nanos() / self.period.as_nanos();
        if toggles % 2 == 0 { BlinkPhase::Visible } else { BlinkPhase::Hidden }
    }

    pub fn is_active(&self, id: &ElementId) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn cancel(&mut self, id: &ElementId) {
        if self.tasks.remove(id).is_some() {
            log::debug!(element = %id, "blink task cancelled");
        }
    }

    /// Drop tasks of elements that no longer exist.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&ElementId) -> bool,
    {
        self.tasks.retain(|id, _| keep(id));
    }

    /// Cancel everything (scene teardown).
    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    /// Earliest time after `now` at which any task toggles.
    pub fn next_toggle(&self, now: Duration) -> Option<Duration> {
        let period = self.period.as_nanos();
        self.tasks
            .values()
            .map(|task| {
                let elapsed = now.saturating_sub(task.started).as_nanos();
                let next = (elapsed / period + 1) * period;
                task.started + Duration::from_nanos(next as u64)
            })
            .min()
    }
}
