//! Scoped CSS counters.
//!
//! [CSS Lists 3 § 4 Automatic Numbering With Counters](https://www.w3.org/TR/css-lists-3/#auto-numbering)
//!
//! Every box gets a scope whose parent is the scope of its parent box.
//! `counter-reset` creates (or overwrites) a counter in the box's own
//! scope. `counter-increment` bumps the nearest counter of that name up the
//! scope chain, so list items numbered inside a list all share the list's
//! counter; if no scope on the chain has the counter, it is created at 0 in
//! the box's own scope first. Scopes are only ever added during a render.

use std::collections::HashMap;

use folio_common::warning::warn_once;
use folio_style::{ComputedStyle, Display};
use serde::Serialize;
use strum_macros::EnumString;
use tracing::debug;

use crate::tree::{LayoutTree, NodeId};

/// Counter implicitly incremented by `display: list-item` boxes.
pub const LIST_ITEM_COUNTER: &str = "list-item";

/// Index of a counter scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ScopeId(pub usize);

/// [CSS Counter Styles 3 § 6 Simple Predefined Counter Styles](https://www.w3.org/TR/css-counter-styles-3/#simple-predefined-counter-styles)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, EnumString, strum_macros::Display,
)]
#[strum(serialize_all = "kebab-case")]
pub enum CounterStyle {
    /// `1 2 3`
    #[default]
    Decimal,
    /// `01 02 03`
    DecimalLeadingZero,
    /// `i ii iii`
    LowerRoman,
    /// `I II III`
    UpperRoman,
    /// `a b c ... z aa ab`
    LowerAlpha,
    /// `A B C ... Z AA AB`
    UpperAlpha,
}

/// One `name [integer]` pair of a `counter-reset` or `counter-increment`
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterDirective {
    /// Counter name.
    pub name: String,
    /// Explicit integer, if given.
    pub value: Option<i32>,
}

/// Parse a `counter-reset` / `counter-increment` value.
///
/// [CSS Lists 3 § 4.1](https://www.w3.org/TR/css-lists-3/#counter-properties)
///
/// "Value: [ <counter-name> <integer>? ]+ | none"
///
/// Invalid tokens are reported once and skipped; `none` yields an empty
/// list.
#[must_use]
pub fn parse_counter_directives(value: &str) -> Vec<CounterDirective> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut tokens = trimmed.split_whitespace().peekable();
    while let Some(token) = tokens.next() {
        if !is_counter_name(token) {
            let _ = warn_once("counters", &format!("invalid counter name '{token}' in '{value}'"));
            continue;
        }
        let value = tokens.peek().and_then(|t| t.parse::<i32>().ok());
        if value.is_some() {
            let _ = tokens.next();
        }
        out.push(CounterDirective {
            name: token.to_string(),
            value,
        });
    }
    out
}

fn is_counter_name(token: &str) -> bool {
    const RESERVED: [&str; 5] = ["none", "inherit", "initial", "unset", "default"];
    let mut chars = token.chars();
    let starts_ok = match chars.next() {
        Some('-') => chars.next().is_some_and(|c| c.is_alphabetic() || c == '_' || c == '-'),
        Some(c) => c.is_alphabetic() || c == '_',
        None => false,
    };
    starts_ok
        && token.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        && !RESERVED.iter().any(|r| token.eq_ignore_ascii_case(r))
}

#[derive(Debug, Clone, Default, Serialize)]
struct Scope {
    parent: Option<ScopeId>,
    counters: HashMap<String, i32>,
}

/// All counter scopes of one render.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CounterContext {
    scopes: Vec<Scope>,
}

impl CounterContext {
    /// An empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered scopes.
    #[must_use]
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Register a scope under `parent` (`None` for a root scope).
    pub fn register_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let parent = parent.filter(|p| {
            let known = p.0 < self.scopes.len();
            debug_assert!(known, "counter scope parent {p:?} was never registered");
            known
        });
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            parent,
            counters: HashMap::new(),
        });
        id
    }

    fn scope_mut(&mut self, scope: ScopeId) -> Option<&mut Scope> {
        let found = self.scopes.get_mut(scope.0);
        debug_assert!(found.is_some(), "unknown counter scope {scope:?}");
        found
    }

    /// Scopes from `scope` up to its root.
    fn chain(&self, scope: ScopeId) -> impl Iterator<Item = (ScopeId, &Scope)> {
        let mut current = Some(scope);
        std::iter::from_fn(move || {
            let id = current?;
            let s = self.scopes.get(id.0)?;
            current = s.parent;
            Some((id, s))
        })
    }

    /// `counter-reset`: set `name` to `value` in `scope`.
    pub fn reset_counter(&mut self, name: &str, value: i32, scope: ScopeId) {
        if let Some(s) = self.scope_mut(scope) {
            let _ = s.counters.insert(name.to_string(), value);
        }
    }

    /// `counter-increment`: add `value` to the nearest `name` on the chain,
    /// instantiating it at 0 in `scope` when there is none.
    pub fn increment_counter(&mut self, name: &str, value: i32, scope: ScopeId) {
        let owner = self
            .chain(scope)
            .find(|(_, s)| s.counters.contains_key(name))
            .map_or(scope, |(id, _)| id);
        if let Some(s) = self.scope_mut(owner) {
            let counter = s.counters.entry(name.to_string()).or_insert(0);
            *counter = counter.saturating_add(value);
        }
    }

    /// Current value of `name` as seen from `scope`; 0 if no scope on the
    /// chain defines it.
    #[must_use]
    pub fn get_counter(&self, name: &str, scope: ScopeId) -> i32 {
        self.chain(scope)
            .find_map(|(_, s)| s.counters.get(name).copied())
            .unwrap_or(0)
    }

    /// [CSS Lists 3 § 4.3 counters()](https://www.w3.org/TR/css-lists-3/#counter-functions)
    ///
    /// Values of every `name` counter on the chain, outermost first, joined
    /// with `separator`. Falls back to the single value 0 when none exists.
    #[must_use]
    pub fn counters(
        &self,
        name: &str,
        scope: ScopeId,
        separator: &str,
        style: CounterStyle,
    ) -> String {
        let mut values: Vec<i32> = self
            .chain(scope)
            .filter_map(|(_, s)| s.counters.get(name).copied())
            .collect();
        if values.is_empty() {
            values.push(0);
        }
        values.reverse();
        values
            .into_iter()
            .map(|v| format_counter(v, style))
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Apply a box's `counter-reset` then `counter-increment` lists.
    ///
    /// Reset defaults to 0 and increment to 1. `display: list-item` also
    /// increments `list-item` by 1 unless the box names it explicitly.
    pub fn apply_style(&mut self, style: &ComputedStyle, scope: ScopeId) {
        if let Some(reset) = style.counter_reset.as_deref() {
            for d in parse_counter_directives(reset) {
                self.reset_counter(&d.name, d.value.unwrap_or(0), scope);
            }
        }
        let increments = style
            .counter_increment
            .as_deref()
            .map(parse_counter_directives)
            .unwrap_or_default();
        if style.display == Display::ListItem
            && !increments.iter().any(|d| d.name == LIST_ITEM_COUNTER)
        {
            self.increment_counter(LIST_ITEM_COUNTER, 1, scope);
        }
        for d in increments {
            self.increment_counter(&d.name, d.value.unwrap_or(1), scope);
        }
    }
}

/// Register a scope for every box in document order and apply its counter
/// properties. Text boxes share their parent's scope.
pub fn assign_counter_scopes(tree: &mut LayoutTree, counters: &mut CounterContext) {
    for id in tree.document_order() {
        let parent_scope = tree.parent(id).and_then(|p| tree[p].counter_scope);
        let scope = if tree[id].is_text() {
            parent_scope.unwrap_or_else(|| counters.register_scope(None))
        } else {
            let scope = counters.register_scope(parent_scope);
            counters.apply_style(&tree[id].style, scope);
            scope
        };
        tree[id].counter_scope = Some(scope);
    }
    debug!(scopes = counters.scope_count(), "assigned counter scopes");
}

/// Value of `name` for a laid-out box, as `counter(name, style)` would
/// print it.
#[must_use]
pub fn counter_text(
    tree: &LayoutTree,
    counters: &CounterContext,
    node: NodeId,
    name: &str,
    style: CounterStyle,
) -> String {
    let value = tree
        .get(node)
        .and_then(|n| n.counter_scope)
        .map_or(0, |scope| counters.get_counter(name, scope));
    format_counter(value, style)
}

const ROMAN: [(i32, &str); 13] = [
    (1000, "m"),
    (900, "cm"),
    (500, "d"),
    (400, "cd"),
    (100, "c"),
    (90, "xc"),
    (50, "l"),
    (40, "xl"),
    (10, "x"),
    (9, "ix"),
    (5, "v"),
    (4, "iv"),
    (1, "i"),
];

/// Format a counter value.
///
/// Roman styles cover 1..=3999 and alphabetic styles cover values ≥ 1;
/// anything outside falls back to decimal.
#[must_use]
pub fn format_counter(value: i32, style: CounterStyle) -> String {
    match style {
        CounterStyle::Decimal => value.to_string(),
        CounterStyle::DecimalLeadingZero => {
            if (0..10).contains(&value) {
                format!("0{value}")
            } else if (-9..0).contains(&value) {
                format!("-0{}", -value)
            } else {
                value.to_string()
            }
        }
        CounterStyle::LowerRoman | CounterStyle::UpperRoman => {
            if !(1..=3999).contains(&value) {
                return value.to_string();
            }
            let mut rest = value;
            let mut out = String::new();
            for (weight, symbol) in ROMAN {
                while rest >= weight {
                    out.push_str(symbol);
                    rest -= weight;
                }
            }
            if style == CounterStyle::UpperRoman {
                out.make_ascii_uppercase();
            }
            out
        }
        CounterStyle::LowerAlpha | CounterStyle::UpperAlpha => {
            if value < 1 {
                return value.to_string();
            }
            let base = if style == CounterStyle::UpperAlpha { b'A' } else { b'a' };
            let mut rest = value;
            let mut out = Vec::new();
            while rest > 0 {
                rest -= 1;
                // rest % 26 is in 0..26
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                out.push(base + (rest % 26) as u8);
                rest /= 26;
            }
            out.reverse();
            out.into_iter().map(char::from).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_counter_name() {
        assert!(is_counter_name("sect"));
        assert!(is_counter_name("-x-item"));
        assert!(is_counter_name("_a1"));
        assert!(!is_counter_name("2"));
        assert!(!is_counter_name("none"));
        assert!(!is_counter_name("-1x"));
    }
}
