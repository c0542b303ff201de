//! Tests for counter scopes, `counter-reset` and `counter-increment`.

use folio_layout::counters::{
    CounterDirective, LIST_ITEM_COUNTER, counter_text, format_counter, parse_counter_directives,
};
use folio_layout::{CounterContext, CounterStyle, LayoutTree, assign_counter_scopes};
use folio_style::{ComputedStyle, Display};

fn with_counters(reset: Option<&str>, increment: Option<&str>) -> ComputedStyle {
    ComputedStyle {
        counter_reset: reset.map(str::to_string),
        counter_increment: increment.map(str::to_string),
        ..ComputedStyle::default()
    }
}

#[test]
fn test_reset_then_two_increments() {
    let mut counters = CounterContext::new();
    let scope = counters.register_scope(None);
    counters.reset_counter("sect", 0, scope);
    counters.increment_counter("sect", 1, scope);
    counters.increment_counter("sect", 1, scope);
    assert_eq!(counters.get_counter("sect", scope), 2);

    let child = counters.register_scope(Some(scope));
    assert_eq!(counters.get_counter("sect", child), 2);
}

#[test]
fn test_increment_updates_the_defining_scope() {
    let mut counters = CounterContext::new();
    let root = counters.register_scope(None);
    counters.reset_counter("sect", 0, root);
    let child = counters.register_scope(Some(root));
    counters.increment_counter("sect", 3, child);
    assert_eq!(counters.get_counter("sect", root), 3);
}

#[test]
fn test_undefined_counter_is_zero_and_created_on_increment() {
    let mut counters = CounterContext::new();
    let root = counters.register_scope(None);
    assert_eq!(counters.get_counter("missing", root), 0);

    let child = counters.register_scope(Some(root));
    counters.increment_counter("fresh", 1, child);
    assert_eq!(counters.get_counter("fresh", child), 1);
    assert_eq!(counters.get_counter("fresh", root), 0);
}

#[test]
fn test_scopes_follow_the_tree() {
    let mut tree = LayoutTree::new(with_counters(Some("sect"), None));
    let a = tree.append_element(tree.root(), "h2", with_counters(None, Some("sect")));
    let b = tree.append_element(tree.root(), "h2", with_counters(None, Some("sect")));
    let after = tree.append_element(tree.root(), "p", ComputedStyle::default());
    let mut counters = CounterContext::new();
    assign_counter_scopes(&mut tree, &mut counters);

    assert_eq!(counter_text(&tree, &counters, after, "sect", CounterStyle::Decimal), "2");
    assert_eq!(counter_text(&tree, &counters, after, "sect", CounterStyle::UpperRoman), "II");
    assert!(tree[a].counter_scope.is_some());
    assert_ne!(tree[a].counter_scope, tree[b].counter_scope);
}

#[test]
fn test_text_shares_parent_scope() {
    let mut tree = LayoutTree::new(ComputedStyle::default());
    let p = tree.append_element(tree.root(), "p", ComputedStyle::default());
    let text = tree.append_text(p, "hello");
    let mut counters = CounterContext::new();
    assign_counter_scopes(&mut tree, &mut counters);
    assert_eq!(tree[text].counter_scope, tree[p].counter_scope);
}

#[test]
fn test_nested_counters() {
    let mut tree = LayoutTree::new(with_counters(Some("item"), None));
    let outer = tree.append_element(tree.root(), "li", with_counters(None, Some("item")));
    let list = tree.append_element(outer, "ol", with_counters(Some("item"), None));
    let _ = tree.append_element(list, "li", with_counters(None, Some("item")));
    let second = tree.append_element(list, "li", with_counters(None, Some("item")));
    let mut counters = CounterContext::new();
    assign_counter_scopes(&mut tree, &mut counters);

    let scope = tree[second].counter_scope.unwrap();
    assert_eq!(counters.counters("item", scope, ".", CounterStyle::Decimal), "1.2");
    assert_eq!(counters.get_counter("item", scope), 2);
}

#[test]
fn test_list_items_count_themselves() {
    // The list resets `list-item`; its items only increment.
    let mut tree = LayoutTree::new(with_counters(Some(LIST_ITEM_COUNTER), None));
    let list_item = ComputedStyle {
        display: Display::ListItem,
        ..ComputedStyle::default()
    };
    let _ = tree.append_element(tree.root(), "li", list_item.clone());
    let _ = tree.append_element(tree.root(), "li", list_item.clone());
    let third = tree.append_element(tree.root(), "li", list_item);
    let mut counters = CounterContext::new();
    assign_counter_scopes(&mut tree, &mut counters);

    assert_eq!(
        counter_text(&tree, &counters, third, LIST_ITEM_COUNTER, CounterStyle::LowerAlpha),
        "c"
    );
}

#[test]
fn test_parse_counter_directives() {
    assert_eq!(
        parse_counter_directives("chapter 3 section"),
        vec![
            CounterDirective {
                name: "chapter".to_string(),
                value: Some(3),
            },
            CounterDirective {
                name: "section".to_string(),
                value: None,
            },
        ]
    );
    assert!(parse_counter_directives("none").is_empty());
    assert_eq!(parse_counter_directives("page -2")[0].value, Some(-2));
}

#[test]
fn test_format_counter() {
    assert_eq!(format_counter(7, CounterStyle::DecimalLeadingZero), "07");
    assert_eq!(format_counter(1994, CounterStyle::LowerRoman), "mcmxciv");
    assert_eq!(format_counter(28, CounterStyle::UpperAlpha), "AB");
    assert_eq!(format_counter(0, CounterStyle::LowerRoman), "0");
    assert_eq!(format_counter(-3, CounterStyle::Decimal), "-3");
}
