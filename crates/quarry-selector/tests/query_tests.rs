//! Tests for the query dispatcher, the built-in engines and the custom CSS
//! pseudo-classes.

use quarry_dom::{DomTree, NodeId, Rect};
use quarry_selector::parser::SelectorBody;
use quarry_selector::{QuarryOptions, QueryContext, SelectorEngine, SelectorError, Selectors};

/// A store page:
///
/// ```text
/// html > body
///   header > h1 "Store"
///   ul#list > li.item ("Milk" span.price) ("Bread" span.price) ("Eggs" span.price, .sale)
///   form > label[for=email] input#email button[data-testid] button
///   div[style=display:none] "Hidden text"
/// ```
struct Page {
    tree: DomTree,
    h1: NodeId,
    list: NodeId,
    items: Vec<NodeId>,
    email: NodeId,
    save: NodeId,
    cancel: NodeId,
    hidden: NodeId,
}

fn element_with_text(tree: &mut DomTree, parent: NodeId, tag: &str, attrs: &[(&str, &str)], text: &str) -> NodeId {
    let element = tree.append_element(parent, tag, attrs);
    let _ = tree.append_text(element, text);
    element
}

fn page() -> Page {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, "html", &[]);
    let body = tree.append_element(html, "body", &[]);

    let header = tree.append_element(body, "header", &[]);
    let h1 = element_with_text(&mut tree, header, "h1", &[], "Store");

    let list = tree.append_element(body, "ul", &[("id", "list")]);
    let mut items = Vec::new();
    for (name, price, class) in [("Milk", "2", "item"), ("Bread", "3", "item"), ("Eggs", "4", "item sale")] {
        let li = element_with_text(&mut tree, list, "li", &[("class", class)], &format!("{name} "));
        let _ = element_with_text(&mut tree, li, "span", &[("class", "price")], price);
        items.push(li);
    }

    let form = tree.append_element(body, "form", &[]);
    let _ = element_with_text(&mut tree, form, "label", &[("for", "email")], "Email");
    let email = tree.append_element(
        form,
        "input",
        &[("id", "email"), ("type", "text"), ("placeholder", "you@example.com")],
    );
    let save = element_with_text(&mut tree, form, "button", &[("data-testid", "save-btn")], "Save");
    let cancel = element_with_text(&mut tree, form, "button", &[], "Cancel");
    let hidden = element_with_text(&mut tree, body, "div", &[("style", "display: none")], "Hidden text");

    tree.set_bounding_box(email, Rect::new(0.0, 0.0, 100.0, 20.0));
    tree.set_bounding_box(save, Rect::new(120.0, 0.0, 50.0, 20.0));
    tree.set_bounding_box(cancel, Rect::new(200.0, 0.0, 50.0, 20.0));

    Page {
        tree,
        h1,
        list,
        items,
        email,
        save,
        cancel,
        hidden,
    }
}

fn query(page: &Page, selector: &str) -> Vec<NodeId> {
    Selectors::default()
        .query_all(&page.tree, selector, NodeId::ROOT)
        .unwrap()
}

// ========== css and structure ==========

#[test]
fn test_nth_applies_to_the_current_set() {
    let page = page();
    assert_eq!(query(&page, "ul >> nth=-1"), [page.list]);
    assert_eq!(query(&page, "li >> nth=-1"), [page.items[2]]);
    assert_eq!(query(&page, "li >> nth=0"), [page.items[0]]);
    assert!(query(&page, "li >> nth=5").is_empty());
}

#[test]
fn test_css_parts() {
    let page = page();
    assert_eq!(query(&page, ".item"), page.items);
    assert_eq!(query(&page, "li.sale"), [page.items[2]]);
    assert_eq!(query(&page, "form > #email"), [page.email]);
    assert_eq!(query(&page, "#list >> .price").len(), 3);
}

#[test]
fn test_results_are_deduplicated() {
    let page = page();
    // Every item is reached from both the list and the body.
    assert_eq!(query(&page, "ul, body >> li"), page.items);
}

#[test]
fn test_custom_pseudo_classes() {
    let page = page();
    assert_eq!(query(&page, r#"li:has-text("bread")"#), [page.items[1]]);
    assert_eq!(query(&page, "li:has(.price)"), page.items);
    assert_eq!(query(&page, r#"li:text("Bread")"#), [page.items[1]]);
    assert_eq!(query(&page, r#"button:text-is("Cancel")"#), [page.cancel]);
    assert_eq!(query(&page, "li:is(.sale)"), [page.items[2]]);
    assert_eq!(query(&page, ":nth-match(li, 2)"), [page.items[1]]);
    assert_eq!(query(&page, "li:not(.sale)"), page.items[..2]);
}

#[test]
fn test_visibility() {
    let page = page();
    assert_eq!(query(&page, "div >> visible=false"), [page.hidden]);
    assert!(query(&page, "div:visible").is_empty());
    assert_eq!(query(&page, "button >> visible=true"), [page.save, page.cancel]);
}

#[test]
fn test_layout_orders_by_distance() {
    let page = page();
    assert_eq!(query(&page, "button:right-of(#email)"), [page.save, page.cancel]);
    assert_eq!(query(&page, r##"button >> right-of="#email""##), [page.save, page.cancel]);
    assert!(query(&page, "button:left-of(#email)").is_empty());
}

// ========== text ==========

#[test]
fn test_text_engine() {
    let page = page();
    assert_eq!(query(&page, "text=milk"), [page.items[0]]);
    assert_eq!(query(&page, r#"text="Save""#), [page.save]);
    assert!(query(&page, r#"text="save""#).is_empty());
    assert_eq!(query(&page, "text=/^St/"), [page.h1]);
}

#[test]
fn test_internal_text_flags() {
    let page = page();
    assert_eq!(query(&page, r#"internal:text="save"i"#), [page.save]);
    assert!(query(&page, r#"internal:text="save"s"#).is_empty());
    assert_eq!(query(&page, r#"internal:text="Save"s"#), [page.save]);
}

#[test]
fn test_has_text_filters() {
    let page = page();
    assert_eq!(query(&page, r#"li >> internal:has-text="bread"i"#), [page.items[1]]);
    assert_eq!(
        query(&page, r#"li >> internal:has-not-text="Eggs"i"#),
        page.items[..2]
    );
}

// ========== attributes, roles and labels ==========

#[test]
fn test_attribute_engines() {
    let page = page();
    assert_eq!(query(&page, "data-testid=save-btn"), [page.save]);
    assert_eq!(query(&page, "id=email"), [page.email]);
    assert_eq!(query(&page, r#"internal:testid=[data-testid="save-btn"s]"#), [page.save]);
    assert_eq!(query(&page, r#"internal:attr=[placeholder="YOU@"i]"#), [page.email]);
    assert!(query(&page, r#"internal:attr=[placeholder="YOU@"s]"#).is_empty());
    assert_eq!(query(&page, r"internal:attr=[placeholder=/example\.com$/]"), [page.email]);
}

#[test]
fn test_role_engine() {
    let page = page();
    assert_eq!(query(&page, "role=button"), [page.save, page.cancel]);
    assert_eq!(query(&page, r#"internal:role=button[name="sav"i]"#), [page.save]);
    assert!(query(&page, r#"internal:role=button[name="Sav"s]"#).is_empty());
    assert_eq!(query(&page, "internal:role=heading[level=1]"), [page.h1]);
    assert_eq!(query(&page, "internal:role=listitem").len(), 3);
}

#[test]
fn test_role_engine_rejects_unknown_attributes() {
    let page = page();
    let result =
        Selectors::default().query_all(&page.tree, "role=button[color=red]", NodeId::ROOT);
    assert!(matches!(result, Err(SelectorError::Engine(_))));
    let result = Selectors::default().query_all(&page.tree, "role=button[level=1]", NodeId::ROOT);
    assert!(matches!(result, Err(SelectorError::Engine(_))));
}

#[test]
fn test_label_engine() {
    let page = page();
    assert_eq!(query(&page, r#"internal:label="email"i"#), [page.email]);
}

// ========== composition ==========

#[test]
fn test_has_and_or_chain() {
    let page = page();
    assert_eq!(query(&page, r#"li >> internal:has=".price""#), page.items);
    assert!(query(&page, r#"li >> internal:has-not=".price""#).is_empty());
    assert_eq!(query(&page, r#"button >> internal:and="[data-testid]""#), [page.save]);
    assert_eq!(query(&page, r##"h1 >> internal:or="#email""##), [page.h1, page.email]);
    assert_eq!(query(&page, r#"body >> internal:chain="li.sale""#), [page.items[2]]);
}

#[test]
fn test_capture_returns_the_marked_part() {
    let page = page();
    assert_eq!(query(&page, "*css=li >> text=Eggs"), [page.items[2]]);
    assert_eq!(query(&page, "ul >> *css=li >> .price"), page.items);
}

#[test]
fn test_capture_with_nth_is_rejected() {
    let page = page();
    let result = Selectors::default().query_all(&page.tree, "*css=li >> nth=0", NodeId::ROOT);
    assert!(matches!(result, Err(SelectorError::InvalidSelector(_))));
}

#[test]
fn test_describe_and_frames() {
    let page = page();
    assert_eq!(query(&page, "h1 >> internal:describe=Title"), [page.h1]);
    assert!(query(&page, "ul >> internal:control=enter-frame >> li").is_empty());
}

#[test]
fn test_query_from_a_subtree() {
    let page = page();
    let selectors = Selectors::default();
    let found = selectors.query_all(&page.tree, ".price", page.items[1]).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(
        selectors.query(&page.tree, "span", page.list).unwrap(),
        Some(page.tree.element_children(page.items[0]).next().unwrap())
    );
}

// ========== registry ==========

/// `tag=li`: elements by local name.
struct TagEngine;

impl SelectorEngine for TagEngine {
    fn query_all(
        &self,
        cx: &QueryContext<'_>,
        root: NodeId,
        body: &SelectorBody,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let SelectorBody::Raw(tag) = body else {
            return Err(SelectorError::Engine("tag expects text".to_string()));
        };
        let tree = cx.tree();
        Ok(tree
            .descendant_elements(root)
            .into_iter()
            .filter(|&element| tree.local_name(element) == Some(tag.as_str()))
            .collect())
    }
}

#[test]
fn test_custom_engine() {
    let page = page();
    let mut selectors = Selectors::default();
    selectors.register("tag", Box::new(TagEngine)).unwrap();
    assert_eq!(
        selectors.query_all(&page.tree, "ul >> tag=li", NodeId::ROOT).unwrap(),
        page.items
    );
}

#[test]
fn test_register_validation() {
    let mut selectors = Selectors::default();
    assert!(selectors.register("css", Box::new(TagEngine)).is_err());
    assert!(selectors.register("bad name", Box::new(TagEngine)).is_err());
}

#[test]
fn test_unknown_engine() {
    let page = page();
    let result = Selectors::default().query_all(&page.tree, "div >> foo=bar", NodeId::ROOT);
    assert!(matches!(
        result,
        Err(SelectorError::UnknownEngine { name, .. }) if name == "foo"
    ));
}

// ========== strict mode ==========

#[test]
fn test_strict_mode_violation() {
    let page = page();
    let strict = Selectors::new(QuarryOptions {
        strict: true,
        ..QuarryOptions::default()
    });
    let Err(SelectorError::Ambiguous { message, count }) = strict.query(&page.tree, "button", NodeId::ROOT)
    else {
        panic!("expected a strict mode violation");
    };
    assert_eq!(count, 2);
    assert!(message.starts_with("strict mode violation: locator('button') resolved to 2 elements:"));
    assert!(message.contains("getByTestId('save-btn')"));
    assert!(message.contains("<button data-testid=\"save-btn\">Save</button>"));

    assert_eq!(strict.query(&page.tree, "button >> nth=1", NodeId::ROOT).unwrap(), Some(page.cancel));
    assert_eq!(
        Selectors::default().query(&page.tree, "button", NodeId::ROOT).unwrap(),
        Some(page.save)
    );
}
