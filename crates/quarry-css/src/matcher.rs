//! Compound selector matching.
//!
//! [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
//!
//! The selector parser leaves plain CSS inside each compound as source text
//! (`input.primary[type="submit" i]:first-child`). This module compiles such a
//! fragment into simple selectors and answers `Element.matches()` for it.
//! Combinators never appear in a fragment; the selector evaluator walks the
//! tree for those.

use quarry_dom::{DomTree, ElementData, NodeId, NodeType};

use crate::error::CssParseError;
use crate::tokenizer::{CSSToken, tokenize};

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// "A type selector is the name of a document language element type,
    /// and represents an instance of that element type in the document tree."
    Type(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    /// "The class selector is given as a full stop (. U+002E) immediately
    /// followed by an identifier."
    Class(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    /// "An ID selector is a hash (#, U+0023) immediately followed by the
    /// ID value, which is an identifier."
    Id(String),

    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    /// "The universal selector is a single asterisk (*) and represents the
    /// qualified name of any element type."
    Universal,

    /// User-action pseudo-classes and pseudo-elements. A static tree has no
    /// hover or focus state, so these never match.
    NeverMatch,

    /// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    PseudoClass(PseudoClass),

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    Attribute(AttributeSelector),
}

/// `An+B` microsyntax per [§ 6 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax).
///
/// "The An+B notation defines an integer step (A) and offset (B), and
/// represents the An+Bth elements in a list, for every positive integer or
/// zero value of n, with the first element in the list having index 1."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nth {
    /// Step.
    pub a: i64,
    /// Offset.
    pub b: i64,
}

impl Nth {
    /// Parse `odd`, `even`, `3`, `-n+3`, `2n + 1` and friends.
    #[must_use]
    pub fn parse(source: &str) -> Option<Self> {
        let compact: String = source
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "odd" => return Some(Self { a: 2, b: 1 }),
            "even" => return Some(Self { a: 2, b: 0 }),
            _ => {}
        }
        let Some((a, b)) = compact.split_once('n') else {
            return compact.parse().ok().map(|b| Self { a: 0, b });
        };
        let a = match a {
            "" | "+" => 1,
            "-" => -1,
            a => a.parse().ok()?,
        };
        let b = if b.is_empty() {
            0
        } else if b.starts_with(['+', '-']) {
            b.parse().ok()?
        } else {
            return None;
        };
        Some(Self { a, b })
    }

    /// Whether the 1-based `index` is one of the An+B positions.
    #[must_use]
    pub const fn matches(self, index: i64) -> bool {
        if self.a == 0 {
            return index == self.b;
        }
        let diff = index - self.b;
        diff % self.a == 0 && diff / self.a >= 0
    }
}

/// Pseudo-classes per [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    /// [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    /// "The :root pseudo-class represents an element that is the root of the document."
    Root,
    /// [§ 14.3.1 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
    /// "The :first-child pseudo-class represents an element that is first among its
    /// inclusive siblings."
    FirstChild,
    /// [§ 14.3.2 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
    LastChild,
    /// [§ 14.3.3 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
    /// "The :only-child pseudo-class represents an element that has no siblings."
    OnlyChild,
    /// [§ 14.4.1 :first-of-type](https://www.w3.org/TR/selectors-4/#the-first-of-type-pseudo)
    FirstOfType,
    /// [§ 14.4.2 :last-of-type](https://www.w3.org/TR/selectors-4/#the-last-of-type-pseudo)
    LastOfType,
    /// [§ 14.4.3 :only-of-type](https://www.w3.org/TR/selectors-4/#the-only-of-type-pseudo)
    OnlyOfType,
    /// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    /// "The :empty pseudo-class represents an element that has no children except,
    /// optionally, document white space characters."
    ///
    /// Browsers still ship the Level 3 rule, where any text counts as content;
    /// that is the rule used here.
    Empty,
    /// [§ 8.2 :link](https://www.w3.org/TR/selectors-4/#the-link-pseudo)
    /// In a static tree no link has been visited, so this is `:any-link`.
    Link,
    /// [§ 12.1.2 :disabled](https://www.w3.org/TR/selectors-4/#enableddisabled)
    Disabled,
    /// [§ 12.1.2 :enabled](https://www.w3.org/TR/selectors-4/#enableddisabled)
    Enabled,
    /// [§ 12.3.1 :checked](https://www.w3.org/TR/selectors-4/#checked)
    Checked,
    /// [§ 12.4.4 :required](https://www.w3.org/TR/selectors-4/#opt-pseudos)
    Required,
    /// [§ 12.4.4 :optional](https://www.w3.org/TR/selectors-4/#opt-pseudos)
    Optional,
    /// [§ 14.3.4 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
    NthChild(Nth),
    /// [§ 14.3.5 :nth-last-child()](https://www.w3.org/TR/selectors-4/#the-nth-last-child-pseudo)
    NthLastChild(Nth),
    /// [§ 14.4.4 :nth-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-of-type-pseudo)
    NthOfType(Nth),
    /// [§ 14.4.5 :nth-last-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-last-of-type-pseudo)
    NthLastOfType(Nth),
}

/// [§ 6.1 Attribute presence and value selectors](https://www.w3.org/TR/selectors-4/#attribute-representation)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOperator {
    /// `[att]` - "Represents an element with the att attribute, whatever the
    /// value of the attribute."
    Exists,
    /// `[att=val]` - "Represents an element with the att attribute whose value
    /// is exactly 'val'."
    Equals,
    /// `[att~=val]` - "...whose value is a whitespace-separated list of words,
    /// one of which is exactly 'val'."
    Includes,
    /// `[att|=val]` - "...its value either being exactly 'val' or beginning with
    /// 'val' immediately followed by '-'."
    DashMatch,
    /// `[att^=val]` - "...whose value begins with the prefix 'val'."
    PrefixMatch,
    /// `[att$=val]` - "...whose value ends with the suffix 'val'."
    SuffixMatch,
    /// `[att*=val]` - "...whose value contains at least one instance of the
    /// substring 'val'."
    SubstringMatch,
}

/// Attribute selectors per [§ 6.4](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Attribute name, lowercased.
    pub name: String,
    /// Comparison.
    pub operator: AttributeOperator,
    /// Value to compare against; empty for [`AttributeOperator::Exists`].
    pub value: String,
    /// [§ 6.3 Case-sensitivity](https://www.w3.org/TR/selectors-4/#attribute-case)
    /// "Adding the identifier i (or I) before the closing bracket (]) causes the
    /// value to be matched ASCII case-insensitively."
    pub case_insensitive: bool,
}

impl AttributeSelector {
    fn matches(&self, element: &ElementData) -> bool {
        let Some(actual) = element.attrs.get(&self.name) else {
            return false;
        };
        let (actual, expected) = if self.case_insensitive {
            (actual.to_ascii_lowercase(), self.value.to_ascii_lowercase())
        } else {
            (actual.to_string(), self.value.clone())
        };
        match self.operator {
            AttributeOperator::Exists => true,
            AttributeOperator::Equals => actual == expected,
            AttributeOperator::Includes => {
                !expected.is_empty() && actual.split_ascii_whitespace().any(|w| w == expected)
            }
            AttributeOperator::DashMatch => {
                actual == expected || actual.starts_with(&format!("{expected}-"))
            }
            // "If 'val' is the empty string then the selector does not represent anything."
            AttributeOperator::PrefixMatch => {
                !expected.is_empty() && actual.starts_with(&expected)
            }
            AttributeOperator::SuffixMatch => !expected.is_empty() && actual.ends_with(&expected),
            AttributeOperator::SubstringMatch => {
                !expected.is_empty() && actual.contains(&expected)
            }
        }
    }
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    /// The list of simple selectors that make up this compound selector.
    pub simple_selectors: Vec<SimpleSelector>,
}

impl CompoundSelector {
    /// Compile a compound selector fragment.
    ///
    /// # Errors
    ///
    /// Returns [`CssParseError::UnsupportedFragment`] for combinators, unknown
    /// pseudo-classes and malformed attribute selectors.
    pub fn parse(fragment: &str) -> Result<Self, CssParseError> {
        let fail = |reason: &str| CssParseError::UnsupportedFragment {
            fragment: fragment.to_string(),
            reason: reason.to_string(),
        };
        let tokens = tokenize(fragment).map_err(|source| CssParseError::Lex {
            source,
            selector: fragment.to_string(),
        })?;
        let mut stream = TokenStream {
            tokens: &tokens,
            pos: 0,
        };
        stream.skip_whitespace();

        let mut simple_selectors = Vec::new();
        loop {
            let token = stream.next();
            match token {
                CSSToken::EOF => break,
                CSSToken::Whitespace => {
                    stream.skip_whitespace();
                    if !stream.peek().is_eof() {
                        return Err(fail("combinators are not allowed in a compound selector"));
                    }
                }
                CSSToken::Ident(name) if simple_selectors.is_empty() => {
                    simple_selectors.push(SimpleSelector::Type(name.to_ascii_lowercase()));
                }
                CSSToken::Delim('*') if simple_selectors.is_empty() => {
                    simple_selectors.push(SimpleSelector::Universal);
                }
                CSSToken::Hash { value, .. } => {
                    simple_selectors.push(SimpleSelector::Id(value.clone()));
                }
                CSSToken::Delim('.') => match stream.next() {
                    CSSToken::Ident(class) => {
                        simple_selectors.push(SimpleSelector::Class(class.clone()));
                    }
                    _ => return Err(fail("expected a class name after '.'")),
                },
                CSSToken::LeftBracket => {
                    let attribute = parse_attribute(&mut stream)
                        .ok_or_else(|| fail("malformed attribute selector"))?;
                    simple_selectors.push(SimpleSelector::Attribute(attribute));
                }
                CSSToken::Colon => {
                    let simple = parse_pseudo(&mut stream).map_err(|reason| fail(&reason))?;
                    simple_selectors.push(simple);
                }
                other => {
                    return Err(fail(&format!("unexpected \"{}\"", other.to_source())));
                }
            }
        }

        if simple_selectors.is_empty() {
            return Err(fail("empty selector"));
        }
        Ok(Self { simple_selectors })
    }

    /// [§ 3.1 Structure and Terminology](https://www.w3.org/TR/selectors-4/#structure)
    /// "A selector is said to match an element when..."
    ///
    /// Non-element nodes never match.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node_id: NodeId) -> bool {
        let Some(element) = tree.as_element(node_id) else {
            return false;
        };
        self.simple_selectors.iter().all(|simple| match simple {
            SimpleSelector::Type(name) => element.tag_name.eq_ignore_ascii_case(name),
            SimpleSelector::Class(class_name) => element.classes().contains(&class_name.as_str()),
            SimpleSelector::Id(id) => element.id() == Some(id.as_str()),
            SimpleSelector::Universal => true,
            SimpleSelector::NeverMatch => false,
            SimpleSelector::Attribute(attr) => attr.matches(element),
            SimpleSelector::PseudoClass(pc) => pseudo_class_matches(pc, tree, node_id, element),
        })
    }
}

struct TokenStream<'a> {
    tokens: &'a [CSSToken],
    pos: usize,
}

static EOF_TOKEN: CSSToken = CSSToken::EOF;

impl<'a> TokenStream<'a> {
    fn peek(&self) -> &'a CSSToken {
        self.tokens.get(self.pos).unwrap_or(&EOF_TOKEN)
    }

    fn next(&mut self) -> &'a CSSToken {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_whitespace() {
            self.pos += 1;
        }
    }
}

/// `[` already consumed: `name (op value (i|s)?)? ]`.
fn parse_attribute(stream: &mut TokenStream<'_>) -> Option<AttributeSelector> {
    stream.skip_whitespace();
    let CSSToken::Ident(name) = stream.next() else {
        return None;
    };
    let name = name.to_ascii_lowercase();
    stream.skip_whitespace();
    let operator = match stream.next() {
        CSSToken::RightBracket => {
            return Some(AttributeSelector {
                name,
                operator: AttributeOperator::Exists,
                value: String::new(),
                case_insensitive: false,
            });
        }
        CSSToken::Delim('=') => AttributeOperator::Equals,
        CSSToken::IncludeMatch => AttributeOperator::Includes,
        CSSToken::DashMatch => AttributeOperator::DashMatch,
        CSSToken::PrefixMatch => AttributeOperator::PrefixMatch,
        CSSToken::SuffixMatch => AttributeOperator::SuffixMatch,
        CSSToken::SubstringMatch => AttributeOperator::SubstringMatch,
        _ => return None,
    };
    stream.skip_whitespace();
    let value = match stream.next() {
        CSSToken::String(value) | CSSToken::Ident(value) => value.clone(),
        CSSToken::Number { repr, .. } => repr.clone(),
        _ => return None,
    };
    stream.skip_whitespace();
    let mut case_insensitive = false;
    if let CSSToken::Ident(flag) = stream.peek() {
        match flag.as_str() {
            "i" | "I" => case_insensitive = true,
            "s" | "S" => {}
            _ => return None,
        }
        stream.pos += 1;
        stream.skip_whitespace();
    }
    match stream.next() {
        CSSToken::RightBracket => Some(AttributeSelector {
            name,
            operator,
            value,
            case_insensitive,
        }),
        _ => None,
    }
}

/// `:` already consumed.
fn parse_pseudo(stream: &mut TokenStream<'_>) -> Result<SimpleSelector, String> {
    match stream.next() {
        // [§ 3.6 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements)
        CSSToken::Colon => match stream.next() {
            CSSToken::Ident(_) => Ok(SimpleSelector::NeverMatch),
            _ => Err("expected a pseudo-element name".to_string()),
        },
        CSSToken::Ident(name) => {
            let pseudo = match name.to_ascii_lowercase().as_str() {
                "root" => PseudoClass::Root,
                "first-child" => PseudoClass::FirstChild,
                "last-child" => PseudoClass::LastChild,
                "only-child" => PseudoClass::OnlyChild,
                "first-of-type" => PseudoClass::FirstOfType,
                "last-of-type" => PseudoClass::LastOfType,
                "only-of-type" => PseudoClass::OnlyOfType,
                "empty" => PseudoClass::Empty,
                "link" | "any-link" => PseudoClass::Link,
                "disabled" => PseudoClass::Disabled,
                "enabled" => PseudoClass::Enabled,
                "checked" => PseudoClass::Checked,
                "required" => PseudoClass::Required,
                "optional" => PseudoClass::Optional,
                // User-action and history states, plus CSS2 pseudo-elements.
                "hover" | "active" | "focus" | "focus-visible" | "focus-within" | "visited"
                | "target" | "before" | "after" | "first-line" | "first-letter" => {
                    return Ok(SimpleSelector::NeverMatch);
                }
                other => return Err(format!("unsupported pseudo-class \":{other}\"")),
            };
            Ok(SimpleSelector::PseudoClass(pseudo))
        }
        CSSToken::Function(name) => {
            let name = name.to_ascii_lowercase();
            let mut source = String::new();
            loop {
                match stream.next() {
                    CSSToken::RightParen => break,
                    CSSToken::EOF => return Err(format!("unterminated \":{name}(\"")),
                    token => source.push_str(&token.to_source()),
                }
            }
            let nth = Nth::parse(&source)
                .ok_or_else(|| format!("invalid An+B expression \"{source}\" in \":{name}()\""))?;
            let pseudo = match name.as_str() {
                "nth-child" => PseudoClass::NthChild(nth),
                "nth-last-child" => PseudoClass::NthLastChild(nth),
                "nth-of-type" => PseudoClass::NthOfType(nth),
                "nth-last-of-type" => PseudoClass::NthLastOfType(nth),
                other => return Err(format!("unsupported pseudo-class \":{other}()\"")),
            };
            Ok(SimpleSelector::PseudoClass(pseudo))
        }
        _ => Err("expected a pseudo-class name".to_string()),
    }
}

/// 1-based position of `node_id` among the element siblings accepted by
/// `same_kind`, counted from the start or, when `from_end`, from the end.
#[allow(clippy::cast_possible_wrap)]
fn sibling_index(
    tree: &DomTree,
    node_id: NodeId,
    from_end: bool,
    same_kind: impl Fn(NodeId) -> bool,
) -> Option<i64> {
    let parent = tree.parent(node_id)?;
    let siblings: Vec<NodeId> = tree
        .element_children(parent)
        .filter(|&c| same_kind(c))
        .collect();
    let position = if from_end {
        siblings.iter().rev().position(|&c| c == node_id)?
    } else {
        siblings.iter().position(|&c| c == node_id)?
    };
    Some(position as i64 + 1)
}

/// Elements that `:enabled` and `:disabled` apply to.
const FORM_CONTROLS: &[&str] = &[
    "button", "input", "select", "textarea", "optgroup", "option", "fieldset",
];

/// [§ 4.10.18.5 Enabling and disabling form controls](https://html.spec.whatwg.org/multipage/form-control-infrastructure.html#concept-fe-disabled)
///
/// "A form control is disabled if any of the following are true: the element
/// is a button, input, select, textarea, or form-associated custom element,
/// and the disabled attribute is specified on this element...; the element is
/// a descendant of a fieldset element whose disabled attribute is specified,
/// and is not a descendant of that fieldset element's first legend element
/// child, if any."
fn is_actually_disabled(tree: &DomTree, node_id: NodeId, element: &ElementData) -> bool {
    let tag = element.local_name();
    if !FORM_CONTROLS.contains(&tag) {
        return false;
    }
    if element.attrs.contains_key("disabled") {
        return true;
    }
    if tag == "option" {
        return tree
            .parent_element(node_id)
            .is_some_and(|p| tree.has_tag(p, "optgroup") && tree.has_attr(p, "disabled"));
    }
    let mut child = node_id;
    for ancestor in tree.ancestors(node_id) {
        if tree.has_tag(ancestor, "fieldset") && tree.has_attr(ancestor, "disabled") {
            let first_legend = tree
                .element_children(ancestor)
                .find(|&c| tree.has_tag(c, "legend"));
            if first_legend != Some(child) {
                return true;
            }
        }
        child = ancestor;
    }
    false
}

/// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
///
/// Match a pseudo-class against an element with full DOM tree context.
fn pseudo_class_matches(
    pc: &PseudoClass,
    tree: &DomTree,
    node_id: NodeId,
    element: &ElementData,
) -> bool {
    let any = |_: NodeId| true;
    let same_type = |c: NodeId| tree.local_name(c) == Some(element.local_name());
    match pc {
        PseudoClass::Root => tree.document_element() == Some(node_id),
        PseudoClass::FirstChild => sibling_index(tree, node_id, false, any) == Some(1),
        PseudoClass::LastChild => sibling_index(tree, node_id, true, any) == Some(1),
        PseudoClass::OnlyChild => {
            sibling_index(tree, node_id, false, any) == Some(1)
                && sibling_index(tree, node_id, true, any) == Some(1)
        }
        PseudoClass::FirstOfType => sibling_index(tree, node_id, false, same_type) == Some(1),
        PseudoClass::LastOfType => sibling_index(tree, node_id, true, same_type) == Some(1),
        PseudoClass::OnlyOfType => {
            sibling_index(tree, node_id, false, same_type) == Some(1)
                && sibling_index(tree, node_id, true, same_type) == Some(1)
        }
        PseudoClass::NthChild(nth) => {
            sibling_index(tree, node_id, false, any).is_some_and(|i| nth.matches(i))
        }
        PseudoClass::NthLastChild(nth) => {
            sibling_index(tree, node_id, true, any).is_some_and(|i| nth.matches(i))
        }
        PseudoClass::NthOfType(nth) => {
            sibling_index(tree, node_id, false, same_type).is_some_and(|i| nth.matches(i))
        }
        PseudoClass::NthLastOfType(nth) => {
            sibling_index(tree, node_id, true, same_type).is_some_and(|i| nth.matches(i))
        }
        PseudoClass::Empty => tree.children(node_id).iter().all(|&c| {
            match tree.get(c).map(|n| &n.node_type) {
                Some(NodeType::Text(t)) => t.is_empty(),
                Some(NodeType::Comment(_)) => true,
                _ => false,
            }
        }),
        // [§ 4.6.1 Links](https://html.spec.whatwg.org/multipage/links.html#links-created-by-a-and-area-elements)
        PseudoClass::Link => {
            matches!(element.local_name(), "a" | "area") && element.attrs.contains_key("href")
        }
        PseudoClass::Disabled => is_actually_disabled(tree, node_id, element),
        PseudoClass::Enabled => {
            FORM_CONTROLS.contains(&element.local_name())
                && !is_actually_disabled(tree, node_id, element)
        }
        // [§ 4.16.3 Pseudo-classes](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-checked)
        // "input elements whose type attribute is in the Checkbox state and whose
        // checkedness state is true; input elements whose type attribute is in the
        // Radio Button state and whose checkedness state is true; option elements
        // whose selectedness is true"
        PseudoClass::Checked => match element.local_name() {
            "input" => {
                let kind = element.attrs.get("type").unwrap_or("").to_ascii_lowercase();
                (kind == "checkbox" || kind == "radio") && element.attrs.contains_key("checked")
            }
            "option" => element.attrs.contains_key("selected"),
            _ => false,
        },
        PseudoClass::Required | PseudoClass::Optional => {
            if !matches!(element.local_name(), "input" | "select" | "textarea") {
                return false;
            }
            let required = element.attrs.contains_key("required");
            (*pc == PseudoClass::Required) == required
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nth_parse() {
        assert_eq!(Nth::parse("odd"), Some(Nth { a: 2, b: 1 }));
        assert_eq!(Nth::parse("even"), Some(Nth { a: 2, b: 0 }));
        assert_eq!(Nth::parse("3"), Some(Nth { a: 0, b: 3 }));
        assert_eq!(Nth::parse("-n+3"), Some(Nth { a: -1, b: 3 }));
        assert_eq!(Nth::parse("2n - 1"), Some(Nth { a: 2, b: -1 }));
        assert_eq!(Nth::parse("n"), Some(Nth { a: 1, b: 0 }));
        assert_eq!(Nth::parse("2x"), None);
    }

    #[test]
    fn test_nth_matches() {
        let odd = Nth { a: 2, b: 1 };
        assert!(odd.matches(1));
        assert!(!odd.matches(2));
        assert!(odd.matches(3));
        let first_three = Nth { a: -1, b: 3 };
        assert!(first_three.matches(1));
        assert!(first_three.matches(3));
        assert!(!first_three.matches(4));
    }
}
