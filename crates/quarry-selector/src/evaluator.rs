//! Evaluation of parsed CSS selector lists, including the custom
//! pseudo-classes (`:has()`, `:text()`, `:nth-match()`, `:right-of()`, ...).
//!
//! Complex selectors are matched right to left. The rightmost compound is
//! queried (or tested) first, then [`CssEvaluator::matches_parents`] walks
//! back through the combinators looking for ancestors and siblings that
//! satisfy the remaining compounds.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

use quarry_css::{
    ClauseCombinator, CompoundSelector, CssComplexSelector, CssFunction, CssFunctionArgument,
    CssSimpleSelector,
};
use quarry_dom::{DomTree, NodeId, style};

use crate::error::SelectorError;
use crate::layout::{LayoutSelectorName, layout_selector_score};
use crate::pattern::JsRegex;
use crate::text::{
    TextCache, TextMatch, TextMatcher, element_matches_text, should_skip_for_text_matching,
};

/// Where a query starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalScope {
    /// The node whose descendants are searched. `:scope` and the combinators
    /// never step past it.
    pub scope: NodeId,
    /// The scope the caller asked for, when `scope` was widened to let
    /// `:scope` match it.
    pub original_scope: Option<NodeId>,
}

impl EvalScope {
    /// A query rooted at `scope`.
    #[must_use]
    pub const fn new(scope: NodeId) -> Self {
        Self {
            scope,
            original_scope: None,
        }
    }
}

/// Evaluates CSS selector lists against one tree.
///
/// Holds per-evaluation caches, so create one per top-level query.
#[derive(Debug)]
pub struct CssEvaluator<'a> {
    tree: &'a DomTree,
    text_cache: &'a TextCache,
    compiled: RefCell<HashMap<String, Rc<CompoundSelector>>>,
    scores: RefCell<Option<HashMap<NodeId, f64>>>,
}

impl<'a> CssEvaluator<'a> {
    /// Create an evaluator that shares `text_cache` with the text engines.
    #[must_use]
    pub fn new(tree: &'a DomTree, text_cache: &'a TextCache) -> Self {
        Self {
            tree,
            text_cache,
            compiled: RefCell::new(HashMap::new()),
            scores: RefCell::new(None),
        }
    }

    /// All elements under `scope` matching any selector of `list`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError`] for malformed CSS fragments and custom
    /// functions with the wrong arguments.
    pub fn query(
        &self,
        scope: NodeId,
        list: &[CssComplexSelector],
    ) -> Result<Vec<NodeId>, SelectorError> {
        let selectors: Vec<&CssComplexSelector> = list.iter().collect();
        self.query_list(EvalScope::new(scope), &selectors)
    }

    /// Whether `element` matches any selector of `list`, relative to `scope`.
    ///
    /// # Errors
    ///
    /// Same as [`CssEvaluator::query`].
    pub fn matches(
        &self,
        element: NodeId,
        list: &[CssComplexSelector],
        scope: NodeId,
    ) -> Result<bool, SelectorError> {
        let selectors: Vec<&CssComplexSelector> = list.iter().collect();
        self.matches_list(element, &selectors, EvalScope::new(scope))
    }

    fn tree(&self) -> &'a DomTree {
        self.tree
    }

    // ========== selector lists ==========

    fn query_list(
        &self,
        cx: EvalScope,
        list: &[&CssComplexSelector],
    ) -> Result<Vec<NodeId>, SelectorError> {
        if list.is_empty() {
            return Err(SelectorError::Engine(
                "\"is\" engine expects non-empty selector list".to_string(),
            ));
        }
        let mut elements = Vec::new();
        for complex in list {
            elements.extend(self.query_complex(cx, complex)?);
        }
        if list.len() > 1 {
            self.tree().sort_in_document_order(&mut elements);
        }
        Ok(elements)
    }

    fn matches_list(
        &self,
        element: NodeId,
        list: &[&CssComplexSelector],
        cx: EvalScope,
    ) -> Result<bool, SelectorError> {
        if list.is_empty() {
            return Err(SelectorError::Engine(
                "\"is\" engine expects non-empty selector list".to_string(),
            ));
        }
        for complex in list {
            if self.matches_complex(element, complex, cx)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // ========== complex selectors ==========

    fn query_complex(
        &self,
        cx: EvalScope,
        complex: &CssComplexSelector,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let cx = self.expand_context_for_scope_matching(cx, complex);
        let previous = self.scores.replace(Some(HashMap::new()));
        let result = self.query_complex_unsorted(cx, complex);
        let scores = self.scores.replace(previous);
        let mut elements = result?;
        if let Some(scores) = scores.filter(|scores| !scores.is_empty()) {
            elements.sort_by(|a, b| compare_scores(scores.get(a), scores.get(b)));
        }
        Ok(elements)
    }

    fn query_complex_unsorted(
        &self,
        cx: EvalScope,
        complex: &CssComplexSelector,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let Some(last) = complex.simples.last() else {
            return Ok(Vec::new());
        };
        let candidates = self.query_simple(cx, &last.selector)?;
        let mut elements = Vec::with_capacity(candidates.len());
        for element in candidates {
            if self.matches_parents(element, complex, complex.simples.len().checked_sub(2), cx)? {
                elements.push(element);
            }
        }
        Ok(elements)
    }

    fn matches_complex(
        &self,
        element: NodeId,
        complex: &CssComplexSelector,
        cx: EvalScope,
    ) -> Result<bool, SelectorError> {
        let cx = self.expand_context_for_scope_matching(cx, complex);
        let Some(last) = complex.simples.last() else {
            return Ok(false);
        };
        if !self.matches_simple(element, &last.selector, cx)? {
            return Ok(false);
        }
        self.matches_parents(element, complex, complex.simples.len().checked_sub(2), cx)
    }

    /// `:scope` cannot match the node being searched, so a selector that
    /// mentions it widens the search to the scope's parent element.
    fn expand_context_for_scope_matching(
        &self,
        cx: EvalScope,
        complex: &CssComplexSelector,
    ) -> EvalScope {
        if complex.simples.len() != 1 {
            return cx;
        }
        let uses_scope = complex.simples[0]
            .selector
            .functions
            .iter()
            .any(|f| f.name == "scope");
        if !uses_scope || !self.tree().is_element(cx.scope) {
            return cx;
        }
        match self.tree().parent_element(cx.scope) {
            Some(parent) => EvalScope {
                scope: parent,
                original_scope: Some(cx.original_scope.unwrap_or(cx.scope)),
            },
            None => cx,
        }
    }

    fn matches_parents(
        &self,
        element: NodeId,
        complex: &CssComplexSelector,
        index: Option<usize>,
        cx: EvalScope,
    ) -> Result<bool, SelectorError> {
        let Some(position) = index else {
            return Ok(true);
        };
        let part = &complex.simples[position];
        match part.combinator {
            ClauseCombinator::Child => {
                let Some(parent) = self.parent_in_context(element, cx) else {
                    return Ok(false);
                };
                if !self.matches_simple(parent, &part.selector, cx)? {
                    return Ok(false);
                }
                self.matches_parents(parent, complex, position.checked_sub(1), cx)
            }
            ClauseCombinator::NextSibling => {
                let Some(previous) = self.previous_sibling_in_context(element, cx) else {
                    return Ok(false);
                };
                if !self.matches_simple(previous, &part.selector, cx)? {
                    return Ok(false);
                }
                self.matches_parents(previous, complex, position.checked_sub(1), cx)
            }
            ClauseCombinator::Descendant => {
                let mut ancestor = self.parent_in_context(element, cx);
                while let Some(current) = ancestor {
                    if self.matches_simple(current, &part.selector, cx)? {
                        if self.matches_parents(current, complex, position.checked_sub(1), cx)? {
                            return Ok(true);
                        }
                        if position > 0
                            && complex.simples[position - 1].combinator
                                == ClauseCombinator::Descendant
                        {
                            break;
                        }
                    }
                    ancestor = self.parent_in_context(current, cx);
                }
                Ok(false)
            }
            ClauseCombinator::SubsequentSibling => {
                let mut sibling = self.previous_sibling_in_context(element, cx);
                while let Some(current) = sibling {
                    if self.matches_simple(current, &part.selector, cx)? {
                        if self.matches_parents(current, complex, position.checked_sub(1), cx)? {
                            return Ok(true);
                        }
                        if position > 0
                            && complex.simples[position - 1].combinator
                                == ClauseCombinator::SubsequentSibling
                        {
                            break;
                        }
                    }
                    sibling = self.previous_sibling_in_context(current, cx);
                }
                Ok(false)
            }
        }
    }

    fn parent_in_context(&self, element: NodeId, cx: EvalScope) -> Option<NodeId> {
        if element == cx.scope {
            return None;
        }
        self.tree().parent_element(element)
    }

    fn previous_sibling_in_context(&self, element: NodeId, cx: EvalScope) -> Option<NodeId> {
        if element == cx.scope {
            return None;
        }
        self.tree().prev_element_sibling(element)
    }

    // ========== compound selectors ==========

    fn matches_simple(
        &self,
        element: NodeId,
        simple: &CssSimpleSelector,
        cx: EvalScope,
    ) -> Result<bool, SelectorError> {
        if element == cx.scope {
            return Ok(false);
        }
        if let Some(css) = &simple.css
            && !self.matches_css(element, css)?
        {
            return Ok(false);
        }
        for function in &simple.functions {
            if !self.matches_function(element, function, cx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn query_simple(
        &self,
        cx: EvalScope,
        simple: &CssSimpleSelector,
    ) -> Result<Vec<NodeId>, SelectorError> {
        if simple.functions.is_empty() {
            return self.query_css(cx, simple.css.as_deref().unwrap_or("*"));
        }

        let css = simple.css.as_deref().filter(|&css| css != "*");
        let (mut elements, first_index) = if let Some(css) = css {
            (self.query_css(cx, css)?, None)
        } else {
            let index = simple
                .functions
                .iter()
                .position(|f| has_query(&f.name))
                .unwrap_or(0);
            (self.query_function(&simple.functions[index], cx)?, Some(index))
        };

        // Filter by functions that can test a single element first, then by
        // the ones that need a full query.
        let (matchers, queriers): (Vec<_>, Vec<_>) = simple
            .functions
            .iter()
            .enumerate()
            .filter(|&(index, _)| Some(index) != first_index)
            .map(|(_, f)| f)
            .partition(|f| has_matches(&f.name));
        for function in matchers.into_iter().chain(queriers) {
            let mut kept = Vec::with_capacity(elements.len());
            for element in elements {
                if self.matches_function(element, function, cx)? {
                    kept.push(element);
                }
            }
            elements = kept;
        }
        Ok(elements)
    }

    fn query_css(&self, cx: EvalScope, css: &str) -> Result<Vec<NodeId>, SelectorError> {
        let tree = self.tree();
        if css == "*" {
            return Ok(tree.descendant_elements(cx.scope));
        }
        let compound = self.compile(css)?;
        Ok(tree
            .descendant_elements(cx.scope)
            .into_iter()
            .filter(|&element| compound.matches(tree, element))
            .collect())
    }

    fn matches_css(&self, element: NodeId, css: &str) -> Result<bool, SelectorError> {
        if css == "*" {
            return Ok(self.tree().is_element(element));
        }
        Ok(self.compile(css)?.matches(self.tree(), element))
    }

    fn compile(&self, css: &str) -> Result<Rc<CompoundSelector>, SelectorError> {
        if let Some(compound) = self.compiled.borrow().get(css) {
            return Ok(Rc::clone(compound));
        }
        let compound = Rc::new(CompoundSelector::parse(css)?);
        let _ = self
            .compiled
            .borrow_mut()
            .insert(css.to_string(), Rc::clone(&compound));
        Ok(compound)
    }

    fn mark_score(&self, element: NodeId, score: f64) {
        if let Some(scores) = self.scores.borrow_mut().as_mut() {
            let _ = scores.insert(element, score);
        }
    }

    // ========== custom functions ==========

    fn matches_function(
        &self,
        element: NodeId,
        function: &CssFunction,
        cx: EvalScope,
    ) -> Result<bool, SelectorError> {
        let tree = self.tree();
        let name = function.name.as_str();
        let args = function.args.as_slice();
        match name {
            "is" | "where" => self.matches_list(element, &selector_args(name, args)?, cx),
            "not" => Ok(!self.matches_list(element, &selector_args(name, args)?, cx)?),
            "light" => self.matches_list(element, &selector_args(name, args)?, cx),
            "has" => {
                let list = selector_args(name, args)?;
                Ok(!self.query_list(EvalScope::new(element), &list)?.is_empty())
            }
            "scope" => {
                if !args.is_empty() {
                    return Err(SelectorError::Engine(
                        "\"scope\" engine expects no arguments".to_string(),
                    ));
                }
                Ok(self.actual_scope(cx) == Some(element))
            }
            "visible" => {
                if !args.is_empty() {
                    return Err(SelectorError::Engine(
                        "\"visible\" engine expects no arguments".to_string(),
                    ));
                }
                Ok(style::is_element_visible(tree, element))
            }
            "text" => {
                let matcher = TextMatcher::lax(single_string(name, args)?);
                Ok(self.element_matches(element, &matcher) == TextMatch::SelfMatch)
            }
            "text-is" => {
                let matcher = TextMatcher::strict_immediate(single_string(name, args)?);
                Ok(self.element_matches(element, &matcher) != TextMatch::None)
            }
            "text-matches" => {
                let matcher = TextMatcher::regex(regex_args(args)?);
                Ok(self.element_matches(element, &matcher) == TextMatch::SelfMatch)
            }
            "has-text" => {
                let matcher = TextMatcher::lax(single_string(name, args)?);
                if should_skip_for_text_matching(tree, element) {
                    return Ok(false);
                }
                Ok(matcher.matches(&self.text_cache.element_text(tree, element)))
            }
            _ => {
                if let Some(layout) = LayoutSelectorName::from_name(name) {
                    return self.matches_layout(layout, element, args, cx);
                }
                // Query-only functions test membership in their own result.
                Ok(self.query_function(function, cx)?.contains(&element))
            }
        }
    }

    fn query_function(
        &self,
        function: &CssFunction,
        cx: EvalScope,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let name = function.name.as_str();
        let args = function.args.as_slice();
        match name {
            "is" | "where" | "light" => self.query_list(cx, &selector_args(name, args)?),
            "scope" => {
                if !args.is_empty() {
                    return Err(SelectorError::Engine(
                        "\"scope\" engine expects no arguments".to_string(),
                    ));
                }
                Ok(self.actual_scope(cx).into_iter().collect())
            }
            "nth-match" => self.query_nth_match(args, cx),
            _ => {
                let mut elements = Vec::new();
                for element in self.query_css(cx, "*")? {
                    if self.matches_function(element, function, cx)? {
                        elements.push(element);
                    }
                }
                Ok(elements)
            }
        }
    }

    /// The element `:scope` stands for: the original scope, or the document
    /// element when querying from the document.
    fn actual_scope(&self, cx: EvalScope) -> Option<NodeId> {
        let scope = cx.original_scope.unwrap_or(cx.scope);
        if self.tree().is_element(scope) {
            Some(scope)
        } else {
            self.tree().document_element()
        }
    }

    fn element_matches(&self, element: NodeId, matcher: &TextMatcher) -> TextMatch {
        element_matches_text(self.text_cache, self.tree(), element, |text| {
            matcher.matches(text)
        })
    }

    fn matches_layout(
        &self,
        layout: LayoutSelectorName,
        element: NodeId,
        args: &[CssFunctionArgument],
        cx: EvalScope,
    ) -> Result<bool, SelectorError> {
        let (max_distance, query_args) = match args.split_last() {
            Some((CssFunctionArgument::Number(distance), rest)) => (Some(*distance), rest),
            _ => (None, args),
        };
        if query_args.is_empty() {
            return Err(SelectorError::Engine(format!(
                "\"{layout}\" engine expects a selector list and optional maximum distance in pixels"
            )));
        }
        let list = selector_args(&layout.to_string(), query_args)?;
        let inner = self.query_list(cx, &list)?;
        let score = layout_selector_score(layout, self.tree(), element, &inner, max_distance);
        let Some(score) = score else {
            return Ok(false);
        };
        self.mark_score(element, score);
        Ok(true)
    }

    fn query_nth_match(
        &self,
        args: &[CssFunctionArgument],
        cx: EvalScope,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let error = || {
            SelectorError::Engine(
                "\"nth-match\" engine expects a one-based index as the last argument".to_string(),
            )
        };
        let Some((CssFunctionArgument::Number(index), rest)) = args.split_last() else {
            return Err(error());
        };
        if rest.is_empty() || *index < 1.0 {
            return Err(error());
        }
        let list = selector_args("nth-match", rest)?;
        let elements = self.query_list(cx, &list)?;
        if index.fract() != 0.0 {
            return Ok(Vec::new());
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let position = *index as usize;
        Ok(elements.get(position - 1).copied().into_iter().collect())
    }
}

/// Functions that can produce candidates on their own.
fn has_query(name: &str) -> bool {
    matches!(name, "is" | "where" | "light" | "scope" | "nth-match")
}

/// Functions that can test a single element.
fn has_matches(name: &str) -> bool {
    name != "nth-match"
}

/// Scored elements first, by score; unscored ones keep their order at the end.
fn compare_scores(a: Option<&f64>, b: Option<&f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn selector_args<'s>(
    name: &str,
    args: &'s [CssFunctionArgument],
) -> Result<Vec<&'s CssComplexSelector>, SelectorError> {
    args.iter()
        .map(|arg| match arg {
            CssFunctionArgument::Selector(complex) => Ok(complex),
            CssFunctionArgument::String(_) | CssFunctionArgument::Number(_) => Err(
                SelectorError::Engine(format!("\"{name}\" engine expects a selector list")),
            ),
        })
        .collect()
}

fn single_string<'s>(name: &str, args: &'s [CssFunctionArgument]) -> Result<&'s str, SelectorError> {
    match args {
        [CssFunctionArgument::String(text)] => Ok(text),
        _ => Err(SelectorError::Engine(format!(
            "\"{name}\" engine expects a single string"
        ))),
    }
}

fn regex_args(args: &[CssFunctionArgument]) -> Result<JsRegex, SelectorError> {
    let error = || {
        SelectorError::Engine(
            "\"text-matches\" engine expects a regexp body and optional regexp flags".to_string(),
        )
    };
    let (source, flags) = match args {
        [CssFunctionArgument::String(source)] => (source.as_str(), ""),
        [
            CssFunctionArgument::String(source),
            CssFunctionArgument::String(flags),
        ] => (source.as_str(), flags.as_str()),
        _ => return Err(error()),
    };
    JsRegex::new(source, flags).map_err(|e| {
        SelectorError::Engine(format!("Invalid regular expression /{source}/{flags}: {e}"))
    })
}
