//! Proximity scoring for the `left-of`, `right-of`, `above`, `below` and
//! `near` selectors.
//!
//! Scores are distances in CSS pixels between bounding boxes, plus a penalty
//! for misalignment on the other axis. Lower is closer. An element whose box
//! was never recorded has no score.

use quarry_dom::{DomTree, NodeId, Rect};
use strum_macros::{Display, EnumString};

/// `near` without an explicit distance.
pub const DEFAULT_NEAR_DISTANCE: f64 = 50.0;

/// The proximity relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum LayoutSelectorName {
    /// The element is left of an inner match.
    LeftOf,
    /// The element is right of an inner match.
    RightOf,
    /// The element is above an inner match.
    Above,
    /// The element is below an inner match.
    Below,
    /// The element is within a distance of an inner match.
    Near,
}

impl LayoutSelectorName {
    /// All five, in the order the selector language lists them.
    pub const ALL: [Self; 5] = [Self::LeftOf, Self::RightOf, Self::Above, Self::Below, Self::Near];

    /// Parse a bare name such as `right-of`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    fn score(self, element: &Rect, other: &Rect, max_distance: Option<f64>) -> Option<f64> {
        match self {
            Self::RightOf => directional(
                element.left() - other.right(),
                (other.bottom() - element.bottom()).max(0.0) + (element.top() - other.top()).max(0.0),
                max_distance,
            ),
            Self::LeftOf => directional(
                other.left() - element.right(),
                (other.bottom() - element.bottom()).max(0.0) + (element.top() - other.top()).max(0.0),
                max_distance,
            ),
            Self::Above => directional(
                other.top() - element.bottom(),
                (element.left() - other.left()).max(0.0) + (other.right() - element.right()).max(0.0),
                max_distance,
            ),
            Self::Below => directional(
                element.top() - other.bottom(),
                (element.left() - other.left()).max(0.0) + (other.right() - element.right()).max(0.0),
                max_distance,
            ),
            Self::Near => near(element, other, max_distance),
        }
    }
}

fn directional(distance: f64, misalignment: f64, max_distance: Option<f64>) -> Option<f64> {
    if distance < 0.0 || max_distance.is_some_and(|max| distance > max) {
        return None;
    }
    Some(distance + misalignment)
}

fn near(element: &Rect, other: &Rect, max_distance: Option<f64>) -> Option<f64> {
    let threshold = max_distance.unwrap_or(DEFAULT_NEAR_DISTANCE);
    let gaps = [
        element.left() - other.right(),
        other.left() - element.right(),
        other.top() - element.bottom(),
        element.top() - other.bottom(),
    ];
    let score: f64 = gaps.iter().filter(|&&gap| gap >= 0.0).sum();
    (score <= threshold).then_some(score)
}

/// The best (smallest) score of `element` against any of `inner` other than
/// itself, or `None` when no inner element qualifies.
#[must_use]
pub fn layout_selector_score(
    name: LayoutSelectorName,
    tree: &DomTree,
    element: NodeId,
    inner: &[NodeId],
    max_distance: Option<f64>,
) -> Option<f64> {
    let element_box = tree.bounding_box(element)?;
    inner
        .iter()
        .filter(|&&other| other != element)
        .filter_map(|&other| tree.bounding_box(other))
        .filter_map(|other_box| name.score(&element_box, &other_box, max_distance))
        .min_by(f64::total_cmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for name in LayoutSelectorName::ALL {
            assert_eq!(LayoutSelectorName::from_name(&name.to_string()), Some(name));
        }
        assert_eq!(LayoutSelectorName::from_name("right-of"), Some(LayoutSelectorName::RightOf));
        assert_eq!(LayoutSelectorName::from_name("beside"), None);
    }

    #[test]
    fn test_right_of_adds_vertical_misalignment() {
        let anchor = Rect::new(0.0, 0.0, 10.0, 10.0);
        let element = Rect::new(30.0, 5.0, 10.0, 10.0);
        let score = LayoutSelectorName::RightOf.score(&element, &anchor, None);
        // 20px gap plus 5px top offset.
        assert!(score.is_some_and(|s| (s - 25.0).abs() < f64::EPSILON));
        assert!(LayoutSelectorName::LeftOf.score(&element, &anchor, None).is_none());
        assert!(LayoutSelectorName::RightOf.score(&element, &anchor, Some(10.0)).is_none());
    }

    #[test]
    fn test_near_threshold() {
        let anchor = Rect::new(0.0, 0.0, 10.0, 10.0);
        let close = Rect::new(40.0, 0.0, 10.0, 10.0);
        let far = Rect::new(100.0, 0.0, 10.0, 10.0);
        assert!(LayoutSelectorName::Near.score(&close, &anchor, None).is_some());
        assert!(LayoutSelectorName::Near.score(&far, &anchor, None).is_none());
        assert!(LayoutSelectorName::Near.score(&far, &anchor, Some(100.0)).is_some());
    }
}
