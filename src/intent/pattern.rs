//! Deterministic intent extraction with an ordered list of regex patterns.
//!
//! Input is compacted first (every whitespace and control character removed),
//! then the patterns are tried in priority order.  The first pattern that
//! yields non-empty captures wins; later patterns are never consulted even if
//! they would match "better".

use std::sync::LazyLock;

use regex::Regex;

use crate::intent::{NavigationIntent, CONFIDENCE_DESTINATION_ONLY, CONFIDENCE_FULL_ROUTE};

/// Placeholders that name no place at all.
const DEICTIC_WORDS: &[&str] = &["这里", "那里", "这", "那", "哪里"];

const MIN_LOCATION_CHARS: usize = 2;
const MAX_LOCATION_CHARS: usize = 100;

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum PatternShape {
    /// Captures `(start, end)`.
    StartAndEnd,
    /// Captures `(end)`; the start is the caller's current location.
    DestinationOnly,
}

struct IntentPattern {
    regex: Regex,
    shape: PatternShape,
}

impl IntentPattern {
    fn new(pattern: &str, shape: PatternShape) -> Self {
        Self {
            // Patterns are compile-time constants covered by the tests below.
            regex: Regex::new(pattern).expect("intent pattern must compile"),
            shape,
        }
    }

    fn apply(&self, text: &str) -> Option<NavigationIntent> {
        let caps = self.regex.captures(text)?;
        let group = |i: usize| {
            caps.get(i)
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
        };

        match self.shape {
            PatternShape::StartAndEnd => {
                let start = group(1)?;
                let end = group(2)?;
                Some(NavigationIntent {
                    start: Some(start),
                    end: Some(end),
                    confidence: CONFIDENCE_FULL_ROUTE,
                })
            }
            PatternShape::DestinationOnly => {
                let end = group(1)?;
                Some(NavigationIntent {
                    start: None,
                    end: Some(end),
                    confidence: CONFIDENCE_DESTINATION_ONLY,
                })
            }
        }
    }
}

/// Priority order matters: see the module docs.
static PATTERNS: LazyLock<Vec<IntentPattern>> = LazyLock::new(|| {
    vec![
        // 从A到B (导航|路线|怎么走)?
        IntentPattern::new(
            r"(?:从|自)([^到去至往导航路线]+)(?:到|去|至|往)([^导航路线怎]+)(?:导航|路线|怎么走)?$",
            PatternShape::StartAndEnd,
        ),
        // 去B / 到B / 前往B
        IntentPattern::new(
            r"^(?:去|到|前往)([^导航路线怎]+)(?:导航|路线|怎么走)?$",
            PatternShape::DestinationOnly,
        ),
        // A到B导航
        IntentPattern::new(
            r"^([^到去至往导航路线]+)(?:到|去|至|往)([^导航路线怎]+)(?:导航|路线|怎么走)$",
            PatternShape::StartAndEnd,
        ),
        // 帮我从A到B
        IntentPattern::new(
            r"帮我?(?:从|自)([^到去至往]+)(?:到|去|至|往)(.+)$",
            PatternShape::StartAndEnd,
        ),
    ]
});

// ---------------------------------------------------------------------------
// IntentPatternMatcher
// ---------------------------------------------------------------------------

/// Stateless regex-tier extractor.
///
/// ```rust
/// use voice_nav::intent::IntentPatternMatcher;
///
/// let intent = IntentPatternMatcher::new().extract("从北京到上海");
/// assert_eq!(intent.start.as_deref(), Some("北京"));
/// assert_eq!(intent.end.as_deref(), Some("上海"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentPatternMatcher;

impl IntentPatternMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Extract a navigation intent from free text.
    ///
    /// Never fails: unrecognised text yields
    /// [`NavigationIntent::unresolved`].
    pub fn extract(&self, text: &str) -> NavigationIntent {
        let compact = compact(text);
        if compact.is_empty() {
            return NavigationIntent::unresolved();
        }

        PATTERNS
            .iter()
            .find_map(|p| p.apply(&compact))
            .unwrap_or_else(NavigationIntent::unresolved)
    }
}

fn compact(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect()
}

/// Basic plausibility check for a place name.
///
/// Rejects empty input, names shorter than 2 or longer than 100 characters,
/// and deictic placeholders such as `"这里"`.
pub fn is_valid_location(location: &str) -> bool {
    let trimmed = location.trim();
    let len = trimmed.chars().count();
    if !(MIN_LOCATION_CHARS..=MAX_LOCATION_CHARS).contains(&len) {
        return false;
    }
    !DEICTIC_WORDS.contains(&trimmed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
