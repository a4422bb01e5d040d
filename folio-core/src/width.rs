//! Responsive width resolution with breakpoint fallback.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Width applied when nothing else resolves.
pub const DEFAULT_WIDTH: &str = "100%";

/// Responsive size classes, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    /// Phone-sized viewports.
    Mobile,
    /// Mid-sized viewports.
    Tablet,
    /// Full-width viewports.
    Desktop,
}

impl Breakpoint {
    /// Lookup order for this breakpoint: itself first, then each smaller
    /// breakpoint in turn. Mobile is the floor of the inheritance chain.
    #[must_use]
    pub fn fallback_chain(self) -> &'static [Breakpoint] {
        match self {
            Breakpoint::Mobile => &[Breakpoint::Mobile],
            Breakpoint::Tablet => &[Breakpoint::Tablet, Breakpoint::Mobile],
            Breakpoint::Desktop => &[
                Breakpoint::Desktop,
                Breakpoint::Tablet,
                Breakpoint::Mobile,
            ],
        }
    }
}

/// A per-block width specification.
///
/// Either a single token applied at every breakpoint, or a record keyed by
/// breakpoint with mobile-first inheritance between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WidthSpec {
    /// One token for all breakpoints.
    Uniform(String),
    /// Per-breakpoint values; absent entries inherit from the nearest
    /// smaller breakpoint.
    PerBreakpoint {
        /// Width at the mobile breakpoint.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mobile: Option<String>,
        /// Width at the tablet breakpoint.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tablet: Option<String>,
        /// Width at the desktop breakpoint.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        desktop: Option<String>,
    },
}

impl WidthSpec {
    /// Read a width spec out of a prop value, if the value looks like one.
    ///
    /// Bare numbers are accepted and pass through as raw tokens.
    #[must_use]
    pub fn from_prop(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self::Uniform(n.to_string())),
            _ => serde_json::from_value(value.clone()).ok(),
        }
    }

    /// The explicit value stored for one breakpoint, ignoring inheritance.
    #[must_use]
    pub fn value_at(&self, breakpoint: Breakpoint) -> Option<&str> {
        match self {
            Self::Uniform(token) => Some(token),
            Self::PerBreakpoint {
                mobile,
                tablet,
                desktop,
            } => match breakpoint {
                Breakpoint::Mobile => mobile.as_deref(),
                Breakpoint::Tablet => tablet.as_deref(),
                Breakpoint::Desktop => desktop.as_deref(),
            },
        }
    }

    /// Resolve the concrete width for a breakpoint.
    ///
    /// Uses the explicit value for the breakpoint if present, otherwise the
    /// nearest smaller breakpoint's value, otherwise [`DEFAULT_WIDTH`].
    /// Unrecognized tokens pass through unchanged.
    #[must_use]
    pub fn resolve(&self, breakpoint: Breakpoint) -> String {
        for candidate in breakpoint.fallback_chain() {
            if let Some(token) = self.value_at(*candidate) {
                return token.to_string();
            }
        }
        DEFAULT_WIDTH.to_string()
    }
}

/// A classified width token.
///
/// Classification exists for diagnostics and tooling; rendering never rejects
/// a token. Anything unrecognized is carried through as [`WidthToken::Raw`].
#[derive(Debug, Clone, PartialEq)]
pub enum WidthToken {
    /// A percentage of the parent width.
    Percent(f64),
    /// An absolute pixel width.
    Pixels(f64),
    /// Content-driven width.
    Auto,
    /// An implementer-supplied value passed through verbatim.
    Raw(String),
}

impl WidthToken {
    /// Classify a raw token.
    #[must_use]
    pub fn classify(token: &str) -> Self {
        let trimmed = token.trim();
        if trimmed.eq_ignore_ascii_case("auto") {
            return Self::Auto;
        }
        if let Some(value) = trimmed.strip_suffix('%') {
            if let Ok(n) = value.trim().parse::<f64>() {
                return Self::Percent(n);
            }
        }
        if let Some(value) = trimmed.strip_suffix("px") {
            if let Ok(n) = value.trim().parse::<f64>() {
                return Self::Pixels(n);
            }
        }
        Self::Raw(trimmed.to_string())
    }

    /// The token as it should appear in output.
    #[must_use]
    pub fn css(&self) -> String {
        match self {
            Self::Percent(n) => format!("{n}%"),
            Self::Pixels(n) => format!("{n}px"),
            Self::Auto => "auto".to_string(),
            Self::Raw(raw) => raw.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn per_breakpoint(
        mobile: Option<&str>,
        tablet: Option<&str>,
        desktop: Option<&str>,
    ) -> WidthSpec {
        WidthSpec::PerBreakpoint {
            mobile: mobile.map(str::to_string),
            tablet: tablet.map(str::to_string),
            desktop: desktop.map(str::to_string),
        }
    }

    #[test]
    fn test_uniform_applies_at_every_breakpoint() {
        let spec = WidthSpec::Uniform("33.33%".to_string());
        assert_eq!(spec.resolve(Breakpoint::Mobile), "33.33%");
        assert_eq!(spec.resolve(Breakpoint::Tablet), "33.33%");
        assert_eq!(spec.resolve(Breakpoint::Desktop), "33.33%");
    }

    #[test]
    fn test_tablet_inherits_from_mobile() {
        let spec = per_breakpoint(Some("100%"), None, None);
        assert_eq!(spec.resolve(Breakpoint::Tablet), "100%");
    }

    #[test]
    fn test_tablet_prefers_mobile_over_desktop() {
        let spec = per_breakpoint(Some("100%"), None, Some("50%"));
        assert_eq!(spec.resolve(Breakpoint::Tablet), "100%");
        assert_eq!(spec.resolve(Breakpoint::Desktop), "50%");
    }

    #[test]
    fn test_empty_record_falls_back_to_default() {
        let spec = per_breakpoint(None, None, None);
        assert_eq!(spec.resolve(Breakpoint::Mobile), DEFAULT_WIDTH);
        assert_eq!(spec.resolve(Breakpoint::Desktop), DEFAULT_WIDTH);
    }

    #[test]
    fn test_desktop_does_not_leak_downward() {
        let spec = per_breakpoint(None, None, Some("50%"));
        assert_eq!(spec.resolve(Breakpoint::Mobile), DEFAULT_WIDTH);
        assert_eq!(spec.resolve(Breakpoint::Tablet), DEFAULT_WIDTH);
        assert_eq!(spec.resolve(Breakpoint::Desktop), "50%");
    }

    #[test]
    fn test_from_prop_accepts_string_record_and_number() {
        let spec = WidthSpec::from_prop(&serde_json::json!("50%")).expect("string spec");
        assert_eq!(spec, WidthSpec::Uniform("50%".to_string()));

        let spec =
            WidthSpec::from_prop(&serde_json::json!({"mobile": "100%"})).expect("record spec");
        assert_eq!(spec.resolve(Breakpoint::Tablet), "100%");

        let spec = WidthSpec::from_prop(&serde_json::json!(320)).expect("number spec");
        assert_eq!(spec.resolve(Breakpoint::Mobile), "320");
    }

    #[test]
    fn test_token_classification() {
        assert_eq!(WidthToken::classify("50%"), WidthToken::Percent(50.0));
        assert_eq!(WidthToken::classify("320px"), WidthToken::Pixels(320.0));
        assert_eq!(WidthToken::classify("Auto"), WidthToken::Auto);
        assert_eq!(
            WidthToken::classify("calc(100% - 2rem)"),
            WidthToken::Raw("calc(100% - 2rem)".to_string())
        );
    }

    #[test]
    fn test_unrecognized_tokens_round_trip() {
        let token = WidthToken::classify("whatever-unit");
        assert_eq!(token.css(), "whatever-unit");
    }

    proptest! {
        #[test]
        fn prop_resolve_never_panics(
            mobile in proptest::option::of("[ -~]{0,12}"),
            tablet in proptest::option::of("[ -~]{0,12}"),
            desktop in proptest::option::of("[ -~]{0,12}"),
        ) {
            let spec = WidthSpec::PerBreakpoint { mobile, tablet, desktop };
            for breakpoint in [Breakpoint::Mobile, Breakpoint::Tablet, Breakpoint::Desktop] {
                let resolved = spec.resolve(breakpoint);
                prop_assert!(!resolved.is_empty());
            }
        }

        #[test]
        fn prop_uniform_is_breakpoint_independent(token in "[ -~]{1,16}") {
            let spec = WidthSpec::Uniform(token.clone());
            prop_assert_eq!(spec.resolve(Breakpoint::Mobile), token.clone());
            prop_assert_eq!(spec.resolve(Breakpoint::Tablet), token.clone());
            prop_assert_eq!(spec.resolve(Breakpoint::Desktop), token);
        }
    }
}
