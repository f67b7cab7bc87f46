//! Keyword-based question routing.

use copilot_core::models::Intent;

// ── IntentRule ────────────────────────────────────────────────────────────────

/// One routing rule: every `all_of` keyword present and no `none_of` keyword
/// present. Keywords are lowercase and matched as plain substrings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntentRule {
    pub all_of: &'static [&'static str],
    pub none_of: &'static [&'static str],
    pub intent: Intent,
}

impl IntentRule {
    const fn new(all_of: &'static [&'static str], intent: Intent) -> Self {
        Self {
            all_of,
            none_of: &[],
            intent,
        }
    }

    const fn excluding(self, none_of: &'static [&'static str]) -> Self {
        Self { none_of, ..self }
    }

    /// `lowered` must already be lowercase.
    pub fn matches(&self, lowered: &str) -> bool {
        self.all_of.iter().all(|k| lowered.contains(k))
            && !self.none_of.iter().any(|k| lowered.contains(k))
    }
}

/// Routing rules in precedence order; the first match wins.
const RULES: &[IntentRule] = &[
    IntentRule::new(&["revenue", "budget"], Intent::RevenueVsBudget),
    IntentRule::new(&["gross margin"], Intent::GrossMarginTrend),
    IntentRule::new(&["opex"], Intent::OpexBreakdown),
    IntentRule::new(&["ebitda"], Intent::EbitdaTrend).excluding(&["budget"]),
    IntentRule::new(&["ebitda", "budget"], Intent::EbitdaVsBudget),
    IntentRule::new(&["cash runway"], Intent::CashRunway),
];

// ── IntentClassifier ──────────────────────────────────────────────────────────

/// Stateless question classifier.
pub struct IntentClassifier;

impl IntentClassifier {
    /// Intent of `question`, or [`Intent::Unknown`] when no rule matches.
    pub fn classify(question: &str) -> Intent {
        let lowered = question.to_lowercase();
        RULES
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map_or(Intent::Unknown, |rule| rule.intent)
    }

    /// The rule table, in evaluation order.
    pub fn rules() -> &'static [IntentRule] {
        RULES
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
