//! Batch parseability report
//!
//! A batch run never stops at the first bad card. Failures are collected,
//! the first few are logged with their text, and the run ends with the
//! parseable ratio.

use crate::card::{parse_card, NormalizedCard};
use crate::error::{CardError, Error};
use crate::grammar::Parser;
use crate::model::ParsedCard;
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// How many unparseable cards are logged with their text.
    pub max_logged_failures: usize,
    /// Width of the rendered bar, in characters.
    pub bar_width: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            max_logged_failures: 10,
            bar_width: 20,
        }
    }
}

impl From<&demystify_config::ReportConfig> for ReportOptions {
    fn from(config: &demystify_config::ReportConfig) -> Self {
        Self {
            max_logged_failures: config.max_logged_failures,
            bar_width: config.bar_width,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParseReport {
    pub total: usize,
    pub parsed: Vec<(String, Vec<ParsedCard>)>,
    pub failures: Vec<CardError>,
    options: ReportOptions,
}

impl ParseReport {
    pub fn new(options: ReportOptions) -> Self {
        Self {
            total: 0,
            parsed: Vec::new(),
            failures: Vec::new(),
            options,
        }
    }

    /// Parse every card, recording rather than propagating failures.
    pub fn run(parser: &Parser, cards: &[NormalizedCard], options: ReportOptions) -> Self {
        let mut report = Self::new(options);
        for card in cards {
            report.record(card.name.clone(), parse_card(parser, card));
        }
        report.finish();
        report
    }

    pub fn record(&mut self, card: String, result: Result<Vec<ParsedCard>, CardError>) {
        self.total += 1;
        match result {
            Ok(faces) => self.parsed.push((card, faces)),
            Err(err) => {
                if self.failures.len() < self.options.max_logged_failures {
                    match &err.source {
                        Error::Parse(failure) => {
                            warn!(card = %err.card, rule = %failure.rule, text = %failure.text, "unparseable card")
                        }
                        Error::Mana(malformed) => {
                            warn!(card = %err.card, symbol = %malformed.symbol, "malformed mana cost")
                        }
                    }
                }
                self.failures.push(err);
            }
        }
    }

    /// Log the final ratio.
    pub fn finish(&self) {
        info!(
            parseable = self.parseable(),
            total = self.total,
            ratio = self.ratio(),
            "parse run complete"
        );
    }

    pub fn parseable(&self) -> usize {
        self.parsed.len()
    }

    /// Fraction of cards that parsed; an empty batch counts as fully parseable.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.parseable() as f64 / self.total as f64
    }

    /// `[#####     ]`, filled in proportion to [ParseReport::ratio].
    pub fn bar(&self) -> String {
        let width = self.options.bar_width;
        let filled = ((self.ratio() * width as f64).round() as usize).min(width);
        format!("[{}{}]", "#".repeat(filled), " ".repeat(width - filled))
    }
}

impl fmt::Display for ParseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} parseable ({:.1}%)",
            self.bar(),
            self.parseable(),
            self.total,
            self.ratio() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseFailure;
    use crate::grammar::EntryRule;

    fn failure(card: &str) -> CardError {
        CardError::new(card, ParseFailure::new(EntryRule::RulesText, "???", "no parse"))
    }

    #[test]
    fn test_empty_batch_is_fully_parseable() {
        let report = ParseReport::new(ReportOptions::default());
        assert_eq!(report.ratio(), 1.0);
        assert_eq!(report.bar(), format!("[{}]", "#".repeat(20)));
    }

    #[test]
    fn test_ratio_and_bar() {
        let mut report = ParseReport::new(ReportOptions {
            max_logged_failures: 1,
            bar_width: 8,
        });
        report.record("A".to_string(), Ok(Vec::new()));
        report.record("B".to_string(), Err(failure("B")));
        report.record("C".to_string(), Err(failure("C")));
        report.record("D".to_string(), Ok(Vec::new()));
        assert_eq!(report.ratio(), 0.5);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.to_string(), "[####    ] 2/4 parseable (50.0%)");
    }
}
