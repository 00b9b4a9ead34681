// Rust guideline compliant 2026-03-01

//! Fraud Heuristic -- classifies one transaction as flagged/not-flagged with
//! a reason code.
//!
//! The rule chain is evaluated in priority order with first-match-wins
//! short-circuiting; overlapping ranges (rule 4 is reachable only when rules
//! 1-3 did not match) are part of the observable flagging rates and must not
//! be rewritten as independent rules. Besides the transaction's fields the
//! heuristic consumes randomness draws; that non-determinism simulates
//! upstream detection noise and is intentional, not a defect.
//!
//! Entry point: [`Heuristic::evaluate`] (via the `domain::Evaluate` port).
//! Thresholds and probabilities via [`HeuristicConfig::builder`].

use domain::vocab::TRUSTED_COUNTRIES;
use domain::{Evaluate, FraudVerdict, UnscoredTransaction};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Reason attached by rule 1: `amount > high_value_threshold`.
pub const REASON_HIGH_VALUE: &str = "High Value Transaction";
/// Reason attached by rule 2: country outside the trusted set.
pub const REASON_UNUSUAL_LOCATION: &str = "Unusual Geographical Location";
/// Reason attached by rule 3: rare independent anomaly signal.
pub const REASON_MULTIPLE_FAILED_ATTEMPTS: &str = "Multiple Failed Attempts";
/// Reason attached by rule 4: mid-range amount plus a pattern draw.
pub const REASON_SUSPICIOUS_PATTERN: &str = "Suspicious Transaction Pattern";

// ---------------------------------------------------------------------------
// HeuristicError
// ---------------------------------------------------------------------------

/// Errors that can occur while configuring the heuristic.
#[derive(Debug, thiserror::Error)]
pub enum HeuristicError {
    /// The supplied configuration is invalid.
    #[error("invalid heuristic configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// HeuristicConfig + builder
// ---------------------------------------------------------------------------

/// Tunable thresholds and probabilities. Configuration, not hard-coded
/// constants, so flagging behavior can be tuned without redeploying logic.
#[derive(Debug)]
pub struct HeuristicConfig {
    /// Rule 1 threshold: amounts strictly above this are high-value.
    pub high_value_threshold: f64,
    /// Rule 4 lower bound: the suspicious-pattern range is
    /// `(mid_threshold, high_value_threshold]`.
    pub mid_threshold: f64,
    /// Rule 2 set: countries that do not trigger the geographical rule.
    pub trusted_countries: HashSet<String>,
    /// Rule 3 probability in `[0, 1]`.
    pub rare_anomaly_probability: f64,
    /// Rule 4 probability in `[0, 1]`.
    pub pattern_probability: f64,
    /// Optional RNG seed for reproducible draws. `None` seeds from the OS.
    pub seed: Option<u64>,
}

/// Builder for [`HeuristicConfig`].
///
/// Obtain via [`HeuristicConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct HeuristicConfigBuilder {
    high_value_threshold: f64,
    mid_threshold: f64,
    trusted_countries: HashSet<String>,
    rare_anomaly_probability: f64,
    pattern_probability: f64,
    seed: Option<u64>,
}

impl HeuristicConfig {
    /// Create a builder with the original feed's tuning: thresholds
    /// 8000/5000, the 8-country trusted set, a 1% rare-anomaly draw and a
    /// 5% pattern draw.
    #[must_use]
    pub fn builder() -> HeuristicConfigBuilder {
        HeuristicConfigBuilder {
            high_value_threshold: 8_000.0,
            mid_threshold: 5_000.0,
            trusted_countries: TRUSTED_COUNTRIES.iter().map(|&c| c.to_owned()).collect(),
            rare_anomaly_probability: 0.01,
            pattern_probability: 0.05,
            seed: None,
        }
    }
}

impl HeuristicConfigBuilder {
    /// Override both amount thresholds (`mid` must stay below `high`).
    #[must_use]
    pub fn thresholds(mut self, mid: f64, high: f64) -> Self {
        self.mid_threshold = mid;
        self.high_value_threshold = high;
        self
    }

    /// Replace the trusted-country set.
    #[must_use]
    pub fn trusted_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trusted_countries = countries.into_iter().map(Into::into).collect();
        self
    }

    /// Override the rule 3 probability.
    #[must_use]
    pub fn rare_anomaly_probability(mut self, p: f64) -> Self {
        self.rare_anomaly_probability = p;
        self
    }

    /// Override the rule 4 probability.
    #[must_use]
    pub fn pattern_probability(mut self, p: f64) -> Self {
        self.pattern_probability = p;
        self
    }

    /// Fix the RNG seed for deterministic draws (useful in tests).
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HeuristicError::InvalidConfig`] when a threshold is not a
    /// positive finite number, when `mid_threshold >= high_value_threshold`,
    /// or when a probability lies outside `[0, 1]`.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<HeuristicConfig, HeuristicError> {
        if !(self.high_value_threshold.is_finite() && self.high_value_threshold > 0.0) {
            return Err(HeuristicError::InvalidConfig {
                reason: "high_value_threshold must be a positive finite amount".to_owned(),
            });
        }
        if !(self.mid_threshold.is_finite() && self.mid_threshold > 0.0) {
            return Err(HeuristicError::InvalidConfig {
                reason: "mid_threshold must be a positive finite amount".to_owned(),
            });
        }
        if self.mid_threshold >= self.high_value_threshold {
            return Err(HeuristicError::InvalidConfig {
                reason: "mid_threshold must be < high_value_threshold".to_owned(),
            });
        }
        for (name, p) in [
            ("rare_anomaly_probability", self.rare_anomaly_probability),
            ("pattern_probability", self.pattern_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(HeuristicError::InvalidConfig {
                    reason: format!("{name} must be in [0, 1], got {p}"),
                });
            }
        }
        Ok(HeuristicConfig {
            high_value_threshold: self.high_value_threshold,
            mid_threshold: self.mid_threshold,
            trusted_countries: self.trusted_countries,
            rare_anomaly_probability: self.rare_anomaly_probability,
            pattern_probability: self.pattern_probability,
            seed: self.seed,
        })
    }
}

// ---------------------------------------------------------------------------
// Heuristic
// ---------------------------------------------------------------------------

/// Rule-chain fraud classifier implementing the `domain::Evaluate` port.
#[derive(Debug)]
pub struct Heuristic {
    config: HeuristicConfig,
    /// Interior mutability required because `Evaluate` takes `&self`; a
    /// `Mutex` keeps the type `Sync` for use inside a spawned loop.
    rng: Mutex<StdRng>,
}

impl Heuristic {
    /// Create a new heuristic from `config`.
    ///
    /// Seeds the RNG from `config.seed` if set, otherwise from the OS.
    #[must_use]
    pub fn new(config: HeuristicConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { config, rng: Mutex::new(rng) }
    }
}

impl Evaluate for Heuristic {
    /// Run the rule chain in priority order; the first matching rule wins
    /// and later rules are not evaluated (no randomness is drawn for a rule
    /// that is never reached).
    fn evaluate(&self, tx: &UnscoredTransaction) -> FraudVerdict {
        let amount = tx.details.amount;
        let country = tx.details.location.country.as_str();

        // Rule 1: high value beats everything, including untrusted country.
        if amount > self.config.high_value_threshold {
            tracing::debug!("heuristic.flagged: id={} rule=high_value", tx.id);
            return FraudVerdict::flagged(REASON_HIGH_VALUE);
        }

        // Rule 2: geographical check.
        if !self.config.trusted_countries.contains(country) {
            tracing::debug!("heuristic.flagged: id={} rule=unusual_location", tx.id);
            return FraudVerdict::flagged(REASON_UNUSUAL_LOCATION);
        }

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        // Rule 3: rare independent signal.
        if rng.random::<f64>() < self.config.rare_anomaly_probability {
            tracing::debug!("heuristic.flagged: id={} rule=rare_anomaly", tx.id);
            return FraudVerdict::flagged(REASON_MULTIPLE_FAILED_ATTEMPTS);
        }

        // Rule 4: mid-range amount plus a second draw.
        if amount > self.config.mid_threshold
            && amount <= self.config.high_value_threshold
            && rng.random::<f64>() < self.config.pattern_probability
        {
            tracing::debug!("heuristic.flagged: id={} rule=pattern", tx.id);
            return FraudVerdict::flagged(REASON_SUSPICIOUS_PATTERN);
        }

        FraudVerdict::legitimate()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{CreditCard, Location, TransactionDetails, User};

    fn make_tx(amount: f64, country: &str) -> UnscoredTransaction {
        UnscoredTransaction {
            id: uuid::Uuid::new_v4(),
            user: User {
                name: "Test User".to_owned(),
                email: "test@example.com".to_owned(),
                phone_number: "+1-555-0100".to_owned(),
                address: "1 Main St".to_owned(),
                ip_address: "203.0.113.1".to_owned(),
                credit_card: CreditCard {
                    number: "4111111111111111".to_owned(),
                    expiration_date: "01/30".to_owned(),
                    provider: "VISA 16 digit".to_owned(),
                    security_code: "000".to_owned(),
                },
            },
            details: TransactionDetails {
                amount,
                currency: "USD".to_owned(),
                timestamp: 1_700_000_000.0_f64,
                merchant: "Test Shop".to_owned(),
                merchant_category: "Electronics".to_owned(),
                location: Location {
                    city: "Springfield".to_owned(),
                    state: "Illinois".to_owned(),
                    country: country.to_owned(),
                },
                transaction_type: "Online".to_owned(),
            },
        }
    }

    /// Heuristic with both random rules forced off, so only rules 1 and 2
    /// can fire.
    fn deterministic_off() -> Heuristic {
        Heuristic::new(
            HeuristicConfig::builder()
                .rare_anomaly_probability(0.0)
                .pattern_probability(0.0)
                .seed(1)
                .build()
                .unwrap(),
        )
    }

    // ------------------------------------------------------------------
    // Config validation
    // ------------------------------------------------------------------

    #[test]
    // Defaults are exact literals; assert_eq! is intentional.
    #[expect(clippy::float_cmp, reason = "exact integer-valued literals")]
    fn config_defaults_match_original() {
        let c = HeuristicConfig::builder().build().unwrap();
        assert_eq!(c.high_value_threshold, 8_000.0_f64);
        assert_eq!(c.mid_threshold, 5_000.0_f64);
        assert_eq!(c.trusted_countries.len(), 8);
        assert_eq!(c.rare_anomaly_probability, 0.01_f64);
        assert_eq!(c.pattern_probability, 0.05_f64);
    }

    #[test]
    fn config_rejects_mid_above_high() {
        let result = HeuristicConfig::builder().thresholds(9_000.0, 8_000.0).build();
        assert!(matches!(result, Err(HeuristicError::InvalidConfig { .. })));
    }

    #[test]
    fn config_rejects_probability_out_of_range() {
        let result = HeuristicConfig::builder().rare_anomaly_probability(1.5).build();
        assert!(matches!(result, Err(HeuristicError::InvalidConfig { .. })));
        let result = HeuristicConfig::builder().pattern_probability(-0.1).build();
        assert!(matches!(result, Err(HeuristicError::InvalidConfig { .. })));
    }

    #[test]
    fn config_rejects_non_positive_thresholds() {
        let result = HeuristicConfig::builder().thresholds(-1.0, 8_000.0).build();
        assert!(matches!(result, Err(HeuristicError::InvalidConfig { .. })));
        let result = HeuristicConfig::builder().thresholds(5_000.0, f64::NAN).build();
        assert!(matches!(result, Err(HeuristicError::InvalidConfig { .. })));
    }

    // ------------------------------------------------------------------
    // Rule outcomes
    // ------------------------------------------------------------------

    #[test]
    fn high_value_in_trusted_country_is_flagged() {
        let h = deterministic_off();
        let v = h.evaluate(&make_tx(9_000.0, "United States"));
        assert!(v.is_flagged());
        assert_eq!(v.reason(), Some(REASON_HIGH_VALUE));
    }

    #[test]
    fn untrusted_country_low_amount_is_flagged_geographical() {
        let h = deterministic_off();
        let v = h.evaluate(&make_tx(50.0, "North Korea"));
        assert!(v.is_flagged());
        assert_eq!(v.reason(), Some(REASON_UNUSUAL_LOCATION));
    }

    /// Rule 1 short-circuits rule 2: a high-value transaction is flagged as
    /// high value even from an untrusted country.
    #[test]
    fn high_value_beats_untrusted_country() {
        let h = deterministic_off();
        let v = h.evaluate(&make_tx(9_500.0, "North Korea"));
        assert_eq!(v.reason(), Some(REASON_HIGH_VALUE));
    }

    #[test]
    fn rare_anomaly_fires_when_certain() {
        let h = Heuristic::new(
            HeuristicConfig::builder()
                .rare_anomaly_probability(1.0)
                .pattern_probability(0.0)
                .seed(1)
                .build()
                .unwrap(),
        );
        let v = h.evaluate(&make_tx(50.0, "United States"));
        assert_eq!(v.reason(), Some(REASON_MULTIPLE_FAILED_ATTEMPTS));
    }

    /// Rule 3 outranks rule 4 even when the amount sits in the pattern range.
    #[test]
    fn rare_anomaly_beats_pattern() {
        let h = Heuristic::new(
            HeuristicConfig::builder()
                .rare_anomaly_probability(1.0)
                .pattern_probability(1.0)
                .seed(1)
                .build()
                .unwrap(),
        );
        let v = h.evaluate(&make_tx(6_000.0, "United States"));
        assert_eq!(v.reason(), Some(REASON_MULTIPLE_FAILED_ATTEMPTS));
    }

    #[test]
    fn pattern_fires_in_mid_range_when_certain() {
        let h = Heuristic::new(
            HeuristicConfig::builder()
                .rare_anomaly_probability(0.0)
                .pattern_probability(1.0)
                .seed(1)
                .build()
                .unwrap(),
        );
        let v = h.evaluate(&make_tx(6_000.0, "United States"));
        assert_eq!(v.reason(), Some(REASON_SUSPICIOUS_PATTERN));
    }

    /// The pattern range is `(mid, high]`: the high threshold itself is
    /// still eligible, the mid threshold is not.
    #[test]
    fn pattern_range_boundaries() {
        let h = Heuristic::new(
            HeuristicConfig::builder()
                .rare_anomaly_probability(0.0)
                .pattern_probability(1.0)
                .seed(1)
                .build()
                .unwrap(),
        );
        let at_high = h.evaluate(&make_tx(8_000.0, "United States"));
        assert_eq!(at_high.reason(), Some(REASON_SUSPICIOUS_PATTERN));

        let at_mid = h.evaluate(&make_tx(5_000.0, "United States"));
        assert!(!at_mid.is_flagged(), "amount == mid_threshold is outside the range");
    }

    #[test]
    fn no_rule_matches_yields_legitimate_with_no_reason() {
        let h = deterministic_off();
        let v = h.evaluate(&make_tx(100.0, "Canada"));
        assert!(!v.is_flagged());
        assert!(v.reason().is_none());
    }

    #[test]
    fn amount_exactly_at_high_threshold_is_not_high_value() {
        // Rule 1 is a strict inequality.
        let h = deterministic_off();
        let v = h.evaluate(&make_tx(8_000.0, "United States"));
        assert_ne!(v.reason(), Some(REASON_HIGH_VALUE));
    }

    // ------------------------------------------------------------------
    // Determinism and tuning
    // ------------------------------------------------------------------

    #[test]
    fn seeded_draw_sequences_are_identical() {
        let mk = || {
            Heuristic::new(HeuristicConfig::builder().seed(42).build().unwrap())
        };
        let h1 = mk();
        let h2 = mk();
        for _ in 0..500 {
            let tx = make_tx(6_000.0, "United States");
            assert_eq!(h1.evaluate(&tx), h2.evaluate(&tx));
        }
    }

    #[test]
    fn custom_trusted_set_is_honored() {
        let h = Heuristic::new(
            HeuristicConfig::builder()
                .trusted_countries(["Japan"])
                .rare_anomaly_probability(0.0)
                .pattern_probability(0.0)
                .seed(1)
                .build()
                .unwrap(),
        );
        assert!(!h.evaluate(&make_tx(10.0, "Japan")).is_flagged());
        assert_eq!(
            h.evaluate(&make_tx(10.0, "United States")).reason(),
            Some(REASON_UNUSUAL_LOCATION)
        );
    }

    #[test]
    fn custom_thresholds_shift_the_high_value_rule() {
        let h = Heuristic::new(
            HeuristicConfig::builder()
                .thresholds(100.0, 500.0)
                .rare_anomaly_probability(0.0)
                .pattern_probability(0.0)
                .seed(1)
                .build()
                .unwrap(),
        );
        assert_eq!(
            h.evaluate(&make_tx(501.0, "Canada")).reason(),
            Some(REASON_HIGH_VALUE)
        );
        assert!(!h.evaluate(&make_tx(500.0, "Canada")).is_flagged());
    }
}
