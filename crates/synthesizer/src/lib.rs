// Rust guideline compliant 2026-03-01

//! Event Synthesizer -- produces one synthetic transaction per call, with a
//! fresh fake user identity and all enumerated fields drawn from the fixed
//! vocabularies in `domain::vocab`.
//!
//! Entry point: [`Synthesizer::synthesize`] (via the `domain::Synthesize`
//! port). Configuration via [`SynthesizerConfig::builder`].

use domain::vocab::{COUNTRY_CURRENCIES, MERCHANT_CATEGORIES, TRANSACTION_TYPES};
use domain::{
    CreditCard, Location, Synthesize, TransactionDetails, UnscoredTransaction, User,
};
use rand::{Rng, RngCore, SeedableRng, rngs::StdRng};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

// ---------------------------------------------------------------------------
// SynthesizerError
// ---------------------------------------------------------------------------

/// Errors that can occur while configuring a synthesizer.
#[derive(Debug, thiserror::Error)]
pub enum SynthesizerError {
    /// The supplied configuration is invalid.
    #[error("invalid synthesizer configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// SynthesizerConfig + builder
// ---------------------------------------------------------------------------

/// Runtime configuration for a [`Synthesizer`].
///
/// Construct via [`SynthesizerConfig::builder`].
#[derive(Debug)]
pub struct SynthesizerConfig {
    /// Lower amount bound in integer cents (inclusive). Must be `>= 1`.
    pub min_amount_cents: u32,
    /// Upper amount bound in integer cents (inclusive).
    pub max_amount_cents: u32,
    /// Optional RNG seed for reproducible output. `None` seeds from the OS.
    pub seed: Option<u64>,
}

/// Builder for [`SynthesizerConfig`].
///
/// Obtain via [`SynthesizerConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct SynthesizerConfigBuilder {
    min_amount_cents: u32,
    max_amount_cents: u32,
    seed: Option<u64>,
}

impl SynthesizerConfig {
    /// Create a builder with the original feed's amount range:
    /// `[5.00, 10_000.00]`, i.e. `[500, 1_000_000]` cents.
    #[must_use]
    pub fn builder() -> SynthesizerConfigBuilder {
        SynthesizerConfigBuilder {
            min_amount_cents: 500,
            max_amount_cents: 1_000_000,
            seed: None,
        }
    }
}

impl SynthesizerConfigBuilder {
    /// Override the amount range, in integer cents (both bounds inclusive).
    #[must_use]
    pub fn amount_cents(mut self, min: u32, max: u32) -> Self {
        self.min_amount_cents = min;
        self.max_amount_cents = max;
        self
    }

    /// Fix the RNG seed for deterministic output (useful in tests).
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesizerError::InvalidConfig`] when the amount range is
    /// empty or includes zero.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<SynthesizerConfig, SynthesizerError> {
        if self.min_amount_cents == 0 {
            return Err(SynthesizerError::InvalidConfig {
                reason: "min_amount_cents must be >= 1 (amounts are strictly positive)"
                    .to_owned(),
            });
        }
        if self.min_amount_cents > self.max_amount_cents {
            return Err(SynthesizerError::InvalidConfig {
                reason: "min_amount_cents must be <= max_amount_cents".to_owned(),
            });
        }
        Ok(SynthesizerConfig {
            min_amount_cents: self.min_amount_cents,
            max_amount_cents: self.max_amount_cents,
            seed: self.seed,
        })
    }
}

// ---------------------------------------------------------------------------
// Identity pools
// ---------------------------------------------------------------------------

/// Pools for synthetic user identities. Indexes are always derived from
/// `random_range(0..len())`, never out of bounds.
const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Susan", "Carlos", "Aisha", "Yuki", "Priya", "Omar", "Ingrid",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Wilson",
    "Taylor", "Tanaka", "Singh", "Müller", "Dubois", "Silva", "Ivanov",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net", "mail.test"];

const STREET_NAMES: &[&str] = &[
    "Main", "Oak", "Maple", "Cedar", "Park", "Lake", "Hill", "River", "Church", "Mill",
];

const CITIES: &[&str] = &[
    "Springfield", "Riverton", "Fairview", "Kingsport", "Lakewood", "Ashford", "Brookhaven",
    "Milltown", "Easton", "Westfield",
];

const STATES: &[&str] = &[
    "California", "Texas", "New York", "Ontario", "Bavaria", "Queensland", "Kanagawa",
    "Maharashtra", "São Paulo", "Guangdong",
];

const COMPANY_SUFFIXES: &[&str] = &["Ltd", "Inc", "Group", "PLC", "and Sons", "LLC"];

const CARD_PROVIDERS: &[&str] = &[
    "VISA 16 digit",
    "Mastercard",
    "American Express",
    "Discover",
    "JCB 16 digit",
];

/// Current instant as fractional seconds since the Unix epoch.
///
/// Falls back to `0.0` if the system clock reports a pre-epoch time.
fn epoch_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0_f64, |d| d.as_secs_f64())
}

// ---------------------------------------------------------------------------
// Synthesizer
// ---------------------------------------------------------------------------

/// Generates synthetic, not-yet-scored transactions.
///
/// Pure with respect to external state: the only effect of a call is
/// consuming randomness, so it can run at arbitrary cadence without
/// coordination.
#[derive(Debug)]
pub struct Synthesizer {
    config: SynthesizerConfig,
    /// Interior mutability required because `Synthesize` takes `&self`; a
    /// `Mutex` keeps the type `Sync` for use inside a spawned loop.
    rng: Mutex<StdRng>,
}

impl Synthesizer {
    /// Create a new synthesizer from `config`.
    ///
    /// Seeds the RNG from `config.seed` if set, otherwise from the OS.
    #[must_use]
    pub fn new(config: SynthesizerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { config, rng: Mutex::new(rng) }
    }

    /// Lock the RNG, recovering from a poisoned lock (an RNG cannot be left
    /// in a broken state).
    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pick<'a>(rng: &mut StdRng, pool: &[&'a str]) -> &'a str {
        pool[rng.random_range(0..pool.len())]
    }

    fn fake_user(rng: &mut StdRng) -> User {
        let first = Self::pick(rng, FIRST_NAMES);
        let last = Self::pick(rng, LAST_NAMES);
        let domain_name = Self::pick(rng, EMAIL_DOMAINS);
        let street = Self::pick(rng, STREET_NAMES);
        let city = Self::pick(rng, CITIES);

        let phone_number = format!(
            "+{}-{:03}-{:03}-{:04}",
            rng.random_range(1u16..=99),
            rng.random_range(200u16..=999),
            rng.random_range(0u16..=999),
            rng.random_range(0u16..=9999),
        );

        // Public-looking address: first octet avoids the common private and
        // loopback ranges.
        let mut first_octet = rng.random_range(1u8..=223);
        if first_octet == 10 || first_octet == 127 || first_octet == 172 || first_octet == 192 {
            first_octet = 203;
        }
        let ip_address = format!(
            "{first_octet}.{}.{}.{}",
            rng.random_range(0u8..=255),
            rng.random_range(0u8..=255),
            rng.random_range(1u8..=254),
        );

        let credit_card = CreditCard {
            number: (0..16).map(|_| char::from(b'0' + rng.random_range(0u8..=9))).collect(),
            expiration_date: format!(
                "{:02}/{:02}",
                rng.random_range(1u8..=12),
                rng.random_range(26u8..=31),
            ),
            provider: Self::pick(rng, CARD_PROVIDERS).to_owned(),
            security_code: format!("{:03}", rng.random_range(0u16..=999)),
        };

        User {
            name: format!("{first} {last}"),
            email: format!(
                "{}.{}@{domain_name}",
                first.to_lowercase(),
                last.to_lowercase()
            ),
            phone_number,
            address: format!(
                "{} {street} St, {city}",
                rng.random_range(1u16..=9999)
            ),
            ip_address,
            credit_card,
        }
    }
}

impl Synthesize for Synthesizer {
    /// Produce one structurally valid transaction.
    ///
    /// The country is drawn from the fixed map and the currency follows it
    /// deterministically; amount is integer cents over the configured range
    /// divided by 100, so every generated value has exactly two decimals.
    fn synthesize(&self) -> UnscoredTransaction {
        let mut rng = self.rng();

        // Build UUID from raw random bytes so the seeded RNG fully
        // determines the output.
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        let id = uuid::Builder::from_random_bytes(bytes).into_uuid();

        let (country, currency) =
            COUNTRY_CURRENCIES[rng.random_range(0..COUNTRY_CURRENCIES.len())];

        // Integer cents avoids float-rounding during generation. All values
        // in [1, 1_000_000] are exactly representable as f64.
        let amount = f64::from(
            rng.random_range(self.config.min_amount_cents..=self.config.max_amount_cents),
        ) / 100.0;

        let merchant = format!(
            "{} {}",
            Self::pick(&mut rng, LAST_NAMES),
            Self::pick(&mut rng, COMPANY_SUFFIXES)
        );

        let details = TransactionDetails {
            amount,
            currency: currency.to_owned(),
            timestamp: epoch_seconds(),
            merchant,
            merchant_category: Self::pick(&mut rng, MERCHANT_CATEGORIES).to_owned(),
            location: Location {
                city: Self::pick(&mut rng, CITIES).to_owned(),
                state: Self::pick(&mut rng, STATES).to_owned(),
                country: country.to_owned(),
            },
            transaction_type: Self::pick(&mut rng, TRANSACTION_TYPES).to_owned(),
        };

        let user = Self::fake_user(&mut rng);

        tracing::debug!("synthesizer.generated: id={id} amount={amount} country={country}");

        UnscoredTransaction { id, user, details }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::{Synthesizer, SynthesizerConfig, SynthesizerError};
    use domain::Synthesize as _;
    use domain::vocab::{MERCHANT_CATEGORIES, TRANSACTION_TYPES, currency_for};

    fn make_synth(seed: u64) -> Synthesizer {
        Synthesizer::new(SynthesizerConfig::builder().seed(seed).build().unwrap())
    }

    #[test]
    fn config_rejects_zero_min() {
        let result = SynthesizerConfig::builder().amount_cents(0, 100).build();
        assert!(matches!(result, Err(SynthesizerError::InvalidConfig { .. })));
    }

    #[test]
    fn config_rejects_inverted_range() {
        let result = SynthesizerConfig::builder().amount_cents(200, 100).build();
        assert!(matches!(result, Err(SynthesizerError::InvalidConfig { .. })));
    }

    #[test]
    fn config_defaults_match_original_range() {
        let config = SynthesizerConfig::builder().build().unwrap();
        assert_eq!(config.min_amount_cents, 500);
        assert_eq!(config.max_amount_cents, 1_000_000);
    }

    /// Every generated transaction is structurally valid: vocabulary fields
    /// come from the fixed sets and the currency matches the country.
    #[test]
    fn generated_fields_are_valid() {
        let synth = make_synth(2);
        for _ in 0..200 {
            let tx = synth.synthesize();

            let parsed = tx.id.to_string().parse::<uuid::Uuid>().unwrap();
            assert_eq!(parsed, tx.id, "id must be a valid UUID");

            let d = &tx.details;
            assert!(
                d.amount >= 5.00_f64 && d.amount <= 10_000.00_f64,
                "amount {} out of range",
                d.amount
            );
            assert_eq!(
                currency_for(&d.location.country),
                Some(d.currency.as_str()),
                "currency must follow the country mapping"
            );
            assert!(MERCHANT_CATEGORIES.contains(&d.merchant_category.as_str()));
            assert!(TRANSACTION_TYPES.contains(&d.transaction_type.as_str()));
            assert!(d.timestamp > 0.0_f64, "timestamp must be post-epoch");
        }
    }

    #[test]
    fn generated_amounts_have_two_decimals() {
        let synth = make_synth(3);
        for _ in 0..100 {
            let amount = synth.synthesize().details.amount;
            let cents = amount * 100.0;
            assert!(
                (cents - cents.round()).abs() < 1e-6,
                "amount {amount} is not an integer number of cents"
            );
        }
    }

    #[test]
    fn user_identity_is_plausible() {
        let synth = make_synth(4);
        let tx = synth.synthesize();
        let user = &tx.user;
        assert!(user.email.contains('@'));
        assert!(!user.name.is_empty());
        assert_eq!(user.credit_card.number.len(), 16);
        assert!(user.credit_card.number.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(user.ip_address.split('.').count(), 4);
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "same seed must yield bit-identical amounts")]
    fn seeded_rng_deterministic() {
        let a = make_synth(99).synthesize();
        let b = make_synth(99).synthesize();
        // Timestamps are wall-clock, everything else must match.
        assert_eq!(a.id, b.id);
        assert_eq!(a.user, b.user);
        assert_eq!(a.details.amount, b.details.amount);
        assert_eq!(a.details.location, b.details.location);
        assert_eq!(a.details.merchant, b.details.merchant);
    }

    #[test]
    fn custom_amount_range_is_respected() {
        let synth = Synthesizer::new(
            SynthesizerConfig::builder()
                .amount_cents(100, 200)
                .seed(7)
                .build()
                .unwrap(),
        );
        for _ in 0..50 {
            let amount = synth.synthesize().details.amount;
            assert!(
                (1.00_f64..=2.00_f64).contains(&amount),
                "amount {amount} out of [1.00, 2.00]"
            );
        }
    }
}
