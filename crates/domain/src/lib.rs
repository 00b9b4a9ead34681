// Rust guideline compliant 2026-03-01

//! Shared domain types for the live transaction feed.
//!
//! Defines `Transaction` and its parts, `FraudVerdict`, the fixed
//! vocabularies (country/currency map, merchant categories, transaction
//! types), the error taxonomy, and the hexagonal port traits:
//! `Synthesize`, `Evaluate`, `Storage`, `Broadcast`, and `Auth`.
//! All feed components depend on this crate; no component crate is
//! imported here.

pub mod vocab;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Transaction data model
// ---------------------------------------------------------------------------

/// Payment-instrument snapshot carried inside a synthetic user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    /// Card number as printed (digits, possibly with an issuer prefix).
    pub number: String,
    /// Expiration in `MM/YY` form.
    pub expiration_date: String,
    /// Issuer name (e.g. `"VISA 16 digit"`).
    pub provider: String,
    /// 3- or 4-digit security code.
    pub security_code: String,
}

/// Synthetic identity snapshot attached to exactly one transaction.
///
/// Generated fresh per transaction; no uniqueness invariant across
/// transactions and no reference to any real entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub ip_address: String,
    pub credit_card: CreditCard,
}

/// Where the transaction took place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: String,
    /// Always one of the keys of the country/currency map in [`vocab`].
    pub country: String,
}

/// The monetary and merchant facts of one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetails {
    /// Positive amount with two-decimal precision, range `(0, 10_000.00]`.
    pub amount: f64,
    /// Currency code mapped from `location.country` (see [`vocab::currency_for`]).
    pub currency: String,
    /// Creation instant, seconds since the Unix epoch.
    pub timestamp: f64,
    /// Merchant display name.
    pub merchant: String,
    /// One of [`vocab::MERCHANT_CATEGORIES`].
    pub merchant_category: String,
    pub location: Location,
    /// One of [`vocab::TRANSACTION_TYPES`].
    pub transaction_type: String,
}

/// Fraud classification attached to a transaction exactly once, before it
/// is persisted or broadcast.
///
/// Fields are private so the "reason present if and only if flagged"
/// invariant holds by construction: use [`FraudVerdict::legitimate`] or
/// [`FraudVerdict::flagged`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudVerdict {
    flagged: bool,
    reason: Option<String>,
}

impl FraudVerdict {
    /// Verdict for a transaction that matched no rule: not flagged, no reason.
    #[must_use]
    pub fn legitimate() -> Self {
        Self { flagged: false, reason: None }
    }

    /// Verdict for a flagged transaction with the matching rule's reason.
    #[must_use]
    pub fn flagged(reason: impl Into<String>) -> Self {
        Self { flagged: true, reason: Some(reason.into()) }
    }

    /// `true` if the heuristic flagged this transaction.
    #[must_use]
    pub fn is_flagged(&self) -> bool {
        self.flagged
    }

    /// Reason string; `Some` exactly when [`is_flagged`](Self::is_flagged).
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

/// A transaction as produced by the synthesizer, before fraud scoring.
///
/// Never persisted or broadcast directly; converted into a [`Transaction`]
/// via [`into_scored`](Self::into_scored).
#[derive(Debug, Clone, PartialEq)]
pub struct UnscoredTransaction {
    /// Unique identifier, generated at creation, never reused.
    pub id: uuid::Uuid,
    pub user: User,
    pub details: TransactionDetails,
}

impl UnscoredTransaction {
    /// Attach the heuristic's verdict, producing the immutable final record.
    #[must_use]
    pub fn into_scored(self, verdict: FraudVerdict) -> Transaction {
        Transaction {
            id: self.id,
            user: self.user,
            details: self.details,
            fraud_verdict: verdict,
        }
    }
}

/// A fully scored transaction record. Immutable once created.
///
/// The serde field renames reproduce the wire format of the original feed:
/// one self-contained JSON document per broadcast message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier, generated at creation, never reused.
    #[serde(rename = "transaction_id")]
    pub id: uuid::Uuid,
    pub user: User,
    #[serde(rename = "transaction_details")]
    pub details: TransactionDetails,
    #[serde(rename = "fraud_detection")]
    pub fraud_verdict: FraudVerdict,
}

/// Authenticated identity behind a subscriber connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Email of the authenticated account.
    pub email: String,
}

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Connect-time credential failures. A connection that fails validation is
/// refused with a policy-violation signal, never admitted partially.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No credential was presented at all.
    #[error("credential missing")]
    MissingCredential,
    /// The credential does not map to any known principal.
    #[error("credential invalid")]
    InvalidCredential,
    /// The credential was valid once but is no longer.
    #[error("credential expired")]
    ExpiredCredential,
}

/// Durable-store failures surfaced by the `Storage` port.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The store could not be reached or the operation failed outright.
    #[error("storage unavailable")]
    Unavailable,
    /// A stored row could not be decoded back into a `Transaction`.
    #[error("stored record malformed: {reason}")]
    Malformed {
        /// Human-readable description.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Hexagonal ports
// ---------------------------------------------------------------------------

/// Hexagonal port: synthetic transaction production.
///
/// Must always terminate and always return a structurally valid record
/// (vocabulary fields from the fixed sets, amount in range, currency
/// consistent with the country). No side effects beyond consuming
/// randomness, so it is callable at arbitrary cadence without coordination.
pub trait Synthesize {
    /// Produce one synthetic transaction, not yet fraud-scored.
    fn synthesize(&self) -> UnscoredTransaction;
}

/// Hexagonal port: fraud classification of a single transaction.
///
/// Implementations draw on a randomness source in addition to the
/// transaction's fields; that non-determinism simulates upstream detection
/// noise and is intentional, not a defect.
pub trait Evaluate {
    /// Classify `tx`, returning the verdict to attach.
    fn evaluate(&self, tx: &UnscoredTransaction) -> FraudVerdict;
}

/// Hexagonal port: durable transaction storage.
///
/// The feed loop depends exclusively on this trait -- never on a concrete
/// adapter. Implementations must support the "most recent N, optionally
/// before a timestamp" query shape in sub-linear time.
#[expect(
    async_fn_in_trait,
    reason = "no dyn dispatch needed; internal workspace only"
)]
pub trait Storage {
    /// Append one transaction durably.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the write fails.
    async fn append(&self, tx: &Transaction) -> Result<(), StorageError>;

    /// Read up to `limit` transactions, most recent first, optionally only
    /// those strictly older than `before` (epoch seconds).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] on query failure, or
    /// [`StorageError::Malformed`] when a row cannot be decoded.
    async fn page(
        &self,
        before: Option<f64>,
        limit: usize,
    ) -> Result<Vec<Transaction>, StorageError>;
}

/// Hexagonal port: fan-out of one event to all live subscribers.
///
/// Infallible by contract: a send failure on one subscriber resolves to
/// that subscriber's removal and is never surfaced to the caller.
#[expect(
    async_fn_in_trait,
    reason = "no dyn dispatch needed; internal workspace only"
)]
pub trait Broadcast {
    /// Deliver `tx` (serialized once) to every currently live subscriber.
    async fn broadcast(&self, tx: &Transaction);
}

/// Hexagonal port: opaque credential validation.
///
/// The feed does not care how credentials are issued or stored; it only
/// consumes "is this credential currently valid".
#[expect(
    async_fn_in_trait,
    reason = "no dyn dispatch needed; internal workspace only"
)]
pub trait Auth {
    /// Resolve `credential` to the authenticated principal.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] describing why the credential was refused.
    async fn validate(&self, credential: &str) -> Result<Principal, AuthError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_unscored() -> UnscoredTransaction {
        UnscoredTransaction {
            id: uuid::Uuid::new_v4(),
            user: User {
                name: "Jane Doe".to_owned(),
                email: "jane.doe@example.com".to_owned(),
                phone_number: "+1-555-0100".to_owned(),
                address: "1 Main St, Springfield".to_owned(),
                ip_address: "203.0.113.7".to_owned(),
                credit_card: CreditCard {
                    number: "4111111111111111".to_owned(),
                    expiration_date: "12/28".to_owned(),
                    provider: "VISA 16 digit".to_owned(),
                    security_code: "123".to_owned(),
                },
            },
            details: TransactionDetails {
                amount: 42.50_f64,
                currency: "USD".to_owned(),
                timestamp: 1_700_000_000.0_f64,
                merchant: "Acme Corp".to_owned(),
                merchant_category: "Electronics".to_owned(),
                location: Location {
                    city: "Springfield".to_owned(),
                    state: "Illinois".to_owned(),
                    country: "United States".to_owned(),
                },
                transaction_type: "Online".to_owned(),
            },
        }
    }

    #[test]
    fn verdict_legitimate_has_no_reason() {
        let v = FraudVerdict::legitimate();
        assert!(!v.is_flagged());
        assert!(v.reason().is_none());
    }

    #[test]
    fn verdict_flagged_carries_reason() {
        let v = FraudVerdict::flagged("High Value Transaction");
        assert!(v.is_flagged());
        assert_eq!(v.reason(), Some("High Value Transaction"));
    }

    #[test]
    fn into_scored_preserves_identity() {
        let unscored = sample_unscored();
        let id = unscored.id;
        let tx = unscored.into_scored(FraudVerdict::legitimate());
        assert_eq!(tx.id, id);
        assert!(!tx.fraud_verdict.is_flagged());
    }

    /// The broadcast wire format must match the original feed field for field.
    #[test]
    fn wire_format_field_names() {
        let tx = sample_unscored().into_scored(FraudVerdict::flagged("High Value Transaction"));
        let doc = serde_json::to_value(&tx).unwrap();

        assert!(doc.get("transaction_id").is_some());
        assert!(doc["user"].get("phone_number").is_some());
        assert!(doc["user"].get("ip_address").is_some());
        assert!(doc["user"]["credit_card"].get("expiration_date").is_some());
        assert!(doc["transaction_details"].get("merchant_category").is_some());
        assert!(doc["transaction_details"]["location"].get("country").is_some());
        assert_eq!(doc["fraud_detection"]["flagged"], serde_json::json!(true));
        assert_eq!(
            doc["fraud_detection"]["reason"],
            serde_json::json!("High Value Transaction")
        );
    }

    /// An unflagged verdict serializes `reason` as JSON null, as the
    /// original feed did.
    #[test]
    fn wire_format_null_reason_when_legitimate() {
        let tx = sample_unscored().into_scored(FraudVerdict::legitimate());
        let doc = serde_json::to_value(&tx).unwrap();
        assert_eq!(doc["fraud_detection"]["flagged"], serde_json::json!(false));
        assert!(doc["fraud_detection"]["reason"].is_null());
    }

    #[test]
    fn storage_error_variants() {
        let a = StorageError::Unavailable;
        let b = StorageError::Malformed { reason: "bad uuid".to_owned() };
        assert_ne!(a, b);
        assert_eq!(b.to_string(), "stored record malformed: bad uuid");
    }

    #[test]
    fn auth_error_display() {
        assert_eq!(AuthError::MissingCredential.to_string(), "credential missing");
        assert_eq!(AuthError::InvalidCredential.to_string(), "credential invalid");
        assert_eq!(AuthError::ExpiredCredential.to_string(), "credential expired");
    }

    /// Verify that all async port traits compile with a minimal implementation.
    #[tokio::test]
    async fn port_trait_struct_impl() {
        struct AllPorts;

        impl Storage for AllPorts {
            async fn append(&self, _tx: &Transaction) -> Result<(), StorageError> {
                Ok(())
            }

            async fn page(
                &self,
                _before: Option<f64>,
                _limit: usize,
            ) -> Result<Vec<Transaction>, StorageError> {
                Ok(vec![])
            }
        }

        impl Broadcast for AllPorts {
            async fn broadcast(&self, _tx: &Transaction) {}
        }

        impl Auth for AllPorts {
            async fn validate(&self, credential: &str) -> Result<Principal, AuthError> {
                if credential.is_empty() {
                    return Err(AuthError::MissingCredential);
                }
                Ok(Principal { email: "user@example.com".to_owned() })
            }
        }

        let ports = AllPorts;
        let tx = sample_unscored().into_scored(FraudVerdict::legitimate());
        ports.append(&tx).await.unwrap();
        assert!(ports.page(None, 10).await.unwrap().is_empty());
        ports.broadcast(&tx).await;
        assert!(ports.validate("").await.is_err());
        assert_eq!(
            ports.validate("token").await.unwrap().email,
            "user@example.com"
        );
    }
}
