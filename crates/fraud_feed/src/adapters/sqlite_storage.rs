// Rust guideline compliant 2026-03-01

//! SQLite adapter for the `Storage` port.
//!
//! Persists scored transactions as flat rows in a `transactions` table via
//! `sqlx`. An index on `timestamp` keeps the "most recent N, optionally
//! before T" read shape sub-linear as the table grows.
//!
//! # Dependency note
//!
//! `sqlx` is a hard dependency (no feature flag). This is intentional for a
//! single-binary deployment where build-complexity trade-offs favour
//! simplicity over optional compilation.
//!
//! # Append-only semantics
//!
//! Transaction ids are generated at creation and never reused, so `append`
//! uses a plain `INSERT` and surfaces a duplicate-id constraint violation as
//! [`StorageError::Unavailable`] instead of silently overwriting.

use domain::{
    CreditCard, FraudVerdict, Location, Storage, StorageError, Transaction, TransactionDetails,
    User,
};
use sqlx::Row as _;

/// `Storage` adapter backed by a SQLite database via `sqlx`.
///
/// Connects to (or creates) a SQLite file and ensures the `transactions`
/// table and its timestamp index exist. Cloning shares the connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: sqlx::SqlitePool,
}

impl SqliteStorage {
    /// Open or create a SQLite database and initialize the schema.
    ///
    /// Passes `create_if_missing(true)` so the database file is created on
    /// first run without manual setup. Schema statements use `IF NOT
    /// EXISTS`, making repeated calls safe.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` when the connection or schema creation fails.
    pub async fn new(db_url: &str) -> Result<Self, sqlx::Error> {
        // create_if_missing: sqlx 0.8 defaults to false for file databases;
        // enable explicitly so the binary works out of the box on first run.
        let opts = db_url
            .parse::<sqlx::sqlite::SqliteConnectOptions>()?
            .create_if_missing(true);
        let pool = sqlx::SqlitePool::connect_with(opts).await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS transactions (
                id                 TEXT    PRIMARY KEY,
                timestamp          REAL    NOT NULL,
                amount             REAL    NOT NULL,
                currency           TEXT    NOT NULL,
                merchant           TEXT    NOT NULL,
                merchant_category  TEXT    NOT NULL,
                transaction_type   TEXT    NOT NULL,
                city               TEXT    NOT NULL,
                state              TEXT    NOT NULL,
                country            TEXT    NOT NULL,
                flagged            INTEGER NOT NULL,
                reason             TEXT,             -- NULL when not flagged
                user_name          TEXT    NOT NULL,
                user_email         TEXT    NOT NULL,
                user_phone         TEXT    NOT NULL,
                user_address       TEXT    NOT NULL,
                user_ip            TEXT    NOT NULL,
                card_number        TEXT    NOT NULL,
                card_expiration    TEXT    NOT NULL,
                card_provider      TEXT    NOT NULL,
                card_security_code TEXT    NOT NULL
            )",
        )
        .execute(&pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_transactions_timestamp
             ON transactions (timestamp)",
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }
}

/// Rebuild a [`Transaction`] from one flat row.
///
/// A row that fails to decode (bad UUID, missing reason on a flagged row)
/// maps to [`StorageError::Malformed`] naming the offending column.
fn decode_row(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction, StorageError> {
    fn malformed(col: &str, e: impl std::fmt::Display) -> StorageError {
        StorageError::Malformed { reason: format!("column {col}: {e}") }
    }
    let text = |col: &'static str| -> Result<String, StorageError> {
        row.try_get::<String, _>(col).map_err(|e| malformed(col, e))
    };

    let id = uuid::Uuid::parse_str(&text("id")?).map_err(|e| malformed("id", e))?;

    let flagged: i64 = row.try_get("flagged").map_err(|e| malformed("flagged", e))?;
    let reason: Option<String> = row.try_get("reason").map_err(|e| malformed("reason", e))?;
    let fraud_verdict = if flagged == 0 {
        FraudVerdict::legitimate()
    } else {
        let reason = reason.ok_or_else(|| StorageError::Malformed {
            reason: "flagged row without a reason".to_owned(),
        })?;
        FraudVerdict::flagged(reason)
    };

    Ok(Transaction {
        id,
        user: User {
            name: text("user_name")?,
            email: text("user_email")?,
            phone_number: text("user_phone")?,
            address: text("user_address")?,
            ip_address: text("user_ip")?,
            credit_card: CreditCard {
                number: text("card_number")?,
                expiration_date: text("card_expiration")?,
                provider: text("card_provider")?,
                security_code: text("card_security_code")?,
            },
        },
        details: TransactionDetails {
            amount: row.try_get("amount").map_err(|e| malformed("amount", e))?,
            currency: text("currency")?,
            timestamp: row
                .try_get("timestamp")
                .map_err(|e| malformed("timestamp", e))?,
            merchant: text("merchant")?,
            merchant_category: text("merchant_category")?,
            location: Location {
                city: text("city")?,
                state: text("state")?,
                country: text("country")?,
            },
            transaction_type: text("transaction_type")?,
        },
        fraud_verdict,
    })
}

impl Storage for SqliteStorage {
    /// Persist `tx` as one flat row.
    ///
    /// `reason` maps `Option<&str>` to a nullable TEXT column: NULL exactly
    /// when the transaction is not flagged.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] on any `sqlx` error (connection
    /// failure, disk full, duplicate id). The underlying error is logged at
    /// `error` level before mapping.
    async fn append(&self, tx: &Transaction) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO transactions
             (id, timestamp, amount, currency, merchant, merchant_category,
              transaction_type, city, state, country, flagged, reason,
              user_name, user_email, user_phone, user_address, user_ip,
              card_number, card_expiration, card_provider, card_security_code)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(tx.id.to_string())
        .bind(tx.details.timestamp)
        .bind(tx.details.amount)
        .bind(&tx.details.currency)
        .bind(&tx.details.merchant)
        .bind(&tx.details.merchant_category)
        .bind(&tx.details.transaction_type)
        .bind(&tx.details.location.city)
        .bind(&tx.details.location.state)
        .bind(&tx.details.location.country)
        .bind(i64::from(tx.fraud_verdict.is_flagged()))
        .bind(tx.fraud_verdict.reason())
        .bind(&tx.user.name)
        .bind(&tx.user.email)
        .bind(&tx.user.phone_number)
        .bind(&tx.user.address)
        .bind(&tx.user.ip_address)
        .bind(&tx.user.credit_card.number)
        .bind(&tx.user.credit_card.expiration_date)
        .bind(&tx.user.credit_card.provider)
        .bind(&tx.user.credit_card.security_code)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("sqlite.append: {e}");
            StorageError::Unavailable
        })?;
        Ok(())
    }

    /// Read up to `limit` rows, most recent first, optionally strictly older
    /// than `before`.
    ///
    /// `?1 IS NULL OR timestamp < ?1` folds the optional cursor into one
    /// statement; SQLite still uses the timestamp index for the ordered scan.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] on query failure, or
    /// [`StorageError::Malformed`] when a row cannot be decoded.
    async fn page(
        &self,
        before: Option<f64>,
        limit: usize,
    ) -> Result<Vec<Transaction>, StorageError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            "SELECT id, timestamp, amount, currency, merchant, merchant_category,
                    transaction_type, city, state, country, flagged, reason,
                    user_name, user_email, user_phone, user_address, user_ip,
                    card_number, card_expiration, card_provider, card_security_code
             FROM transactions
             WHERE ?1 IS NULL OR timestamp < ?1
             ORDER BY timestamp DESC
             LIMIT ?2",
        )
        .bind(before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("sqlite.page: {e}");
            StorageError::Unavailable
        })?;
        rows.iter().map(decode_row).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
