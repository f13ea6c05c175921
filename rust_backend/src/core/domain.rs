//! Domain vocabulary for ledger and card transaction records.
//!
//! Column names are kept as constants so that every stage references the
//! same spelling the input files use.

use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Ledger transaction category column.
pub const COL_TYPE: &str = "type";
/// Ledger transaction amount column.
pub const COL_AMOUNT: &str = "amount";
/// Ledger time offset column, whole hours since the epoch.
pub const COL_STEP: &str = "step";
pub const COL_AMOUNT_CONVERTED: &str = "amount_converted";
pub const COL_TIMESTAMP: &str = "timestamp";
pub const COL_DAY: &str = "day";
pub const COL_WEEK: &str = "week";
pub const COL_MONTH: &str = "month";

/// Card transaction amount column.
pub const COL_CARD_AMOUNT: &str = "Amount";
/// Source label column of the card dataset, renamed on load.
pub const COL_CLASS: &str = "Class";
pub const COL_IS_FRAUD: &str = "isFraud";
pub const COL_LOG_AMOUNT: &str = "LogTransactionAmt";
pub const COL_FRAUD_LABEL: &str = "FraudLabel";
pub const COL_COUNT: &str = "count";
pub const COL_FRAUD_PERCENTAGE: &str = "FraudPercentage";

pub const FRAUD_LABEL: &str = "Fraud";
pub const NON_FRAUD_LABEL: &str = "Non-Fraud";

/// Default currency conversion rate applied to `amount`.
pub const DEFAULT_CONVERSION_RATE: f64 = 1.1;

/// Origin of the `step` clock, as ISO-8601 local time.
pub const DEFAULT_EPOCH: &str = "2021-01-01T00:00:00";

/// Transaction categories accepted by the ledger cleanser.
pub const VALID_TYPES: [&str; 5] = ["CASH-IN", "CASH-OUT", "DEBIT", "PAYMENT", "TRANSFER"];

/// Enumerated ledger transaction category.
///
/// # Examples
///
/// ```
/// use txn_etl::core::TransactionType;
///
/// let kind: TransactionType = "CASH-OUT".parse().unwrap();
/// assert_eq!(kind, TransactionType::CashOut);
/// assert_eq!(kind.as_str(), "CASH-OUT");
/// assert!("CASH_OUT".parse::<TransactionType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "CASH-IN")]
    CashIn,
    #[serde(rename = "CASH-OUT")]
    CashOut,
    #[serde(rename = "DEBIT")]
    Debit,
    #[serde(rename = "PAYMENT")]
    Payment,
    #[serde(rename = "TRANSFER")]
    Transfer,
}

impl TransactionType {
    pub const ALL: [TransactionType; 5] = [
        TransactionType::CashIn,
        TransactionType::CashOut,
        TransactionType::Debit,
        TransactionType::Payment,
        TransactionType::Transfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::CashIn => "CASH-IN",
            TransactionType::CashOut => "CASH-OUT",
            TransactionType::Debit => "DEBIT",
            TransactionType::Payment => "PAYMENT",
            TransactionType::Transfer => "TRANSFER",
        }
    }

    pub fn is_valid(value: &str) -> bool {
        value.parse::<TransactionType>().is_ok()
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionType::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Invalid transaction type: {}", s))
    }
}

/// Parse the epoch used by the step clock.
///
/// Accepts `YYYY-MM-DDTHH:MM:SS` or a bare date (midnight).
pub fn parse_epoch(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
        })
        .map_err(|e| format!("Invalid epoch '{}': {}", value, e))
}

/// The default step epoch, `2021-01-01T00:00:00`.
pub fn default_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Convert a step offset (whole hours) into a point in time.
///
/// Returns `None` when the result is outside the representable range.
///
/// # Examples
///
/// ```
/// use txn_etl::core::domain::{default_epoch, step_to_timestamp};
///
/// let next_day = step_to_timestamp(default_epoch(), 24).unwrap();
/// assert_eq!(next_day.to_string(), "2021-01-02 00:00:00");
/// assert!(step_to_timestamp(default_epoch(), i64::MAX).is_none());
/// ```
pub fn step_to_timestamp(epoch: NaiveDateTime, step: i64) -> Option<NaiveDateTime> {
    epoch.checked_add_signed(Duration::try_hours(step)?)
}
