//! Transaction-related types for the statement import pipeline
//!
//! This module defines the classified transaction types, the debit/credit
//! direction, counterparty details and the parsed transaction record.

use super::money::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction types recognised in statement descriptions
///
/// Classification is best effort: descriptions that match no rule are
/// `Unclassified` rather than a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Incoming SEPA credit transfer
    SepaIncoming,

    /// Outgoing SEPA or foreign-currency transfer
    SepaOutgoing,

    /// Card payment or ATM operation
    CardTransaction,

    /// Collected fee or commission
    Fee,

    /// Fee charged for an outgoing transfer
    TransferFee,

    /// Transfer between accounts within the bank
    InternalTransfer,

    /// Purchase or sale of foreign currency
    CurrencyExchange,

    /// No classification rule matched
    Unclassified,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionType::SepaIncoming => "SEPA_INCOMING",
            TransactionType::SepaOutgoing => "SEPA_OUTGOING",
            TransactionType::CardTransaction => "CARD_TRANSACTION",
            TransactionType::Fee => "FEE",
            TransactionType::TransferFee => "TRANSFER_FEE",
            TransactionType::InternalTransfer => "INTERNAL_TRANSFER",
            TransactionType::CurrencyExchange => "CURRENCY_EXCHANGE",
            TransactionType::Unclassified => "UNCLASSIFIED",
        };
        f.write_str(name)
    }
}

/// Debit/credit flag of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Debit,
    Credit,
}

/// Counterparty details pulled from the continuation lines of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Counterparty {
    pub name: Option<String>,
    pub iban: Option<String>,
    pub bank: Option<String>,
    /// Payment reference (invoice number, order id, ...)
    pub reference: Option<String>,
}

impl Counterparty {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.iban.is_none() && self.bank.is_none() && self.reference.is_none()
    }
}

/// A single statement line item
///
/// The amount is signed and always agrees with `direction`: debits carry
/// non-positive components, credits non-negative ones. Build transactions
/// through [`Transaction::new`] to keep that invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub posting_date: NaiveDate,
    pub value_date: NaiveDate,
    /// Bank reference (first token of the block)
    pub reference: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub amount: Money,
    pub direction: Direction,
    /// Description from the first line of the block
    pub description: String,
    /// Every description line of the block, joined with spaces
    pub raw_description: String,
    pub counterparty: Option<Counterparty>,
}

impl Transaction {
    /// Create a transaction whose direction is derived from the amount sign
    ///
    /// Components that disagree with the derived direction are normalised to
    /// it, so a `-0.00 EUR / 0.01 BGN` rounding artefact still yields a
    /// consistent record.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        posting_date: NaiveDate,
        value_date: NaiveDate,
        reference: String,
        tx_type: TransactionType,
        amount: Money,
        description: String,
        raw_description: String,
        counterparty: Option<Counterparty>,
    ) -> Self {
        let direction = if amount.is_negative() {
            Direction::Debit
        } else {
            Direction::Credit
        };
        let magnitude = amount.abs();
        let amount = match direction {
            Direction::Debit => -magnitude,
            Direction::Credit => magnitude,
        };

        Transaction {
            posting_date,
            value_date,
            reference,
            tx_type,
            amount,
            direction,
            description,
            raw_description,
            counterparty,
        }
    }

    pub fn is_debit(&self) -> bool {
        self.direction == Direction::Debit
    }
}
