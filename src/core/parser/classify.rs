//! Transaction type classification
//!
//! Rules are tried in order against the upper-cased raw description and the
//! first match wins. Order matters: `ИЗХОДЯЩ ВАЛУТЕН ПРЕВОД` must be seen as
//! an outgoing transfer before the generic `ПРЕВОД` rule claims it.

use crate::types::TransactionType;

struct ClassificationRule {
    keywords: &'static [&'static str],
    tx_type: TransactionType,
}

const RULES: &[ClassificationRule] = &[
    ClassificationRule {
        keywords: &["СЕПА ПОЛУЧЕН"],
        tx_type: TransactionType::SepaIncoming,
    },
    ClassificationRule {
        keywords: &["ИЗХОДЯЩ ВАЛУТЕН ПРЕВОД", "ИЗХОДЯЩ"],
        tx_type: TransactionType::SepaOutgoing,
    },
    ClassificationRule {
        keywords: &["КАРТОВА ТРАНЗАКЦИЯ"],
        tx_type: TransactionType::CardTransaction,
    },
    ClassificationRule {
        keywords: &["СЪБРАНА ТАКСА ИЛИ КОМИСИОНА"],
        tx_type: TransactionType::Fee,
    },
    ClassificationRule {
        keywords: &["ТАКСА ИЗХ.", "ТАКСА"],
        tx_type: TransactionType::TransferFee,
    },
    ClassificationRule {
        keywords: &["ПРЕВОД"],
        tx_type: TransactionType::InternalTransfer,
    },
    ClassificationRule {
        keywords: &["ПРОДАЖБА НА ВАЛУТА", "ПОКУПКА НА ВАЛУТА"],
        tx_type: TransactionType::CurrencyExchange,
    },
];

/// Classify a transaction by its description, falling back to `Unclassified`
pub fn classify(description: &str) -> TransactionType {
    let upper = description.to_uppercase();
    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|keyword| upper.contains(keyword)))
        .map_or(TransactionType::Unclassified, |rule| rule.tx_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::sepa_incoming("FT1 СЕПА ПОЛУЧЕН ПРЕВОД ACME LTD", TransactionType::SepaIncoming)]
    #[case::outgoing_currency("ИЗХОДЯЩ ВАЛУТЕН ПРЕВОД", TransactionType::SepaOutgoing)]
    #[case::outgoing("Изходящ превод СЕПА", TransactionType::SepaOutgoing)]
    #[case::card("PO123456 КАРТОВА ТРАНЗАКЦИЯ LIDL", TransactionType::CardTransaction)]
    #[case::fee("СЪБРАНА ТАКСА ИЛИ КОМИСИОНА", TransactionType::Fee)]
    #[case::transfer_fee("ТАКСА ИЗХ. ПРЕВОД", TransactionType::TransferFee)]
    #[case::internal("ПРЕВОД МЕЖДУ СМЕТКИ", TransactionType::InternalTransfer)]
    #[case::exchange("ПОКУПКА НА ВАЛУТА", TransactionType::CurrencyExchange)]
    #[case::unknown("ЛИХВА", TransactionType::Unclassified)]
    #[case::empty("", TransactionType::Unclassified)]
    fn test_classify(#[case] description: &str, #[case] expected: TransactionType) {
        assert_eq!(classify(description), expected);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // Matches both the card and the transfer rule
        assert_eq!(
            classify("КАРТОВА ТРАНЗАКЦИЯ ПРЕВОД"),
            TransactionType::CardTransaction
        );
    }
}
