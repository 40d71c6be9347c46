//! Paired EUR/BGN amounts
//!
//! Statements print every balance and amount twice: in EUR and in BGN at the
//! fixed conversion rate. Both figures are carried independently so rounding
//! in the source document can be checked per currency.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg, Sub};

/// An amount expressed in both EUR and BGN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Money {
    pub eur: Decimal,
    pub bgn: Decimal,
}

impl Money {
    pub const ZERO: Money = Money {
        eur: Decimal::ZERO,
        bgn: Decimal::ZERO,
    };

    pub fn new(eur: Decimal, bgn: Decimal) -> Self {
        Money { eur, bgn }
    }

    /// Absolute value of both components
    pub fn abs(&self) -> Self {
        Money {
            eur: self.eur.abs(),
            bgn: self.bgn.abs(),
        }
    }

    /// True when the pair represents a debit.
    ///
    /// The EUR figure decides; BGN only breaks the tie when EUR rounds to zero.
    pub fn is_negative(&self) -> bool {
        if self.eur.is_zero() {
            self.bgn.is_sign_negative() && !self.bgn.is_zero()
        } else {
            self.eur.is_sign_negative()
        }
    }

    pub fn is_zero(&self) -> bool {
        self.eur.is_zero() && self.bgn.is_zero()
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money {
            eur: self.eur + rhs.eur,
            bgn: self.bgn + rhs.bgn,
        }
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money {
            eur: self.eur - rhs.eur,
            bgn: self.bgn - rhs.bgn,
        }
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money {
            eur: -self.eur,
            bgn: -self.bgn,
        }
    }
}
