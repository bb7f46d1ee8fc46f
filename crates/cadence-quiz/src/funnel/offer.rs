use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::funnel::personalization::Bundle;

pub const QUIZ_BONUS_CODE: &str = "QUIZ10";
pub const EXPIRED_BONUS_CODE: &str = "SLEEP15";
pub const CHECKOUT_URL: &str = "https://evolance.com/products/cadence-calm-rest?discount=QUIZ10";
pub const BONUS_WINDOW_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineItem {
    pub name: &'static str,
    pub price_cents: u32,
}

/// Value stack shown next to the recommended bundle. All amounts are in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceStack {
    pub bundle: Bundle,
    pub items: Vec<LineItem>,
    pub subscribe_discount_cents: u32,
    pub quiz_bonus_cents: u32,
}

impl PriceStack {
    pub fn for_bundle(bundle: Bundle) -> Self {
        let (items, subscribe_discount_cents, quiz_bonus_cents) = match bundle {
            Bundle::Starter => (
                vec![LineItem {
                    name: "CADENCE Calm+Rest (1 Bottle)",
                    price_cents: 4999,
                }],
                1000,
                1000,
            ),
            Bundle::SleepOnly => (
                vec![LineItem {
                    name: "CADENCE Calm+Rest (2 Bottles, 60-day supply)",
                    price_cents: 5998,
                }],
                1200,
                1000,
            ),
            Bundle::StressSleep => (
                vec![
                    LineItem {
                        name: "CADENCE Calm+Rest (2 Bottles)",
                        price_cents: 5998,
                    },
                    LineItem {
                        name: "Magnesium Glycinate Powder (30 servings)",
                        price_cents: 2499,
                    },
                ],
                1700,
                1000,
            ),
            Bundle::SevereStress => (
                vec![
                    LineItem {
                        name: "CADENCE Calm+Rest (PM Support)",
                        price_cents: 4999,
                    },
                    LineItem {
                        name: "Magnesium Glycinate Powder",
                        price_cents: 2499,
                    },
                    LineItem {
                        name: "Ashwagandha Tincture (optional — AM support)",
                        price_cents: 3499,
                    },
                ],
                2400,
                1500,
            ),
        };

        Self {
            bundle,
            items,
            subscribe_discount_cents,
            quiz_bonus_cents,
        }
    }

    pub fn subtotal_cents(&self) -> u32 {
        self.items.iter().map(|item| item.price_cents).sum()
    }

    pub fn savings_cents(&self) -> u32 {
        self.subscribe_discount_cents + self.quiz_bonus_cents
    }

    pub fn total_cents(&self) -> u32 {
        self.subtotal_cents().saturating_sub(self.savings_cents())
    }

    /// Savings as a whole percentage of the subtotal, rounded half up.
    pub fn savings_percent(&self) -> u32 {
        let subtotal = u64::from(self.subtotal_cents());
        if subtotal == 0 {
            return 0;
        }
        let savings = u64::from(self.savings_cents());
        ((savings * 200 + subtotal) / (subtotal * 2)) as u32
    }

    pub fn summary(&self) -> PriceSummary {
        PriceSummary {
            subtotal_cents: self.subtotal_cents(),
            savings_cents: self.savings_cents(),
            total_cents: self.total_cents(),
            savings_percent: self.savings_percent(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceSummary {
    pub subtotal_cents: u32,
    pub savings_cents: u32,
    pub total_cents: u32,
    pub savings_percent: u32,
}

/// Render cents as a dollar amount, e.g. `2999` as `$29.99`.
pub fn format_cents(cents: u32) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusStatus {
    Active,
    Expired,
}

/// The limited-time quiz bonus that opens when the quiz is completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BonusWindow {
    pub opened_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl BonusWindow {
    pub fn starting_at(completed_at: DateTime<Utc>) -> Self {
        Self {
            opened_at: completed_at,
            expires_at: completed_at + Duration::minutes(BONUS_WINDOW_MINUTES),
        }
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        let remaining = self.expires_at - now;
        if remaining < Duration::zero() {
            Duration::zero()
        } else {
            remaining
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now) == Duration::zero()
    }

    pub fn status(&self, now: DateTime<Utc>) -> BonusStatus {
        if self.is_expired(now) {
            BonusStatus::Expired
        } else {
            BonusStatus::Active
        }
    }

    pub fn active_code(&self, now: DateTime<Utc>) -> &'static str {
        match self.status(now) {
            BonusStatus::Active => QUIZ_BONUS_CODE,
            BonusStatus::Expired => EXPIRED_BONUS_CODE,
        }
    }

    /// `MM:SS` left on the clock, `00:00` once expired.
    pub fn countdown(&self, now: DateTime<Utc>) -> String {
        let seconds = self.remaining(now).num_seconds();
        format!("{:02}:{:02}", seconds / 60, seconds % 60)
    }
}
