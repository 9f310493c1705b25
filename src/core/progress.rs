use std::fmt;

use serde::{Serialize, Deserialize};

pub type Amount = f64;

/// Fundraising target, in Kwacha.
pub const GOAL: Amount = 2_000_000.0;

/// The persisted running total. There is exactly one of these,
/// stored at `funds/progress`.
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct FundsProgress {
    pub amount: Amount
}

impl FundsProgress {
    pub fn new(amount: Amount) -> FundsProgress {
        FundsProgress { amount }
    }
}

/// Where the raised amount stands relative to the goal.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
#[serde(tag = "state", content = "amount", rename_all = "snake_case")]
pub enum Standing {
    Remaining(Amount),
    GoalReached,
    Surplus(Amount)
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remaining(left) => write!(f, "Remaining: {} Kwacha", format_amount(*left)),
            Self::GoalReached => write!(f, "Goal Reached!"),
            Self::Surplus(extra) => write!(f, "Goal Reached! Surplus: {} Kwacha", format_amount(*extra))
        }
    }
}

/// Everything the presentation layer displays, derived from the
/// current amount and the goal.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct ProgressView {
    pub amount: Amount,
    pub goal: Amount,
    pub remaining: Amount,
    pub surplus: Amount,
    pub standing: Standing,
    pub goal_reached: bool
}

impl ProgressView {
    pub fn new(amount: Amount, goal: Amount) -> ProgressView {
        ProgressView {
            amount,
            goal,
            remaining: remaining(amount, goal),
            surplus: surplus(amount, goal),
            standing: standing(amount, goal),
            goal_reached: amount >= goal
        }
    }

    /// Upper bound of the chart axis; grows past the goal so a surplus still fits.
    pub fn chart_max(&self) -> Amount {
        self.goal.max(self.amount)
    }
}

/// A goal has to be a finite amount above zero.
pub fn is_valid_goal(goal: Amount) -> bool {
    goal.is_finite() && goal > 0.0
}

pub fn remaining(amount: Amount, goal: Amount) -> Amount {
    (goal - amount).max(0.0)
}

pub fn surplus(amount: Amount, goal: Amount) -> Amount {
    if amount > goal { amount - goal } else { 0.0 }
}

pub fn standing(amount: Amount, goal: Amount) -> Standing {
    if amount < goal {
        Standing::Remaining(remaining(amount, goal))
    } else if amount > goal {
        Standing::Surplus(surplus(amount, goal))
    } else {
        Standing::GoalReached
    }
}

/// Formats an amount with thousands separators and at most three
/// fractional digits, e.g. `1234567.5` as `1,234,567.5`.
pub fn format_amount(amount: Amount) -> String {
    let rounded = format!("{:.3}", amount.abs());
    let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && (whole != "0" || !fraction.is_empty()) { "-" } else { "" };
    if fraction.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, fraction)
    }
}
