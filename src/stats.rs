// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Derived totals over a transaction list. Nothing here is stored: every
//! figure is recomputed from the transactions it is given.

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{
    Category, CategoryTotal, Comparison, MonthlyComparisons, MonthlyStats, Period, Transaction,
    TransactionType, Trend, WeeklyBreakdown,
};
use crate::utils::Month;

pub fn inflow(t: &Transaction) -> Decimal {
    match t.r#type {
        TransactionType::Income | TransactionType::Donation | TransactionType::Investment => {
            t.amount
        }
        TransactionType::Expense => Decimal::ZERO,
    }
}

pub fn outflow(t: &Transaction) -> Decimal {
    match t.r#type {
        TransactionType::Expense => t.amount,
        _ => Decimal::ZERO,
    }
}

/// Category-typed investments only; `investment_amount` on incomes is never counted.
pub fn investment_portion(t: &Transaction) -> Decimal {
    match t.r#type {
        TransactionType::Investment => t.amount,
        _ => Decimal::ZERO,
    }
}

/// `initial_fund + Σ inflow − Σ outflow`. Callers filter by cutoff date.
///
/// All sums in this module saturate at the `Decimal` range instead of
/// overflowing.
pub fn balance(transactions: &[Transaction], initial_fund: Decimal) -> Decimal {
    transactions.iter().fold(initial_fund, apply)
}

fn apply(acc: Decimal, t: &Transaction) -> Decimal {
    acc.saturating_add(inflow(t)).saturating_sub(outflow(t))
}

#[derive(Debug, Default, Clone, Copy)]
struct Flows {
    income: Decimal,
    donations: Decimal,
    investments: Decimal,
    expenses: Decimal,
}

impl Flows {
    fn between(transactions: &[Transaction], from: NaiveDate, to: NaiveDate) -> Self {
        let mut f = Flows::default();
        for t in transactions.iter().filter(|t| t.date >= from && t.date <= to) {
            match t.r#type {
                TransactionType::Income => f.income = f.income.saturating_add(t.amount),
                TransactionType::Donation => {
                    f.donations = f.donations.saturating_add(t.amount)
                }
                TransactionType::Investment => {
                    f.investments = f.investments.saturating_add(investment_portion(t))
                }
                TransactionType::Expense => f.expenses = f.expenses.saturating_add(t.amount),
            }
        }
        f
    }

    fn net(&self) -> Decimal {
        self.income
            .saturating_add(self.donations)
            .saturating_add(self.investments)
            .saturating_sub(self.expenses)
    }
}

/// Flow totals of `transactions` within `month`, with the running balance
/// at month end taken over `all_transactions`.
pub fn monthly_stats(
    transactions: &[Transaction],
    month: Month,
    initial_fund: Decimal,
    all_transactions: &[Transaction],
) -> MonthlyStats {
    let flows = Flows::between(transactions, month.first_day(), month.last_day());
    let end = month.last_day();
    let balance = all_transactions
        .iter()
        .filter(|t| t.date <= end)
        .fold(initial_fund, apply);

    MonthlyStats {
        income: flows.income,
        donations: flows.donations,
        investments: flows.investments,
        expenses: flows.expenses,
        net: flows.net(),
        balance,
    }
}

/// Monday-aligned weeks of `month`, clipped to the month and, for the
/// month containing `today`, to `today`.
pub fn weekly_breakdown(
    transactions: &[Transaction],
    month: Month,
    today: NaiveDate,
) -> Vec<WeeklyBreakdown> {
    let start = month.first_day();
    let end = if month.contains(today) {
        today
    } else {
        month.last_day()
    };
    if end < start {
        return Vec::new();
    }

    let mut weeks = Vec::new();
    let mut cursor = start;
    let mut number = 1;
    while cursor <= end {
        let to_sunday = 6 - u64::from(cursor.weekday().num_days_from_monday());
        let week_end = cursor
            .checked_add_days(Days::new(to_sunday))
            .map_or(end, |d| d.min(end));
        let flows = Flows::between(transactions, cursor, week_end);
        weeks.push(WeeklyBreakdown {
            week_number: number,
            week_start: cursor,
            week_end,
            income: flows.income,
            donations: flows.donations,
            investments: flows.investments,
            expenses: flows.expenses,
            net: flows.net(),
        });
        number += 1;
        match week_end.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }
    weeks
}

/// Changes under 1% in either direction count as `Same`.
pub fn comparison(current: Decimal, previous: Decimal) -> Comparison {
    let difference = current.saturating_sub(previous);
    if previous.is_zero() {
        let trend = if current > Decimal::ZERO {
            Trend::Up
        } else if current < Decimal::ZERO {
            Trend::Down
        } else {
            Trend::Same
        };
        return Comparison {
            current,
            previous,
            difference,
            percentage_change: None,
            trend,
        };
    }

    let percentage_change = difference
        .checked_div(previous.abs())
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED));
    let trend = match percentage_change {
        Some(p) if p.abs() < Decimal::ONE => Trend::Same,
        Some(p) if p > Decimal::ZERO => Trend::Up,
        Some(_) => Trend::Down,
        None if difference > Decimal::ZERO => Trend::Up,
        None => Trend::Down,
    };
    Comparison {
        current,
        previous,
        difference,
        percentage_change,
        trend,
    }
}

/// Income, expenses and net of `month` against the month before it. When
/// neither month holds any movement every trend is `NoData`.
pub fn monthly_comparisons(
    transactions: &[Transaction],
    month: Month,
    initial_fund: Decimal,
) -> MonthlyComparisons {
    let prev = month.previous();
    let current = monthly_stats(transactions, month, initial_fund, transactions);
    let previous = monthly_stats(transactions, prev, initial_fund, transactions);

    let mut out = MonthlyComparisons {
        income: comparison(current.income, previous.income),
        expenses: comparison(current.expenses, previous.expenses),
        net: comparison(current.net, previous.net),
    };
    let empty = !transactions
        .iter()
        .any(|t| month.contains(t.date) || prev.contains(t.date));
    if empty {
        out.income.trend = Trend::NoData;
        out.expenses.trend = Trend::NoData;
        out.net.trend = Trend::NoData;
    }
    out
}

/// `count` consecutive months ending at `through`, oldest first.
pub fn monthly_series(
    transactions: &[Transaction],
    through: Month,
    count: usize,
    initial_fund: Decimal,
) -> Vec<(Month, MonthlyStats)> {
    let mut months = Vec::with_capacity(count);
    let mut m = through;
    for _ in 0..count {
        months.push(m);
        m = m.previous();
    }
    months.reverse();
    months
        .into_iter()
        .map(|m| (m, monthly_stats(transactions, m, initial_fund, transactions)))
        .collect()
}

/// Per-category totals of one type within `month`, largest first. Ties
/// keep category list order.
pub fn category_breakdown(
    transactions: &[Transaction],
    categories: &[Category],
    month: Month,
    kind: TransactionType,
) -> Vec<CategoryTotal> {
    let mut sums: HashMap<&str, (Decimal, usize)> = HashMap::new();
    for t in transactions
        .iter()
        .filter(|t| t.r#type == kind && month.contains(t.date))
    {
        let entry = sums.entry(t.category_id.as_str()).or_default();
        entry.0 = entry.0.saturating_add(t.amount);
        entry.1 += 1;
    }

    let mut out: Vec<CategoryTotal> = categories
        .iter()
        .filter_map(|c| {
            sums.remove(c.id.as_str()).map(|(total, count)| CategoryTotal {
                category_id: c.id.clone(),
                name: c.name.clone(),
                total,
                count,
            })
        })
        .collect();
    // References without a category entry still show up, after known ones.
    let mut orphans: Vec<CategoryTotal> = sums
        .into_iter()
        .map(|(id, (total, count))| CategoryTotal {
            category_id: id.to_string(),
            name: id.to_string(),
            total,
            count,
        })
        .collect();
    orphans.sort_by(|a, b| a.category_id.cmp(&b.category_id));
    out.extend(orphans);
    out.sort_by(|a, b| b.total.cmp(&a.total));
    out
}

pub fn transactions_in_period(transactions: &[Transaction], period: &Period) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| period.contains(t.date))
        .cloned()
        .collect()
}

/// Cash position of `period`: its initial fund plus every movement dated
/// inside it, up to `cutoff` when given.
pub fn period_balance(
    transactions: &[Transaction],
    period: &Period,
    cutoff: Option<NaiveDate>,
) -> Decimal {
    transactions
        .iter()
        .filter(|t| period.contains(t.date) && cutoff.is_none_or(|c| t.date <= c))
        .fold(period.initial_fund, apply)
}

/// Selection criteria for listing and export. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    pub category_id: Option<String>,
    pub tag: Option<String>,
    pub month: Option<Month>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub text: Option<String>,
}

impl TransactionFilter {
    pub fn for_period(period: &Period) -> Self {
        Self {
            from: period.start(),
            to: period.end(),
            ..Self::default()
        }
    }

    pub fn matches(&self, t: &Transaction) -> bool {
        self.kind.is_none_or(|k| t.r#type == k)
            && self.category_id.as_deref().is_none_or(|c| t.category_id == c)
            && self.tag.as_deref().is_none_or(|tag| t.has_tag(tag))
            && self.month.is_none_or(|m| m.contains(t.date))
            && self.from.is_none_or(|d| t.date >= d)
            && self.to.is_none_or(|d| t.date <= d)
            && self.text.as_deref().is_none_or(|q| {
                t.description.to_lowercase().contains(&q.to_lowercase())
            })
    }

    /// Matching transactions, newest first.
    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        let mut out: Vec<Transaction> = transactions
            .iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        out
    }
}
