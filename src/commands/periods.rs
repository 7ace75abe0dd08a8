// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::repository::{NewPeriod, PeriodPatch, Repository, SettingsPatch};
use crate::stats::period_balance;
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::Result;

pub fn handle(repo: &mut dyn Repository, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let p = repo.add_period(NewPeriod {
                name: sub.get_one::<String>("name").cloned().unwrap_or_default(),
                start_date: parse_date(sub.get_one::<String>("start").map_or("", String::as_str))?,
                end_date: parse_date(sub.get_one::<String>("end").map_or("", String::as_str))?,
                initial_fund: parse_decimal(
                    sub.get_one::<String>("initial-fund").map_or("0", String::as_str),
                )?,
            })?;
            println!(
                "Added period '{}' {}..{} with initial fund {} ({})",
                p.name,
                p.start_date,
                p.end_date,
                fmt_money(&p.initial_fund),
                p.id
            );
        }
        Some(("list", sub)) => list(repo, sub)?,
        Some(("update", sub)) => {
            let id = sub.get_one::<String>("id").cloned().unwrap_or_default();
            let patch = PeriodPatch {
                name: sub.get_one::<String>("name").cloned(),
                start_date: sub.get_one::<String>("start").map(|s| parse_date(s)).transpose()?,
                end_date: sub.get_one::<String>("end").map(|s| parse_date(s)).transpose()?,
                initial_fund: sub
                    .get_one::<String>("initial-fund")
                    .map(|s| parse_decimal(s))
                    .transpose()?,
            };
            repo.update_period(&id, patch)?;
            println!("Updated period {}", id);
        }
        Some(("use", sub)) => {
            let id = sub.get_one::<String>("id").cloned().unwrap_or_default();
            repo.update_settings(SettingsPatch {
                current_period_id: Some(Some(id.clone())),
                ..SettingsPatch::default()
            })?;
            println!("Current period is now {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn list(repo: &mut dyn Repository, sub: &clap::ArgMatches) -> Result<()> {
    let snapshot = repo.get_snapshot()?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &snapshot.periods)? {
        return Ok(());
    }
    let current = snapshot.settings.current_period_id.as_deref();
    let data = snapshot
        .periods
        .iter()
        .map(|p| {
            vec![
                if current == Some(p.id.as_str()) { "*".into() } else { String::new() },
                p.name.clone(),
                p.start_date.clone(),
                p.end_date.clone(),
                fmt_money(&p.initial_fund),
                fmt_money(&period_balance(&snapshot.transactions, p, None)),
                p.id.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["", "Period", "Start", "End", "Initial fund", "Balance", "Id"],
            data
        )
    );
    Ok(())
}
