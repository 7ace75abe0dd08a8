// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{AppSettings, Theme};
use crate::repository::{Repository, SettingsPatch};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(repo: &mut dyn Repository, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let settings = repo.get_snapshot()?.settings;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &settings)? {
                print_settings(&settings);
            }
        }
        Some(("set", sub)) => {
            let patch = SettingsPatch {
                current_period_id: None,
                has_completed_onboarding: sub.get_one::<bool>("onboarded").copied(),
                theme: sub
                    .get_one::<String>("theme")
                    .map(|t| Theme::coerce(Some(t.as_str()))),
            };
            let settings = repo.update_settings(patch)?;
            print_settings(&settings);
        }
        _ => {}
    }
    Ok(())
}

fn print_settings(s: &AppSettings) {
    let rows = vec![
        vec![
            "currentPeriodId".to_string(),
            s.current_period_id.clone().unwrap_or_else(|| "-".into()),
        ],
        vec![
            "hasCompletedOnboarding".to_string(),
            s.has_completed_onboarding.to_string(),
        ],
        vec!["theme".to_string(), s.theme.as_str().to_string()],
    ];
    println!("{}", pretty_table(&["Setting", "Value"], rows));
}
