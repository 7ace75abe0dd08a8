// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TransactionType;
use crate::repository::{CategoryPatch, NewCategory, Repository};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;

fn kind_arg(sub: &clap::ArgMatches) -> Result<Option<TransactionType>> {
    Ok(match sub.get_one::<String>("type") {
        Some(k) => Some(k.parse()?),
        None => None,
    })
}

pub fn handle(repo: &mut dyn Repository, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").cloned().unwrap_or_default();
            let Some(kind) = kind_arg(sub)? else {
                anyhow::bail!("--type is required");
            };
            let c = repo.add_category(NewCategory {
                name,
                r#type: kind,
                is_default: false,
            })?;
            println!("Added {} category '{}' ({})", c.r#type, c.name, c.id);
        }
        Some(("list", sub)) => {
            let kind = kind_arg(sub)?;
            let snapshot = repo.get_snapshot()?;
            let cats: Vec<_> = snapshot
                .categories
                .into_iter()
                .filter(|c| kind.is_none_or(|k| c.r#type == k))
                .collect();
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cats)? {
                let data = cats
                    .iter()
                    .map(|c| {
                        vec![
                            c.name.clone(),
                            c.r#type.to_string(),
                            if c.is_default { "yes".into() } else { String::new() },
                            c.id.clone(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Category", "Type", "Default", "Id"], data));
            }
        }
        Some(("update", sub)) => {
            let id = sub.get_one::<String>("id").cloned().unwrap_or_default();
            repo.update_category(
                &id,
                CategoryPatch {
                    name: sub.get_one::<String>("name").cloned(),
                    r#type: kind_arg(sub)?,
                },
            )?;
            println!("Updated category {}", id);
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").cloned().unwrap_or_default();
            repo.delete_category(&id)?;
            println!("Removed category {}", id);
        }
        _ => {}
    }
    Ok(())
}
