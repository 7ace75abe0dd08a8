// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, value_parser};

use crate::config::Backend;

const TYPES: [&str; 4] = ["income", "donation", "investment", "expense"];

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn month_arg(required: bool) -> Arg {
    Arg::new("month")
        .long("month")
        .value_name("YYYY-MM")
        .required(required)
        .help("Calendar month (defaults to the current month)")
}

fn period_arg() -> Arg {
    Arg::new("period")
        .long("period")
        .value_name("ID")
        .help("Period id (defaults to the current period)")
}

fn tx_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(
        Arg::new("type")
            .long("type")
            .required(required)
            .help("income | donation | investment | expense"),
    )
    .arg(
        Arg::new("amount")
            .long("amount")
            .required(required)
            .allow_hyphen_values(true),
    )
    .arg(
        Arg::new("date")
            .long("date")
            .value_name("YYYY-MM-DD")
            .help("Defaults to today"),
    )
    .arg(
        Arg::new("category")
            .long("category")
            .help("Category id or name"),
    )
    .arg(Arg::new("description").long("description").short('d'))
    .arg(
        Arg::new("tag")
            .long("tag")
            .action(ArgAction::Append)
            .help("Repeatable"),
    )
    .arg(Arg::new("payment-method").long("payment-method"))
    .arg(Arg::new("receipt").long("receipt"))
    .arg(
        Arg::new("investment-amount")
            .long("investment-amount")
            .help("Capital spent to produce an income"),
    )
}

pub fn build_cli() -> Command {
    Command::new("treasury")
        .about("Track income, donations, investments and expenses per accounting period")
        .version(clap::crate_version!())
        .arg(
            Arg::new("backend")
                .long("backend")
                .global(true)
                .env("TREASURY_BACKEND")
                .value_parser(value_parser!(Backend))
                .help("Storage backend: local | sqlite"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .env("TREASURY_DATA_DIR")
                .value_parser(value_parser!(PathBuf)),
        )
        .subcommand(Command::new("init").about("Create the store and seed default categories"))
        .subcommand(
            Command::new("tx")
                .about("Record and inspect movements")
                .subcommand(tx_fields(Command::new("add"), true))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("type").long("type").value_parser(TYPES))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("tag").long("tag"))
                        .arg(month_arg(false))
                        .arg(period_arg())
                        .arg(Arg::new("search").long("search"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(tx_fields(
                    Command::new("update").arg(Arg::new("id").required(true)),
                    false,
                ))
                .subcommand(Command::new("rm").arg(Arg::new("id").required(true))),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .value_parser(TYPES),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(Arg::new("type").long("type").value_parser(TYPES)),
                ))
                .subcommand(
                    Command::new("update")
                        .arg(Arg::new("id").required(true))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("type").long("type").value_parser(TYPES)),
                )
                .subcommand(Command::new("rm").arg(Arg::new("id").required(true))),
        )
        .subcommand(
            Command::new("period")
                .about("Manage accounting periods")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("start").long("start").required(true))
                        .arg(Arg::new("end").long("end").required(true))
                        .arg(
                            Arg::new("initial-fund")
                                .long("initial-fund")
                                .default_value("0"),
                        ),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("update")
                        .arg(Arg::new("id").required(true))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("start").long("start"))
                        .arg(Arg::new("end").long("end"))
                        .arg(Arg::new("initial-fund").long("initial-fund")),
                )
                .subcommand(Command::new("use").arg(Arg::new("id").required(true))),
        )
        .subcommand(
            Command::new("settings")
                .about("Account-wide preferences")
                .subcommand(json_flags(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(
                            Arg::new("theme")
                                .long("theme")
                                .value_parser(["light", "dark"]),
                        )
                        .arg(
                            Arg::new("onboarded")
                                .long("onboarded")
                                .value_parser(value_parser!(bool)),
                        ),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Balances and statistics")
                .subcommand(json_flags(
                    Command::new("balance")
                        .arg(Arg::new("as-of").long("as-of").value_name("YYYY-MM-DD"))
                        .arg(period_arg()),
                ))
                .subcommand(json_flags(
                    Command::new("month")
                        .arg(month_arg(false))
                        .arg(period_arg())
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .help("Restrict flows to one category id"),
                        ),
                ))
                .subcommand(json_flags(Command::new("weeks").arg(month_arg(false))))
                .subcommand(json_flags(
                    Command::new("compare")
                        .arg(month_arg(false))
                        .arg(period_arg()),
                ))
                .subcommand(json_flags(
                    Command::new("series")
                        .arg(
                            Arg::new("months")
                                .long("months")
                                .value_parser(value_parser!(usize))
                                .default_value("12"),
                        )
                        .arg(month_arg(false))
                        .arg(period_arg()),
                ))
                .subcommand(json_flags(
                    Command::new("by-category")
                        .arg(month_arg(false))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(TYPES)
                                .default_value("expense"),
                        ),
                )),
        )
        .subcommand(
            Command::new("export")
                .about("Write transactions or a monthly report to a file")
                .subcommand(
                    Command::new("transactions")
                        .arg(Arg::new("format").long("format").required(true))
                        .arg(Arg::new("out").long("out").required(true))
                        .arg(month_arg(false))
                        .arg(period_arg()),
                )
                .subcommand(
                    Command::new("report")
                        .arg(month_arg(false))
                        .arg(period_arg())
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Check stored data for records the normalizer would repair")
                .arg(
                    Arg::new("fix")
                        .long("fix")
                        .action(ArgAction::SetTrue)
                        .help("Write the repaired snapshot back"),
                ),
        )
        .subcommand(
            Command::new("reset").about("Delete every record").arg(
                Arg::new("yes")
                    .long("yes")
                    .action(ArgAction::SetTrue)
                    .required(true),
            ),
        )
}
