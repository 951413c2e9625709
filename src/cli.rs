// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::installments::MAX_INSTALLMENTS;
use clap::{Arg, ArgAction, Command, value_parser};

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

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .value_name("YYYY-MM")
        .help("Month to show (defaults to the selected month)")
}

fn method_arg() -> Arg {
    Arg::new("method")
        .long("method")
        .short('m')
        .required(true)
        .value_parser(["nubank", "inter", "pix"])
        .help("Payment method")
}

fn id_arg(help: &'static str) -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .help(help)
}

pub fn build_cli() -> Command {
    Command::new("walletboard")
        .version(clap::crate_version!())
        .about("Monthly income, installment and card-balance ledger")
        .subcommand(Command::new("init").about("Create the local database"))
        .subcommand(
            Command::new("config")
                .about("Configuration file")
                .subcommand(Command::new("path").about("Print the config file location"))
                .subcommand(
                    Command::new("init")
                        .about("Write a default config file")
                        .arg(
                            Arg::new("force")
                                .long("force")
                                .action(ArgAction::SetTrue)
                                .help("Overwrite an existing file"),
                        ),
                ),
        )
        .subcommand(
            Command::new("auth")
                .about("Sign in to the hosted backend")
                .subcommand(
                    Command::new("signin")
                        .arg(Arg::new("email").long("email").required(true))
                        .arg(Arg::new("password").long("password").required(true)),
                )
                .subcommand(
                    Command::new("signup")
                        .arg(Arg::new("email").long("email").required(true))
                        .arg(Arg::new("password").long("password").required(true))
                        .arg(Arg::new("nickname").long("nickname")),
                )
                .subcommand(Command::new("signout"))
                .subcommand(
                    Command::new("passwd")
                        .about("Change the password of the signed-in user")
                        .arg(Arg::new("password").long("password").required(true))
                        .arg(Arg::new("confirm").long("confirm").required(true)),
                )
                .subcommand(
                    Command::new("reset")
                        .about("Send a password reset email")
                        .arg(Arg::new("email").long("email").required(true)),
                )
                .subcommand(Command::new("status")),
        )
        .subcommand(
            Command::new("month")
                .about("Selected month shared by every view")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set").arg(
                        Arg::new("month")
                            .required(true)
                            .value_name("YYYY-MM"),
                    ),
                )
                .subcommand(Command::new("next"))
                .subcommand(Command::new("prev")),
        )
        .subcommand(json_flags(
            Command::new("summary")
                .about("Income, expenses and balance for a month")
                .arg(month_arg()),
        ))
        .subcommand(json_flags(
            Command::new("balances")
                .about("Installments due per payment method")
                .arg(month_arg()),
        ))
        .subcommand(
            Command::new("income")
                .about("Income records")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("description").long("description").short('d').required(true))
                        .arg(Arg::new("amount").long("amount").short('a').required(true))
                        .arg(Arg::new("date").long("date").value_name("YYYY-MM-DD")),
                )
                .subcommand(json_flags(Command::new("list").arg(month_arg())))
                .subcommand(Command::new("rm").arg(id_arg("Income id"))),
        )
        .subcommand(
            Command::new("expense")
                .about("Expenses, installments and fixed expenses")
                .subcommand(
                    Command::new("add")
                        .arg(method_arg())
                        .arg(Arg::new("description").long("description").short('d').required(true))
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .short('a')
                                .required(true)
                                .help("Total amount (monthly amount for fixed expenses)"),
                        )
                        .arg(Arg::new("category").long("category").short('c'))
                        .arg(Arg::new("purchase_date").long("purchase-date").value_name("YYYY-MM-DD"))
                        .arg(
                            Arg::new("due_date")
                                .long("due-date")
                                .value_name("YYYY-MM-DD")
                                .help("First due date"),
                        )
                        .arg(
                            Arg::new("installments")
                                .long("installments")
                                .short('n')
                                .value_parser(
                                    value_parser!(u32).range(1..=i64::from(MAX_INSTALLMENTS)),
                                )
                                .conflicts_with("fixed")
                                .help("Split the total into N monthly installments"),
                        )
                        .arg(
                            Arg::new("fixed")
                                .long("fixed")
                                .action(ArgAction::SetTrue)
                                .help("Record as a fixed monthly expense"),
                        )
                        .arg(
                            Arg::new("recurring")
                                .long("recurring")
                                .action(ArgAction::SetTrue)
                                .help("With --fixed: generate twelve months of installments"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(method_arg())
                        .arg(month_arg())
                        .arg(Arg::new("search").long("search").short('s'))
                        .arg(
                            Arg::new("sort")
                                .long("sort")
                                .default_value("date-desc")
                                .value_parser(["date-desc", "date-asc", "alpha-asc", "alpha-desc"]),
                        )
                        .arg(Arg::new("from").long("from").value_name("YYYY-MM-DD"))
                        .arg(Arg::new("to").long("to").value_name("YYYY-MM-DD"))
                        .arg(
                            Arg::new("page")
                                .long("page")
                                .default_value("1")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(json_flags(
                    Command::new("show").arg(id_arg("Installment id")),
                ))
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg("Installment id"))
                        .arg(Arg::new("description").long("description").short('d'))
                        .arg(Arg::new("amount").long("amount").short('a').help("Installment amount"))
                        .arg(Arg::new("category").long("category").short('c'))
                        .arg(Arg::new("purchase_date").long("purchase-date").value_name("YYYY-MM-DD"))
                        .arg(Arg::new("due_date").long("due-date").value_name("YYYY-MM-DD")),
                )
                .subcommand(Command::new("rm").arg(id_arg("Installment id"))),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("installments")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .required(true)
                                .help("csv or json"),
                        )
                        .arg(Arg::new("out").long("out").required(true))
                        .arg(month_arg()),
                ),
        )
        .subcommand(Command::new("doctor").about("Check the local database for inconsistencies"))
}
