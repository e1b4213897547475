// CLI module
// Command-line interface, argument parsing and command dispatch

mod args;

pub use args::{CliArgs, Command};

use crate::core::{Ledger, Store};
use crate::io::{write_page, write_record, write_records};
use crate::types::{CoinUpdate, ExternalId, LedgerError, NewCoin, Submission, Submitted, User};
use clap::Parser;
use serde::Serialize;
use std::io::Write;

/// Parse command-line arguments using clap
///
/// If parsing fails (invalid arguments, missing subcommand, or --help), clap
/// displays an error message or help text and exits the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

/// Open the configured database and run one command against it
///
/// The result of the command is written to `output` as CSV.
pub async fn run(args: CliArgs, output: &mut dyn Write) -> Result<(), String> {
    let ledger = Ledger::open(&args.to_sqlite_config(), args.to_ledger_config())
        .await
        .map_err(|e| e.to_string())?;

    let result = execute(&ledger, args.caller, args.command, output).await;
    ledger.store().close().await;
    result
}

#[derive(Serialize)]
struct BalanceRow {
    coin_id: ExternalId,
    amount: u64,
}

/// Run one command against a ledger
pub async fn execute<S: Store>(
    ledger: &Ledger<S>,
    caller: Option<ExternalId>,
    command: Command,
    output: &mut dyn Write,
) -> Result<(), String> {
    match command {
        Command::Register { name } => {
            let user = ledger.register_user(&name).await.map_err(describe)?;
            write_record(&user, output)
        }
        Command::SearchUsers { term } => {
            let users = ledger.search_users(&term).await.map_err(describe)?;
            write_records(&users, output)
        }
        Command::ShowCoin { coin } => {
            let coin = ledger.get_coin(coin).await.map_err(describe)?;
            write_record(&coin, output)
        }
        command => {
            let caller = acting_user(ledger, caller).await?;
            execute_as(ledger, &caller, command, output).await
        }
    }
}

async fn execute_as<S: Store>(
    ledger: &Ledger<S>,
    caller: &User,
    command: Command,
    output: &mut dyn Write,
) -> Result<(), String> {
    let key = caller.key;

    match command {
        Command::CreateCoin { name, symbol } => {
            let coin = ledger
                .create_coin(key, &NewCoin { name, symbol })
                .await
                .map_err(describe)?;
            write_record(&coin, output)
        }
        Command::UpdateCoin { coin, name, symbol } => {
            let coin = ledger
                .update_coin(key, coin, &CoinUpdate { name, symbol })
                .await
                .map_err(describe)?;
            write_record(&coin, output)
        }
        Command::Issue {
            coin,
            recipient,
            amount,
            message,
        } => {
            let record = ledger
                .issue(key, coin, recipient, amount, message.unwrap_or_default())
                .await
                .map_err(describe)?;
            write_record(&record, output)
        }
        Command::Send {
            coin,
            target,
            amount,
            message,
            charge,
        } => {
            let submission = Submission {
                target,
                coin,
                amount,
                message: message.unwrap_or_default(),
                charging: charge,
            };
            match ledger.submit(key, submission).await.map_err(describe)? {
                Submitted::Transferred(record) => write_record(&record, output),
                Submitted::Requested(request) => write_record(&request, output),
            }
        }
        Command::Accept { request } => {
            let record = ledger
                .accept_request(key, request)
                .await
                .map_err(describe)?;
            write_record(&record, output)
        }
        Command::Decline { request } => {
            ledger
                .decline_request(key, request)
                .await
                .map_err(describe)
        }
        Command::Entries => {
            let holdings = ledger.list_entries(key).await.map_err(describe)?;
            write_records(&holdings, output)
        }
        Command::Balance { coin } => {
            let amount = ledger.balance(key, coin).await.map_err(describe)?;
            write_record(&BalanceRow { coin_id: coin, amount }, output)
        }
        Command::Transactions { cursor } => {
            let page = ledger
                .search_transactions(key, cursor)
                .await
                .map_err(describe)?;
            write_page(&page, output)
        }
        Command::Requests { cursor } => {
            let page = ledger
                .search_requests(key, cursor)
                .await
                .map_err(describe)?;
            write_page(&page, output)
        }
        Command::ShowTransaction { transaction } => {
            let record = ledger
                .get_transaction(key, transaction)
                .await
                .map_err(describe)?;
            write_record(&record, output)
        }
        Command::Roles => {
            let roles = ledger.list_roles(key).await.map_err(describe)?;
            write_records(&roles, output)
        }
        Command::AddRole { coin, name, level } => {
            let role = ledger
                .add_role(key, coin, &name, level)
                .await
                .map_err(describe)?;
            write_record(&role, output)
        }
        Command::AssignRole { coin, user, role } => {
            let role = ledger
                .assign_role(key, coin, user, role)
                .await
                .map_err(describe)?;
            write_record(&role, output)
        }
        Command::SetPermission {
            coin,
            action,
            level,
        } => ledger
            .set_permission(key, coin, action, level)
            .await
            .map_err(describe),
        Command::Register { .. } | Command::SearchUsers { .. } | Command::ShowCoin { .. } => {
            Err("command does not take an acting user".to_string())
        }
    }
}

async fn acting_user<S: Store>(
    ledger: &Ledger<S>,
    caller: Option<ExternalId>,
) -> Result<User, String> {
    let account_id = caller.ok_or_else(|| "this command requires --as <ACCOUNT_ID>".to_string())?;
    ledger.resolve_user(account_id).await.map_err(describe)
}

fn describe(error: LedgerError) -> String {
    error.to_string()
}
