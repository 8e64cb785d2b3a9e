//! Command-line front end.
//!
//! Each command navigates to the matching screen through [`App::navigate`], so the same
//! session gate guards the terminal and every other front end. Commands other than
//! `signup` and `help` sign in first with `COSTBOOK_EMAIL` and `COSTBOOK_PASSWORD`.

use crate::{
    app::{App, Screen},
    core::report::{format_brl, format_date, format_summary_line},
    errors::{Error, Result},
    session::{IdentityProvider, UserIdentity},
};
use std::{env, path::Path};
use tracing::debug;

const EMAIL_VAR: &str = "COSTBOOK_EMAIL";
const PASSWORD_VAR: &str = "COSTBOOK_PASSWORD";

/// Runs one command. `args` excludes the program name.
pub async fn run<P: IdentityProvider>(app: &App<P>, args: &[String]) -> Result<()> {
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };

    match command.as_str() {
        "signup" => cli_signup(app).await,
        "search" => cli_search(app, args.get(1).map_or("", String::as_str)).await,
        "import" => {
            let path = args.get(1).ok_or_else(|| Error::Usage {
                message: "Usage: costbook import <file.csv>".to_string(),
            })?;
            cli_import(app, Path::new(path)).await
        }
        "report" => cli_report(app).await,
        "budgets" => cli_budgets(app).await,
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("costbook {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            Err(Error::Usage {
                message: format!("Unknown command: {other}"),
            })
        }
    }
}

fn print_usage() {
    println!("Costbook - construction budget estimator");
    println!();
    println!("Usage: costbook <command>");
    println!();
    println!("Commands:");
    println!("  signup                  Create an account from {EMAIL_VAR}/{PASSWORD_VAR}");
    println!("  search [term]           Search the price database by code or description");
    println!("  import <file.csv>       Import a price list");
    println!("  budgets                 List your budgets, newest first");
    println!("  report                  Print the budget report");
    println!("  --help, -h              Show this help");
    println!("  --version, -V           Show version");
}

fn credentials() -> Result<(String, String)> {
    let email = env::var(EMAIL_VAR).map_err(|_| Error::AuthRequired)?;
    let password = env::var(PASSWORD_VAR).map_err(|_| Error::AuthRequired)?;
    Ok((email, password))
}

async fn sign_in<P: IdentityProvider>(app: &App<P>) -> Result<UserIdentity> {
    let (email, password) = credentials()?;
    app.gate.sign_in(&email, &password).await
}

/// Navigates to `path`, mapping a redirect to [`Error::AuthRequired`].
async fn open<P: IdentityProvider>(app: &App<P>, path: &str) -> Result<Screen> {
    match app.navigate(path).await? {
        Screen::Redirect(target) => {
            debug!(%target, "Navigation redirected");
            Err(Error::AuthRequired)
        }
        screen => Ok(screen),
    }
}

async fn cli_signup<P: IdentityProvider>(app: &App<P>) -> Result<()> {
    let (email, password) = credentials()?;
    let user = app.gate.sign_up(&email, &password).await?;
    println!("Signed up as {} ({})", user.email, user.id);
    Ok(())
}

async fn cli_search<P: IdentityProvider>(app: &App<P>, term: &str) -> Result<()> {
    sign_in(app).await?;
    let Screen::PriceDatabase(mut view) = open(app, "/price-database").await? else {
        return Err(Error::AuthRequired);
    };

    view.search(term).await?;
    for item in view.items() {
        println!(
            "{:<12} {:<40} {:<6} {:>14}  {} {}",
            item.code,
            item.description,
            item.unit,
            format_brl(item.price),
            item.source,
            item.reference_date.format("%m/%Y")
        );
    }
    println!("{} item(s)", view.items().len());
    Ok(())
}

async fn cli_import<P: IdentityProvider>(app: &App<P>, path: &Path) -> Result<()> {
    sign_in(app).await?;
    let Screen::PriceDatabase(mut view) = open(app, "/price-database").await? else {
        return Err(Error::AuthRequired);
    };

    view.import_file(path).await?;
    if let Some(notice) = view.notice() {
        println!("{notice}");
    }
    Ok(())
}

async fn cli_budgets<P: IdentityProvider>(app: &App<P>) -> Result<()> {
    sign_in(app).await?;
    let Screen::Dashboard(view) = open(app, "/").await? else {
        return Err(Error::AuthRequired);
    };

    if let Some(alert) = view.alert() {
        eprintln!("{alert}");
    }
    if view.budgets().is_empty() {
        println!("No budgets yet.");
    }
    for budget in view.budgets() {
        println!(
            "#{:<5} {:<30} {:>16}  {}",
            budget.id,
            budget.title,
            format_brl(budget.total_value),
            format_date(&budget.created_at)
        );
    }
    Ok(())
}

async fn cli_report<P: IdentityProvider>(app: &App<P>) -> Result<()> {
    sign_in(app).await?;
    let Screen::Reports(view) = open(app, "/reports").await? else {
        return Err(Error::AuthRequired);
    };

    if let Some(alert) = view.alert() {
        eprintln!("{alert}");
    }
    for summary in view.summaries() {
        println!("{}", format_summary_line(summary));
        println!("    with BDI: {}", format_brl(summary.total_with_bdi()));
    }
    Ok(())
}
