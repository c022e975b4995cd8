// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use chrono::Local;
use std::env;
use std::fmt::Display;
use tracing_subscriber::EnvFilter;

use tally_book::{
    pie_slices, summary_line, Config, ContactStore, ExpenseLedger, EMPTY_CHART_MESSAGE,
};

const USAGE: &str = "\
Usage:
  tally-book                                   open the dashboard
  tally-book contacts list [QUERY]
  tally-book contacts show NAME
  tally-book contacts find NUMBER
  tally-book contacts add NAME NUMBER
  tally-book contacts append NAME NUMBER
  tally-book expenses add NAME AMOUNT CATEGORY
  tally-book expenses list
  tally-book expenses summary";

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let config = Config::from_env();

    match args.as_slice() {
        [] => run_ui_mode(&config)?,
        ["contacts", rest @ ..] => run_contacts(&config, rest)?,
        ["expenses", rest @ ..] => run_expenses(&config, rest)?,
        ["help"] | ["--help"] | ["-h"] => println!("{}", USAGE),
        _ => bail!("unrecognized command\n\n{}", USAGE),
    }

    Ok(())
}

/// Logs go to stderr so they never mix with command output or the dashboard
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_contacts(config: &Config) -> Result<ContactStore> {
    ContactStore::open(config.contacts_path()).context("Failed to open contact book")
}

fn open_ledger(config: &Config) -> Result<ExpenseLedger> {
    ExpenseLedger::open(&config.expense_db_path(), config.expense_backup_path())
        .context("Failed to open expense ledger")
}

/// Bad input is reported and exits with status 2; storage failures propagate
fn reject_invalid(message: impl Display) -> ! {
    eprintln!("❌ {}", message);
    std::process::exit(2);
}

fn run_contacts(config: &Config, args: &[&str]) -> Result<()> {
    let mut store = open_contacts(config)?;

    match args {
        ["list", rest @ ..] => {
            let query = rest.first().copied().unwrap_or("");
            let names = store.search_by_name(query);
            if names.is_empty() {
                println!("No contacts match '{}'", query);
            }
            for name in names {
                println!("{}", name);
            }
        }
        ["show", name] => match store.numbers(name) {
            Some(numbers) => {
                println!("Name: {}", name);
                println!("Numbers:");
                for number in numbers {
                    println!("  {}", number);
                }
            }
            None => bail!("no contact named '{}'", name),
        },
        ["find", number] => match store.search_by_number(number) {
            Some(name) => println!("📞 {} belongs to {}", number, name),
            None => {
                println!("❌ {} not found", number);
                println!("   Add it with: tally-book contacts add NAME {}", number);
                println!("   Or append it: tally-book contacts append NAME {}", number);
            }
        },
        ["add", name, number] => match store.add_contact(name, number) {
            Ok(()) => println!("✓ Contact '{}' added", name),
            Err(e) if e.is_validation() => reject_invalid(e),
            Err(e) => return Err(e).context("Failed to save contact"),
        },
        ["append", name, number] => match store.append_number(name, number) {
            Ok(()) => println!("✓ Number added to '{}'", name),
            Err(e) if e.is_validation() => reject_invalid(e),
            Err(e) => return Err(e).context("Failed to save contact"),
        },
        _ => bail!("unrecognized contacts command\n\n{}", USAGE),
    }

    Ok(())
}

fn run_expenses(config: &Config, args: &[&str]) -> Result<()> {
    let mut ledger = open_ledger(config)?;

    match args {
        ["add", name, amount, category] => {
            let today = Local::now().date_naive();
            match ledger.add_expense(name, amount, category, today) {
                Ok(id) => println!("✓ Expense #{} recorded", id),
                Err(e) if e.is_validation() => reject_invalid(e),
                Err(e) => return Err(e).context("Failed to record expense"),
            }
        }
        ["list"] => {
            let records = ledger.list_all()?;
            println!("{:<5} {:<24} {:>10}  {:<15} {}", "ID", "Name", "Amount", "Category", "Date");
            for r in &records {
                println!(
                    "{:<5} {:<24} {:>10}  {:<15} {}",
                    r.id,
                    r.name,
                    format!("{}{:.2}", config.currency, r.amount),
                    r.category,
                    r.date
                );
            }
            println!("\n{} expenses", records.len());
        }
        ["summary"] => {
            let totals = ledger.aggregate_by_category()?;
            println!("{}", summary_line(&totals, &config.currency));

            let slices = pie_slices(&totals);
            if slices.is_empty() {
                println!("{}", EMPTY_CHART_MESSAGE);
            }
            for slice in slices {
                println!("  {}", slice.label());
            }
        }
        _ => bail!("unrecognized expenses command\n\n{}", USAGE),
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    println!("🖥️  Loading Tally Book...\n");

    let contacts = open_contacts(config)?;

    // The contacts page stays usable when the ledger cannot be opened
    let ledger = ExpenseLedger::open(&config.expense_db_path(), config.expense_backup_path());
    if let Err(e) = &ledger {
        tracing::warn!("Expense ledger unavailable: {}", e);
    }

    let mut app = ui::App::new(contacts, ledger, config.currency.clone())?;
    ui::run_ui(&mut app)?;

    println!("\n✅ Dashboard closed");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    eprintln!("❌ Dashboard not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the command line:\n\n{}", USAGE);
    std::process::exit(1);
}
