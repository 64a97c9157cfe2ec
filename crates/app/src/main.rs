use std::io::Write;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use engine::{
    Category, Currency, Expense, Location, OptimisticExpenses, PaidBy, Report, summarize,
};
use uuid::Uuid;

use crate::{
    error::Result,
    rates::load_rates,
    settings::{Overrides, Settings},
    state::LocalState,
    store::JsonFileStore,
};

mod error;
mod rates;
mod render;
mod settings;
mod state;
mod store;

#[derive(Parser, Debug)]
#[command(name = "financier")]
#[command(about = "Expense reports in a single base currency")]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    /// Report as of this day (YYYY-MM-DD) instead of today.
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dashboard: trend, countries, rolling totals and balance.
    Report {
        #[arg(long)]
        json: bool,
    },
    /// Who owes whom.
    Summary,
    /// Export expenses as CSV.
    Export {
        /// Output file, stdout when omitted.
        #[arg(long, short)]
        output: Option<String>,
    },
    /// Show the exchange rates in use.
    Rates {
        /// Ignore the cached table and fetch again.
        #[arg(long)]
        refresh: bool,
    },
    Add(AddArgs),
    Delete {
        id: Uuid,
    },
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(long)]
    date: NaiveDate,
    /// Last day covered, for stays and passes.
    #[arg(long)]
    end_date: Option<NaiveDate>,
    #[arg(long)]
    description: String,
    #[arg(long, default_value_t = Category::Other)]
    category: Category,
    #[arg(long)]
    total: f64,
    /// Defaults to the full total.
    #[arg(long)]
    share: Option<f64>,
    #[arg(long, default_value = "me")]
    paid_by: PaidBy,
    /// Defaults to the currency of the previous expense.
    #[arg(long)]
    currency: Option<Currency>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long, requires = "lng")]
    lat: Option<f64>,
    #[arg(long, requires = "lat")]
    lng: Option<f64>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    country_code: Option<String>,
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli.overrides)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "financier={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli, settings).await {
        tracing::error!("{err}");
        return Err(err.into());
    }
    Ok(())
}

async fn run(cli: Cli, settings: Settings) -> Result<()> {
    let base = settings.base_currency()?;
    let today = match cli.today {
        Some(day) => day,
        None => settings.today()?,
    };
    let mut state = LocalState::load(&settings.storage.state_path)?;
    let mut expenses = OptimisticExpenses::new(JsonFileStore::new(&settings.storage.expenses_path));

    match cli.command {
        Command::Report { json } => {
            let period = settings.period()?;
            let lookup = load_rates(&settings, &mut state, false).await?;
            let report = Report::build(
                expenses.load().await?,
                period.days(),
                base,
                &lookup.rates,
                today,
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render::report(&report));
            }
        }
        Command::Summary => {
            let lookup = load_rates(&settings, &mut state, false).await?;
            let summary = summarize(expenses.load().await?, base, &lookup.rates);
            print!("{}", render::summary(&summary, base));
        }
        Command::Export { output } => {
            let lookup = load_rates(&settings, &mut state, false).await?;
            let list = expenses.load().await?;
            match output {
                Some(path) => {
                    let file = std::fs::File::create(&path)?;
                    engine::export::write_csv(file, list, base, &lookup.rates)?;
                    tracing::info!("exported {} expenses to {path}", list.len());
                }
                None => {
                    let stdout = std::io::stdout().lock();
                    engine::export::write_csv(stdout, list, base, &lookup.rates)?;
                }
            }
        }
        Command::Rates { refresh } => {
            let lookup = load_rates(&settings, &mut state, refresh).await?;
            print!("{}", render::rates(&lookup, base));
        }
        Command::Add(args) => {
            let currency = args.currency.or(state.last_input_currency).unwrap_or(base);
            let expense = expense_from_args(args, currency);
            let id = expenses.add(expense).await?;
            state.last_input_currency = Some(currency);
            state.save(&settings.storage.state_path)?;
            tracing::info!("added expense {id}");
            println!("{id}");
        }
        Command::Delete { id } => {
            expenses.delete(id).await?;
            tracing::info!("deleted expense {id}");
        }
    }

    std::io::stdout().flush()?;
    Ok(())
}

fn expense_from_args(args: AddArgs, currency: Currency) -> Expense {
    let share = args.share.unwrap_or(args.total);
    let mut expense = Expense::new(args.date, args.description, args.total)
        .shared(args.total, share, args.paid_by)
        .categorized(args.category)
        .in_currency(currency);
    if let Some(end_date) = args.end_date {
        expense = expense.until(end_date);
    }
    expense.notes = args.notes;

    let has_location = args.lat.is_some() || args.country_code.is_some() || args.city.is_some();
    if has_location {
        expense = expense.located(Location {
            lat: args.lat.unwrap_or_default(),
            lng: args.lng.unwrap_or_default(),
            city: args.city,
            country_code: args.country_code.map(|code| code.trim().to_ascii_uppercase()),
            ..Location::default()
        });
    }
    expense
}
