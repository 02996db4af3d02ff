use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use unit_converter_lib::shared::types::ConvertUnitsRequest;
use unit_converter_lib::{
    convert_units, get_categories, parse_text, units_for_category, Category, ConversionSession,
    ConvertOutcome, ConverterSettings,
};

#[derive(Parser)]
#[command(name = "unitconv")]
#[command(about = "Convert quantities between units", long_about = None)]
struct Cli {
    /// Settings file to use instead of the platform config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a value, e.g. `unitconv convert 1 m ft`
    Convert {
        #[arg(allow_negative_numbers = true)]
        value: f64,
        from: String,
        to: String,
        /// Category to resolve units in; inferred from the units when omitted
        #[arg(long)]
        category: Option<Category>,
    },
    /// List units, for one category or all of them
    Units { category: Option<Category> },
    /// Parse free text such as "12 km" or "2 km to miles"
    Parse {
        text: String,
        /// Convert the parsed quantity into this unit
        #[arg(long)]
        to: Option<String>,
    },
    /// Interactive conversion session
    Session {
        #[arg(long)]
        category: Option<Category>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn load_settings(path: Option<&PathBuf>) -> ConverterSettings {
    let loaded = match path {
        Some(path) => ConverterSettings::load_from(path).await,
        None => ConverterSettings::load().await,
    };
    loaded.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to default settings");
        ConverterSettings::default()
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_ref()).await;
    let format = settings.number_format();

    match cli.command {
        Commands::Convert { value, from, to, category } => {
            let response = convert_units(ConvertUnitsRequest {
                amount: value,
                from_unit: from,
                to_unit: to,
                category,
            })
            .context("conversion failed")?;
            println!(
                "{} {} = {} {}",
                format.format(value),
                response.from_unit,
                format.format(response.result),
                response.to_unit
            );
        }
        Commands::Units { category } => match category {
            Some(category) => {
                for unit in units_for_category(category) {
                    println!("{:<8} {}", unit.id, unit.label);
                }
            }
            None => {
                for category in get_categories() {
                    println!("{} ({})", category.label, category.key);
                    for unit in category.units {
                        println!("  {:<8} {}", unit.id, unit.label);
                    }
                }
            }
        },
        Commands::Parse { text, to } => {
            let parsed = parse_text(&text).context("could not parse quantity")?;
            println!("{} {} ({})", format.format(parsed.amount), parsed.unit, parsed.category);
            if let Some(target) = to.or(parsed.target_unit) {
                let response = convert_units(ConvertUnitsRequest {
                    amount: parsed.amount,
                    from_unit: parsed.unit,
                    to_unit: target,
                    category: None,
                })
                .context("conversion failed")?;
                println!("= {} {}", format.format(response.result), response.to_unit);
            }
        }
        Commands::Session { category } => {
            let category = category.unwrap_or(settings.preferences.default_category);
            run_session(ConversionSession::with_settings(category, &settings)).await?;
        }
    }

    Ok(())
}

async fn run_session(mut session: ConversionSession) -> Result<()> {
    print_help();
    print_units(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} [{} -> {}]> ", session.category_key(), session.from_unit().symbol, session.to_unit().symbol);
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let (command, argument) = match input.split_once(char::is_whitespace) {
            Some((command, argument)) => (command.to_lowercase(), argument.trim()),
            None => (input.to_lowercase(), ""),
        };

        let result = match command.as_str() {
            "quit" | "exit" => break,
            "help" => {
                print_help();
                Ok(())
            }
            "units" => {
                print_units(&session);
                Ok(())
            }
            "history" => {
                for line in session.history() {
                    println!("  {}", line);
                }
                Ok(())
            }
            "clear" => {
                session.clear_history();
                Ok(())
            }
            "swap" => session.swap().map(|_| print_display(&session)),
            "from" => session.set_from_unit(argument).map(|_| print_display(&session)),
            "to" => session.set_to_unit(argument).map(|_| print_display(&session)),
            "category" => match argument.parse::<Category>() {
                Ok(category) => {
                    session.set_category(category);
                    print_units(&session);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            _ => session.convert_input(input).map(|outcome| match outcome {
                ConvertOutcome::Converted(result) => println!("= {} {}", result.formatted, result.to),
                ConvertOutcome::InvalidInput(reason) => println!("{} ({})", session.display(), reason),
            }),
        };

        if let Err(e) = result {
            println!("error: {}", e);
        }
    }

    Ok(())
}

fn print_display(session: &ConversionSession) {
    let display = session.display();
    if !display.is_empty() {
        println!("= {} {}", display, session.to_unit().symbol);
    }
}

fn print_units(session: &ConversionSession) {
    let units: Vec<&str> = session.units().iter().map(|u| u.symbol.as_str()).collect();
    println!("units: {}", units.join(", "));
}

fn print_help() {
    println!("Enter a number to convert it. Commands:");
    println!("  from <unit>      set the source unit");
    println!("  to <unit>        set the target unit");
    println!("  swap             exchange source and target");
    println!("  category <name>  switch category");
    println!("  history          show recent conversions");
    println!("  clear            clear history");
    println!("  units            list units of the current category");
    println!("  help             show this help");
    println!("  quit             leave the session");
}
