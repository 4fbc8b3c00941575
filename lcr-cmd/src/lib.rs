//! Command implementations for the LCR CLI.
//!
//! Loads exported source data into an in-memory database, runs the
//! apportionment model for one scenario or compares several.

use clap::Subcommand;

pub mod compare;
pub mod run;
pub mod scenario;

#[derive(Subcommand)]
pub enum Command {
    /// Run one scenario and print its apportionment tables
    Run {
        /// Headerless `key,year,value` CSV of annual volumes (AF)
        #[arg(short = 'a', long)]
        annual_csv: String,

        /// Headerless `key,date,value` CSV of daily readings
        #[arg(short = 'd', long)]
        daily_csv: Option<String>,

        /// JSON file of model options (unset options are off)
        #[arg(short = 'o', long)]
        options: Option<String>,

        /// JSON file overriding loss constants
        #[arg(short = 'l', long)]
        losses: Option<String>,

        /// First year of the run
        #[arg(short = 'b', long, default_value_t = 2016)]
        begin: i32,

        /// Last year of the run
        #[arg(short = 'e', long, default_value_t = 2021)]
        end: i32,

        /// First month of the water year (1 for calendar years)
        #[arg(short = 'w', long, default_value_t = 10)]
        water_year_month: u32,

        /// Print the summary as JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Run several named scenarios over the same data and compare state totals
    Compare {
        /// Headerless `key,year,value` CSV of annual volumes (AF)
        #[arg(short = 'a', long)]
        annual_csv: String,

        /// Headerless `key,date,value` CSV of daily readings
        #[arg(short = 'd', long)]
        daily_csv: Option<String>,

        /// JSON list of `{name, options, losses}`; the built-in set when omitted
        #[arg(short = 's', long)]
        scenarios: Option<String>,

        /// First year of the run
        #[arg(short = 'b', long, default_value_t = 2016)]
        begin: i32,

        /// Last year of the run
        #[arg(short = 'e', long, default_value_t = 2021)]
        end: i32,

        /// First month of the water year (1 for calendar years)
        #[arg(short = 'w', long, default_value_t = 10)]
        water_year_month: u32,

        /// Print the summaries as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Run {
            annual_csv,
            daily_csv,
            options,
            losses,
            begin,
            end,
            water_year_month,
            json,
        } => run::run_scenario(
            &annual_csv,
            daily_csv.as_deref(),
            options.as_deref(),
            losses.as_deref(),
            begin,
            end,
            water_year_month,
            json,
        ),
        Command::Compare {
            annual_csv,
            daily_csv,
            scenarios,
            begin,
            end,
            water_year_month,
            json,
        } => compare::run_compare(
            &annual_csv,
            daily_csv.as_deref(),
            scenarios.as_deref(),
            begin,
            end,
            water_year_month,
            json,
        ),
    }
}
