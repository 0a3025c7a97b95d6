mod classifier;
mod cli;
mod db;
mod error;
mod fmt;
mod logging;
mod models;
mod processor;
mod progress;
mod propagator;
mod queue;
mod rules;
mod settings;
mod store;

use clap::Parser;

use cli::{AccountsCommands, Cli, Commands, RulesCommands};

fn main() {
    let cli = Cli::parse();
    logging::init(&settings::load_settings().log_level);

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Accounts { command } => match command {
            AccountsCommands::Add {
                code,
                name,
                nature,
                tag,
                note,
            } => cli::accounts::add(&code, &name, &nature, tag.as_deref(), note.as_deref()),
            AccountsCommands::List => cli::accounts::list(),
        },
        Commands::Rules { command } => match command {
            RulesCommands::AddKoreksi {
                keyword,
                value,
                exclusion,
            } => cli::rules::add_koreksi(&keyword, &value, exclusion.as_deref()),
            RulesCommands::AddObyek {
                keyword,
                value,
                exclusion,
            } => cli::rules::add_obyek(&keyword, &value, exclusion.as_deref()),
            RulesCommands::AddWht {
                keyword,
                tax_type,
                rate,
                priority,
            } => cli::rules::add_wht(&keyword, &tax_type, rate, priority),
            RulesCommands::AddKeyword {
                keyword,
                category,
                priority,
            } => cli::rules::add_keyword(&keyword, &category, priority),
            RulesCommands::List => cli::rules::list(),
            RulesCommands::Delete { kind, id } => cli::rules::delete(kind, id),
        },
        Commands::Demo => cli::demo::run(),
        Commands::Batches => cli::batches::list(),
        Commands::Process { batch_ids } => cli::process::run(&batch_ids),
        Commands::Cancel { batch_id } => cli::process::cancel(batch_id),
        Commands::Status { batch_id } => cli::status::run(batch_id),
        Commands::Propagate { batch_id } => cli::process::propagate(batch_id),
        Commands::Rows { batch_id, errors } => cli::batches::rows(batch_id, errors),
        Commands::Label {
            row_id,
            koreksi,
            obyek,
        } => cli::batches::label(row_id, koreksi.as_deref(), obyek.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
