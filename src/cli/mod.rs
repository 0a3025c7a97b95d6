pub mod accounts;
pub mod batches;
pub mod demo;
pub mod init;
pub mod process;
pub mod rules;
pub mod status;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use crate::models::BatchStatus;

/// Status text coloured the way every batch listing shows it.
pub(crate) fn status_label(status: BatchStatus) -> String {
    match status {
        BatchStatus::Uploaded => status.as_str().normal().to_string(),
        BatchStatus::Processing => status.as_str().yellow().to_string(),
        BatchStatus::Completed => status.as_str().green().to_string(),
        BatchStatus::Failed => status.as_str().red().to_string(),
        BatchStatus::Canceled => status.as_str().dimmed().to_string(),
    }
}

#[derive(Parser)]
#[command(
    name = "jurnal",
    about = "Classify journal lines into tax-correction labels and tax buckets."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for jurnal data (default: ~/Documents/jurnal)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Manage the chart of accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Manage classification rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Load sample accounts, rules and a batch to explore jurnal.
    Demo,
    /// List uploaded batches.
    Batches,
    /// Classify a batch (or several, in parallel) and propagate by document number.
    Process {
        /// Batch IDs to process
        #[arg(required = true, num_args = 1..)]
        batch_ids: Vec<i64>,
    },
    /// Cancel a batch that has not finished yet.
    Cancel {
        batch_id: i64,
    },
    /// Show a batch's status and progress.
    Status {
        batch_id: i64,
    },
    /// Re-run document-number propagation for a batch.
    Propagate {
        batch_id: i64,
    },
    /// Show the classified rows of a batch.
    Rows {
        batch_id: i64,
        /// Only rows that failed classification
        #[arg(long)]
        errors: bool,
    },
    /// Override the koreksi/obyek labels of a single row.
    Label {
        row_id: i64,
        /// Koreksi label (omit to clear)
        #[arg(long)]
        koreksi: Option<String>,
        /// Obyek label (omit to clear)
        #[arg(long)]
        obyek: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Add an account.
    Add {
        /// Account code, e.g. '2140'
        code: String,
        /// Account name, e.g. 'Utang PPh 21'
        name: String,
        /// Account nature, e.g. 'Liability'
        #[arg(long, default_value = "")]
        nature: String,
        /// Tax tag, e.g. 'Wth 21 Cr', 'PK Cr', 'PM DB'
        #[arg(long)]
        tag: Option<String>,
        /// Additional-analysis note copied onto the account's rows
        #[arg(long)]
        note: Option<String>,
    },
    /// List active accounts.
    List,
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// Add a koreksi (fiscal correction) rule.
    AddKoreksi {
        /// Keyword matched against descriptions
        keyword: String,
        /// Label assigned on match
        value: String,
        /// Label recorded as the rule's exclusion value
        #[arg(long)]
        exclusion: Option<String>,
    },
    /// Add an obyek (tax object) rule.
    AddObyek {
        keyword: String,
        value: String,
        /// Label recorded as the rule's exclusion value
        #[arg(long)]
        exclusion: Option<String>,
    },
    /// Add a withholding tax rule.
    AddWht {
        keyword: String,
        /// wth_21, wth_23, wth_26, wth_4_2 or wth_15
        #[arg(long = "tax-type")]
        tax_type: String,
        /// Rate as a fraction, e.g. 0.02
        #[arg(long)]
        rate: f64,
        #[arg(long, default_value_t = 0)]
        priority: i64,
    },
    /// Add an input/output tax keyword.
    AddKeyword {
        keyword: String,
        /// input_tax or output_tax
        #[arg(long)]
        category: String,
        #[arg(long, default_value_t = 0)]
        priority: i64,
    },
    /// List active rules.
    List,
    /// Deactivate a rule.
    Delete {
        #[arg(value_enum)]
        kind: RuleKind,
        id: i64,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RuleKind {
    Koreksi,
    Obyek,
    Wht,
    Keyword,
}

impl RuleKind {
    pub fn table(&self) -> &'static str {
        match self {
            Self::Koreksi => "koreksi_rules",
            Self::Obyek => "obyek_rules",
            Self::Wht => "withholding_tax_rules",
            Self::Keyword => "tax_keywords",
        }
    }
}
