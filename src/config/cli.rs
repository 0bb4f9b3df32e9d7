use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "laundry-ledger")]
#[command(about = "Record laundry orders from photos and keep a monthly ledger")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true, default_value = "laundry.toml")]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Extract an order from two photos, review it and save it
    Record(RecordArgs),
    /// Show the ledger grouped by month and service
    List,
    /// Show a single order
    Show {
        /// Order timestamp (milliseconds since epoch)
        timestamp: i64,
    },
    /// Correct the weight, customer or address of a saved order
    Amend {
        /// Order timestamp (milliseconds since epoch)
        timestamp: i64,

        /// Corrected weight (kg)
        #[arg(long)]
        weight: Option<String>,

        /// Corrected customer name
        #[arg(long)]
        customer: Option<String>,

        /// Corrected delivery address
        #[arg(long)]
        address: Option<String>,
    },
    /// Delete one or more orders
    Delete {
        /// Timestamps of the orders to delete
        #[arg(required = true)]
        timestamps: Vec<i64>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Write the ledger as CSV
    Export {
        /// Directory for the CSV file (overrides export.output_dir)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct RecordArgs {
    /// Laundry service name
    #[arg(short, long)]
    pub service: String,

    /// Photo of the scale
    #[arg(long)]
    pub weight_photo: PathBuf,

    /// Photo of the customer label
    #[arg(long)]
    pub customer_photo: PathBuf,

    /// Correct the extracted weight (kg)
    #[arg(long)]
    pub weight: Option<String>,

    /// Correct the extracted customer name
    #[arg(long)]
    pub customer: Option<String>,

    /// Correct the extracted delivery address
    #[arg(long)]
    pub address: Option<String>,

    /// Review only; do not save the order
    #[arg(long)]
    pub discard: bool,
}
