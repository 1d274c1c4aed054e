use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI для TagVault: транзакции против файлового образа карты.
#[derive(Parser, Debug)]
#[command(name = "tagvault", version, about = "TagVault card vault CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Create a blank 1K card image (factory trailers, zeroed data)
    Init {
        #[arg(long)]
        image: PathBuf,
    },
    /// Run a read transaction and print the decoded record
    Read {
        #[arg(long)]
        image: PathBuf,
        /// JSON output (single object)
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run a write transaction with a sparse patch
    ///
    /// Патч собирается либо из JSON-файла (--patch, поля как в выводе
    /// `read --json`, шаблоны base64), либо из отдельных флагов.
    /// Отсутствующие поля на карте не трогаются.
    Write {
        #[arg(long)]
        image: PathBuf,
        /// JSON file with a CardRecord patch (templates as base64)
        #[arg(long)]
        patch: Option<PathBuf>,
        #[arg(long)]
        field_one: Option<String>,
        #[arg(long)]
        field_two: Option<String>,
        #[arg(long)]
        field_three: Option<String>,
        #[arg(long)]
        field_four: Option<String>,
        #[arg(long)]
        field_five: Option<String>,
        #[arg(long)]
        field_six: Option<String>,
        #[arg(long)]
        field_seven: Option<String>,
        /// Read template slot one bytes from a file
        #[arg(long)]
        template_one: Option<PathBuf>,
        /// Read template slot two bytes from a file
        #[arg(long)]
        template_two: Option<PathBuf>,
    },
    /// Zero every writable block (best-effort sweep)
    Format {
        #[arg(long)]
        image: PathBuf,
    },
    /// Hex dump of all blocks (trailers and field blocks marked)
    Dump {
        #[arg(long)]
        image: PathBuf,
    },
    /// Print layout, slot presence and metrics summary
    Status {
        #[arg(long)]
        image: PathBuf,
        /// JSON output (single object)
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}
