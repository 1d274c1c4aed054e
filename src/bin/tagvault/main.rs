use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use log::error;

mod cli;
mod cmd_dump;
mod cmd_format;
mod cmd_init;
mod cmd_read;
mod cmd_status;
mod cmd_write;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт — info.
    // Пример: RUST_LOG=debug ./tagvault read --image card.tv1
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        error!("{:?}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Init { image } => cmd_init::exec(image),

        cli::Cmd::Read { image, json } => cmd_read::exec(image, json),

        cli::Cmd::Write {
            image,
            patch,
            field_one,
            field_two,
            field_three,
            field_four,
            field_five,
            field_six,
            field_seven,
            template_one,
            template_two,
        } => cmd_write::exec(cmd_write::Args {
            image,
            patch,
            field_one,
            field_two,
            field_three,
            field_four,
            field_five,
            field_six,
            field_seven,
            template_one,
            template_two,
        }),

        cli::Cmd::Format { image } => cmd_format::exec(image),

        cli::Cmd::Dump { image } => cmd_dump::exec(image),

        cli::Cmd::Status { image, json } => cmd_status::exec(image, json),
    }
}
