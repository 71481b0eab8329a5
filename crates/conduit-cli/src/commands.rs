use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a copy job described by a TOML config file.
    Run {
        #[arg(long)]
        config: String,

        #[arg(long)]
        consumers: Option<usize>,

        #[arg(long)]
        chunk_size: Option<usize>,
    },
}
