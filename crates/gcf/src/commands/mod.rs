pub mod record;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle record files
    Record {
        #[command(subcommand)]
        command: record::RecordCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Record { command } => command.handle(),
        }
    }
}
