use crate::options::sub_command::Commands;
use clap::Parser;

/// program to swarm a tab server with simulated participants.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Build main sub commands
    #[clap(subcommand)]
    pub command: Commands,
    /// Print simulator activity on standard output
    #[clap(short, long, global = true)]
    pub verbose: bool,
}
