use super::args::{Cli, Command};

pub mod check;
pub mod drift;
pub mod golden;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Check(args) => check::run(args, &cli.config),
        Command::Golden(args) => golden::run(args, &cli.config),
        Command::Drift(args) => drift::run(args, &cli.config),
    }
}
