use clap::Parser;
use mixsim::{
    cli::{init_verbose, Cli, Command, FULL_VERSION},
    commands::{catalog, ce, loci, ngs},
    utils::{handle_error_and_exit, Result},
};

fn runner() -> Result<()> {
    let cli = Cli::parse();
    init_verbose(&cli);
    let subcommand_name = match cli.command {
        Command::Ce(_) => "ce",
        Command::Ngs(_) => "ngs",
        Command::Catalog(_) => "catalog",
        Command::Loci(_) => "loci",
    };

    log::info!(
        "Running {}-{} [{}]",
        env!("CARGO_PKG_NAME"),
        *FULL_VERSION,
        subcommand_name
    );
    match cli.command {
        Command::Ce(args) => ce::ce(args)?,
        Command::Ngs(args) => ngs::ngs(args)?,
        Command::Catalog(args) => catalog::catalog(args)?,
        Command::Loci(args) => loci::loci(args)?,
    }
    log::info!("{} end", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        handle_error_and_exit(e);
    }
}
