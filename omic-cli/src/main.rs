mod picking;

use anyhow::Result;
use clap::Command;
use env_logger::Env;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "omic";
    pub const BIN_NAME: &str = "omic";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Tools for combining somatic variant calls from several callers into one call set.")
        .subcommand_required(true)
        .subcommand(picking::cli::create_picking_cli())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // CONSENSUS VARIANT PICKING
        //
        Some((picking::cli::PICKING_CMD, matches)) => {
            picking::handlers::run_picking(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
