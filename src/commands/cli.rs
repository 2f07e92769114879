//! Command-line argument definitions

use clap::{value_parser, Arg, ArgAction, Command as ClapCommand};

/// Build the argument parser shared by the binary and its tests
pub fn build_cli() -> ClapCommand {
    ClapCommand::new("SwathKit")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Maurice Schilpp")
        .about("Subset satellite swath scans into a binary interchange stream")
        .arg(
            Arg::new("inputs")
                .help("Scan files in ascending time order, or the stream to inspect")
                .value_name("FILE")
                .num_args(0..)
                .index(1),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .help("File listing scan files, one per line")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("bbox")
                .long("bbox")
                .help("Subset rectangle (lonmin,latmin,lonmax,latmax)")
                .value_name("BBOX")
                .allow_hyphen_values(true)
                .required(false),
        )
        .arg(
            Arg::new("corners")
                .long("corners")
                .help("Emit the four corner coordinates of every pixel")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("aggregate")
                .long("aggregate")
                .help("Emit daily mean composites instead of individual scans")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("valid-range")
                .long("valid-range")
                .help("Accepted value range (e.g., '0,5')")
                .value_name("MIN,MAX")
                .allow_hyphen_values(true)
                .required(false),
        )
        .arg(
            Arg::new("degeneracy")
                .long("degeneracy")
                .help("Treatment of implausible corners (collapse, coincident[:tolerance])")
                .value_name("POLICY")
                .required(false),
        )
        .arg(
            Arg::new("description")
                .long("description")
                .help("Description line of the stream header")
                .value_name("TEXT")
                .required(false),
        )
        .arg(
            Arg::new("timesteps")
                .long("timesteps")
                .help("Timestep count of the stream header")
                .value_name("COUNT")
                .value_parser(value_parser!(usize))
                .required(false),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output stream file (stdout if absent)")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML configuration file; flags override it")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("inspect")
                .short('i')
                .long("inspect")
                .help("Summarize an existing stream file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Write log records to this file as well as stderr")
                .value_name("FILE")
                .required(false),
        )
}
