use clap::{Arg, ArgAction, Command, value_parser};

pub const PICKING_CMD: &str = "picking";

/// Named caller flags, in the priority order used to pick the record
/// written for a variant several callers agree on.
pub const CALLER_FLAGS: [&str; 7] = [
    "mutect2",
    "haplotype-caller",
    "muse",
    "lofreq",
    "varscan",
    "vardict",
    "somatic-sniper",
];

pub fn create_picking_cli() -> Command {
    let mut cmd = Command::new(PICKING_CMD)
        .about("Pick consensus variants supported by a minimum number of variant callers. Outputs VCF with SUPPORT and CALLERS annotations.")
        .arg_required_else_help(true)
        .arg(
            Arg::new("ref-fa")
                .short('r')
                .long("ref-fa")
                .required(true)
                .help("Reference genome fasta(.gz) or .fai; defines contig order of the output"),
        )
        .arg(
            Arg::new("output-vcf")
                .short('o')
                .long("output-vcf")
                .required(true)
                .help("Path to the output vcf(.gz) file"),
        );

    for caller in CALLER_FLAGS {
        cmd = cmd.arg(
            Arg::new(caller)
                .long(caller)
                .required(false)
                .help(format!("Path to the {} vcf(.gz) file", caller)),
        );
    }

    cmd.arg(
        Arg::new("source")
            .long("source")
            .action(ArgAction::Append)
            .value_name("NAME=PATH")
            .help("Additional caller vcf(.gz), ranked after the named callers, in the order given"),
    )
    .arg(
        Arg::new("vcf")
            .long("vcf")
            .action(ArgAction::Append)
            .value_name("PATH")
            .help("Additional caller vcf(.gz) named after its file, ranked after --source"),
    )
    .arg(
        Arg::new("min-snv-callers")
            .long("min-snv-callers")
            .value_parser(value_parser!(i64))
            .allow_negative_numbers(true)
            .help("Min number of variant callers for an SNV to be picked [default: 1]"),
    )
    .arg(
        Arg::new("min-indel-callers")
            .long("min-indel-callers")
            .value_parser(value_parser!(i64))
            .allow_negative_numbers(true)
            .help("Min number of variant callers for an indel to be picked [default: 1]"),
    )
    .arg(
        Arg::new("config")
            .long("config")
            .help("TOML file with picking settings; command line values take precedence"),
    )
    .arg(
        Arg::new("threads")
            .short('t')
            .long("threads")
            .value_parser(value_parser!(usize))
            .help("Number of threads used to read the caller vcfs"),
    )
}
