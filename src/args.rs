// Argument parsing via clap.
//
// Note that you probably want to keep this as a single file so the build script doesn't
// trip all over itself. It is pulled in with `include!`, so no inner doc comments here.

use clap::*;
use indoc::indoc;

const TEMPLATE: &str = indoc! {
    "{name} {version}

    {about}

    {usage-heading} {usage}

    {all-args}"
};

const USAGE: &str = "memstat [OPTIONS]";

const VERSION: &str = match option_env!("NIGHTLY_VERSION") {
    Some(nightly_version) => nightly_version,
    None => crate_version!(),
};

/// The arguments for memstat.
#[derive(Parser, Debug)]
#[command(
    name = crate_name!(),
    version = VERSION,
    about = crate_description!(),
    disable_help_flag = true,
    disable_version_flag = true,
    color = ColorChoice::Auto,
    help_template = TEMPLATE,
    override_usage = USAGE,
)]
pub struct Args {
    #[command(flatten)]
    pub sampler_args: SamplerArgs,

    #[command(flatten)]
    pub other_args: OtherArgs,
}

impl Args {
    /// Parses the arguments from the environment.
    pub fn from_env() -> Self {
        Args::parse()
    }
}

#[derive(Args, Clone, Debug, Default)]
#[command(next_help_heading = "Sampler Options")]
pub struct SamplerArgs {
    #[arg(
        short = 'C',
        long = "config_location",
        value_name = "PATH",
        help = "Sets the location of the config file.",
        long_help = "Sets the location of the config file. Expects a config file in the TOML format. \
                    Unlike the default location, a file given here must exist."
    )]
    pub config_location: Option<String>,

    #[arg(
        short = 'n',
        long,
        value_name = "COUNT",
        help = "Stops after this many collection cycles.",
        long_help = "Stops after this many collection cycles, successful or not. If not set, or set \
                    to 0, memstat samples until it is stopped."
    )]
    pub count: Option<u64>,

    #[arg(
        long = "list_fields",
        help = "Lists every metric memstat can report, then exits.",
        long_help = "Lists every metric memstat can report alongside its unit and legacy alias, \
                    then exits without collecting anything."
    )]
    pub list_fields: bool,

    #[arg(
        long = "log_file",
        value_name = "PATH",
        help = "Writes debug logs to a file.",
        long_help = "Writes debug logs to a file. Only has an effect if memstat was built with the \
                    'logging' feature."
    )]
    pub log_file: Option<String>,

    #[arg(
        long,
        value_name = "PREFIX",
        help = "Sets the prefix prepended to every metric name.",
        long_help = "Sets the prefix prepended to every metric name. Must be made of ASCII letters, \
                    digits, underscores, and colons, and must not start with a digit. Defaults to \
                    'node_memory_'."
    )]
    pub prefix: Option<String>,

    #[arg(
        short = 'r',
        long,
        value_name = "TIME",
        help = "Sets how often memory statistics are collected.",
        long_help = "Sets how often memory statistics are collected. Takes a number in milliseconds \
                    or a human duration (e.g. 5s). The minimum is 250ms, and the default is 5s."
    )]
    pub rate: Option<String>,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Other Options")]
pub struct OtherArgs {
    #[arg(short='h', long, action=ArgAction::Help, help="Prints help info (for more details use `--help`.")]
    help: (),

    #[arg(short='V', long, action=ArgAction::Version, help="Prints version information.")]
    version: (),
}

/// Returns a [`Command`] based off of [`Args`].
pub fn build_cmd() -> Command {
    Args::command()
}
