//! Implementation of the `poml parse` command.

use super::read_markup;
use crate::cli::ParseArgs;
use poml::config::Config;
use poml::error::Result;
use poml::parser::parse;

/// Execute the `poml parse` command.
pub fn cmd_parse(args: ParseArgs, config: &Config) -> Result<()> {
    println!("{}", parse_to_markup(&args, config)?);
    Ok(())
}

/// Parse the file and return its canonical markup.
pub(super) fn parse_to_markup(args: &ParseArgs, config: &Config) -> Result<String> {
    let source = read_markup(&args.file)?;

    let mut options = config.parse_options();
    if args.lenient {
        options.strict_unknown_tags = false;
    }

    let document = parse(&source, &options)?;
    Ok(document.to_markup())
}
