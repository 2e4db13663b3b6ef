use super::VERSION;
use clap::{App, Arg};
use std::path::PathBuf;

/// Takes the CLI arguments that control the plotting of the sync intervals.
pub fn parse_cli() -> (PathBuf, PathBuf) {
    let arg_csvin = Arg::with_name("csv_file")
        .help("path to the chrony sync csv file")
        .required(true)
        .index(1);
    let arg_pngout = Arg::with_name("output_pngfile")
        .help("name of the output png file")
        .short("o")
        .long("pngfile")
        .takes_value(true);
    let cli_args = App::new("syncplot")
        .version(VERSION.unwrap_or("unknown"))
        .author("Arshad Mehmood")
        .about("cli app to plot the chrony synchronization intervals")
        .arg(arg_csvin)
        .arg(arg_pngout)
        .get_matches();
    let csvin = PathBuf::from(cli_args.value_of("csv_file").unwrap_or_default());
    let pngout = match cli_args.value_of("output_pngfile") {
        Some(p) => PathBuf::from(p),
        None => {
            let mut pngout = csvin.clone();
            pngout.set_extension("png");
            pngout
        }
    };
    return (csvin, pngout);
}
