use anyhow::{Context, Result};
use clap::{App, Arg, ArgMatches};
use inkpost::build::publish_blog;
use inkpost::config::{Config, SortOrder};
use inkpost::template::Templates;
use std::path::{Path, PathBuf};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = App::new("inkpost")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Publishes the most recent blog posts and updates listings, feeds and the root page")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .takes_value(true)
                .help("Project file (default: inkpost.yaml in this or a parent directory)"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .help("Directory to write files to"),
        )
        .arg(
            Arg::with_name("recent")
                .short("r")
                .long("recent")
                .takes_value(true)
                .help("Number of posts considered recent"),
        )
        .arg(
            Arg::with_name("by-time")
                .long("by-time")
                .conflicts_with("by-name")
                .help("Order posts by file creation time"),
        )
        .arg(
            Arg::with_name("by-name")
                .long("by-name")
                .help("Order posts by file name"),
        )
        .get_matches();

    if let Err(e) = run(&matches) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let mut config = match matches.value_of("config") {
        Some(path) => Config::from_project_file(Path::new(path))?,
        None => Config::from_directory(&std::env::current_dir()?)?,
    };

    if let Some(output) = matches.value_of("output") {
        config.output_directory = PathBuf::from(output);
    }
    if let Some(recent) = matches.value_of("recent") {
        config.recent_count = recent
            .parse()
            .with_context(|| format!("Invalid recent count `{}`", recent))?;
    }
    if matches.is_present("by-time") {
        config.sort = SortOrder::Time;
    } else if matches.is_present("by-name") {
        config.sort = SortOrder::Name;
    }

    let config = config.validated()?;

    let templates = Templates::new(&config.template_directory);
    publish_blog(&config, &templates)?;
    Ok(())
}
