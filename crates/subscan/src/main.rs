mod utils;

use clap::{value_parser, Arg, ArgAction, Command};
use std::path::{Path, PathBuf};
use std::time::Duration;
use subscan::model::{ensure_dir, export_to_json, export_to_markdown};
use subscan::scan::normalize_domain;
use subscan::{modules, Config, Error, Result, Scanner};
use time::OffsetDateTime;
use tracing::{error, info};
use utils::log::init_tracing_subscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    let cli = Command::new(clap::crate_name!())
        .version(clap::crate_version!())
        .subcommand(Command::new("sources").about("List all subdomain sources"))
        .subcommand(
            Command::new("scan")
                .about("Discover and verify the subdomains of a domain")
                .arg(
                    Arg::new("target")
                        .help("The domain name to scan")
                        .value_name("TARGET")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("threads")
                        .short('t')
                        .long("threads")
                        .help("Maximum number of concurrent verifications")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("retries")
                        .short('r')
                        .long("retries")
                        .help("Retries for failed source requests and DNS lookups")
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .help("Per request timeout in milliseconds")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("brute-force")
                        .long("brute-force")
                        .action(ArgAction::SetTrue)
                        .help("Enable wordlist enumeration (not implemented yet)"),
                )
                .arg(
                    Arg::new("wordlist")
                        .short('w')
                        .long("wordlist")
                        .value_name("FILE")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("logs")
                        .short('s')
                        .long("logs")
                        .action(ArgAction::SetTrue)
                        .help("Save logs into a .log file"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Output format")
                        .value_name("OUTPUT")
                        .value_parser(["json", "md", "both"])
                        .default_value("both"),
                ),
        )
        .arg_required_else_help(true)
        .get_matches();

    match cli.subcommand() {
        Some(("sources", _)) => modules::display_all(&config),
        Some(("scan", args)) => {
            let Some(target) = args.get_one::<String>("target") else {
                return Err(Error::CliUsage("Missing target".into()));
            };
            let target = &normalize_domain(target)?;

            // create filename
            let filename = OffsetDateTime::now_utc().unix_timestamp().to_string();

            // create output dir
            let output_dir = format!("output/subscan/{}", target);
            ensure_dir(output_dir.as_ref())?;

            init_tracing_subscriber(
                config.log_level,
                args.get_flag("logs"),
                output_dir.as_ref(),
                &filename,
            )?;

            let scanner = Scanner::new(config)?;
            let mut options = scanner.default_options();
            if let Some(threads) = args.get_one::<usize>("threads") {
                options.concurrency = *threads;
            }
            if let Some(retries) = args.get_one::<u32>("retries") {
                options.retries = *retries;
            }
            if let Some(timeout) = args.get_one::<u64>("timeout") {
                options.timeout = Duration::from_millis(*timeout);
            }
            options.brute_force |= args.get_flag("brute-force");
            options.wordlist = args.get_one::<PathBuf>("wordlist").cloned();

            // run the scanner
            info!("Scanning {} (run_{})", target, filename);
            let result = scanner.scan_with(target, options).await?;

            for record in result.iter().filter(|record| record.is_alive) {
                println!("{:40} {}", record.subdomain, record.source);
            }

            // write result
            if let Some(format) = args.get_one::<String>("output") {
                if format == "both" || format == "json" {
                    let json_path = Path::new(&output_dir)
                        .join(&filename)
                        .with_extension("json");
                    export_to_json(&result, &json_path)?;
                }

                if format == "both" || format == "md" {
                    let md_path = Path::new(&output_dir).join(&filename).with_extension("md");
                    export_to_markdown(&result, target, &md_path)?;
                }
            }
        }

        // fallback if a cmd is not handled (should not possible)
        _ => {
            error!("{:12} - Command not handled, exit program", "CLI ERROR");
            return Err(Error::CliUsage("Command not handled".into()));
        }
    }

    Ok(())
}
