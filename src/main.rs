use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::LevelFilter;

use crate::downloader::ErrorPolicy;

mod downloader;
mod extractor;
mod utils;

/// Find the puzzle image URLs in an Apache log and optionally download them.
#[derive(Parser, Debug)]
struct Args {
    #[clap(short = 'd', long, help = "Destination directory for downloaded images")]
    todir: Option<PathBuf>,
    #[clap(
        long,
        value_enum,
        default_value_t = ErrorPolicy::Abort,
        help = "What to do when an image fails to download"
    )]
    on_error: ErrorPolicy,
    #[clap(long, default_value_t = 10, help = "Per-request timeout in seconds")]
    timeout: u64,
    #[clap(long, help = "Enable debug mode")]
    debug: bool,
    #[clap(help = "Apache logfile to extract urls from")]
    logfile: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Some(usage) = usage_if_no_arguments(std::env::args_os()) {
        eprintln!("{}", usage);
        process::exit(1);
    }

    let args = Args::parse();

    let log_level = if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::builder()
        .filter_level(log_level)
        .parse_default_env()
        .init();

    if let Err(err) = run(&args).await {
        log::error!("Error: {:#}", err);
        process::exit(1);
    }

    Ok(())
}

async fn run(args: &Args) -> Result<()> {
    let img_urls = extractor::read_urls(&args.logfile)?;

    match &args.todir {
        Some(dest_dir) => {
            let client = utils::build_client(Duration::from_secs(args.timeout))?;
            downloader::download_images(&client, &img_urls, dest_dir, args.on_error).await?;
        }
        None => print_urls(&mut io::stdout().lock(), &img_urls)?,
    }

    Ok(())
}

/// Usage text when the program was started with nothing but its own name.
fn usage_if_no_arguments<I>(argv: I) -> Option<String>
where
    I: IntoIterator<Item = OsString>,
{
    if argv.into_iter().nth(1).is_some() {
        return None;
    }
    Some(Args::command().render_usage().to_string())
}

fn print_urls<W: Write>(out: &mut W, img_urls: &[String]) -> Result<()> {
    for url in img_urls {
        writeln!(out, "{}", url).context("Failed to write to stdout")?;
    }
    out.flush().context("Failed to write to stdout")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_mode_by_default() {
        let args = Args::try_parse_from(["logpuzzle", "animal_code.google.com"]).unwrap();
        assert_eq!(args.logfile, PathBuf::from("animal_code.google.com"));
        assert!(args.todir.is_none());
        assert_eq!(args.on_error, ErrorPolicy::Abort);
        assert_eq!(args.timeout, 10);
    }

    #[test]
    fn todir_short_and_long() {
        let args = Args::try_parse_from(["logpuzzle", "-d", "out", "access_x.com"]).unwrap();
        assert_eq!(args.todir, Some(PathBuf::from("out")));

        let args =
            Args::try_parse_from(["logpuzzle", "access_x.com", "--todir", "pics"]).unwrap();
        assert_eq!(args.todir, Some(PathBuf::from("pics")));
        assert_eq!(args.logfile, PathBuf::from("access_x.com"));
    }

    #[test]
    fn error_policy_flag() {
        let args =
            Args::try_parse_from(["logpuzzle", "--on-error", "continue", "access_x.com"]).unwrap();
        assert_eq!(args.on_error, ErrorPolicy::Continue);

        assert!(Args::try_parse_from(["logpuzzle", "--on-error", "retry", "access_x.com"]).is_err());
    }

    #[test]
    fn logfile_is_required() {
        assert!(Args::try_parse_from(["logpuzzle", "-d", "out"]).is_err());
    }

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn usage_only_without_arguments() {
        let usage = usage_if_no_arguments([OsString::from("logpuzzle")]).unwrap();
        assert!(usage.contains("<LOGFILE>"));

        assert!(usage_if_no_arguments(Vec::<OsString>::new()).is_some());
        assert!(usage_if_no_arguments(["logpuzzle".into(), "access_x.com".into()]).is_none());
    }

    #[test]
    fn prints_urls_in_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access_example.com");
        let log = [
            r#"1.1.1.1 - - [x] "GET /edu/puzzle/p-q-b.jpg HTTP/1.0" 200 1 "-" "Mozilla/5.0""#,
            r#"1.1.1.1 - - [x] "GET /edu/puzzle/p-r-a.jpg HTTP/1.0" 200 1 "-" "Mozilla/5.0""#,
            r#"1.1.1.1 - - [x] "GET /edu/puzzle/p-s-c.jpg HTTP/1.0" 200 1 "-" "Mozilla/5.0""#,
        ];
        std::fs::write(&path, log.join("\n")).unwrap();

        let urls = extractor::read_urls(&path).unwrap();
        let mut out = Vec::new();
        print_urls(&mut out, &urls).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "http://example.com/edu/puzzle/p-r-a.jpg\n\
             http://example.com/edu/puzzle/p-q-b.jpg\n\
             http://example.com/edu/puzzle/p-s-c.jpg\n"
        );
    }

    #[test]
    fn prints_nothing_for_empty_list() {
        let mut out = Vec::new();
        print_urls(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn run_fails_on_missing_log() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::try_parse_from([
            "logpuzzle".into(),
            dir.path().join("access_nowhere.com").into_os_string(),
        ])
        .unwrap();
        assert!(run(&args).await.is_err());
    }
}
