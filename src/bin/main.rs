use clap::{clap_app, value_t, App, ArgMatches};
use log::{debug, warn, LevelFilter};
use std::{
    io::{self, Write},
    path::PathBuf,
    process::exit,
    time::Duration,
};

use ytbatch::{
    playlist,
    resolve::{HttpResolver, Resolve},
    Config, Error,
};

mod ytlog {
    use chrono::Utc;
    use log::{max_level, Log, Metadata, Record};

    pub struct BatchLogger;

    impl Log for BatchLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= max_level()
        }

        // stdout is reserved for the playlist URL.
        fn log(&self, record: &Record) {
            if self.enabled(record.metadata()) {
                eprintln!("{} - {} - {}", Utc::now(), record.level(), record.args());
            }
        }

        fn flush(&self) {}
    }
}

static LOGGER: ytlog::BatchLogger = ytlog::BatchLogger;

fn positive(v: String) -> Result<(), String> {
    match v.parse::<u64>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(_) => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

fn app() -> App<'static, 'static> {
    clap_app!(ytbatch =>
        (version: "0.0.1")
        (author: "krashanoff <leo@krashanoff.com>")
        (about: "Turn a file of YouTube links into a playlist.")
        (@arg verbose: -v ... "Increases program verbosity")
        (@arg timeout: -t --timeout +takes_value {positive} "Seconds to wait for YouTube to answer. Defaults to 30.")
        (@arg max_redirects: --("max-redirects") +takes_value "Redirects to follow before giving up. Defaults to 10.")
        (@arg endpoint: --endpoint +takes_value "Batch endpoint to send video IDs to")
        (@arg trim: --trim "Drop extra parameters (timestamps and such) after each video ID")
        (@arg no_open: -n --("no-open") "Print the playlist URL without opening a browser")
        (@arg INPUT: "File of video links, one per line. Defaults to yt.list.")
    )
}

fn config_from(matches: &ArgMatches) -> Result<Config, clap::Error> {
    let mut config = Config::default();
    if let Some(input) = matches.value_of("INPUT") {
        config.input = PathBuf::from(input);
    }
    if let Some(endpoint) = matches.value_of("endpoint") {
        config.endpoint = endpoint.to_string();
    }
    if matches.is_present("timeout") {
        config.timeout = Duration::from_secs(value_t!(matches, "timeout", u64)?);
    }
    if matches.is_present("max_redirects") {
        config.max_redirects = value_t!(matches, "max_redirects", usize)?;
    }
    config.trim = matches.is_present("trim");
    Ok(config)
}

/// Resolve the playlist, print its URL and hand it to `launch`, if any.
///
/// A launch failure comes back as `Ok(Some(_))`: the URL is already out, so
/// the run still counts.
async fn run<R, L, W>(
    config: &Config,
    resolver: &R,
    launch: Option<L>,
    out: &mut W,
) -> Result<Option<Error>, Error>
where
    R: Resolve + ?Sized,
    L: FnOnce(&str) -> Result<(), Error>,
    W: Write,
{
    let id = ytbatch::playlist_from_file(config, resolver).await?;

    // Always printed, so the playlist survives a failed launch.
    let url = id.url();
    if let Err(e) = writeln!(out, "{}", url) {
        warn!("Could not print {}: {}", url, e);
    }

    match launch.map(|l| l(&url)) {
        Some(Err(e)) if e.is_fatal() => Err(e),
        Some(Err(e)) => Ok(Some(e)),
        _ => Ok(None),
    }
}

/// Report how the run went and pick the exit status.
fn exit_code(outcome: &Result<Option<Error>, Error>) -> i32 {
    match outcome {
        Ok(None) => 0,
        Ok(Some(e)) => {
            eprintln!("ytbatch: {}", e);
            0
        }
        Err(e) => {
            eprintln!("ytbatch: {}", e);
            1
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let matches = app().get_matches();

    if let Err(e) = log::set_logger(&LOGGER).map(|()| {
        log::set_max_level(match matches.occurrences_of("verbose") {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        })
    }) {
        panic!("Failed to initialize logger! {}", e)
    }

    let config = config_from(&matches).unwrap_or_else(|e| e.exit());
    debug!("Running with {:?}", config);

    let resolver = HttpResolver::new(config.timeout, config.max_redirects);
    let launch = if matches.is_present("no_open") {
        None
    } else {
        Some(playlist::launch)
    };
    let outcome = run(&config, &resolver, launch, &mut io::stdout()).await;
    exit(exit_code(&outcome))
}

#[cfg(test)]
mod test {
    use super::*;
    use async_trait::async_trait;
    use std::{cell::RefCell, fs, io::ErrorKind};
    use tempfile::TempDir;

    type Launcher = fn(&str) -> Result<(), Error>;

    struct Canned(&'static str);

    #[async_trait]
    impl Resolve for Canned {
        async fn resolve(&self, _url: &str) -> Result<String, Error> {
            Ok(self.0.to_string())
        }
    }

    fn matches(args: &[&str]) -> Result<ArgMatches<'static>, clap::Error> {
        app().get_matches_from_safe(std::iter::once("ytbatch").chain(args.iter().copied()))
    }

    fn link_file(contents: &str) -> (TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("yt.list");
        fs::write(&input, contents).unwrap();
        let config = Config {
            input,
            ..Config::default()
        };
        (dir, config)
    }

    #[test]
    fn defaults() {
        let config = config_from(&matches(&[]).unwrap()).unwrap();
        assert_eq!(config.input, PathBuf::from(ytbatch::DEFAULT_INPUT));
        assert_eq!(config.endpoint, ytbatch::query::DEFAULT_ENDPOINT);
        assert_eq!(config.timeout, ytbatch::resolve::DEFAULT_TIMEOUT);
        assert_eq!(config.max_redirects, ytbatch::resolve::DEFAULT_MAX_REDIRECTS);
        assert!(!config.trim);
    }

    #[test]
    fn flags_map_onto_config() {
        let m = matches(&[
            "--trim",
            "-t",
            "5",
            "--max-redirects",
            "2",
            "--endpoint",
            "http://localhost:8080/watch_videos",
            "links.txt",
        ])
        .unwrap();
        let config = config_from(&m).unwrap();

        assert!(config.trim);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_redirects, 2);
        assert_eq!(config.endpoint, "http://localhost:8080/watch_videos");
        assert_eq!(config.input, PathBuf::from("links.txt"));
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(matches(&["-t", "0"]).is_err());
        assert!(matches(&["--timeout", "soon"]).is_err());

        let m = matches(&["--max-redirects", "lots"]).unwrap();
        assert!(config_from(&m).is_err());
    }

    #[tokio::test]
    async fn launch_failure_is_not_fatal() {
        let (_dir, config) = link_file("https://youtu.be/AAA111\n");
        let resolver = Canned("https://www.youtube.com/watch_videos?list=PL123XYZ");
        let tried = RefCell::new(None);
        let mut out = Vec::new();

        let outcome = run(
            &config,
            &resolver,
            Some(|url: &str| {
                *tried.borrow_mut() = Some(url.to_string());
                Err(Error::BrowserLaunchFailure {
                    url: url.to_string(),
                    source: io::Error::new(ErrorKind::NotFound, "no browser"),
                })
            }),
            &mut out,
        )
        .await;

        let url = "https://www.youtube.com/playlist?list=PL123XYZ&disable_polymer=true";
        assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", url));
        assert_eq!(tried.into_inner().as_deref(), Some(url));
        assert!(matches!(outcome, Ok(Some(Error::BrowserLaunchFailure { .. }))));
        assert_eq!(exit_code(&outcome), 0);
    }

    #[tokio::test]
    async fn prints_without_launching() {
        let (_dir, config) = link_file("https://www.youtube.com/watch?v=AAA111\n");
        let resolver = Canned("https://www.youtube.com/watch_videos?list=PL1");
        let mut out = Vec::new();

        let outcome = run(&config, &resolver, None::<Launcher>, &mut out).await;

        assert!(matches!(outcome, Ok(None)));
        assert_eq!(exit_code(&outcome), 0);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "https://www.youtube.com/playlist?list=PL1&disable_polymer=true\n"
        );
    }

    #[tokio::test]
    async fn fatal_errors_exit_nonzero() {
        let (_dir, config) = link_file("no links in here\n");
        let resolver = Canned("https://www.youtube.com/watch_videos?list=PL1");
        let mut out = Vec::new();

        let outcome = run(&config, &resolver, None::<Launcher>, &mut out).await;

        assert!(matches!(outcome, Err(Error::NoIdentifiersFound { .. })));
        assert!(out.is_empty());
        assert_eq!(exit_code(&outcome), 1);
    }
}
