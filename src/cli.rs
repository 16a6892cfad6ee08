//! `fetch` subcommand: one-shot fetch that prints a summary and writes a JSON file

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::config::Config;
use crate::constants::DEFAULT_LIMIT;
use crate::domain::twitter::{FilterCriteria, Tweet, handle};
use crate::services::backend::TweetBackend;
use crate::services::output::{self, OutputFormat};
use crate::services::pipeline::{self, FetchRequest};

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Username or profile URL (e.g. jack, @jack, https://x.com/jack)
    #[arg(value_name = "HANDLE_OR_URL")]
    pub handle: String,

    /// Maximum number of tweets to keep
    #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Output file [default: {handle}_tweets.json]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Account store used by the backend [default: ./accounts.db]
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub include_retweets: bool,

    #[arg(long)]
    pub exclude_pinned: bool,

    #[arg(long)]
    pub only_media: bool,

    #[arg(long)]
    pub only_links: bool,

    /// Shape of the written JSON
    #[arg(long, value_enum, default_value_t = OutputFormat::Raw)]
    pub format: OutputFormat,
}

impl FetchArgs {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            include_retweets: self.include_retweets,
            exclude_pinned: self.exclude_pinned,
            only_media: self.only_media,
            only_links: self.only_links,
        }
    }
}

pub async fn run(args: FetchArgs, backend: &dyn TweetBackend, config: &Config) -> Result<()> {
    let username = handle::resolve(&args.handle)?;
    let criteria = args.criteria();
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| output::default_output_path(&username));

    let request = FetchRequest {
        handle: args.handle.clone(),
        limit: args.limit,
        db_path: args
            .db_path
            .clone()
            .unwrap_or_else(|| config.default_db_path.clone()),
    };

    println!(
        "Fetching up to {} tweets for user: {} ({})",
        request.effective_limit(),
        username,
        criteria.describe()
    );

    let tweets = pipeline::fetch_tweets(backend, &request, &criteria)
        .await
        .with_context(|| format!("failed to fetch tweets for {username}"))?;

    print_summary(&mut io::stdout().lock(), &tweets)?;

    output::save_to_file(&tweets, &output_path, args.format).await?;
    println!("Tweets saved to {}", output_path.display());

    Ok(())
}

/// One block per tweet: date, text, likes, URL and any links
pub fn print_summary(out: &mut impl Write, tweets: &[Tweet]) -> io::Result<()> {
    if tweets.is_empty() {
        return writeln!(out, "No tweets found");
    }

    writeln!(out, "Found {} tweets:", tweets.len())?;
    for tweet in tweets {
        writeln!(out)?;
        writeln!(out, "Date: {}", output::format_date(&tweet.date))?;
        writeln!(out, "Text: {}", tweet.raw_content)?;
        writeln!(out, "Likes: {}", tweet.like_count)?;
        writeln!(out, "URL: {}", tweet.url)?;
        if !tweet.links.is_empty() {
            writeln!(out, "Links:")?;
            for link in &tweet.links {
                writeln!(out, "  - {}", link.url)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::twitter::Link;
    use crate::services::backend::fake::{FakeBackend, tweet};
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: FetchArgs,
    }

    fn parse(argv: &[&str]) -> FetchArgs {
        TestCli::parse_from(std::iter::once("fetch").chain(argv.iter().copied())).args
    }

    #[test]
    fn defaults() {
        let args = parse(&["jack"]);
        assert_eq!(args.handle, "jack");
        assert_eq!(args.limit, DEFAULT_LIMIT);
        assert_eq!(args.format, OutputFormat::Raw);
        assert!(args.output.is_none());
        assert_eq!(args.criteria(), FilterCriteria::default());
    }

    #[test]
    fn flags_map_to_criteria() {
        let args = parse(&[
            "https://x.com/jack",
            "-l",
            "25",
            "-o",
            "out.json",
            "--exclude-pinned",
            "--only-links",
            "--format",
            "normalized",
        ]);
        assert_eq!(args.limit, 25);
        assert_eq!(args.output, Some(PathBuf::from("out.json")));
        assert_eq!(args.format, OutputFormat::Normalized);
        assert_eq!(
            args.criteria(),
            FilterCriteria {
                exclude_pinned: true,
                only_links: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn summary_lists_each_tweet() {
        let mut first = tweet(1);
        first.links.push(Link {
            url: "https://example.com/a".to_string(),
            text: None,
            tcourl: None,
        });

        let mut out = Vec::new();
        print_summary(&mut out, &[first, tweet(2)]).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Found 2 tweets:"));
        assert!(text.contains("Text: tweet number 1"));
        assert!(text.contains("Likes: 20"));
        assert!(text.contains("URL: https://x.com/fake/status/2"));
        assert!(text.contains("  - https://example.com/a"));
        assert_eq!(text.matches("Links:").count(), 1);
    }

    #[test]
    fn summary_for_empty_result() {
        let mut out = Vec::new();
        print_summary(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No tweets found\n");
    }

    #[tokio::test]
    async fn writes_raw_records_to_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jack.json");
        let backend = FakeBackend::with_tweets((1..=3).map(tweet).collect());
        let args = parse(&["@jack", "-l", "2", "-o", path.to_str().unwrap()]);

        run(args, &backend, &Config::default()).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.as_array().unwrap().len(), 2);
        assert_eq!(written[0]["_type"], "snscrape.modules.twitter.Tweet");
    }

    #[tokio::test]
    async fn invalid_handle_fails_before_backend() {
        let backend = FakeBackend::default();
        let args = parse(&["@@@"]);

        assert!(run(args, &backend, &Config::default()).await.is_err());
        assert_eq!(backend.opens(), 0);
    }
}
