//! Backend that drives the `twscrape` command-line tool as a subprocess.
//!
//! Every call passes `--db <credential store>` explicitly. Tweets are read from the
//! child's stdout one JSON document per line, so the stream is as lazy as the tool
//! itself; dropping the stream kills the child.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output, Stdio};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{StreamExt, stream};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::backend::{BackendSession, BackendUser, TweetBackend, TweetStream};
use crate::config::Config;
use crate::domain::twitter::{Link, MediaItem, MediaKind, Tweet, links};
use crate::error::{Error, Result};

/// Maximum stderr characters carried into an error message
const STDERR_EXCERPT_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct TwscrapeBackend {
    program: PathBuf,
    base_args: Vec<String>,
    login_on_open: bool,
}

impl TwscrapeBackend {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
            login_on_open: true,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.backend_program.clone())
            .with_base_args(config.backend_args.clone())
            .login_on_open(config.login_on_open)
    }

    /// Arguments placed before `--db` on every invocation, e.g. `-m twscrape` for a Python interpreter.
    pub fn with_base_args(mut self, args: Vec<String>) -> Self {
        self.base_args = args;
        self
    }

    /// Run `login_accounts` whenever a session is opened.
    pub fn login_on_open(mut self, enabled: bool) -> Self {
        self.login_on_open = enabled;
        self
    }
}

#[async_trait]
impl TweetBackend for TwscrapeBackend {
    async fn open(&self, db_path: &Path) -> Result<Box<dyn BackendSession>> {
        let is_file = tokio::fs::metadata(db_path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(Error::Authentication(format!(
                "credential store not found at {}",
                db_path.display()
            )));
        }

        let session = TwscrapeSession {
            program: self.program.clone(),
            base_args: self.base_args.clone(),
            db_path: db_path.to_path_buf(),
        };

        if self.login_on_open {
            let output = session.run(&["login_accounts"]).await?;
            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(Error::Authentication(format!(
                    "login_accounts exited with {}: {}",
                    output.status,
                    excerpt(&stderr)
                )));
            }
        }

        Ok(Box::new(session))
    }
}

struct TwscrapeSession {
    program: PathBuf,
    base_args: Vec<String>,
    db_path: PathBuf,
}

impl TwscrapeSession {
    fn command(&self, args: &[&str]) -> Command {
        debug!(program = %self.program.display(), ?args, "spawning backend command");
        let mut command = Command::new(&self.program);
        command
            .args(&self.base_args)
            .arg("--db")
            .arg(&self.db_path)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }

    async fn run(&self, args: &[&str]) -> Result<Output> {
        self.command(args)
            .output()
            .await
            .map_err(|e| Error::Backend(format!("failed to run {}: {e}", self.program.display())))
    }
}

#[async_trait]
impl BackendSession for TwscrapeSession {
    async fn user_by_login(&self, handle: &str) -> Result<Option<BackendUser>> {
        let output = self.run(&["user_by_login", handle]).await?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(classify_failure(Some(output.status), &stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let Some(line) = stdout.lines().map(str::trim).find(|l| l.starts_with('{')) else {
            if reports_no_accounts(&stderr) {
                return Err(classify_failure(None, &stderr));
            }
            return Ok(None);
        };

        serde_json::from_str(line)
            .map(Some)
            .map_err(|e| Error::Backend(format!("malformed user record: {e}")))
    }

    fn user_tweets(&self, user_id: i64, limit: usize) -> TweetStream {
        let mut command = self.command(&[
            "user_tweets",
            &user_id.to_string(),
            "--limit",
            &limit.to_string(),
        ]);
        command.stdout(Stdio::piped()).stderr(Stdio::piped());

        let spawned = command
            .spawn()
            .map_err(|e| Error::Backend(format!("failed to run {}: {e}", self.program.display())))
            .and_then(TweetLines::new);

        match spawned {
            Ok(lines) => lines.into_stream(),
            Err(e) => stream::iter([Err(e)]).boxed(),
        }
    }
}

/// Line reader over a running `user_tweets` child
struct TweetLines {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    stderr: JoinHandle<String>,
    yielded: usize,
}

impl TweetLines {
    fn new(mut child: Child) -> Result<Self> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Backend("backend stdout was not captured".to_string()))?;
        let stderr = child.stderr.take();

        // Drained concurrently so a chatty backend never blocks on a full pipe
        let stderr = tokio::spawn(async move {
            let mut buf = String::new();
            if let Some(mut pipe) = stderr {
                let _ = pipe.read_to_string(&mut buf).await;
            }
            buf
        });

        Ok(Self {
            child,
            lines: BufReader::new(stdout).lines(),
            stderr,
            yielded: 0,
        })
    }

    async fn next_tweet(&mut self) -> Result<Option<Tweet>> {
        while let Some(line) = self
            .lines
            .next_line()
            .await
            .map_err(|e| Error::Backend(format!("reading backend output: {e}")))?
        {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let tweet = parse_tweet_line(line)?;
            self.yielded += 1;
            return Ok(Some(tweet));
        }

        self.finish().await?;
        Ok(None)
    }

    async fn finish(&mut self) -> Result<()> {
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| Error::Backend(format!("waiting for backend: {e}")))?;
        let stderr = (&mut self.stderr).await.unwrap_or_default();

        if !status.success() {
            return Err(classify_failure(Some(status), &stderr));
        }
        if self.yielded == 0 && reports_no_accounts(&stderr) {
            return Err(classify_failure(None, &stderr));
        }
        if !stderr.trim().is_empty() {
            debug!(stderr = %excerpt(&stderr), "backend finished with diagnostics");
        }
        Ok(())
    }

    fn into_stream(self) -> TweetStream {
        stream::unfold(Some(self), |state| async move {
            let mut lines = state?;
            match lines.next_tweet().await {
                Ok(Some(tweet)) => Some((Ok(tweet), Some(lines))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
        .boxed()
    }
}

fn reports_no_accounts(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    lower.contains("no active accounts") || lower.contains("no account available")
}

fn classify_failure(status: Option<ExitStatus>, stderr: &str) -> Error {
    let detail = match status {
        Some(status) => format!("backend exited with {status}: {}", excerpt(stderr)),
        None => excerpt(stderr),
    };
    if reports_no_accounts(stderr) {
        warn!("backend reports no usable accounts");
        Error::Authentication(detail)
    } else {
        Error::Backend(detail)
    }
}

/// Last meaningful stderr text, bounded in size
fn excerpt(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        return "no diagnostic output".to_string();
    }
    let chars: Vec<char> = trimmed.chars().collect();
    let start = chars.len().saturating_sub(STDERR_EXCERPT_CHARS);
    chars[start..].iter().collect()
}

// Backend record shape, as printed by `twscrape user_tweets`

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTweet {
    id: i64,
    #[serde(rename = "id_str", default)]
    id_str: Option<String>,
    url: String,
    date: String,
    user: WireUser,
    raw_content: String,
    #[serde(default)]
    like_count: i64,
    #[serde(default)]
    retweet_count: i64,
    #[serde(default)]
    reply_count: i64,
    #[serde(default)]
    retweeted_tweet: Option<serde_json::Value>,
    #[serde(default)]
    links: Option<Vec<WireLink>>,
    #[serde(default)]
    media: Option<WireMedia>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUser {
    username: String,
    #[serde(default)]
    displayname: String,
    #[serde(default)]
    pinned_ids: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
struct WireLink {
    url: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    tcourl: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireMedia {
    #[serde(default)]
    photos: Option<Vec<WirePhoto>>,
    #[serde(default)]
    videos: Option<Vec<WireVideo>>,
    #[serde(default)]
    animated: Option<Vec<WireAnimated>>,
}

#[derive(Debug, Deserialize)]
struct WirePhoto {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireVideo {
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    variants: Option<Vec<WireVariant>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireVariant {
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    bitrate: Option<i64>,
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAnimated {
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    video_url: Option<String>,
}

impl From<WireLink> for Link {
    fn from(l: WireLink) -> Self {
        Self {
            url: l.url,
            text: l.text,
            tcourl: l.tcourl,
        }
    }
}

impl WireMedia {
    fn into_items(self) -> Vec<MediaItem> {
        let photos = self
            .photos
            .unwrap_or_default()
            .into_iter()
            .map(|p| MediaItem {
                kind: MediaKind::Photo,
                url: p.url,
            });

        let videos = self
            .videos
            .unwrap_or_default()
            .into_iter()
            .filter_map(|v| {
                // Highest-bitrate mp4 wins; fall back to the poster frame
                let best = v
                    .variants
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|var| var.content_type.as_deref() == Some("video/mp4"))
                    .max_by_key(|var| var.bitrate.unwrap_or(0))
                    .map(|var| var.url);
                best.or(v.thumbnail_url).map(|url| MediaItem {
                    kind: MediaKind::Video,
                    url,
                })
            });

        let animated = self
            .animated
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| {
                a.video_url.or(a.thumbnail_url).map(|url| MediaItem {
                    kind: MediaKind::Animated,
                    url,
                })
            });

        photos.chain(videos).chain(animated).collect()
    }
}

/// Parse one stdout line into a tweet, keeping the document itself for pass-through.
fn parse_tweet_line(line: &str) -> Result<Tweet> {
    let raw: serde_json::Value = serde_json::from_str(line)
        .map_err(|e| Error::Backend(format!("malformed tweet record: {e}")))?;
    let wire = WireTweet::deserialize(&raw)
        .map_err(|e| Error::Backend(format!("unexpected tweet record shape: {e}")))?;

    let date = parse_date(&wire.date)?;
    let is_pinned = wire
        .user
        .pinned_ids
        .as_deref()
        .unwrap_or_default()
        .contains(&wire.id);

    Ok(Tweet {
        id: wire.id,
        id_str: wire.id_str.unwrap_or_else(|| wire.id.to_string()),
        url: wire.url,
        date,
        username: wire.user.username,
        displayname: wire.user.displayname,
        raw_content: wire.raw_content,
        like_count: wire.like_count,
        retweet_count: wire.retweet_count,
        reply_count: wire.reply_count,
        is_retweet: wire.retweeted_tweet.is_some(),
        is_pinned,
        media: wire.media.unwrap_or_default().into_items(),
        links: links::extract_links(wire.links.unwrap_or_default().into_iter().map(Link::from)),
        raw,
    })
}

/// Accepts RFC 3339 and the `2023-03-09 20:18:33+00:00` form the backend prints.
fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z"))
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| Error::Backend(format!("unparseable tweet date {value:?}: {e}")))
}
