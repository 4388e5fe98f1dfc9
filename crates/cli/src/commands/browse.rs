//! browse command - Interactive folder browser
//!
//! Reads one command per line from stdin while the current folder keeps
//! loading in the background. The first page is shown as soon as the first
//! batch arrives; search and sort apply once the listing is complete.

use std::io::Write as _;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context as _, bail};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};

use bx_core::{
    BucketInfo, Entry, Explorer, ExplorerEvent, NavigationChange, PAGE_SIZE, SortColumn,
    bucket_page, parse_bucket_path,
};

use super::context::{self, Context};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

const HELP: &str = "\
Commands:
  cd NAME | cd .. | cd /   open a folder (or bucket), go up, or go to the bucket root
  up                       go to the parent folder, or back to the bucket list
  ls                       show the current page again
  next | prev | page N     change page
  sort COLUMN              sort by name, size, modified or type (again to reverse)
  find [TEXT]              search by name or type; no text clears the search
  get NAME [DEST]          download an object, or a folder into DEST/NAME
  refresh                  reload the current folder
  help                     show this help
  quit                     leave";

/// Interactive folder browser
#[derive(Args, Debug)]
pub struct BrowseArgs {
    /// Start location as bucket[/prefix]; omit to start at the bucket list
    pub path: Option<String>,
}

/// One line of browser input
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Cd(String),
    Up,
    Ls,
    Next,
    Prev,
    Page(usize),
    Sort(SortColumn),
    Find(String),
    Get { name: String, dest: Option<PathBuf> },
    Refresh,
    Help,
    Quit,
}

impl FromStr for ReplCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "cd" if rest.is_empty() => bail!("usage: cd NAME"),
            "cd" => Self::Cd(rest.to_string()),
            "up" | ".." => Self::Up,
            "ls" | "" => Self::Ls,
            "next" | "n" => Self::Next,
            "prev" | "p" => Self::Prev,
            "page" => Self::Page(
                rest.parse()
                    .with_context(|| format!("invalid page number '{rest}'"))?,
            ),
            "sort" => Self::Sort(rest.parse()?),
            "find" | "search" => Self::Find(rest.to_string()),
            "get" => {
                let mut parts = rest.splitn(2, char::is_whitespace);
                let name = parts.next().filter(|n| !n.is_empty());
                let Some(name) = name else {
                    bail!("usage: get NAME [DEST]");
                };
                Self::Get {
                    name: name.to_string(),
                    dest: parts.next().map(str::trim).filter(|d| !d.is_empty()).map(PathBuf::from),
                }
            }
            "refresh" | "r" => Self::Refresh,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => bail!("unknown command '{other}' (try 'help')"),
        };
        Ok(command)
    }
}

/// Bucket list shown when no bucket is open
#[derive(Debug, Default)]
struct BucketList {
    buckets: Option<Vec<BucketInfo>>,
    query: String,
    page: usize,
}

struct Browser {
    explorer: Explorer,
    formatter: Formatter,
    bucket_list: BucketList,
}

enum Flow {
    Continue,
    Exit(ExitCode),
}

pub async fn execute(args: BrowseArgs, ctx: &Context, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let start = match args.path.as_deref().map(parse_bucket_path).transpose() {
        Ok(p) => p,
        Err(e) => return context::report(&formatter, "Invalid path", &e),
    };

    let client = match ctx.connect().await {
        Ok(c) => c,
        Err(e) => return context::report(&formatter, "Failed to connect", &e),
    };

    let mut browser = Browser {
        explorer: Explorer::new(client),
        formatter,
        bucket_list: BucketList {
            page: 1,
            ..Default::default()
        },
    };

    match start {
        Some(path) => {
            browser.explorer.open(&path.bucket, &path.key).await;
        }
        None => {
            if let Flow::Exit(code) = browser.show_buckets().await {
                return code;
            }
        }
    }

    browser.run().await
}

impl Browser {
    async fn run(&mut self) -> ExitCode {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        self.prompt();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => return ExitCode::Success,
                        Err(e) => {
                            self.formatter.error(&format!("Failed to read input: {e}"));
                            return ExitCode::GeneralError;
                        }
                    };
                    let flow = match line.parse::<ReplCommand>() {
                        Ok(command) => self.handle(command).await,
                        Err(e) => {
                            self.formatter.warning(&e.to_string());
                            Flow::Continue
                        }
                    };
                    if let Flow::Exit(code) = flow {
                        return code;
                    }
                    self.prompt();
                }
                event = self.explorer.next_event(), if self.explorer.is_loading() => {
                    if let Some(event) = event {
                        if let Flow::Exit(code) = self.on_event(event) {
                            return code;
                        }
                    }
                }
            }
        }
    }

    fn on_event(&mut self, event: ExplorerEvent) -> Flow {
        match event {
            ExplorerEvent::Loaded {
                total,
                is_first_batch,
                is_complete,
                ..
            } => {
                if is_first_batch {
                    self.render_listing();
                }
                if is_complete {
                    self.formatter.println(&format!("Loaded {total} entries."));
                    if !is_first_batch {
                        self.render_listing();
                    }
                    self.prompt();
                }
                Flow::Continue
            }
            ExplorerEvent::Failed(e) => {
                let code = context::report(&self.formatter, "Failed to list objects", &e);
                if e.is_credentials() {
                    Flow::Exit(code)
                } else {
                    self.prompt();
                    Flow::Continue
                }
            }
        }
    }

    async fn handle(&mut self, command: ReplCommand) -> Flow {
        if self.explorer.navigation().bucket().is_none() {
            return self.handle_bucket_list(command).await;
        }

        match command {
            ReplCommand::Cd(name) => match name.as_str() {
                ".." => return self.go_up().await,
                "/" => {
                    self.explorer.navigate_to("").await;
                }
                _ => match self.resolve(&name).filter(|e| e.is_folder) {
                    Some(folder) => {
                        self.explorer.enter_folder(&folder.key).await;
                    }
                    None => self.formatter.warning(&format!("No folder named '{name}'")),
                },
            },
            ReplCommand::Up => return self.go_up().await,
            ReplCommand::Ls => self.render_listing(),
            ReplCommand::Next => {
                if self.explorer.next_page() {
                    self.render_listing();
                } else {
                    self.formatter.warning("Already on the last page");
                }
            }
            ReplCommand::Prev => {
                if self.explorer.prev_page() {
                    self.render_listing();
                } else {
                    self.formatter.warning("Already on the first page");
                }
            }
            ReplCommand::Page(n) => match self.explorer.set_page(n) {
                Ok(()) => self.render_listing(),
                Err(e) => self.formatter.warning(&e.to_string()),
            },
            ReplCommand::Sort(column) => {
                if self.explorer.toggle_sort(column) {
                    self.render_listing();
                } else {
                    self.formatter.warning("Sorting is available once loading completes");
                }
            }
            ReplCommand::Find(text) => {
                if self.explorer.set_filter(&text) {
                    self.render_listing();
                } else {
                    self.formatter.println("Search will apply when loading completes.");
                }
            }
            ReplCommand::Get { name, dest } => self.download(&name, dest).await,
            ReplCommand::Refresh => {
                self.explorer.refresh().await;
            }
            ReplCommand::Help => self.formatter.println(HELP),
            ReplCommand::Quit => return Flow::Exit(ExitCode::Success),
        }
        Flow::Continue
    }

    async fn handle_bucket_list(&mut self, command: ReplCommand) -> Flow {
        let list = &mut self.bucket_list;
        match command {
            ReplCommand::Cd(name) if name == ".." || name == "/" => {}
            ReplCommand::Cd(name) => {
                let known = list
                    .buckets
                    .as_deref()
                    .is_some_and(|b| b.iter().any(|b| b.name == name));
                if known {
                    self.explorer.enter_bucket(&name).await;
                } else {
                    self.formatter.warning(&format!("No bucket named '{name}'"));
                }
                return Flow::Continue;
            }
            ReplCommand::Find(text) => {
                list.query = text;
                list.page = 1;
            }
            ReplCommand::Next => list.page += 1,
            ReplCommand::Prev => list.page = list.page.saturating_sub(1).max(1),
            ReplCommand::Page(n) => list.page = n,
            ReplCommand::Refresh => list.buckets = None,
            ReplCommand::Ls => {}
            ReplCommand::Help => {
                self.formatter.println(HELP);
                return Flow::Continue;
            }
            ReplCommand::Quit => return Flow::Exit(ExitCode::Success),
            ReplCommand::Up | ReplCommand::Sort(_) | ReplCommand::Get { .. } => {
                self.formatter.warning("Open a bucket first (cd NAME)");
                return Flow::Continue;
            }
        }
        self.show_buckets().await
    }

    async fn go_up(&mut self) -> Flow {
        match self.explorer.go_up().await {
            NavigationChange::LeftBucket => self.show_buckets().await,
            _ => Flow::Continue,
        }
    }

    /// Entry in the current folder named `name`, object or folder
    fn resolve(&self, name: &str) -> Option<Entry> {
        let prefix = self.explorer.navigation().prefix();
        let name = name.trim_end_matches('/');
        self.explorer
            .entry(&format!("{prefix}{name}"))
            .or_else(|| self.explorer.entry(&format!("{prefix}{name}/")))
    }

    async fn download(&mut self, name: &str, dest: Option<PathBuf>) {
        let Some(entry) = self.resolve(name) else {
            self.formatter.warning(&format!("Nothing named '{name}' in this folder"));
            return;
        };

        let base = dest.unwrap_or_else(|| PathBuf::from("."));
        let target = if entry.is_folder || base.is_dir() {
            base.join(entry.name())
        } else {
            base
        };

        let bar = ProgressBar::files(self.formatter.config(), 0);
        let result = self
            .explorer
            .download(&entry.key, &target, |progress| {
                bar.set_length(progress.total as u64);
                bar.set_position(progress.index as u64);
            })
            .await;
        bar.finish_and_clear();

        match result {
            Ok(done) => {
                for key in &done.skipped {
                    self.formatter.warning(&format!("Skipped {key}: no safe local path"));
                }
                self.formatter.success(&format!(
                    "Downloaded {} file(s) to {}",
                    done.files.len(),
                    target.display()
                ));
            }
            Err(e) => {
                context::report(&self.formatter, &format!("Failed to download {name}"), &e);
            }
        }
    }

    async fn show_buckets(&mut self) -> Flow {
        if self.bucket_list.buckets.is_none() {
            let spinner = ProgressBar::spinner(self.formatter.config(), "Loading buckets...");
            let result = self.explorer.list_buckets().await;
            spinner.finish_and_clear();
            match result {
                Ok(buckets) => self.bucket_list.buckets = Some(buckets),
                Err(e) => {
                    let code = context::report(&self.formatter, "Failed to list buckets", &e);
                    return if e.is_credentials() {
                        Flow::Exit(code)
                    } else {
                        Flow::Continue
                    };
                }
            }
        }

        let list = &self.bucket_list;
        let buckets = list.buckets.as_deref().unwrap_or_default();
        match bucket_page(buckets, &list.query, list.page, PAGE_SIZE) {
            Ok(page) => self.formatter.buckets(&page),
            Err(e) => {
                self.formatter.warning(&e.to_string());
                self.bucket_list.page = 1;
            }
        }
        Flow::Continue
    }

    fn render_listing(&self) {
        let navigation = self.explorer.navigation();
        let Some(bucket) = navigation.bucket() else {
            return;
        };
        if !self.formatter.is_json() {
            let trail: Vec<String> = self
                .explorer
                .breadcrumbs()
                .into_iter()
                .map(|c| c.label)
                .collect();
            self.formatter.println(&trail.join(" > "));
        }
        self.formatter
            .listing(bucket, navigation.prefix(), &self.explorer.snapshot());
    }

    fn prompt(&self) {
        if self.formatter.is_quiet() || self.formatter.is_json() {
            return;
        }
        let location = match self.explorer.navigation().bucket() {
            Some(bucket) => format!("{bucket}/{}", self.explorer.navigation().prefix()),
            None => String::new(),
        };
        print!("bx:{location}> ");
        let _ = std::io::stdout().flush();
    }
}
