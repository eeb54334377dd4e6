//! Interactive browsing session.
//!
//! Reads one command per line from any `BufRead` and writes the UI to any `Write`, so the same
//! loop serves a terminal and the tests.

use std::io::{self, BufRead, Write};

use wikinav_core::{App, BackOutcome, LinkAction, PageRef};

use crate::view;

const HELP: &str = "\
Commands:
  search <query>   (or / <query>)  search Wikipedia
  open <n>         open search result n
  page <id|title>  open a page directly
  follow <n>       follow link [n] of the current article
  links            list the links of the current article
  show             redraw the current article
  back             return to the previous article
  help             show this help
  quit             leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Open(usize),
    Page(PageRef),
    Follow(usize),
    Links,
    Show,
    Back,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let number = |what: &str| match rest.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Command::Invalid(format!("usage: {what} <n> (n starts at 1)"))),
    };

    match word.to_ascii_lowercase().as_str() {
        "search" | "s" | "/" => Command::Search(rest.to_string()),
        "open" | "o" => number("open").map_or_else(|e| e, Command::Open),
        "follow" | "f" => number("follow").map_or_else(|e| e, Command::Follow),
        "page" | "p" => match rest.parse::<PageRef>() {
            Ok(page) => Command::Page(page),
            Err(_) => Command::Invalid("usage: page <id|title>".into()),
        },
        "links" | "l" => Command::Links,
        "show" => Command::Show,
        "back" | "b" => Command::Back,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => Command::Invalid(format!("unknown command '{other}', try 'help'")),
    }
}

pub struct Session<'a, W: Write> {
    app: &'a mut App,
    out: W,
    width: usize,
    links: Vec<LinkAction>,
}

impl<'a, W: Write> Session<'a, W> {
    pub fn new(app: &'a mut App, out: W, width: usize) -> Self {
        Self {
            app,
            out,
            width,
            links: Vec::new(),
        }
    }

    /// Run until `quit` or end of input.
    pub async fn run<R: BufRead>(&mut self, input: R) -> io::Result<()> {
        writeln!(self.out, "WikiNav: type 'help' for commands.")?;
        self.prompt()?;
        for line in input.lines() {
            let command = parse_command(&line?);
            if command == Command::Quit {
                break;
            }
            // Messages are shown once, by the command that caused them.
            self.app.dismiss_message();
            self.handle(command).await?;
            self.prompt()?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    pub async fn handle(&mut self, command: Command) -> io::Result<()> {
        match command {
            Command::Empty | Command::Quit => Ok(()),
            Command::Help => writeln!(self.out, "{HELP}"),
            Command::Invalid(message) => writeln!(self.out, "{message}"),
            Command::Search(query) => {
                if self.app.submit_search(&query).await.is_ok() {
                    let results = view::search_status(self.app.view().search, self.width);
                    writeln!(self.out, "{results}")
                } else {
                    self.print_message()
                }
            }
            Command::Open(n) => {
                let outcome = self.app.select_result(n - 1).await;
                self.after_navigation(outcome.is_ok())
            }
            Command::Page(page) => {
                let outcome = self.app.open(page).await;
                self.after_navigation(outcome.is_ok())
            }
            Command::Follow(n) => match self.links.get(n - 1).cloned() {
                Some(action) => {
                    let outcome = self.app.activate(&action).await;
                    self.after_navigation(outcome.is_ok())
                }
                None => writeln!(self.out, "No link [{n}] in the current article."),
            },
            Command::Links => {
                if self.links.is_empty() {
                    writeln!(self.out, "No links.")
                } else {
                    writeln!(self.out, "{}", view::link_list(&self.links))
                }
            }
            Command::Show => self.print_article(),
            Command::Back => {
                let outcome = self.app.back();
                match outcome {
                    BackOutcome::Restored => self.print_article(),
                    BackOutcome::Cleared => {
                        self.links.clear();
                        writeln!(self.out, "(no article)")
                    }
                    BackOutcome::Unchanged => self.print_message(),
                }
            }
        }
    }

    fn after_navigation(&mut self, ok: bool) -> io::Result<()> {
        if ok {
            self.print_article()
        } else {
            self.print_message()
        }
    }

    fn print_article(&mut self) -> io::Result<()> {
        let snapshot = self.app.view();
        match snapshot.article {
            Some(article) => {
                let rendered = view::article(&article, self.width);
                self.links = rendered.links;
                writeln!(self.out, "{}", rendered.text)?;
                writeln!(
                    self.out,
                    "\n({} links, history depth {})",
                    self.links.len(),
                    snapshot.history_depth
                )
            }
            None => {
                self.links.clear();
                writeln!(self.out, "(no article)")
            }
        }
    }

    fn print_message(&mut self) -> io::Result<()> {
        if let Some(message) = self.app.message() {
            writeln!(self.out, "! {message}")?;
        }
        Ok(())
    }

    fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "> ")?;
        self.out.flush()
    }
}
