//! Line-oriented review shell.
//!
//! Reads one command per line, runs it against the review loop, and echoes
//! every [`ReviewEvent`] the command produced.

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, bail};
use triage_core::{Bucket, Category, ReviewEvent, ReviewLoop, SessionConfig, TextClassifier};

use crate::display;

const HELP: &str = "\
Commands
  list [bucket]        list one bucket, or a summary of all buckets
  show                 show the selected document
  select <id>          select a document
  clear                clear the selection
  in <category>        confirm the selected document as <category>
  out                  return the selected document to uncategorized
  move <id> <bucket>   move a document to a bucket id
  retrain              fit on confirmed documents and re-bucket the rest
  flags                list confirmed documents the model disagrees with
  eval                 score current categories against ground truth
  save [path]          export `title, bucket` lines
  help                 this text
  quit                 leave the shell
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List(Option<usize>),
    Show,
    Select(String),
    Clear,
    In(Category),
    Out,
    Move { id: String, bucket: usize },
    Retrain,
    Flags,
    Eval,
    Save(Option<PathBuf>),
    Help,
    Quit,
}

impl ShellCommand {
    /// `Ok(None)` for blank lines and `#` comments.
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match word {
            "list" | "ls" => {
                if rest.is_empty() {
                    Self::List(None)
                } else {
                    Self::List(Some(number(rest, "bucket")?))
                }
            }
            "show" => Self::Show,
            "select" | "sel" => {
                if rest.is_empty() {
                    bail!("usage: select <id>");
                }
                Self::Select(rest.to_string())
            }
            "clear" => Self::Clear,
            "in" => Self::In(number(rest, "category")?),
            "out" => Self::Out,
            "move" | "mv" => {
                let Some((id, bucket)) = rest.rsplit_once(char::is_whitespace) else {
                    bail!("usage: move <id> <bucket>");
                };
                Self::Move {
                    id: id.trim().to_string(),
                    bucket: number(bucket, "bucket")?,
                }
            }
            "retrain" | "train" => Self::Retrain,
            "flags" => Self::Flags,
            "eval" => Self::Eval,
            "save" => Self::Save((!rest.is_empty()).then(|| PathBuf::from(rest))),
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => bail!("unknown command {other:?}, try `help`"),
        };
        Ok(Some(command))
    }
}

fn number(s: &str, what: &str) -> anyhow::Result<usize> {
    s.trim()
        .parse()
        .with_context(|| format!("expected a {what} number, got {s:?}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct Shell<C> {
    review: ReviewLoop<C>,
    config: SessionConfig,
    out_path: PathBuf,
    events: Rc<RefCell<Vec<ReviewEvent>>>,
}

impl<C: TextClassifier> Shell<C> {
    /// `out_path` is where a bare `save` writes.
    pub fn new(mut review: ReviewLoop<C>, config: SessionConfig, out_path: PathBuf) -> Self {
        let events: Rc<RefCell<Vec<ReviewEvent>>> = Rc::default();
        let sink = Rc::clone(&events);
        review.subscribe(move |event: &ReviewEvent| sink.borrow_mut().push(event.clone()));
        Self {
            review,
            config,
            out_path,
            events,
        }
    }

    pub fn review(&self) -> &ReviewLoop<C> {
        &self.review
    }

    /// Run until `quit` or end of input. Command errors are printed, not returned.
    pub fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> anyhow::Result<()> {
        display::write_summary(out, self.review.store(), &self.config)?;
        writeln!(out, "type `help` for commands")?;
        prompt(out)?;

        for line in input.lines() {
            let line = line.context("reading command")?;
            let flow = match ShellCommand::parse(&line) {
                Ok(Some(command)) => match self.execute(command, out) {
                    Ok(flow) => flow,
                    Err(err) => {
                        writeln!(out, "error: {err:#}")?;
                        Flow::Continue
                    }
                },
                Ok(None) => Flow::Continue,
                Err(err) => {
                    writeln!(out, "error: {err:#}")?;
                    Flow::Continue
                }
            };
            self.flush_events(out)?;
            if flow == Flow::Quit {
                return Ok(());
            }
            prompt(out)?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn execute(&mut self, command: ShellCommand, out: &mut impl Write) -> anyhow::Result<Flow> {
        let k = self.config.categories();
        match command {
            ShellCommand::List(None) => {
                display::write_summary(out, self.review.store(), &self.config)?;
            }
            ShellCommand::List(Some(id)) => {
                let bucket = Bucket::from_id(id, k)?;
                let selected = self.review.selection().map(|d| d.as_str());
                display::write_bucket(out, self.review.store(), bucket, &self.config, selected)?;
            }
            ShellCommand::Show => match self.review.selected() {
                Some(entry) => display::write_card(out, entry, &self.config)?,
                None => writeln!(out, "nothing selected")?,
            },
            ShellCommand::Select(id) => self.review.select(&id)?,
            ShellCommand::Clear => self.review.clear_selection(),
            ShellCommand::In(category) => {
                if self.review.selection().is_none() {
                    writeln!(out, "nothing selected")?;
                } else if category >= k {
                    bail!("category {category} out of range (0..{k})");
                } else {
                    self.review.move_selected_in(category)?;
                }
            }
            ShellCommand::Out => {
                if self.review.selection().is_none() {
                    writeln!(out, "nothing selected")?;
                } else {
                    self.review.move_selected_out()?;
                }
            }
            ShellCommand::Move { id, bucket } => {
                self.review.move_document(&id, bucket)?;
            }
            ShellCommand::Retrain => {
                let report = self.review.retrain_and_predict()?;
                display::write_report(out, &report, &self.config)?;
            }
            ShellCommand::Flags => {
                let flagged = self.review.disagreements();
                if flagged.is_empty() {
                    writeln!(out, "no disagreements")?;
                }
                for id in flagged {
                    let bucket = self.review.bucket_of(id.as_str())?;
                    let label = display::bucket_label(bucket, &self.config);
                    writeln!(out, "! {:<12} {label}", id.as_str())?;
                }
            }
            ShellCommand::Eval => match self.review.evaluate() {
                Some(eval) => display::write_evaluation(out, &eval, &self.config)?,
                None => writeln!(out, "no documents with ground truth")?,
            },
            ShellCommand::Save(path) => {
                let path = path.unwrap_or_else(|| self.out_path.clone());
                let n = self.review.export(&path)?;
                writeln!(out, "saved {n} records to {}", path.display())?;
            }
            ShellCommand::Help => write!(out, "{HELP}")?,
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn flush_events(&mut self, out: &mut impl Write) -> std::io::Result<()> {
        let events = std::mem::take(&mut *self.events.borrow_mut());
        for event in &events {
            writeln!(out, "{}", display::event_line(event, &self.config))?;
        }
        Ok(())
    }
}

fn prompt(out: &mut impl Write) -> std::io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}
