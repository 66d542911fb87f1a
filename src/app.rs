//! Command execution for the CLI.
//! Prints human-readable lines by default, JSON with `--json`.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{BufRead, Write};
use vocab_review::export::{export_json_to_path, import_json};
use vocab_review::models::sm2::format_interval;
use vocab_review::{
    ItemKind, LearningItem, Quality, ReviewService, ReviewSession, ReviewStore,
};

use crate::cli::Commands;

pub struct App<S> {
    service: ReviewService<S>,
    user_id: String,
    json: bool,
}

impl<S: ReviewStore> App<S> {
    pub fn new(service: ReviewService<S>, user_id: String, json: bool) -> Self {
        Self {
            service,
            user_id,
            json,
        }
    }

    pub fn run(&self, command: Commands, input: impl BufRead, out: &mut impl Write) -> Result<()> {
        match command {
            Commands::AddCard { term, definition } => {
                let item = self.service.add_flashcard(&self.user_id, &term, &definition)?;
                self.print_item(out, &item)
            }
            Commands::AddNote { term, body } => {
                let item = self.service.add_note(&self.user_id, &term, &body)?;
                self.print_item(out, &item)
            }
            Commands::Due { kind } => {
                let due = self.service.due_items(&self.user_id, kind.map(ItemKind::from))?;
                if self.json {
                    return self.print_json(out, &due);
                }
                writeln!(out, "{} item(s) due", due.len())?;
                for item in &due {
                    self.print_item(out, item)?;
                }
                Ok(())
            }
            Commands::Review { id, quality } => {
                let item = self.service.record_review(id, quality)?;
                self.print_item(out, &item)
            }
            Commands::Preview { id } => {
                let intervals = self.service.preview(id)?;
                if self.json {
                    return self.print_json(out, &intervals);
                }
                for (quality, days) in intervals.iter().enumerate() {
                    writeln!(out, "{} -> {}", quality, format_interval(*days))?;
                }
                Ok(())
            }
            Commands::Session { kind } => self.run_session(kind.map(ItemKind::from), input, out),
            Commands::Export { path } => {
                let count = export_json_to_path(
                    self.service.store(),
                    &self.user_id,
                    &path,
                    self.service.now(),
                )
                .with_context(|| format!("exporting to {}", path.display()))?;
                writeln!(out, "Exported {} item(s) to {}", count, path.display())?;
                Ok(())
            }
            Commands::Import { path } => {
                let items = import_json(self.service.store(), &path)
                    .with_context(|| format!("importing {}", path.display()))?;
                writeln!(out, "Imported {} item(s) from {}", items.len(), path.display())?;
                Ok(())
            }
            Commands::Delete { id } => {
                self.service.delete_item(id)?;
                writeln!(out, "Deleted item {}", id)?;
                Ok(())
            }
        }
    }

    fn run_session(
        &self,
        kind: Option<ItemKind>,
        input: impl BufRead,
        out: &mut impl Write,
    ) -> Result<()> {
        let mut session = ReviewSession::start(&self.service, &self.user_id, kind)?;
        let mut lines = input.lines();
        let mut round = 0;

        while let Some(item) = session.current().cloned() {
            if session.round_number() != round {
                round = session.round_number();
                writeln!(out, "{}", session.phase_message())?;
            }
            writeln!(out, "[{}] {}", item.id, item.content.term())?;
            write!(out, "quality (0-5)> ")?;
            out.flush()?;

            let Some(line) = lines.next().transpose()? else {
                writeln!(out)?;
                writeln!(out, "Session stopped, {} item(s) left", session.remaining_count())?;
                return Ok(());
            };
            let quality = match line.trim().parse::<i32>().map(Quality::new) {
                Ok(Ok(quality)) => quality,
                _ => {
                    writeln!(out, "enter a number from 0 to 5")?;
                    continue;
                }
            };

            writeln!(out, "  {}", item.content.detail())?;
            session.grade_current(&self.service, quality)?;
        }

        writeln!(out, "Session complete")?;
        Ok(())
    }

    fn print_item(&self, out: &mut impl Write, item: &LearningItem) -> Result<()> {
        if self.json {
            return self.print_json(out, item);
        }
        let due = match item.schedule.next_review_at {
            Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
            None => "now".to_string(),
        };
        writeln!(
            out,
            "#{} [{}] {} = {} | ease {:.2}, every {}, due {}, reviewed {}x",
            item.id,
            item.kind(),
            item.content.term(),
            item.content.detail(),
            item.schedule.ease_factor,
            format_interval(item.schedule.interval_days),
            due,
            item.schedule.review_count
        )?;
        Ok(())
    }

    fn print_json<T: Serialize + ?Sized>(&self, out: &mut impl Write, value: &T) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, value)?;
        writeln!(out)?;
        Ok(())
    }
}
