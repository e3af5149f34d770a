//! Plain-text rendering of quiz screens for the terminal front end.

use std::fmt::Write as _;

use crate::vm::{ItemStatus, QuizScreenVm, SummaryVm};

#[must_use]
pub fn render_screen(screen: &QuizScreenVm) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}] {}", screen.variant, screen.position_label);
    let _ = writeln!(out, "  {}", screen.prompt_line);
    if let Some(meaning) = &screen.meaning {
        let _ = writeln!(out, "  meaning: {meaning}");
    }
    if let Some(translation) = &screen.translation {
        let _ = writeln!(out, "  translation: {translation}");
    }

    if !screen.chips.is_empty() {
        let chips: Vec<String> = screen
            .chips
            .iter()
            .map(|chip| {
                if chip.used {
                    format!("({}) ~{}~", chip.number, chip.token)
                } else {
                    format!("({}) {}", chip.number, chip.token)
                }
            })
            .collect();
        let _ = writeln!(out, "  {}", chips.join("  "));
    }

    match screen.status {
        ItemStatus::Pending => {}
        ItemStatus::Correct => out.push_str("  correct!\n"),
        ItemStatus::Incorrect => out.push_str("  not quite.\n"),
        ItemStatus::Locked => out.push_str("  no hints left, marked incorrect.\n"),
    }
    if let Some(notice) = &screen.notice {
        let _ = writeln!(out, "  ! {notice}");
    }

    let mut commands = Vec::new();
    if let Some(left) = screen.hints_remaining {
        commands.push(format!(":hint ({left} left)"));
    }
    if screen.can_prev {
        commands.push(":prev".to_owned());
    }
    if screen.can_next {
        commands.push(":next".to_owned());
    }
    if screen.can_finalize {
        commands.push(":final".to_owned());
    }
    commands.push(":quit".to_owned());
    let _ = writeln!(out, "  {}", commands.join(" "));
    out
}

#[must_use]
pub fn render_summary(summary: &SummaryVm) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} quiz, attempt {}: {} / {} ({})",
        summary.variant, summary.attempt, summary.score, summary.total, summary.accuracy_str
    );
    let _ = writeln!(out, "  finished {}", summary.completed_at_str);
    for missed in &summary.missed {
        let prompt = if missed.prompt.is_empty() {
            "(no prompt)"
        } else {
            missed.prompt.as_str()
        };
        match &missed.meaning {
            Some(meaning) => {
                let _ = writeln!(out, "  x {prompt} -> {} ({meaning})", missed.answer);
            }
            None => {
                let _ = writeln!(out, "  x {prompt} -> {}", missed.answer);
            }
        }
    }
    if summary.can_retry {
        out.push_str("  :retry to practise the missed items, :restart for all, :quit\n");
    } else {
        out.push_str("  :restart for all, :quit\n");
    }
    out
}
