//! Turns an item plus the current input buffer into display segments.

use crate::model::{AnswerInput, BLANK_MARKER, QuizItem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Blank { index: usize, filled: Option<String> },
}

/// A selectable token of a choice-based item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceChip {
    pub index: usize,
    pub token: String,
    pub used: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedItem {
    pub segments: Vec<Segment>,
    pub chips: Vec<ChoiceChip>,
}

impl RenderedItem {
    /// Single-line rendering: empty blanks as `____`, filled ones in brackets.
    #[must_use]
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Blank { filled: None, .. } => out.push_str("____"),
                Segment::Blank {
                    filled: Some(text), ..
                } => {
                    out.push('[');
                    out.push_str(text);
                    out.push(']');
                }
            }
        }
        out
    }

    #[must_use]
    pub fn blank_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Blank { .. }))
            .count()
    }
}

pub trait ItemRenderer: Send + Sync {
    fn render(&self, item: &QuizItem, input: &AnswerInput) -> RenderedItem;
}

fn filled(text: Option<&str>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty()).map(str::to_owned)
}

/// Prompt template with `___` markers replaced by blanks.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlankTemplateRenderer;

impl ItemRenderer for BlankTemplateRenderer {
    fn render(&self, item: &QuizItem, input: &AnswerInput) -> RenderedItem {
        let mut segments = Vec::new();
        let prompt = item.prompt();
        let blanks = item.expected().blank_count();

        if prompt.contains(BLANK_MARKER) {
            for (i, part) in prompt.split(BLANK_MARKER).enumerate() {
                if i > 0 {
                    let index = i - 1;
                    segments.push(Segment::Blank {
                        index,
                        filled: filled(input.blank_text(index)),
                    });
                }
                if !part.is_empty() {
                    segments.push(Segment::Text(part.to_owned()));
                }
            }
        } else {
            if !prompt.is_empty() {
                segments.push(Segment::Text(format!("{prompt} ")));
            }
            for index in 0..blanks {
                if index > 0 {
                    segments.push(Segment::Text(" ".to_owned()));
                }
                segments.push(Segment::Blank {
                    index,
                    filled: filled(input.blank_text(index)),
                });
            }
        }

        RenderedItem {
            segments,
            chips: Vec::new(),
        }
    }
}

/// Prompt followed by one slot per answer token, filled from picked chips.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChoiceRenderer;

impl ItemRenderer for ChoiceRenderer {
    fn render(&self, item: &QuizItem, input: &AnswerInput) -> RenderedItem {
        let picked: &[usize] = match input {
            AnswerInput::Choices(picked) => picked,
            _ => &[],
        };
        let choices = item.choices();

        let mut segments = Vec::new();
        if !item.prompt().is_empty() {
            segments.push(Segment::Text(format!("{} ", item.prompt())));
        }
        for index in 0..item.expected().blank_count() {
            if index > 0 {
                segments.push(Segment::Text(" ".to_owned()));
            }
            let filled = picked
                .get(index)
                .and_then(|&choice| choices.get(choice))
                .cloned();
            segments.push(Segment::Blank { index, filled });
        }

        let chips = choices
            .iter()
            .enumerate()
            .map(|(index, token)| ChoiceChip {
                index,
                token: token.clone(),
                used: picked.contains(&index),
            })
            .collect();

        RenderedItem { segments, chips }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemId;

    #[test]
    fn template_blanks_are_filled_in_order() {
        let item = QuizItem::phrase(
            ItemId::new(1),
            "I ___ to ___ it.",
            vec!["want".into(), "see".into()],
        )
        .unwrap();
        let input = AnswerInput::Blanks(vec!["want".into(), String::new()]);
        let rendered = BlankTemplateRenderer.render(&item, &input);
        assert_eq!(rendered.blank_count(), 2);
        assert_eq!(rendered.to_plain_text(), "I [want] to ____ it.");
    }

    #[test]
    fn prompt_without_marker_gets_trailing_blank() {
        let item = QuizItem::blank(ItemId::new(2), "사과", "apple").unwrap();
        let rendered = BlankTemplateRenderer.render(&item, &AnswerInput::Text(String::new()));
        assert_eq!(rendered.to_plain_text(), "사과 ____");
    }

    #[test]
    fn leading_marker_renders_blank_first() {
        let item = QuizItem::blank(ItemId::new(3), "___ is red", "apple").unwrap();
        let rendered = BlankTemplateRenderer.render(&item, &AnswerInput::Text("ap".into()));
        assert_eq!(
            rendered.segments[0],
            Segment::Blank {
                index: 0,
                filled: Some("ap".into())
            }
        );
    }

    #[test]
    fn choice_renderer_marks_used_chips() {
        let item = QuizItem::sentence(
            ItemId::new(4),
            "",
            vec!["good".into(), "morning".into()],
            vec!["morning".into(), "good".into(), "night".into()],
        )
        .unwrap();
        let rendered = ChoiceRenderer.render(&item, &AnswerInput::Choices(vec![1]));
        assert_eq!(rendered.to_plain_text(), "[good] ____");
        let used: Vec<bool> = rendered.chips.iter().map(|c| c.used).collect();
        assert_eq!(used, vec![false, true, false]);
    }
}
