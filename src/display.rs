//! Text helpers shared by the views.

use chrono::{DateTime, Utc};

use crate::models::Conversation;

const SNIPPET_CHARS: usize = 30;

/// First 30 characters of an email followed by an ellipsis.
pub fn snippet(text: &str) -> String {
    let head: String = text.chars().take(SNIPPET_CHARS).collect();
    format!("{head}...")
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

pub fn recipient_label(conversation: &Conversation) -> &str {
    conversation.recipient_name.as_deref().unwrap_or("Recipient")
}

/// "Name (Title at Company)"
pub fn sender_line(conversation: &Conversation) -> String {
    format!(
        "{} ({} at {})",
        conversation.sender_name, conversation.sender_title, conversation.sender_company_name
    )
}

/// "Title at Company", shown under the sender's name in the details panel.
pub fn sender_role(conversation: &Conversation) -> String {
    format!("{} at {}", conversation.sender_title, conversation.sender_company_name)
}

pub fn follow_up_count(conversation: &Conversation) -> String {
    format!("{} follow-up messages", conversation.follow_up_messages.len())
}

/// Character-by-character reveal of a block of text.
///
/// Purely cosmetic: callers advance it on a timer and may `finish` at any time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reveal {
    text: String,
    shown: usize,
    total: usize,
}

impl Reveal {
    pub const TICK_MS: u32 = 12;

    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let total = text.chars().count();
        Self { text, shown: 0, total }
    }

    /// Reveals one more character. Returns false once everything is shown.
    pub fn advance(&mut self) -> bool {
        if self.shown < self.total {
            self.shown += 1;
        }
        self.shown < self.total
    }

    pub fn finish(&mut self) {
        self.shown = self.total;
    }

    pub fn is_done(&self) -> bool {
        self.shown >= self.total
    }

    pub fn visible(&self) -> &str {
        match self.text.char_indices().nth(self.shown) {
            Some((byte, _)) => &self.text[..byte],
            None => &self.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::sample_conversation;
    use crate::models::Purpose;

    #[test]
    fn snippet_is_char_safe() {
        assert_eq!(snippet("short"), "short...");
        let long = "é".repeat(40);
        assert_eq!(snippet(&long), format!("{}...", "é".repeat(30)));
    }

    #[test]
    fn reveal_walks_characters() {
        let mut reveal = Reveal::new("héllo");
        assert_eq!(reveal.visible(), "");
        assert!(reveal.advance());
        assert!(reveal.advance());
        assert_eq!(reveal.visible(), "hé");
        while reveal.advance() {}
        assert_eq!(reveal.visible(), "héllo");
        assert!(reveal.is_done());
    }

    #[test]
    fn reveal_finish_shows_everything() {
        let mut reveal = Reveal::new("Dear team");
        reveal.finish();
        assert_eq!(reveal.visible(), "Dear team");
        assert!(!reveal.advance());
    }

    #[test]
    fn sender_formats() {
        let mut conversation = sample_conversation("c1", Purpose::Sales);
        assert_eq!(sender_line(&conversation), "Al (Eng at Acme)");
        assert_eq!(sender_role(&conversation), "Eng at Acme");
        assert_eq!(recipient_label(&conversation), "Recipient");

        conversation.recipient_name = Some("Hank".into());
        assert_eq!(recipient_label(&conversation), "Hank");
    }

    #[test]
    fn follow_up_count_reads_message_list() {
        let mut conversation = sample_conversation("c1", Purpose::Networking);
        assert_eq!(follow_up_count(&conversation), "0 follow-up messages");
        conversation.follow_up_messages = vec!["Shorter".into(), "Warmer".into()];
        assert_eq!(follow_up_count(&conversation), "2 follow-up messages");
    }
}
