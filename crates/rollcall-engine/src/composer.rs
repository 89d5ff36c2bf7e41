//! MarkdownV2-safe message composition.
//!
//! Every piece of text placed into an outgoing message — fixed notices,
//! display names, chat titles, salutations — goes through
//! [`escape_markdown_v2`]. A single unescaped reserved character can corrupt
//! the whole message's formatting or get the send rejected outright.

use rollcall_core::types::UserRecord;

/// Escape special characters for Telegram MarkdownV2.
///
/// MarkdownV2 requires escaping: `` _ * [ ] ( ) ~ ` > # + - = | { } . ! ``
pub fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '='
            | '|' | '{' | '}' | '.' | '!' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// One mention token. Members with a public handle get an at-reference;
/// everyone else gets a deep link on their numeric id, which notifies them
/// even without a handle.
pub fn mention_token(user: &UserRecord) -> String {
    match &user.username {
        Some(handle) => format!("@{}", escape_markdown_v2(handle)),
        None => format!(
            "[{}](tg://user?id={})",
            escape_markdown_v2(&user.display_name()),
            user.id
        ),
    }
}

/// The group mention body: one token per audience member, joined with the
/// configured separator.
pub fn compose_mentions(audience: &[UserRecord], separator: &str) -> String {
    audience
        .iter()
        .map(mention_token)
        .collect::<Vec<_>>()
        .join(separator)
}

/// The individual notice sent during private fan-out.
pub fn compose_fanout_notice(
    recipient: &UserRecord,
    chat_title: Option<&str>,
    author: &UserRecord,
) -> String {
    let title = chat_title.unwrap_or("the group chat");
    format!(
        "{}, you were mentioned in {} by {}",
        escape_markdown_v2(recipient.greeting_name()),
        escape_markdown_v2(title),
        escape_markdown_v2(&author.display_name())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::types::ChatIdent;

    /// Strip the backslash before every reserved character. Escaping must be
    /// round-trippable: unescape(escape(x)) == x.
    fn unescape(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '\\' {
                if let Some(&next) = chars.peek() {
                    if "_*[]()~`>#+-=|{}.!".contains(next) {
                        out.push(next);
                        chars.next();
                        continue;
                    }
                }
            }
            out.push(ch);
        }
        out
    }

    #[test]
    fn every_reserved_character_is_escaped() {
        let reserved = "_*[]()~`>#+-=|{}.!";
        let escaped = escape_markdown_v2(reserved);
        for ch in reserved.chars() {
            assert!(
                escaped.contains(&format!("\\{ch}")),
                "missing escape for {ch}"
            );
        }
        // Each reserved char costs exactly one backslash.
        assert_eq!(escaped.len(), reserved.len() * 2);
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(escape_markdown_v2("hello world 123"), "hello world 123");
    }

    #[test]
    fn escaping_round_trips() {
        let inputs = [
            "Dr. Strange (the 2nd)!",
            "a_b*c[d]e~f`g>h#i+j-k=l|m{n}o.p!q",
            "нет ограничений на кириллицу",
            "",
        ];
        for input in inputs {
            assert_eq!(unescape(&escape_markdown_v2(input)), input, "{input:?}");
        }
    }

    #[test]
    fn handle_token_is_an_at_reference() {
        let mut u = UserRecord::new(10, "Ann");
        u.username = Some("ann_smith".into());
        assert_eq!(mention_token(&u), "@ann\\_smith");
    }

    #[test]
    fn handle_less_token_is_a_deep_link() {
        let mut u = UserRecord::new(11, "Bob");
        u.last_name = Some("B.".into());
        assert_eq!(mention_token(&u), "[Bob B\\.](tg://user?id=11)");
    }

    #[test]
    fn tokens_join_with_the_separator() {
        let a = UserRecord::new(1, "A");
        let mut b = UserRecord::new(2, "B");
        b.username = Some("bee".into());
        let body = compose_mentions(&[a, b], "\n");
        assert_eq!(body, "[A](tg://user?id=1)\n@bee");
    }

    #[test]
    fn fanout_notice_uses_salutation_and_title() {
        let mut recipient = UserRecord::new(5, "Robert");
        recipient.salutation = Some("Bob".into());
        recipient.private_chat = Some(ChatIdent(500));
        let author = UserRecord::new(6, "Eve");

        let notice = compose_fanout_notice(&recipient, Some("Ops. Team"), &author);
        assert_eq!(notice, "Bob, you were mentioned in Ops\\. Team by Eve");
    }

    #[test]
    fn fanout_notice_falls_back_without_title() {
        let recipient = UserRecord::new(5, "Robert");
        let author = UserRecord::new(6, "Eve");
        let notice = compose_fanout_notice(&recipient, None, &author);
        assert!(notice.contains("the group chat"));
        assert!(notice.starts_with("Robert,"));
    }
}
