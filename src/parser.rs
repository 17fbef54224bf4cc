use anyhow::Result;

/// Splits a command line with shell quoting rules: whitespace separates
/// words, quotes group them and backslash escapes the next character.
pub fn split_command(command: &str) -> Result<Vec<String>> {
    let parts = shell_words::split(command)?;
    Ok(parts)
}

/// Splits the text left of the cursor the way [`split_command`] would split
/// the finished line. An open quote is closed so the word being typed stays
/// whole; trailing whitespace outside quotes starts an empty word.
pub fn split_partial(text: &str) -> Vec<String> {
    for closing in ["", "\"", "'"] {
        if let Ok(mut words) = shell_words::split(&format!("{text}{closing}")) {
            let open_word = text.ends_with(char::is_whitespace) && !text.ends_with("\\ ");
            if closing.is_empty() && open_word {
                words.push(String::new());
            }
            return words;
        }
    }
    text.split_whitespace().map(str::to_string).collect()
}

/// Byte offset where the word under the cursor begins, quotes included.
pub fn last_word_start(text: &str) -> usize {
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => {}
            None if ch == '\\' => escaped = true,
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch.is_whitespace() => start = idx + ch.len_utf8(),
            None => {}
        }
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_runs_of_whitespace() {
        assert_eq!(split_command("  cp   a  b ").unwrap(), vec!["cp", "a", "b"]);
    }

    #[test]
    fn quotes_group_words_and_are_stripped() {
        assert_eq!(
            split_command(r#"mkdir "Quarterly Reports""#).unwrap(),
            vec!["mkdir", "Quarterly Reports"]
        );
        assert_eq!(
            split_command("rename abc 'it''s'").unwrap(),
            vec!["rename", "abc", "its"]
        );
        assert_eq!(split_command(r"mkdir a\ b").unwrap(), vec!["mkdir", "a b"]);
    }

    #[test]
    fn partial_words_follow_the_same_quoting() {
        assert_eq!(split_partial(r#"mv "Tax Re"#), vec!["mv", "Tax Re"]);
        assert_eq!(split_partial(r#"mv "Tax Re "#), vec!["mv", "Tax Re "]);
        assert_eq!(split_partial("cd "), vec!["cd", ""]);
        assert_eq!(split_partial(r"mkdir a\ "), vec!["mkdir", "a "]);
        assert_eq!(split_partial("ls"), vec!["ls"]);
    }

    #[test]
    fn word_start_skips_quoted_spaces() {
        assert_eq!(last_word_start(r#"mv "Tax Re"#), 3);
        assert_eq!(last_word_start("cd do"), 3);
        assert_eq!(last_word_start("cd "), 3);
        assert_eq!(last_word_start(r"mkdir a\ b"), 6);
        assert_eq!(last_word_start(""), 0);
    }

    #[test]
    fn unbalanced_quotes_are_rejected() {
        assert!(split_command(r#"mkdir "open"#).is_err());
    }
}
