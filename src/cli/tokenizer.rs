/// Split a raw command line into tokens.
///
/// Text between double quotes is one token, spaces included. Outside quotes
/// the line splits on whitespace. Empty tokens are dropped. An unbalanced
/// quote keeps everything after it as a single quoted token.
pub fn tokenize(line: &str) -> Vec<String> {
    line.trim()
        .split('"')
        .enumerate()
        .flat_map(|(index, segment)| {
            if index % 2 == 0 {
                segment.split_whitespace().map(str::to_string).collect::<Vec<_>>()
            } else {
                vec![segment.to_string()]
            }
        })
        .filter(|token| !token.is_empty())
        .collect()
}

/// Normalize process arguments: trim, drop stray quote characters, drop empties.
pub fn normalize_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|arg| arg.as_ref().trim().replace('"', ""))
        .filter(|arg| !arg.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_quoted_path_is_one_token() {
        assert_eq!(
            tokenize(r#"mode "C:\a b\c.ark" out.json"#),
            vec!["mode", r"C:\a b\c.ark", "out.json"]
        );
    }

    #[test]
    fn test_whitespace_runs_and_empty_quotes() {
        assert_eq!(
            tokenize("  asvexport   json  \"\"  cfg.json  "),
            vec!["asvexport", "json", "cfg.json"]
        );
    }

    #[test]
    fn test_adjacent_quotes_split_tokens() {
        assert_eq!(tokenize(r#"a"b c"d"#), vec!["a", "b c", "d"]);
    }

    #[test]
    fn test_unbalanced_quote_runs_to_end() {
        assert_eq!(
            tokenize(r#"tribes "C:\My Saves\TheIsland.ark out.json"#),
            vec!["tribes", r"C:\My Saves\TheIsland.ark out.json"]
        );
    }

    #[test]
    fn test_normalize_args() {
        let args = normalize_args(["asvexport", " PACK ", "", "\"cfg.json\""]);
        assert_eq!(args, vec!["asvexport", "PACK", "cfg.json"]);
    }

    proptest! {
        #[test]
        fn quoted_segments_are_never_resplit(
            words in proptest::collection::vec("[a-z]{1,8}", 1..4),
            quoted in "[a-z]{1,5}( [a-z]{1,5}){1,3}",
        ) {
            let line = format!("{} \"{}\" {}", words.join(" "), quoted, words.join(" "));
            let tokens = tokenize(&line);

            prop_assert_eq!(tokens.len(), words.len() * 2 + 1);
            prop_assert_eq!(&tokens[words.len()], &quoted);
        }
    }
}
