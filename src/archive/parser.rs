use super::input::{self, CompressionMode};
use super::types::GameRecord;
use regex::Regex;
use std::io;
use std::mem;
use std::path::Path;
use std::sync::LazyLock;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{.*?\}").expect("valid comment regex"));

static MOVE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.$").expect("valid move number regex"));

const RESULT_TOKENS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum TagKind {
    White,
    Black,
    Date,
    Time,
}

impl TagKind {
    fn from_line(line: &str) -> Option<Self> {
        const PREFIXES: [(&str, TagKind); 4] = [
            ("[White \"", TagKind::White),
            ("[Black \"", TagKind::Black),
            ("[Date \"", TagKind::Date),
            ("[Time \"", TagKind::Time),
        ];

        PREFIXES
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix))
            .map(|(_, kind)| *kind)
    }
}

#[derive(Debug, Eq, PartialEq)]
enum Line<'a> {
    Tag(TagKind, &'a str),
    Movetext,
    Other,
}

impl<'a> Line<'a> {
    fn classify(line: &'a str) -> Self {
        if let Some(kind) = TagKind::from_line(line) {
            return Self::Tag(kind, tag_value(line));
        }

        if line.starts_with(|c: char| c.is_ascii_digit()) {
            Self::Movetext
        } else {
            Self::Other
        }
    }
}

/// Text between the first and second double quote. Without a closing quote the
/// rest of the line is taken; anything past that is undefined on malformed input.
fn tag_value(line: &str) -> &str {
    let mut parts = line.split('"');
    parts.next();
    parts.next().unwrap_or_default()
}

enum ParserState {
    AwaitingWhite,
    InRecord(GameRecord),
}

impl ParserState {
    fn take_record(&mut self) -> Option<GameRecord> {
        match mem::replace(self, Self::AwaitingWhite) {
            Self::InRecord(game) => Some(game),
            Self::AwaitingWhite => None,
        }
    }
}

fn is_result_token(token: &str) -> bool {
    RESULT_TOKENS.contains(&token)
}

/// Places one movetext token, keeping `moves_a` and `moves_b` in strict
/// alternation. Result tokens are folded into the half-move placed last.
fn push_token(game: &mut GameRecord, token: &str) {
    if MOVE_NUMBER_RE.is_match(token) {
        return;
    }

    if is_result_token(token) {
        let last = if game.moves_b.len() < game.moves_a.len() {
            game.moves_a.last_mut()
        } else {
            game.moves_b.last_mut()
        };
        if let Some(last) = last {
            last.push_str(" (");
            last.push_str(token);
            last.push(')');
        }
        return;
    }

    if game.moves_a.len() == game.moves_b.len() {
        game.moves_a.push(token.to_string());
    } else {
        game.moves_b.push(token.to_string());
    }
}

fn push_movetext(game: &mut GameRecord, line: &str) {
    let cleaned = COMMENT_RE.replace_all(line, "");
    for token in cleaned.split_whitespace() {
        push_token(game, token);
    }
}

fn set_tag(game: &mut GameRecord, kind: TagKind, value: &str) {
    let slot = match kind {
        TagKind::White => &mut game.white,
        TagKind::Black => &mut game.black,
        TagKind::Date => &mut game.date,
        TagKind::Time => &mut game.time,
    };
    *slot = value.to_string();
}

/// Parses every game in `text`.
///
/// Games without any move are dropped. A non-empty `name_filter` keeps only
/// games where either player matches it case-insensitively. The result is
/// ordered by descending `date`, then descending `time` (plain string order).
pub fn parse_games(text: &str, name_filter: &str) -> Vec<GameRecord> {
    let mut games = Vec::new();
    let mut state = ParserState::AwaitingWhite;

    for line in text.lines().map(str::trim) {
        match Line::classify(line) {
            Line::Tag(TagKind::White, value) => {
                if let Some(finished) = state.take_record() {
                    games.push(finished);
                }
                state = ParserState::InRecord(GameRecord {
                    white: value.to_string(),
                    ..GameRecord::default()
                });
            }
            Line::Tag(kind, value) => {
                if let ParserState::InRecord(game) = &mut state {
                    set_tag(game, kind, value);
                }
            }
            Line::Movetext => {
                if let ParserState::InRecord(game) = &mut state {
                    push_movetext(game, line);
                }
            }
            Line::Other => {}
        }
    }

    if let Some(finished) = state.take_record() {
        games.push(finished);
    }

    games.retain(|game| {
        game.has_moves() && (name_filter.is_empty() || game.involves(name_filter))
    });
    games.sort_by(|left, right| {
        right
            .date
            .cmp(&left.date)
            .then_with(|| right.time.cmp(&left.time))
    });
    games
}

/// Reads and parses one game log. A path that does not exist yields no games;
/// every other I/O failure is returned to the caller.
pub fn parse_path(
    path: &Path,
    name_filter: &str,
    compression: CompressionMode,
) -> io::Result<Vec<GameRecord>> {
    match input::read_input(path, compression) {
        Ok(text) => Ok(parse_games(&text, name_filter)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const TWO_GAMES: &str = r#"
[Event "Club night"]
[White "Alice"]
[Black "Bob"]
[Date "2024.01.01"]
[Time "10:00:00"]
1. 94 72 2. 23 {forced} 61
3. 85 1-0

[White "Carol"]
[Black "Dave"]
[Date "2024.02.01"]
[Time "09:30:00"]
1. 94 15 2. 77 0-1
"#;

    fn moves(list: &[&str]) -> Vec<String> {
        list.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_parse_two_games_ordered_by_date_desc() {
        let games = parse_games(TWO_GAMES, "");
        assert_eq!(games.len(), 2);

        assert_eq!(games[0].white, "Carol");
        assert_eq!(games[0].black, "Dave");
        assert_eq!(games[0].date, "2024.02.01");
        assert_eq!(games[0].time, "09:30:00");
        assert_eq!(games[0].moves_a.to_vec(), moves(&["94", "77 (0-1)"]));
        assert_eq!(games[0].moves_b.to_vec(), moves(&["15"]));

        assert_eq!(games[1].white, "Alice");
        assert_eq!(games[1].moves_a.to_vec(), moves(&["94", "23", "85 (1-0)"]));
        assert_eq!(games[1].moves_b.to_vec(), moves(&["72", "61"]));
    }

    #[test]
    fn test_result_attaches_to_last_half_move() {
        let text = "[White \"A\"]\n1. e2e4 e7e5 1-0\n";
        let games = parse_games(text, "");
        assert_eq!(games[0].moves_a.to_vec(), moves(&["e2e4"]));
        assert_eq!(games[0].moves_b.to_vec(), moves(&["e7e5 (1-0)"]));
    }

    #[test]
    fn test_result_without_moves_is_dropped() {
        let mut game = GameRecord::default();
        push_token(&mut game, "*");
        assert!(game.moves_a.is_empty());
        assert!(game.moves_b.is_empty());
    }

    #[test]
    fn test_draw_and_unfinished_results() {
        let text = "[White \"A\"]\n1. 11 22 2. 33 1/2-1/2\n[White \"B\"]\n1. 44 *\n";
        let games = parse_games(text, "");
        let draw = games.iter().find(|g| g.white == "A").unwrap();
        assert_eq!(draw.moves_a.to_vec(), moves(&["11", "33 (1/2-1/2)"]));
        let open = games.iter().find(|g| g.white == "B").unwrap();
        assert_eq!(open.moves_a.to_vec(), moves(&["44 (*)"]));
    }

    #[test]
    fn test_alternation_holds_at_every_prefix() {
        let mut game = GameRecord::default();
        let tokens = "1. a b 2. c d 3. e 1-0 f g 4. h".split_whitespace();
        for token in tokens {
            push_token(&mut game, token);
            let diff = game.moves_a.len() - game.moves_b.len();
            assert!(diff <= 1, "alternation broken after '{}'", token);
        }
        assert_eq!(game.moves_a.to_vec(), moves(&["a", "c", "e (1-0)", "g"]));
        assert_eq!(game.moves_b.to_vec(), moves(&["b", "d", "f", "h"]));
    }

    #[test]
    fn test_movetext_spans_multiple_lines() {
        let text = "[White \"A\"]\n1. 11 22\n2. 33 44\n3. 55\n";
        let games = parse_games(text, "");
        assert_eq!(games[0].moves_a.to_vec(), moves(&["11", "33", "55"]));
        assert_eq!(games[0].moves_b.to_vec(), moves(&["22", "44"]));
    }

    #[test]
    fn test_filter_by_player_case_insensitive() {
        let games = parse_games(TWO_GAMES, "alice");
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].white, "Alice");

        let games = parse_games(TWO_GAMES, "DAVE");
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].black, "Dave");

        assert!(parse_games(TWO_GAMES, "Eve").is_empty());
    }

    #[test]
    fn test_filter_is_matched_verbatim() {
        assert!(parse_games(TWO_GAMES, " Alice ").is_empty());
        assert!(parse_games(TWO_GAMES, "   ").is_empty());
    }

    #[test]
    fn test_record_without_moves_is_discarded() {
        let text = r#"
[White "Alice"]
[Black "Bob"]
[Date "2024.01.01"]
"#;
        assert!(parse_games(text, "").is_empty());
    }

    #[test]
    fn test_tags_before_white_are_ignored() {
        let text = r#"
[Black "Ghost"]
[Date "1999.01.01"]
1. 11 22
[White "Alice"]
[Black "Bob"]
1. 33 44
"#;
        let games = parse_games(text, "");
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].black, "Bob");
        assert_eq!(games[0].date, "");
        assert_eq!(games[0].moves_a.to_vec(), moves(&["33"]));
    }

    #[test]
    fn test_unknown_tags_and_noise_lines_are_ignored() {
        let text = r#"
[White "Alice"]
[Site "Almaty"]
random notes here
  [Black "Bob"]
1. 11 22
"#;
        let games = parse_games(text, "");
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].black, "Bob");
        assert_eq!(games[0].moves_a.to_vec(), moves(&["11"]));
    }

    #[test]
    fn test_tag_without_closing_quote_takes_rest_of_line() {
        assert_eq!(tag_value("[White \"Alice]"), "Alice]");
        assert_eq!(tag_value("[White \"Alice\"]"), "Alice");
    }

    #[test]
    fn test_comments_are_stripped_before_tokenizing() {
        let text = "[White \"A\"]\n1. 11 {good move} 22 {x}2. 33\n";
        let games = parse_games(text, "");
        assert_eq!(games[0].moves_a.to_vec(), moves(&["11", "33"]));
        assert_eq!(games[0].moves_b.to_vec(), moves(&["22"]));
    }

    #[test]
    fn test_same_date_orders_by_time_desc() {
        let text = r#"
[White "Early"]
[Date "2024.01.01"]
[Time "08:00:00"]
1. 11
[White "Late"]
[Date "2024.01.01"]
[Time "18:00:00"]
1. 22
"#;
        let games = parse_games(text, "");
        assert_eq!(games[0].white, "Late");
        assert_eq!(games[1].white, "Early");
    }

    #[test]
    fn test_parse_path_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let games = parse_path(&dir.path().join("nope.txt"), "", CompressionMode::Plain).unwrap();
        assert!(games.is_empty());
    }

    #[test]
    fn test_parse_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.txt");
        fs::write(&path, TWO_GAMES).unwrap();

        let games = parse_path(&path, "Carol", CompressionMode::Plain).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].white, "Carol");
    }
}
