use smallvec::SmallVec;

pub type MoveList = SmallVec<[String; 64]>;

/// One recorded game: the players, the verbatim `Date`/`Time` tags and both
/// players' half-moves in alternation (`moves_a` always moves first).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameRecord {
    pub white: String,
    pub black: String,
    pub date: String,
    pub time: String,
    pub moves_a: MoveList,
    pub moves_b: MoveList,
}

impl GameRecord {
    pub fn has_moves(&self) -> bool {
        !self.moves_a.is_empty()
    }

    /// Case-insensitive match against either player.
    pub fn involves(&self, name: &str) -> bool {
        eq_ignore_case(&self.white, name) || eq_ignore_case(&self.black, name)
    }

    pub fn opening_move(&self) -> Option<&str> {
        self.moves_a.first().map(String::as_str)
    }

    /// Number of move-pair rows this record occupies in a table.
    pub fn move_rows(&self) -> usize {
        self.moves_a.len().max(self.moves_b.len())
    }
}

fn eq_ignore_case(left: &str, right: &str) -> bool {
    left.eq_ignore_ascii_case(right) || left.to_lowercase() == right.to_lowercase()
}
