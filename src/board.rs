//! Board collaborator: the contract the navigation engine drives, plus a
//! reference 2D implementation.
//!
//! The engine never inspects stones itself. It calls [`Board::place_stone`]
//! and [`Board::place_marker`] once per point as it walks forward, and
//! [`Board::undo_last_mutation`] the same number of times when it walks
//! back. Every `place_*` call and every [`Board::clear_markers`] call is
//! exactly one mutation.

use std::fmt;

use crate::constants::DEFAULT_BOARD_SIZE;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

/// Board markup drawn on top of a point.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    Square,
    Circle,
    Triangle,
    Cross,
}

/// A board point as `(x, y)`: column from the left, row from the top.
pub type Point = (usize, usize);

/// Stone-grid state that can be mutated one point at a time and reverted.
pub trait Board {
    /// Clear everything (stones, markers, captures, history) and resize.
    fn reset(&mut self, size: usize);

    /// Put a stone on `point`. `is_move` distinguishes a played move (which
    /// may capture) from a setup stone (which never does).
    fn place_stone(&mut self, point: Point, color: Color, is_move: bool);

    fn place_marker(&mut self, point: Point, marker: Marker);

    /// Remove every marker on the board as one mutation.
    fn clear_markers(&mut self);

    /// Revert the most recent mutation. Returns `true` iff something was reverted.
    fn undo_last_mutation(&mut self) -> bool;

    /// Prisoners taken so far as `(by_black, by_white)`.
    fn captured_counts(&self) -> (u32, u32);
}

/// Everything one mutation changed, so it can be put back.
#[derive(Clone, Debug)]
struct Mutation {
    cells: Vec<(usize, Option<Color>)>,
    markers: Vec<(usize, Option<Marker>)>,
    captures: (u32, u32),
}

/// Reference [`Board`] with capture resolution and a full undo history.
///
/// No legality checks are made: records are replayed as written.
#[derive(Clone, Debug)]
pub struct GoBoard {
    pub size: usize,
    cells: Vec<Option<Color>>,
    markers: Vec<Option<Marker>>,
    captures: (u32, u32),
    history: Vec<Mutation>,
}

impl Default for GoBoard {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_SIZE)
    }
}

impl GoBoard {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
            markers: vec![None; size * size],
            captures: (0, 0),
            history: Vec::new(),
        }
    }

    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.cells[self.idx(x, y)]
    }

    pub fn marker(&self, x: usize, y: usize) -> Option<Marker> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.markers[self.idx(x, y)]
    }

    /// Number of mutations that can still be undone.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Compare the visible state (stones, markers, captures), ignoring history.
    pub fn same_position(&self, other: &GoBoard) -> bool {
        self.size == other.size
            && self.cells == other.cells
            && self.markers == other.markers
            && self.captures == other.captures
    }

    fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = Point> + '_ {
        let s = self.size;
        let mut v = Vec::with_capacity(4);
        if x > 0 {
            v.push((x - 1, y));
        }
        if x + 1 < s {
            v.push((x + 1, y));
        }
        if y > 0 {
            v.push((x, y - 1));
        }
        if y + 1 < s {
            v.push((x, y + 1));
        }
        v.into_iter()
    }

    fn set_cell(&mut self, m: &mut Mutation, i: usize, value: Option<Color>) {
        m.cells.push((i, self.cells[i]));
        self.cells[i] = value;
    }

    fn take_markers(&mut self, m: &mut Mutation) {
        for i in 0..self.markers.len() {
            if self.markers[i].is_some() {
                m.markers.push((i, self.markers[i]));
                self.markers[i] = None;
            }
        }
    }

    fn remove_group(&mut self, m: &mut Mutation, x: usize, y: usize) -> u32 {
        let mut group = Vec::new();
        self.collect_group(x, y, &mut group);
        for &(gx, gy) in &group {
            let i = self.idx(gx, gy);
            self.set_cell(m, i, None);
        }
        group.len() as u32
    }

    fn credit(&mut self, color: Color, count: u32) {
        match color {
            Color::Black => self.captures.0 += count,
            Color::White => self.captures.1 += count,
        }
    }

    fn collect_group(&self, x: usize, y: usize, out: &mut Vec<Point>) {
        let Some(color) = self.get(x, y) else {
            return;
        };
        let mut stack = vec![(x, y)];
        let mut visited = vec![false; self.size * self.size];
        while let Some((cx, cy)) = stack.pop() {
            let i = self.idx(cx, cy);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            if self.get(cx, cy) == Some(color) {
                out.push((cx, cy));
                for (nx, ny) in self.neighbors(cx, cy) {
                    let ni = self.idx(nx, ny);
                    if !visited[ni] && self.get(nx, ny) == Some(color) {
                        stack.push((nx, ny));
                    }
                }
            }
        }
    }

    fn group_liberties(&self, x: usize, y: usize) -> usize {
        let Some(color) = self.get(x, y) else {
            return 0;
        };
        let mut stack = vec![(x, y)];
        let mut visited = vec![false; self.size * self.size];
        let mut counted = vec![false; self.size * self.size];
        let mut liberties = 0;
        while let Some((cx, cy)) = stack.pop() {
            let i = self.idx(cx, cy);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            for (nx, ny) in self.neighbors(cx, cy) {
                let ni = self.idx(nx, ny);
                match self.get(nx, ny) {
                    None if !counted[ni] => {
                        counted[ni] = true;
                        liberties += 1;
                    }
                    Some(c) if c == color && !visited[ni] => stack.push((nx, ny)),
                    _ => {}
                }
            }
        }
        liberties
    }
}

impl Board for GoBoard {
    fn reset(&mut self, size: usize) {
        *self = GoBoard::new(size);
    }

    fn place_stone(&mut self, (x, y): Point, color: Color, is_move: bool) {
        let mut m = Mutation {
            cells: Vec::new(),
            markers: Vec::new(),
            captures: self.captures,
        };
        if x < self.size && y < self.size {
            let i = self.idx(x, y);
            self.set_cell(&mut m, i, Some(color));

            if is_move {
                let opp = color.opponent();
                let mut taken = 0;
                let around: Vec<Point> = self.neighbors(x, y).collect();
                for (nx, ny) in around {
                    if self.get(nx, ny) == Some(opp) && self.group_liberties(nx, ny) == 0 {
                        taken += self.remove_group(&mut m, nx, ny);
                    }
                }
                self.credit(color, taken);

                if taken == 0 && self.group_liberties(x, y) == 0 {
                    let lost = self.remove_group(&mut m, x, y);
                    self.credit(opp, lost);
                }
            }
        }
        self.history.push(m);
    }

    fn place_marker(&mut self, (x, y): Point, marker: Marker) {
        let mut m = Mutation {
            cells: Vec::new(),
            markers: Vec::new(),
            captures: self.captures,
        };
        if x < self.size && y < self.size {
            let i = self.idx(x, y);
            m.markers.push((i, self.markers[i]));
            self.markers[i] = Some(marker);
        }
        self.history.push(m);
    }

    fn clear_markers(&mut self) {
        let mut m = Mutation {
            cells: Vec::new(),
            markers: Vec::new(),
            captures: self.captures,
        };
        self.take_markers(&mut m);
        self.history.push(m);
    }

    fn undo_last_mutation(&mut self) -> bool {
        let Some(m) = self.history.pop() else {
            return false;
        };
        for (i, prev) in m.cells.into_iter().rev() {
            self.cells[i] = prev;
        }
        for (i, prev) in m.markers.into_iter().rev() {
            self.markers[i] = prev;
        }
        self.captures = m.captures;
        true
    }

    fn captured_counts(&self) -> (u32, u32) {
        self.captures
    }
}

/// Column letters without `I`, as on a real board.
const COLUMN_LETTERS: &[u8] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

/// Column label for `x`. The first 25 columns get one letter; wider boards
/// continue with two letters (`AA`, `AB`, ...).
pub fn column_label(x: usize) -> String {
    let n = COLUMN_LETTERS.len();
    let letter = |i: usize| COLUMN_LETTERS[i % n] as char;
    if x < n {
        letter(x).to_string()
    } else {
        format!("{}{}", letter(x / n - 1), letter(x))
    }
}

impl fmt::Display for GoBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = if self.size > COLUMN_LETTERS.len() { 3 } else { 2 };
        write!(f, "   ")?;
        for x in 0..self.size {
            write!(f, "{:<width$}", column_label(x))?;
        }
        writeln!(f)?;
        for y in 0..self.size {
            write!(f, "{:>2} ", self.size - y)?;
            for x in 0..self.size {
                let ch = match (self.get(x, y), self.marker(x, y)) {
                    (Some(Color::Black), _) => 'X',
                    (Some(Color::White), _) => 'O',
                    (None, Some(Marker::Square)) => '#',
                    (None, Some(Marker::Circle)) => '@',
                    (None, Some(Marker::Triangle)) => '^',
                    (None, Some(Marker::Cross)) => '*',
                    (None, None) => '.',
                };
                write!(f, "{ch:<width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_capture_and_undo() {
        let mut board = GoBoard::new(9);
        board.place_stone((1, 0), Color::Black, true);
        board.place_stone((0, 0), Color::White, true);
        board.place_stone((0, 1), Color::Black, true);

        assert_eq!(board.get(0, 0), None);
        assert_eq!(board.captured_counts(), (1, 0));

        assert!(board.undo_last_mutation());
        assert_eq!(board.get(0, 0), Some(Color::White));
        assert_eq!(board.get(0, 1), None);
        assert_eq!(board.captured_counts(), (0, 0));
    }

    #[test]
    fn test_setup_stones_never_capture() {
        let mut board = GoBoard::new(9);
        board.place_stone((0, 0), Color::White, false);
        board.place_stone((1, 0), Color::Black, false);
        board.place_stone((0, 1), Color::Black, false);

        assert_eq!(board.get(0, 0), Some(Color::White));
        assert_eq!(board.captured_counts(), (0, 0));
    }

    #[test]
    fn test_suicide_removes_own_group() {
        let mut board = GoBoard::new(9);
        board.place_stone((1, 0), Color::Black, false);
        board.place_stone((0, 1), Color::Black, false);
        board.place_stone((0, 0), Color::White, true);

        assert_eq!(board.get(0, 0), None);
        assert_eq!(board.captured_counts(), (1, 0));
    }

    #[test]
    fn test_clear_markers_is_one_mutation() {
        let mut board = GoBoard::new(9);
        board.place_marker((4, 4), Marker::Triangle);
        board.place_marker((1, 1), Marker::Square);

        board.place_stone((2, 2), Color::Black, true);
        assert_eq!(board.marker(4, 4), Some(Marker::Triangle));

        board.clear_markers();
        assert_eq!(board.marker(4, 4), None);
        assert_eq!(board.marker(1, 1), None);
        assert_eq!(board.history_len(), 4);

        assert!(board.undo_last_mutation());
        assert_eq!(board.marker(4, 4), Some(Marker::Triangle));
        assert_eq!(board.marker(1, 1), Some(Marker::Square));
    }

    #[test]
    fn test_off_board_point_still_counts_as_mutation() {
        let mut board = GoBoard::new(9);
        board.place_stone((19, 19), Color::Black, true);
        assert_eq!(board.history_len(), 1);
        assert!(board.undo_last_mutation());
        assert!(!board.undo_last_mutation());
    }

    #[test]
    fn test_reset_clears_history() {
        let mut board = GoBoard::new(9);
        board.place_stone((2, 2), Color::Black, true);
        board.reset(13);
        assert_eq!(board.size, 13);
        assert_eq!(board.history_len(), 0);
        assert!(!board.undo_last_mutation());
    }

    #[test]
    fn test_column_label_skips_i() {
        assert_eq!(column_label(0), "A");
        assert_eq!(column_label(7), "H");
        assert_eq!(column_label(8), "J");
        assert_eq!(column_label(24), "Z");
    }

    #[test]
    fn test_wide_board_labels_use_two_letters() {
        assert_eq!(column_label(25), "AA");
        assert_eq!(column_label(33), "AJ");
        assert_eq!(column_label(51), "BB");

        let board = GoBoard::new(52);
        let text = board.to_string();
        let header = text.lines().next().unwrap();
        assert!(header.contains("Z  AA AB"));
        assert!(header.trim_end().ends_with("BB"));
        assert!(header.chars().all(|c| c == ' ' || c.is_ascii_uppercase()));
    }
}
