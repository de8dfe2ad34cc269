//! Core data model for the Fives tile game.
//!
//! This module defines the game's fundamental components:
//! - `Position`, `TileValue`, `Tile`: board coordinates and the numbered tiles.
//! - `Board`: a sparse map of committed tiles on the 15x15 grid.
//! - `Player`, `PlayerColor`, `GameState`: the per-game snapshot that every rule operates on.
//! - `TilePlacement`: a staged (not yet committed) move of one tile from a hand to a cell.
//!
//! Nothing in here enforces game rules; see `validator`, `scoring` and `manager`.
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Width and height of the square board.
pub const BOARD_SIZE: i32 = 15;

/// The cell the opening tile has to touch.
pub const CENTER: Position = Position { x: 7, y: 7 };

/// Number of copies of each face value in a full tile set.
pub const TILE_COPIES: usize = 4;

/// Highest face value printed on a tile.
pub const MAX_TILE_VALUE: u8 = 9;

/// Size of a full tile set (4 copies of 0..=9).
pub const TOTAL_TILES: usize = TILE_COPIES * (MAX_TILE_VALUE as usize + 1);

/// A board coordinate. Signed so that off-board inputs can be represented and rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Returns `true` if the position lies on the 15x15 board.
    pub fn in_bounds(self) -> bool {
        (0..BOARD_SIZE).contains(&self.x) && (0..BOARD_SIZE).contains(&self.y)
    }

    /// The `"x,y"` key used by external board maps.
    ///
    /// ```
    /// use fives_engine::engine::Position;
    /// assert_eq!(Position::new(7, 8).key(), "7,8");
    /// assert_eq!("7,8".parse::<Position>().unwrap(), Position::new(7, 8));
    /// ```
    pub fn key(self) -> String {
        format!("{},{}", self.x, self.y)
    }

    pub fn offset(self, dx: i32, dy: i32) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }

    /// The four orthogonal neighbours (up, down, left, right). Diagonals never count.
    pub fn neighbors(self) -> [Position; 4] {
        [
            self.offset(0, -1),
            self.offset(0, 1),
            self.offset(-1, 0),
            self.offset(1, 0),
        ]
    }

    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Iterates over every on-board position, row by row.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE).flat_map(|y| (0..BOARD_SIZE).map(move |x| Position::new(x, y)))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("position key '{}' is not of the form x,y", s))?;
        let x = x
            .trim()
            .parse()
            .map_err(|e| format!("bad x in position key '{}': {}", s, e))?;
        let y = y
            .trim()
            .parse()
            .map_err(|e| format!("bad y in position key '{}': {}", s, e))?;
        Ok(Position::new(x, y))
    }
}

/// Face value of a tile, always in `0..=9`.
///
/// The value is what scores; it says nothing about which physical tile this is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TileValue(u8);

impl TileValue {
    /// Returns `None` for anything above `MAX_TILE_VALUE`.
    pub fn new(value: u8) -> Option<Self> {
        (value <= MAX_TILE_VALUE).then_some(TileValue(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = TileValue> {
        (0..=MAX_TILE_VALUE).map(TileValue)
    }
}

impl TryFrom<u8> for TileValue {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        TileValue::new(value).ok_or(GameError::InvalidTileValue(value))
    }
}

impl From<TileValue> for u8 {
    fn from(value: TileValue) -> u8 {
        value.0
    }
}

impl fmt::Display for TileValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Seat colour. Unique per game, which also caps a game at four players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerColor {
    Red,
    Blue,
    Green,
    Yellow,
}

impl PlayerColor {
    /// Seat order used when players join.
    pub const ALL: [PlayerColor; 4] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Green,
        PlayerColor::Yellow,
    ];

    pub fn from_index(idx: usize) -> Option<PlayerColor> {
        Self::ALL.get(idx).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            PlayerColor::Red => "red",
            PlayerColor::Blue => "blue",
            PlayerColor::Green => "green",
            PlayerColor::Yellow => "yellow",
        }
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which container currently holds a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TileLocation {
    Hand { owner: PlayerColor },
    DrawPile,
    Board { position: Position },
}

/// A physical tile. `unique_id` is its identity; `value` is its face.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub value: TileValue,
    pub unique_id: String,
    pub location: TileLocation,
}

impl Tile {
    pub fn new(value: TileValue, unique_id: impl Into<String>, location: TileLocation) -> Self {
        Tile {
            value,
            unique_id: unique_id.into(),
            location,
        }
    }
}

/// Builds the full 40-tile set, every tile located in the draw pile.
///
/// Ids have the form `tile-<value>-<copy>` and are unique within the set.
///
/// ```
/// use fives_engine::engine::{build_tile_set, TOTAL_TILES};
/// let tiles = build_tile_set();
/// assert_eq!(tiles.len(), TOTAL_TILES);
/// assert_eq!(tiles[0].unique_id, "tile-0-0");
/// ```
pub fn build_tile_set() -> Vec<Tile> {
    TileValue::all()
        .flat_map(|value| {
            (0..TILE_COPIES).map(move |copy| {
                Tile::new(
                    value,
                    format!("tile-{}-{}", value, copy),
                    TileLocation::DrawPile,
                )
            })
        })
        .collect()
}

/// Committed tiles, keyed by position. At most one tile per cell; a missing key is an
/// empty cell.
///
/// On the wire the board is a map from `"x,y"` keys to tiles.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Tile>", into = "BTreeMap<String, Tile>")]
pub struct Board {
    cells: BTreeMap<Position, Tile>,
}

impl Board {
    pub fn new_empty() -> Self {
        Board::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn get(&self, pos: Position) -> Option<&Tile> {
        self.cells.get(&pos)
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.cells.contains_key(&pos)
    }

    /// Puts `tile` on `pos`, stamping its location, and returns whatever was there before.
    pub fn place(&mut self, pos: Position, mut tile: Tile) -> Option<Tile> {
        tile.location = TileLocation::Board { position: pos };
        self.cells.insert(pos, tile)
    }

    pub fn remove(&mut self, pos: Position) -> Option<Tile> {
        self.cells.remove(&pos)
    }

    /// Tiles in position order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &Tile)> {
        self.cells.iter().map(|(pos, tile)| (*pos, tile))
    }

    pub fn find_tile(&self, tile_id: &str) -> Option<&Tile> {
        self.cells.values().find(|t| t.unique_id == tile_id)
    }

    /// Renders the board as a 15x15 grid with row and column numbers.
    ///
    /// Empty cells print as `.`, tiles as their value. Cells listed in `highlight` get a
    /// trailing `*`, which the interactive player uses for staged tiles.
    pub fn to_string_with_highlight(&self, highlight: &[(Position, TileValue)]) -> String {
        let mut output = String::from("   ");
        for x in 0..BOARD_SIZE {
            output.push_str(&format!("{:<3}", x));
        }
        output.push('\n');

        // Row header, then one 3-wide column per cell.
        for y in 0..BOARD_SIZE {
            output.push_str(&format!("{:<3}", y));
            for x in 0..BOARD_SIZE {
                let pos = Position::new(x, y);
                let cell = match highlight.iter().find(|(p, _)| *p == pos) {
                    Some((_, value)) => format!("{}*", value),
                    None => match self.get(pos) {
                        Some(tile) => tile.value.to_string(),
                        None => ".".to_string(),
                    },
                };
                output.push_str(&format!("{:<3}", cell));
            }
            if y < BOARD_SIZE - 1 {
                output.push('\n');
            }
        }
        output
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_highlight(&[]))
    }
}

impl TryFrom<BTreeMap<String, Tile>> for Board {
    type Error = String;

    fn try_from(map: BTreeMap<String, Tile>) -> Result<Self, Self::Error> {
        let mut board = Board::new_empty();
        for (key, tile) in map {
            let pos: Position = key.parse()?;
            if !pos.in_bounds() {
                return Err(format!("board key '{}' is off the board", key));
            }
            if board.place(pos, tile).is_some() {
                return Err(format!("two tiles at board key '{}'", key));
            }
        }
        Ok(board)
    }
}

impl From<Board> for BTreeMap<String, Tile> {
    fn from(board: Board) -> Self {
        board
            .cells
            .into_iter()
            .map(|(pos, tile)| (pos.key(), tile))
            .collect()
    }
}

/// A seat at the table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub color: PlayerColor,
    pub name: String,
    pub score: u32,
    /// Order is kept for display only; it has no game meaning.
    pub hand: Vec<Tile>,
}

impl Player {
    pub fn new(color: PlayerColor, name: impl Into<String>) -> Self {
        Player {
            color,
            name: name.into(),
            score: 0,
            hand: Vec::new(),
        }
    }

    pub fn has_tile(&self, tile_id: &str) -> bool {
        self.hand.iter().any(|t| t.unique_id == tile_id)
    }

    /// Removes a tile from the hand by id.
    pub fn take_tile(&mut self, tile_id: &str) -> Option<Tile> {
        let idx = self.hand.iter().position(|t| t.unique_id == tile_id)?;
        Some(self.hand.remove(idx))
    }

    /// Adds a tile to the hand, stamping its location.
    pub fn receive(&mut self, mut tile: Tile) {
        tile.location = TileLocation::Hand { owner: self.color };
        self.hand.push(tile);
    }

    pub fn hand_values(&self) -> Vec<u8> {
        self.hand.iter().map(|t| t.value.get()).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Setup,
    Playing,
    Finished,
}

/// A full snapshot of one game.
///
/// Every tile of the game lives in exactly one of: some player's hand, `draw_pile`, or
/// `board`. Snapshots are values: committing a move produces a new `GameState` and leaves
/// the previous one untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub players: Vec<Player>,
    pub current_player_index: usize,
    pub turn_number: u32,
    pub board: Board,
    /// Index 0 is the top of the pile.
    pub draw_pile: Vec<Tile>,
    pub phase: GamePhase,
    pub winner: Option<PlayerColor>,
}

impl GameState {
    /// A state with the given players, an empty board and an empty draw pile.
    pub fn new(players: Vec<Player>) -> Self {
        GameState {
            players,
            current_player_index: 0,
            turn_number: 1,
            board: Board::new_empty(),
            draw_pile: Vec::new(),
            phase: GamePhase::Playing,
            winner: None,
        }
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    pub fn player(&self, color: PlayerColor) -> Option<&Player> {
        self.players.iter().find(|p| p.color == color)
    }

    /// The game ends once the draw pile is exhausted and some player has emptied their hand.
    pub fn is_game_over(&self) -> bool {
        self.draw_pile.is_empty() && self.players.iter().any(|p| p.hand.is_empty())
    }

    /// The player with the highest score; the earliest seat wins a tie.
    pub fn leading_player(&self) -> Option<&Player> {
        let mut best: Option<&Player> = None;
        for player in &self.players {
            // Strictly greater, so the earlier seat keeps a tie.
            if best.map_or(true, |b| player.score > b.score) {
                best = Some(player);
            }
        }
        best
    }

    /// Looks a tile up by id in the hands, then the draw pile, then the board.
    pub fn find_tile(&self, tile_id: &str) -> Option<&Tile> {
        self.players
            .iter()
            .flat_map(|p| p.hand.iter())
            .chain(self.draw_pile.iter())
            .find(|t| t.unique_id == tile_id)
            .or_else(|| self.board.find_tile(tile_id))
    }

    /// Every tile in the game, regardless of where it sits.
    pub fn all_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.players
            .iter()
            .flat_map(|p| p.hand.iter())
            .chain(self.draw_pile.iter())
            .chain(self.board.tiles())
    }

    /// Marks the game finished and records the winner when the end condition holds.
    /// Returns whether the game is over.
    pub fn finish_if_over(&mut self) -> bool {
        if self.is_game_over() {
            self.phase = GamePhase::Finished;
            self.winner = self.leading_player().map(|p| p.color);
            true
        } else {
            false
        }
    }
}

/// A staged move of one tile from the current player's hand to a board cell.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TilePlacement {
    pub tile_id: String,
    pub position: Position,
}

impl TilePlacement {
    pub fn new(tile_id: impl Into<String>, position: Position) -> Self {
        TilePlacement {
            tile_id: tile_id.into(),
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn tile(value: u8, id: &str) -> Tile {
        Tile::new(TileValue::new(value).unwrap(), id, TileLocation::DrawPile)
    }

    #[test]
    fn test_position_bounds() {
        assert!(Position::new(0, 0).in_bounds());
        assert!(Position::new(14, 14).in_bounds());
        assert!(!Position::new(15, 0).in_bounds());
        assert!(!Position::new(0, -1).in_bounds());
        assert_eq!(Position::all().count(), 225);
    }

    #[test]
    fn test_position_key_roundtrip() {
        let pos = Position::new(3, 12);
        assert_eq!(pos.key().parse::<Position>().unwrap(), pos);
        assert!("3;12".parse::<Position>().is_err());
        assert!("a,1".parse::<Position>().is_err());
    }

    #[test]
    fn test_position_neighbors_are_orthogonal() {
        let center = CENTER;
        for n in center.neighbors() {
            assert_eq!(n.manhattan_distance(center), 1);
        }
    }

    #[test]
    fn test_tile_value_range() {
        assert_eq!(TileValue::new(9).map(TileValue::get), Some(9));
        assert!(TileValue::new(10).is_none());
        assert!(matches!(
            TileValue::try_from(12),
            Err(GameError::InvalidTileValue(12))
        ));
    }

    #[test]
    fn test_build_tile_set_counts() {
        let tiles = build_tile_set();
        assert_eq!(tiles.len(), TOTAL_TILES);

        let ids: HashSet<_> = tiles.iter().map(|t| t.unique_id.clone()).collect();
        assert_eq!(ids.len(), TOTAL_TILES, "ids must be unique");

        for value in TileValue::all() {
            let copies = tiles.iter().filter(|t| t.value == value).count();
            assert_eq!(copies, TILE_COPIES);
        }
        assert!(tiles.iter().all(|t| t.location == TileLocation::DrawPile));
    }

    #[test]
    fn test_board_place_stamps_location() {
        let mut board = Board::new_empty();
        let pos = Position::new(7, 7);
        assert!(board.place(pos, tile(4, "a")).is_none());
        assert_eq!(
            board.get(pos).unwrap().location,
            TileLocation::Board { position: pos }
        );
        assert!(board.is_occupied(pos));
        assert_eq!(board.find_tile("a").map(|t| t.value.get()), Some(4));

        let displaced = board.place(pos, tile(5, "b"));
        assert_eq!(displaced.map(|t| t.unique_id), Some("a".to_string()));
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_board_serializes_with_string_keys() {
        let mut board = Board::new_empty();
        board.place(Position::new(7, 8), tile(3, "t"));
        let json = serde_json::to_value(&board).unwrap();
        assert!(json.get("7,8").is_some());

        let back: Board = serde_json::from_value(json).unwrap();
        assert_eq!(back, board);
    }

    #[test]
    fn test_board_rejects_off_board_keys() {
        let mut json = serde_json::to_value(Board::new_empty()).unwrap();
        json["2147483647,0"] = serde_json::to_value(tile(3, "t")).unwrap();
        assert!(serde_json::from_value::<Board>(json).is_err());

        let mut json = serde_json::to_value(Board::new_empty()).unwrap();
        json["7,8"] = serde_json::to_value(tile(3, "a")).unwrap();
        json["7, 8"] = serde_json::to_value(tile(4, "b")).unwrap();
        assert!(serde_json::from_value::<Board>(json).is_err());
    }

    #[test]
    fn test_board_display_formatting() {
        let mut board = Board::new_empty();
        board.place(Position::new(0, 0), tile(6, "t"));
        let display_str = format!("{}", board);
        assert_eq!(display_str.lines().count(), BOARD_SIZE as usize + 1);
        assert!(display_str.lines().next().unwrap().contains("14"));
        assert!(display_str.lines().nth(1).unwrap().starts_with("0  6"));

        let highlighted =
            board.to_string_with_highlight(&[(Position::new(1, 0), TileValue::new(2).unwrap())]);
        assert!(highlighted.lines().nth(1).unwrap().contains("2*"));
    }

    #[test]
    fn test_player_hand_moves() {
        let mut player = Player::new(PlayerColor::Blue, "Bo");
        player.receive(tile(1, "x"));
        assert!(player.has_tile("x"));
        assert_eq!(
            player.hand[0].location,
            TileLocation::Hand {
                owner: PlayerColor::Blue
            }
        );
        assert!(player.take_tile("missing").is_none());
        assert_eq!(player.take_tile("x").map(|t| t.value.get()), Some(1));
        assert!(player.hand.is_empty());
    }

    #[test]
    fn test_is_game_over_requires_both_conditions() {
        let mut a = Player::new(PlayerColor::Red, "A");
        let b = Player::new(PlayerColor::Blue, "B");
        a.receive(tile(1, "a1"));

        // Empty draw pile, B has an empty hand.
        let mut state = GameState::new(vec![a.clone(), b.clone()]);
        assert!(state.is_game_over());

        // Non-empty draw pile.
        state.draw_pile.push(tile(2, "d"));
        assert!(!state.is_game_over());

        // Empty draw pile, every hand non-empty.
        let mut b_full = b;
        b_full.receive(tile(3, "b1"));
        let state = GameState::new(vec![a, b_full]);
        assert!(!state.is_game_over());
    }

    #[test]
    fn test_leading_player_prefers_first_on_tie() {
        let mut a = Player::new(PlayerColor::Red, "A");
        let mut b = Player::new(PlayerColor::Blue, "B");
        let mut c = Player::new(PlayerColor::Green, "C");
        a.score = 10;
        b.score = 30;
        c.score = 30;
        let state = GameState::new(vec![a, b, c]);
        assert_eq!(
            state.leading_player().map(|p| p.color),
            Some(PlayerColor::Blue)
        );
    }

    #[test]
    fn test_finish_if_over_sets_winner() {
        let mut a = Player::new(PlayerColor::Red, "A");
        a.score = 5;
        let b = Player::new(PlayerColor::Blue, "B");
        let mut state = GameState::new(vec![a, b]);
        assert!(state.finish_if_over());
        assert_eq!(state.phase, GamePhase::Finished);
        assert_eq!(state.winner, Some(PlayerColor::Red));
    }

    #[test]
    fn test_find_tile_searches_every_container() {
        let mut a = Player::new(PlayerColor::Red, "A");
        a.receive(tile(1, "hand"));
        let mut state = GameState::new(vec![a]);
        state.draw_pile.push(tile(2, "pile"));
        state.board.place(CENTER, tile(3, "board"));

        assert_eq!(state.find_tile("hand").map(|t| t.value.get()), Some(1));
        assert_eq!(state.find_tile("pile").map(|t| t.value.get()), Some(2));
        assert_eq!(state.find_tile("board").map(|t| t.value.get()), Some(3));
        assert!(state.find_tile("nope").is_none());
        assert_eq!(state.all_tiles().count(), 3);
    }
}
