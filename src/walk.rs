use ahash::RandomState as AHasher;
use rand::Rng;
use std::collections::HashSet;
use std::fmt;
use std::ops::Add;

/// A square on the unbounded lattice. No bounds are ever applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// The starting square of every walk.
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Position {
    type Output = Position;

    #[inline]
    fn add(self, rhs: Position) -> Self::Output {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The 8 L-shaped knight displacements.
pub const KNIGHT_MOVES: [Position; 8] = [
    Position { x: 2, y: 1 },
    Position { x: 1, y: 2 },
    Position { x: -1, y: 2 },
    Position { x: -2, y: 1 },
    Position { x: -2, y: -1 },
    Position { x: -1, y: -2 },
    Position { x: 1, y: -2 },
    Position { x: 2, y: -1 },
];

/// Pick one of the 8 knight moves uniformly at random.
#[inline]
pub fn random_move<R: Rng + ?Sized>(rng: &mut R) -> Position {
    KNIGHT_MOVES[rng.gen_range(0..KNIGHT_MOVES.len())]
}

/// Walk `n_moves` uniformly random knight moves from the origin and return the
/// number of distinct squares occupied, the origin included.
///
/// Deterministic example using a seeded RNG:
/// ```
/// use knight_walk::walk::simulate_walk;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let a = simulate_walk(50, &mut StdRng::seed_from_u64(7));
/// let b = simulate_walk(50, &mut StdRng::seed_from_u64(7));
/// assert_eq!(a, b);
/// assert!((1..=51).contains(&a));
/// assert_eq!(simulate_walk(0, &mut StdRng::seed_from_u64(7)), 1);
/// ```
pub fn simulate_walk<R: Rng + ?Sized>(n_moves: u32, rng: &mut R) -> u32 {
    let mut position = Position::ORIGIN;
    let mut visited: HashSet<Position, AHasher> =
        HashSet::with_capacity_and_hasher(n_moves as usize + 1, AHasher::new());
    visited.insert(position);
    for _ in 0..n_moves {
        position = position + random_move(rng);
        visited.insert(position);
    }
    visited.len() as u32
}

/// Convenience: like [`simulate_walk`] but uses thread-local RNG.
///
/// For reproducible behavior, prefer `simulate_walk(n, &mut impl Rng)`.
#[inline]
pub fn simulate_walk_thread(n_moves: u32) -> u32 {
    let mut rng = rand::thread_rng();
    simulate_walk(n_moves, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn it_zero_moves_counts_origin_only() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(simulate_walk(0, &mut rng), 1);
        assert_eq!(simulate_walk_thread(0), 1);
    }

    #[test]
    fn it_one_move_always_leaves_origin() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(simulate_walk(1, &mut rng), 2);
        }
    }

    #[test]
    fn it_two_moves_visit_two_or_three() {
        // The second move returns to the origin 1 time in 8; it can never stay put.
        let mut rng = StdRng::seed_from_u64(2);
        let mut saw_backtrack = false;
        for _ in 0..2_000 {
            let n = simulate_walk(2, &mut rng);
            assert!(n == 2 || n == 3, "got {n}");
            saw_backtrack |= n == 2;
        }
        assert!(saw_backtrack);
    }

    #[test]
    fn it_count_bounded_by_moves_plus_one() {
        let mut rng = StdRng::seed_from_u64(3);
        for m in [0u32, 1, 2, 5, 17, 50, 200] {
            for _ in 0..50 {
                let n = simulate_walk(m, &mut rng);
                assert!(n >= 1 && n <= m + 1, "m={m} n={n}");
            }
        }
    }

    #[test]
    fn it_seeded_walks_reproduce() {
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..32).map(|_| simulate_walk(50, &mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(run(99), run(99));
        assert_ne!(run(99), run(100));
    }

    #[test]
    fn it_random_move_is_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut counts = [0u32; 8];
        for _ in 0..80_000 {
            let mv = random_move(&mut rng);
            let idx = KNIGHT_MOVES.iter().position(|&k| k == mv).unwrap();
            counts[idx] += 1;
        }
        for c in counts {
            assert!((9_000..11_000).contains(&c), "bucket count {c}");
        }
    }

    #[test]
    fn it_knight_moves_are_l_shaped_and_distinct() {
        for (i, a) in KNIGHT_MOVES.iter().enumerate() {
            let (dx, dy) = (a.x.abs(), a.y.abs());
            assert!((dx == 1 && dy == 2) || (dx == 2 && dy == 1));
            for b in &KNIGHT_MOVES[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn it_position_add() {
        assert_eq!(Position::ORIGIN + Position::new(2, -1), Position::new(2, -1));
        assert_eq!(Position::new(-3, 4) + Position::new(1, 2), Position::new(-2, 6));
        assert_eq!(Position::new(1, -2).to_string(), "(1, -2)");
    }
}
