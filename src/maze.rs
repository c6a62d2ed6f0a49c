//! Cheapest route through a grid of entry costs.
//!
//! The search is best-first on cost-so-far plus an estimate of what is left.
//! Frontier entries are never updated in place; a better candidate is pushed
//! again and the old entry is dropped when it surfaces.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use arrayvec::ArrayVec;
use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::error::MazeError;

/// (row, column)
pub type Pos = (usize, usize);

pub trait CostGrid {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;
    /// Cost of stepping onto `pos`, always in `1 ..= 9`.
    fn cost(&self, pos: Pos) -> u32;

    fn contains(&self, (ri, ci): Pos) -> bool {
        ri < self.rows() && ci < self.cols()
    }

    /// Orthogonal neighbours inside the grid: up, right, down, left.
    fn neighbors(&self, (ri, ci): Pos) -> ArrayVec<Pos, 4> {
        let mut around = ArrayVec::new();
        if ri > 0 {around.push((ri - 1, ci))};
        if ci + 1 < self.cols() {around.push((ri, ci + 1))};
        if ri + 1 < self.rows() {around.push((ri + 1, ci))};
        if ci > 0 {around.push((ri, ci - 1))};
        around
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    costs: Vec<u8>,
    rows: usize,
    cols: usize,
}

impl Maze {
    /// One row per line, one digit `1`-`9` per cell.
    pub fn parse(input: &str) -> Result<Maze, MazeError> {
        let mut costs = Vec::with_capacity(input.len());
        let mut cols = None;
        let mut rows = 0;
        for (row, line) in input.trim().lines().map(str::trim).enumerate() {
            let start = costs.len();
            for (col, cell) in line.chars().enumerate() {
                match cell {
                    '1' ..= '9' => costs.push(cell as u8 - b'0'),
                    _ => return Err(MazeError::BadCell {row, col, cell}),
                }
            }
            let found = costs.len() - start;
            let expected = *cols.get_or_insert(found);
            if found != expected {return Err(MazeError::Ragged {row, found, expected})};
            rows += 1;
        }
        match cols {
            Some(cols) if cols > 0 => Ok(Maze {costs, rows, cols}),
            _ => Err(MazeError::Empty),
        }
    }

    /// Cost of a cell in the endless repetition of this maze where every
    /// tile to the right or below adds one, wrapping from 9 back to 1.
    pub fn tiled_cost(&self, ri: usize, ci: usize) -> u32 {
        let base = self.costs[ri % self.rows * self.cols + ci % self.cols] as usize;
        ((base + ri / self.rows + ci / self.cols - 1) % 9 + 1) as u32
    }

    pub fn tiled(&self, factor: usize) -> Tiled<'_> {
        Tiled {base: self, factor}
    }
}

impl CostGrid for Maze {
    fn rows(&self) -> usize {self.rows}
    fn cols(&self) -> usize {self.cols}
    fn cost(&self, (ri, ci): Pos) -> u32 {self.costs[ri * self.cols + ci] as u32}
}

/// `factor` x `factor` copies of a maze, computed on demand.
#[derive(Debug, Clone, Copy)]
pub struct Tiled<'a> {
    base: &'a Maze,
    factor: usize,
}

impl CostGrid for Tiled<'_> {
    fn rows(&self) -> usize {self.base.rows * self.factor}
    fn cols(&self) -> usize {self.base.cols * self.factor}
    fn cost(&self, (ri, ci): Pos) -> u32 {self.base.tiled_cost(ri, ci)}
}

/// The route walked so far, as seen by an [`Estimator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Walked {
    /// Cells on the route, start included.
    pub cells: u32,
    /// Entry cost of every cell on the route, start included.
    pub cost: u32,
}

pub trait Estimator {
    /// Guess at the cost of the `steps` moves still needed to reach the goal.
    fn estimate(&self, steps: u32, walked: Walked) -> u32;
}

/// One per step. Never overestimates since no cell costs less than 1, so
/// routes found with it are optimal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantStep;

impl Estimator for ConstantStep {
    fn estimate(&self, steps: u32, _: Walked) -> u32 {steps}
}

/// Average cell cost of the route so far, rounded. Can overestimate, so the
/// route it finds is not guaranteed to be the cheapest.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathAverage;

impl Estimator for PathAverage {
    fn estimate(&self, steps: u32, walked: Walked) -> u32 {
        if walked.cells == 0 {return steps};
        let cells = walked.cells as u64;
        ((steps as u64 * walked.cost as u64 + cells / 2) / cells) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Sum of entry costs, the start cell excluded.
    pub cost: u32,
    pub path: Vec<Pos>,
}

#[derive(Debug, Clone, Copy)]
struct Node {
    pos: Pos,
    cost: u32,
    estimate: u32,
    walked: Walked,
    /// Index of the node this one was reached from.
    parent: Option<usize>,
}

pub struct Search<'e> {
    pub estimator: &'e dyn Estimator,
    /// Draw the maze and report progress on stderr after every expansion.
    pub trace: bool,
}

impl Search<'_> {
    fn estimate(&self, (ri, ci): Pos, (gr, gc): Pos, walked: Walked) -> u32 {
        let steps = ri.abs_diff(gr) + ci.abs_diff(gc);
        self.estimator.estimate(steps as u32, walked)
    }

    pub fn run<G: CostGrid + ?Sized>(&self, grid: &G, from: Pos, to: Pos) -> Result<Route, MazeError> {
        for pos in [from, to] {
            if !grid.contains(pos) {
                return Err(MazeError::OutOfBounds {pos, rows: grid.rows(), cols: grid.cols()});
            }
        }
        if from == to {return Ok(Route {cost: 0, path: vec![from]})};

        // nothing walked yet for the start's own estimate; its successors count the start cell
        let estimate = self.estimate(from, to, Walked::default());
        let walked = Walked {cells: 1, cost: grid.cost(from)};
        let mut nodes = vec![Node {pos: from, cost: 0, estimate, walked, parent: None}];
        // keyed by (total score, node index); the index doubles as insertion order for ties
        let mut open = BinaryHeap::from([Reverse((nodes[0].estimate, 0))]);
        let mut open_best: FxHashMap<Pos, u32> = FxHashMap::default();
        let mut settled: FxHashMap<Pos, u32> = FxHashMap::default();
        open_best.insert(from, nodes[0].estimate);

        let mut steps = 0;
        while let Some(Reverse((total, ix))) = open.pop() {
            let node = nodes[ix];
            if open_best.get(&node.pos) != Some(&total) {continue};
            open_best.remove(&node.pos);

            if self.trace {
                let path = trail(&nodes, ix);
                eprintln!("{}", render(grid, &open_best, &settled, &path));
                eprintln!("after {} steps: {} long, {} so far, {} still to go",
                          steps, path.len(), node.cost, node.estimate);
            }
            steps += 1;

            for next in grid.neighbors(node.pos) {
                let cost = node.cost + grid.cost(next);
                if next == to {
                    let mut path = trail(&nodes, ix);
                    path.push(next);
                    if self.trace {eprintln!("path at {} after {} steps", cost, steps)};
                    return Ok(Route {cost, path});
                }

                let walked = Walked {cells: node.walked.cells + 1, cost: node.walked.cost + grid.cost(next)};
                let estimate = self.estimate(next, to, walked);
                let next_total = cost + estimate;
                if open_best.get(&next).is_some_and(|&t| t <= next_total) {continue};
                if settled.get(&next).is_some_and(|&t| t <= next_total) {continue};

                open_best.insert(next, next_total);
                open.push(Reverse((next_total, nodes.len())));
                nodes.push(Node {pos: next, cost, estimate, walked, parent: Some(ix)});
            }

            settled.insert(node.pos, total);
        }

        Err(MazeError::NoPathFound {goal: to})
    }
}

fn trail(nodes: &[Node], ix: usize) -> Vec<Pos> {
    let mut path = std::iter::successors(Some(ix), |&i| nodes[i].parent)
        .map(|i| nodes[i].pos)
        .collect::<Vec<_>>();
    path.reverse();
    path
}

/// Text picture of a search in progress: `>c<` ends the current path, `.c.`
/// marks the rest of it, `(c)` is on the frontier and `[c]` is settled.
pub fn render<G: CostGrid + ?Sized>(
    grid: &G,
    open: &FxHashMap<Pos, u32>,
    settled: &FxHashMap<Pos, u32>,
    path: &[Pos],
) -> String {
    let on_path = path.iter().enumerate().map(|(i, &pos)| (pos, i)).collect::<FxHashMap<_, _>>();
    (0 .. grid.rows()).map(|ri| {
        (0 .. grid.cols()).map(|ci| {
            let pos = (ri, ci);
            let cost = grid.cost(pos);
            match on_path.get(&pos) {
                Some(&i) if i + 1 == path.len() => format!(">{}<", cost),
                Some(_) => format!(".{}.", cost),
                None if open.contains_key(&pos) => format!("({})", cost),
                None if settled.contains_key(&pos) => format!("[{}]", cost),
                None => format!(" {} ", cost),
            }
        }).join("")
    }).join("\n")
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    const EXAMPLE: &str = "\
1163751742
1381373672
2136511328
3694931569
7463417111
1319128137
1359912421
3125421639
1293138521
2311944581
";

    fn cheapest<G: CostGrid + ?Sized>(grid: &G) -> Route {
        let search = Search {estimator: &ConstantStep, trace: false};
        search.run(grid, (0, 0), (grid.rows() - 1, grid.cols() - 1)).unwrap()
    }

    #[test]
    fn parses_digit_rows() {
        let maze = Maze::parse("12\n34\n").unwrap();
        assert_eq!((maze.rows(), maze.cols()), (2, 2));
        assert_eq!(maze.cost((1, 0)), 3);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(Maze::parse(""), Err(MazeError::Empty));
        assert_eq!(Maze::parse("12\n3\n"), Err(MazeError::Ragged {row: 1, found: 1, expected: 2}));
        assert_eq!(Maze::parse("12\n30\n"), Err(MazeError::BadCell {row: 1, col: 1, cell: '0'}));
        assert_eq!(Maze::parse("1x\n"), Err(MazeError::BadCell {row: 0, col: 1, cell: 'x'}));
    }

    #[test]
    fn example_base_grid() {
        let maze = Maze::parse(EXAMPLE).unwrap();
        let route = cheapest(&maze);
        assert_eq!(route.cost, 40);
        assert_eq!(route.path.first(), Some(&(0, 0)));
        assert_eq!(route.path.last(), Some(&(9, 9)));
        let walked = route.path[1 ..].iter().map(|&pos| maze.cost(pos)).sum::<u32>();
        assert_eq!(walked, 40);
    }

    #[test]
    fn example_tiled_grid() {
        let maze = Maze::parse(EXAMPLE).unwrap();
        let tiled = maze.tiled(5);
        assert_eq!((tiled.rows(), tiled.cols()), (50, 50));
        assert_eq!(cheapest(&tiled).cost, 315);
    }

    #[test]
    fn path_moves_one_orthogonal_step_at_a_time() {
        let maze = Maze::parse(EXAMPLE).unwrap();
        let route = cheapest(&maze.tiled(5));
        for ((r0, c0), (r1, c1)) in route.path.iter().copied().tuple_windows() {
            assert_eq!(r0.abs_diff(r1) + c0.abs_diff(c1), 1);
        }
    }

    #[test]
    fn tiled_costs_wrap_past_nine() {
        let maze = Maze::parse("8").unwrap();
        let row = (0 .. 5).map(|ci| maze.tiled_cost(0, ci)).collect::<Vec<_>>();
        assert_eq!(row, vec![8, 9, 1, 2, 3]);
        assert_eq!(maze.tiled_cost(4, 4), 7);

        let example = Maze::parse(EXAMPLE).unwrap();
        assert_eq!(example.tiled_cost(0, 10), 2);
        assert_eq!(example.tiled_cost(49, 49), 9);
    }

    #[test]
    fn tiling_by_one_is_the_base_grid() {
        let maze = Maze::parse(EXAMPLE).unwrap();
        let tiled = maze.tiled(1);
        for ri in 0 .. 10 {
            for ci in 0 .. 10 {
                assert_eq!(tiled.cost((ri, ci)), maze.cost((ri, ci)));
            }
        }
    }

    #[test]
    fn rectangular_grid() {
        let maze = Maze::parse("123\n456\n").unwrap();
        assert_eq!(cheapest(&maze), Route {cost: 11, path: vec![(0, 0), (0, 1), (0, 2), (1, 2)]});
    }

    #[test]
    fn start_is_goal() {
        let maze = Maze::parse("5").unwrap();
        assert_eq!(cheapest(&maze), Route {cost: 0, path: vec![(0, 0)]});
    }

    #[test]
    fn endpoints_must_be_inside() {
        let maze = Maze::parse("12\n34").unwrap();
        let search = Search {estimator: &ConstantStep, trace: false};
        assert_eq!(search.run(&maze, (0, 0), (2, 0)),
                   Err(MazeError::OutOfBounds {pos: (2, 0), rows: 2, cols: 2}));
    }

    struct Walled(Maze);

    impl CostGrid for Walled {
        fn rows(&self) -> usize {self.0.rows()}
        fn cols(&self) -> usize {self.0.cols()}
        fn cost(&self, pos: Pos) -> u32 {self.0.cost(pos)}
        fn neighbors(&self, (ri, ci): Pos) -> ArrayVec<Pos, 4> {
            // nothing leaves the first column
            self.0.neighbors((ri, ci)).into_iter().filter(|&(_, c)| c == 0).collect()
        }
    }

    #[test]
    fn unreachable_goal() {
        let walled = Walled(Maze::parse("111\n111\n111").unwrap());
        let search = Search {estimator: &ConstantStep, trace: false};
        assert_eq!(search.run(&walled, (0, 0), (2, 2)), Err(MazeError::NoPathFound {goal: (2, 2)}));
    }

    #[test]
    fn path_average_finds_some_route() {
        let maze = Maze::parse(EXAMPLE).unwrap();
        let search = Search {estimator: &PathAverage, trace: false};
        let route = search.run(&maze, (0, 0), (9, 9)).unwrap();
        assert!(route.cost >= 40);
        assert_eq!(search.run(&maze, (0, 0), (9, 9)).unwrap(), route);
    }

    #[test]
    fn path_average_rounds_to_nearest() {
        assert_eq!(PathAverage.estimate(3, Walked {cells: 2, cost: 3}), 5);
        assert_eq!(PathAverage.estimate(4, Walked {cells: 3, cost: 4}), 5);
        assert_eq!(PathAverage.estimate(7, Walked::default()), 7);
        assert_eq!(ConstantStep.estimate(7, Walked {cells: 2, cost: 18}), 7);
    }

    struct Recording(RefCell<Vec<Walked>>);

    impl Estimator for Recording {
        fn estimate(&self, steps: u32, walked: Walked) -> u32 {
            self.0.borrow_mut().push(walked);
            steps
        }
    }

    #[test]
    fn start_is_estimated_with_nothing_walked() {
        let maze = Maze::parse("12\n34").unwrap();
        let recording = Recording(RefCell::new(vec![]));
        let search = Search {estimator: &recording, trace: false};
        search.run(&maze, (0, 0), (1, 1)).unwrap();
        let seen = recording.0.into_inner();
        assert_eq!(seen, vec![Walked::default(), Walked {cells: 2, cost: 3}, Walked {cells: 2, cost: 4}]);
        assert_eq!(PathAverage.estimate(2, seen[0]), 2);
    }

    #[test]
    fn traced_search_finds_the_same_route() {
        let maze = Maze::parse("12\n34").unwrap();
        let traced = Search {estimator: &ConstantStep, trace: true}.run(&maze, (0, 0), (1, 1)).unwrap();
        assert_eq!(traced, Route {cost: 6, path: vec![(0, 0), (0, 1), (1, 1)]});
        assert_eq!(traced, cheapest(&maze));
    }

    #[test]
    fn render_marks_search_state() {
        let maze = Maze::parse("12\n34").unwrap();
        let open = FxHashMap::from_iter([((1, 1), 4)]);
        let settled = FxHashMap::from_iter([((1, 0), 3)]);
        assert_eq!(render(&maze, &open, &settled, &[(0, 0), (0, 1)]), ".1.>2<\n[3](4)");
    }
}
