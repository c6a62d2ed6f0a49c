pub mod bits;
pub mod error;
pub mod maze;
pub mod packet;

use clap::ValueEnum;

pub use error::{DecodeError, Error, MazeError, Result};
use maze::{ConstantStep, CostGrid, Estimator, Maze, PathAverage, Search};
use packet::Packet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Heuristic {
    /// One per remaining step; always finds the cheapest path
    #[default]
    Constant,
    /// Average cell cost of the path so far; faster, not always optimal
    #[value(name = "avg")]
    PathAverage,
}

impl Heuristic {
    pub fn estimator(self) -> &'static dyn Estimator {
        match self {
            Heuristic::Constant => &ConstantStep,
            Heuristic::PathAverage => &PathAverage,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub heuristic: Heuristic,
    pub trace: bool,
}

/// Chiton risk: cheapest way from the top left to the bottom right corner,
/// part 2 on the cave tiled five times in each direction.
pub fn day15(part: u8, input: &str, options: &Options) -> Result<String> {
    let maze = Maze::parse(input)?;
    let search = Search {estimator: options.heuristic.estimator(), trace: options.trace};
    let route = match part {
        1 => search.run(&maze, (0, 0), (maze.rows() - 1, maze.cols() - 1))?,
        2 => {
            let tiled = maze.tiled(5);
            search.run(&tiled, (0, 0), (tiled.rows() - 1, tiled.cols() - 1))?
        },
        _ => return Err(Error::UnknownPart(part)),
    };
    Ok(route.cost.to_string())
}

/// Packet decoder: sum of all versions, part 2 the value of the expression.
pub fn day16(part: u8, input: &str, options: &Options) -> Result<String> {
    let packet = Packet::decode(&packet::decode_hex(input)?)?;
    if options.trace {
        eprintln!("{} packets, outermost {:?}", packet.iter().count(), (packet.version, packet.type_id));
    }
    match part {
        1 => Ok(packet.version_sum().to_string()),
        2 => Ok(packet.eval()?.to_string()),
        _ => Err(Error::UnknownPart(part)),
    }
}

pub fn solve(day: u8, part: u8, input: &str, options: &Options) -> Result<String> {
    let days: [(u8, fn(u8, &str, &Options) -> Result<String>); 2] = [(15, day15), (16, day16)];
    let (_, solver) = days.iter().find(|&&(d, _)| d == day).ok_or(Error::UnknownDay(day))?;
    solver(part, input, options)
}
