pub mod error;
pub mod ranking;

#[cfg(test)]
mod testing;

pub use ranking::RankingComputer;
