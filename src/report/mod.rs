pub mod attack;
pub mod builder;
pub mod price_bar;

pub use builder::{build_report, BattleReport};
