// Draft simulation: pick order, rosters, AI strategies, and the engine.

pub mod agent;
pub mod engine;
pub mod order;
pub mod pick;
pub mod roster;
pub mod state;
pub mod strategy;
