pub mod pathfinder;
