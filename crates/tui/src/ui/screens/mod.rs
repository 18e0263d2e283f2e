pub mod chart;
pub mod daily;
pub mod keywords;
pub mod monthly;
pub mod search;
pub mod stats;
