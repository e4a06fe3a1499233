pub mod calendar;
pub mod dates;
pub mod merge;
pub mod split;
