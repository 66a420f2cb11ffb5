// Library root for the data side of courtside: configuration, persistence,
// normalized records, upstream payload normalizers, fallback data, the fan
// poll and countdown arithmetic.

pub mod config;
pub mod countdown;
pub mod db;
pub mod fallback;
pub mod normalize;
pub mod poll;
pub mod record;
