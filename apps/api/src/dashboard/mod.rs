// Dashboard data: sample feeds (statistics, notifications, interview prep)
// and the in-memory application board.

pub mod board;
pub mod feeds;
pub mod handlers;
