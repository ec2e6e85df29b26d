pub mod chess_com;
pub mod lichess;
pub mod study_plan;
