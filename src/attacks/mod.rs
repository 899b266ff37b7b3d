pub mod byte_at_a_time;
pub mod cut_and_paste;
pub mod detect;
