//! Statistical hypothesis testing for differential expression.


pub use two_group::{test_differential, test_row, TestOptions};
