//! # strproc
//!
//! Library half of the strproc binary: the command-line interface and the
//! streaming loop that feeds text through a `strproc_core::Pipeline`.

pub mod cli;
