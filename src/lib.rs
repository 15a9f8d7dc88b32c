//! boq-match: BoQ明細と単価表の照合
//!
//! 純粋なアルゴリズムは `boq_match_common` にあり、
//! このクレートは表計算ファイル・埋め込みAPI・出力・ストアを担当する。

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod export;
pub mod semantic;
pub mod spreadsheet;
pub mod store;

pub use error::{BoqMatchError, Result};
