//! 2つの説明文の各スコアを表示する調整用ツール
//!
//! Usage: score_cases <description_a> <description_b> [--keep-numbers] [--keep-units]

use boq_match_common::similarity::{combined_score, edit_ratio, jaccard, token_set_ratio};
use boq_match_common::{normalize, NormalizeOptions};
use std::env;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let texts: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();
    if texts.len() != 2 {
        eprintln!("Usage: score_cases <description_a> <description_b> [--keep-numbers] [--keep-units]");
        std::process::exit(1);
    }

    let options = NormalizeOptions {
        strip_numbers: !args.iter().any(|a| a == "--keep-numbers"),
        strip_units: !args.iter().any(|a| a == "--keep-units"),
    };

    let a = normalize(texts[0], &options);
    let b = normalize(texts[1], &options);

    println!("a: {:?}", a);
    println!("b: {:?}", b);
    println!("edit_ratio      {:.3}", edit_ratio(&a, &b));
    println!("jaccard         {:.3}", jaccard(&a, &b));
    println!("token_set_ratio {:.3}", token_set_ratio(&a, &b));
    println!("combined        {:.3}", combined_score(&a, &b, true));
    println!("combined(-tsr)  {:.3}", combined_score(&a, &b, false));
}
