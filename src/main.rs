use anyhow::Context;
use boq_match::{cli, config, embedding, error, export, semantic, spreadsheet, store};
use boq_match_common::{apply_rates, boq_from_matches, match_rows, merge_boq, BoqItem};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use store::PriceStore;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_price_list(arg: Option<PathBuf>, config: &Config) -> error::Result<PathBuf> {
    arg.or_else(|| config.price_list.clone()).ok_or_else(|| {
        error::BoqMatchError::Config("単価表ファイルを --price-list か設定の price_list で指定してください".into())
    })
}

fn resolve_output(output: Option<PathBuf>) -> PathBuf {
    output.unwrap_or_else(|| PathBuf::from(export::default_output_name()))
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn print_summary(results: &[boq_match_common::MatchResult]) {
    let matched = results.iter().filter(|r| !r.matches.is_empty()).count();
    println!("✔ {}件中{}件に候補あり\n", results.len(), matched);
}

fn read_boq(path: &Path) -> error::Result<Vec<BoqItem>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Match { input, price_list, top_k, format, output, boq, keep_numbers, keep_units, no_token_set } => {
            println!("📊 boq-match - 類似度照合\n");

            let price_path = resolve_price_list(price_list, &config)?;
            let top_k = top_k.unwrap_or(config.top_k);
            let mut options = config.match_options();
            if keep_numbers {
                options.normalize.strip_numbers = false;
            }
            if keep_units {
                options.normalize.strip_units = false;
            }
            if no_token_set {
                options.use_token_set_ratio = false;
            }

            println!("[1/3] 表計算ファイルを読み込み中...");
            let price_rows = spreadsheet::load_price_rows(&price_path)?;
            let bytes = std::fs::read(&input)
                .with_context(|| format!("入力ファイルを読み込めません: {}", input.display()))?;
            let sheet = spreadsheet::parse_input(&bytes)?;
            println!("✔ 単価表 {}件 / 入力 {}件\n", price_rows.len(), sheet.rows.len());

            println!("[2/3] 照合中...");
            let results = match_rows(&sheet.rows, &price_rows, top_k, &options);
            print_summary(&results);

            println!("[3/3] 結果を保存中...");
            export::export_results(&results, &sheet, format, &resolve_output(output))?;
            if let Some(boq_path) = boq {
                export::write_json(&boq_from_matches(&results), &boq_path)?;
                println!("✔ 単価付きBoQ: {}", boq_path.display());
            }

            println!("\n✅ 照合完了");
        }

        Commands::Semantic { input, price_list, format, output } => {
            println!("🧠 boq-match - 埋め込み照合\n");

            let price_path = resolve_price_list(price_list, &config)?;
            let provider = embedding::CohereProvider::from_config(&config)?;

            println!("[1/3] 表計算ファイルを読み込み中...");
            let price_rows = spreadsheet::load_price_rows(&price_path)?;
            let sheet = spreadsheet::parse_input_file(&input)?;
            println!("✔ 単価表 {}件 / 入力 {}件\n", price_rows.len(), sheet.rows.len());

            println!("[2/3] 埋め込み照合中... (モデル: {})", provider.model());
            let pb = spinner("埋め込みAPIを呼び出し中");
            let results = semantic::match_semantic(
                &sheet.rows,
                &price_rows,
                &provider,
                config.embedding_batch_size,
                provider.batch_budget(),
            )
            .await;
            pb.finish_and_clear();
            let results = results?;
            print_summary(&results);

            println!("[3/3] 結果を保存中...");
            export::export_results(&results, &sheet, format, &resolve_output(output))?;

            println!("\n✅ 照合完了");
        }

        Commands::Price { boq, rates, merge, output } => {
            println!("💴 boq-match - 単価設定\n");

            let mut items = read_boq(&boq)?;
            if let Some(system_path) = merge {
                let system = read_boq(&system_path)?;
                items = merge_boq(&items, &system);
                let duplicates = items.iter().filter(|i| i.duplicate).count();
                println!("✔ 社内BoQとマージ: {}件（重複 {}件）", items.len(), duplicates);
            }

            let table = spreadsheet::read_rate_table(&rates)?;
            println!("✔ 単価 {}件を読み込み", table.len());

            let priced = apply_rates(&items, &table);
            let missing = priced.iter().filter(|i| i.unit_rate.is_none()).count();
            if missing > 0 {
                println!("⚠ 単価が見つからない項目: {}件", missing);
            }

            let output_path = output.unwrap_or(boq);
            export::write_json(&priced, &output_path)?;
            println!("✔ 結果を保存: {}", output_path.display());
        }

        Commands::Import { input, store: store_path } => {
            println!("📥 boq-match - 単価表取り込み\n");

            let rows = spreadsheet::load_price_rows(&input)?;
            let items: Vec<store::PriceItem> = rows.iter().map(store::PriceItem::from_row).collect();

            let mut price_store = store::JsonFileStore::open(&store_path)?;
            let count = price_store.replace_all(items)?;
            println!("✔ {}件を取り込みました: {}", count, price_store.path().display());
        }

        Commands::Headers { input } => {
            for (sheet, header) in spreadsheet::describe_headers(&input)? {
                match header {
                    Some(h) => {
                        let m = &h.column_map;
                        println!("{}: 見出し行 {}", sheet, h.header_row_index + 1);
                        println!(
                            "  code={:?} description={:?} quantity={:?} unit={:?} rate={:?}",
                            m.code, m.description, m.quantity, m.unit, m.rate
                        );
                    }
                    None => println!("{}: 見出し行なし", sheet),
                }
            }
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.embedding_model);
                println!("  エンドポイント: {}", config.embedding_endpoint);
                println!("  バッチサイズ: {}", config.embedding_batch_size);
                println!("  タイムアウト: {}秒 / リトライ: {}回", config.timeout_seconds, config.max_retries);
                println!("  候補数: {}", config.top_k);
                println!(
                    "  正規化: 数字除去={} 単位除去={} token set={}",
                    config.strip_numbers, config.strip_units, config.use_token_set_ratio
                );
                if let Some(path) = &config.price_list {
                    println!("  単価表: {}", path.display());
                }
                println!("  APIキー: {}", if config.get_api_key().is_ok() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}
