use crate::export::ExportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "boq-match")]
#[command(about = "BoQ明細と単価表のあいまい照合ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 文字列類似度で照合（上位K件）
    Match {
        /// 入力BoQファイル（先頭シートを使用）
        #[arg(required = true)]
        input: PathBuf,

        /// 単価表ファイル（省略時は設定の price_list）
        #[arg(short, long)]
        price_list: Option<PathBuf>,

        /// 入力1行あたりの候補数（省略時は設定の top_k）
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// 出力形式 (json/excel/both)
        #[arg(short, long, default_value = "both")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ（デフォルト: カレント/Output_<時刻>）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 最上位候補で単価を付けたBoQ JSONも出力
        #[arg(long)]
        boq: Option<PathBuf>,

        /// 数字だけのトークンを残す
        #[arg(long)]
        keep_numbers: bool,

        /// 単位・寸法トークンを残す
        #[arg(long)]
        keep_units: bool,

        /// token set ratio を使わない
        #[arg(long)]
        no_token_set: bool,
    },

    /// 埋め込みAPIで照合（最上位1件）
    Semantic {
        /// 入力BoQファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 単価表ファイル（省略時は設定の price_list）
        #[arg(short, long)]
        price_list: Option<PathBuf>,

        /// 出力形式 (json/excel/both)
        #[arg(short, long, default_value = "both")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// BoQ JSONに単価ファイルの単価を設定
    Price {
        /// BoQ JSONファイル
        #[arg(required = true)]
        boq: PathBuf,

        /// 単価ファイル（A列=コード、B列=単価）
        #[arg(short, long)]
        rates: PathBuf,

        /// 社内BoQ JSON（指定時はマージして重複を検出）
        #[arg(long)]
        merge: Option<PathBuf>,

        /// 出力JSONファイル（省略時は上書き）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 単価表ファイルをストアに取り込む
    Import {
        /// 単価表ファイル
        #[arg(required = true)]
        input: PathBuf,

        /// ストアJSONファイル
        #[arg(short, long)]
        store: PathBuf,
    },

    /// シートごとの見出し行検出結果を表示
    Headers {
        /// 表計算ファイル
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
