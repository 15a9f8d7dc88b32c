use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoqMatchError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`boq-match config --set-api-key YOUR_KEY` または環境変数 COHERE_API_KEY で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    /// ブックを開けない・シートを読めない
    #[error("表計算ファイルの読み込みに失敗: {0}")]
    Spreadsheet(String),

    /// 見出し行が見つからない等
    #[error("表の解析に失敗: {0}")]
    Parse(String),

    /// 埋め込みAPIの失敗（照合全体を中断する）
    #[error("埋め込みAPIエラー: {0}")]
    EmbeddingProvider(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("ストアエラー: {0}")]
    Store(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl From<boq_match_common::Error> for BoqMatchError {
    fn from(err: boq_match_common::Error) -> Self {
        match err {
            boq_match_common::Error::Parse(msg) => BoqMatchError::Parse(msg),
        }
    }
}

impl From<calamine::Error> for BoqMatchError {
    fn from(err: calamine::Error) -> Self {
        BoqMatchError::Spreadsheet(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for BoqMatchError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        BoqMatchError::ExcelGeneration(err.to_string())
    }
}

impl BoqMatchError {
    /// 表データ起因のエラー（見出しなし・読み込み不可）
    pub fn is_parse_error(&self) -> bool {
        matches!(self, BoqMatchError::Parse(_) | BoqMatchError::Spreadsheet(_))
    }
}

pub type Result<T> = std::result::Result<T, BoqMatchError>;
