use crate::error::{ReturnAiError, Result};
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "compare_images", version)]
#[command(about = "参照写真と返却写真を比較して類似度と差異を判定", long_about = None)]
pub struct Cli {
    /// 参照（貸出時）写真
    pub reference_image: PathBuf,

    /// 返却時写真
    pub return_image: PathBuf,

    /// 詳細ログをstderrに出力
    #[arg(short, long)]
    pub verbose: bool,

    /// CLIPモデル（ONNX）のパス（設定ファイル・環境変数より優先）
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// JSONを整形して出力
    #[arg(long)]
    pub pretty: bool,
}

/// 引数の解釈結果
#[derive(Debug)]
pub enum Invocation {
    Compare(Cli),
    /// --help / --version（clapの出力をそのまま表示）
    Info(clap::Error),
}

impl Cli {
    /// 引数を解釈。引数エラーはJSONで返せるように InvalidArguments にまとめる
    pub fn parse_invocation<I, T>(args: I) -> Result<Invocation>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        match Cli::try_parse_from(args) {
            Ok(cli) => Ok(Invocation::Compare(cli)),
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                Ok(Invocation::Info(e))
            }
            Err(e) => {
                tracing::debug!("引数エラー: {}", e);
                Err(ReturnAiError::InvalidArguments)
            }
        }
    }
}
