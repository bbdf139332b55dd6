use return_ai_rust::{cli, config, embedding, error, loader, pipeline};
use cli::{Cli, Invocation};
use config::Config;
use embedding::ClipEmbedder;
use error::Result;
use loader::ImagePair;
use return_ai_common::{ComparisonResult, ErrorEnvelope};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, Registry};

/// 設定読み込み後にログレベルを差し替えるためのハンドル
type LogHandle = reload::Handle<LevelFilter, Registry>;

const SERIALIZE_FALLBACK: &str = r#"{"error":"failed to serialize result","ai_similarity_score":null,"ai_confidence":0.0,"ai_detected_issues":["AI inference failed: failed to serialize result"],"ai_issue_labels":["error"],"status":"failed"}"#;

fn main() {
    let invocation = Cli::parse_invocation(std::env::args_os());
    let verbose = matches!(&invocation, Ok(Invocation::Compare(cli)) if cli.verbose);
    let log = init_logging(verbose);

    let (outcome, pretty) = match invocation {
        Ok(Invocation::Info(info)) => info.exit(),
        Ok(Invocation::Compare(cli)) => (run(&cli, log.as_ref()), cli.pretty),
        Err(err) => (Err(err), false),
    };

    std::process::exit(emit(outcome, pretty));
}

fn run(cli: &Cli, log: Option<&LogHandle>) -> Result<ComparisonResult> {
    // 1. 入力確認
    let pair = ImagePair::new(&cli.reference_image, &cli.return_image);
    pair.validate()?;

    // 2. 設定
    let mut config = Config::load()?;
    if !cli.verbose {
        if let Some(handle) = log {
            apply_log_level(handle, &config.log_level);
        }
    }
    if let Some(model) = &cli.model {
        config.model_path = Some(model.clone());
    }

    // 3. モデル読み込み → 比較
    let embedder = ClipEmbedder::from_config(&config)?;
    pipeline::compare(&embedder, &pair, &config.model_version)
}

/// stdoutはJSON専用なのでログはstderrへ
///
/// 設定を読む前から有効にしておき、レベルは後で `apply_log_level` で変える
fn init_logging(verbose: bool) -> Option<LogHandle> {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let (filter, handle) = reload::Layer::new(level);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));
    tracing::subscriber::set_global_default(subscriber).ok()?;

    Some(handle)
}

fn apply_log_level(handle: &LogHandle, configured: &str) {
    let level = configured.parse().unwrap_or_else(|_| {
        tracing::warn!("不明なログレベル: {}", configured);
        LevelFilter::WARN
    });
    if let Err(e) = handle.modify(|filter| *filter = level) {
        tracing::warn!("ログレベル変更に失敗: {}", e);
    }
}

/// 結果JSONを出力して終了コードを返す
fn emit(outcome: Result<ComparisonResult>, pretty: bool) -> i32 {
    match render(outcome, pretty) {
        Ok((json, code)) => {
            println!("{}", json);
            code
        }
        Err(e) => {
            tracing::error!("JSON出力に失敗: {}", e);
            println!("{}", SERIALIZE_FALLBACK);
            1
        }
    }
}

fn render(outcome: Result<ComparisonResult>, pretty: bool) -> Result<(String, i32)> {
    match outcome {
        Ok(result) => Ok((result.to_json(pretty)?, 0)),
        Err(err) => {
            tracing::error!("{}", err);
            Ok((ErrorEnvelope::from(&err).to_json(pretty)?, 1))
        }
    }
}
