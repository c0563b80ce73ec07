use anyhow::Result;
use clap::Parser;

use mdxscrub::{App, CliArgs};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger; stdout carries the sanitized tree
    let mut logger = if std::env::var_os("RUST_LOG").is_some() {
        env_logger::Builder::from_default_env()
    } else {
        mdxscrub::default_logger()
    };
    logger.target(env_logger::Target::Stderr);
    logger.init();

    let args = CliArgs::parse();

    let mut app = match App::new().await {
        Ok(app) => {
            log::debug!("Application initialized successfully");
            app
        }
        Err(e) => {
            eprintln!("アプリケーションの初期化に失敗しました: {}", e);
            if let Some(source) = e.source() {
                eprintln!("詳細: {}", source);
            }
            return Err(e);
        }
    };

    match app.run(&args).await {
        Ok(outcome) => {
            if let mdxscrub::Outcome::ConfigWritten(path) = &outcome {
                eprintln!("設定ファイルを作成しました: {}", path.display());
            }
            let code = outcome.exit_code();
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("処理中にエラーが発生しました: {}", err);

            if let Some(source) = err.source() {
                eprintln!("原因: {}", source);
            }

            log::error!("Application error: {}", err);

            if err.to_string().contains("decode") {
                eprintln!("提案: 入力が remark-mdx の JSON 構文木であることを確認してください");
            } else if err.to_string().contains("permission") {
                eprintln!("提案: ファイルのアクセス権限を確認してください");
            }
            std::process::exit(1);
        }
    }
}
