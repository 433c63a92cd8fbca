//! # 照片签名合成工具：应用入口
//!
//! 本文件仅负责参数解析、日志初始化与服务组装。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use photo_signature_merge::compositor::{
    ActionOutcome, CompositeError, CompositeService, CompositeSession, InputSlot, Placement,
    PROCESSING_FAILED_NOTICE,
};
use photo_signature_merge::error::AppError;
use photo_signature_merge::export::{DirectorySink, resolve_output_dir};

/// 将照片与签名合成为一张 JPEG
#[derive(Parser, Debug)]
#[command(name = "photo-sign", version, about)]
struct Args {
    /// 照片文件
    photo: Option<PathBuf>,

    /// 签名文件
    signature: Option<PathBuf>,

    /// 摆放策略
    #[arg(long, value_enum, default_value_t = Placement::StackedWithBorder)]
    placement: Placement,

    /// 导出目录（默认当前目录）
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// JSON 布局覆盖文件
    #[arg(long)]
    layout: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let service = CompositeService::new();

    if let Err(err) = configure(&service, &args) {
        log::error!("❌ 配置加载失败：{err}");
        eprintln!("{}", err.user_message());
        return ExitCode::from(2);
    }

    let mut session = CompositeSession::new();
    let selected = select_slot(&service, args.photo.as_deref())
        .and_then(|photo| Ok((photo, select_slot(&service, args.signature.as_deref())?)));
    match selected {
        Ok((photo, signature)) => {
            session.select_photo(photo);
            session.select_signature(signature);
        }
        Err(err) => {
            log::error!("❌ 读取输入失败 [{}@{}]：{err}", err.code(), err.stage());
            eprintln!("{}", PROCESSING_FAILED_NOTICE);
            return ExitCode::FAILURE;
        }
    }

    log::info!(
        "📋 照片：{} 签名：{}",
        session.photo_display_name(),
        session.signature_display_name()
    );

    let mut sink = match resolve_output_dir(args.out_dir.clone()) {
        Ok(dir) => DirectorySink::new(dir),
        Err(err) => {
            log::error!("❌ {err}");
            eprintln!("{}", err.user_message());
            return ExitCode::FAILURE;
        }
    };

    match service.run_action(&session, &mut sink).await {
        ActionOutcome::Exported { path, .. } => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        ActionOutcome::Notice(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn configure(service: &CompositeService, args: &Args) -> Result<(), AppError> {
    service.use_placement(args.placement)?;

    if let Some(path) = &args.layout {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("读取布局文件 '{}' 失败: {}", path.display(), e)))?;
        service.apply_layout_json(&content)?;
        log::info!("⚙️ 已加载布局文件：{}", path.display());
    }

    Ok(())
}

fn select_slot(
    service: &CompositeService,
    path: Option<&Path>,
) -> Result<Option<InputSlot>, CompositeError> {
    path.map(|path| service.load_slot_from_path(path)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_flag_parses_kebab_case_values() {
        let args = Args::try_parse_from(["photo-sign", "--placement", "overlay-bottom-of-photo"])
            .expect("known placement should parse");
        assert_eq!(args.placement, Placement::OverlayBottomOfPhoto);

        let defaults = Args::try_parse_from(["photo-sign"]).expect("defaults should parse");
        assert_eq!(defaults.placement, Placement::StackedWithBorder);
    }

    #[test]
    fn unknown_placement_is_a_usage_error() {
        let err = Args::try_parse_from(["photo-sign", "--placement", "side-by-side"])
            .expect_err("unknown placement should be rejected");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
