use crate::backend::ConversionBackend;
use crate::domain::ConvertError;
use crate::polling::{ConsolePollObserver, PollConfig};
use crate::{App, ConvertOptions};
use anyhow::Result;
use tokio_util::sync::CancellationToken;

/// 進捗表示の observer が利用者へ表示済みのエラー
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ReportedError(pub ConvertError);

/// プレイリストを変換し、完了まで進捗を表示する
///
/// `quiet` の場合は変換後のURLだけを標準出力へ書く（スクリプト向け）。
pub async fn execute_convert<B, C>(
    app: &App<B, C>,
    options: ConvertOptions,
    quiet: bool,
    cancel: &CancellationToken,
) -> Result<()>
where
    B: ConversionBackend + 'static,
    C: PollConfig + Clone + 'static,
{
    let observer = if quiet {
        ConsolePollObserver::quiet()
    } else {
        println!("🎵 Converting {}", options.playlist);
        if options.invert_order {
            println!("   - track order: reversed");
        }
        ConsolePollObserver::new()
    };

    let result = match app.convert(&options, &observer, cancel).await {
        Ok(result) => result,
        // キャンセルと quiet 時の失敗は observer が表示しない
        Err(error) if quiet || matches!(error, ConvertError::Cancelled) => return Err(error.into()),
        Err(error) => return Err(ReportedError(error).into()),
    };

    if quiet {
        match result.result_url() {
            Some(url) => println!("{url}"),
            None => println!("{}", serde_json::to_string(&result.result)?),
        }
    }

    Ok(())
}
