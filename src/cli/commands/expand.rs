use crate::backend::ConversionBackend;
use crate::domain::ConvertError;
use crate::link;
use crate::polling::PollConfig;
use crate::App;
use anyhow::Result;

/// 短縮URLを展開して表示する
pub async fn execute_expand<B, C>(app: &App<B, C>, url: &str) -> Result<()>
where
    B: ConversionBackend + 'static,
    C: PollConfig + Clone + 'static,
{
    let url = url.trim();
    if !link::is_valid_url(url) {
        return Err(ConvertError::invalid_url(url).into());
    }

    let expanded = app.backend().expand_url(url).await?;
    println!("{expanded}");
    Ok(())
}
