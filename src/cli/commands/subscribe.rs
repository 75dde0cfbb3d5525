use crate::backend::ConversionBackend;
use crate::polling::PollConfig;
use crate::App;
use anyhow::Result;

/// ニュースレターに登録する
pub async fn execute_subscribe<B, C>(app: &App<B, C>, email: &str) -> Result<()>
where
    B: ConversionBackend + 'static,
    C: PollConfig + Clone + 'static,
{
    app.subscribe(email).await?;
    println!("📮 Subscribed {}", email.trim());
    Ok(())
}
